//! MongoDB driver
//!
//! Pattern adapted from holo-host/rust/util_libs/db/src/mongodb

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{options::ClientOptions, Client};
use tracing::{debug, info, warn};

use crate::db::driver::{ConnectTimeouts, DocumentDriver, DocumentHandle, DriverError};

/// Driver that opens one `mongodb::Client` per session
#[derive(Debug, Clone, Default)]
pub struct MongoDriver {
    app_name: Option<String>,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `app_name` to the server in the connection handshake
    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
        }
    }
}

#[async_trait]
impl DocumentDriver for MongoDriver {
    async fn connect(
        &self,
        uri: &str,
        timeouts: ConnectTimeouts,
    ) -> Result<Box<dyn DocumentHandle>, DriverError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(timeouts.connect);
        options.server_selection_timeout = Some(timeouts.server_selection);
        if options.app_name.is_none() {
            options.app_name = self.app_name.clone();
        }
        let default_database = options.default_database.clone();

        let client = Client::with_options(options)?;

        // Client construction is lazy; ping forces server selection
        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            warn!(error = %e, "MongoDB ping failed, shutting client down");
            client.shutdown().await;
            return Err(e.into());
        }

        info!(default_database = ?default_database, "MongoDB client connected");

        Ok(Box::new(MongoHandle {
            client,
            default_database,
        }))
    }
}

/// An open MongoDB client owned by one session
pub struct MongoHandle {
    client: Client,
    default_database: Option<String>,
}

#[async_trait]
impl DocumentHandle for MongoHandle {
    fn default_database(&self) -> Option<String> {
        self.default_database.clone()
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, DriverError> {
        let names = self.client.database(database).list_collection_names().await?;
        Ok(names)
    }

    async fn count_documents(&self, database: &str, collection: &str) -> Result<u64, DriverError> {
        let count = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?;
        Ok(count)
    }

    async fn find_page(
        &self,
        database: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, DriverError> {
        let cursor = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .find(doc! {})
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        let documents: Vec<Document> = cursor.try_collect().await?;
        debug!(database, collection, skip, limit, returned = documents.len(), "Fetched page");
        Ok(documents)
    }

    async fn close(&self) -> Result<(), DriverError> {
        // Clones share one topology; shutting one down closes them all
        self.client.clone().shutdown().await;
        Ok(())
    }
}
