//! Document database driver seam
//!
//! The registry and inspector only talk to these traits. `MongoDriver` backs
//! them in production; `MemoryDriver` backs them in tests.

use async_trait::async_trait;
use bson::Document;
use std::time::Duration;

/// Default timeout for both the initial socket connect and server selection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure reported by a driver, carrying its message verbatim
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<mongodb::error::Error> for DriverError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Timeouts applied while establishing a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTimeouts {
    pub connect: Duration,
    pub server_selection: Duration,
}

impl ConnectTimeouts {
    pub fn new(connect: Duration, server_selection: Duration) -> Self {
        Self {
            connect,
            server_selection,
        }
    }

    /// Upper bound for a whole connect attempt
    pub fn total(&self) -> Duration {
        self.connect + self.server_selection
    }
}

impl Default for ConnectTimeouts {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }
}

/// Opens handles to a document database
#[async_trait]
pub trait DocumentDriver: Send + Sync {
    /// Open a verified connection to `uri`.
    ///
    /// Implementations must release anything they partially opened before
    /// returning an error.
    async fn connect(
        &self,
        uri: &str,
        timeouts: ConnectTimeouts,
    ) -> Result<Box<dyn DocumentHandle>, DriverError>;
}

/// An open connection. Query methods may be called concurrently.
#[async_trait]
pub trait DocumentHandle: Send + Sync {
    /// Database named in the connection string, if any
    fn default_database(&self) -> Option<String>;

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, DriverError>;

    async fn count_documents(&self, database: &str, collection: &str) -> Result<u64, DriverError>;

    /// Fetch up to `limit` documents after skipping `skip`, in natural order
    async fn find_page(
        &self,
        database: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, DriverError>;

    /// Close the connection. Queries issued afterwards fail.
    async fn close(&self) -> Result<(), DriverError>;
}
