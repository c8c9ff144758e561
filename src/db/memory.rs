//! In-process document store implementing the driver seam
//!
//! Accepts the same `mongodb://` connection strings as the real driver and
//! keeps collections in insertion order. Hosts can be marked unreachable and
//! connects can be delayed to exercise failure and timeout paths.

use async_trait::async_trait;
use bson::Document;
use dashmap::{DashMap, DashSet};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::db::driver::{ConnectTimeouts, DocumentDriver, DocumentHandle, DriverError};

#[derive(Default)]
struct MemoryState {
    /// database -> collection -> documents
    databases: DashMap<String, BTreeMap<String, Vec<Document>>>,
    unreachable: DashSet<String>,
    open_handles: AtomicUsize,
    fail_close: AtomicBool,
}

/// Driver over an in-memory set of databases shared by all its handles
#[derive(Clone, Default)]
pub struct MemoryDriver {
    state: Arc<MemoryState>,
    connect_delay: Option<Duration>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering every connect
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Append documents to a collection, creating it if needed
    pub fn insert(
        &self,
        database: &str,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) {
        let mut db = self.state.databases.entry(database.to_string()).or_default();
        db.entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Create an empty collection
    pub fn create_collection(&self, database: &str, collection: &str) {
        self.insert(database, collection, std::iter::empty());
    }

    /// Make connects to `host` fail as if no server answered
    pub fn mark_unreachable(&self, host: &str) {
        self.state.unreachable.insert(host.to_string());
    }

    /// Make every later close report an error; the handle stays open
    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Handles connected and not yet closed
    pub fn open_handles(&self) -> usize {
        self.state.open_handles.load(Ordering::SeqCst)
    }
}

/// Hosts and default database parsed out of a connection string
struct ParsedUri {
    hosts: Vec<String>,
    default_database: Option<String>,
}

fn parse_uri(uri: &str) -> Result<ParsedUri, DriverError> {
    let rest = uri
        .strip_prefix("mongodb://")
        .or_else(|| uri.strip_prefix("mongodb+srv://"))
        .ok_or_else(|| {
            DriverError::new(
                "Invalid scheme, expected connection string to start with \"mongodb://\" or \"mongodb+srv://\"",
            )
        })?;

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest.split('?').next().unwrap_or(""), ""),
    };
    let host_list = authority.rsplit('@').next().unwrap_or("");

    let hosts: Vec<String> = host_list
        .split(',')
        .map(|h| h.split(':').next().unwrap_or("").to_string())
        .filter(|h| !h.is_empty())
        .collect();
    if hosts.is_empty() {
        return Err(DriverError::new("connection string contains no hosts"));
    }

    let database = path.split('?').next().unwrap_or("");
    let default_database = if database.is_empty() {
        None
    } else {
        Some(database.to_string())
    };

    Ok(ParsedUri {
        hosts,
        default_database,
    })
}

#[async_trait]
impl DocumentDriver for MemoryDriver {
    async fn connect(
        &self,
        uri: &str,
        _timeouts: ConnectTimeouts,
    ) -> Result<Box<dyn DocumentHandle>, DriverError> {
        let parsed = parse_uri(uri)?;

        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }

        if parsed
            .hosts
            .iter()
            .all(|h| self.state.unreachable.contains(h))
        {
            return Err(DriverError::new(format!(
                "Server selection timeout: No available servers ({})",
                parsed.hosts.join(",")
            )));
        }

        self.state.open_handles.fetch_add(1, Ordering::SeqCst);
        debug!(hosts = ?parsed.hosts, "Memory handle opened");

        Ok(Box::new(MemoryHandle {
            state: Arc::clone(&self.state),
            default_database: parsed.default_database,
            closed: AtomicBool::new(false),
        }))
    }
}

/// Handle onto a `MemoryDriver`'s databases
pub struct MemoryHandle {
    state: Arc<MemoryState>,
    default_database: Option<String>,
    closed: AtomicBool,
}

impl MemoryHandle {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(DriverError::new("connection closed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentHandle for MemoryHandle {
    fn default_database(&self) -> Option<String> {
        self.default_database.clone()
    }

    async fn list_collection_names(&self, database: &str) -> Result<Vec<String>, DriverError> {
        self.ensure_open()?;
        Ok(self
            .state
            .databases
            .get(database)
            .map(|db| db.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_documents(&self, database: &str, collection: &str) -> Result<u64, DriverError> {
        self.ensure_open()?;
        Ok(self
            .state
            .databases
            .get(database)
            .and_then(|db| db.get(collection).map(|docs| docs.len() as u64))
            .unwrap_or(0))
    }

    async fn find_page(
        &self,
        database: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, DriverError> {
        self.ensure_open()?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .state
            .databases
            .get(database)
            .and_then(|db| {
                db.get(collection)
                    .map(|docs| docs.iter().skip(skip).take(limit).cloned().collect())
            })
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(DriverError::new("close refused by server"));
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DriverError::new("connection already closed"));
        }
        self.state.open_handles.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
