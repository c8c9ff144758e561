//! Session registry
//!
//! Maps opaque session ids to open sessions. Ids are random UUIDs minted by
//! the server, never supplied by clients.
//!
//! `close` removes the entry before closing the handle, so two racing closes
//! close it once. It does not cancel queries already running on the handle;
//! those fail with the driver's connection-closed error and surface as
//! `GatewayError::Query`.
//!
//! If the handle's close fails the entry is already gone, so a handle that is
//! still open is no longer tracked and cannot be closed through the registry.
//! The caller gets `GatewayError::Close`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::{ConnectTimeouts, DocumentDriver};
use crate::session::{redact_uri, ConnectParams, Session};
use crate::types::{GatewayError, Result};

/// Process-lifetime registry of open sessions
pub struct SessionRegistry {
    driver: Arc<dyn DocumentDriver>,
    timeouts: ConnectTimeouts,
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new(driver: Arc<dyn DocumentDriver>, timeouts: ConnectTimeouts) -> Self {
        Self {
            driver,
            timeouts,
            sessions: DashMap::new(),
        }
    }

    /// Connect and register a new session, returning its id
    pub async fn open(&self, params: ConnectParams) -> Result<String> {
        let uri = params.connection_string()?;
        let redacted = redact_uri(&uri);
        info!(uri = %redacted, "Opening connection");

        let connect = self.driver.connect(&uri, self.timeouts);
        let handle = match tokio::time::timeout(self.timeouts.total(), connect).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                warn!(uri = %redacted, error = %e, "Connection failed");
                return Err(GatewayError::connect(e));
            }
            Err(_) => {
                warn!(uri = %redacted, "Connection attempt timed out");
                return Err(GatewayError::Connect(format!(
                    "timed out after {}ms connecting to {}",
                    self.timeouts.total().as_millis(),
                    redacted
                )));
            }
        };

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), handle, params, uri));
        let created_at = session.created_at();
        self.sessions.insert(id.clone(), session);

        info!(
            session_id = %id,
            uri = %redacted,
            created_at = %created_at.to_rfc3339(),
            active = self.sessions.len(),
            "Connection registered"
        );
        Ok(id)
    }

    /// Look up a session
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a session, reporting `SessionNotFound` when absent
    pub fn require(&self, id: &str) -> Result<Arc<Session>> {
        self.get(id)
            .ok_or_else(|| GatewayError::SessionNotFound(id.to_string()))
    }

    /// Unregister a session and close its handle
    pub async fn close(&self, id: &str) -> Result<()> {
        let (_, session) = self
            .sessions
            .remove(id)
            .ok_or_else(|| GatewayError::SessionNotFound(id.to_string()))?;

        session.handle().close().await.map_err(|e| {
            warn!(session_id = %id, error = %e, "Handle close failed");
            GatewayError::Close(e.into_message())
        })?;

        info!(session_id = %id, active = self.sessions.len(), "Connection closed");
        Ok(())
    }

    /// Close every registered session, returning how many closed cleanly
    pub async fn close_all(&self) -> usize {
        let mut closed = 0;
        for id in self.ids() {
            match self.close(&id).await {
                Ok(()) => closed += 1,
                // A concurrent close got there first
                Err(GatewayError::SessionNotFound(_)) => {}
                Err(e) => warn!(session_id = %id, error = %e, "Failed to close session"),
            }
        }
        debug!(closed, "Closed all sessions");
        closed
    }

    /// Creation time of the longest-lived registered session
    pub fn oldest_created_at(&self) -> Option<DateTime<Utc>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().created_at())
            .min()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
