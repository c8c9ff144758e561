//! Connection sessions
//!
//! A session is one open database handle registered under an opaque id.

pub mod params;
pub mod registry;

pub use params::{redact_uri, ConnectParams, PortValue, DEFAULT_PORT};
pub use registry::SessionRegistry;

use chrono::{DateTime, Utc};
use std::fmt;

use crate::db::DocumentHandle;

/// Database used when neither the request nor the connection string names one
pub const DEFAULT_DATABASE: &str = "test";

/// A live, registry-tracked connection
pub struct Session {
    id: String,
    handle: Box<dyn DocumentHandle>,
    params: ConnectParams,
    connection_string: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: String,
        handle: Box<dyn DocumentHandle>,
        params: ConnectParams,
        connection_string: String,
    ) -> Self {
        Self {
            id,
            handle,
            params,
            connection_string,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handle(&self) -> &dyn DocumentHandle {
        self.handle.as_ref()
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Target database: the requested one, else the connection string's
    /// default, else `test`
    pub fn database(&self) -> String {
        self.params
            .database()
            .map(str::to_string)
            .or_else(|| self.handle.default_database())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("connection_string", &redact_uri(&self.connection_string))
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
