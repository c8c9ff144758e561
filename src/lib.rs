//! docport - HTTP gateway for browsing MongoDB collections
//!
//! A client registers a connection, receives an opaque connection id, then
//! lists collections and pages through their documents with that id.
//!
//! ## Components
//!
//! - **Driver**: trait seam over the database client (`db`)
//! - **Session registry**: creates, resolves and closes connections (`session`)
//! - **Inspector**: collection listing, paging and column inference (`inspector`)
//! - **Server**: hyper HTTP façade (`server`, `routes`)

pub mod config;
pub mod db;
pub mod inspector;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use session::{ConnectParams, Session, SessionRegistry};
pub use types::{GatewayError, Result};
