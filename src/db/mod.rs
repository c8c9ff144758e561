//! Database driver layer
//!
//! A driver opens handles; a handle lists, counts and pages documents.

pub mod driver;
pub mod memory;
pub mod mongo;

pub use driver::{ConnectTimeouts, DocumentDriver, DocumentHandle, DriverError};
pub use memory::MemoryDriver;
pub use mongo::MongoDriver;
