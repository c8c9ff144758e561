//! Server module for docport

pub mod http;

pub use http::{dispatch, run, serve, AppState};
