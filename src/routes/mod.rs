//! HTTP routes for docport

pub mod connections;
pub mod health;
pub mod response;
pub mod tables;

pub use connections::{handle_close, handle_open};
pub use health::{health_check, root_ping, version_info};
pub use response::{
    bad_request_response, error_response, json_response, not_found_response, preflight_response,
    session_not_found,
};
pub use tables::{handle_list_tables, handle_table_data};
