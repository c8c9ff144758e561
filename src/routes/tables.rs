//! Collection browsing routes
//!
//! - `GET /api/tables/{id}` - collections in the session's database
//! - `GET /api/tableData/{id}/{schema}/{table}?limit=&offset=` - one page

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::inspector::{self, document_to_json, CollectionRef, Column, PageRequest};
use crate::routes::response::{error_response, json_response};
use crate::server::AppState;

/// Raw pagination query; values are normalized by `PageRequest::from_query`
#[derive(Debug, Default)]
struct PageQuery {
    limit: Option<String>,
    offset: Option<String>,
}

impl PageQuery {
    /// Pick `limit` and `offset` independently; the first occurrence of each
    /// key wins and other keys are ignored
    fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut raw.limit,
                "offset" => &mut raw.offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        raw
    }
}

#[derive(Serialize)]
struct TablesResponse {
    success: bool,
    tables: Vec<CollectionRef>,
}

#[derive(Serialize)]
struct TableDataResponse {
    success: bool,
    columns: Vec<Column>,
    data: Vec<Value>,
    total: u64,
}

pub async fn handle_list_tables(state: &AppState, id: &str) -> Response<Full<Bytes>> {
    let result = match state.registry.require(id) {
        Ok(session) => inspector::list_collections(&session).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(tables) => json_response(
            StatusCode::OK,
            &TablesResponse {
                success: true,
                tables,
            },
        ),
        Err(e) => error_response("Failed to retrieve collections", &e),
    }
}

pub async fn handle_table_data(
    state: &AppState,
    id: &str,
    schema: &str,
    table: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    let session = match state.registry.require(id) {
        Ok(session) => session,
        Err(e) => return error_response("Failed to retrieve collection data", &e),
    };

    let raw = PageQuery::parse(query.unwrap_or(""));
    let page = PageRequest::from_query(
        raw.limit.as_deref(),
        raw.offset.as_deref(),
        state.args.max_page_limit,
    );

    match inspector::fetch_page(&session, schema, table, page).await {
        Ok(page) => json_response(
            StatusCode::OK,
            &TableDataResponse {
                success: true,
                columns: page.columns,
                data: page.rows.iter().map(document_to_json).collect(),
                total: page.total,
            },
        ),
        Err(e) => error_response("Failed to retrieve collection data", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_parsing() {
        let raw = PageQuery::parse("limit=2&offset=4");
        assert_eq!(raw.limit.as_deref(), Some("2"));
        assert_eq!(raw.offset.as_deref(), Some("4"));

        let raw = PageQuery::parse("");
        assert!(raw.limit.is_none());
        assert!(raw.offset.is_none());

        // Unknown keys are ignored
        let raw = PageQuery::parse("limit=x&sort=name");
        assert_eq!(raw.limit.as_deref(), Some("x"));
        assert!(raw.offset.is_none());
    }

    #[test]
    fn test_repeated_key_keeps_other_values() {
        let raw = PageQuery::parse("offset=4&limit=2&limit=7");
        assert_eq!(raw.limit.as_deref(), Some("2"));
        assert_eq!(raw.offset.as_deref(), Some("4"));

        let raw = PageQuery::parse("limit=abc&offset=1&offset=3");
        assert_eq!(raw.limit.as_deref(), Some("abc"));
        assert_eq!(raw.offset.as_deref(), Some("1"));
    }
}
