//! Schema inspector
//!
//! Lists collections and pages through their documents for a session.
//! Failures are reported as `GatewayError::Query` and never retried.

pub mod rows;
pub mod schema;

pub use rows::{bson_to_json, document_to_json};
pub use schema::{infer_columns, Column, InferredType};

use bson::Document;
use serde::Serialize;
use tracing::debug;

use crate::session::Session;
use crate::types::{GatewayError, Result};

/// Page size when the request gives none or an unusable one
pub const DEFAULT_LIMIT: u64 = 100;

/// Offset when the request gives none or an unusable one
pub const DEFAULT_OFFSET: u64 = 0;

/// Largest page size served unless configured otherwise
pub const DEFAULT_MAX_LIMIT: u64 = 1000;

/// A collection as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionRef {
    pub table_schema: String,
    pub table_name: String,
}

/// Normalized pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl PageRequest {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Build from untrusted query values.
    ///
    /// Missing, non-numeric or negative values fall back to the defaults, as
    /// does a zero limit. Limits above `max_limit` are clamped.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>, max_limit: u64) -> Self {
        let limit = parse_count(limit)
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(max_limit.max(1));
        let offset = parse_count(offset).unwrap_or(DEFAULT_OFFSET);
        Self { limit, offset }
    }
}

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Inferred from the first row only; empty when the page is empty
    pub columns: Vec<Column>,
    pub rows: Vec<Document>,
    /// Documents in the whole collection
    pub total: u64,
}

/// Collections in the session's target database
pub async fn list_collections(session: &Session) -> Result<Vec<CollectionRef>> {
    let database = session.database();
    let names = session
        .handle()
        .list_collection_names(&database)
        .await
        .map_err(GatewayError::query)?;

    debug!(session_id = %session.id(), database = %database, count = names.len(), "Listed collections");

    Ok(names
        .into_iter()
        .map(|table_name| CollectionRef {
            table_schema: database.clone(),
            table_name,
        })
        .collect())
}

/// Count `collection`, then fetch the requested window of it
pub async fn fetch_page(
    session: &Session,
    database: &str,
    collection: &str,
    page: PageRequest,
) -> Result<Page> {
    let handle = session.handle();

    let total = handle
        .count_documents(database, collection)
        .await
        .map_err(GatewayError::query)?;

    let rows = handle
        .find_page(database, collection, page.offset, page.limit)
        .await
        .map_err(GatewayError::query)?;

    let columns = rows.first().map(infer_columns).unwrap_or_default();

    debug!(
        session_id = %session.id(),
        database,
        collection,
        limit = page.limit,
        offset = page.offset,
        returned = rows.len(),
        total,
        "Fetched collection page"
    );

    Ok(Page {
        columns,
        rows,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ConnectTimeouts, DocumentDriver, MemoryDriver};
    use crate::session::ConnectParams;
    use bson::doc;

    async fn open(driver: &MemoryDriver, uri: &str) -> Session {
        let handle = driver.connect(uri, ConnectTimeouts::default()).await.unwrap();
        Session::new("s".into(), handle, ConnectParams::from_uri(uri), uri.to_string())
    }

    fn seeded() -> MemoryDriver {
        let driver = MemoryDriver::new();
        driver.insert("shop", "items", (0..5).map(|i| doc! { "n": i }));
        driver.create_collection("shop", "empty");
        driver
    }

    #[test]
    fn test_page_request_normalization() {
        assert_eq!(PageRequest::from_query(None, None, 1000), PageRequest::new(100, 0));
        assert_eq!(
            PageRequest::from_query(Some("25"), Some("50"), 1000),
            PageRequest::new(25, 50)
        );
        assert_eq!(
            PageRequest::from_query(Some("abc"), Some("-3"), 1000),
            PageRequest::new(100, 0)
        );
        assert_eq!(
            PageRequest::from_query(Some("-1"), Some("1.5"), 1000),
            PageRequest::new(100, 0)
        );
        assert_eq!(PageRequest::from_query(Some("0"), None, 1000).limit, 100);
        assert_eq!(PageRequest::from_query(Some("5000"), None, 1000).limit, 1000);
        assert_eq!(PageRequest::from_query(Some(" 7 "), None, 1000).limit, 7);
    }

    #[tokio::test]
    async fn test_fetch_first_and_last_page() {
        let driver = seeded();
        let session = open(&driver, "mongodb://localhost/shop").await;

        let page = fetch_page(&session, "shop", "items", PageRequest::new(2, 0))
            .await
            .unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.columns.len(), 1);
        assert_eq!(page.columns[0].data_type, InferredType::Number);

        let page = fetch_page(&session, "shop", "items", PageRequest::new(2, 4))
            .await
            .unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_fetch_empty_collection() {
        let driver = seeded();
        let session = open(&driver, "mongodb://localhost/shop").await;

        let page = fetch_page(&session, "shop", "empty", PageRequest::default())
            .await
            .unwrap();
        assert!(page.columns.is_empty());
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_columns_come_from_first_row_only() {
        let driver = MemoryDriver::new();
        driver.insert(
            "db",
            "mixed",
            vec![doc! { "a": 1 }, doc! { "a": "x", "b": true }],
        );
        let session = open(&driver, "mongodb://localhost/db").await;

        let page = fetch_page(&session, "db", "mixed", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(
            page.columns,
            vec![Column {
                column_name: "a".into(),
                data_type: InferredType::Number,
            }]
        );
    }

    #[tokio::test]
    async fn test_list_collections_uses_session_database() {
        let driver = seeded();
        let session = open(&driver, "mongodb://localhost/shop").await;

        let collections = list_collections(&session).await.unwrap();
        assert_eq!(
            collections,
            vec![
                CollectionRef {
                    table_schema: "shop".into(),
                    table_name: "empty".into(),
                },
                CollectionRef {
                    table_schema: "shop".into(),
                    table_name: "items".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_closed_handle_is_query_failure() {
        let driver = seeded();
        let session = open(&driver, "mongodb://localhost/shop").await;
        session.handle().close().await.unwrap();

        let err = list_collections(&session).await.unwrap_err();
        assert!(matches!(err, GatewayError::Query(_)));

        let err = fetch_page(&session, "shop", "items", PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "connection closed");
    }
}
