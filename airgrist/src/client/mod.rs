//! This module defines the source and destination client contracts plus
//! their REST implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;

use crate::error::Result;
use crate::types::{DestinationTable, Record, SourceTable};

mod airtable;
pub use airtable::*;
mod grist;
pub use grist::*;

/// Fixed deadline applied to every outbound request. Expiry surfaces as
/// an [`crate::ErrorKind::RequestTimeout`] error.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reference to a source client.
pub type SourceClientRef = Arc<dyn SourceClient>;

/// Reference to a destination client.
pub type DestinationClientRef = Arc<dyn DestinationClient>;

/// The read side of an import: fetches schemas and records from the
/// source service.
///
/// Implementations hold no mutable state between calls; errors propagate
/// to the caller unmodified and nothing is retried.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch the schema of every table in a base, in the order the
    /// source service reports them.
    async fn fetch_schema(&self, base_id: &str) -> Result<Vec<SourceTable>>;

    /// Fetch the records of one table.
    async fn fetch_records(&self, base_id: &str, table_id: &str) -> Result<Vec<Record>>;
}

/// The write side of an import: creates documents and tables and appends
/// records on the destination service.
///
/// Operations are only idempotent at the HTTP-retry level: calling
/// [`DestinationClient::create_document`] twice creates two documents.
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Create a document in a workspace and return its id. Document
    /// names are not checked for uniqueness; the remote service permits
    /// duplicates.
    async fn create_document(&self, workspace_id: i64, document_name: &str) -> Result<String>;

    /// Create tables in a document in one batched call.
    ///
    /// Returns the authoritative remote table ids, matched positionally
    /// to the input; the remote service may rename a table on collision
    /// so they need not equal the requested ids. Partial creation on
    /// error is possible and is not rolled back; the caller must treat
    /// the whole document as contaminated on failure.
    async fn add_tables(
        &self,
        document_id: &str,
        tables: &[DestinationTable],
    ) -> Result<Vec<String>>;

    /// Append records to a table. Each field map is wrapped under a
    /// `fields` key before transmission. No chunking is performed:
    /// respecting remote payload-size limits is the caller's concern.
    async fn add_records(
        &self,
        document_id: &str,
        table_id: &str,
        records: Vec<Map<String, Value>>,
    ) -> Result<()>;
}
