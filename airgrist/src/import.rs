//! This module provides the import orchestrator: it sequences a whole
//! base copy from the source service to a freshly created destination
//! document.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::client::{AirtableClient, DestinationClientRef, GristClient, SourceClientRef};
use crate::config::ImportConfig;
use crate::error::Result;
use crate::translate::{translate_records, translate_table, TypeMapping};
use crate::types::SourceTable;
use crate::Error;
use crate::ErrorKind;

/// Which tables of a base to import.
///
/// The two cases keep "no selection given" distinguishable from a
/// selection that happens to match nothing: `All` imports every table,
/// `Only` imports the named tables and nothing when none match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelection {
    /// Import every table of the base.
    All,
    /// Import only the tables with these names.
    Only(Vec<String>),
}

impl TableSelection {
    /// Build a selection from a plain list of table names, mapping the
    /// empty list to [`TableSelection::All`].
    pub fn from_list(names: Vec<String>) -> Self {
        if names.is_empty() {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    fn matches(&self, table_name: &str) -> bool {
        match self {
            TableSelection::All => true,
            TableSelection::Only(names) => names.iter().any(|n| n == table_name),
        }
    }
}

/// Outcome of one table's record push.
#[derive(Debug)]
pub enum TableOutcome {
    /// Records were fetched, translated and pushed.
    Imported {
        /// Number of records pushed.
        records: usize,
    },
    /// Fetching, translating or pushing this table's records failed.
    /// Other tables were still attempted.
    Failed(Error),
}

/// Per-table entry of the final report.
#[derive(Debug)]
pub struct TableReport {
    /// Source table name.
    pub name: String,
    /// What happened to this table's records.
    pub outcome: TableOutcome,
}

impl Display for TableReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            TableOutcome::Imported { records } => {
                write!(f, "{}: imported {} records", self.name, records)
            }
            TableOutcome::Failed(err) => write!(f, "{}: failed: {}", self.name, err),
        }
    }
}

/// Final report of an import run.
///
/// Produced once the destination document and all its tables exist; the
/// per-table entries record how each record push went. A failed run can
/// be inspected and retried manually against the reported document.
#[derive(Debug)]
pub struct ImportReport {
    /// Id of the created destination document.
    pub document_id: String,
    /// One entry per imported table, in source schema order.
    pub tables: Vec<TableReport>,
}

impl ImportReport {
    /// True when every table's records were pushed.
    pub fn is_complete(&self) -> bool {
        self.tables
            .iter()
            .all(|t| matches!(t.outcome, TableOutcome::Imported { .. }))
    }
}

impl Display for ImportReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "document {}", self.document_id)?;
        for table in &self.tables {
            writeln!(f, "  {table}")?;
        }
        Ok(())
    }
}

/// Sequences one import: fetch schema, translate, create the document
/// and its tables, then push records table by table.
pub struct Importer {
    source: SourceClientRef,
    destination: DestinationClientRef,
    workspace_id: i64,
    document_name: String,
    mapping: TypeMapping,
}

impl Importer {
    /// Creates an importer from client references.
    pub fn new(
        source: SourceClientRef,
        destination: DestinationClientRef,
        workspace_id: i64,
        document_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            workspace_id,
            document_name: document_name.into(),
            mapping: TypeMapping::default(),
        }
    }

    /// Creates an importer with REST clients built from the given
    /// configuration.
    pub fn from_config(config: &ImportConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(AirtableClient::new(config.airtable.clone())?),
            Arc::new(GristClient::new(config.grist.clone())?),
            config.workspace_id,
            config.document_name.clone(),
        ))
    }

    /// Replace the type mapping rule set used for schema translation.
    pub fn with_type_mapping(mut self, mapping: TypeMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Copy the selected tables of a base into a new destination
    /// document.
    ///
    /// Aborts with no destination side effects when the schema fetch
    /// fails. Document and table creation form one logical transaction
    /// boundary: when the batched table creation fails the whole import
    /// fails and no record push is attempted. The error then carries the
    /// created document id as `document` context, since the document
    /// exists and is not cleaned up. After that point table failures are
    /// isolated: a failed record push is recorded in the report and the
    /// next table is still attempted.
    pub async fn import_base(
        &self,
        base_id: &str,
        selection: &TableSelection,
    ) -> Result<ImportReport> {
        let schema = self.source.fetch_schema(base_id).await?;

        let selected: Vec<_> = schema
            .into_iter()
            .filter(|t| selection.matches(&t.name))
            .collect();
        log::info!(
            "Importing {} tables from base {base_id} into workspace {}",
            selected.len(),
            self.workspace_id
        );

        let translated: Vec<_> = selected
            .iter()
            .map(|t| translate_table(t, &self.mapping))
            .collect();

        let document_id = self
            .destination
            .create_document(self.workspace_id, &self.document_name)
            .await?;
        log::info!("Created document {document_id}");

        let table_ids = self
            .destination
            .add_tables(&document_id, &translated)
            .await
            .map_err(|e| e.with_context("document", &document_id))?;
        log::info!("Created tables {table_ids:?}");

        if table_ids.len() != translated.len() {
            return Err(Error::new(
                ErrorKind::Unexpected,
                format!(
                    "requested {} tables but the destination created {}",
                    translated.len(),
                    table_ids.len()
                ),
            )
            .with_context("document", &document_id));
        }

        let mut tables = Vec::with_capacity(selected.len());
        for (table, remote_id) in selected.iter().zip(table_ids.iter()) {
            let outcome = match self.import_records(base_id, table, &document_id, remote_id).await {
                Ok(records) => {
                    log::info!("Imported {records} records into table {remote_id}");
                    TableOutcome::Imported { records }
                }
                Err(e) => {
                    log::warn!("Importing records of table {} failed: {e}", table.name);
                    TableOutcome::Failed(e.with_context("table", &table.name))
                }
            };
            tables.push(TableReport {
                name: table.name.clone(),
                outcome,
            });
        }

        Ok(ImportReport { document_id, tables })
    }

    async fn import_records(
        &self,
        base_id: &str,
        table: &SourceTable,
        document_id: &str,
        remote_table_id: &str,
    ) -> Result<usize> {
        let records = self.source.fetch_records(base_id, &table.id).await?;
        let maps = translate_records(table, records);
        let count = maps.len();

        self.destination
            .add_records(document_id, remote_table_id, maps)
            .await?;
        Ok(count)
    }
}
