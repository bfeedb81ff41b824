//! in_memory module provides the definition of the in-memory schema and
//! record models for both sides of an import.
//!
//! Source types model what the Airtable metadata API returns for a base;
//! destination types model what the Grist table-creation API accepts.
//! Source values are created fresh from a schema fetch and never mutated.

use std::fmt::{Display, Formatter};

use serde_json::Map;
use serde_json::Value;

/// One column of a source table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceField {
    /// Field id, unique within the base (e.g. `fldX8...`).
    pub id: String,
    /// Human-readable field name, shown as the column header.
    pub name: String,
    /// Source type name as reported by the API (e.g. `singleLineText`).
    ///
    /// Kept as a plain string: the source's type vocabulary is open-ended
    /// and unknown names must still translate (they degrade to `Any`).
    pub field_type: String,
    /// Optional field description.
    pub description: Option<String>,
    /// Link options, present only for cross-table link fields.
    pub options: Option<LinkOptions>,
}

impl SourceField {
    /// Create a field with just id, name and type, the common case in
    /// tests and fixtures.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type: field_type.into(),
            description: None,
            options: None,
        }
    }
}

/// Options attached to a cross-table link field.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct LinkOptions {
    /// Id of the symmetric link field in the linked table.
    pub inverse_link_field_id: Option<String>,
    /// Whether the link is the reversed side of the relationship.
    pub is_reversed: bool,
    /// Id of the linked table.
    pub linked_table_id: Option<String>,
    /// Whether the link is restricted to a single record.
    pub prefers_single_record_link: Option<bool>,
}

/// One view of a source table.
///
/// Views are carried through from the schema fetch but translation does
/// not consume them.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceView {
    /// View id.
    pub id: String,
    /// View name.
    pub name: String,
    /// View type (e.g. `grid`).
    pub view_type: String,
}

/// One table of a source base.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SourceTable {
    /// Table id (e.g. `tblY9...`).
    pub id: String,
    /// Human-readable table name.
    pub name: String,
    /// Optional table description.
    pub description: Option<String>,
    /// Id of the primary field, always present in `fields`.
    pub primary_field_id: String,
    /// Fields in the order the source API reports them.
    pub fields: Vec<SourceField>,
    /// Views in the order the source API reports them.
    pub views: Vec<SourceView>,
}

impl SourceTable {
    /// Look up a field by id.
    pub fn field_by_id(&self, id: &str) -> Option<&SourceField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// One record (row) of a source table.
///
/// The field map is schema-less: keys are source field names (or ids)
/// and values are arbitrary JSON, passed through verbatim.
#[derive(Debug, PartialEq, Clone)]
pub struct Record {
    /// Record id assigned by the source service.
    pub id: String,
    /// Field values keyed by field name. Sparse: absent fields are
    /// simply missing, not null.
    pub fields: Map<String, Value>,
}

/// Column types accepted by the destination API.
///
/// The set is closed; source types without an explicit mapping rule
/// degrade to [`DestinationFieldType::Any`] so an import never aborts
/// solely because of an unmapped type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DestinationFieldType {
    /// Plain text.
    Text,
    /// Floating point number.
    Numeric,
    /// Integer.
    Int,
    /// Toggle (boolean).
    Bool,
    /// Calendar date.
    Date,
    /// Date with time of day.
    DateTime,
    /// Single choice from a fixed list.
    Choice,
    /// Multiple choices from a fixed list.
    ChoiceList,
    /// Untyped, accepts any value. The degradation target for source
    /// types without a mapping rule.
    Any,
}

impl DestinationFieldType {
    /// Returns the type name the destination API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationFieldType::Text => "Text",
            DestinationFieldType::Numeric => "Numeric",
            DestinationFieldType::Int => "Int",
            DestinationFieldType::Bool => "Bool",
            DestinationFieldType::Date => "Date",
            DestinationFieldType::DateTime => "DateTime",
            DestinationFieldType::Choice => "Choice",
            DestinationFieldType::ChoiceList => "ChoiceList",
            DestinationFieldType::Any => "Any",
        }
    }
}

impl Display for DestinationFieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The typed part of a destination column.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DestinationField {
    /// Column header shown to users.
    pub label: String,
    /// Column type.
    pub field_type: DestinationFieldType,
}

/// One column of a destination table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DestinationColumn {
    /// Column id. Translation reuses the source field id here, which
    /// keeps ids unique within a table and lets records reference their
    /// columns without a separate lookup.
    pub id: String,
    /// Label and type of the column.
    pub field: DestinationField,
}

/// One table to be created on the destination side.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DestinationTable {
    /// Requested table id, which is its display name. The destination
    /// service may rename on collision; the authoritative id comes back
    /// from the table-creation call.
    pub id: String,
    /// Columns in source field order.
    pub columns: Vec<DestinationColumn>,
}
