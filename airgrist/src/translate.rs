//! translate module provides the conversion from the source schema model
//! to the destination schema model, and the matching record conversion.
//!
//! Schema translation is a pure function: the same source table always
//! yields the same destination table. Record translation renames record
//! keys from source field names to field ids so that pushed values line
//! up with the columns created from the same schema.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::Map;
use serde_json::Value;

use crate::types::DestinationColumn;
use crate::types::DestinationField;
use crate::types::DestinationFieldType;
use crate::types::DestinationTable;
use crate::types::Record;
use crate::types::SourceTable;

lazy_static! {
    // Documented source types with a faithful destination counterpart.
    // Everything absent from this table degrades to Any.
    static ref STANDARD_RULES: HashMap<&'static str, DestinationFieldType> = {
        let mut m = HashMap::new();
        m.insert("singleLineText", DestinationFieldType::Text);
        m.insert("multilineText", DestinationFieldType::Text);
        m.insert("richText", DestinationFieldType::Text);
        m.insert("email", DestinationFieldType::Text);
        m.insert("url", DestinationFieldType::Text);
        m.insert("phoneNumber", DestinationFieldType::Text);
        m.insert("barcode", DestinationFieldType::Text);
        m.insert("number", DestinationFieldType::Numeric);
        m.insert("currency", DestinationFieldType::Numeric);
        m.insert("percent", DestinationFieldType::Numeric);
        m.insert("duration", DestinationFieldType::Numeric);
        m.insert("rating", DestinationFieldType::Int);
        m.insert("count", DestinationFieldType::Int);
        m.insert("autoNumber", DestinationFieldType::Int);
        m.insert("checkbox", DestinationFieldType::Bool);
        m.insert("date", DestinationFieldType::Date);
        m.insert("dateTime", DestinationFieldType::DateTime);
        m.insert("createdTime", DestinationFieldType::DateTime);
        m.insert("lastModifiedTime", DestinationFieldType::DateTime);
        m.insert("singleSelect", DestinationFieldType::Choice);
        m.insert("multipleSelects", DestinationFieldType::ChoiceList);
        m
    };
}

/// The rule set used to map source field types to destination column
/// types.
///
/// Lookup is total: a type without a rule resolves to
/// [`DestinationFieldType::Any`] so that an import never aborts solely
/// because of an unmapped type. The empty rule set types every imported
/// column as `Any` and is the default.
#[derive(Debug, Clone, Default)]
pub struct TypeMapping {
    rules: HashMap<&'static str, DestinationFieldType>,
}

impl TypeMapping {
    /// The rule set that maps nothing: every source type becomes `Any`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rule set carrying the documented source-to-destination type
    /// rules.
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_RULES.clone(),
        }
    }

    /// Resolve a source type name to a destination column type. Never
    /// fails: unknown names resolve to `Any`.
    pub fn resolve(&self, source_type: &str) -> DestinationFieldType {
        self.rules
            .get(source_type)
            .copied()
            .unwrap_or(DestinationFieldType::Any)
    }
}

/// Translate a source table schema into a destination table schema.
///
/// The destination table id is the source table *name* (the destination
/// uses it as the display name). Each source field becomes one column in
/// the original order, reusing the source field id as the column id and
/// the field name as the label. Nothing is filtered, reordered or
/// deduplicated: two source fields sharing a name become two columns
/// distinguished by id.
pub fn translate_table(table: &SourceTable, mapping: &TypeMapping) -> DestinationTable {
    let columns = table
        .fields
        .iter()
        .map(|field| DestinationColumn {
            id: field.id.clone(),
            field: DestinationField {
                label: field.name.clone(),
                field_type: mapping.resolve(&field.field_type),
            },
        })
        .collect();

    DestinationTable {
        id: table.name.clone(),
        columns,
    }
}

/// Translate source records into the field maps the destination record
/// push expects.
///
/// Record keys are renamed from source field *name* to field *id*, the
/// ids [`translate_table`] used as column ids, so the destination can
/// match values to columns. Keys that already equal a field id pass
/// through unchanged; keys matching neither a name nor an id are
/// dropped. Sparse records stay sparse: a missing field stays missing
/// rather than becoming an explicit null. Record order is preserved.
pub fn translate_records(table: &SourceTable, records: Vec<Record>) -> Vec<Map<String, Value>> {
    let name_to_id: HashMap<&str, &str> = table
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.id.as_str()))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let mut fields = Map::with_capacity(record.fields.len());
            for (key, value) in record.fields {
                if let Some(id) = name_to_id.get(key.as_str()) {
                    fields.insert(id.to_string(), value);
                } else if table.field_by_id(&key).is_some() {
                    fields.insert(key, value);
                }
            }
            fields
        })
        .collect()
}
