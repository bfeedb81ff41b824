//! wire module provides parsing of source API payloads into the
//! in-memory model.
//!
//! Payloads are deserialized into private serde structs first and then
//! converted with `TryFrom`, so that validation happens once at the
//! client boundary and the rest of the crate can trust the model.

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::types;
use crate::Error;
use crate::ErrorKind;
use crate::Result;

/// Parse a base schema payload (`{"tables": [...]}`) from json bytes.
pub fn parse_base_schema(bs: &[u8]) -> Result<Vec<types::SourceTable>> {
    let t: BaseSchema = serde_json::from_slice(bs)
        .map_err(|e| Error::new(ErrorKind::SchemaInvalid, "base schema is not valid json").set_source(e))?;
    t.tables
        .into_iter()
        .map(types::SourceTable::try_from)
        .collect()
}

/// Parse a record page payload (`{"records": [...]}`) from json bytes.
pub fn parse_records(bs: &[u8]) -> Result<Vec<types::Record>> {
    let t: RecordPage = serde_json::from_slice(bs)
        .map_err(|e| Error::new(ErrorKind::SchemaInvalid, "record page is not valid json").set_source(e))?;
    Ok(t.records.into_iter().map(types::Record::from).collect())
}

#[derive(Deserialize)]
struct BaseSchema {
    tables: Vec<Table>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    primary_field_id: String,
    fields: Vec<Field>,
    #[serde(default)]
    views: Vec<View>,
}

impl TryFrom<Table> for types::SourceTable {
    type Error = Error;

    fn try_from(v: Table) -> Result<Self> {
        if !v.fields.iter().any(|f| f.id == v.primary_field_id) {
            return Err(Error::new(
                ErrorKind::SchemaInvalid,
                format!(
                    "primary field {} is not a field of table {}",
                    v.primary_field_id, v.id
                ),
            )
            .with_context("table", &v.name));
        }

        for (i, field) in v.fields.iter().enumerate() {
            if v.fields[..i].iter().any(|f| f.id == field.id) {
                return Err(Error::new(
                    ErrorKind::SchemaInvalid,
                    format!("duplicated field id {} in table {}", field.id, v.id),
                )
                .with_context("table", &v.name));
            }
        }

        Ok(types::SourceTable {
            id: v.id,
            name: v.name,
            description: v.description,
            primary_field_id: v.primary_field_id,
            fields: v.fields.into_iter().map(types::SourceField::from).collect(),
            views: v.views.into_iter().map(types::SourceView::from).collect(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    id: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    options: Option<LinkOptions>,
}

impl From<Field> for types::SourceField {
    fn from(v: Field) -> Self {
        Self {
            id: v.id,
            name: v.name,
            field_type: v.field_type,
            description: v.description,
            options: v.options.map(types::LinkOptions::from),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkOptions {
    #[serde(default)]
    inverse_link_field_id: Option<String>,
    #[serde(default)]
    is_reversed: bool,
    #[serde(default)]
    linked_table_id: Option<String>,
    #[serde(default)]
    prefers_single_record_link: Option<bool>,
}

impl From<LinkOptions> for types::LinkOptions {
    fn from(v: LinkOptions) -> Self {
        Self {
            inverse_link_field_id: v.inverse_link_field_id,
            is_reversed: v.is_reversed,
            linked_table_id: v.linked_table_id,
            prefers_single_record_link: v.prefers_single_record_link,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct View {
    id: String,
    name: String,
    #[serde(rename = "type")]
    view_type: String,
}

impl From<View> for types::SourceView {
    fn from(v: View) -> Self {
        Self {
            id: v.id,
            name: v.name,
            view_type: v.view_type,
        }
    }
}

#[derive(Deserialize)]
struct RecordPage {
    records: Vec<WireRecord>,
}

#[derive(Deserialize)]
struct WireRecord {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl From<WireRecord> for types::Record {
    fn from(v: WireRecord) -> Self {
        Self {
            id: v.id,
            fields: v.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceField, SourceTable, SourceView};

    fn check_base_schema_conversion(json: &str, expected_tables: Vec<SourceTable>) {
        let parsed = parse_base_schema(json.as_bytes()).unwrap();
        assert_eq!(parsed, expected_tables);
    }

    #[test]
    fn test_parse_base_schema() {
        let json = r#"
{
    "tables": [
        {
            "id": "tblX",
            "name": "Participants",
            "primaryFieldId": "fld1",
            "fields": [
                {"id": "fld1", "name": "nom", "type": "singleLineText"},
                {"id": "fld2", "name": "age", "type": "number", "description": "years"}
            ],
            "views": [
                {"id": "viw1", "name": "Grid view", "type": "grid"}
            ]
        }
    ]
}
        "#;

        check_base_schema_conversion(
            json,
            vec![SourceTable {
                id: "tblX".to_string(),
                name: "Participants".to_string(),
                description: None,
                primary_field_id: "fld1".to_string(),
                fields: vec![
                    SourceField::new("fld1", "nom", "singleLineText"),
                    SourceField {
                        description: Some("years".to_string()),
                        ..SourceField::new("fld2", "age", "number")
                    },
                ],
                views: vec![SourceView {
                    id: "viw1".to_string(),
                    name: "Grid view".to_string(),
                    view_type: "grid".to_string(),
                }],
            }],
        );
    }

    #[test]
    fn test_parse_link_options() {
        let json = r#"
{
    "tables": [
        {
            "id": "tblX",
            "name": "Tasks",
            "primaryFieldId": "fld1",
            "fields": [
                {"id": "fld1", "name": "title", "type": "singleLineText"},
                {
                    "id": "fld2",
                    "name": "owner",
                    "type": "multipleRecordLinks",
                    "options": {
                        "linkedTableId": "tblY",
                        "isReversed": false,
                        "prefersSingleRecordLink": true
                    }
                }
            ],
            "views": []
        }
    ]
}
        "#;

        let tables = parse_base_schema(json.as_bytes()).unwrap();
        let options = tables[0].fields[1].options.as_ref().unwrap();
        assert_eq!(options.linked_table_id.as_deref(), Some("tblY"));
        assert!(!options.is_reversed);
        assert_eq!(options.prefers_single_record_link, Some(true));
        assert_eq!(options.inverse_link_field_id, None);
    }

    #[test]
    fn test_parse_base_schema_rejects_dangling_primary_field() {
        let json = r#"
{
    "tables": [
        {
            "id": "tblX",
            "name": "Participants",
            "primaryFieldId": "fld9",
            "fields": [
                {"id": "fld1", "name": "nom", "type": "singleLineText"}
            ],
            "views": []
        }
    ]
}
        "#;

        let err = parse_base_schema(json.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SchemaInvalid);
        assert_eq!(err.context("table"), Some("Participants"));
    }

    #[test]
    fn test_parse_base_schema_rejects_duplicated_field_id() {
        let json = r#"
{
    "tables": [
        {
            "id": "tblX",
            "name": "Participants",
            "primaryFieldId": "fld1",
            "fields": [
                {"id": "fld1", "name": "nom", "type": "singleLineText"},
                {"id": "fld1", "name": "age", "type": "number"}
            ],
            "views": []
        }
    ]
}
        "#;

        let err = parse_base_schema(json.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SchemaInvalid);
    }

    #[test]
    fn test_parse_records() {
        let json = r#"
{
    "records": [
        {
            "id": "rec1",
            "createdTime": "2024-03-01T10:00:00.000Z",
            "fields": {"nom": "Julien", "age": 28}
        },
        {
            "id": "rec2",
            "createdTime": "2024-03-01T10:01:00.000Z",
            "fields": {"nom": "Milo"}
        }
    ]
}
        "#;

        let records = parse_records(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "rec1");
        assert_eq!(records[0].fields["age"], serde_json::json!(28));
        // Sparse record: no age key at all.
        assert!(!records[1].fields.contains_key("age"));
    }

    #[test]
    fn test_parse_records_empty_page() {
        let records = parse_records(br#"{"records": []}"#).unwrap();
        assert!(records.is_empty());
    }
}
