//! Grist destination client implementation.
//!

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Request};
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use urlencoding::encode;

use self::_models::{AddRecordsRequest, AddTablesRequest, AddTablesResponse, CreateDocRequest};
use super::DestinationClient;
use super::REQUEST_TIMEOUT;
use crate::config::GristConfig;
use crate::error::Result;
use crate::types::DestinationTable;
use crate::{Error, ErrorKind};

/// Grist REST client.
///
/// Holds no state beyond fixed credentials; every call is one outbound
/// request with no retry.
pub struct GristClient {
    endpoints: Endpoint,
    rest_client: Client,
}

#[async_trait]
impl DestinationClient for GristClient {
    /// Create a document in a workspace, returning its id.
    async fn create_document(&self, workspace_id: i64, document_name: &str) -> Result<String> {
        let request = self
            .rest_client
            .post(self.endpoints.docs(workspace_id))
            .json(&CreateDocRequest {
                name: document_name,
            })
            .build()?;

        // The response body is the bare document id as a json string.
        self.execute_request::<String>(request).await
    }

    /// Create tables in a document in one batched call, returning the
    /// authoritative remote table ids in input order.
    async fn add_tables(
        &self,
        document_id: &str,
        tables: &[DestinationTable],
    ) -> Result<Vec<String>> {
        let request = self
            .rest_client
            .post(self.endpoints.tables(document_id))
            .json(&AddTablesRequest::from(tables))
            .build()?;

        let resp = self.execute_request::<AddTablesResponse>(request).await?;
        Ok(resp.tables.into_iter().map(|t| t.id).collect())
    }

    /// Append records to a table, each wrapped under a `fields` key.
    async fn add_records(
        &self,
        document_id: &str,
        table_id: &str,
        records: Vec<Map<String, Value>>,
    ) -> Result<()> {
        let request = self
            .rest_client
            .post(self.endpoints.records(document_id, table_id))
            .json(&AddRecordsRequest::wrap(records))
            .build()?;

        // Success carries no meaningful body.
        self.execute_request::<Value>(request).await?;
        Ok(())
    }
}

impl GristClient {
    /// Creates a Grist client from its configuration.
    pub fn new(config: GristConfig) -> Result<Self> {
        let endpoints = Endpoint::new(config.api_url);
        let rest_client = create_rest_client(&config.api_key)?;

        Ok(Self {
            endpoints,
            rest_client,
        })
    }

    async fn execute_request<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        log::debug!("Executing request: {request:?}");

        let resp = self.rest_client.execute(request).await?;
        let status = resp.status();

        if status.is_success() {
            let text = resp.text().await?;
            log::debug!("Response text is: {text}");
            Ok(serde_json::from_slice::<T>(text.as_bytes())?)
        } else {
            let text = resp.text().await?;
            Err(Error::new(
                ErrorKind::RemoteFailed,
                format!("Grist request failed, status code: {status}, message: {text}"),
            )
            .with_context("status", status.as_str()))
        }
    }
}

fn create_rest_client(api_key: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
        Error::new(ErrorKind::ConfigInvalid, "api key is not a valid header value").set_source(e)
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(ClientBuilder::new()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

struct Endpoint {
    base: String,
}

impl Endpoint {
    fn new(base: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn docs(&self, workspace_id: i64) -> String {
        [
            self.base.as_str(),
            "api",
            "workspaces",
            &workspace_id.to_string(),
            "docs",
        ]
        .join("/")
    }

    fn tables(&self, document_id: &str) -> String {
        [
            self.base.as_str(),
            "api",
            "docs",
            encode(document_id).as_ref(),
            "tables",
        ]
        .join("/")
    }

    fn records(&self, document_id: &str, table_id: &str) -> String {
        [
            self.base.as_str(),
            "api",
            "docs",
            encode(document_id).as_ref(),
            "tables",
            encode(table_id).as_ref(),
            "records",
        ]
        .join("/")
    }
}

mod _models {
    use serde::{Deserialize, Serialize};
    use serde_json::Map;
    use serde_json::Value;

    use crate::types::{DestinationColumn, DestinationTable};

    #[derive(Serialize)]
    pub(super) struct CreateDocRequest<'a> {
        pub(super) name: &'a str,
    }

    #[derive(Serialize)]
    pub(super) struct AddTablesRequest<'a> {
        pub(super) tables: Vec<TableSpec<'a>>,
    }

    impl<'a> From<&'a [DestinationTable]> for AddTablesRequest<'a> {
        fn from(value: &'a [DestinationTable]) -> Self {
            Self {
                tables: value.iter().map(TableSpec::from).collect(),
            }
        }
    }

    #[derive(Serialize)]
    pub(super) struct TableSpec<'a> {
        pub(super) id: &'a str,
        pub(super) columns: Vec<ColumnSpec<'a>>,
    }

    impl<'a> From<&'a DestinationTable> for TableSpec<'a> {
        fn from(value: &'a DestinationTable) -> Self {
            Self {
                id: &value.id,
                columns: value.columns.iter().map(ColumnSpec::from).collect(),
            }
        }
    }

    #[derive(Serialize)]
    pub(super) struct ColumnSpec<'a> {
        pub(super) id: &'a str,
        // The key is "fields" in the remote API even though it holds a
        // single object, not a list.
        pub(super) fields: FieldSpec<'a>,
    }

    impl<'a> From<&'a DestinationColumn> for ColumnSpec<'a> {
        fn from(value: &'a DestinationColumn) -> Self {
            Self {
                id: &value.id,
                fields: FieldSpec {
                    label: &value.field.label,
                    r#type: value.field.field_type.as_str(),
                },
            }
        }
    }

    #[derive(Serialize)]
    pub(super) struct FieldSpec<'a> {
        pub(super) label: &'a str,
        pub(super) r#type: &'static str,
    }

    #[derive(Deserialize)]
    pub(super) struct AddTablesResponse {
        pub(super) tables: Vec<CreatedTable>,
    }

    #[derive(Deserialize)]
    pub(super) struct CreatedTable {
        pub(super) id: String,
    }

    #[derive(Serialize)]
    pub(super) struct AddRecordsRequest {
        pub(super) records: Vec<NewRecord>,
    }

    impl AddRecordsRequest {
        /// Wrap each field map under the `fields` envelope the record
        /// API expects.
        pub(super) fn wrap(records: Vec<Map<String, Value>>) -> Self {
            Self {
                records: records
                    .into_iter()
                    .map(|fields| NewRecord { fields })
                    .collect(),
            }
        }
    }

    #[derive(Serialize)]
    pub(super) struct NewRecord {
        pub(super) fields: Map<String, Value>,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{DestinationColumn, DestinationField, DestinationFieldType};

    #[test]
    fn test_endpoint_urls() {
        let endpoint = Endpoint::new("https://grist.example.org/".to_string());

        assert_eq!(
            endpoint.docs(146993),
            "https://grist.example.org/api/workspaces/146993/docs"
        );
        assert_eq!(
            endpoint.tables("j3kSao7evLmt"),
            "https://grist.example.org/api/docs/j3kSao7evLmt/tables"
        );
        assert_eq!(
            endpoint.records("j3kSao7evLmt", "Participants"),
            "https://grist.example.org/api/docs/j3kSao7evLmt/tables/Participants/records"
        );
    }

    #[test]
    fn test_add_tables_request_serialization() {
        let tables = vec![DestinationTable {
            id: "Participants".to_string(),
            columns: vec![
                DestinationColumn {
                    id: "nom".to_string(),
                    field: DestinationField {
                        label: "Nom".to_string(),
                        field_type: DestinationFieldType::Text,
                    },
                },
                DestinationColumn {
                    id: "age".to_string(),
                    field: DestinationField {
                        label: "Âge".to_string(),
                        field_type: DestinationFieldType::Int,
                    },
                },
            ],
        }];

        let payload = serde_json::to_value(AddTablesRequest::from(tables.as_slice())).unwrap();
        assert_eq!(
            payload,
            json!({
                "tables": [{
                    "id": "Participants",
                    "columns": [
                        {"id": "nom", "fields": {"label": "Nom", "type": "Text"}},
                        {"id": "age", "fields": {"label": "Âge", "type": "Int"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_add_records_request_wraps_under_fields() {
        let record = json!({"nom": "Julien", "age": 28});
        let Value::Object(fields) = record else {
            panic!("fixture must be a json object")
        };

        let payload = serde_json::to_value(AddRecordsRequest::wrap(vec![fields])).unwrap();
        assert_eq!(
            payload,
            json!({"records": [{"fields": {"nom": "Julien", "age": 28}}]})
        );
    }
}
