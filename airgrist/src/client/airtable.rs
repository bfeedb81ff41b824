//! Airtable source client implementation.
//!

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Request};
use urlencoding::encode;

use super::SourceClient;
use super::REQUEST_TIMEOUT;
use crate::config::AirtableConfig;
use crate::error::Result;
use crate::types::{parse_base_schema, parse_records, Record, SourceTable};
use crate::{Error, ErrorKind};

const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Airtable REST client.
///
/// Holds no state beyond fixed credentials; every call is one outbound
/// request with no retry.
pub struct AirtableClient {
    endpoints: Endpoint,
    rest_client: Client,
}

#[async_trait]
impl SourceClient for AirtableClient {
    /// Fetch the schema of every table in a base.
    async fn fetch_schema(&self, base_id: &str) -> Result<Vec<SourceTable>> {
        let request = self.rest_client.get(self.endpoints.tables(base_id)).build()?;
        let body = self.execute_request(request).await?;
        parse_base_schema(&body)
    }

    /// Fetch the records of one table.
    async fn fetch_records(&self, base_id: &str, table_id: &str) -> Result<Vec<Record>> {
        let request = self
            .rest_client
            .get(self.endpoints.records(base_id, table_id))
            .build()?;
        let body = self.execute_request(request).await?;
        parse_records(&body)
    }
}

impl AirtableClient {
    /// Creates an Airtable client from its configuration.
    pub fn new(config: AirtableConfig) -> Result<Self> {
        let endpoints = Endpoint::new(DEFAULT_API_URL.to_string());
        let rest_client = create_rest_client(&config.api_key)?;

        Ok(Self {
            endpoints,
            rest_client,
        })
    }

    async fn execute_request(&self, request: Request) -> Result<Vec<u8>> {
        log::debug!("Executing request: {request:?}");

        let resp = self.rest_client.execute(request).await?;
        let status = resp.status();

        if status.is_success() {
            let text = resp.text().await?;
            log::debug!("Response text is: {text}");
            Ok(text.into_bytes())
        } else {
            let text = resp.text().await?;
            Err(Error::new(
                ErrorKind::RemoteFailed,
                format!("Airtable request failed, status code: {status}, message: {text}"),
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
        Self { base }
    }

    fn tables(&self, base_id: &str) -> String {
        [
            self.base.as_str(),
            "meta",
            "bases",
            encode(base_id).as_ref(),
            "tables",
        ]
        .join("/")
    }

    fn records(&self, base_id: &str, table_id: &str) -> String {
        [
            self.base.as_str(),
            encode(base_id).as_ref(),
            encode(table_id).as_ref(),
        ]
        .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_tables() {
        let endpoint = Endpoint::new(DEFAULT_API_URL.to_string());
        assert_eq!(
            endpoint.tables("appkYowYfmnc53Xn2"),
            "https://api.airtable.com/v0/meta/bases/appkYowYfmnc53Xn2/tables"
        );
    }

    #[test]
    fn test_endpoint_records() {
        let endpoint = Endpoint::new(DEFAULT_API_URL.to_string());
        assert_eq!(
            endpoint.records("appkYowYfmnc53Xn2", "tblX"),
            "https://api.airtable.com/v0/appkYowYfmnc53Xn2/tblX"
        );
    }
}
