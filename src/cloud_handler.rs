// src/cloud_handler.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use google_sheets4::api::ValueRange;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ViewerConfig;
use crate::data_types::Table;
use crate::errors::SheetError;

const USER_AGENT: &str = concat!("sheet_viewer/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const VALUES_GET_PATH: &str = "/spreadsheets/resources/values/methods/get/path";

/// The three calls the viewer makes against the Sheets API.
///
/// Each call consumes the client and hands back the next stage, so a
/// client that failed to initialize can never be asked for data.
pub trait SheetsApi: Clone + Send + Sync + 'static {
    /// Load the client library.
    fn load_client(self) -> impl Future<Output = Result<Self, SheetError>> + Send;

    /// Configure the loaded client with the API key and discovery document.
    fn init_client(
        self,
        config: Arc<ViewerConfig>,
    ) -> impl Future<Output = Result<Self, SheetError>> + Send;

    /// Read `range` of the given spreadsheet.
    fn fetch_range(
        self,
        spreadsheet_id: String,
        range: String,
    ) -> impl Future<Output = Result<Table, SheetError>> + Send;
}

/// Sheets v4 client authenticated with a static API key.
#[derive(Debug, Clone, Default)]
pub struct GoogleSheets {
    http: Option<reqwest::Client>,
    endpoint: Option<ValuesEndpoint>,
}

/// Where `spreadsheets.values.get` lives, as learned from discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValuesEndpoint {
    base: Url,
    path_template: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryDocument {
    name: String,
    version: String,
    root_url: String,
    #[serde(default)]
    service_path: String,
    #[serde(default)]
    resources: Value,
}

impl GoogleSheets {
    pub fn new() -> Self {
        GoogleSheets::default()
    }
}

impl SheetsApi for GoogleSheets {
    fn load_client(self) -> impl Future<Output = Result<Self, SheetError>> + Send {
        async move {
            let http = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(SheetError::client_load)?;

            Ok(GoogleSheets {
                http: Some(http),
                endpoint: None,
            })
        }
    }

    fn init_client(
        self,
        config: Arc<ViewerConfig>,
    ) -> impl Future<Output = Result<Self, SheetError>> + Send {
        async move {
            let http = self
                .http
                .clone()
                .ok_or_else(|| SheetError::client_init("client library not loaded"))?;

            // Request URLs carry the key; errors are stripped of them.
            let document: DiscoveryDocument = http
                .get(&config.discovery_url)
                .query(&[("key", config.api_key.as_str())])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| SheetError::client_init(e.without_url()))?
                .json()
                .await
                .map_err(|e| SheetError::client_init(e.without_url()))?;

            let endpoint = values_endpoint(document, &config.api_key)?;
            tracing::debug!(base = %endpoint.base, path = %endpoint.path_template, "discovery loaded");

            Ok(GoogleSheets {
                http: Some(http),
                endpoint: Some(endpoint),
            })
        }
    }

    fn fetch_range(
        self,
        spreadsheet_id: String,
        range: String,
    ) -> impl Future<Output = Result<Table, SheetError>> + Send {
        async move {
            let (http, endpoint) = match (self.http, self.endpoint) {
                (Some(http), Some(endpoint)) => (http, endpoint),
                _ => return Err(SheetError::fetch("client not initialized")),
            };

            let url = expand_path(
                &endpoint.base,
                &endpoint.path_template,
                &spreadsheet_id,
                &range,
            )
            .map_err(SheetError::fetch)?;

            let response: ValueRange = http
                .get(url)
                .query(&[("key", endpoint.api_key.as_str())])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| SheetError::fetch(e.without_url()))?
                .json()
                .await
                .map_err(|e| SheetError::fetch(e.without_url()))?;

            Ok(Table::from(response))
        }
    }
}

fn values_endpoint(document: DiscoveryDocument, api_key: &str) -> Result<ValuesEndpoint, SheetError> {
    if document.name != "sheets" || document.version != "v4" {
        return Err(SheetError::client_init(format!(
            "unexpected discovery document {} {}",
            document.name, document.version
        )));
    }

    let base = Url::parse(&format!("{}{}", document.root_url, document.service_path))
        .map_err(SheetError::client_init)?;
    if base.cannot_be_a_base() {
        return Err(SheetError::client_init(format!("unusable root url {base}")));
    }

    let path_template = document
        .resources
        .pointer(VALUES_GET_PATH)
        .and_then(Value::as_str)
        .ok_or_else(|| SheetError::client_init("discovery document lacks spreadsheets.values.get"))?
        .to_string();

    Ok(ValuesEndpoint {
        base,
        path_template,
        api_key: api_key.to_string(),
    })
}

/// Substitute the path template's placeholders, one percent-encoded segment each.
fn expand_path(
    base: &Url,
    template: &str,
    spreadsheet_id: &str,
    range: &str,
) -> Result<Url, String> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("cannot append a path to {base}"))?;
        segments.pop_if_empty();
        for part in template.split('/').filter(|p| !p.is_empty()) {
            let segment = match part {
                "{spreadsheetId}" => spreadsheet_id,
                "{range}" | "{+range}" => range,
                p if p.starts_with('{') => return Err(format!("unknown placeholder {p}")),
                p => p,
            };
            segments.push(segment);
        }
    }
    Ok(url)
}
