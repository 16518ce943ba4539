//! Jamf Pro API client
//!
//! Implements [`RecordSource`] over the Jamf Pro and Classic APIs using
//! OAuth2 client credentials. One token is shared by all workers and renewed
//! shortly before it expires. No retries are attempted.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::error::{ExportError, ExportResult};
use super::fetcher::RecordSource;
use super::registry::{FetchOperation, ResourceKind};

const TOKEN_PATH: &str = "/api/oauth/token";
const COMPUTER_GROUPS_PATH: &str = "/JSSResource/computergroups";
const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 200;

/// Tenant connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamfConfig {
    /// `scheme://host[:port]` without trailing slash
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl JamfConfig {
    pub fn new(url: &str, client_id: &str, client_secret: &str) -> ExportResult<Self> {
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(ExportError::InvalidInput(
                "client id and client secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            base_url: normalize_base_url(url)?,
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

/// Accept `tenant.jamfcloud.com`, `https://tenant.jamfcloud.com/` and similar
pub fn normalize_base_url(raw: &str) -> ExportResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExportError::InvalidInput("tenant URL is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ExportError::InvalidInput(format!("invalid tenant URL '{}': {}", raw, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ExportError::InvalidInput(format!(
            "unsupported scheme '{}' in tenant URL",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ExportError::InvalidInput(format!("tenant URL '{}' has no host", raw)))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct Page {
    #[serde(rename = "totalCount")]
    total_count: usize,
    results: Vec<Value>,
}

/// Blocking Jamf Pro client
pub struct JamfClient {
    config: JamfConfig,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

impl JamfClient {
    pub fn new(config: JamfConfig) -> ExportResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ExportError::InvalidInput(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Current bearer token, requesting a new one when missing or about to expire
    fn bearer_token(&self) -> ExportResult<String> {
        let mut cached = self.token.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(token) = cached.as_ref()
            && !needs_refresh(token.expires_at, Instant::now())
        {
            return Ok(token.value.clone());
        }

        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .map_err(|e| ExportError::Authentication(format!("token request failed: {}", e)))?;

        let body = read_body(TOKEN_PATH, response)?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ExportError::Authentication(format!("malformed token response: {}", e))
        })?;

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> ExportResult<String> {
        let token = self.bearer_token()?;

        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(|e| ExportError::ProviderApi {
                path: path.to_string(),
                status: 0,
                message: e.to_string(),
            })?;

        read_body(path, response)
    }

    fn list_paged(&self, path: &str) -> ExportResult<Vec<Value>> {
        collect_pages(PAGE_SIZE, |page| {
            let body = self.get(
                path,
                &[
                    ("page", page.to_string()),
                    ("page-size", PAGE_SIZE.to_string()),
                    ("sort", "id:asc".to_string()),
                ],
            )?;
            parse_page(path, &body)
        })
    }

    fn list_classic(&self, path: &str, collection: &str) -> ExportResult<Vec<Value>> {
        let body = self.get(path, &[])?;
        parse_classic_collection(path, collection, &body)
    }

    fn list_computer_groups(&self, smart: bool) -> ExportResult<Vec<Value>> {
        let groups = self.list_classic(COMPUTER_GROUPS_PATH, "computer_groups")?;
        Ok(filter_computer_groups(groups, smart))
    }
}

impl RecordSource for JamfClient {
    fn list_records(&self, kind: ResourceKind) -> ExportResult<Vec<Value>> {
        match kind.operation() {
            FetchOperation::Paged { path } => self.list_paged(path),
            FetchOperation::Classic { path, collection } => self.list_classic(path, collection),
            FetchOperation::ComputerGroups { smart } => self.list_computer_groups(smart),
        }
    }
}

/// A token is renewed once it is within the refresh margin of expiring
fn needs_refresh(expires_at: Instant, now: Instant) -> bool {
    now + TOKEN_REFRESH_MARGIN >= expires_at
}

/// Request pages `0, 1, ...` until `totalCount` records are collected or a
/// short page shows the listing is exhausted.
fn collect_pages<F>(page_size: usize, mut fetch_page: F) -> ExportResult<Vec<Value>>
where
    F: FnMut(usize) -> ExportResult<(Vec<Value>, usize)>,
{
    let mut records = Vec::new();
    let mut page = 0;

    loop {
        let (results, total) = fetch_page(page)?;
        let received = results.len();
        records.extend(results);

        if received < page_size || records.len() >= total {
            return Ok(records);
        }
        page += 1;
    }
}

fn read_body(path: &str, response: Response) -> ExportResult<String> {
    let status = response.status();
    let body = response.text().map_err(|e| ExportError::ProviderApi {
        path: path.to_string(),
        status: status.as_u16(),
        message: format!("cannot read response body: {}", e),
    })?;

    if status.is_success() {
        return Ok(body);
    }

    let snippet: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(ExportError::Authentication(format!(
            "'{}' returned {}",
            path, status
        )));
    }

    Err(ExportError::ProviderApi {
        path: path.to_string(),
        status: status.as_u16(),
        message: snippet,
    })
}

/// Parse a Jamf Pro API page into `(results, totalCount)`
fn parse_page(path: &str, body: &str) -> ExportResult<(Vec<Value>, usize)> {
    let page: Page = serde_json::from_str(body).map_err(|e| ExportError::UnexpectedResponse {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok((page.results, page.total_count))
}

/// Extract the named array from a Classic API list response
fn parse_classic_collection(path: &str, collection: &str, body: &str) -> ExportResult<Vec<Value>> {
    let value: Value = serde_json::from_str(body).map_err(|e| ExportError::UnexpectedResponse {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    match value.get(collection) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Null) | None => Err(ExportError::UnexpectedResponse {
            path: path.to_string(),
            message: format!("missing '{}' collection", collection),
        }),
        Some(other) => Err(ExportError::UnexpectedResponse {
            path: path.to_string(),
            message: format!("'{}' is not an array: {}", collection, other),
        }),
    }
}

fn filter_computer_groups(groups: Vec<Value>, smart: bool) -> Vec<Value> {
    groups
        .into_iter()
        .filter(|group| group.get("is_smart").and_then(Value::as_bool).unwrap_or(false) == smart)
        .collect()
}
