//! Google Sheets backend.
//!
//! Talks to the Sheets v4 and Drive v3 REST APIs with a blocking HTTP client.
//! Authentication uses the service-account flow: a JWT signed with the key's
//! private key is exchanged at the key's `token_uri` for a bearer token.
//!
//! Error classification:
//! - unparseable key JSON, bad private key, spreadsheet not found or not shared
//!   with the service account → `StoreError::Configuration`
//! - token exchange refused, network error, timeout, non-2xx status (including
//!   quota) → `StoreError::Remote`
//!
//! `REQUEST_TIMEOUT` bounds each HTTP request, not a whole save. Opening a
//! worksheet and appending takes four requests (Drive lookup, sheet title,
//! header read, append), plus a token exchange when no cached access token
//! is valid, so a save against a hanging backend can take a few multiples of
//! the timeout. The circuit breaker in front of this backend keeps that from
//! repeating for every submitter.
//!
//! Access tokens are cached until shortly before Google says they expire, and
//! dropped early if any call answers 401.

use crate::application::ports::{SheetBackend, Worksheet};
use crate::domain::storage::StoreError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Cached tokens are refreshed this long before they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
/// Longest response-body excerpt kept in an error message
const ERROR_BODY_CHARS: usize = 200;

/// The fields of a service-account key file this backend uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| {
            StoreError::Configuration(format!("invalid service account JSON: {e}"))
        })
    }

    /// Sign the JWT assertion sent to the token endpoint.
    fn assertion(&self) -> Result<String, StoreError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| StoreError::Configuration(format!("invalid private key: {e}")))?;
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Configuration(format!("failed to sign assertion: {e}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

struct CachedToken {
    client_email: String,
    token_uri: String,
    access_token: String,
    expires_at: Instant,
}

/// Access token shared by a backend and the worksheets it opens.
#[derive(Clone, Default)]
struct TokenCache {
    inner: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    fn get(&self, key: &ServiceAccountKey) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|cached| {
                cached.client_email == key.client_email
                    && cached.token_uri == key.token_uri
                    && Instant::now() < cached.expires_at
            })
            .map(|cached| cached.access_token.clone())
    }

    fn store(&self, key: &ServiceAccountKey, access_token: &str, expires_in: u64) {
        let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        *self.lock() = Some(CachedToken {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            access_token: access_token.to_string(),
            expires_at: Instant::now() + lifetime,
        });
    }

    fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Tokens stay out of logs
impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("cached", &self.lock().is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

/// Google Sheets implementation of [`SheetBackend`].
#[derive(Debug, Clone)]
pub struct GoogleSheetsBackend {
    http: Client,
    sheets_api: String,
    drive_api: String,
    tokens: TokenCache,
}

impl GoogleSheetsBackend {
    /// Create a backend whose every HTTP request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            sheets_api: SHEETS_API.to_string(),
            drive_api: DRIVE_API.to_string(),
            tokens: TokenCache::default(),
        })
    }

    /// Point the backend at different API roots.
    pub fn with_endpoints(mut self, sheets_api: &str, drive_api: &str) -> Self {
        self.sheets_api = sheets_api.to_string();
        self.drive_api = drive_api.to_string();
        self
    }

    fn access_token(&self, key: &ServiceAccountKey) -> Result<String, StoreError> {
        if let Some(token) = self.tokens.get(key) {
            return Ok(token);
        }
        let assertion = key.assertion()?;
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(remote("token request"))?;
        let token: TokenResponse = expect_success(response, "token request", &self.tokens)?
            .json()
            .map_err(remote("token response"))?;
        self.tokens.store(key, &token.access_token, token.expires_in);
        Ok(token.access_token)
    }

    fn find_spreadsheet(&self, token: &str, name: &str) -> Result<String, StoreError> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            escape_query(name)
        );
        let url = api_url(&self.drive_api, &["files"])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .map_err(remote("spreadsheet lookup"))?;
        let list: FileList = expect_success(response, "spreadsheet lookup", &self.tokens)?
            .json()
            .map_err(remote("spreadsheet lookup response"))?;

        list.files.into_iter().next().map(|f| f.id).ok_or_else(|| {
            StoreError::Configuration(format!(
                "spreadsheet '{name}' not found or not shared with the service account"
            ))
        })
    }

    fn first_sheet_title(&self, token: &str, spreadsheet_id: &str) -> Result<String, StoreError> {
        let url = api_url(&self.sheets_api, &["spreadsheets", spreadsheet_id])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .map_err(remote("spreadsheet metadata"))?;
        let meta: SpreadsheetMeta = expect_success(response, "spreadsheet metadata", &self.tokens)?
            .json()
            .map_err(remote("spreadsheet metadata response"))?;

        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| StoreError::Remote("spreadsheet has no worksheets".to_string()))
    }
}

impl SheetBackend for GoogleSheetsBackend {
    fn open_worksheet(
        &self,
        credentials_json: &str,
        sheet_name: &str,
    ) -> Result<Box<dyn Worksheet>, StoreError> {
        let key = ServiceAccountKey::from_json(credentials_json)?;
        let token = self.access_token(&key)?;
        let spreadsheet_id = self.find_spreadsheet(&token, sheet_name)?;
        let title = self.first_sheet_title(&token, &spreadsheet_id)?;
        tracing::debug!(sheet = sheet_name, worksheet = %title, "opened worksheet");

        Ok(Box::new(GoogleWorksheet {
            http: self.http.clone(),
            sheets_api: self.sheets_api.clone(),
            tokens: self.tokens.clone(),
            token,
            spreadsheet_id,
            title,
        }))
    }
}

struct GoogleWorksheet {
    http: Client,
    sheets_api: String,
    tokens: TokenCache,
    token: String,
    spreadsheet_id: String,
    title: String,
}

impl GoogleWorksheet {
    fn values_url(&self, range_suffix: &str) -> Result<Url, StoreError> {
        let range = format!("{}{}", a1_range(&self.title), range_suffix);
        api_url(
            &self.sheets_api,
            &["spreadsheets", &self.spreadsheet_id, "values", &range],
        )
    }
}

impl Worksheet for GoogleWorksheet {
    // Empty means the header row is blank
    fn is_empty(&mut self) -> Result<bool, StoreError> {
        let url = self.values_url("")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(remote("header read"))?;
        let range: ValueRange = expect_success(response, "header read", &self.tokens)?
            .json()
            .map_err(remote("header read response"))?;
        Ok(range.values.iter().all(|row| row.is_empty()))
    }

    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError> {
        let url = self.values_url(":append")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&AppendBody { values: [row] })
            .send()
            .map_err(remote("append row"))?;
        expect_success(response, "append row", &self.tokens)?;
        Ok(())
    }
}

fn remote(context: &'static str) -> impl Fn(reqwest::Error) -> StoreError {
    move |err| StoreError::Remote(format!("{context}: {err}"))
}

fn expect_success(
    response: Response,
    context: &str,
    tokens: &TokenCache,
) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        tokens.invalidate();
    }
    let body: String = response
        .text()
        .unwrap_or_default()
        .chars()
        .take(ERROR_BODY_CHARS)
        .collect();
    Err(StoreError::Remote(format!("{context}: HTTP {status}: {body}")))
}

/// Append percent-encoded path segments to an API root.
fn api_url(root: &str, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = Url::parse(root)
        .map_err(|e| StoreError::Configuration(format!("invalid API endpoint {root}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Configuration(format!("invalid API endpoint {root}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Header-row range of a worksheet, quoting the title for A1 notation.
fn a1_range(title: &str) -> String {
    format!("'{}'!A1:H1", title.replace('\'', "''"))
}

/// Escape a value for a single-quoted Drive query string.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
