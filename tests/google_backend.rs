use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;
use thrive_inquiry::infrastructure::spreadsheet::{HEADER, SAVED_MESSAGE};
use thrive_inquiry::{
    GoogleSheetsBackend, InquiryForm, InquiryInput, InquiryStore, Metrics, SheetBackend,
    SiteConfig, SpreadsheetStore, StorageResult,
};

const TEST_KEY: &str = include_str!("fixtures/service_account_key.pem");
const TOKEN: &str = "ya29.test-token";
const BEARER: &str = "Bearer ya29.test-token";
const HEADER_RANGE_PATH: &str = r"^/v4/spreadsheets/sheet-1/values/.+A1:H1$";
const APPEND_PATH: &str = r"^/v4/spreadsheets/sheet-1/values/.+A1:H1:append$";

fn credentials(server: &ServerGuard) -> String {
    json!({
        "type": "service_account",
        "client_email": "inquiries@thrive.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", server.url()),
    })
    .to_string()
}

fn backend(server: &ServerGuard) -> GoogleSheetsBackend {
    GoogleSheetsBackend::new(Duration::from_secs(5))
        .unwrap()
        .with_endpoints(
            &format!("{}/v4", server.url()),
            &format!("{}/drive/v3", server.url()),
        )
}

fn config(server: &ServerGuard) -> SiteConfig {
    SiteConfig {
        sheet_name: "Leads".to_string(),
        credentials_json: Some(credentials(server)),
        ..SiteConfig::default()
    }
}

fn mock_token(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".into(),
                "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
            ),
            // Three base64url segments
            Matcher::Regex(r"assertion=[\w-]+\.[\w-]+\.[\w-]+".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": TOKEN, "expires_in": 3599, "token_type": "Bearer"}).to_string())
        .expect(hits)
        .create()
}

fn mock_lookup(server: &mut ServerGuard, files: serde_json::Value, hits: usize) -> Mock {
    server
        .mock("GET", "/drive/v3/files")
        .match_header("authorization", BEARER)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "q".into(),
                "name = 'Leads' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false".into(),
            ),
            Matcher::UrlEncoded("fields".into(), "files(id)".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(json!({ "files": files }).to_string())
        .expect(hits)
        .create()
}

fn mock_title(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", "/v4/spreadsheets/sheet-1")
        .match_header("authorization", BEARER)
        .match_query(Matcher::UrlEncoded(
            "fields".into(),
            "sheets.properties.title".into(),
        ))
        .with_header("content-type", "application/json")
        .with_body(json!({"sheets": [{"properties": {"title": "Sheet1"}}]}).to_string())
        .expect(hits)
        .create()
}

fn mock_header_read(server: &mut ServerGuard, values: Option<serde_json::Value>, hits: usize) -> Mock {
    let mut body = json!({"range": "Sheet1!A1:H1", "majorDimension": "ROWS"});
    if let Some(values) = values {
        body["values"] = values;
    }
    server
        .mock("GET", Matcher::Regex(HEADER_RANGE_PATH.into()))
        .match_header("authorization", BEARER)
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create()
}

fn append_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("valueInputOption".into(), "RAW".into()),
        Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
    ])
}

fn jane() -> InquiryInput {
    InquiryInput::from(InquiryForm {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        goals: "get fit".to_string(),
        ..InquiryForm::default()
    })
}

#[test]
fn test_first_save_writes_header_then_row() {
    let mut server = Server::new();
    let token = mock_token(&mut server, 1);
    let lookup = mock_lookup(&mut server, json!([{"id": "sheet-1"}]), 1);
    let title = mock_title(&mut server, 1);
    let header_read = mock_header_read(&mut server, None, 1);
    let header = server
        .mock("POST", Matcher::Regex(APPEND_PATH.into()))
        .match_header("authorization", BEARER)
        .match_query(append_query())
        .match_body(Matcher::Json(json!({ "values": [HEADER] })))
        .with_body("{}")
        .expect(1)
        .create();
    let row = server
        .mock("POST", Matcher::Regex(APPEND_PATH.into()))
        .match_header("authorization", BEARER)
        .match_query(append_query())
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""jane@x\.com""#.into()),
            Matcher::Regex(r#""website""#.into()),
        ]))
        .with_body("{}")
        .expect(1)
        .create();

    let store = SpreadsheetStore::new(&config(&server), backend(&server));
    assert_eq!(store.save_inquiry(&jane()), StorageResult::saved(SAVED_MESSAGE));

    token.assert();
    lookup.assert();
    title.assert();
    header_read.assert();
    header.assert();
    row.assert();
}

#[test]
fn test_existing_header_and_cached_token() {
    let mut server = Server::new();
    let token = mock_token(&mut server, 1);
    let lookup = mock_lookup(&mut server, json!([{"id": "sheet-1"}]), 2);
    mock_title(&mut server, 2);
    mock_header_read(&mut server, Some(json!([HEADER])), 2);
    let row = server
        .mock("POST", Matcher::Regex(APPEND_PATH.into()))
        .match_query(append_query())
        .match_body(Matcher::Regex(r#""jane@x\.com""#.into()))
        .with_body("{}")
        .expect(2)
        .create();

    let store = SpreadsheetStore::new(&config(&server), backend(&server));
    assert!(store.save_inquiry(&jane()).ok);
    assert!(store.save_inquiry(&jane()).ok);

    token.assert();
    lookup.assert();
    row.assert();
}

#[test]
fn test_spreadsheet_not_found_is_configuration_error() {
    let mut server = Server::new();
    mock_token(&mut server, 1);
    mock_lookup(&mut server, json!([]), 1);
    let title = mock_title(&mut server, 0);

    let err = backend(&server)
        .open_worksheet(&credentials(&server), "Leads")
        .err()
        .unwrap();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("Leads"));
    title.assert();
}

#[test]
fn test_quota_exceeded_is_remote_error() {
    let mut server = Server::new();
    mock_token(&mut server, 1);
    mock_lookup(&mut server, json!([{"id": "sheet-1"}]), 1);
    mock_title(&mut server, 1);
    server
        .mock("POST", Matcher::Regex(APPEND_PATH.into()))
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}"#)
        .create();

    let mut worksheet = backend(&server)
        .open_worksheet(&credentials(&server), "Leads")
        .unwrap();
    let err = worksheet.append_row(&["row".to_string()]).unwrap_err();

    assert!(!err.is_configuration());
    assert!(err.to_string().contains("429"));
}

#[test]
fn test_unavailable_token_endpoint_is_remote_error() {
    let mut server = Server::new();
    server
        .mock("POST", "/token")
        .with_status(503)
        .with_body("backend unavailable")
        .create();
    let lookup = mock_lookup(&mut server, json!([]), 0);

    let err = backend(&server)
        .open_worksheet(&credentials(&server), "Leads")
        .err()
        .unwrap();

    assert!(!err.is_configuration());
    assert!(err.to_string().contains("503"));
    lookup.assert();
}

#[test]
fn test_remote_failure_goes_to_fallback() {
    let mut server = Server::new();
    mock_token(&mut server, 1);
    server
        .mock("GET", "/drive/v3/files")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();
    let metrics = Metrics::new();
    let store = SpreadsheetStore::with_parts(
        &config(&server),
        backend(&server),
        metrics.clone(),
        Default::default(),
        std::sync::Arc::new(thrive_inquiry::SystemClock::new()),
    );

    assert_eq!(store.save_inquiry(&jane()), StorageResult::fallback());
    assert_eq!(metrics.fallback_remote(), 1);
}

#[test]
fn test_unauthorized_response_drops_cached_token() {
    let mut server = Server::new();
    let token = mock_token(&mut server, 2);
    let rejected = server
        .mock("GET", "/drive/v3/files")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(1)
        .create();
    let backend = backend(&server);
    let credentials = credentials(&server);

    let err = backend.open_worksheet(&credentials, "Leads").err().unwrap();
    assert!(err.to_string().contains("401"));
    rejected.assert();
    rejected.remove();

    mock_lookup(&mut server, json!([{"id": "sheet-1"}]), 1);
    mock_title(&mut server, 1);
    assert!(backend.open_worksheet(&credentials, "Leads").is_ok());
    token.assert();
}
