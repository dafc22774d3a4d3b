use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::auth::ServiceAccountAuth;
use super::{CellRange, SheetStore};
use crate::config::{SHEETS_API_BASE, SheetsConfig, TOKEN_URI};

/// Google Sheets v4 `values` API, authenticated as a service account.
pub struct GoogleSheetsStore {
    client: Client,
    api_base: String,
    sheet_id: String,
    auth: ServiceAccountAuth,
}

impl GoogleSheetsStore {
    pub fn new(config: &SheetsConfig) -> anyhow::Result<Self> {
        Self::with_endpoints(config, SHEETS_API_BASE, TOKEN_URI)
    }

    /// Talk to `api_base` (the `.../v4/spreadsheets` root) and `token_uri` instead of
    /// the public Google endpoints.
    pub fn with_endpoints(
        config: &SheetsConfig,
        api_base: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("eyrie-apply/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            sheet_id: config.sheet_id.clone(),
            auth: ServiceAccountAuth::new(config).with_token_uri(token_uri),
        })
    }

    fn values_url(&self, range: &CellRange, action: Option<&str>) -> anyhow::Result<Url> {
        values_url(&self.api_base, &self.sheet_id, range, action)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct ValueRange {
    /// Omitted entirely when the range holds no values.
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize, Default)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    message: String,
}

fn values_url(
    base: &str,
    sheet_id: &str,
    range: &CellRange,
    action: Option<&str>,
) -> anyhow::Result<Url> {
    let mut url = Url::parse(base)?;
    let segment = match action {
        Some(action) => format!("{range}:{action}"),
        None => range.to_string(),
    };
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Sheets API base URL cannot carry a path: {base}"))?
        .push(sheet_id)
        .push("values")
        .push(&segment);
    Ok(url)
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Surface the API's own message when it sends one, as the caller reports it verbatim.
fn api_error_message(body: &str, status: u16) -> String {
    let parsed: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    if parsed.error.message.is_empty() {
        format!("Sheets API request failed: HTTP {status}")
    } else {
        parsed.error.message
    }
}

async fn check(resp: reqwest::Response) -> anyhow::Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        anyhow::bail!("{}", api_error_message(&body, status.as_u16()));
    }
    Ok(body)
}

// ---------------------------------------------------------------------------
// SheetStore implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn read_range(&self, range: &CellRange) -> anyhow::Result<Vec<Vec<String>>> {
        let token = self.auth.access_token(&self.client).await?;
        let url = self.values_url(range, None)?;
        tracing::debug!("GET {url}");

        let resp = self.client.get(url).bearer_auth(token).send().await?;
        let body = check(resp).await?;

        let parsed: ValueRange = serde_json::from_str(&body)?;
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_rows(&self, range: &CellRange, rows: &[Vec<String>]) -> anyhow::Result<()> {
        let token = self.auth.access_token(&self.client).await?;
        let url = self.values_url(range, Some("append"))?;
        tracing::debug!("POST {url} ({} row(s))", rows.len());

        let resp = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&AppendBody { values: rows })
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Form, Path, Query, State};
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};

    use super::*;
    use crate::config::SHEETS_SCOPE;

    const PRIVATE_KEY: &str = include_str!("test_service_account.pem");
    const PUBLIC_KEY: &str = include_str!("test_service_account.pub.pem");
    const CLIENT_EMAIL: &str = "intake@eyrie.iam.gserviceaccount.com";
    const ACCESS_TOKEN: &str = "ya29.local-token";
    const LOCKED_SHEET: &str = "locked";
    const PERMISSION_DENIED: &str = "The caller does not have permission";

    #[derive(Debug)]
    struct SeenRequest {
        method: &'static str,
        sheet_id: String,
        range: String,
        query: HashMap<String, String>,
        authorization: Option<String>,
        body: Option<serde_json::Value>,
    }

    /// Stand-in for the OAuth token endpoint and the Sheets `values` API.
    #[derive(Default)]
    struct FakeGoogle {
        token_forms: Mutex<Vec<HashMap<String, String>>>,
        requests: Mutex<Vec<SeenRequest>>,
    }

    type Reply = (StatusCode, Json<serde_json::Value>);

    fn denied() -> Reply {
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": { "code": 403, "message": PERMISSION_DENIED, "status": "PERMISSION_DENIED" }
            })),
        )
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    async fn token(
        State(fake): State<Arc<FakeGoogle>>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        fake.token_forms.lock().unwrap().push(form);
        Json(serde_json::json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        }))
    }

    async fn read_values(
        State(fake): State<Arc<FakeGoogle>>,
        Path((sheet_id, range)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> Reply {
        let locked = sheet_id == LOCKED_SHEET;
        fake.requests.lock().unwrap().push(SeenRequest {
            method: "GET",
            sheet_id,
            range: range.clone(),
            query: HashMap::new(),
            authorization: bearer(&headers),
            body: None,
        });
        if locked {
            return denied();
        }
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [["a@x.com"], ["b@x.com"]]
            })),
        )
    }

    async fn append_values(
        State(fake): State<Arc<FakeGoogle>>,
        Path((sheet_id, range)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Reply {
        let locked = sheet_id == LOCKED_SHEET;
        fake.requests.lock().unwrap().push(SeenRequest {
            method: "POST",
            sheet_id,
            range,
            query,
            authorization: bearer(&headers),
            body: Some(body),
        });
        if locked {
            return denied();
        }
        (StatusCode::OK, Json(serde_json::json!({ "updates": { "updatedRows": 1 } })))
    }

    async fn spawn_fake() -> (String, Arc<FakeGoogle>) {
        let fake = Arc::new(FakeGoogle::default());
        let app = Router::new()
            .route("/token", post(token))
            .route(
                "/v4/spreadsheets/:sheet_id/values/:range",
                get(read_values).post(append_values),
            )
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), fake)
    }

    fn store_at(base: &str, sheet_id: &str) -> GoogleSheetsStore {
        let config = SheetsConfig {
            sheet_id: sheet_id.into(),
            client_email: CLIENT_EMAIL.into(),
            private_key: PRIVATE_KEY.into(),
        };
        GoogleSheetsStore::with_endpoints(
            &config,
            format!("{base}/v4/spreadsheets"),
            format!("{base}/token"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_read_exchanges_signed_assertion_for_bearer_token() {
        let (base, fake) = spawn_fake().await;
        let store = store_at(&base, "1AbC");

        let rows = store
            .read_range(&CellRange::column_from("Sheet1", 5, 1))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec!["a@x.com".to_string()], vec!["b@x.com".to_string()]]);

        let forms = fake.token_forms.lock().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["grant_type"], "urn:ietf:params:oauth:grant-type:jwt-bearer");

        let token_uri = format!("{base}/token");
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[token_uri.as_str()]);
        let claims = jsonwebtoken::decode::<serde_json::Value>(
            &forms[0]["assertion"],
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims["iss"], CLIENT_EMAIL);
        assert_eq!(claims["scope"], SHEETS_SCOPE);
        assert_eq!(claims["aud"], token_uri.as_str());

        let seen = fake.requests.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].sheet_id, "1AbC");
        assert_eq!(seen[0].range, "Sheet1!F2:F");
        assert_eq!(
            seen[0].authorization.as_deref(),
            Some(format!("Bearer {ACCESS_TOKEN}").as_str())
        );
    }

    #[tokio::test]
    async fn test_append_posts_raw_values() {
        let (base, fake) = spawn_fake().await;
        let store = store_at(&base, "1AbC");
        let rows = vec![vec!["2025-01-01T00:00:00.000Z".to_string(), "a@x.com".to_string()]];

        store
            .append_rows(&CellRange::anchor("Sheet1"), &rows)
            .await
            .unwrap();

        assert_eq!(fake.token_forms.lock().unwrap().len(), 1);
        let seen = fake.requests.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.method, "POST");
        assert_eq!(req.range, "Sheet1!A1:append");
        assert_eq!(req.query.get("valueInputOption").map(String::as_str), Some("RAW"));
        assert_eq!(req.query.len(), 1);
        assert_eq!(
            req.authorization.as_deref(),
            Some(format!("Bearer {ACCESS_TOKEN}").as_str())
        );
        assert_eq!(
            req.body,
            Some(serde_json::json!({ "values": [["2025-01-01T00:00:00.000Z", "a@x.com"]] }))
        );
    }

    #[tokio::test]
    async fn test_api_errors_come_back_verbatim() {
        let (base, fake) = spawn_fake().await;
        let store = store_at(&base, LOCKED_SHEET);

        let err = store
            .read_range(&CellRange::column_from("Sheet1", 5, 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PERMISSION_DENIED);

        let err = store
            .append_rows(&CellRange::anchor("Sheet1"), &[vec!["x".to_string()]])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PERMISSION_DENIED);

        // One token exchange per store call.
        assert_eq!(fake.token_forms.lock().unwrap().len(), 2);
        assert_eq!(fake.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_values_url_read() {
        let url = values_url(
            SHEETS_API_BASE,
            "1AbC",
            &CellRange::column_from("Sheet1", 5, 1),
            None,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/1AbC/values/Sheet1!F2:F"
        );
    }

    #[test]
    fn test_values_url_append_encodes_sheet_name() {
        let url = values_url(
            SHEETS_API_BASE,
            "1AbC",
            &CellRange::anchor("Intake 2025"),
            Some("append"),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/1AbC/values/'Intake%202025'!A1:append"
        );
    }

    #[test]
    fn test_value_range_empty_sheet() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!F2:F1000","majorDimension":"ROWS"}"#).unwrap();
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn test_value_range_mixed_cells() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"values":[["a@x.com"],[],[42],[null]]}"#).unwrap();
        let rows: Vec<Vec<String>> = parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["a@x.com".to_string()],
                vec![],
                vec!["42".to_string()],
                vec![String::new()],
            ]
        );
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(body, 403), "The caller does not have permission");
        assert_eq!(api_error_message("", 503), "Sheets API request failed: HTTP 503");
    }

    #[test]
    fn test_append_body_shape() {
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        let json = serde_json::to_value(AppendBody { values: &rows }).unwrap();
        assert_eq!(json, serde_json::json!({"values": [["a", "b"]]}));
    }
}
