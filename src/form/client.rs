use reqwest::{Client, Url};

use crate::server::{APPLICATION_PATH, ApiResponse, ResultKind};
use crate::submission::ApplicationPayload;

pub const SUCCESS_NOTICE: &str = "✅ Application submitted successfully!";
pub const FAILURE_NOTICE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Stored. The applicant is sent on to the community link.
    Accepted { redirect: String },
    Rejected { message: String },
}

impl Outcome {
    pub fn notice(&self) -> String {
        match self {
            Outcome::Accepted { .. } => SUCCESS_NOTICE.to_string(),
            Outcome::Rejected { message } => format!("❌ {message}"),
        }
    }
}

/// Posts a completed form to the submission endpoint.
pub struct ApplicationClient {
    client: Client,
    endpoint: Url,
    community_url: String,
}

impl ApplicationClient {
    pub fn new(server: &str, community_url: impl Into<String>) -> anyhow::Result<Self> {
        let endpoint = Url::parse(server)
            .and_then(|base| base.join(APPLICATION_PATH))
            .map_err(|e| anyhow::anyhow!("Invalid server URL '{server}': {e}"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            community_url: community_url.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Transport failures and unreadable bodies come back as `Err`; the server's own
    /// rejections come back as [`Outcome::Rejected`].
    pub async fn submit(&self, payload: &ApplicationPayload) -> anyhow::Result<Outcome> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;
        let body = resp.text().await?;
        interpret(&body, &self.community_url)
    }
}

/// The body decides the outcome, whatever the status code.
pub fn interpret(body: &str, community_url: &str) -> anyhow::Result<Outcome> {
    let parsed: ApiResponse = serde_json::from_str(body)?;
    Ok(match parsed.result {
        ResultKind::Success => Outcome::Accepted {
            redirect: community_url.to_string(),
        },
        ResultKind::Error => Outcome::Rejected {
            message: parsed.message.unwrap_or_else(|| FAILURE_NOTICE.to_string()),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{COMMUNITY_URL, SHEET_NAME};
    use crate::server::router;
    use crate::store::memory::MemoryStore;
    use crate::submission::SubmissionHandler;

    #[test]
    fn test_endpoint() {
        let client = ApplicationClient::new("http://127.0.0.1:3000", COMMUNITY_URL).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:3000/api/application");
        assert!(ApplicationClient::new("not a url", COMMUNITY_URL).is_err());
    }

    #[test]
    fn test_interpret() {
        assert_eq!(
            interpret(r#"{"result":"success"}"#, COMMUNITY_URL).unwrap(),
            Outcome::Accepted {
                redirect: COMMUNITY_URL.to_string()
            }
        );

        let rejected = interpret(
            r#"{"result":"error","message":"This email has already been used"}"#,
            COMMUNITY_URL,
        )
        .unwrap();
        assert_eq!(rejected.notice(), "❌ This email has already been used");

        assert!(interpret("<html>502</html>", COMMUNITY_URL).is_err());
    }

    #[tokio::test]
    async fn test_round_trip_through_local_server() {
        let store = Arc::new(MemoryStore::new().with_sheet(SHEET_NAME));
        let app = router(Arc::new(SubmissionHandler::new(store.clone(), SHEET_NAME)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ApplicationClient::new(&format!("http://{addr}"), COMMUNITY_URL).unwrap();
        let payload = ApplicationPayload {
            full_name: "A".into(),
            phone: "1".into(),
            email: "a@x.com".into(),
            university: "U".into(),
            department: "D".into(),
            level: "100 Level".into(),
            why: "...".into(),
            discord: "Yes".into(),
        };

        let first = client.submit(&payload).await.unwrap();
        assert_eq!(first.notice(), SUCCESS_NOTICE);

        let second = client.submit(&payload).await.unwrap();
        assert_eq!(
            second,
            Outcome::Rejected {
                message: "This email has already been used".into()
            }
        );
        assert_eq!(store.rows(SHEET_NAME).unwrap().len(), 1);
    }
}
