use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::attendance::{AttendanceEntry, AttendanceRecord};
use crate::models::{AuthForm, AuthResponse};

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The API answered with an `{"error": ...}` body.
    #[error("{0}")]
    Rejected(String),

    #[error("remote API responded with status {0}")]
    Status(u16),

    #[error("remote API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid API base URL {0}")]
    BaseUrl(String),
}

/// The attendance backend this kiosk talks to.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn login(&self, form: &AuthForm) -> Result<AuthResponse, RemoteError>;

    async fn signup(&self, form: &AuthForm) -> Result<AuthResponse, RemoteError>;

    async fn fetch_attendance(&self, employee_id: &str) -> Result<Vec<AttendanceRecord>, RemoteError>;

    async fn post_attendance(&self, entry: &AttendanceEntry) -> Result<(), RemoteError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpAttendanceApi {
    client: Client,
    base_url: Url,
}

impl HttpAttendanceApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url).map_err(|e| RemoteError::BaseUrl(format!("{base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::BaseUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded segments to the base path.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn auth(&self, endpoint: &str, form: &AuthForm) -> Result<AuthResponse, RemoteError> {
        debug!(endpoint, employee_id = %form.employee_id, "Calling remote auth");
        let response = self
            .client
            .post(self.url(&[endpoint])?)
            .header(ACCEPT, "application/json")
            .json(form)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Turns a non-2xx response into `Rejected` when it carries an error message.
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error);

    warn!(status = status.as_u16(), message = ?message, "Remote API returned an error");

    match message {
        Some(message) => Err(RemoteError::Rejected(message)),
        None => Err(RemoteError::Status(status.as_u16())),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    Ok(check(response).await?.json::<T>().await?)
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn login(&self, form: &AuthForm) -> Result<AuthResponse, RemoteError> {
        self.auth("login", form).await
    }

    async fn signup(&self, form: &AuthForm) -> Result<AuthResponse, RemoteError> {
        self.auth("signup", form).await
    }

    async fn fetch_attendance(&self, employee_id: &str) -> Result<Vec<AttendanceRecord>, RemoteError> {
        let response = self
            .client
            .get(self.url(&["attendance", employee_id])?)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        read_json(response).await
    }

    async fn post_attendance(&self, entry: &AttendanceEntry) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url(&["attendance"])?)
            .json(entry)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Status;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> AuthForm {
        AuthForm {
            name: String::new(),
            email: "ada@company.com".into(),
            employee_id: "E1".into(),
            password: "secret".into(),
        }
    }

    fn api(server: &MockServer) -> HttpAttendanceApi {
        HttpAttendanceApi::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[actix_web::test]
    async fn login_returns_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"employeeId": "E1", "name": "Ada"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let identity = api(&server).login(&form()).await.unwrap();

        assert_eq!(identity.employee_id, "E1");
        assert_eq!(identity.name, "Ada");
    }

    #[actix_web::test]
    async fn signup_error_message_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signup"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(serde_json::json!({"error": "Employee already exists"})),
            )
            .mount(&server)
            .await;

        let err = api(&server).signup(&form()).await.unwrap_err();

        assert!(matches!(err, RemoteError::Rejected(ref m) if m == "Employee already exists"));
    }

    #[actix_web::test]
    async fn error_without_body_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = api(&server).login(&form()).await.unwrap_err();

        assert!(matches!(err, RemoteError::Status(500)));
    }

    #[actix_web::test]
    async fn fetches_history_for_employee() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attendance/E1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"status": "present", "time": "9:10:00 AM", "date": "10/15/2026", "day": "Thursday"}
            ])))
            .mount(&server)
            .await;

        let records = api(&server).fetch_attendance("E1").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Present);
    }

    #[actix_web::test]
    async fn employee_id_stays_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attendance/E%2F1%3Fx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let records = api(&server).fetch_attendance("E/1?x").await.unwrap();

        assert!(records.is_empty());
    }

    #[actix_web::test]
    async fn base_path_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"employeeId": "E1", "name": "Ada"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpAttendanceApi::new(&format!("{}/v1/", server.uri()), Duration::from_secs(5)).unwrap();

        assert_eq!(api.login(&form()).await.unwrap().employee_id, "E1");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            HttpAttendanceApi::new("not a url", Duration::from_secs(5)),
            Err(RemoteError::BaseUrl(_))
        ));
        assert!(matches!(
            HttpAttendanceApi::new("mailto:kiosk@company.com", Duration::from_secs(5)),
            Err(RemoteError::BaseUrl(_))
        ));
    }

    #[actix_web::test]
    async fn posts_flattened_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/attendance"))
            .and(body_json(serde_json::json!({
                "employeeId": "E1",
                "name": "Ada",
                "status": "absent",
                "time": "5:46:00 PM",
                "date": "10/16/2026",
                "day": "Friday"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let entry = AttendanceEntry {
            employee_id: "E1".into(),
            name: "Ada".into(),
            record: AttendanceRecord {
                status: Status::Absent,
                time: "5:46:00 PM".into(),
                date: "10/16/2026".into(),
                day: "Friday".into(),
            },
        };

        api(&server).post_attendance(&entry).await.unwrap();
    }
}
