use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Employee, EmployeeFields, EmployeeId},
    error::{fallback_error_message, ApiErrorBody},
    protocol::{Ack, EmployeeListResponse, ReviewRequest},
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod error;

pub use config::ClientSettings;
pub use error::ClientError;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Operations the employee REST API offers to a client.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>>;
    async fn get_employee(&self, id: &EmployeeId) -> Result<Employee>;
    /// Returns the created record when the server echoes one back.
    async fn create_employee(&self, fields: &EmployeeFields) -> Result<Option<Employee>>;
    async fn update_employee(
        &self,
        id: &EmployeeId,
        fields: &EmployeeFields,
    ) -> Result<Option<Employee>>;
    async fn add_review(&self, id: &EmployeeId, review: &str) -> Result<Ack>;
    async fn deactivate_employee(&self, id: &EmployeeId) -> Result<Ack>;
    async fn delete_employee(&self, id: &EmployeeId) -> Result<()>;
}

pub struct HttpEmployeeClient {
    http: Client,
    server_url: Url,
    api_prefix: Vec<String>,
}

impl HttpEmployeeClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        Self::with_http_client(Client::new(), settings)
    }

    pub fn with_http_client(http: Client, settings: &ClientSettings) -> Result<Self> {
        let server_url =
            Url::parse(&settings.server_url).map_err(|err| ClientError::InvalidServerUrl {
                url: settings.server_url.clone(),
                reason: err.to_string(),
            })?;
        if server_url.cannot_be_a_base() {
            return Err(ClientError::InvalidServerUrl {
                url: settings.server_url.clone(),
                reason: "url cannot be used as a base".into(),
            });
        }

        let api_prefix = settings
            .api_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            http,
            server_url,
            api_prefix,
        })
    }

    /// `{server}/{prefix}/employees/{tail...}` with each tail segment escaped.
    pub fn endpoint(&self, tail: &[&str]) -> Url {
        let mut url = self.server_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(self.api_prefix.iter().map(String::as_str));
            segments.push("employees");
            segments.extend(tail);
        }
        url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        debug!(%method, %url, "employee api request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.text().map(str::to_string))
        .unwrap_or_else(|| fallback_error_message(status.as_u16()));
    warn!(status = status.as_u16(), %message, "employee api rejected request");
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response, what: &'static str) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| ClientError::Decode { what, source })
}

// A 2xx status is the success signal; the body is informational only.
async fn decode_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&body).ok())
}

#[async_trait]
impl EmployeeApi for HttpEmployeeClient {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        let response = self
            .send::<()>(Method::GET, self.endpoint(&[]), None)
            .await?;
        let body: EmployeeListResponse = decode_json(response, "employee list").await?;
        Ok(body.into_employees())
    }

    async fn get_employee(&self, id: &EmployeeId) -> Result<Employee> {
        let response = self
            .send::<()>(Method::GET, self.endpoint(&[id.as_str()]), None)
            .await?;
        decode_json(response, "employee").await
    }

    async fn create_employee(&self, fields: &EmployeeFields) -> Result<Option<Employee>> {
        let response = self
            .send(Method::POST, self.endpoint(&[]), Some(fields))
            .await?;
        decode_optional(response).await
    }

    async fn update_employee(
        &self,
        id: &EmployeeId,
        fields: &EmployeeFields,
    ) -> Result<Option<Employee>> {
        let response = self
            .send(Method::PUT, self.endpoint(&[id.as_str()]), Some(fields))
            .await?;
        decode_optional(response).await
    }

    async fn add_review(&self, id: &EmployeeId, review: &str) -> Result<Ack> {
        let body = ReviewRequest {
            review: review.to_string(),
        };
        let response = self
            .send(
                Method::POST,
                self.endpoint(&[id.as_str(), "reviews"]),
                Some(&body),
            )
            .await?;
        Ok(decode_optional(response).await?.unwrap_or_default())
    }

    async fn deactivate_employee(&self, id: &EmployeeId) -> Result<Ack> {
        let response = self
            .send::<()>(
                Method::PATCH,
                self.endpoint(&[id.as_str(), "deactivate"]),
                None,
            )
            .await?;
        Ok(decode_optional(response).await?.unwrap_or_default())
    }

    async fn delete_employee(&self, id: &EmployeeId) -> Result<()> {
        self.send::<()>(Method::DELETE, self.endpoint(&[id.as_str()]), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
