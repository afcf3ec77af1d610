use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::CasePayload;

const LOGIN_BASE: &str = "https://login.salesforce.com";
const CASE_API_PATH: &str = "/services/data/v60.0/sobjects/Case";

/// Raw outcome of a case-creation attempt. The caller owns the retry policy,
/// so non-2xx statuses are data here, not errors; only transport failures
/// surface as `Err`.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub status: u16,
    pub body: String,
}

impl SubmissionOutcome {
    pub fn is_created(&self) -> bool {
        self.status == 201
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the two Salesforce endpoints this service talks to: the OAuth
/// token endpoint and the Case sobject endpoint.
#[derive(Clone)]
pub struct SalesforceClient {
    client: reqwest::Client,
    login_base: String,
    api_base: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    security_token: String,
}

impl SalesforceClient {
    pub fn new(
        domain: &str,
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
        security_token: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            login_base: LOGIN_BASE.to_string(),
            api_base: format!("https://{domain}.my.salesforce.com"),
            client_id,
            client_secret,
            username,
            password,
            security_token,
        }
    }

    /// Overrides both base URLs (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.login_base = url.to_string();
        self.api_base = url.to_string();
        self
    }

    /// Performs the OAuth password-grant exchange. Salesforce expects the
    /// security token appended to the password with no separator.
    pub async fn request_token(&self) -> Result<String, AppError> {
        let url = format!("{}/services/oauth2/token", self.login_base);
        let password = format!("{}{}", self.password, self.security_token);
        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", self.username.as_str()),
            ("password", password.as_str()),
        ];

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamAuth { status: status.as_u16(), body });
        }

        let token: TokenResponse = response.json().await?;
        debug!("obtained fresh access token");
        Ok(token.access_token)
    }

    /// Posts the case payload and reports the raw outcome. Success here means
    /// transport succeeded; interpreting the status is the caller's job.
    pub async fn create_case(
        &self,
        payload: &CasePayload,
        access_token: &str,
    ) -> Result<SubmissionOutcome, AppError> {
        let url = format!("{}{}", self.api_base, CASE_API_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!(status, "case submission attempt completed");
        Ok(SubmissionOutcome { status, body })
    }
}
