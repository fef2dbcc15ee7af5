//! Client for the backend's email verification endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::{ResendRequest, VerifyRequest};

pub const VERIFY_CODE_PATH: &str = "/api/auth/verify-code";
pub const RESEND_OTP_PATH: &str = "/api/auth/resend-otp";

/// Error bodies longer than this are cut before they reach the logs.
const MAX_ERROR_BODY: usize = 200;

/// Body both endpoints answer with. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("cannot parse response: {0}")]
    CannotParseResponse(String),
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn verify_code(&self, request: &VerifyRequest) -> Result<ApiAck, ApiError>;

    async fn resend_otp(&self, request: &ResendRequest) -> Result<ApiAck, ApiError>;
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<ApiAck, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "posting to auth backend");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body: body.chars().take(MAX_ERROR_BODY).collect() });
        }
        response
            .json::<ApiAck>()
            .await
            .map_err(|e| ApiError::CannotParseResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn verify_code(&self, request: &VerifyRequest) -> Result<ApiAck, ApiError> {
        self.post_json(VERIFY_CODE_PATH, request).await
    }

    async fn resend_otp(&self, request: &ResendRequest) -> Result<ApiAck, ApiError> {
        self.post_json(RESEND_OTP_PATH, request).await
    }
}
