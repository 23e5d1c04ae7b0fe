use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::info;
use url::Url;

use crate::api_errors::RemoteError;
use crate::entities::session::AccessToken;
use crate::settings::AppConfig;

/// Thin wrapper over `reqwest::Client` bound to the remote API base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

/// Error bodies the remote API sends back. Either field may be present.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::InvalidResponse(format!("Invalid API base URL: {}", e)))?;

        // Keep any base path when joining relative endpoints.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::from)?;

        info!("Remote API client ready for {}", base_url);
        Ok(ApiClient { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RemoteError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Resolves an endpoint path (no leading slash) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RemoteError::InvalidResponse(format!("Invalid endpoint {}: {}", path, e)))
    }

    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, RemoteError> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);

        Ok(match token {
            Some(token) => builder.header(AUTHORIZATION, token.authorization_header()),
            None => builder,
        })
    }

    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = check_status(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(RemoteError::from)
    }

    pub async fn send_empty(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        check_status(builder.send().await?).await.map(|_| ())
    }

    /// Keep-alive ping; the hosted API sleeps when idle.
    pub async fn wake_up(&self) -> Result<(), RemoteError> {
        let builder = self.request(Method::GET, "wakeup", None)?;
        self.send_empty(builder).await
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("An error occurred")
        .to_string();

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.detail).or(body.error))
        .unwrap_or(fallback);

    Err(RemoteError::from_status(status.as_u16(), message))
}
