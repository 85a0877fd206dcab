//! Forward client requests to the upstream API
//!
//! Each call resolves the client's token, sends one GET with the fixed
//! header set, and hands back the upstream JSON body untouched.

use bytes::Bytes;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::de::IgnoredAny;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::error::{RelayError, Result};
use crate::settings::HttpSettings;
use crate::token::TokenResolver;
use crate::upstream::{build_headers, Endpoint, UpstreamTarget};

/// One inbound request, ready to forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Selects the stored token
    pub identifier: String,
    /// Upstream endpoint with its parameters
    pub endpoint: Endpoint,
    /// Host from the request path, for path-supplied targets
    pub upstream_host: Option<String>,
}

/// Forwarder for upstream calls
pub struct Forwarder {
    /// Token lookup backend
    resolver: Arc<dyn TokenResolver>,
    /// Where requests are sent
    target: UpstreamTarget,
    /// HTTP client
    client: Client,
}

impl Forwarder {
    /// Create a forwarder with a client built from the HTTP settings
    pub fn new(
        resolver: Arc<dyn TokenResolver>,
        target: UpstreamTarget,
        http: &HttpSettings,
    ) -> Result<Self> {
        let redirect = if http.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(http.max_redirects)
        };

        let client = Client::builder()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .redirect(redirect)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(resolver, target, client))
    }

    /// Create a forwarder around an existing client
    pub fn with_client(
        resolver: Arc<dyn TokenResolver>,
        target: UpstreamTarget,
        client: Client,
    ) -> Self {
        Self {
            resolver,
            target,
            client,
        }
    }

    /// Get the upstream target
    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    /// Build the upstream URL for a request
    pub fn upstream_url(&self, request: &ForwardRequest) -> Result<Url> {
        let base = self.target.base_url(request.upstream_host.as_deref())?;
        request.endpoint.url(&base)
    }

    /// Forward a request to its upstream endpoint
    pub async fn forward_request(&self, request: &ForwardRequest) -> Result<Bytes> {
        let url = self.upstream_url(request)?;

        debug!(
            "Forwarding {} for {} via {}",
            request.endpoint.name(),
            request.identifier,
            self.resolver.backend_name()
        );

        self.forward(&request.identifier, url).await
    }

    /// Resolve the identifier's token and GET the URL with it.
    ///
    /// Returns the upstream body as JSON bytes. A body that is not JSON is
    /// returned as a JSON string.
    pub async fn forward(&self, identifier: &str, url: Url) -> Result<Bytes> {
        let token = self.resolver.resolve(identifier).await?;
        let headers = build_headers(identifier, &token)?;
        drop(token);

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                warn!("Upstream request to {} failed: {}", url.path(), e);
                RelayError::from(e)
            })?;

        let status = response.status();
        debug!("Upstream response status: {}", status);

        let response = response.error_for_status().map_err(|e| {
            warn!("Upstream {} returned {}", url.path(), status);
            RelayError::from(e)
        })?;

        let body = response.bytes().await?;

        if serde_json::from_slice::<IgnoredAny>(&body).is_ok() {
            return Ok(body);
        }

        debug!("Upstream body is not JSON, relaying as a string");
        let text = String::from_utf8_lossy(&body);
        Ok(Bytes::from(serde_json::to_vec(&text)?))
    }
}
