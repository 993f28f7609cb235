//! Dependency-Track API client.
//!
//! Low-level HTTP invoker that handles authentication, paging parameters and
//! status classification. Resource operations live on [`Resource`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{DtError, Result};
use crate::pagination::PageParams;
use crate::path::{Relation, ResourcePath};
use crate::resource::{Resource, ResourceKind};

const USER_AGENT: &str = concat!("dtrack/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "X-Api-Key";

/// Low-level Dependency-Track API client.
///
/// Handles authentication and HTTP requests. Entity operations are reached
/// through the resource handles returned by [`DtClient::project`],
/// [`DtClient::component`] and friends.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use dtrack::DtClient;
///
/// # fn example() -> dtrack::Result<()> {
/// // Create from environment variables
/// let client = DtClient::from_env()?;
///
/// // Or configure manually
/// let client = DtClient::new("your-api-key", "https://dtrack.example.com/api/v1")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DtClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
    /// `None` when paging is left to the server.
    page_params: Option<PageParams>,
}

impl std::fmt::Debug for DtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DtClient")
            .field("base_url", &self.base_url.as_str())
            .field("page_params", &self.page_params)
            .finish_non_exhaustive()
    }
}

impl DtClient {
    /// Create a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if `DT_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Create a new client with the provided token and base URL, verifying
    /// TLS and requesting a single large page on collection GETs.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url, token))
    }

    /// Create a client from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if config.baseurl.ends_with('/') {
            config.baseurl.clone()
        } else {
            format!("{}/", config.baseurl)
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(!config.verify)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DtError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: config.token.clone(),
            page_params: (!config.paginated).then(PageParams::default),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Projects collection. Handles derived from it keep the project kind.
    pub fn project(&self) -> Resource {
        Resource::at(
            self.clone(),
            ResourcePath::root(Relation::Project.as_str()),
            ResourceKind::Project,
        )
    }

    pub fn component(&self) -> Resource {
        self.generic_root(Relation::Component.as_str())
    }

    pub fn service(&self) -> Resource {
        self.generic_root(Relation::Service.as_str())
    }

    /// BOM upload endpoint.
    pub fn bom(&self) -> Resource {
        self.generic_root(Relation::Bom.as_str())
    }

    pub fn search(&self) -> Resource {
        self.generic_root("search")
    }

    fn generic_root(&self, name: &'static str) -> Resource {
        Resource::at(self.clone(), ResourcePath::root(name), ResourceKind::Generic)
    }

    /// Issue one request against `path` relative to the base URL.
    ///
    /// Paginated GETs get the fixed page parameters appended after `query`.
    /// Failing statuses are mapped to [`DtError`]; every other response is
    /// returned untouched.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        paginated: bool,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(API_KEY_HEADER, &self.token);

        if !query.is_empty() {
            request = request.query(query);
        }
        if method == Method::GET && paginated {
            if let Some(params) = &self.page_params {
                request = request.query(params);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(DtError::HttpError)?;
        tracing::debug!(status = %response.status(), url = %response.url(), "response");

        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        let url = response.url().to_string();

        match status.as_u16() {
            404 => Err(DtError::NotFound { url }),
            409 => {
                let detail = Self::extract_error_message(response, status).await;
                Err(DtError::Conflict { url, detail })
            }
            400..=499 => {
                let detail = Self::extract_error_message(response, status).await;
                Err(DtError::BadRequest {
                    status: status.as_u16(),
                    detail,
                })
            }
            500..=599 => {
                let detail = Self::extract_error_message(response, status).await;
                Err(DtError::InternalServerError {
                    status: status.as_u16(),
                    url,
                    detail,
                })
            }
            _ => Ok(response),
        }
    }

    /// Extract error message from a failed response.
    pub(crate) async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
