//! Main API client implementation

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, ErrorContext};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// API key header for Supabase
const APIKEY_HEADER: &str = "apikey";

/// PostgREST preference header
const PREFER_HEADER: &str = "Prefer";

/// Ask PostgREST to echo inserted rows back
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// Query for requests without parameters
pub const NO_QUERY: &[(&str, &str)] = &[];

/// Supabase client shared by the repository and the auth service
///
/// Construct once and clone: clones share the HTTP connection pool,
/// configuration and the signed-in user's access token.
///
/// Every call is attempted exactly once; there is no retry layer.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Client,
    config: Arc<ClientConfig>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl SupabaseClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("smokespot-api-client/", env!("CARGO_PKG_VERSION"))),
        );
        let apikey = HeaderValue::from_str(&config.anon_key)
            .map_err(|_| ApiError::config("anon_key contains invalid header characters"))?;
        default_headers.insert(APIKEY_HEADER, apikey);

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        debug!(url = %config.url, environment = ?config.environment, "Supabase client ready");
        Ok(Self {
            inner,
            config: Arc::new(config),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Use a user's access token for subsequent requests, or `None` to go
    /// back to anonymous access.
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = token;
    }

    /// Whether requests currently carry a user token
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    fn bearer(&self) -> String {
        let token = self
            .access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        format!("Bearer {}", token.as_deref().unwrap_or(&self.config.anon_key))
    }

    /// URL of a PostgREST table
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.config.rest_url(), table)
    }

    /// URL of a GoTrue endpoint
    #[must_use]
    pub fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.auth_url(), path.trim_start_matches('/'))
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// Perform a GET request with query parameters
    #[instrument(skip(self, query), fields(request_id = tracing::field::Empty))]
    pub async fn get<T, Q>(&self, url: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .execute(Method::GET, url, query, Option::<&()>::None, None)
            .await?;
        Self::decode(response).await
    }

    /// Perform a POST request and decode the JSON body
    #[instrument(skip(self, query, body), fields(request_id = tracing::field::Empty))]
    pub async fn post<T, Q, B>(&self, url: &str, query: &Q, body: &B, prefer: Option<&str>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize,
    {
        let response = self.execute(Method::POST, url, query, Some(body), prefer).await?;
        Self::decode(response).await
    }

    /// Perform a POST request whose response body is irrelevant
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    pub async fn post_no_content(&self, url: &str) -> ApiResult<()> {
        self.execute(Method::POST, url, NO_QUERY, Option::<&()>::None, None)
            .await
            .map(drop)
    }

    /// Assemble a request with the caller's bearer token and a correlation id
    pub(crate) fn build_request<Q, B>(
        &self,
        method: Method,
        url: &str,
        query: &Q,
        body: Option<&B>,
        prefer: Option<&str>,
        request_id: &str,
    ) -> RequestBuilder
    where
        Q: Serialize + ?Sized,
        B: Serialize,
    {
        let mut request = self
            .inner
            .request(method, url)
            .header(X_REQUEST_ID, request_id)
            .header(AUTHORIZATION, self.bearer())
            .query(query);

        if let Some(prefer) = prefer {
            request = request.header(PREFER_HEADER, prefer);
        }
        if let Some(b) = body {
            request = request.json(b);
        }
        request
    }

    /// Execute a single request and map non-success statuses to errors
    async fn execute<Q, B>(
        &self,
        method: Method,
        url: &str,
        query: &Q,
        body: Option<&B>,
        prefer: Option<&str>,
    ) -> ApiResult<Response>
    where
        Q: Serialize + ?Sized,
        B: Serialize,
    {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let request = self.build_request(method.clone(), url, query, body, prefer, &request_id);

        let start = Instant::now();
        let result = match request.send().await {
            Ok(response) => Self::check_status(response).await,
            Err(e) => Err(ApiError::Request(e)),
        };
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => debug!(
                request_id = %request_id,
                elapsed_ms = elapsed.as_millis(),
                "Request succeeded"
            ),
            Err(e) => {
                let context = ErrorContext {
                    request_id: Some(request_id.clone()),
                    endpoint: url.to_string(),
                    method: method.to_string(),
                };
                warn!(
                    context = %context,
                    elapsed_ms = elapsed.as_millis(),
                    error = %e,
                    "Request failed"
                );
            }
        }

        result
    }

    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::api_response(status.as_u16(), error_message(status, &body)))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pull a readable message out of a PostgREST or GoTrue error body.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(serde_json::Value::as_str)
            .map(String::from)
    };

    field("message")
        .or_else(|| field("error_description"))
        .or_else(|| field("msg"))
        .or_else(|| field("error"))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}
