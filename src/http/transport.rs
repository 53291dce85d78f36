use reqwest::{Client as HttpClient, Url};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request against the recommendation API
///
/// Path segments are kept unencoded; the transport percent-encodes them when
/// building the URL, so app names with spaces or slashes are safe to pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiRequest {
            method: Method::Get,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post<I, S>(path: I, body: serde_json::Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiRequest {
            method: Method::Post,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Path as it appears in logs, without encoding
    pub fn path_display(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

/// Raw response: HTTP status plus the parsed JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Transport seam for the recommendation API
///
/// The production implementation wraps reqwest; tests substitute a mock to
/// script responses and count calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ApiTransport: Send + Sync {
    /// Executes a single request attempt.
    ///
    /// Returns `Ok` only for a 2xx status with a JSON body. Non-2xx statuses
    /// map to [`AppError::Status`] with the body preserved, and unparseable
    /// bodies to [`AppError::InvalidJson`], so the retry layer treats both as
    /// failed attempts.
    async fn execute(&self, request: ApiRequest) -> AppResult<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid API base URL: {}", e)))?;
        Ok(Self {
            http_client: HttpClient::new(),
            base_url,
        })
    }

    fn build_url(&self, request: &ApiRequest) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Internal("API base URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            segments.extend(&request.path);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let request_id = Uuid::new_v4();
        let url = self.build_url(&request)?;

        tracing::debug!(
            %request_id,
            method = ?request.method,
            path = %request.path_display(),
            "Sending API request"
        );

        let builder = match request.method {
            Method::Get => self.http_client.get(url),
            Method::Post => {
                let builder = self.http_client.post(url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Error bodies are often JSON envelopes with usable fallback
            // data; keep whatever parses, else carry the raw text.
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::Value::String(text.clone()));
            tracing::warn!(%request_id, status = status.as_u16(), "API request failed");
            return Err(AppError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(%request_id, error = %e, "Failed to parse API response body");
            AppError::InvalidJson(e.to_string())
        })?;

        tracing::debug!(%request_id, status = status.as_u16(), "API request completed");
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_joins_segments() {
        let transport = HttpTransport::new("http://localhost:5000").unwrap();
        let request = ApiRequest::get(["api", "popular"]).with_query("count", 10);
        let url = transport.build_url(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/popular?count=10");
    }

    #[test]
    fn test_build_url_percent_encodes_app_names() {
        let transport = HttpTransport::new("http://localhost:5000").unwrap();
        let request = ApiRequest::get(vec![
            "api".to_string(),
            "reviews".to_string(),
            "Clash of Clans".to_string(),
        ])
        .with_query("page", 2);
        let url = transport.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/reviews/Clash%20of%20Clans?page=2"
        );
    }

    #[test]
    fn test_build_url_with_base_path() {
        let transport = HttpTransport::new("http://localhost:5000/service/").unwrap();
        let request = ApiRequest::get(["api", "dataset"]);
        let url = transport.build_url(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/service/api/dataset");
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[test]
    fn test_request_builders() {
        let get = ApiRequest::get(["api", "recommender-status"]);
        assert_eq!(get.method, Method::Get);
        assert!(get.body.is_none());

        let post = ApiRequest::post(["api", "recommend"], serde_json::json!({"app_name": "X"}));
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.path_display(), "/api/recommend");
        assert!(post.body.is_some());
    }
}
