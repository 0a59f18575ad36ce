use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Method;
use tracing::debug;

/// Errors that can occur while issuing REST API requests.
///
/// Remote-service errors are deliberately absent: a non-2xx HTTP status is
/// returned as an ordinary response for the caller to inspect, never raised.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Request addressed to a URL outside the client's own authority.
    /// Raised before any network I/O occurs.
    #[error("Refusing to send request to {url}: this client only sends requests to {base_url}")]
    ForbiddenOrigin {
        /// The rejected absolute URL.
        url: String,
        /// The authority this client is restricted to.
        base_url: String,
    },
    /// Network-level failure, including request timeouts.
    #[error("Request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    /// Access token cannot be carried in an Authorization header.
    #[error("Access token is not a valid header value: {source}")]
    InvalidToken {
        #[source]
        source: header::InvalidHeaderValue,
    },
    /// Response body could not be decoded.
    #[error("Failed to decode response body: {source}")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
}

/// Where a request should be sent.
///
/// The three addressing forms callers can use, in precedence order; the
/// variant chosen by the caller is resolved by a single match in
/// [`Client::request`].
#[derive(Debug, Clone)]
pub enum Target {
    /// Logical path segments. Each segment is percent-escaped independently
    /// (a `/` inside a segment is data, not a separator), joined with `/`
    /// and prefixed with the versioned data API root.
    Segments(Vec<String>),
    /// An explicit path, concatenated onto the base URL as-is.
    Path(String),
    /// An explicit absolute URL. Must start with the client's base URL or
    /// the request fails with [`Error::ForbiddenOrigin`].
    Url(String),
}

impl Target {
    /// Builds a [`Target::Segments`] from anything iterable as strings.
    pub fn segments<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Segments(parts.into_iter().map(Into::into).collect())
    }
}

/// Per-request options. Unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client-wide request timeout for this call.
    pub timeout: Option<Duration>,
    /// Query-string parameters appended to the target URL.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub json: Option<serde_json::Value>,
}

/// REST API client bound to a single org instance.
///
/// Holds the instance base URL, the bearer token (attached to every
/// outgoing request) and the default per-request timeout. Immutable after
/// construction; every call is independent.
///
/// Redirects are never followed: the bearer token rides on every request,
/// and following a redirect could hand it to an unintended host.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Client {
    /// Creates a client for `instance_url` with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidToken`] if the access token cannot be used as
    /// a header value and [`Error::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(instance_url: impl Into<String>, access_token: &str) -> Result<Self, Error> {
        Self::with_timeout(
            instance_url,
            access_token,
            Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Creates a client with an explicit default request timeout.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Client::new`].
    pub fn with_timeout(
        instance_url: impl Into<String>,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|source| Error::InvalidToken { source })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|source| Error::Transport { source })?;

        Ok(Self {
            http,
            base_url: instance_url.into(),
            timeout,
        })
    }

    /// The authority this client sends requests to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request to the API endpoint and returns the raw response.
    ///
    /// The HTTP status is not validated; callers decide what constitutes
    /// success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForbiddenOrigin`] for an absolute URL outside the
    /// client's authority (before any network I/O) and [`Error::Transport`]
    /// on network failure or timeout.
    pub async fn request(
        &self,
        method: Method,
        target: Target,
        options: RequestOptions,
    ) -> Result<reqwest::Response, Error> {
        let url = self.resolve_url(&target)?;
        debug!(%method, %url, "sending API request");

        let mut request = self
            .http
            .request(method, &url)
            .timeout(options.timeout.unwrap_or(self.timeout));
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.json {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|source| Error::Transport { source })
    }

    /// Sends a GET request.
    pub async fn get<I, S>(&self, segments: I, options: RequestOptions) -> Result<reqwest::Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(Method::GET, Target::segments(segments), options).await
    }

    /// Sends a POST request.
    pub async fn post<I, S>(&self, segments: I, options: RequestOptions) -> Result<reqwest::Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(Method::POST, Target::segments(segments), options).await
    }

    /// Sends a PUT request.
    pub async fn put<I, S>(&self, segments: I, options: RequestOptions) -> Result<reqwest::Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(Method::PUT, Target::segments(segments), options).await
    }

    /// Sends a PATCH request.
    pub async fn patch<I, S>(&self, segments: I, options: RequestOptions) -> Result<reqwest::Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(Method::PATCH, Target::segments(segments), options).await
    }

    /// Sends a DELETE request.
    pub async fn delete<I, S>(&self, segments: I, options: RequestOptions) -> Result<reqwest::Response, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request(Method::DELETE, Target::segments(segments), options).await
    }

    fn resolve_url(&self, target: &Target) -> Result<String, Error> {
        match target {
            Target::Url(url) => {
                if !url.starts_with(&self.base_url) {
                    return Err(Error::ForbiddenOrigin {
                        url: url.clone(),
                        base_url: self.base_url.clone(),
                    });
                }
                Ok(url.clone())
            }
            Target::Path(path) => Ok(format!("{}{path}", self.base_url)),
            Target::Segments(parts) => {
                let path = parts
                    .iter()
                    .map(|part| utf8_percent_encode(part, NON_ALPHANUMERIC).to_string())
                    .collect::<Vec<_>>()
                    .join("/");
                Ok(format!(
                    "{}/services/data/{}/{path}",
                    self.base_url,
                    crate::API_VERSION
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(base_url: &str) -> Client {
        Client::new(base_url, "sekrit").unwrap()
    }

    #[test]
    fn test_resolve_segments() {
        let client = test_client("https://inst.my.salesforce.com");
        let url = client
            .resolve_url(&Target::segments(["sobjects", "Contact", "003xx"]))
            .unwrap();
        assert_eq!(
            url,
            "https://inst.my.salesforce.com/services/data/v51.0/sobjects/Contact/003xx"
        );
    }

    #[test]
    fn test_segments_escaped_independently() {
        let client = test_client("https://inst.my.salesforce.com");
        let url = client
            .resolve_url(&Target::segments(["sobjects", "Weird/Name", "has space", "café"]))
            .unwrap();
        assert_eq!(
            url,
            "https://inst.my.salesforce.com/services/data/v51.0\
             /sobjects/Weird%2FName/has%20space/caf%C3%A9"
        );
        // No segment's escaped form introduces an extra path boundary.
        let path = url.strip_prefix("https://inst.my.salesforce.com").unwrap();
        assert_eq!(path.split('/').count(), 8);
    }

    #[test]
    fn test_resolve_explicit_path() {
        let client = test_client("https://inst.my.salesforce.com");
        let url = client
            .resolve_url(&Target::Path("/services/oauth2/userinfo".to_string()))
            .unwrap();
        assert_eq!(url, "https://inst.my.salesforce.com/services/oauth2/userinfo");
    }

    #[test]
    fn test_resolve_url_same_origin() {
        let client = test_client("https://inst.my.salesforce.com");
        let url = client
            .resolve_url(&Target::Url(
                "https://inst.my.salesforce.com/services/data/v51.0/query".to_string(),
            ))
            .unwrap();
        assert!(url.starts_with(client.base_url()));
    }

    #[test]
    fn test_resolve_url_foreign_origin() {
        let client = test_client("https://inst.my.salesforce.com");
        let result = client.resolve_url(&Target::Url("https://evil.example/steal".to_string()));
        assert!(matches!(result, Err(Error::ForbiddenOrigin { .. })));
    }

    #[test]
    fn test_default_timeout() {
        let client = test_client("https://inst.my.salesforce.com");
        assert_eq!(client.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_token() {
        let result = Client::new("https://inst.my.salesforce.com", "bad\ntoken");
        assert!(matches!(result, Err(Error::InvalidToken { .. })));
    }

    #[tokio::test]
    async fn test_forbidden_origin_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client("https://inst.my.salesforce.com");
        let result = client
            .request(
                Method::GET,
                Target::Url(format!("{}/services/data/v51.0/query", server.uri())),
                RequestOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(Error::ForbiddenOrigin { .. })));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_header_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v51.0/limits"))
            .and(header("Authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.get(["limits"], RequestOptions::default()).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_query_parameters_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v51.0/query"))
            .and(query_param("q", "SELECT Id FROM Contact"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let options = RequestOptions {
            query: vec![("q".to_string(), "SELECT Id FROM Contact".to_string())],
            ..Default::default()
        };
        let response = client.get(["query"], options).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_redirects_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bounce"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "https://elsewhere.example/"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client
            .request(
                Method::GET,
                Target::Path("/bounce".to_string()),
                RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 302);
    }

    #[tokio::test]
    async fn test_status_codes_surface_unvalidated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.get(["limits"], RequestOptions::default()).await.unwrap();
        assert_eq!(response.status(), 500);
    }

    #[tokio::test]
    async fn test_client_timeout_applies_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::with_timeout(server.uri(), "sekrit", Duration::from_millis(50)).unwrap();
        let result = client.get(["limits"], RequestOptions::default()).await;
        match result {
            Err(Error::Transport { source }) => assert!(source.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_per_call_timeout_override() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        // Client-wide timeout is generous; the per-call override is not.
        let client =
            Client::with_timeout(server.uri(), "sekrit", Duration::from_secs(30)).unwrap();
        let options = RequestOptions {
            timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let result = client.get(["limits"], options).await;
        match result {
            Err(Error::Transport { source }) => assert!(source.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_body_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/data/v51.0/sobjects/Contact"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({"LastName": "Lovelace"}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let options = RequestOptions {
            json: Some(serde_json::json!({"LastName": "Lovelace"})),
            ..Default::default()
        };
        let response = client.post(["sobjects", "Contact"], options).await.unwrap();
        assert_eq!(response.status(), 201);
    }
}
