//! Unofficial Rust client for the Salesforce REST API.
//!
//! This crate provides OAuth2 token acquisition (authorization-code and
//! JWT-bearer grants) and a REST client for the Lightning Platform data API.
//!
//! # Examples
//!
//! ```no_run
//! use salesforce_rest::config::TokenResponse;
//! use salesforce_rest::rest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let token = TokenResponse::from_json_path("token.json")?;
//! let client = rest::Client::new(token.instance_url, &token.access_token)?;
//!
//! let response = client
//!     .get(["sobjects", "Contact", "003xx000004TmiQAAS"], Default::default())
//!     .await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

/// Salesforce REST API version used for all data requests.
pub const API_VERSION: &str = "v51.0";

/// Default per-request timeout for REST API calls (2 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 2;

/// Default connection timeout for OAuth2 token requests (15 seconds).
pub const DEFAULT_AUTH_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Default request timeout for OAuth2 token requests (30 seconds).
pub const DEFAULT_AUTH_REQUEST_TIMEOUT_SECS: u64 = 30;

/// OAuth2 grant flows for obtaining access tokens.
pub mod auth;

/// Connected-app configuration and session inputs.
pub mod config;

/// REST client for the Salesforce data API.
pub mod rest;
