//! REST client for the Salesforce data API.
//!
//! This module provides a thin client over the Lightning Platform REST API:
//! - A generic request path that turns logical resource references into
//!   authenticated calls confined to one org instance
//! - Convenience operations for looking up, creating and updating contacts
//!
//! # Example
//!
//! ```no_run
//! use salesforce_rest::rest::{Client, RequestOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("https://inst.my.salesforce.com", "00Dxx!AQEA")?;
//!
//! let response = client
//!     .get(["sobjects", "Contact", "003xx000004TmiQAAS"], RequestOptions::default())
//!     .await?;
//! println!("{}", response.status());
//!
//! let reference = client
//!     .find_contact("ada@example.com", "Ada", "Lovelace")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod contacts;

pub use client::Client;
pub use client::Error;
pub use client::RequestOptions;
pub use client::Target;
pub use contacts::{ContactRecord, RecordAttributes};
