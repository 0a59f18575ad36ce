use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::client::{Client, Error, RequestOptions};

/// Server-assigned metadata for a record returned by a query.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAttributes {
    /// Object type of the record.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Canonical URL of the record, relative to the org instance.
    pub url: String,
}

/// A contact row returned by a SOQL query.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRecord {
    /// Record metadata, including its canonical URL.
    pub attributes: RecordAttributes,
    /// Record ID.
    #[serde(rename = "Id")]
    pub id: String,
    /// First name; absent when the field is empty.
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    /// Last name; absent when the field is empty.
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    records: Vec<ContactRecord>,
}

impl Client {
    /// Looks up a contact by email and returns its canonical record URL.
    ///
    /// Email is the only query filter. When several records share the email,
    /// the name is used purely as a tie-breaker: the first record whose
    /// first and last name match exactly wins, in server-returned order.
    /// Name formatting variance therefore cannot cause a false negative for
    /// a unique email.
    ///
    /// Returns `None` when no record matches the email, or when several do
    /// but none matches the name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure and [`Error::Decode`]
    /// if the query response body is not the expected JSON shape.
    pub async fn find_contact(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<String>, Error> {
        let soql = format!(
            "SELECT Id, FirstName, LastName FROM Contact WHERE Email = '{}'",
            escape_soql_literal(email)
        );
        let options = RequestOptions {
            query: vec![("q".to_string(), soql)],
            ..Default::default()
        };
        let response = self.get(["query"], options).await?;
        let result: QueryResponse = response
            .json()
            .await
            .map_err(|source| Error::Decode { source })?;

        debug!(count = result.records.len(), "contact query returned");
        let mut records = result.records;
        if records.is_empty() {
            return Ok(None);
        }
        if records.len() == 1 {
            return Ok(Some(records.remove(0).attributes.url));
        }
        Ok(records
            .into_iter()
            .find(|record| {
                record.first_name.as_deref() == Some(first_name)
                    && record.last_name.as_deref() == Some(last_name)
            })
            .map(|record| record.attributes.url))
    }

    /// Creates a contact. `data` is sent as the request body verbatim; the
    /// remote API is the source of truth for schema correctness.
    ///
    /// Returns the raw response without status-code validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure.
    pub async fn create_contact(&self, data: &Value) -> Result<reqwest::Response, Error> {
        let options = RequestOptions {
            json: Some(data.clone()),
            ..Default::default()
        };
        self.post(["sobjects", "Contact"], options).await
    }

    /// Updates the contact with the given ID. `data` is sent as the request
    /// body verbatim.
    ///
    /// Returns the raw response without status-code validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure.
    pub async fn update_contact(
        &self,
        contact_id: &str,
        data: &Value,
    ) -> Result<reqwest::Response, Error> {
        let options = RequestOptions {
            json: Some(data.clone()),
            ..Default::default()
        };
        self.patch(["sobjects", "Contact", contact_id], options).await
    }
}

/// Escapes `\` and `'` so the value stays a single SOQL string literal.
fn escape_soql_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
