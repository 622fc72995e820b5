//! Hosted document database backend (Firestore REST + Identity Toolkit).
//!
//! Documents live in named collections and are fetched by id or queried with
//! a server-side order-by clause (`:runQuery`). Authentication goes through
//! the Identity Toolkit endpoints (`accounts:signUp`,
//! `accounts:signInWithPassword`), which issue the stable account id.
//!
//! All requests use `reqwest` with text-first response handling so malformed
//! payloads can be logged before they are rejected.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use orchard_core::{
    Account, Email, NewProduct, OrderDirection, Price, Product, ProductId, ProductOrder, UserId,
    UserProfile,
};

use super::{Backend, BackendError};

const PRODUCTS_COLLECTION: &str = "products";
const USERS_COLLECTION: &str = "users";

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Cloud project id (e.g. `orchard-1838c`).
    pub project_id: String,
    /// Web API key, sent as the `key` query parameter.
    pub api_key: SecretString,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Client for the hosted document database and its auth service.
#[derive(Clone)]
pub struct FirestoreBackend {
    inner: Arc<FirestoreBackendInner>,
}

struct FirestoreBackendInner {
    client: reqwest::Client,
    /// `https://firestore.googleapis.com/v1/projects/{p}/databases/(default)/documents`
    documents_endpoint: String,
    /// `https://identitytoolkit.googleapis.com/v1`
    auth_endpoint: String,
    api_key: SecretString,
}

impl FirestoreBackend {
    /// Create a new hosted backend client.
    #[must_use]
    pub fn new(config: &FirestoreConfig) -> Self {
        let documents_endpoint = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            config.project_id
        );

        Self {
            inner: Arc::new(FirestoreBackendInner {
                client: reqwest::Client::new(),
                documents_endpoint,
                auth_endpoint: "https://identitytoolkit.googleapis.com/v1".to_owned(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.inner.documents_endpoint)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.inner.documents_endpoint)
    }

    fn key_param(&self) -> [(&'static str, String); 1] {
        [("key", self.inner.api_key.expose_secret().to_owned())]
    }

    /// Send a request and parse a JSON response, with rate-limit and
    /// diagnostics handling shared by every document operation.
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %snippet(&text),
                "document backend returned non-success status"
            );
            return Err(BackendError::Unavailable(format!(
                "HTTP {status}: {}",
                snippet(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&text),
                "failed to parse document backend response"
            );
            BackendError::Decode(e.to_string())
        })
    }

    /// Send an auth-service request; non-success responses carry a structured
    /// error message that maps onto specific failure kinds.
    async fn send_auth<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(body) = serde_json::from_str::<AuthErrorBody>(&text) {
                return Err(map_auth_error(&body.error.message));
            }
            tracing::error!(
                status = %status,
                body = %snippet(&text),
                "auth service returned non-success status"
            );
            return Err(BackendError::Unavailable(format!(
                "HTTP {status}: {}",
                snippet(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, "failed to parse auth service response");
            BackendError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl Backend for FirestoreBackend {
    #[instrument(skip(self))]
    async fn list_products(&self, order_by: ProductOrder) -> Result<Vec<Product>, BackendError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": PRODUCTS_COLLECTION }],
                "orderBy": [{
                    "field": { "fieldPath": order_by.field.field_path() },
                    "direction": direction_name(order_by.direction),
                }],
            }
        });

        let rows: Vec<QueryRow> = self
            .send_json(
                self.inner
                    .client
                    .post(format!("{}:runQuery", self.inner.documents_endpoint))
                    .query(&self.key_param())
                    .json(&body),
            )
            .await?;

        rows.iter()
            .filter_map(|row| row.document.as_ref())
            .map(decode_product)
            .collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        let result: Result<Document, BackendError> = self
            .send_json(
                self.inner
                    .client
                    .get(self.document_url(PRODUCTS_COLLECTION, id.as_str()))
                    .query(&self.key_param()),
            )
            .await;

        match result {
            Ok(doc) => Ok(Some(decode_product(&doc)?)),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, new), fields(name = %new.name))]
    async fn create_product(&self, new: NewProduct) -> Result<Product, BackendError> {
        // The backend assigns the document id; the creation timestamp is
        // written as a queryable field so the default listing can order by it.
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), Value::StringValue(new.name));
        fields.insert("price".to_owned(), encode_price(new.price)?);
        fields.insert("image".to_owned(), Value::StringValue(new.image));
        if let Some(description) = new.description {
            fields.insert("description".to_owned(), Value::StringValue(description));
        }
        fields.insert("createdAt".to_owned(), Value::TimestampValue(Utc::now()));

        let doc: Document = self
            .send_json(
                self.inner
                    .client
                    .post(self.collection_url(PRODUCTS_COLLECTION))
                    .query(&self.key_param())
                    .json(&Document::with_fields(fields)),
            )
            .await?;

        decode_product(&doc)
    }

    #[instrument(skip(self, product), fields(id = %product.id))]
    async fn set_product(&self, product: &Product) -> Result<(), BackendError> {
        let doc = Document::with_fields(encode_product(product)?);

        let _: Document = self
            .send_json(
                self.inner
                    .client
                    .patch(self.document_url(PRODUCTS_COLLECTION, product.id.as_str()))
                    .query(&self.key_param())
                    .json(&doc),
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        // Deletes are idempotent upstream; the exists precondition turns a
        // missing document into an explicit failure.
        let response = self
            .inner
            .client
            .delete(self.document_url(PRODUCTS_COLLECTION, id.as_str()))
            .query(&self.key_param())
            .query(&[("currentDocument.exists", "true")])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await?;
        if status == reqwest::StatusCode::NOT_FOUND || text.contains("FAILED_PRECONDITION") {
            return Err(BackendError::NotFound);
        }

        tracing::error!(status = %status, body = %snippet(&text), "delete failed");
        Err(BackendError::Unavailable(format!(
            "HTTP {status}: {}",
            snippet(&text)
        )))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Account, BackendError> {
        let response: SignInResponse = self
            .send_auth(
                self.inner
                    .client
                    .post(format!("{}/accounts:signUp", self.inner.auth_endpoint))
                    .query(&self.key_param())
                    .json(&json!({
                        "email": email.as_str(),
                        "password": password,
                        "returnSecureToken": true,
                    })),
            )
            .await?;

        response.into_account()
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Account, BackendError> {
        let response: SignInResponse = self
            .send_auth(
                self.inner
                    .client
                    .post(format!(
                        "{}/accounts:signInWithPassword",
                        self.inner.auth_endpoint
                    ))
                    .query(&self.key_param())
                    .json(&json!({
                        "email": email.as_str(),
                        "password": password,
                        "returnSecureToken": true,
                    })),
            )
            .await?;

        response.into_account()
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        // The auth service has no server-side sign-out; the issued token is
        // simply discarded. Identity is carried in our own session.
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        let result: Result<Document, BackendError> = self
            .send_json(
                self.inner
                    .client
                    .get(self.document_url(USERS_COLLECTION, id.as_str()))
                    .query(&self.key_param()),
            )
            .await;

        match result {
            Ok(doc) => Ok(Some(decode_profile(&doc)?)),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, profile), fields(id = %profile.id))]
    async fn set_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        let mut fields = BTreeMap::new();
        fields.insert(
            "email".to_owned(),
            Value::StringValue(profile.email.as_str().to_owned()),
        );
        fields.insert(
            "fullName".to_owned(),
            Value::StringValue(profile.full_name.clone()),
        );
        fields.insert(
            "createdAt".to_owned(),
            Value::TimestampValue(profile.created_at),
        );

        let _: Document = self
            .send_json(
                self.inner
                    .client
                    .patch(self.document_url(USERS_COLLECTION, profile.id.as_str()))
                    .query(&self.key_param())
                    .json(&Document::with_fields(fields)),
            )
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .send_json(
                self.inner
                    .client
                    .get(self.collection_url(PRODUCTS_COLLECTION))
                    .query(&self.key_param())
                    .query(&[("pageSize", "1")]),
            )
            .await?;
        Ok(())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// A typed field value in the document wire format.
///
/// Externally tagged, matching the REST representation exactly
/// (`{"stringValue": "Apple"}`, `{"doubleValue": 10.0}`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Value {
    StringValue(String),
    DoubleValue(f64),
    /// Int64 values arrive string-encoded.
    IntegerValue(String),
    TimestampValue(DateTime<Utc>),
    BooleanValue(bool),
}

/// A document in the wire format.
///
/// Only `fields` is ever sent; `name` and the server timestamps are
/// response-side metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing)]
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
    #[serde(default, rename = "createTime", skip_serializing)]
    create_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "updateTime", skip_serializing)]
    update_time: Option<DateTime<Utc>>,
}

impl Document {
    const fn with_fields(fields: BTreeMap<String, Value>) -> Self {
        Self {
            name: String::new(),
            fields,
            create_time: None,
            update_time: None,
        }
    }
}

/// One row of a `:runQuery` response. Rows without a document (for example a
/// trailing read-time marker on an empty result) are skipped.
#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
}

impl SignInResponse {
    fn into_account(self) -> Result<Account, BackendError> {
        let email = Email::parse(&self.email)
            .map_err(|e| BackendError::Decode(format!("invalid email from auth service: {e}")))?;
        Ok(Account {
            id: UserId::new(self.local_id),
            email,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error: AuthErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AuthErrorDetail {
    #[serde(default)]
    message: String,
}

// =============================================================================
// Codec
// =============================================================================

const fn direction_name(direction: OrderDirection) -> &'static str {
    match direction {
        OrderDirection::Ascending => "ASCENDING",
        OrderDirection::Descending => "DESCENDING",
    }
}

/// Map an auth service error message onto a failure kind.
fn map_auth_error(message: &str) -> BackendError {
    match message {
        "EMAIL_EXISTS" => BackendError::EmailExists,
        "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            BackendError::InvalidCredentials
        }
        m if m.starts_with("WEAK_PASSWORD") => BackendError::WeakPassword(m.to_owned()),
        m if m.starts_with("TOO_MANY_ATTEMPTS") => BackendError::RateLimited(60),
        other => BackendError::Unavailable(format!("auth service error: {other}")),
    }
}

/// The trailing segment of a document resource name is its id.
fn doc_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

fn get_string(doc: &Document, key: &str) -> Result<String, BackendError> {
    match doc.fields.get(key) {
        Some(Value::StringValue(s)) => Ok(s.clone()),
        _ => Err(BackendError::Decode(format!(
            "missing or non-string field `{key}` in {}",
            doc.name
        ))),
    }
}

fn get_opt_string(doc: &Document, key: &str) -> Option<String> {
    match doc.fields.get(key) {
        Some(Value::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn get_opt_timestamp(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    match doc.fields.get(key) {
        Some(Value::TimestampValue(t)) => Some(*t),
        _ => None,
    }
}

fn get_price(doc: &Document, key: &str) -> Result<Price, BackendError> {
    let decode_err = || {
        BackendError::Decode(format!(
            "missing or non-numeric field `{key}` in {}",
            doc.name
        ))
    };

    match doc.fields.get(key) {
        Some(Value::DoubleValue(v)) => Decimal::from_f64_retain(*v)
            .map(Price::new)
            .ok_or_else(decode_err),
        Some(Value::IntegerValue(v)) => v
            .parse::<i64>()
            .map(Price::from)
            .map_err(|_| decode_err()),
        _ => Err(decode_err()),
    }
}

fn encode_price(price: Price) -> Result<Value, BackendError> {
    price
        .amount()
        .to_f64()
        .map(Value::DoubleValue)
        .ok_or_else(|| BackendError::Decode("price not representable as a double".to_owned()))
}

fn decode_product(doc: &Document) -> Result<Product, BackendError> {
    let created_at = get_opt_timestamp(doc, "createdAt")
        .or(doc.create_time)
        .ok_or_else(|| {
            BackendError::Decode(format!("document {} has no creation time", doc.name))
        })?;

    Ok(Product {
        id: ProductId::new(doc_id(&doc.name)),
        name: get_string(doc, "name")?,
        price: get_price(doc, "price")?,
        image: get_string(doc, "image")?,
        description: get_opt_string(doc, "description"),
        created_at,
        updated_at: get_opt_timestamp(doc, "updatedAt"),
    })
}

fn encode_product(product: &Product) -> Result<BTreeMap<String, Value>, BackendError> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_owned(), Value::StringValue(product.name.clone()));
    fields.insert("price".to_owned(), encode_price(product.price)?);
    fields.insert("image".to_owned(), Value::StringValue(product.image.clone()));
    if let Some(description) = &product.description {
        fields.insert(
            "description".to_owned(),
            Value::StringValue(description.clone()),
        );
    }
    fields.insert(
        "createdAt".to_owned(),
        Value::TimestampValue(product.created_at),
    );
    if let Some(updated_at) = product.updated_at {
        fields.insert("updatedAt".to_owned(), Value::TimestampValue(updated_at));
    }
    Ok(fields)
}

fn decode_profile(doc: &Document) -> Result<UserProfile, BackendError> {
    let email = get_string(doc, "email")?;
    let email = Email::parse(&email)
        .map_err(|e| BackendError::Decode(format!("invalid email in {}: {e}", doc.name)))?;

    let created_at = get_opt_timestamp(doc, "createdAt")
        .or(doc.create_time)
        .ok_or_else(|| {
            BackendError::Decode(format!("document {} has no creation time", doc.name))
        })?;

    Ok(UserProfile {
        id: UserId::new(doc_id(&doc.name)),
        email,
        full_name: get_string(doc, "fullName")?,
        created_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), Value::StringValue("Apple".to_owned()));
        fields.insert("price".to_owned(), Value::DoubleValue(10.0));
        fields.insert(
            "image".to_owned(),
            Value::StringValue("https://images.orchard.dev/apple.jpg".to_owned()),
        );
        fields.insert(
            "createdAt".to_owned(),
            Value::TimestampValue("2026-01-01T00:00:00Z".parse().unwrap()),
        );

        Document {
            name: "projects/p/databases/(default)/documents/products/abc123".to_owned(),
            fields,
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_value_wire_shape() {
        let json = serde_json::to_value(Value::StringValue("Apple".to_owned())).unwrap();
        assert_eq!(json, serde_json::json!({ "stringValue": "Apple" }));

        let json = serde_json::to_value(Value::DoubleValue(10.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "doubleValue": 10.0 }));
    }

    #[test]
    fn test_document_serializes_fields_only() {
        let doc = sample_document();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("fields").is_some());
        assert!(json.get("name").is_none());
        assert!(json.get("createTime").is_none());
    }

    #[test]
    fn test_decode_product_from_document() {
        let product = decode_product(&sample_document()).unwrap();
        assert_eq!(product.id.as_str(), "abc123");
        assert_eq!(product.name, "Apple");
        assert_eq!(product.price, Price::from(10));
        assert!(product.description.is_none());
        assert!(product.updated_at.is_none());
    }

    #[test]
    fn test_decode_product_missing_field() {
        let mut doc = sample_document();
        doc.fields.remove("name");
        assert!(matches!(
            decode_product(&doc),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn test_product_codec_roundtrip() {
        let original = decode_product(&sample_document()).unwrap();
        let fields = encode_product(&original).unwrap();
        let doc = Document {
            name: sample_document().name,
            fields,
            create_time: None,
            update_time: None,
        };
        assert_eq!(decode_product(&doc).unwrap(), original);
    }

    #[test]
    fn test_integer_priced_document() {
        let mut doc = sample_document();
        doc.fields
            .insert("price".to_owned(), Value::IntegerValue("8".to_owned()));
        assert_eq!(decode_product(&doc).unwrap().price, Price::from(8));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            map_auth_error("EMAIL_EXISTS"),
            BackendError::EmailExists
        ));
        assert!(matches!(
            map_auth_error("INVALID_PASSWORD"),
            BackendError::InvalidCredentials
        ));
        assert!(matches!(
            map_auth_error("EMAIL_NOT_FOUND"),
            BackendError::InvalidCredentials
        ));
        assert!(matches!(
            map_auth_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            BackendError::WeakPassword(_)
        ));
        assert!(matches!(
            map_auth_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            BackendError::RateLimited(_)
        ));
        assert!(matches!(
            map_auth_error("SOMETHING_ELSE"),
            BackendError::Unavailable(_)
        ));
    }

    #[test]
    fn test_doc_id_takes_trailing_segment() {
        assert_eq!(doc_id("projects/p/databases/(default)/documents/users/u1"), "u1");
        assert_eq!(doc_id("bare"), "bare");
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(direction_name(OrderDirection::Ascending), "ASCENDING");
        assert_eq!(direction_name(OrderDirection::Descending), "DESCENDING");
    }
}
