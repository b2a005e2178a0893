//! `reqwest` client for the marketplace backend.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use seller_dashboard_core::{Email, Product, ProductId, Seller, SellerId, SellerProfile};

use super::ApiError;
use crate::config::DashboardConfig;

/// Whether a request carries the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// Attach the cookie jar and store any cookies the response sets.
    Include,
    /// Send the request without cookies.
    Omit,
}

/// Marketplace backend API client.
///
/// Cheaply cloneable; clones share the cookie jar.
#[derive(Clone)]
pub struct SellerApi {
    inner: Arc<SellerApiInner>,
}

struct SellerApiInner {
    config: DashboardConfig,
    /// Client with the cookie jar attached
    with_credentials: reqwest::Client,
    /// Client without cookies
    anonymous: reqwest::Client,
    jar: Arc<Jar>,
}

impl std::fmt::Debug for SellerApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerApi")
            .field("base_url", &self.inner.config.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Body of a successful login.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: Option<LoginIdentity>,
}

#[derive(Debug, Deserialize)]
struct LoginIdentity {
    id: Option<SellerId>,
}

/// Body of a successful product creation, when the backend sends one.
#[derive(Debug, Deserialize)]
struct CreatedProduct {
    id: Option<serde_json::Value>,
}

impl SellerApi {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP clients cannot be built.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());

        let with_credentials = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        let anonymous = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(SellerApiInner {
                config,
                with_credentials,
                anonymous,
                jar,
            }),
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // =========================================================================
    // Cookie persistence
    // =========================================================================

    /// Export the cookies held for the backend as a `Cookie` header value.
    #[must_use]
    pub fn export_cookies(&self) -> Option<String> {
        self.inner
            .jar
            .cookies(&self.inner.config.api_base_url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Load cookies previously returned by [`Self::export_cookies`].
    pub fn import_cookies(&self, header: &str) {
        let url = &self.inner.config.api_base_url;
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.inner.jar.add_cookie_str(pair, url);
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/login`. Returns the id of the authenticated seller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` on rejected credentials,
    /// `ApiError::MissingIdentity` if the body has no user id, or a
    /// transport error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<SellerId, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .request(Method::POST, "auth/login", Credentials::Include)?
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = decode(check(response).await?).await?;

        login
            .user
            .and_then(|u| u.id)
            .filter(|id| !id.is_empty())
            .ok_or(ApiError::MissingIdentity)
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, "auth/logout", Credentials::Include)?
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Sellers
    // =========================================================================

    /// `GET /seller/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingIdentity` if the body has no non-empty `id`,
    /// `ApiError::Decode` if the rest of the record is malformed, or a
    /// transport/status error.
    #[instrument(skip(self), fields(seller_id = %id))]
    pub async fn get_seller(
        &self,
        id: &SellerId,
        credentials: Credentials,
    ) -> Result<Seller, ApiError> {
        let response = self
            .request(Method::GET, &format!("seller/{id}"), credentials)?
            .send()
            .await?;
        let body: serde_json::Value = decode(check(response).await?).await?;

        let has_identity = match body.get("id") {
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            _ => false,
        };
        if !has_identity {
            return Err(ApiError::MissingIdentity);
        }

        Ok(serde_json::from_value(body)?)
    }

    /// `POST /seller` with the full signup payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` carrying the backend's first issue
    /// message when the payload is rejected with a structured body.
    #[instrument(skip(self, profile, password), fields(email = %profile.email))]
    pub async fn create_seller(
        &self,
        profile: &SellerProfile,
        password: &SecretString,
    ) -> Result<Seller, ApiError> {
        let mut body = serde_json::to_value(profile)?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert(
                "password".to_owned(),
                serde_json::Value::String(password.expose_secret().to_owned()),
            );
        }

        let response = self
            .request(Method::POST, "seller", Credentials::Omit)?
            .json(&body)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    /// `PUT /seller` with every profile field plus the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or the
    /// returned record is malformed.
    #[instrument(skip(self, profile), fields(seller_id = %id))]
    pub async fn update_seller(
        &self,
        id: &SellerId,
        profile: &SellerProfile,
    ) -> Result<Seller, ApiError> {
        let payload = Seller::new(id.clone(), profile.clone());

        let response = self
            .request(Method::PUT, "seller", Credentials::Include)?
            .json(&payload)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    /// `PUT /seller` with only the id and a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, password), fields(seller_id = %id))]
    pub async fn update_password(
        &self,
        id: &SellerId,
        password: &SecretString,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "id": id,
            "password": password.expose_secret(),
        });

        let response = self
            .request(Method::PUT, "seller", Credentials::Include)?
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// `GET /product/seller`: every product of the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or the
    /// body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .request(Method::GET, "product/seller", Credentials::Include)?
            .send()
            .await?;
        decode(check(response).await?).await
    }

    /// `POST /product`. Returns the backend-assigned id when the response
    /// body carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: &Product) -> Result<Option<ProductId>, ApiError> {
        let response = self
            .request(Method::POST, "product", Credentials::Include)?
            .json(product)
            .send()
            .await?;
        let bytes = check(response).await?.bytes().await?;

        // An empty or non-JSON body is a valid success; only the id matters.
        let assigned = serde_json::from_slice::<CreatedProduct>(&bytes)
            .ok()
            .and_then(|created| created.id)
            .and_then(|id| match id {
                serde_json::Value::String(s) if !s.is_empty() => Some(ProductId::new(s)),
                serde_json::Value::Number(n) => Some(ProductId::new(n.to_string())),
                _ => None,
            });

        Ok(assigned)
    }

    /// `PUT /product` with every field plus the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update_product(&self, product: &Product) -> Result<(), ApiError> {
        let response = self
            .request(Method::PUT, "product", Credentials::Include)?
            .json(product)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// `DELETE /product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("product/{id}"), Credentials::Include)?
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: Credentials,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.config.endpoint(path)?;
        let client = match credentials {
            Credentials::Include => &self.inner.with_credentials,
            Credentials::Omit => &self.inner.anonymous,
        };
        Ok(client.request(method, url))
    }
}

/// Turn a non-success response into an error.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "backend returned an error status");
    Err(ApiError::from_status(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
