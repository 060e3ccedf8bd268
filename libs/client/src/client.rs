//! Typed REST client for the auth and API services

use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shop::{NewOrderRequest, Order, Product, ProductInput, UserSession};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Account as returned by the profile and user list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for every collaborator endpoint
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    auth_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn auth(&self, path: &str) -> String {
        format!("{}{}", self.auth_url, path)
    }

    // Auth service

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<UserSession> {
        let request = self
            .http
            .post(self.auth("/api/users/login"))
            .json(&Credentials { email, password });
        send(request).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<UserSession> {
        let request = self
            .http
            .post(self.auth("/api/users/register"))
            .json(&Registration {
                name,
                email,
                password,
            });
        send(request).await
    }

    pub async fn profile(&self, token: &str) -> ClientResult<UserProfile> {
        send(self.http.get(self.auth("/api/users/profile")).bearer_auth(token)).await
    }

    /// Revoke `token` server side
    pub async fn logout(&self, token: &str) -> ClientResult<()> {
        send_empty(self.http.post(self.auth("/api/users/logout")).bearer_auth(token)).await
    }

    pub async fn list_users(&self, token: &str) -> ClientResult<Vec<UserProfile>> {
        send(self.http.get(self.auth("/api/users")).bearer_auth(token)).await
    }

    // Catalog

    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        send(self.http.get(self.api("/api/products"))).await
    }

    pub async fn get_product(&self, id: Uuid) -> ClientResult<Product> {
        send(self.http.get(self.api(&format!("/api/products/{id}")))).await
    }

    pub async fn create_product(&self, token: &str, input: &ProductInput) -> ClientResult<Product> {
        let request = self
            .http
            .post(self.api("/api/products"))
            .bearer_auth(token)
            .json(input);
        send(request).await
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: Uuid,
        input: &ProductInput,
    ) -> ClientResult<Product> {
        let request = self
            .http
            .put(self.api(&format!("/api/products/{id}")))
            .bearer_auth(token)
            .json(input);
        send(request).await
    }

    pub async fn delete_product(&self, token: &str, id: Uuid) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.api(&format!("/api/products/{id}")))
            .bearer_auth(token);
        send_empty(request).await
    }

    // Orders

    pub async fn create_order(&self, token: &str, order: &NewOrderRequest) -> ClientResult<Order> {
        let request = self
            .http
            .post(self.api("/api/orders"))
            .bearer_auth(token)
            .json(order);
        send(request).await
    }

    pub async fn my_orders(&self, token: &str) -> ClientResult<Vec<Order>> {
        send(self.http.get(self.api("/api/orders/mine")).bearer_auth(token)).await
    }

    pub async fn get_order(&self, token: &str, id: Uuid) -> ClientResult<Order> {
        let request = self
            .http
            .get(self.api(&format!("/api/orders/{id}")))
            .bearer_auth(token);
        send(request).await
    }

    pub async fn list_orders(&self, token: &str) -> ClientResult<Vec<Order>> {
        send(self.http.get(self.api("/api/orders")).bearer_auth(token)).await
    }

    /// Confirm delivery, which also records payment
    pub async fn deliver_order(&self, token: &str, id: Uuid) -> ClientResult<Order> {
        let request = self
            .http
            .put(self.api(&format!("/api/orders/{id}/deliver")))
            .bearer_auth(token);
        send(request).await
    }

    pub async fn delete_order(&self, token: &str, id: Uuid) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.api(&format!("/api/orders/{id}")))
            .bearer_auth(token);
        send_empty(request).await
    }

    // Upload

    /// Upload one image and return its hosted URL
    pub async fn upload_image(
        &self,
        token: &str,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> ClientResult<String> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("image", part);

        let request = self
            .http
            .post(self.api("/api/upload"))
            .bearer_auth(token)
            .multipart(form);
        let uploaded: UploadResponse = send(request).await?;
        Ok(uploaded.url)
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    let response = checked(request).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

async fn send_empty(request: RequestBuilder) -> ClientResult<()> {
    checked(request).await.map(|_| ())
}

/// Send and turn non-success statuses into errors
async fn checked(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} {}", status, response.url().path());

    if status.is_success() {
        return Ok(response);
    }

    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&raw)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if raw.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                raw
            }
        });

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(message));
    }

    warn!("Collaborator returned {}: {}", status, message);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
