//! HTTP client for the Valoriza Vilhena Strapi API
//!
//! # Example
//!
//! ```rust,no_run
//! use valoriza_client::{ApiClient, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = ApiClient::new(ClientConfig {
//!     base_url: "http://localhost:1337/api".into(),
//!     ..Default::default()
//! })?;
//!
//! let auth = client.login("joao.silva@email.com", "senha123").await?;
//! client.set_token(auth.jwt);
//!
//! // Resolve a scanned QR payload to a place
//! let place = client.find_place_by_code("QR_MERCADO_MUNICIPAL_003").await?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header, Client, Method, StatusCode};
use serde_json::json;
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::types::*;

/// Query options for listing places
#[derive(Debug, Clone, Default)]
pub struct PlaceQuery {
    /// Filter by category
    pub category: Option<Category>,
    /// Case-insensitive name search
    pub search: Option<String>,
    /// Strapi sort expression, e.g. `nome:asc`
    pub sort: Option<String>,
}

impl PlaceQuery {
    fn to_params(&self) -> Vec<String> {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(format!(
                "filters[categoria][$eq]={}",
                urlencoding::encode(category.as_str())
            ));
        }
        if let Some(ref search) = self.search {
            params.push(format!(
                "filters[nome][$containsi]={}",
                urlencoding::encode(search)
            ));
        }
        if let Some(ref sort) = self.sort {
            params.push(format!("sort={}", urlencoding::encode(sort)));
        }
        params
    }
}

/// HTTP client for the Strapi REST surface
pub struct ApiClient {
    config: ClientConfig,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Replace the bearer token (after login/register)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.config.token = Some(token.into());
    }

    /// Whether a bearer token is present
    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(ref token) = self.config.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    // ==================== Places ====================

    /// List places with optional category/search/sort filters
    pub async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>> {
        let mut url = self.url("/locals");
        let params = query.to_params();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        let response = self.request(Method::GET, &url).send().await?;
        let body: Collection<Place> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Fetch a place by id
    pub async fn get_place(&self, place_id: u64) -> Result<Place> {
        let url = self.url(&format!("/locals/{}", place_id));
        let response = self.request(Method::GET, &url).send().await?;
        let body: Document<Place> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Resolve a scanned QR payload to its place, if any
    pub async fn find_place_by_code(&self, code: &str) -> Result<Option<Place>> {
        let url = format!(
            "{}?filters[qr_code_id][$eq]={}&populate=*",
            self.url("/locals"),
            urlencoding::encode(code)
        );

        let response = self.request(Method::GET, &url).send().await?;
        let body: Collection<Place> = self.handle_response(response).await?;
        Ok(body.data.into_iter().next())
    }

    // ==================== Daily missions ====================

    /// Fetch the full mission catalog
    pub async fn list_missions(&self) -> Result<Vec<Mission>> {
        let url = format!("{}?populate=*", self.url("/daily-missions"));
        let response = self.request(Method::GET, &url).send().await?;
        let body: Collection<Mission> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Fetch the missions already completed by a user
    pub async fn completed_missions(&self, user_id: u64) -> Result<Vec<Mission>> {
        let url = format!(
            "{}?populate=*&filters[users_permissions_users][id][$eq]={}",
            self.url("/daily-missions"),
            user_id
        );
        let response = self.request(Method::GET, &url).send().await?;
        let body: Collection<Mission> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Fetch a mission by its stable key
    pub async fn get_mission(&self, key: &str) -> Result<Mission> {
        let url = format!(
            "{}/{}?populate=*",
            self.url("/daily-missions"),
            urlencoding::encode(key)
        );
        let response = self.request(Method::GET, &url).send().await?;
        let body: Document<Mission> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Connect the user to the mission's completed relation (additive only)
    pub async fn complete_mission(&self, key: &str, user_id: u64) -> Result<()> {
        let url = format!("{}/{}", self.url("/daily-missions"), urlencoding::encode(key));
        let body = json!({
            "data": {
                "users_permissions_users": { "connect": [user_id] }
            }
        });

        let response = self
            .request(Method::PUT, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        self.check_status(response).await
    }

    // ==================== Users ====================

    /// Fetch the authenticated user's record
    pub async fn me(&self) -> Result<User> {
        let url = format!("{}?populate=*", self.url("/users/me"));
        let response = self.request(Method::GET, &url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch a user by id
    pub async fn get_user(&self, user_id: u64) -> Result<User> {
        let url = format!("{}?populate=*", self.url(&format!("/users/{}", user_id)));
        let response = self.request(Method::GET, &url).send().await?;
        self.handle_response(response).await
    }

    /// Update a user record (points, relation connects)
    pub async fn update_user(&self, user_id: u64, body: &serde_json::Value) -> Result<User> {
        let url = self.url(&format!("/users/{}", user_id));
        let response = self
            .request(Method::PUT, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Add the place to the user's scanned-today relation.
    ///
    /// Additive connect; existing entries are never removed.
    pub async fn record_daily_scan(&self, user_id: u64, place_id: u64) -> Result<()> {
        self.update_user(
            user_id,
            &json!({ "daily_locals_scanned": { "connect": [place_id] } }),
        )
        .await?;
        Ok(())
    }

    /// Add points to a user's total and return the refreshed record.
    ///
    /// Reads the current total, writes the incremented value, then re-reads
    /// the authoritative record. The backend read is the source of truth
    /// after each call; no negative delta exists in this API.
    pub async fn add_points(&self, user_id: u64, delta: u64) -> Result<User> {
        if self.config.token.is_none() {
            return Err(ApiError::Unauthenticated);
        }

        let current = self.get_user(user_id).await?;
        let new_total = current.points + delta;
        self.update_user(user_id, &json!({ "pontos": new_total }))
            .await?;

        // Resync: the server record replaces any local increment
        self.me().await
    }

    /// Top users by point total
    pub async fn ranking(&self, limit: u32) -> Result<Vec<User>> {
        let url = format!(
            "{}?sort=pontos:desc&pagination[limit]={}",
            self.url("/users"),
            limit
        );
        let response = self.request(Method::GET, &url).send().await?;
        self.handle_response(response).await
    }

    // ==================== Auth ====================

    /// Sign in with identifier (email/username) and password
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let url = self.url("/auth/local");
        let body = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create an account; returns the token and the fresh user record
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let url = self.url("/auth/local/register");
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ==================== Rewards ====================

    /// List rewards, cheapest first
    pub async fn list_rewards(&self) -> Result<Vec<Reward>> {
        let url = format!("{}?sort=pontos_necessarios:asc", self.url("/premios"));
        let response = self.request(Method::GET, &url).send().await?;
        let body: Collection<Reward> = self.handle_response(response).await?;
        Ok(body.data)
    }

    /// Redeem a reward for a user
    pub async fn redeem_reward(&self, reward_id: u64, user_id: u64) -> Result<()> {
        let url = self.url("/premios/redeem");
        let body = json!({ "premioId": reward_id, "userId": user_id });

        let response = self
            .request(Method::POST, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        self.check_status(response).await
    }

    // ==================== Upload ====================

    /// Upload a file (multipart) and return the stored file metadata
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Vec<UploadedFile>> {
        let url = self.url("/upload");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("files", part);

        let response = self.request(Method::POST, &url).multipart(form).send().await?;
        self.handle_response(response).await
    }

    // ==================== Helpers ====================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound("resource not found".to_string()));
        }
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthenticated);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Server { status, message });
        }

        let body = response.json().await?;
        Ok(body)
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<()> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound("resource not found".to_string()));
        }
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthenticated);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Server { status, message });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::backend::GameBackend for ApiClient {
    fn is_authenticated(&self) -> bool {
        self.has_token()
    }

    async fn get_place(&self, place_id: u64) -> Result<Place> {
        ApiClient::get_place(self, place_id).await
    }

    async fn me(&self) -> Result<User> {
        ApiClient::me(self).await
    }

    async fn record_daily_scan(&self, user_id: u64, place_id: u64) -> Result<()> {
        ApiClient::record_daily_scan(self, user_id, place_id).await
    }

    async fn add_points(&self, user_id: u64, delta: u64) -> Result<User> {
        ApiClient::add_points(self, user_id, delta).await
    }

    async fn list_missions(&self) -> Result<Vec<Mission>> {
        ApiClient::list_missions(self).await
    }

    async fn completed_missions(&self, user_id: u64) -> Result<Vec<Mission>> {
        ApiClient::completed_missions(self, user_id).await
    }

    async fn get_mission(&self, key: &str) -> Result<Mission> {
        ApiClient::get_mission(self, key).await
    }

    async fn complete_mission(&self, key: &str, user_id: u64) -> Result<()> {
        ApiClient::complete_mission(self, key, user_id).await
    }
}
