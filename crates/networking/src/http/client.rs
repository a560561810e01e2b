//! Habit League HTTP client with bearer-token authentication

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    multipart, Client, Response, StatusCode,
};
use habitleague_core::{
    Achievement, Challenge, ChallengeCategory, ChallengeCreation, ChallengeJoin,
    ChallengeParticipant, CreatedEvidence, DailySubmissionStatus, Error, Evidence, EvidenceStats,
    Payment, PaymentData, PaymentStatusResponse, ProcessPaymentResponse, ProfileUpdate, Result,
    SubmitEvidenceRequest, UploadImageResponse, User, UserLogin, UserRegistration,
};
use habitleague_persistence::cache::ChallengeCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::ClientConfig;

const USER_AGENT_VALUE: &str = "HabitLeague/0.1 (headless client)";

/// HTTP client for the Habit League REST API
///
/// Sends the JWT as a bearer `Authorization` header on every
/// authenticated request. Optionally uses an in-memory cache for
/// challenge data to reduce API calls.
pub struct HabitLeagueClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    /// Optional shared challenge cache (shared across all clients)
    cache: Option<Arc<ChallengeCache>>,
}

impl HabitLeagueClient {
    /// Create an unauthenticated client (register/login only)
    pub fn new(config: ClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url,
            token: None,
            cache: None,
        }
    }

    /// Create a client authenticated with the given JWT
    pub fn with_token(config: ClientConfig, token: &str) -> Self {
        let mut client = Self::new(config);
        client.token = Some(token.to_string());
        client
    }

    /// Attach a shared challenge cache
    pub fn with_cache(mut self, cache: Arc<ChallengeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the bearer token (e.g., after login)
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    /// Get the bearer token (for persisting the session)
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get a reference to the cache (if one is attached)
    pub fn cache(&self) -> Option<&Arc<ChallengeCache>> {
        self.cache.as_ref()
    }

    /// Default headers for JSON requests
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref token) = self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    /// Check if response indicates authentication failure
    fn check_auth_error(response: &Response) -> Option<Error> {
        match response.status().as_u16() {
            401 => Some(Error::TokenExpired),
            403 => Some(Error::AuthenticationError("Access denied".to_string())),
            _ => None,
        }
    }

    /// Build a human-readable failure message from a non-success response body
    fn describe_failure(status: StatusCode, body: &str) -> String {
        // The backend usually wraps errors as {"message": ...} or {"error": ...}
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| match status.as_u16() {
                404 => "Resource not found".to_string(),
                500 => "Server error. Please try again later".to_string(),
                _ => body.to_string(),
            });

        format!("HTTP {}: {}", status.as_u16(), detail)
    }

    /// Common response handling: auth check, status check, JSON parse
    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Request failed: HTTP {} — {}", status, body);
            return Err(Error::ApiError(Self::describe_failure(status, &body)));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse response body: {}", e);
            Error::InvalidData(e.to_string())
        })
    }

    /// Discard the body of a response, keeping only success/failure
    async fn expect_success(response: Response) -> Result<()> {
        if let Some(err) = Self::check_auth_error(&response) {
            return Err(err);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Request failed: HTTP {} — {}", status, body);
            return Err(Error::ApiError(Self::describe_failure(status, &body)));
        }

        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).headers(self.headers()).send().await?;
        Self::parse_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .put(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    // ─── Authentication ──────────────────────────────────────────────

    /// Register a new user. Returns the JWT issued by the backend.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &UserRegistration) -> Result<String> {
        let url = format!("{}/api/auth/register", self.base_url);
        debug!("Registering new user");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(registration)
            .send()
            .await?;

        Self::extract_token_response(response).await
    }

    /// Authenticate an existing user. Returns the JWT issued by the backend.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &UserLogin) -> Result<String> {
        let url = format!("{}/api/auth/login", self.base_url);
        debug!("Logging in");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(credentials)
            .send()
            .await?;

        Self::extract_token_response(response).await
    }

    /// The auth endpoints answer with either `{"token": ...}` JSON or the
    /// bare JWT as plain text, depending on backend version.
    async fn extract_token_response(response: Response) -> Result<String> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(Error::AuthenticationError(
                "Invalid credentials".to_string(),
            ));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let raw = response.text().await?;

        if !status.is_success() {
            error!("Auth request failed: HTTP {} — {}", status, raw);
            return Err(Error::AuthenticationError(Self::describe_failure(
                status, &raw,
            )));
        }

        Ok(extract_token(is_json, &raw))
    }

    /// Create or update the authenticated user's profile
    #[instrument(skip(self, profile))]
    pub async fn create_profile(&self, profile: &ProfileUpdate) -> Result<User> {
        self.post_json("/api/auth/profile", profile).await
    }

    /// Get the authenticated user's profile
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User> {
        debug!("Fetching profile from /api/user/profile");
        self.get_json("/api/user/profile").await
    }

    /// Update the authenticated user's profile
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.put_json("/api/user/profile", update).await
    }

    // ─── Challenges ──────────────────────────────────────────────────

    /// List all available challenges
    #[instrument(skip(self))]
    pub async fn get_challenges(&self) -> Result<Vec<Challenge>> {
        self.get_json("/api/challenges").await
    }

    /// Get a specific challenge, including its registered geofence
    /// (cache-aware)
    #[instrument(skip(self))]
    pub async fn get_challenge(&self, id: i64) -> Result<Challenge> {
        if let Some(ref cache) = self.cache {
            if let Some(cached) = cache.get(id) {
                debug!("Cache hit for challenge {}", id);
                return Ok(cached);
            }
        }

        let challenge: Challenge = self.get_json(&format!("/api/challenges/{}", id)).await?;

        debug!("Challenge fetched: {} ({:?})", challenge.name, challenge.status);

        if let Some(ref cache) = self.cache {
            cache.insert(challenge.clone());
        }

        Ok(challenge)
    }

    /// List the challenges the authenticated user participates in
    #[instrument(skip(self))]
    pub async fn get_my_challenges(&self) -> Result<Vec<Challenge>> {
        self.get_json("/api/challenges/my-challenges").await
    }

    /// List the most popular challenges
    #[instrument(skip(self))]
    pub async fn get_popular_challenges(&self, limit: u32) -> Result<Vec<Challenge>> {
        self.get_json(&format!("/api/challenges/popular?limit={}", limit))
            .await
    }

    /// List challenges in a category
    #[instrument(skip(self))]
    pub async fn get_challenges_by_category(
        &self,
        category: ChallengeCategory,
    ) -> Result<Vec<Challenge>> {
        self.get_json(&format!("/api/challenges/category/{}", category.as_str()))
            .await
    }

    /// List the participants of a challenge
    #[instrument(skip(self))]
    pub async fn get_challenge_participants(
        &self,
        id: i64,
    ) -> Result<Vec<ChallengeParticipant>> {
        self.get_json(&format!("/api/challenges/{}/participants", id))
            .await
    }

    /// Join a challenge (entry-fee payment + participant geofence)
    #[instrument(skip(self, join))]
    pub async fn join_challenge(&self, id: i64, join: &ChallengeJoin) -> Result<()> {
        let url = format!("{}/api/challenges/{}/join", self.base_url, id);
        debug!("Joining challenge {}", id);

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(join)
            .send()
            .await?;

        Self::expect_success(response).await?;

        // Participant count changed
        if let Some(ref cache) = self.cache {
            cache.invalidate(id);
        }

        Ok(())
    }

    /// Leave a challenge
    #[instrument(skip(self))]
    pub async fn leave_challenge(&self, id: i64) -> Result<()> {
        let url = format!("{}/api/challenges/{}/join", self.base_url, id);
        debug!("Leaving challenge {}", id);

        let response = self.http.delete(&url).headers(self.headers()).send().await?;
        Self::expect_success(response).await?;

        if let Some(ref cache) = self.cache {
            cache.invalidate(id);
        }

        Ok(())
    }

    /// Create a new challenge
    #[instrument(skip(self, creation), fields(name = %creation.name))]
    pub async fn create_challenge(&self, creation: &ChallengeCreation) -> Result<()> {
        let url = format!("{}/api/challenges", self.base_url);
        debug!("Creating challenge");

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(creation)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    // ─── Evidences ───────────────────────────────────────────────────

    /// Ask the backend whether the user already submitted evidence today
    /// for this challenge. Returns errors as-is; the submission workflow
    /// treats a failure here as "not submitted yet".
    #[instrument(skip(self))]
    pub async fn get_daily_submission_status(
        &self,
        challenge_id: i64,
    ) -> Result<DailySubmissionStatus> {
        self.get_json(&format!(
            "/api/evidences/challenge/{}/daily-status",
            challenge_id
        ))
        .await
    }

    /// Upload an evidence image (multipart field `image`, jpeg).
    /// Returns the stable URL assigned by the backend.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_evidence_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}/api/evidences/upload", self.base_url);
        debug!("Uploading evidence image {}", file_name);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadImageResponse = Self::parse_json(response).await?;
        debug!("Image uploaded: {}", uploaded.image_url);
        Ok(uploaded.image_url)
    }

    /// Submit an evidence record for a challenge
    #[instrument(skip(self, request), fields(challenge_id = request.challenge_id))]
    pub async fn submit_evidence(&self, request: &SubmitEvidenceRequest) -> Result<CreatedEvidence> {
        debug!("Submitting evidence for challenge {}", request.challenge_id);
        let created: CreatedEvidence = self.post_json("/api/evidences", request).await?;
        debug!("Evidence created with id {}", created.id);
        Ok(created)
    }

    /// Get the evidence history for a challenge
    #[instrument(skip(self))]
    pub async fn get_evidence_history(&self, challenge_id: i64) -> Result<Vec<Evidence>> {
        self.get_json(&format!("/api/evidences/challenge/{}", challenge_id))
            .await
    }

    /// List all of the authenticated user's evidences
    #[instrument(skip(self))]
    pub async fn get_my_evidences(&self) -> Result<Vec<Evidence>> {
        self.get_json("/api/evidences/my-evidences").await
    }

    /// Get the authenticated user's evidence statistics
    #[instrument(skip(self))]
    pub async fn get_my_evidence_stats(&self) -> Result<EvidenceStats> {
        self.get_json("/api/evidences/my-stats").await
    }

    /// Get a specific evidence record
    #[instrument(skip(self))]
    pub async fn get_evidence(&self, id: i64) -> Result<Evidence> {
        self.get_json(&format!("/api/evidences/{}", id)).await
    }

    // ─── Payments ────────────────────────────────────────────────────

    /// Process an entry-fee payment
    #[instrument(skip(self, payment))]
    pub async fn process_payment(&self, payment: &PaymentData) -> Result<ProcessPaymentResponse> {
        self.post_json("/api/payments/process", payment).await
    }

    /// List the authenticated user's payments
    #[instrument(skip(self))]
    pub async fn get_my_payments(&self) -> Result<Vec<Payment>> {
        self.get_json("/api/payments/my-payments").await
    }

    /// Get the payment status for a challenge
    #[instrument(skip(self))]
    pub async fn get_payment_status(&self, challenge_id: i64) -> Result<PaymentStatusResponse> {
        self.get_json(&format!("/api/payments/challenge/{}", challenge_id))
            .await
    }

    // ─── Achievements ────────────────────────────────────────────────

    /// List all achievements
    #[instrument(skip(self))]
    pub async fn get_achievements(&self) -> Result<Vec<Achievement>> {
        self.get_json("/api/achievements").await
    }

    /// List the authenticated user's achievements
    #[instrument(skip(self))]
    pub async fn get_my_achievements(&self) -> Result<Vec<Achievement>> {
        self.get_json("/api/achievements/my-achievements").await
    }
}

/// Pull the JWT out of an auth response body.
///
/// Older backend builds answer with the bare token as text; newer ones wrap
/// it as `{"token": ...}` (or `accessToken` / `access_token`).
fn extract_token(is_json: bool, raw: &str) -> String {
    if is_json {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
            for key in ["token", "accessToken", "access_token"] {
                if let Some(token) = value.get(key).and_then(|t| t.as_str()) {
                    return token.to_string();
                }
            }
        }
    }
    raw.to_string()
}
