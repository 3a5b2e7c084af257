//! REST client for the Batoners service.
//!
//! [`ProgressApi`] is the seam the sync loops talk to; [`HttpProgressApi`]
//! implements it over [`reqwest`]. The bearer token issued by `login` is
//! kept inside the client and attached to every protected call.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use batoners_core::achievement::Achievement;
use batoners_core::league::League;
use batoners_core::player::{LeaderboardEntry, Player, ProgressUpdate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Response of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Player,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    telegram_id: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
struct AchievementsBody<'a> {
    achievements: &'a [Achievement],
}

/// Operations the game client needs from the service.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Log in (creating the profile on first contact) and remember the token.
    async fn login(&self, telegram_id: &str, username: &str) -> ClientResult<LoginResponse>;

    /// Push a (partial) progress update. Returns the stored document.
    async fn save_progress(&self, update: &ProgressUpdate) -> ClientResult<Player>;

    /// Fetch the authenticated player's document.
    async fn fetch_profile(&self) -> ClientResult<Player>;

    async fn leaderboard(
        &self,
        league: Option<League>,
        limit: Option<i64>,
    ) -> ClientResult<Vec<LeaderboardEntry>>;

    /// Report achievements. Returns the merged list.
    async fn update_achievements(
        &self,
        achievements: &[Achievement],
    ) -> ClientResult<Vec<Achievement>>;
}

/// HTTP implementation of [`ProgressApi`].
pub struct HttpProgressApi {
    client: reqwest::Client,
    api_url: String,
    token: RwLock<Option<String>>,
}

impl HttpProgressApi {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    ///
    /// * `api_url` - Base URL including the `/api` prefix.
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// The bearer token from the last successful login, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn require_token(&self) -> ClientResult<String> {
        self.token().ok_or(ClientError::NotInitialized)
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, otherwise a
    /// [`ClientError::Api`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProgressApi for HttpProgressApi {
    async fn login(&self, telegram_id: &str, username: &str) -> ClientResult<LoginResponse> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginBody {
                telegram_id,
                username,
            })
            .send()
            .await?;

        let login: LoginResponse = Self::parse_response(response).await?;
        self.set_token(Some(login.token.clone()));
        Ok(login)
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> ClientResult<Player> {
        let token = self.require_token()?;
        let response = self
            .client
            .post(self.url("/save-progress"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn fetch_profile(&self) -> ClientResult<Player> {
        let token = self.require_token()?;
        let response = self
            .client
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn leaderboard(
        &self,
        league: Option<League>,
        limit: Option<i64>,
    ) -> ClientResult<Vec<LeaderboardEntry>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(league) = league {
            query.push(("league", league.as_str().to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .client
            .get(self.url("/leaderboard"))
            .query(&query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn update_achievements(
        &self,
        achievements: &[Achievement],
    ) -> ClientResult<Vec<Achievement>> {
        let token = self.require_token()?;
        let response = self
            .client
            .post(self.url("/achievements"))
            .bearer_auth(token)
            .json(&AchievementsBody { achievements })
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
