use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::Settings;

/// The current user, replaced wholesale on each successful fetch and never
/// partially mutated.
pub type UserInfo = Map<String, Value>;

#[derive(Debug, Default)]
struct SessionState {
    main_content_loading: bool,
    user: UserInfo,
}

/// Global session state: the main-content loading indicator and the signed
/// in user. Constructed once at application start and shared by reference;
/// mutated only by the coordinator and the explicit user-fetch action.
pub struct SessionStore {
    state: RwLock<SessionState>,
    http: Client,
    user_info_url: String,
    table_data_url: String,
}

impl SessionStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            http: Client::new(),
            user_info_url: settings.user_info_url.clone(),
            table_data_url: settings.table_data_url.clone(),
        }
    }

    pub async fn main_content_loading(&self) -> bool {
        self.state.read().await.main_content_loading
    }

    pub async fn set_main_content_loading(&self, loading: bool) {
        debug!(loading, "session: main content loading");
        self.state.write().await.main_content_loading = loading;
    }

    pub async fn user(&self) -> UserInfo {
        self.state.read().await.user.clone()
    }

    /// Replaces the stored user with a copy of `user`. Callers keep
    /// ownership of their map; mutating it afterwards does not reach the
    /// store.
    pub async fn update_user(&self, user: &UserInfo) {
        self.state.write().await.user = user.clone();
    }

    /// Fetches the current user from the configured endpoint and commits it
    /// on success. The response envelope is `{"data": object}`; a missing
    /// or non-object `data` commits an empty user. On failure the error
    /// propagates and the store is left unchanged.
    pub async fn fetch_user(&self) -> Result<UserInfo> {
        let body: Value = self
            .http
            .get(&self.user_info_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid user info payload from '{}'", self.user_info_url))?;

        let user = match body.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => UserInfo::new(),
        };
        self.update_user(&user).await;
        Ok(user)
    }

    /// Table-data read used by the record views: one GET against the
    /// configured endpoint with `params` serialized as the query string.
    pub async fn fetch_table_data<P>(&self, params: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let body = self
            .http
            .get(&self.table_data_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| {
                format!("invalid table data payload from '{}'", self.table_data_url)
            })?;
        Ok(body)
    }
}
