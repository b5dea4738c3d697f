use crate::models::{Bookmark, Identity, NewBookmark};
use crate::storage::{IDENTITY_KEY, TOKEN_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Startup configuration, injected by the host page as `window.ENV`.
///
/// Read once at process start; components receive the resulting values
/// explicitly instead of probing globals later.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub service_url: String,
    pub anon_key: String,
    /// Absent means analytics is fully disabled.
    pub analytics_id: Option<String>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            service_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            analytics_id: None,
        };

        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    // Both SCREAMING_CASE (documented) and snake_case spellings
                    // are accepted for each key.
                    if let Some(url) = env_string(&env, &["SERVICE_URL", "service_url"]) {
                        cfg.service_url = url;
                    }
                    if let Some(key) = env_string(&env, &["ANON_KEY", "anon_key"]) {
                        cfg.anon_key = key;
                    }
                    cfg.analytics_id = env_string(&env, &["ANALYTICS_ID", "analytics_id"]);
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_string(env: &wasm_bindgen::JsValue, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Ok(value) = js_sys::Reflect::get(env, &(*key).into()) {
            if let Some(s) = value.as_string() {
                if !s.trim().is_empty() {
                    return Some(s);
                }
            }
        }
    }
    None
}

/// REST path for the owner-scoped bookmark listing, newest first.
pub(crate) fn list_bookmarks_path(owner_id: &str) -> String {
    format!(
        "/rest/v1/bookmarks?select=*&owner_id=eq.{}&order=created_at.desc",
        urlencoding::encode(owner_id)
    )
}

pub(crate) fn delete_bookmark_path(id: &str) -> String {
    format!("/rest/v1/bookmarks?id=eq.{}", urlencoding::encode(id))
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) service_url: String,
    pub(crate) anon_key: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(service_url: String, anon_key: String) -> Self {
        Self {
            service_url,
            anon_key,
            token: None,
        }
    }

    pub fn load_from_storage(cfg: &EnvConfig) -> Self {
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self {
            service_url: cfg.service_url.clone(),
            anon_key: cfg.anon_key.clone(),
            token,
        }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(IDENTITY_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Drop the local session. Remote revocation is a separate, best-effort
    /// call (`sign_out`).
    pub fn sign_out_local(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    /// Requests authenticate with the user token when present, falling back
    /// to the anon key for the pre-login surface.
    pub(crate) fn bearer_token(&self) -> String {
        self.token.clone().unwrap_or_else(|| self.anon_key.clone())
    }

    /// Provider redirect URL for the OAuth login flow. The browser navigates
    /// here; the provider returns to `redirect_to` with the access token in
    /// the URL fragment.
    pub fn oauth_authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        format!(
            "{}/auth/v1/authorize?provider={}&redirect_to={}",
            self.service_url,
            provider,
            urlencoding::encode(redirect_to)
        )
    }

    fn service_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.service_url, path);
        client
            .request(method, url)
            .header("apikey", self.anon_key.clone())
            .header("Authorization", format!("Bearer {}", self.bearer_token()))
    }

    async fn check_status(res: reqwest::Response, ctx: &str) -> ApiResult<reqwest::Response> {
        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    /// Identity lookup for the session guard. Callers treat any error as
    /// "no identity" (no retry).
    pub async fn current_identity(&self) -> ApiResult<Identity> {
        let res = self
            .service_request(reqwest::Method::GET, "/auth/v1/user")
            .send()
            .await
            .map_err(ApiError::network)?;

        let res = Self::check_status(res, "Identity lookup failed").await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// Best-effort remote session revocation.
    pub async fn sign_out(&self) -> ApiResult<()> {
        let res = self
            .service_request(reqwest::Method::POST, "/auth/v1/logout")
            .send()
            .await
            .map_err(ApiError::network)?;

        Self::check_status(res, "Sign out failed").await?;
        Ok(())
    }

    pub async fn list_bookmarks(&self, owner_id: &str) -> ApiResult<Vec<Bookmark>> {
        let res = self
            .service_request(reqwest::Method::GET, &list_bookmarks_path(owner_id))
            .send()
            .await
            .map_err(ApiError::network)?;

        let res = Self::check_status(res, "Failed to load bookmarks").await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn insert_bookmark(&self, record: &NewBookmark) -> ApiResult<Bookmark> {
        let res = self
            .service_request(reqwest::Method::POST, "/rest/v1/bookmarks")
            // Ask the service to echo the created row (id + created_at).
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(ApiError::network)?;

        let res = Self::check_status(res, "Failed to add bookmark").await?;
        let rows: Vec<Bookmark> = res.json().await.map_err(ApiError::parse)?;
        single_row(rows)
    }

    pub async fn delete_bookmark(&self, id: &str) -> ApiResult<()> {
        let res = self
            .service_request(reqwest::Method::DELETE, &delete_bookmark_path(id))
            .send()
            .await
            .map_err(ApiError::network)?;

        Self::check_status(res, "Failed to delete bookmark").await?;
        Ok(())
    }
}

/// The insert endpoint answers with a one-element representation array.
pub(crate) fn single_row(mut rows: Vec<Bookmark>) -> ApiResult<Bookmark> {
    if rows.is_empty() {
        Err(ApiError::parse("insert returned no row"))
    } else {
        Ok(rows.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_client_new_has_no_token() {
        let client = ApiClient::new(
            "http://localhost:54321".to_string(),
            "anon".to_string(),
        );
        assert_eq!(client.service_url, "http://localhost:54321");
        assert!(client.token.is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn api_client_set_token_authenticates() {
        let mut client = ApiClient::new("http://localhost:54321".to_string(), "anon".to_string());
        client.set_token("jwt".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.bearer_token(), "jwt");
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let client = ApiClient::new("http://localhost:54321".to_string(), "anon".to_string());
        assert_eq!(client.bearer_token(), "anon");
    }

    #[test]
    fn oauth_authorize_url_encodes_redirect() {
        let client = ApiClient::new("https://svc.example.com".to_string(), "anon".to_string());
        let url = client.oauth_authorize_url("google", "https://app.example.com/auth/callback");
        assert_eq!(
            url,
            "https://svc.example.com/auth/v1/authorize?provider=google\
             &redirect_to=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn list_path_is_owner_scoped_and_descending() {
        let path = list_bookmarks_path("u1");
        assert!(path.contains("owner_id=eq.u1"));
        assert!(path.contains("order=created_at.desc"));
    }

    #[test]
    fn delete_path_targets_single_id() {
        assert_eq!(delete_bookmark_path("b-1"), "/rest/v1/bookmarks?id=eq.b-1");
    }

    #[test]
    fn bookmark_row_contract_deserializes() {
        let json = r#"{
            "id": "7a1f",
            "url": "https://example.com",
            "title": "Example",
            "owner_id": "u1",
            "created_at": "2026-03-05T12:00:00.000Z"
        }"#;
        let row: Bookmark = serde_json::from_str(json).expect("row should parse");
        assert_eq!(row.id, "7a1f");
        assert_eq!(row.owner_id, "u1");
    }

    #[test]
    fn identity_contract_tolerates_extra_fields() {
        let json = r#"{
            "id": "u1",
            "aud": "authenticated",
            "email": "user@example.com",
            "app_metadata": {"provider": "google"}
        }"#;
        let identity: Identity = serde_json::from_str(json).expect("identity should parse");
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn identity_contract_email_is_optional() {
        let identity: Identity = serde_json::from_str(r#"{"id": "u1"}"#).expect("should parse");
        assert!(identity.email.is_none());
    }

    #[test]
    fn insert_payload_carries_owner() {
        let record = NewBookmark {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            owner_id: "u1".to_string(),
        };
        let v = serde_json::to_value(record).expect("should serialize");
        assert_eq!(v["owner_id"], "u1");
        assert_eq!(v["title"], "Example");
    }

    #[test]
    fn single_row_takes_first_element() {
        let rows = vec![Bookmark {
            id: "b-1".to_string(),
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            owner_id: "u1".to_string(),
            created_at: "2026-03-05T12:00:00.000Z".to_string(),
        }];
        assert_eq!(single_row(rows).expect("row").id, "b-1");
    }

    #[test]
    fn single_row_rejects_empty_representation() {
        let err = single_row(vec![]).expect_err("empty array is an error");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }
}
