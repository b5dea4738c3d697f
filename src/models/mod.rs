use serde::{Deserialize, Serialize};

/// A saved bookmark row as returned by the remote collection.
///
/// `id` and `created_at` are assigned by the service on insert and never
/// change afterwards. `created_at` is an RFC3339 timestamp string; the list
/// endpoint returns rows ordered by it, newest first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Bookmark {
    pub id: String,
    pub url: String,
    pub title: String,
    pub owner_id: String,
    pub created_at: String,
}

/// The authenticated principal, resolved once per session and passed
/// explicitly to whatever needs it. Extra provider fields are dropped on
/// deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Insert payload. The service fills in `id` and `created_at`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NewBookmark {
    pub url: String,
    pub title: String,
    pub owner_id: String,
}
