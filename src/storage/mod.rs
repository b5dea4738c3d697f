use crate::models::Identity;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "linkmark_access_token";
pub(crate) const IDENTITY_KEY: &str = "linkmark_identity";

/// Cached identity is a display-only warm start; the session guard always
/// revalidates against the identity endpoint on mount.
pub(crate) fn save_identity_to_storage(identity: &Identity) {
    save_json_to_storage(IDENTITY_KEY, identity);
}

pub(crate) fn load_identity_from_storage() -> Option<Identity> {
    load_json_from_storage(IDENTITY_KEY)
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}
