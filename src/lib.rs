mod analytics;
mod api;
mod app;
mod components;
mod feed;
mod models;
mod notify;
mod pages;
mod state;
mod storage;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::{ApiClient, EnvConfig};
    use crate::models::Identity;
    use crate::storage::{load_identity_from_storage, save_identity_to_storage};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn test_config() -> EnvConfig {
        EnvConfig {
            service_url: "http://localhost:54321".to_string(),
            anon_key: "anon".to_string(),
            analytics_id: None,
        }
    }

    #[wasm_bindgen_test]
    fn token_storage_roundtrip() {
        ApiClient::clear_storage();

        let cfg = test_config();
        let mut client = ApiClient::load_from_storage(&cfg);
        assert!(!client.is_authenticated());

        client.set_token("t1".to_string());
        client.save_to_storage();

        let reloaded = ApiClient::load_from_storage(&cfg);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.bearer_token(), "t1");

        ApiClient::clear_storage();
        let cleared = ApiClient::load_from_storage(&cfg);
        assert!(!cleared.is_authenticated());
    }

    #[wasm_bindgen_test]
    fn identity_storage_roundtrip() {
        let identity = Identity {
            id: "u1".to_string(),
            email: Some("u@example.com".to_string()),
        };
        save_identity_to_storage(&identity);

        let loaded = load_identity_from_storage().expect("should load identity from localStorage");
        assert_eq!(loaded, identity);
    }
}
