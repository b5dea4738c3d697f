use crate::api::EnvConfig;
use wasm_bindgen::{JsCast, JsValue};

/// Bridge to the host page's `gtag` loader.
///
/// Configured explicitly at startup from `EnvConfig`; without a measurement
/// id every call is a silent no-op, and a page that never loaded the gtag
/// script behaves the same way.
#[derive(Clone, Debug)]
pub(crate) struct Analytics {
    measurement_id: Option<String>,
}

impl Analytics {
    pub fn from_config(cfg: &EnvConfig) -> Self {
        Self {
            measurement_id: cfg.analytics_id.clone(),
        }
    }

    #[allow(dead_code)]
    pub fn is_enabled(&self) -> bool {
        self.measurement_id.is_some()
    }

    pub fn page_view(&self, path: &str) {
        let Some(id) = &self.measurement_id else {
            return;
        };

        let params = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&params, &"page_path".into(), &path.into());
        self.gtag("config", &JsValue::from_str(id), &params);
    }

    pub fn track(&self, action: &str, category: &str, label: Option<&str>) {
        if self.measurement_id.is_none() {
            return;
        }

        let params = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&params, &"event_category".into(), &category.into());
        if let Some(label) = label {
            let _ = js_sys::Reflect::set(&params, &"event_label".into(), &label.into());
        }
        self.gtag("event", &JsValue::from_str(action), &params);
    }

    fn gtag(&self, command: &str, target: &JsValue, params: &js_sys::Object) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(gtag) = js_sys::Reflect::get(&window, &"gtag".into()) else {
            return;
        };
        let Some(gtag) = gtag.dyn_ref::<js_sys::Function>() else {
            return;
        };
        let _ = gtag.call3(&window, &JsValue::from_str(command), target, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(analytics_id: Option<&str>) -> EnvConfig {
        EnvConfig {
            service_url: "http://localhost:54321".to_string(),
            anon_key: "anon".to_string(),
            analytics_id: analytics_id.map(|s| s.to_string()),
        }
    }

    #[test]
    fn absent_id_disables_analytics() {
        let analytics = Analytics::from_config(&config(None));
        assert!(!analytics.is_enabled());
    }

    #[test]
    fn present_id_enables_analytics() {
        let analytics = Analytics::from_config(&config(Some("G-TEST")));
        assert!(analytics.is_enabled());
    }
}
