//! Widget configuration supplied by the hosting page
//!
//! The host sets `window.SCRATCH_CONFIG` to a plain object before loading
//! the module. Image paths are configuration values, never computed here.

use serde::{Deserialize, Serialize};

/// Configuration injected by the hosting page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Path of the scratch cover image drawn over the offer
    pub cover_image_path: String,
    /// Base URL prepended to the offer's `image` field
    pub offers_base_url: String,
    /// Base URL for the backend endpoints (`/get_offer`, `/increment_scratch`)
    pub api_base_url: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            cover_image_path: "/static/images/scratch_cover.png".to_string(),
            offers_base_url: "/static/images/offers/".to_string(),
            api_base_url: "".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Global the hosting page uses to pass configuration (wasm32 only).
    #[allow(dead_code)]
    const WINDOW_GLOBAL: &'static str = "SCRATCH_CONFIG";

    /// Full URL for an offer image.
    pub fn offer_image_url(&self, image: &str) -> String {
        let base = if self.offers_base_url.ends_with('/') {
            self.offers_base_url.clone()
        } else {
            format!("{}/", self.offers_base_url)
        };
        format!("{}{}", base, image.trim_start_matches('/'))
    }

    /// Full URL for a backend endpoint path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// Load configuration from `window.SCRATCH_CONFIG` (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        use wasm_bindgen::JsValue;

        let global = web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(Self::WINDOW_GLOBAL)).ok());

        if let Some(value) = global {
            if !value.is_undefined() && !value.is_null() {
                if let Some(json) = js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
                {
                    if let Ok(config) = serde_json::from_str(&json) {
                        log::info!("Loaded widget config from hosting page");
                        return config;
                    }
                    log::warn!("window.SCRATCH_CONFIG is malformed, using defaults");
                }
            }
        }

        log::info!("Using default widget config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
