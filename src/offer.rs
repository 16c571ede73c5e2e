//! Offer payload and backend endpoints
//!
//! The backend contract is fixed: `GET /get_offer` returns the current offer,
//! `POST /increment_scratch` bumps a global redemption counter. The response
//! of the counter bump is never inspected.

use serde::{Deserialize, Serialize};

use crate::consts::EXHAUSTED_SENTINEL;
use crate::error::WidgetError;

/// An offer as returned by `GET /get_offer`.
///
/// Immutable after fetch; discarded on page reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Display name, e.g. "1 Ceramic bowl @ 50% OFF"
    pub name: String,
    /// Image file name, resolved against the configured offers base URL
    pub image: String,
    /// Optional sentinel message signaling inventory exhaustion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Offer {
    /// True when the backend signals that no offers remain. Detected by
    /// substring match, matching the backend's free-form message field.
    pub fn is_exhausted(&self) -> bool {
        self.message
            .as_deref()
            .is_some_and(|m| m.contains(EXHAUSTED_SENTINEL))
    }
}

/// Parse an offer response body. Malformed JSON surfaces as a network error
/// carrying the parser's message.
pub fn parse_offer(body: &str) -> Result<Offer, WidgetError> {
    serde_json::from_str(body).map_err(|e| WidgetError::Network(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, Response};

    use super::{Offer, parse_offer};
    use crate::config::WidgetConfig;
    use crate::error::WidgetError;

    fn js_err_message(value: JsValue) -> String {
        value
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| value.as_string())
            .unwrap_or_else(|| "network failure".to_string())
    }

    /// Fetch the current offer. Called once per session initialization.
    /// Non-2xx statuses and transport failures both map to
    /// [`WidgetError::Network`]; there is no retry.
    pub async fn fetch_offer(config: &WidgetConfig) -> Result<Offer, WidgetError> {
        let window = web_sys::window()
            .ok_or_else(|| WidgetError::Network("no window".to_string()))?;
        let url = config.api_url("/get_offer");

        let resp_value = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(js_err_message)
            .map_err(WidgetError::Network)?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| WidgetError::Network("response is not a Response".to_string()))?;

        if !resp.ok() {
            return Err(WidgetError::Network(format!(
                "HTTP error! status: {}",
                resp.status()
            )));
        }

        let text_promise = resp
            .text()
            .map_err(js_err_message)
            .map_err(WidgetError::Network)?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(js_err_message)
            .map_err(WidgetError::Network)?
            .as_string()
            .ok_or_else(|| WidgetError::Network("empty response body".to_string()))?;

        parse_offer(&text)
    }

    /// Best-effort redemption notification: `POST /increment_scratch` with an
    /// empty JSON body. The response is ignored and failures are only logged;
    /// the reveal experience must not fail because of a counter update.
    pub async fn post_redemption(config: &WidgetConfig) {
        let result = async {
            let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
            let url = config.api_url("/increment_scratch");

            let init = RequestInit::new();
            init.set_method("POST");
            init.set_body(&JsValue::from_str("{}"));
            let request = Request::new_with_str_and_init(&url, &init)
                .map_err(js_err_message)?;
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_err_message)?;

            JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_err_message)?;
            Ok::<(), String>(())
        }
        .await;

        match result {
            Ok(()) => log::info!("Scratch counter incremented"),
            Err(e) => log::warn!("Failed to increment scratch counter: {e}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{fetch_offer, post_redemption};
