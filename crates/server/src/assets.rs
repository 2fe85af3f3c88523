//! # Widget Assets
//!
//! Avatar encoding and widget page rendering. The avatar ships inside the
//! widget HTML as a data URI so the page is self-contained; a missing image
//! degrades to a hosted placeholder instead of breaking the widget.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

/// Placeholder shown when the configured avatar image is missing.
const FALLBACK_AVATAR_URI: &str =
    "https://via.placeholder.com/60x60/0066cc/ffffff?text=%F0%9F%92%8E";

/// Reads the avatar image and encodes it as a `data:` URI.
pub fn load_avatar_data_uri(path: &str) -> String {
    match std::fs::read(path) {
        Ok(bytes) => format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
        Err(e) => {
            warn!(path, "Avatar image not found, using fallback: {e}");
            FALLBACK_AVATAR_URI.to_string()
        }
    }
}

/// Fills the placeholder slots of a bundled widget template.
pub fn render_widget(
    template: &str,
    chat_url: &str,
    voice_process_url: &str,
    img_uri: &str,
) -> String {
    template
        .replace("{chat_url}", chat_url)
        .replace("{voice_process_url}", voice_process_url)
        .replace("{img_uri}", img_uri)
}
