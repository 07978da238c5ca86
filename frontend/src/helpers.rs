//! Small utilities shared by the screens.
//!
//! - **User feedback**: transient toast notifications for save results and
//!   other outcomes that are not tied to a single field.
//! - **Dirty checking**: an MD5 fingerprint of the editor contents and the
//!   `window.app_dirty` flag read by the `beforeunload` handler in
//!   `index.html`.
//! - **Rendering**: markdown to HTML for guest pages and editor previews.
//! - **Uploads**: the storage path an uploaded image is written under.

use js_sys::Reflect;
use pulldown_cmark::{html, CowStr, Event, Options, Parser};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

/// Displays a temporary notification at the bottom of the screen. It removes
/// itself after three seconds.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(3000).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

pub fn compute_md5(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

/// MD5 of the JSON form of `value`. Two values with the same fingerprint
/// hold the same editable content.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> String {
    compute_md5(&serde_json::to_string(value).unwrap_or_default())
}

/// Publishes whether the editor holds unsaved changes so the page can warn
/// before it is closed.
pub fn set_window_dirty_flag(dirty: bool) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("app_dirty"),
            &JsValue::from_bool(dirty),
        );
    }
}

/// Renders host-authored markdown. Raw HTML in the source is shown as text,
/// never injected into the page.
pub fn render_markdown(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(pulldown_cmark::Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(pulldown_cmark::Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

const SCRIPT_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// True for link targets that run code when followed. Browsers ignore
/// whitespace and control characters inside the scheme.
fn is_script_url(url: &str) -> bool {
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    SCRIPT_SCHEMES.iter().any(|s| scheme.starts_with(s))
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_script_url(&url) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Host-entered URL made safe for an `href`.
pub fn safe_href(url: &str) -> String {
    if is_script_url(url) {
        "#".to_string()
    } else {
        url.trim().to_string()
    }
}

/// Storage path for an uploaded image: `<folder>/<md5 of bytes>.<ext>`.
/// Re-uploading the same file lands on the same path.
pub fn upload_path(folder: &str, file_name: &str, bytes: &[u8]) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    let folder = if folder.trim().is_empty() {
        "drafts"
    } else {
        folder.trim()
    };
    format!("{}/{:x}.{}", folder, md5::compute(bytes), extension)
}
