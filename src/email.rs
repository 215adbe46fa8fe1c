//! Obfuscated-email decoding and registration-page email lookup
//!
//! The registration page hides contact emails behind a reversible
//! per-character XOR scheme keyed by a leading byte (the `data-cfemail`
//! attribute). Decoding failures are silent: a malformed payload yields an
//! empty string, never an error, and a missing or unfetchable page yields an
//! empty email rather than failing the surrounding extraction.

use crate::config::EndpointsConfig;
use crate::fetch::{FetchMode, ResilientFetcher};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

static LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("label").unwrap());

static CFEMAIL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-cfemail]").unwrap());

const OBFUSCATION_ATTR: &str = "data-cfemail";

/// Placeholder phrase left behind when the obfuscation script did not run.
const PROTECTED_PLACEHOLDER: &str = "email protected";

/// Decode an XOR-obfuscated hex payload: the first byte is the key, every
/// subsequent byte XORed with it yields one character code. Malformed input
/// (odd length, non-hex characters, missing key) yields an empty string.
pub fn decode(hex: &str) -> String {
    if hex.len() < 2 || hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return String::new();
    }

    let key = match u8::from_str_radix(&hex[0..2], 16) {
        Ok(key) => key,
        Err(_) => return String::new(),
    };

    let mut email = String::new();
    let mut i = 2;
    while i < hex.len() {
        match u8::from_str_radix(&hex[i..i + 2], 16) {
            Ok(byte) => email.push(char::from(byte ^ key)),
            Err(_) => return String::new(),
        }
        i += 2;
    }
    email
}

/// Fetch the registration page for `dot_number` and return the first usable
/// email near an "Email:" label, or an empty string. An empty `dot_number`
/// is a silent no-op.
pub async fn lookup_email(
    fetcher: &ResilientFetcher,
    endpoints: &EndpointsConfig,
    dot_number: &str,
    mode: FetchMode,
) -> String {
    if dot_number.is_empty() {
        return String::new();
    }

    let url = endpoints.registration_url_for(dot_number);
    let html = match fetcher.fetch(&url, mode).await {
        Ok(html) => html,
        Err(e) => {
            debug!("Registration page fetch failed for DOT# {}: {}", dot_number, e);
            return String::new();
        }
    };

    extract_email_from_registration(&html)
}

/// Scan a registration page for the first "Email:" label and evaluate its
/// candidates in order: an adjacent element carrying the obfuscation
/// attribute, a descendant of that element carrying it, then plain text
/// content (element or following text node) that is non-trivial and not the
/// protection placeholder.
pub fn extract_email_from_registration(html: &str) -> String {
    let doc = Html::parse_document(html);

    for label in doc.select(&LABEL_SELECTOR) {
        let label_text: String = label.text().collect();
        if !label_text.contains("Email:") {
            continue;
        }
        if let Some(email) = email_near_label(label) {
            return cleanup_email(&email);
        }
    }

    String::new()
}

fn email_near_label(label: ElementRef<'_>) -> Option<String> {
    if let Some(sibling) = label.next_siblings().find_map(ElementRef::wrap) {
        // An obfuscation attribute always wins; a malformed payload decodes
        // to an empty string rather than falling through to page text.
        if let Some(encoded) = sibling.value().attr(OBFUSCATION_ATTR) {
            return Some(decode(encoded));
        }
        if let Some(child) = sibling.select(&CFEMAIL_SELECTOR).next() {
            if let Some(encoded) = child.value().attr(OBFUSCATION_ATTR) {
                return Some(decode(encoded));
            }
        }
        let text: String = sibling.text().collect::<Vec<_>>().join(" ");
        if let Some(email) = accept(text.trim().to_string()) {
            return Some(email);
        }
    }

    // Email rendered as a bare text node after the label
    for node in label.next_siblings() {
        if let Node::Text(text) = node.value() {
            if let Some(email) = accept(text.trim().to_string()) {
                return Some(email);
            }
        }
    }

    None
}

/// A candidate is usable only if it is non-trivial and not the placeholder.
fn accept(candidate: String) -> Option<String> {
    if candidate.len() > 2 && !candidate.to_lowercase().contains(PROTECTED_PLACEHOLDER) {
        Some(candidate)
    } else {
        None
    }
}

/// Strip mojibake and bracket artifacts the upstream page leaves around
/// decoded addresses; a surviving placeholder empties the result.
pub fn cleanup_email(email: &str) -> String {
    let cleaned = email.replace("Ã‚", "").replace(['[', ']'], "").trim().to_string();
    if cleaned.to_lowercase().contains(PROTECTED_PLACEHOLDER) {
        String::new()
    } else {
        cleaned
    }
}
