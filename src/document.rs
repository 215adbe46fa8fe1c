//! Queryable index over one fetched snapshot page
//!
//! Wraps a parsed HTML tree and offers the access paths the extractors need:
//! - label -> adjacent-value structured lookup over header cells
//! - whitespace-normalized flattened text (regex fallback corpus only)
//! - marker-table scanning ("X" cells and their following labels)
//! - content-anchor detection to reject pages that are not snapshot pages

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

// Compile CSS selectors once at startup.
// Safety: all .unwrap() calls below are on compile-time constant selector
// strings; Selector::parse only fails on malformed selector syntax.
static CENTER_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("center").unwrap());

static TH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());

static TD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

static BOLD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("b").unwrap());

static CRAWL_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"as of(.*?)\.").unwrap());

/// Marker text announcing the snapshot content date inside a `<b>` element.
const CONTENT_DATE_MARKER: &str = "The information below reflects the content";

/// A parsed snapshot page with the query operations the extractors rely on.
/// Built once per fetched body; all lookups borrow the same tree.
pub struct DocumentIndex {
    doc: Html,
}

impl DocumentIndex {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// True only if the page contains the expected snapshot content container.
    /// Pages without it (error screens, rate-limit interstitials) must be
    /// rejected outright rather than mined for fields.
    pub fn has_anchor(&self) -> bool {
        self.doc.select(&CENTER_SELECTOR).next().is_some()
    }

    /// Find a header cell whose normalized text contains `label` and return
    /// the normalized text of its structurally-adjacent value cell. Returns
    /// an empty string when the label is absent.
    pub fn find_by_sibling_label(&self, label: &str) -> String {
        let needle = normalize_text(label).to_lowercase();

        for th in self.doc.select(&TH_SELECTOR) {
            let header = normalize_text(&text_with_spaces(th));
            if header.to_lowercase().contains(&needle) {
                if let Some(value_cell) = next_element_sibling(th) {
                    return normalize_text(&text_with_spaces(value_cell));
                }
                return String::new();
            }
        }

        String::new()
    }

    /// Depth-first plain text of the anchor subtree (the whole document when
    /// no anchor exists), excluding script/style content, with all whitespace
    /// runs collapsed to single spaces. Used only as a fallback corpus for
    /// regex extraction.
    pub fn flattened_text(&self) -> String {
        let scope = self
            .doc
            .select(&CENTER_SELECTOR)
            .next()
            .unwrap_or_else(|| self.doc.root_element());

        let mut out = String::new();
        for node in scope.descendants() {
            if let Node::Text(text) = node.value() {
                let excluded = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map(|el| el.name() == "script" || el.name() == "style")
                        .unwrap_or(false)
                });
                if !excluded {
                    out.push_str(text);
                    out.push(' ');
                }
            }
        }
        normalize_text(&out)
    }

    /// Scan the single table tagged `summary="{name}"` and return, in
    /// document order, the text of every cell that directly follows a cell
    /// whose trimmed text is exactly "X". Missing table yields an empty list.
    pub fn find_marker_table(&self, name: &str) -> Vec<String> {
        let selector = match Selector::parse(&format!(r#"table[summary="{}"]"#, name)) {
            Ok(sel) => sel,
            Err(_) => return Vec::new(),
        };

        let table = match self.doc.select(&selector).next() {
            Some(table) => table,
            None => return Vec::new(),
        };

        let cells: Vec<String> = table
            .select(&TD_SELECTOR)
            .map(|cell| text_with_spaces(cell).trim().to_string())
            .collect();

        let mut labels = Vec::new();
        for i in 0..cells.len() {
            if cells[i] == "X" {
                if let Some(next) = cells.get(i + 1) {
                    labels.push(next.clone());
                }
            }
        }
        labels
    }

    /// The content date announced on the snapshot page ("...as of <date>."),
    /// or None when the announcement is absent.
    pub fn crawl_date(&self) -> Option<String> {
        for bold in self.doc.select(&BOLD_SELECTOR) {
            let text = text_with_spaces(bold);
            if !text.contains(CONTENT_DATE_MARKER) {
                continue;
            }
            if let Some(captures) = CRAWL_DATE_RE.captures(&text) {
                let mut raw = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
                if raw.len() > 15 {
                    raw = raw.split('.').next().unwrap_or("").to_string();
                }
                let raw = raw.trim().to_string();
                if !raw.is_empty() {
                    return Some(raw);
                }
            }
        }
        None
    }
}

/// Next element sibling of a node, skipping intervening text/comment nodes.
fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Concatenate an element's text nodes with single spaces between them,
/// mirroring how the upstream page separates label and value fragments.
fn text_with_spaces(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Collapse non-breaking spaces and all other whitespace runs to single
/// spaces, trimming the ends.
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_label_lookup() {
        let html = r#"<html><body><center><table>
            <tr><th>Entity Type:</th><td>CARRIER</td></tr>
            <tr><th>Operating&nbsp;Authority Status:</th><td>AUTHORIZED FOR Property</td></tr>
        </table></center></body></html>"#;
        let index = DocumentIndex::parse(html);

        assert_eq!(index.find_by_sibling_label("Entity Type"), "CARRIER");
        assert_eq!(
            index.find_by_sibling_label("Operating Authority Status"),
            "AUTHORIZED FOR Property"
        );
        assert_eq!(index.find_by_sibling_label("No Such Label"), "");
    }

    #[test]
    fn test_flattened_text_skips_scripts() {
        let html = r#"<html><body><center>
            <p>Legal Name:   ACME   TRUCKING</p>
            <script>var hidden = "nope";</script>
            <style>.x { color: red; }</style>
            <p>Phone: (555) 123-4567</p>
        </center></body></html>"#;
        let index = DocumentIndex::parse(html);

        let text = index.flattened_text();
        assert!(text.contains("Legal Name: ACME TRUCKING"));
        assert!(text.contains("Phone: (555) 123-4567"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_marker_table_scan() {
        let html = r#"<html><body><center>
            <table summary="Operation Classification"><tr>
                <td>X</td><td>Auth. For Hire</td>
                <td></td><td>Exempt For Hire</td>
            </tr></table>
        </center></body></html>"#;
        let index = DocumentIndex::parse(html);

        assert_eq!(
            index.find_marker_table("Operation Classification"),
            vec!["Auth. For Hire".to_string()]
        );
        assert!(index.find_marker_table("Cargo Carried").is_empty());
    }

    #[test]
    fn test_marker_table_trailing_x_has_no_next_cell() {
        let html = r#"<html><body>
            <table summary="Cargo Carried"><tr>
                <td>X</td><td>General Freight</td><td>X</td>
            </tr></table>
        </body></html>"#;
        let index = DocumentIndex::parse(html);

        assert_eq!(
            index.find_marker_table("Cargo Carried"),
            vec!["General Freight".to_string()]
        );
    }

    #[test]
    fn test_has_anchor() {
        assert!(DocumentIndex::parse("<html><body><center>x</center></body></html>").has_anchor());
        assert!(!DocumentIndex::parse("<html><body><p>not found</p></body></html>").has_anchor());
    }

    #[test]
    fn test_crawl_date_extraction() {
        let html = r#"<html><body><center>
            <b>The information below reflects the content of the FMCSA management
            information systems as of 01/15/2024.</b>
        </center></body></html>"#;
        let index = DocumentIndex::parse(html);
        assert_eq!(index.crawl_date().as_deref(), Some("01/15/2024"));

        let no_marker = DocumentIndex::parse("<html><body><b>Other text.</b></body></html>");
        assert!(no_marker.crawl_date().is_none());
    }
}
