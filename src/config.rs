//! # Pagination Configuration
//!
//! Everything the engine needs to know about page shape is supplied here,
//! once, at surface initialization. The configuration is immutable for the
//! lifetime of the session: changing page dimensions mid-edit would move
//! every page boundary under the author's cursor, so hosts that want a
//! different page setup tear the surface down and remount it.
//!
//! Band texts (`header_left`, `footer_right`, ...) may contain the literal
//! token `{page}`, which is substituted with the page number at render time.

use serde::{Deserialize, Serialize};

/// The token in band text templates replaced by the page number.
pub const PAGE_TOKEN: &str = "{page}";

/// Page shape, chrome heights, margins, and band text templates.
///
/// All fields have defaults so hosts can configure only what they care
/// about. Heights and margins are in surface pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Total height of one page, chrome included.
    #[serde(default = "default_page_height")]
    pub page_height: f64,

    /// Height of the visual gap between consecutive pages.
    #[serde(default = "default_page_gap")]
    pub page_gap: f64,

    /// Border width drawn on each side of the inter-page gap.
    #[serde(default = "default_gap_border")]
    pub page_gap_border_size: f64,

    /// Fill color of the inter-page gap band (CSS color string).
    #[serde(default = "default_background")]
    pub page_break_background: String,

    /// Height of the header band at the top of every page.
    #[serde(default = "default_band_height")]
    pub header_height: f64,

    /// Height of the footer band at the bottom of every page.
    #[serde(default = "default_band_height")]
    pub footer_height: f64,

    /// Page margins, outside the header/footer bands.
    #[serde(default)]
    pub margin_top: f64,
    #[serde(default)]
    pub margin_bottom: f64,
    #[serde(default)]
    pub margin_left: f64,
    #[serde(default)]
    pub margin_right: f64,

    /// Content margins, inside the header/footer bands.
    #[serde(default)]
    pub content_margin_top: f64,
    #[serde(default)]
    pub content_margin_bottom: f64,

    /// Band text templates. `{page}` resolves to the page number.
    #[serde(default)]
    pub header_left: String,
    #[serde(default)]
    pub header_right: String,
    #[serde(default)]
    pub footer_left: String,
    #[serde(default)]
    pub footer_right: String,
}

fn default_page_height() -> f64 {
    800.0
}

fn default_page_gap() -> f64 {
    50.0
}

fn default_gap_border() -> f64 {
    1.0
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_band_height() -> f64 {
    10.0
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_height: default_page_height(),
            page_gap: default_page_gap(),
            page_gap_border_size: default_gap_border(),
            page_break_background: default_background(),
            header_height: default_band_height(),
            footer_height: default_band_height(),
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            content_margin_top: 0.0,
            content_margin_bottom: 0.0,
            header_left: String::new(),
            header_right: String::new(),
            footer_left: String::new(),
            footer_right: String::new(),
        }
    }
}

impl PageConfig {
    /// Vertical space consumed above the content area on every page:
    /// header band plus the margins stacked on top of it.
    pub fn top_inset(&self) -> f64 {
        self.header_height + self.content_margin_top + self.margin_top
    }

    /// Vertical space consumed below the content area on every page.
    pub fn bottom_inset(&self) -> f64 {
        self.footer_height + self.content_margin_bottom + self.margin_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_options() {
        let config = PageConfig::default();
        assert_eq!(config.page_height, 800.0);
        assert_eq!(config.page_gap, 50.0);
        assert_eq!(config.page_gap_border_size, 1.0);
        assert_eq!(config.page_break_background, "#ffffff");
        assert_eq!(config.header_height, 10.0);
        assert_eq!(config.footer_height, 10.0);
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let config: PageConfig = serde_json::from_str(
            r#"{"pageHeight": 1000, "footerRight": "Page {page}", "marginTop": 20}"#,
        )
        .unwrap();
        assert_eq!(config.page_height, 1000.0);
        assert_eq!(config.footer_right, "Page {page}");
        assert_eq!(config.margin_top, 20.0);
        // Unspecified fields fall back to defaults
        assert_eq!(config.page_gap, 50.0);
        assert_eq!(config.header_left, "");
    }

    #[test]
    fn insets_stack_band_and_margins() {
        let config = PageConfig {
            header_height: 30.0,
            footer_height: 30.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            ..Default::default()
        };
        assert_eq!(config.top_inset(), 60.0);
        assert_eq!(config.bottom_inset(), 60.0);
    }
}
