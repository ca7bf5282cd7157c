//! HTML parsing for GoRails pages.
//!
//! Markup selectors are the fragile part of the tool, so everything that
//! looks inside a page goes through [`PageParser`]. Callers only see models.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::api::{ApiError, ApiResult};
use crate::models::{EpisodePage, EpisodeReference, SeriesReference};
use crate::utils::collapse_whitespace;

/// Download buttons link to `.../download`; some layouts mark the anchor instead
const DOWNLOAD_LINK: &str = r#"a[href*="/download"], a[download], a.download"#;
const EPISODE_LINK: &str = r#"a[href*="/episodes/"]"#;
const SERIES_LINK: &str = r#"a[href*="/series/"]"#;
const SERIES_CARD: &str = "article";
const SERIES_CARD_CLASS: &str = "p-6";
const TITLE: &str = "h1";
const CSRF_META: &str = r#"meta[name="csrf-token"]"#;
const LOGIN_ALERT: &str = "div.alert, div.error";
const PASSWORD_FIELD: &str = r#"input[name="user[password]"]"#;

const UNKNOWN_TITLE: &str = "Unknown Title";

/// Extracts links and form details from platform pages.
pub trait PageParser: Send + Sync {
    /// Title and download link of an episode page
    fn episode_page(&self, html: &str, page_url: &Url) -> ApiResult<EpisodePage>;

    /// Episode links of a playlist page, deduplicated, in document order
    fn episode_links(&self, html: &str, page_url: &Url) -> ApiResult<Vec<EpisodeReference>>;

    /// Series cards of the series index, in document order
    fn series_links(&self, html: &str, page_url: &Url) -> ApiResult<Vec<SeriesReference>>;

    /// CSRF token from the sign-in page
    fn csrf_token(&self, html: &str) -> Option<String>;

    /// Flash message explaining a failed login
    fn login_error(&self, html: &str) -> Option<String>;

    /// True when the page still shows the sign-in form
    fn is_sign_in_form(&self, html: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoRailsMarkup;

impl GoRailsMarkup {
    pub fn new() -> Self {
        Self
    }
}

fn selector(css: &str) -> ApiResult<Selector> {
    Selector::parse(css).map_err(|e| ApiError::Resolve(format!("bad selector {}: {}", css, e)))
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Absolute form of an anchor's href, without the fragment
fn anchor_url(element: &ElementRef<'_>, base: &Url) -> Option<Url> {
    let href = element.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

fn last_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

impl PageParser for GoRailsMarkup {
    fn episode_page(&self, html: &str, page_url: &Url) -> ApiResult<EpisodePage> {
        let document = Html::parse_document(html);

        let title = document
            .select(&selector(TITLE)?)
            .next()
            .map(|h1| element_text(&h1))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let download_url = document
            .select(&selector(DOWNLOAD_LINK)?)
            .find_map(|a| anchor_url(&a, page_url))
            .ok_or_else(|| {
                ApiError::Resolve(format!(
                    "no download link on {} (page layout changed or account lacks download access)",
                    page_url
                ))
            })?;

        Ok(EpisodePage {
            title,
            download_url,
        })
    }

    fn episode_links(&self, html: &str, page_url: &Url) -> ApiResult<Vec<EpisodeReference>> {
        let document = Html::parse_document(html);
        let mut episodes: Vec<EpisodeReference> = Vec::new();

        for anchor in document.select(&selector(EPISODE_LINK)?) {
            let Some(url) = anchor_url(&anchor, page_url) else {
                continue;
            };
            if url.path().contains("/download") {
                continue;
            }

            let title = element_text(&anchor);
            match episodes.iter_mut().find(|e| e.page_url == url) {
                // Thumbnail links often come before the titled link
                Some(existing) => {
                    if existing.title.is_empty() && !title.is_empty() {
                        existing.title = title;
                    }
                }
                None => episodes.push(EpisodeReference {
                    title,
                    page_url: url,
                }),
            }
        }

        for episode in &mut episodes {
            if episode.title.is_empty() {
                episode.title = last_segment(&episode.page_url);
            }
        }
        Ok(episodes)
    }

    fn series_links(&self, html: &str, page_url: &Url) -> ApiResult<Vec<SeriesReference>> {
        let document = Html::parse_document(html);
        let card = selector(SERIES_CARD)?;
        let link = selector(SERIES_LINK)?;
        let mut series: Vec<SeriesReference> = Vec::new();

        let cards = document
            .select(&card)
            .filter(|card| card.value().classes().any(|c| c == SERIES_CARD_CLASS));

        for card in cards {
            let Some(anchor) = card.select(&link).next() else {
                continue;
            };
            let title = element_text(&anchor);
            let Some(url) = anchor_url(&anchor, page_url) else {
                continue;
            };
            if title.is_empty() || series.iter().any(|s| s.url == url) {
                continue;
            }
            series.push(SeriesReference::new(title, url));
        }
        Ok(series)
    }

    fn csrf_token(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let meta = selector(CSRF_META).ok()?;
        let token = document
            .select(&meta)
            .next()?
            .value()
            .attr("content")?
            .trim()
            .to_string();
        (!token.is_empty()).then_some(token)
    }

    fn login_error(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let alert = selector(LOGIN_ALERT).ok()?;
        document
            .select(&alert)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    fn is_sign_in_form(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        match selector(PASSWORD_FIELD) {
            Ok(field) => document.select(&field).next().is_some(),
            Err(_) => false,
        }
    }
}
