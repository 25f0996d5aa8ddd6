//! Coordinate and name extraction from Google Maps share links.

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::types::Coords;

/// Name used when no title can be scraped from the page.
pub const DEFAULT_NAME: &str = "新規駐車場";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) width=device-width";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("リクエスト失敗: {0}")]
    Request(#[from] reqwest::Error),
    /// The page loaded but neither coordinate pattern matched. Carries
    /// whatever name was scraped so the caller can still use it.
    #[error("座標パターンが見つかりませんでした")]
    NoCoordinates { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub coords: Coords,
    pub name: String,
}

pub struct Scraper {
    client: reqwest::blocking::Client,
    url_coords: Regex,
    embed_coords: Regex,
}

impl Scraper {
    pub fn new() -> Result<Self> {
        // Certificate verification stays off: some operator machines sit
        // behind misconfigured trust stores and the tool only reads public
        // pages.
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Scraper {
            client,
            url_coords: Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid url coords regex"),
            embed_coords: Regex::new(r#"content=".*?center=(-?\d+\.\d+)%2C(-?\d+\.\d+)"#)
                .expect("valid embed coords regex"),
        })
    }

    /// Follow the share link and pull coordinates and a display name out of
    /// the resolved page. Coordinates come from the `@lat,lng` marker in the
    /// post-redirect URL first, then from the embedded map meta tag.
    pub fn resolve(&self, url: &str) -> Result<Resolved, ScrapeError> {
        let response = self.client.get(url).send()?;
        let final_url = response.url().to_string();
        let html = response.text()?;

        let name = extract_name(&html).unwrap_or_else(|| DEFAULT_NAME.to_string());
        let coords = self
            .coords_from_url(&final_url)
            .or_else(|| self.coords_from_html(&html));

        match coords {
            Some(coords) => Ok(Resolved { coords, name }),
            None => Err(ScrapeError::NoCoordinates { name }),
        }
    }

    fn coords_from_url(&self, url: &str) -> Option<Coords> {
        capture_pair(&self.url_coords, url)
    }

    fn coords_from_html(&self, html: &str) -> Option<Coords> {
        capture_pair(&self.embed_coords, html)
    }
}

fn capture_pair(re: &Regex, text: &str) -> Option<Coords> {
    let caps = re.captures(text)?;
    let lat = caps[1].parse().ok()?;
    let lng = caps[2].parse().ok()?;
    Some(Coords(lat, lng))
}

/// Best-effort page name: `og:title` with the Google Maps suffix stripped,
/// then the `<title>` text up to the " - Google" delimiter.
fn extract_name(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og_title = Selector::parse(r#"meta[property="og:title"]"#).expect("valid og:title selector");
    if let Some(element) = document.select(&og_title).next() {
        if let Some(content) = element.value().attr("content") {
            return Some(
                content
                    .replace(" - Google マップ", "")
                    .replace(" - Google Maps", ""),
            );
        }
    }

    let title = Selector::parse("title").expect("valid title selector");
    if let Some(element) = document.select(&title).next() {
        let text: String = element.text().collect();
        if let Some((name, _)) = text.split_once(" - Google") {
            return Some(name.to_string());
        }
    }

    None
}
