use std::collections::{BTreeSet, HashSet};

use anyhow::Context as _;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{LISTING_ROOT, Paths, SEASONS_PAGE, SiteConfig};
use crate::fetch::Fetch;

pub const EXCLUDED_LISTING_SLUGS: &[&str] = &[
    SEASONS_PAGE,
    "latest-shows",
    "designers",
    "featured",
    "image-archive",
];

pub fn is_season_slug(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonState {
    #[serde(default)]
    pub known_season_slugs: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSeasonsReport {
    pub new_seasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Unchanged,
    NewSeasons(Vec<String>),
}

impl WatchOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Unchanged => 0,
            Self::NewSeasons(_) => 1,
        }
    }
}

pub fn check_for_new_seasons(
    fetcher: &impl Fetch,
    site: &SiteConfig,
    paths: &Paths,
) -> anyhow::Result<WatchOutcome> {
    let listing_url = site.seasons_listing_url()?;
    tracing::info!(url = %listing_url, "fetch seasons listing");
    let html = fetcher.fetch(&listing_url).context("fetch seasons listing")?;

    let candidates = extract_season_slugs(&html, &site.base_url)?;
    tracing::debug!(count = candidates.len(), "season candidates");

    let state_path = paths.state_path();
    let mut state: SeasonState = crate::store::read_json(&state_path)
        .context("load season state")?
        .unwrap_or_default();

    let new_slugs = new_seasons(&candidates, &state.known_season_slugs);
    if new_slugs.is_empty() {
        tracing::info!("no new season pages found");
        return Ok(WatchOutcome::Unchanged);
    }

    tracing::info!(new = ?new_slugs, "new season pages detected");

    state.known_season_slugs = candidates;
    crate::store::write_json(&state_path, &state).context("save season state")?;

    let report = NewSeasonsReport {
        new_seasons: new_slugs.clone(),
    };
    crate::store::write_json(&paths.new_seasons_path(), &report)
        .context("write new seasons report")?;

    Ok(WatchOutcome::NewSeasons(new_slugs))
}

pub fn new_seasons(candidates: &[String], known: &[String]) -> Vec<String> {
    let known = known.iter().map(String::as_str).collect::<HashSet<_>>();
    candidates
        .iter()
        .filter(|slug| !known.contains(slug.as_str()))
        .cloned()
        .collect()
}

pub fn extract_season_slugs(html: &str, base_url: &Url) -> anyhow::Result<Vec<String>> {
    let season_path = Regex::new(&format!(r"^/{}/([a-z0-9-]+)$", regex::escape(LISTING_ROOT)))
        .context("compile season path pattern")?;
    let anchors = Selector::parse("a[href]")
        .map_err(|err| anyhow::anyhow!("parse anchor selector: {err:?}"))?;

    let document = Html::parse_document(html);
    let mut slugs = BTreeSet::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.split('?').next().unwrap_or_default().trim();
        if href.is_empty() || href.contains('#') {
            continue;
        }
        if !href.starts_with('/') && Url::parse(href).is_err() {
            continue;
        }
        let Ok(url) = base_url.join(href) else {
            continue;
        };
        if url.host_str() != base_url.host_str() {
            continue;
        }

        let Some(caps) = season_path.captures(url.path()) else {
            continue;
        };
        let slug = &caps[1];
        if EXCLUDED_LISTING_SLUGS.contains(&slug) {
            continue;
        }
        slugs.insert(slug.to_owned());
    }

    Ok(slugs.into_iter().collect())
}
