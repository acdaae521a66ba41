use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{LISTING_ROOT, Paths, SiteConfig};
use crate::fetch::Fetch;

/// Image attributes in preference order; lazy-loaded sources come first.
pub const IMAGE_ATTRIBUTES: &[&str] = &["data-src", "src"];

/// One image on a show page. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Look {
    pub season: String,
    pub designer: String,
    pub look_number: u32,
    pub image_url: String,
    pub caption: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Written { path: PathBuf, looks: usize },
    NoLooks,
}

impl ScrapeOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Written { .. } => 0,
            Self::NoLooks => 2,
        }
    }
}

pub fn scrape_season(
    fetcher: &impl Fetch,
    site: &SiteConfig,
    paths: &Paths,
    season: &str,
    delay: Duration,
) -> anyhow::Result<ScrapeOutcome> {
    let show_urls = get_show_links(fetcher, site, season)?;
    tracing::info!(season, collections = show_urls.len(), "found collections");

    let mut looks = Vec::new();
    for (i, show_url) in show_urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        tracing::info!(
            "[{}/{}] scraping {show_url}",
            i + 1,
            show_urls.len()
        );
        let html = match fetcher.fetch(show_url) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(url = %show_url, %err, "show page fetch failed; skipping");
                continue;
            }
        };
        looks.extend(extract_looks(&html, &site.base_url, season, show_url)?);
    }

    if looks.is_empty() {
        tracing::warn!(season, "no looks extracted; the page layout may have changed");
        return Ok(ScrapeOutcome::NoLooks);
    }

    let path = paths.season_csv_path(season);
    write_looks_csv(&path, &looks)?;
    tracing::info!(season, looks = looks.len(), out = %path.display(), "wrote looks");

    Ok(ScrapeOutcome::Written {
        path,
        looks: looks.len(),
    })
}

pub fn get_show_links(
    fetcher: &impl Fetch,
    site: &SiteConfig,
    season: &str,
) -> anyhow::Result<Vec<Url>> {
    let season_url = site.season_url(season)?;
    tracing::info!(url = %season_url, "fetch season page");
    match fetcher.fetch(&season_url) {
        Ok(html) => extract_show_links(&html, &site.base_url, season),
        Err(err) => {
            tracing::warn!(url = %season_url, %err, "season page fetch failed");
            Ok(Vec::new())
        }
    }
}

pub fn extract_show_links(html: &str, base_url: &Url, season: &str) -> anyhow::Result<Vec<Url>> {
    let anchors = selector("a[href]")?;
    let season_marker = format!("/{LISTING_ROOT}/{season}/");

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(&season_marker) {
            continue;
        }
        let Some(url) = resolve_without_query(base_url, href) else {
            continue;
        };
        if url.host_str() != base_url.host_str() || is_gallery_page(&url) {
            continue;
        }
        let Some(canonical) = canonical_show_url(&url, season) else {
            continue;
        };
        links.push(canonical);
    }

    links.sort();
    links.dedup();
    Ok(links)
}

fn is_gallery_page(url: &Url) -> bool {
    url.path_segments()
        .is_some_and(|mut segments| segments.any(|segment| segment == "gallery"))
}

fn canonical_show_url(url: &Url, season: &str) -> Option<Url> {
    let segments = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    match segments.as_slice() {
        [root, s, designer] if *root == LISTING_ROOT && *s == season => {
            let mut canonical = url.clone();
            canonical.set_path(&format!("/{root}/{s}/{designer}"));
            Some(canonical)
        }
        _ => None,
    }
}

pub fn designer_name(show_url: &Url) -> String {
    let slug = show_url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .unwrap_or_default();
    crate::text::title_from_slug(slug)
}

pub fn extract_looks(
    html: &str,
    base_url: &Url,
    season: &str,
    show_url: &Url,
) -> anyhow::Result<Vec<Look>> {
    let figures = selector("figure")?;
    let images = selector("img")?;
    let captions = selector("figcaption")?;

    let document = Html::parse_document(html);
    let designer = designer_name(show_url);
    let mut looks: Vec<Look> = Vec::new();

    for figure in document.select(&figures) {
        let Some(img) = figure.select(&images).next() else {
            continue;
        };
        let Some(image_url) = image_source(img).and_then(|src| resolve_without_query(base_url, src))
        else {
            continue;
        };
        let caption = figure
            .select(&captions)
            .next()
            .map(|cap| crate::text::collapse_whitespace(cap.text()))
            .unwrap_or_default();

        looks.push(Look {
            season: season.to_owned(),
            designer: designer.clone(),
            look_number: u32::try_from(looks.len() + 1).context("look number overflow")?,
            image_url: image_url.to_string(),
            caption,
            source_url: show_url.to_string(),
        });
    }

    Ok(looks)
}

pub fn image_source(img: ElementRef<'_>) -> Option<&str> {
    IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

pub fn write_looks_csv(path: &Path, looks: &[Look]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for look in looks {
        writer
            .serialize(look)
            .with_context(|| format!("serialize look {} of {}", look.look_number, look.designer))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("finish csv: {}", err.error()))?;
    crate::store::write_atomic(path, &bytes)
        .with_context(|| format!("write looks csv: {}", path.display()))
}

pub fn read_looks_csv(path: &Path) -> anyhow::Result<Vec<Look>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open looks csv: {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<Look>, _>>()
        .with_context(|| format!("parse looks csv: {}", path.display()))
}

fn resolve_without_query(base_url: &Url, href: &str) -> Option<Url> {
    let href = href.split('?').next().unwrap_or_default().trim();
    if href.is_empty() {
        return None;
    }
    let mut url = base_url.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    url.set_query(None);
    Some(url)
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow::anyhow!("parse selector {css:?}: {err:?}"))
}
