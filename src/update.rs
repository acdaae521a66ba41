use std::time::Duration;

use anyhow::Context as _;

use crate::config::{Paths, SiteConfig};
use crate::fetch::Fetch;
use crate::seasons::WatchOutcome;
use crate::shows::ScrapeOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub new_seasons: Vec<String>,
    pub scraped: Vec<String>,
    pub empty: Vec<String>,
}

impl UpdateSummary {
    pub fn exit_code(&self) -> u8 {
        if self.new_seasons.is_empty() { 0 } else { 1 }
    }
}

pub fn run(
    fetcher: &impl Fetch,
    site: &SiteConfig,
    paths: &Paths,
    delay: Duration,
) -> anyhow::Result<UpdateSummary> {
    tracing::info!("update: watch");
    let outcome = crate::seasons::check_for_new_seasons(fetcher, site, paths).context("watch")?;
    let new_seasons = match outcome {
        WatchOutcome::Unchanged => Vec::new(),
        WatchOutcome::NewSeasons(slugs) => slugs,
    };

    let mut summary = UpdateSummary {
        new_seasons: new_seasons.clone(),
        ..UpdateSummary::default()
    };

    for season in &new_seasons {
        tracing::info!(season, "update: scrape");
        match crate::shows::scrape_season(fetcher, site, paths, season, delay)
            .with_context(|| format!("scrape {season}"))?
        {
            ScrapeOutcome::Written { .. } => {
                tracing::info!(season, "update: gallery");
                crate::gallery::render_gallery(paths, season)
                    .with_context(|| format!("gallery {season}"))?;
                summary.scraped.push(season.clone());
            }
            ScrapeOutcome::NoLooks => {
                tracing::warn!(season, "update: no looks extracted; skipping gallery");
                summary.empty.push(season.clone());
            }
        }
    }

    tracing::info!("update: index");
    crate::index::build_index(paths, "html").context("index")?;

    Ok(summary)
}
