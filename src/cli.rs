use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every job.
#[derive(Debug, Args)]
pub struct SiteArgs {
    /// Site origin (must be http/https). Falls back to `RUNWAY_WATCHER_BASE_URL`.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// `User-Agent` sent with every request.
    #[arg(long, global = true, default_value = crate::config::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout.
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory holding the season state, report and per-season CSV files.
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: String,

    /// Directory holding the generated static site.
    #[arg(long, global = true, default_value = "site")]
    pub site_dir: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect season listing pages that were not seen by a previous run.
    Watch,
    /// Scrape every show of one season into `<data-dir>/seasons/<SEASON>.csv`.
    Scrape(ScrapeArgs),
    /// Regenerate `<site-dir>/index.html` from the per-season pages.
    Index(IndexArgs),
    /// Render per-season gallery pages from scraped CSV files.
    Gallery(GalleryArgs),
    /// Watch, scrape new seasons, render their galleries and rebuild the index.
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Season slug, e.g. `fall-2023-ready-to-wear`.
    #[arg(value_parser = parse_season_slug)]
    pub season: String,

    /// Delay between show page requests (politeness).
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Per-season artifacts to list: `html` gallery pages under `<site-dir>/seasons`
    /// or `csv` files under `<data-dir>/seasons`.
    #[arg(long, default_value = "html")]
    pub extension: String,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct GalleryArgs {
    /// Season slug to render.
    #[arg(value_parser = parse_season_slug)]
    pub season: Option<String>,

    /// Render every season CSV found under `<data-dir>/seasons`.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Delay between show page requests (politeness).
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,
}

fn parse_season_slug(raw: &str) -> Result<String, String> {
    if crate::seasons::is_season_slug(raw) {
        Ok(raw.to_owned())
    } else {
        Err(format!(
            "invalid season slug {raw:?}: expected lowercase letters, digits and hyphens"
        ))
    }
}
