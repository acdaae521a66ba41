use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::SiteArgs;

pub const DEFAULT_BASE_URL: &str = "https://www.vogue.com";
pub const DEFAULT_USER_AGENT: &str = "RunwayWatcher/1.0 (automation)";
pub const BASE_URL_ENV: &str = "RUNWAY_WATCHER_BASE_URL";

pub const LISTING_ROOT: &str = "fashion-shows";
pub const SEASONS_PAGE: &str = "seasons";

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
}

impl SiteConfig {
    pub fn from_args(args: &SiteArgs) -> anyhow::Result<Self> {
        let raw = match args.base_url.as_deref() {
            Some(raw) => raw.to_owned(),
            None => std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        };
        let base_url = parse_base_url(&raw)?;

        Ok(Self {
            base_url,
            user_agent: args.user_agent.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
        })
    }

    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn seasons_listing_url(&self) -> anyhow::Result<Url> {
        self.listing_url(SEASONS_PAGE)
    }

    pub fn season_url(&self, season: &str) -> anyhow::Result<Url> {
        self.listing_url(season)
    }

    fn listing_url(&self, segment: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("/{LISTING_ROOT}/{segment}"))
            .with_context(|| format!("build listing url for {segment:?}"))
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("parse base url: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("base url must be http/https: {url}");
    }
    if url.host_str().is_none() {
        anyhow::bail!("base url must have host: {url}");
    }
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub site_dir: PathBuf,
}

impl Paths {
    pub fn from_args(args: &SiteArgs) -> Self {
        Self::new(&args.data_dir, &args.site_dir)
    }

    pub fn new(data_dir: impl AsRef<Path>, site_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            site_dir: site_dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state_seasons.json")
    }

    pub fn new_seasons_path(&self) -> PathBuf {
        self.data_dir.join("new_seasons.json")
    }

    pub fn season_csv_dir(&self) -> PathBuf {
        self.data_dir.join("seasons")
    }

    pub fn season_csv_path(&self, season: &str) -> PathBuf {
        self.season_csv_dir().join(format!("{season}.csv"))
    }

    pub fn index_path(&self) -> PathBuf {
        self.site_dir.join("index.html")
    }

    pub fn season_pages_dir(&self) -> PathBuf {
        self.site_dir.join("seasons")
    }

    pub fn season_page_path(&self, season: &str) -> PathBuf {
        self.season_pages_dir().join(format!("{season}.html"))
    }
}
