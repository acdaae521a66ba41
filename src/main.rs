use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use runway_watcher::cli::{Cli, Command};
use runway_watcher::config::{Paths, SiteConfig};
use runway_watcher::fetch::HttpFetcher;

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<u8> {
    runway_watcher::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let paths = Paths::from_args(&cli.site);

    let code = match cli.command {
        Command::Watch => {
            let site = SiteConfig::from_args(&cli.site).context("resolve site config")?;
            let fetcher = HttpFetcher::new(&site)?;
            let outcome = runway_watcher::seasons::check_for_new_seasons(&fetcher, &site, &paths)
                .context("watch")?;
            if let runway_watcher::seasons::WatchOutcome::NewSeasons(slugs) = &outcome {
                for slug in slugs {
                    println!("{slug}");
                }
            }
            outcome.exit_code()
        }
        Command::Scrape(args) => {
            let site = SiteConfig::from_args(&cli.site).context("resolve site config")?;
            let fetcher = HttpFetcher::new(&site)?;
            let outcome = runway_watcher::shows::scrape_season(
                &fetcher,
                &site,
                &paths,
                &args.season,
                Duration::from_millis(args.delay_ms),
            )
            .with_context(|| format!("scrape {}", args.season))?;
            if let runway_watcher::shows::ScrapeOutcome::Written { path, .. } = &outcome {
                println!("{}", path.display());
            }
            outcome.exit_code()
        }
        Command::Index(args) => {
            let out = runway_watcher::index::build_index(&paths, &args.extension).context("index")?;
            println!("{}", out.display());
            0
        }
        Command::Gallery(args) => {
            let pages = match args.season {
                Some(season) => vec![
                    runway_watcher::gallery::render_gallery(&paths, &season)
                        .with_context(|| format!("gallery {season}"))?,
                ],
                None => runway_watcher::gallery::render_all(&paths).context("gallery --all")?,
            };
            for page in pages {
                println!("{}", page.display());
            }
            0
        }
        Command::Update(args) => {
            let site = SiteConfig::from_args(&cli.site).context("resolve site config")?;
            let fetcher = HttpFetcher::new(&site)?;
            let summary = runway_watcher::update::run(
                &fetcher,
                &site,
                &paths,
                Duration::from_millis(args.delay_ms),
            )
            .context("update")?;
            for season in &summary.scraped {
                println!("{season}");
            }
            summary.exit_code()
        }
    };

    Ok(code)
}
