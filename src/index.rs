use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;

use crate::config::Paths;
use crate::text::{html_escape, title_from_slug};

pub const SITE_TITLE: &str = "Vogue Runway Watcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEntry {
    pub label: String,
    pub href: String,
}

pub fn artifacts_dir(paths: &Paths, extension: &str) -> PathBuf {
    if extension == "csv" {
        paths.season_csv_dir()
    } else {
        paths.season_pages_dir()
    }
}

pub fn build_index(paths: &Paths, extension: &str) -> anyhow::Result<PathBuf> {
    let seasons_dir = artifacts_dir(paths, extension);
    std::fs::create_dir_all(&seasons_dir)
        .with_context(|| format!("create seasons dir: {}", seasons_dir.display()))?;

    let entries = list_season_entries(&seasons_dir, &paths.site_dir, extension)?;
    let html = render_index(&entries);

    let out = paths.index_path();
    crate::store::write_atomic(&out, html.as_bytes())
        .with_context(|| format!("write index: {}", out.display()))?;
    tracing::info!(seasons = entries.len(), out = %out.display(), "index updated");

    Ok(out)
}

pub fn list_season_entries(
    seasons_dir: &Path,
    site_dir: &Path,
    extension: &str,
) -> anyhow::Result<Vec<SeasonEntry>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(seasons_dir)
        .with_context(|| format!("read seasons dir: {}", seasons_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let (Some(file_name), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        files.push((file_name.to_owned(), stem.to_owned(), path.clone()));
    }
    files.sort();

    files
        .into_iter()
        .map(|(_, stem, path)| -> anyhow::Result<SeasonEntry> {
            Ok(SeasonEntry {
                label: title_from_slug(&stem),
                href: relative_href(site_dir, &path)?,
            })
        })
        .collect()
}

fn relative_href(from_dir: &Path, to: &Path) -> anyhow::Result<String> {
    let from = std::path::absolute(from_dir)
        .with_context(|| format!("resolve path: {}", from_dir.display()))?;
    let to = std::path::absolute(to).with_context(|| format!("resolve path: {}", to.display()))?;

    let from_parts = from
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect::<Vec<_>>();
    let to_parts = to
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect::<Vec<_>>();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec!["..".to_owned(); from_parts.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    Ok(parts.join("/"))
}

pub fn render_index(entries: &[SeasonEntry]) -> String {
    let items = if entries.is_empty() {
        "<li>No seasons processed yet.</li>".to_owned()
    } else {
        entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    html_escape(&entry.href),
                    html_escape(&entry.label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n      ")
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{SITE_TITLE}</title>
  <style>
    body {{
      font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial;
      margin: 40px;
      line-height: 1.4;
    }}
    a {{ text-decoration: none; }}
    a:hover {{ text-decoration: underline; }}
    .muted {{ color: #666; }}
    .card {{
      max-width: 900px;
      border: 1px solid #ddd;
      border-radius: 14px;
      padding: 18px;
    }}
  </style>
</head>
<body>
  <div class="card">
    <h1>{SITE_TITLE}</h1>
    <p class="muted">Auto-generated galleries (one per season detected).</p>

    <h2>Seasons</h2>
    <ul>
      {items}
    </ul>
  </div>
</body>
</html>
"#
    )
}
