use std::path::PathBuf;

use anyhow::Context as _;

use crate::config::Paths;
use crate::shows::{Look, read_looks_csv};
use crate::text::{html_escape, title_from_slug};

pub fn render_gallery(paths: &Paths, season: &str) -> anyhow::Result<PathBuf> {
    let csv_path = paths.season_csv_path(season);
    let looks = read_looks_csv(&csv_path)?;
    let html = render_season_page(season, &looks);

    let out = paths.season_page_path(season);
    crate::store::write_atomic(&out, html.as_bytes())
        .with_context(|| format!("write gallery: {}", out.display()))?;
    tracing::info!(season, looks = looks.len(), out = %out.display(), "gallery rendered");

    Ok(out)
}

pub fn render_all(paths: &Paths) -> anyhow::Result<Vec<PathBuf>> {
    let csv_dir = paths.season_csv_dir();
    if !csv_dir.exists() {
        tracing::info!(dir = %csv_dir.display(), "no season csv directory; nothing to render");
        return Ok(Vec::new());
    }

    let mut seasons = Vec::new();
    for entry in std::fs::read_dir(&csv_dir)
        .with_context(|| format!("read season csv dir: {}", csv_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if crate::seasons::is_season_slug(stem) {
            seasons.push(stem.to_owned());
        }
    }
    seasons.sort();

    seasons
        .iter()
        .map(|season| render_gallery(paths, season).with_context(|| format!("render {season}")))
        .collect()
}

fn group_by_designer(looks: &[Look]) -> Vec<(&str, Vec<&Look>)> {
    let mut groups: Vec<(&str, Vec<&Look>)> = Vec::new();
    for look in looks {
        if let Some((designer, members)) = groups.last_mut()
            && *designer == look.designer
        {
            members.push(look);
            continue;
        }
        groups.push((look.designer.as_str(), vec![look]));
    }
    groups
}

pub fn render_season_page(season: &str, looks: &[Look]) -> String {
    let title = html_escape(&title_from_slug(season));
    let mut sections = String::new();

    for (designer, members) in group_by_designer(looks) {
        let source = members
            .first()
            .map(|look| html_escape(&look.source_url))
            .unwrap_or_default();
        sections.push_str(&format!(
            "    <section>\n      <h2><a href=\"{source}\">{}</a></h2>\n      <div class=\"grid\">\n",
            html_escape(designer)
        ));
        for look in members {
            sections.push_str(&format!(
                "        <figure><img loading=\"lazy\" src=\"{}\" alt=\"{} look {}\" /><figcaption>Look {}{}</figcaption></figure>\n",
                html_escape(&look.image_url),
                html_escape(designer),
                look.look_number,
                look.look_number,
                if look.caption.is_empty() {
                    String::new()
                } else {
                    format!(": {}", html_escape(&look.caption))
                },
            ));
        }
        sections.push_str("      </div>\n    </section>\n");
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <style>
    body {{ font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; margin: 40px; }}
    .grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 12px; }}
    figure {{ margin: 0; }}
    img {{ width: 100%; border-radius: 8px; }}
    figcaption {{ color: #666; font-size: 0.85em; }}
  </style>
</head>
<body>
  <p><a href="../index.html">All seasons</a></p>
  <h1>{title}</h1>
{sections}</body>
</html>
"#
    )
}
