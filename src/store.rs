use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Replaces `path` with `contents` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("create output dir: {}", parent_dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("create temp file in: {}", parent_dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("write temp file for: {}", path.display()))?;
    tmp.flush()
        .with_context(|| format!("flush temp file for: {}", path.display()))?;
    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("replace {}: {}", path.display(), err.error))?;

    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("read json: {}", path.display()));
        }
    };
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("parse json: {}", path.display()))?;
    Ok(Some(value))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize json: {}", path.display()))?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}
