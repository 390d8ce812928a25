use std::{fs, path::Path};

use anyhow::Context;
use beatmap_schema::{Beatmap, DEFAULT_LANE_COUNT};

mod error;
mod parser;
pub mod score_file;
mod writer;


pub use error::{LoadError, LoadErrorKind};
pub use writer::write_beatmap_str;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub lane_count: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            lane_count: DEFAULT_LANE_COUNT,
        }
    }
}

pub fn parse_beatmap_file(path: impl AsRef<Path>) -> Result<Beatmap, LoadError> {
    parse_beatmap_file_with_options(path, &LoadOptions::default())
}

pub fn parse_beatmap_file_with_options(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Beatmap, LoadError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|e| {
        LoadError::new("E2001", format!("failed to read beatmap: {e}"), 0)
            .with_file(path.display().to_string())
    })?;
    parse_beatmap_str_with_options(&src, options)
        .map_err(|e| e.with_file(path.display().to_string()))
}

pub fn parse_beatmap_str(src: &str) -> Result<Beatmap, LoadError> {
    parse_beatmap_str_with_options(src, &LoadOptions::default())
}

pub fn parse_beatmap_str_with_options(
    src: &str,
    options: &LoadOptions,
) -> Result<Beatmap, LoadError> {
    parser::parse_beatmap(src, options)
}

pub fn load_beatmap_json_from_path(path: impl AsRef<Path>) -> anyhow::Result<Beatmap> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read beatmap: {}", path.display()))?;
    let beatmap: Beatmap = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse beatmap json: {}", path.display()))?;
    Ok(beatmap)
}

pub fn load_beatmap_json_from_str(json: &str) -> anyhow::Result<Beatmap> {
    let beatmap: Beatmap = serde_json::from_str(json).context("failed to parse beatmap json")?;
    Ok(beatmap)
}

/// Loads a beatmap by extension: `.json` as serialized [`Beatmap`], anything else as text.
pub fn load_beatmap(path: impl AsRef<Path>) -> anyhow::Result<Beatmap> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_beatmap_json_from_path(path)
    } else {
        Ok(parse_beatmap_file(path)?)
    }
}
