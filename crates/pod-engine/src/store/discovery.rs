//! Dataset root discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PodError, Result};

/// An area directory and its height levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredArea {
    pub id: String,
    pub dir: PathBuf,
    /// Heights in directory-name order.
    pub heights: Vec<u32>,
}

/// Parse a height directory name such as `100m`.
///
/// Surrounding whitespace and an upper-case `M` are tolerated.
pub fn parse_height_dir(name: &str) -> Option<u32> {
    let lower = name.trim().to_ascii_lowercase();
    lower.strip_suffix('m')?.trim().parse().ok()
}

/// Immediate subdirectories of `dir`, sorted by file name.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            PodError::configuration(format!("failed to scan {}: {}", dir.display(), e))
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_str().map(str::to_string);
        match name {
            Some(name) => out.push((name, entry.into_path())),
            None => tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 directory"),
        }
    }
    Ok(out)
}

/// Height levels of one area directory, in directory-name order.
pub fn heights_for_area(area_dir: &Path) -> Result<Vec<u32>> {
    Ok(subdirectories(area_dir)?
        .into_iter()
        .filter_map(|(name, _)| parse_height_dir(&name))
        .collect())
}

/// Directory holding `height` under `area_dir`.
///
/// The canonical `{height}m` name is used when present; otherwise the first
/// directory in name order that parses to `height`. `None` when nothing
/// matches.
pub fn find_height_dir(area_dir: &Path, height: u32) -> Result<Option<PathBuf>> {
    let canonical = area_dir.join(format!("{}m", height));
    if canonical.is_dir() {
        return Ok(Some(canonical));
    }
    if !area_dir.is_dir() {
        return Ok(None);
    }
    Ok(subdirectories(area_dir)?
        .into_iter()
        .find(|(name, _)| parse_height_dir(name) == Some(height))
        .map(|(_, path)| path))
}

/// Check that an area id names a single directory below the root.
pub fn validate_area_id(area: &str) -> Result<()> {
    if area.is_empty() || area == "." || area == ".." || area.contains(['/', '\\']) {
        return Err(PodError::InvalidQuery(format!(
            "area id '{}' must be a single directory name",
            area
        )));
    }
    Ok(())
}

/// Areas under `root` that have at least one height directory.
///
/// Areas are returned in directory-name order. A missing root is a
/// configuration error; an empty result is not.
pub fn discover_areas(root: &Path) -> Result<Vec<DiscoveredArea>> {
    if !root.is_dir() {
        return Err(PodError::configuration(format!(
            "UWV_DATA_DIR does not exist or is not a directory: {}",
            root.display()
        )));
    }

    let mut areas = Vec::new();
    for (id, dir) in subdirectories(root)? {
        let heights = heights_for_area(&dir)?;
        if heights.is_empty() {
            tracing::debug!(area = %id, "Skipping area without height directories");
            continue;
        }
        areas.push(DiscoveredArea { id, dir, heights });
    }
    Ok(areas)
}
