use std::path::Path;

use anyhow::{Context, Result};
use isomap_anvil::RegionInfo;

/// All `*.mca` containers under `<world>/region`, sorted by path.
pub fn discover_regions(world: &Path) -> Result<Vec<RegionInfo>> {
    let dir = world.join("region");
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("Failed to list region directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list region directory {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "mca") {
            paths.push(path);
        }
    }
    paths.sort();

    log::info!("Found {} region files in {}", paths.len(), dir.display());
    Ok(paths.into_iter().map(RegionInfo::from_path).collect())
}
