use anyhow::{Context, Result};
use tracing::instrument;

use cmsflow_core::Site;

/// Renders every registered asset, parsing queued declaration files first.
#[instrument(skip(site))]
pub fn list(site: &mut Site, json: bool) -> Result<String> {
    let assets = site
        .assets
        .assets()
        .context("failed to load asset declarations")?;

    if json {
        return Ok(serde_json::to_string_pretty(&assets)?);
    }

    let mut lines = Vec::with_capacity(assets.len());
    for asset in assets {
        let mut line = asset.name.clone();
        if let Some(version) = &asset.version {
            line.push_str(&format!(" {version}"));
        }
        if !asset.dependencies.is_empty() {
            line.push_str(&format!(" (needs {})", asset.dependencies.join(", ")));
        }
        if let Some(path) = &asset.provenance {
            line.push_str(&format!(" [{}]", path.display()));
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Renders the files `name` expands to, dependencies first.
#[instrument(skip(site))]
pub fn resolve(site: &mut Site, name: &str, json: bool) -> Result<String> {
    let files = site
        .assets
        .resolve(name)
        .with_context(|| format!("failed to resolve asset '{name}'"))?;

    if json {
        return Ok(serde_json::to_string_pretty(&files)?);
    }
    Ok(files
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}
