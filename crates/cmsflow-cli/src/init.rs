use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use tracing::{info, instrument};

use crate::Cli;

/// Starter configuration: the article item type with a single-stage core
/// workflow whose transitions apply from any stage.
pub const STARTER_CONFIG: &str = r#"[site]
name = "my-site"
media_root = "media"

[assets]
extensions = ["system", "com_content"]

[extensions."com_content.article"]
source = "builtin"
required = true

[[workflows]]
id = 1
extension = "com_content.article"
title = "Basic Workflow"
core = true
default = true

[[workflows.stages]]
id = 1
title = "Basic Stage"
default = true

[[workflows.transitions]]
id = 1
title = "Unpublish"
from_stage_id = -1
to_stage_id = 1
stage_condition = "unpublished"
ordering = 1

[[workflows.transitions]]
id = 2
title = "Publish"
from_stage_id = -1
to_stage_id = 1
stage_condition = "published"
ordering = 2

[[workflows.transitions]]
id = 3
title = "Trash"
from_stage_id = -1
to_stage_id = 1
stage_condition = "trashed"
ordering = 3

[[workflows.transitions]]
id = 4
title = "Archive"
from_stage_id = -1
to_stage_id = 1
stage_condition = "archived"
ordering = 4

# Items start in the workflow's default stage unless `stage_id` is set.
[[items]]
id = 1
extension = "com_content.article"
workflow_id = 1
"#;

/// Runs the `init` command to write a starter site configuration.
#[instrument(skip(cli))]
pub fn run(cli: &Cli) -> Result<()> {
    if cli.stdout {
        print!("{STARTER_CONFIG}");
        return Ok(());
    }

    write_if_absent(&cli.config, STARTER_CONFIG, cli.force)
        .with_context(|| format!("failed to write '{}'", cli.config))?;

    info!("init complete: config={}", cli.config);
    println!("next: run 'cmsf workflow:check'");

    Ok(())
}

fn write_if_absent(path: &str, content: &str, force: bool) -> Result<()> {
    let output = Path::new(path);

    if output.exists() && !force {
        return Err(anyhow!(
            "'{}' already exists. Re-run with --force to overwrite",
            path
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    fs::write(output, content)
        .with_context(|| format!("failed to write file '{}'", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmsflow_core::CmsflowConfig;
    use tempfile::tempdir;

    #[test]
    fn starter_config_parses_and_validates() {
        let cfg: CmsflowConfig = toml::from_str(STARTER_CONFIG).expect("starter config parses");
        let definition = cfg.workflows[0].to_definition();
        definition.validate().expect("starter workflow is valid");
        assert_eq!(definition.transitions.len(), 4);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cmsflow.toml");
        fs::write(&path, "existing").unwrap();
        let path = path.to_str().unwrap();

        let err = write_if_absent(path, STARTER_CONFIG, false).expect_err("must refuse");
        assert!(err.to_string().contains("--force"));

        write_if_absent(path, STARTER_CONFIG, true).expect("force overwrites");
        assert_eq!(fs::read_to_string(path).unwrap(), STARTER_CONFIG);
    }
}
