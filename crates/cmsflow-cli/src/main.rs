use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmsflow_core::constants::CONFIG_FILE;
use cmsflow_core::{CmsflowConfig, CommandRef, ExtensionRegistry, PrimaryCommand, Site};
use cmsflow_ext_content::ArticleType;
use cmsflow_workflow::{ItemId, TransitionId};

mod assets;
mod init;
mod styles;
mod workflow;

use styles as s;

/// The command-line interface for cmsflow.
#[derive(Debug, Parser)]
#[command(name = "cmsf")]
#[command(version)]
#[command(styles = s::get_clap_styles())]
#[command(
    help_template = "{bin} {version}\n\n{about-with-newline}{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
#[command(about = "Content workflows and web asset resolution")]
#[command(long_about = "cmsflow drives content items through stage/transition workflows
and resolves named web assets into dependency-ordered file lists.

Common Commands:
  init                                  Write a starter cmsflow.toml
  assets:list                           List registered assets
  assets:resolve <name>                 Print the files an asset expands to
  workflow:check                        Validate workflows and item types
  workflow:transitions <item>           List transitions available to an item
  workflow:apply <transition> <item>... Fire a transition on selected items
  workflow:actions                      Show bulk toolbar action availability
")]
#[command(
    after_help = "\x1b[1;32mExamples:\x1b[0m\n  \x1b[36mcmsf init\x1b[0m                       \x1b[2m# Bootstrap a site config\x1b[0m\n  \x1b[36mcmsf assets resolve core\x1b[0m        \x1b[2m# Shorthand for assets:resolve core\x1b[0m\n  \x1b[36mcmsf workflow:apply 2 1 4\x1b[0m       \x1b[2m# Fire transition 2 on items 1 and 4\x1b[0m"
)]
pub(crate) struct Cli {
    /// Command in canonical form, for example: `assets:resolve`, `workflow:check`
    command: Option<String>,
    /// Optional selector (supports `cmsf workflow check` style) followed by
    /// the command's arguments
    rest: Vec<String>,
    /// Path to the site config file.
    #[arg(long, default_value = CONFIG_FILE)]
    pub(crate) config: String,
    /// Print machine-readable JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub(crate) json: bool,
    /// Print the starter config to stdout instead of writing it.
    #[arg(long, default_value_t = false)]
    pub(crate) stdout: bool,
    /// Overwrite generated files if they already exist.
    #[arg(long, default_value_t = false)]
    pub(crate) force: bool,
}

impl Cli {
    /// Splits positional input into the command text and its arguments.
    ///
    /// `assets resolve core` and `assets:resolve core` both yield
    /// (`assets:resolve`, [`core`]).
    fn command_and_args(&self) -> Option<(String, &[String])> {
        let command = self.command.as_ref()?;
        if command.contains(':') {
            return Some((command.clone(), self.rest.as_slice()));
        }
        match self.rest.split_first() {
            Some((selector, args)) if !selector.is_empty() => {
                Some((format!("{command}:{selector}"), args))
            }
            _ => Some((command.clone(), self.rest.as_slice())),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);

    let Some((command_text, args)) = cli.command_and_args() else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let command = CommandRef::from_str(&command_text)
        .map_err(|e| anyhow!("failed to parse command '{}': {e}", command_text))?;

    if command.primary == PrimaryCommand::Init {
        return init::run(&cli);
    }

    let mut site = load_site(&cli.config)?;
    let output = execute(&cli, &mut site, &command, args)?;
    println!("{output}");
    Ok(())
}

/// Loads the config and boots the site with the builtin item types.
fn load_site(config_path: &str) -> Result<Site> {
    let cfg = CmsflowConfig::load_from_file(config_path)
        .with_context(|| format!("unable to load config '{}'", config_path))?;
    let mut registry = ExtensionRegistry::discover(&cfg)?;

    if registry.get(cmsflow_ext_content::EXTENSION).is_none() {
        registry.register(Box::new(ArticleType));
    }

    Site::bootstrap(cfg, registry)
}

/// Executes a validated command against a booted site and returns its output.
fn execute(cli: &Cli, site: &mut Site, command: &CommandRef, args: &[String]) -> Result<String> {
    match (command.primary, command.selector.as_deref()) {
        (PrimaryCommand::Assets, Some("list") | None) => assets::list(site, cli.json),
        (PrimaryCommand::Assets, Some("resolve")) => {
            let name = arg(args, 0, "asset name")?;
            assets::resolve(site, name, cli.json)
        }
        (PrimaryCommand::Workflow, Some("check") | None) => workflow::check(site),
        (PrimaryCommand::Workflow, Some("transitions")) => {
            let item = ItemId(parse_id(args, 0, "item id")?);
            workflow::transitions(site, item, cli.json)
        }
        (PrimaryCommand::Workflow, Some("apply")) => {
            let transition = TransitionId(parse_id(args, 0, "transition id")?);
            arg(args, 1, "item id")?;
            let items = (1..args.len())
                .map(|index| parse_id(args, index, "item id").map(ItemId))
                .collect::<Result<Vec<_>>>()?;
            workflow::apply(site, transition, &items, cli.json)
        }
        (PrimaryCommand::Workflow, Some("actions")) => workflow::actions(site, cli.json),
        _ => bail!("command '{}' cannot run here", command),
    }
}

fn arg<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument: {what}"))
}

fn parse_id(args: &[String], index: usize, what: &str) -> Result<u64> {
    let text = arg(args, index, what)?;
    text.parse()
        .with_context(|| format!("invalid {what} '{text}'"))
}
