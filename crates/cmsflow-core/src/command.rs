use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryCommand {
    Init,
    Assets,
    Workflow,
}

impl PrimaryCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Assets => "assets",
            Self::Workflow => "workflow",
        }
    }

    /// Selectors accepted after `primary:`; an empty list means none are allowed.
    pub fn selectors(self) -> &'static [&'static str] {
        match self {
            Self::Init => &[],
            Self::Assets => &["list", "resolve"],
            Self::Workflow => &["check", "transitions", "apply", "actions"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandRef {
    pub primary: PrimaryCommand,
    pub selector: Option<String>,
}

impl CommandRef {
    pub fn canonical(&self) -> String {
        match &self.selector {
            Some(selector) => format!("{}:{}", self.primary.as_str(), selector),
            None => self.primary.as_str().to_string(),
        }
    }
}

impl Display for CommandRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("unknown primary command '{0}'")]
    UnknownPrimary(String),
    #[error("unknown selector '{selector}' for '{primary}' (expected one of: {expected})")]
    UnknownSelector {
        primary: &'static str,
        selector: String,
        expected: String,
    },
}

impl FromStr for CommandRef {
    type Err = CommandParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(2, ':');
        let primary_text = parts.next().unwrap_or_default();
        let selector = parts.next().map(ToOwned::to_owned);

        let primary = match primary_text {
            "init" => PrimaryCommand::Init,
            "assets" => PrimaryCommand::Assets,
            "workflow" => PrimaryCommand::Workflow,
            _ => return Err(CommandParseError::UnknownPrimary(primary_text.to_string())),
        };

        if let Some(selector) = &selector {
            if !primary.selectors().contains(&selector.as_str()) {
                return Err(CommandParseError::UnknownSelector {
                    primary: primary.as_str(),
                    selector: selector.clone(),
                    expected: primary.selectors().join(", "),
                });
            }
        }

        Ok(Self { primary, selector })
    }
}
