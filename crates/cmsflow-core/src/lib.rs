//! Core wiring for the cmsflow workspace.
//!
//! This crate defines the site configuration, command structures, the
//! extension registry for workflow item types, and the [`Site`] that
//! connects them to the workflow engine and asset registry at startup.

pub mod command;
pub mod config;
pub mod constants;
pub mod extension;
pub mod site;

pub use command::{CommandParseError, CommandRef, PrimaryCommand};
pub use config::{CmsflowConfig, ExtensionSource, WorkflowConfig};
pub use extension::ExtensionRegistry;
pub use site::Site;
