//! Web asset registry and dependency resolver.
//!
//! Assets are named bundles of scripts and styles that may depend on other
//! assets. They are declared in JSON files shipped by extensions, merged into
//! an [`AssetRegistry`], and resolved into an ordered list of files where
//! every dependency precedes the asset that needs it.

pub mod asset;
pub mod declaration;
pub mod error;
pub mod manager;
pub mod registry;
mod resolve;

pub use asset::{Asset, AssetFile, Attributes, FileKind};
pub use error::AssetError;
pub use manager::AssetManager;
pub use registry::AssetRegistry;

/// File name of the declaration file an extension ships in its media folder.
pub const DECLARATION_FILE: &str = "joomla.asset.json";
