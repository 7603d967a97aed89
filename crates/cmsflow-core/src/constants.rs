//! Constants used across the cmsflow workspace.

/// The filename for cmsflow's primary configuration.
pub const CONFIG_FILE: &str = "cmsflow.toml";

/// Media folder asset declarations are looked up in when none is configured.
pub const DEFAULT_MEDIA_ROOT: &str = "media";
