use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("malformed asset declaration '{}': {reason}", .path.display())]
    MalformedDeclaration { path: PathBuf, reason: String },
    #[error("asset entry #{index} in '{}' has no name", .path.display())]
    MissingName { path: PathBuf, index: usize },
    #[error("{}", unknown_message(.name, .required_by.as_deref()))]
    UnknownAsset {
        name: String,
        required_by: Option<String>,
    },
    #[error("cyclic asset dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

fn unknown_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!("unknown asset '{name}' (required by '{parent}')"),
        None => format!("unknown asset '{name}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_asset_names_the_dependent() {
        let err = AssetError::UnknownAsset {
            name: "core".to_string(),
            required_by: Some("ui".to_string()),
        };
        assert_eq!(err.to_string(), "unknown asset 'core' (required by 'ui')");
    }

    #[test]
    fn cycle_lists_participants() {
        let err = AssetError::CyclicDependency {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(err.to_string().ends_with("a -> b -> a"));
    }
}
