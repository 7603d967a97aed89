use std::collections::{HashMap, HashSet};

use crate::asset::{Asset, AssetFile};
use crate::error::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first dependency walk.
///
/// Dependencies are visited in their declared order and every asset is
/// emitted after all of its dependencies, once. The walk keeps its own stack
/// of `(asset, next dependency index)` frames so chain depth is bounded by
/// memory, not by the thread stack.
struct Walker<'a, F> {
    lookup: F,
    marks: HashMap<&'a str, Mark>,
    stack: Vec<(&'a Asset, usize)>,
    order: Vec<&'a Asset>,
}

impl<'a, F> Walker<'a, F>
where
    F: Fn(&str) -> Option<&'a Asset>,
{
    fn visit(&mut self, root: &str) -> Result<(), AssetError> {
        self.enter(root, None)?;
        while let Some(frame) = self.stack.last_mut() {
            let asset = frame.0;
            match asset.dependencies.get(frame.1) {
                Some(dependency) => {
                    frame.1 += 1;
                    self.enter(dependency, Some(&asset.name))?;
                }
                None => {
                    self.stack.pop();
                    self.marks.insert(asset.name.as_str(), Mark::Done);
                    self.order.push(asset);
                }
            }
        }
        Ok(())
    }

    /// Pushes a frame for `name` unless it is already emitted.
    fn enter(&mut self, name: &str, required_by: Option<&str>) -> Result<(), AssetError> {
        let asset = (self.lookup)(name).ok_or_else(|| AssetError::UnknownAsset {
            name: name.to_string(),
            required_by: required_by.map(ToOwned::to_owned),
        })?;
        let key = asset.name.as_str();

        match self.marks.get(key) {
            Some(Mark::Done) => Ok(()),
            Some(Mark::Visiting) => {
                let start = self
                    .stack
                    .iter()
                    .position(|(a, _)| a.name == key)
                    .unwrap_or(0);
                let mut cycle: Vec<String> = self.stack[start..]
                    .iter()
                    .map(|(a, _)| a.name.clone())
                    .collect();
                cycle.push(key.to_string());
                Err(AssetError::CyclicDependency { cycle })
            }
            None => {
                self.marks.insert(key, Mark::Visiting);
                self.stack.push((asset, 0));
                Ok(())
            }
        }
    }
}

/// Orders `roots` and everything they depend on so that each asset follows
/// its dependencies. Roots are walked in the order given.
pub(crate) fn dependency_order<'a, F>(
    lookup: F,
    roots: &[&str],
) -> Result<Vec<&'a Asset>, AssetError>
where
    F: Fn(&str) -> Option<&'a Asset>,
{
    let mut walker = Walker {
        lookup,
        marks: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
    };
    for root in roots {
        walker.visit(root)?;
    }
    Ok(walker.order)
}

/// Flattens ordered assets into their files, keeping the first occurrence of
/// any file referenced twice.
pub(crate) fn flatten_files(order: &[&Asset]) -> Vec<AssetFile> {
    let mut seen = HashSet::new();
    order
        .iter()
        .flat_map(|asset| asset.files())
        .filter(|file| seen.insert((file.kind, file.path.clone())))
        .collect()
}
