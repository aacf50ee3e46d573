use crate::proto::{v1, v2};
use prost::Message;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

/// The flag whose arguments are wanted *because* they are action outputs.
pub const OUTPUT_FLAG: &str = "--output";

#[derive(Debug, Error)]
pub enum AqueryError {
    #[error("aquery output is neither a v1 nor a v2 action graph: {v1}; {v2}")]
    Decode {
        v1: prost::DecodeError,
        v2: prost::DecodeError,
    },
}

/// A decoded `bazel aquery --output=proto` response.
///
/// Bazel switched the wire schema of this message without any version marker,
/// so [`ActionGraph::decode`] works out which one it is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionGraph {
    V1(v1::ActionGraphContainer),
    V2(v2::ActionGraphContainer),
}

impl ActionGraph {
    /// Decode `bytes`, preferring the v2 schema.
    ///
    /// v2 is only trusted when it has artifacts and the first one carries a
    /// non-zero id; v1 encodes ids as strings, which never decode into a
    /// meaningful v2 id. Anything else is retried as v1.
    pub fn decode(bytes: &[u8]) -> Result<Self, AqueryError> {
        let as_v2 = match v2::ActionGraphContainer::decode(bytes) {
            Ok(container) if container.artifacts.first().is_some_and(|a| a.id != 0) => {
                return Ok(ActionGraph::V2(container));
            }
            other => other,
        };

        match (v1::ActionGraphContainer::decode(bytes), as_v2) {
            (Ok(container), _) => Ok(ActionGraph::V1(container)),
            // A well-formed but empty v2 response.
            (Err(_), Ok(container)) => Ok(ActionGraph::V2(container)),
            (Err(v1), Err(v2)) => Err(AqueryError::Decode { v1, v2 }),
        }
    }

    /// Relative paths passed to `flag` by actions with the given `mnemonic`.
    ///
    /// A path that is itself the output of one of those actions is an
    /// intermediate artifact and is dropped, except when `flag` is
    /// [`OUTPUT_FLAG`], where outputs are exactly what the caller asked for.
    pub fn select_paths(&self, mnemonic: &str, flag: &str) -> BTreeSet<String> {
        match self {
            ActionGraph::V1(container) => {
                let scan = scan_actions(
                    container.actions.iter().map(|a| {
                        (a.mnemonic.as_str(), a.arguments.as_slice(), a.output_ids.as_slice())
                    }),
                    mnemonic,
                    flag,
                );
                container
                    .artifacts
                    .iter()
                    .filter(|artifact| scan.keeps(&artifact.id, &artifact.exec_path, flag))
                    .map(|artifact| artifact.exec_path.clone())
                    .collect()
            }
            ActionGraph::V2(container) => {
                let scan = scan_actions(
                    container.actions.iter().map(|a| {
                        (a.mnemonic.as_str(), a.arguments.as_slice(), a.output_ids.as_slice())
                    }),
                    mnemonic,
                    flag,
                );
                let fragments = PathFragments::new(&container.path_fragments);
                container
                    .artifacts
                    .iter()
                    .filter_map(|artifact| {
                        let Some(path) = fragments.path(artifact.path_fragment_id) else {
                            tracing::debug!(
                                target: "infer.bazel",
                                artifact = artifact.id,
                                path_fragment = artifact.path_fragment_id,
                                "skipping artifact with unresolvable path fragment"
                            );
                            return None;
                        };
                        scan.keeps(&artifact.id, &path, flag).then_some(path)
                    })
                    .collect()
            }
        }
    }
}

struct ActionScan<K> {
    argument_paths: HashSet<String>,
    output_ids: HashSet<K>,
}

impl<K: Eq + Hash> ActionScan<K> {
    fn keeps(&self, id: &K, path: &str, flag: &str) -> bool {
        if !self.argument_paths.contains(path) {
            return false;
        }
        if flag != OUTPUT_FLAG && self.output_ids.contains(id) {
            tracing::debug!(
                target: "infer.bazel",
                path,
                "skipping artifact produced by another action"
            );
            return false;
        }
        tracing::debug!(target: "infer.bazel", path, flag, "found bazel dependency");
        true
    }
}

fn scan_actions<'a, K>(
    actions: impl Iterator<Item = (&'a str, &'a [String], &'a [K])>,
    mnemonic: &str,
    flag: &str,
) -> ActionScan<K>
where
    K: Eq + Hash + Clone + 'a,
{
    let mut scan = ActionScan {
        argument_paths: HashSet::new(),
        output_ids: HashSet::new(),
    };
    for (action_mnemonic, arguments, outputs) in actions {
        if action_mnemonic != mnemonic {
            continue;
        }
        scan.argument_paths.extend(
            flag_arguments(arguments, flag)
                .into_iter()
                .map(str::to_string),
        );
        scan.output_ids.extend(outputs.iter().cloned());
    }
    scan
}

/// Arguments that follow `flag` on a command line, up to the next `-`-prefixed token.
///
/// The terminating token is checked against `flag` again, so a repeated flag
/// keeps collecting.
pub fn flag_arguments<'a>(arguments: &'a [String], flag: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut collecting = false;
    for argument in arguments {
        if collecting && !argument.starts_with('-') {
            out.push(argument.as_str());
            continue;
        }
        collecting = argument == flag;
    }
    out
}

/// Index over a v2 path fragment table.
#[derive(Debug)]
pub struct PathFragments<'a> {
    by_id: HashMap<u32, &'a v2::PathFragment>,
}

impl<'a> PathFragments<'a> {
    pub fn new(fragments: &'a [v2::PathFragment]) -> Self {
        Self {
            by_id: fragments.iter().map(|f| (f.id, f)).collect(),
        }
    }

    /// Full `/`-joined path of fragment `id`, root-most label first.
    ///
    /// Returns `None` when the chain references an unknown fragment or loops.
    pub fn path(&self, id: u32) -> Option<String> {
        let mut labels = Vec::new();
        let mut current = id;
        loop {
            let fragment = self.by_id.get(&current)?;
            labels.push(fragment.label.as_str());
            if fragment.parent_id == 0 {
                break;
            }
            if labels.len() > self.by_id.len() {
                return None;
            }
            current = fragment.parent_id;
        }
        labels.reverse();
        Some(labels.join("/"))
    }
}
