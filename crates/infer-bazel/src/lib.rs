//! Bazel classpath discovery from the action graph.
//!
//! Bazel has no "print the classpath" command. Instead this crate asks
//! `bazel aquery --output=proto` for the `Javac` / `JavaSourceJar` actions of
//! every Java rule, decodes the binary `ActionGraphContainer` (both the legacy
//! and the path-fragment schema), and reads jar paths back out of the actions'
//! command lines:
//! - workspace discovery (`WORKSPACE`, `WORKSPACE.bazel`, `MODULE.bazel`)
//! - `java_proto_library` materialisation via `bazel build --nobuild`
//! - classpath (`--classpath`, `--output`) and source jar (`--sources`,
//!   `--source_jars`) extraction

mod aquery;
pub mod proto;
mod workspace;

pub use crate::{
    aquery::{flag_arguments, ActionGraph, AqueryError, PathFragments, OUTPUT_FLAG},
    workspace::{
        aquery_expression, bazel_workspace_root, is_bazel_workspace, BazelWorkspace,
        JAVA_RULE_KINDS, PROTO_RULE_KINDS, WORKSPACE_MARKERS,
    },
};
