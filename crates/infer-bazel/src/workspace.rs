use crate::aquery::{ActionGraph, OUTPUT_FLAG};
use anyhow::{Context, Result};
use infer_process::{stdout_if_success, CommandRunner, CommandSpec, DefaultCommandRunner};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Files whose presence marks a directory as a Bazel workspace root.
pub const WORKSPACE_MARKERS: [&str; 3] = ["WORKSPACE", "WORKSPACE.bazel", "MODULE.bazel"];

pub const JAVA_RULE_KINDS: [&str; 3] = ["java_library", "java_test", "java_binary"];
pub const PROTO_RULE_KINDS: [&str; 1] = ["proto_library"];

const JAVAC: &str = "Javac";
const JAVA_SOURCE_JAR: &str = "JavaSourceJar";

/// The nearest directory at or above `start` holding one of [`WORKSPACE_MARKERS`].
///
/// `start` may be a file, in which case the search begins at its directory.
pub fn bazel_workspace_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let start = start.as_ref();
    let dir = if start.is_file() { start.parent()? } else { start };
    dir.ancestors()
        .find(|candidate| is_bazel_workspace(candidate))
        .map(Path::to_path_buf)
}

pub fn is_bazel_workspace(dir: &Path) -> bool {
    WORKSPACE_MARKERS
        .into_iter()
        .any(|marker| dir.join(marker).is_file())
}

/// `mnemonic(M, kind(k1, //...) union kind(k2, //...) ...)`
pub fn aquery_expression(mnemonic: &str, kinds: &[&str]) -> String {
    let universe = kinds
        .iter()
        .map(|kind| format!("kind({kind}, //...)"))
        .collect::<Vec<_>>()
        .join(" union ");
    format!("mnemonic({mnemonic}, {universe})")
}

/// A Bazel workspace and the `bazel` executable used to interrogate it.
#[derive(Debug, Clone)]
pub struct BazelWorkspace {
    root: PathBuf,
    program: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl BazelWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_runner(root, Arc::new(DefaultCommandRunner::default()))
    }

    pub fn with_runner(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            program: PathBuf::from("bazel"),
            runner,
        }
    }

    /// Use `program` instead of `bazel` from `PATH` (e.g. a `bazelisk` wrapper).
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute jar paths needed to compile the workspace's Java rules.
    pub fn classpath(&self) -> Result<BTreeSet<PathBuf>> {
        let protos = self.materialize_protos()?;

        let mut jars = self.resolve_against(
            &self.root,
            self.aquery(JAVAC, &JAVA_RULE_KINDS, "--classpath")?,
        );
        if protos {
            jars.extend(self.resolve_against(
                &self.root,
                self.aquery(JAVAC, &PROTO_RULE_KINDS, OUTPUT_FLAG)?,
            ));
        }
        Ok(jars)
    }

    /// Absolute source jar paths for the workspace's Java rules and generated protos.
    pub fn sourcepath(&self) -> Result<BTreeSet<PathBuf>> {
        let protos = self.materialize_protos()?;

        let mut jars = BTreeSet::new();
        match self.output_base()? {
            Some(output_base) => jars.extend(self.resolve_against(
                &output_base,
                self.aquery(JAVA_SOURCE_JAR, &JAVA_RULE_KINDS, "--sources")?,
            )),
            None => tracing::warn!(
                target: "infer.bazel",
                root = %self.root.display(),
                "bazel output_base unavailable; skipping source jars of java rules"
            ),
        }
        if protos {
            jars.extend(self.resolve_against(
                &self.root,
                self.aquery(JAVAC, &PROTO_RULE_KINDS, "--source_jars")?,
            ));
        }
        Ok(jars)
    }

    /// Labels of every `java_proto_library` rule in the workspace.
    pub fn java_proto_targets(&self) -> Result<Vec<String>> {
        let Some(stdout) = self.run(["query", "kind(java_proto_library, //...)"])? else {
            return Ok(Vec::new());
        };
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Run analysis over the `java_proto_library` targets so their generated
    /// actions show up in later `aquery` calls.
    ///
    /// Returns whether there were any targets. A failing dry run still counts:
    /// the later `aquery` runs with `--allow_analysis_failures` and picks up
    /// whatever proto actions did get analysed.
    pub fn materialize_protos(&self) -> Result<bool> {
        let targets = self.java_proto_targets()?;
        if targets.is_empty() {
            return Ok(false);
        }

        tracing::debug!(
            target: "infer.bazel",
            count = targets.len(),
            "materializing java_proto_library targets"
        );
        let count = targets.len();
        let args = ["build".to_string(), "--nobuild".to_string()]
            .into_iter()
            .chain(targets);
        if self.run(args)?.is_none() {
            tracing::warn!(
                target: "infer.bazel",
                count,
                "dry-run build of java_proto_library targets failed; querying proto actions anyway"
            );
        }
        Ok(true)
    }

    /// Paths passed to `flag` by `mnemonic` actions of rules of the given kinds,
    /// relative to wherever Bazel ran that action.
    ///
    /// An unreadable action graph is logged and treated as empty.
    pub fn aquery(&self, mnemonic: &str, kinds: &[&str], flag: &str) -> Result<BTreeSet<String>> {
        let expression = aquery_expression(mnemonic, kinds);
        let Some(stdout) = self.run([
            "aquery",
            "--output=proto",
            "--include_aspects",
            "--allow_analysis_failures",
            expression.as_str(),
        ])?
        else {
            return Ok(BTreeSet::new());
        };

        match ActionGraph::decode(&stdout) {
            Ok(graph) => Ok(graph.select_paths(mnemonic, flag)),
            Err(err) => {
                tracing::warn!(
                    target: "infer.bazel",
                    expression = %expression,
                    error = %err,
                    "failed to parse bazel aquery output"
                );
                Ok(BTreeSet::new())
            }
        }
    }

    /// `bazel info output_base`, or `None` if Bazel could not report it.
    pub fn output_base(&self) -> Result<Option<PathBuf>> {
        let Some(stdout) = self.run(["info", "output_base"])? else {
            return Ok(None);
        };
        let Ok(stdout) = String::from_utf8(stdout) else {
            tracing::warn!(
                target: "infer.bazel",
                root = %self.root.display(),
                "bazel info output_base printed non-UTF-8 output"
            );
            return Ok(None);
        };
        let trimmed = stdout.trim();
        Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
    }

    fn resolve_against(&self, base: &Path, paths: BTreeSet<String>) -> BTreeSet<PathBuf> {
        paths.into_iter().map(|path| base.join(path)).collect()
    }

    fn run(&self, args: impl IntoIterator<Item = impl Into<String>>) -> Result<Option<Vec<u8>>> {
        let command = CommandSpec::new(&self.root, &self.program, args);
        stdout_if_success(self.runner.as_ref(), &command)
            .with_context(|| format!("failed to run `{command}` in {}", self.root.display()))
    }
}
