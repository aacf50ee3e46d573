use crate::Result;
use infer_process::{
    find_executable_on_path, stdout_if_success, CommandRunner, CommandSpec, DefaultCommandRunner,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Arc, OnceLock};

/// The `maven-dependency-plugin` goal to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MavenGoal {
    /// `dependency:list`, prints the resolved binary jars.
    List,
    /// `dependency:sources`, downloads and prints the `-sources` jars.
    Sources,
}

impl MavenGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            MavenGoal::List => "dependency:list",
            MavenGoal::Sources => "dependency:sources",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MavenConfig {
    /// Explicit Maven executable. When unset, see [`mvn_executable`].
    pub mvn_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MavenBuild {
    config: MavenConfig,
    runner: Arc<dyn CommandRunner>,
}

impl MavenBuild {
    pub fn new(config: MavenConfig) -> Self {
        Self::with_runner(config, Arc::new(DefaultCommandRunner::default()))
    }

    pub fn with_runner(config: MavenConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Resolve every dependency of `pom` (test scope included) to an absolute jar path.
    ///
    /// A non-zero Maven exit yields an empty set. Only failing to launch Maven or
    /// to read its output is an error.
    pub fn dependencies(&self, pom: &Path, goal: MavenGoal) -> Result<BTreeSet<PathBuf>> {
        let command = self.command(pom, goal)?;
        let Some(stdout) = stdout_if_success(self.runner.as_ref(), &command)? else {
            return Ok(BTreeSet::new());
        };

        let stdout = String::from_utf8_lossy(&stdout);
        Ok(stdout.lines().filter_map(parse_dependency_line).collect())
    }

    fn command(&self, pom: &Path, goal: MavenGoal) -> Result<CommandSpec> {
        let pom = std::path::absolute(pom)?;
        let cwd = pom
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let program = self
            .config
            .mvn_path
            .clone()
            .unwrap_or_else(mvn_executable);

        Ok(CommandSpec::new(
            cwd,
            program,
            [
                // Turns off ANSI colouring so the `[INFO]` prefix is stable.
                "--batch-mode",
                "validate",
                goal.as_str(),
                "-DincludeScope=test",
                "-DoutputAbsoluteArtifactFilename=true",
            ],
        ))
    }
}

/// The Maven launcher for this platform.
///
/// Windows ships `mvn.cmd` (or `mvn.bat` on older distributions) which
/// `CreateProcess` will not find from a bare `mvn`, so those are looked up on
/// `PATH` explicitly. Elsewhere `mvn` is left to the OS's `PATH` lookup.
pub fn mvn_executable() -> PathBuf {
    if MAIN_SEPARATOR == '\\' {
        if let Some(found) =
            find_executable_on_path("mvn.cmd").or_else(|| find_executable_on_path("mvn.bat"))
        {
            return found;
        }
    }
    PathBuf::from("mvn")
}

/// Extract the jar path from one line of `dependency:list` / `dependency:sources` output.
///
/// ```text
/// [INFO]    com.google.guava:guava:jar:33.0.0-jre:compile:/home/u/.m2/.../guava-33.0.0-jre.jar -- module com.google.common
/// ```
///
/// The trailing `-- module ...` is only printed by newer plugin versions.
pub fn parse_dependency_line(line: &str) -> Option<PathBuf> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\[INFO\]\s+(.*:.*:.*:.*:.*):(/.*?)( -- module .*)?$").expect("valid regex")
    });

    let caps = re.captures(line.trim_end())?;
    let artifact = caps.get(1)?.as_str();
    let path = caps.get(2)?.as_str();
    tracing::debug!(target: "infer.maven", artifact, path, "resolved maven dependency");
    Some(PathBuf::from(path))
}
