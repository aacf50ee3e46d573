//! One entry point that works out a Java workspace's classpath without knowing
//! its build system up front.
//!
//! Every source of dependencies that applies is consulted and the results are
//! unioned:
//! 1. coordinates listed in the configuration, looked up in the local Maven
//!    and Gradle caches
//! 2. a root `pom.xml`, resolved by Maven
//! 3. a root `build.gradle(.kts)`, translated into a synthetic `pom.xml` and
//!    resolved by Maven
//! 4. an enclosing Bazel workspace, read from its action graph
//!
//! A source that fails is logged and skipped; the others still contribute.

use infer_bazel::{bazel_workspace_root, BazelWorkspace};
use infer_config::ClasspathConfig;
use infer_core::{ArtifactKind, Coordinate};
use infer_gradle::{find_gradle_script, write_synthetic_pom, GradleCache};
use infer_maven::{MavenBuild, MavenConfig, MavenGoal, MavenRepository};
use infer_process::{CommandRunner, DefaultCommandRunner};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone)]
pub struct ClasspathInference {
    root: PathBuf,
    external_dependencies: Vec<String>,
    maven_repository: Option<MavenRepository>,
    gradle_cache: Option<GradleCache>,
    maven: MavenBuild,
    bazel_program: PathBuf,
    synthetic_pom_dir: String,
    runner: Arc<dyn CommandRunner>,
}

impl ClasspathInference {
    pub fn new(root: impl Into<PathBuf>, config: &ClasspathConfig) -> Self {
        let runner = DefaultCommandRunner::with_timeout(config.build.timeout());
        Self::with_runner(root, config, Arc::new(runner))
    }

    pub fn with_runner(
        root: impl Into<PathBuf>,
        config: &ClasspathConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let maven = MavenBuild::with_runner(
            MavenConfig {
                mvn_path: config.build.mvn_path.clone(),
            },
            runner.clone(),
        );
        Self {
            root: root.into(),
            external_dependencies: config.external_dependencies.clone(),
            maven_repository: config.maven_home().map(MavenRepository::new),
            gradle_cache: config.gradle_home().map(GradleCache::new),
            maven,
            bazel_program: config.build.bazel_path.clone(),
            synthetic_pom_dir: config.build.synthetic_pom_dir.clone(),
            runner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Jars needed to compile and run the workspace.
    pub fn class_path(&self) -> BTreeSet<PathBuf> {
        self.resolve(ArtifactKind::Binary)
    }

    /// Source jars of the workspace's dependencies, for documentation lookups.
    pub fn build_doc_path(&self) -> BTreeSet<PathBuf> {
        self.resolve(ArtifactKind::Sources)
    }

    fn resolve(&self, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let mut paths = self.external_jars(kind);
        paths.extend(self.maven_project(kind));
        paths.extend(self.gradle_project(kind));
        paths.extend(self.bazel_project(kind));
        tracing::info!(
            target: "infer.classpath",
            root = %self.root.display(),
            sources = kind.is_sources(),
            count = paths.len(),
            "resolved workspace dependencies"
        );
        paths
    }

    fn external_jars(&self, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let mut jars = BTreeSet::new();
        for raw in &self.external_dependencies {
            let coordinate = match Coordinate::parse(raw) {
                Ok(coordinate) => coordinate,
                Err(err) => {
                    tracing::warn!(
                        target: "infer.classpath",
                        coordinate = %raw,
                        error = %err,
                        "skipping malformed external dependency"
                    );
                    continue;
                }
            };

            let found = self
                .maven_repository
                .as_ref()
                .and_then(|repo| repo.find_jar(&coordinate, kind))
                .or_else(|| {
                    self.gradle_cache
                        .as_ref()
                        .and_then(|cache| cache.find_jar(&coordinate, kind))
                });
            match found {
                Some(jar) => {
                    tracing::debug!(
                        target: "infer.classpath",
                        coordinate = %coordinate,
                        path = %jar.display(),
                        "resolved external dependency"
                    );
                    jars.insert(jar);
                }
                None => tracing::warn!(
                    target: "infer.classpath",
                    coordinate = %coordinate,
                    sources = kind.is_sources(),
                    maven_home = ?self.maven_repository.as_ref().map(|repo| repo.home()),
                    gradle_home = ?self.gradle_cache.as_ref().map(|cache| cache.home()),
                    "external dependency not found in the maven or gradle caches"
                ),
            }
        }
        jars
    }

    fn maven_project(&self, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let pom = self.root.join("pom.xml");
        if !pom.is_file() {
            return BTreeSet::new();
        }
        self.run_maven(&pom, kind)
    }

    fn gradle_project(&self, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let Some(script) = find_gradle_script(&self.root) else {
            return BTreeSet::new();
        };
        match write_synthetic_pom(&self.root, &script, &self.synthetic_pom_dir) {
            Ok(pom) => self.run_maven(&pom, kind),
            Err(err) => {
                tracing::warn!(
                    target: "infer.classpath",
                    script = %script.display(),
                    error = %err,
                    "skipping gradle build"
                );
                BTreeSet::new()
            }
        }
    }

    fn run_maven(&self, pom: &Path, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let goal = match kind {
            ArtifactKind::Binary => MavenGoal::List,
            ArtifactKind::Sources => MavenGoal::Sources,
        };
        self.maven.dependencies(pom, goal).unwrap_or_else(|err| {
            tracing::warn!(
                target: "infer.classpath",
                pom = %pom.display(),
                error = %err,
                "skipping maven build"
            );
            BTreeSet::new()
        })
    }

    fn bazel_project(&self, kind: ArtifactKind) -> BTreeSet<PathBuf> {
        let Some(root) = bazel_workspace_root(&self.root) else {
            return BTreeSet::new();
        };
        let workspace = BazelWorkspace::with_runner(root, self.runner.clone())
            .with_program(&self.bazel_program);
        let result = match kind {
            ArtifactKind::Binary => workspace.classpath(),
            ArtifactKind::Sources => workspace.sourcepath(),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(
                target: "infer.classpath",
                root = %workspace.root().display(),
                error = %format!("{err:#}"),
                "skipping bazel workspace"
            );
            BTreeSet::new()
        })
    }
}
