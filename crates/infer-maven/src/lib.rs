//! Maven integration: local repository lookups and `mvn dependency:*` resolution.
//!
//! Two independent entry points live here:
//! - [`MavenRepository`] computes where a coordinate's jar would sit in a local
//!   `~/.m2` cache and checks that it exists.
//! - [`MavenBuild`] runs Maven itself against a `pom.xml` and reads the absolute
//!   jar paths it prints.

mod build;
mod repository;

pub use build::{mvn_executable, parse_dependency_line, MavenBuild, MavenConfig, MavenGoal};
pub use repository::{maven_jar_path, MavenRepository};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
