//! Gradle support without running Gradle.
//!
//! - [`GradleCache`] finds already-downloaded jars in `~/.gradle/caches`.
//! - [`GradleScript`] pulls `implementation` / `testImplementation` coordinates
//!   out of a build script with a couple of regexes, and [`write_synthetic_pom`]
//!   turns them into a `pom.xml` that Maven can resolve on Gradle's behalf.

mod cache;
mod pom;
mod script;

pub use cache::GradleCache;
pub use pom::{
    find_gradle_script, render_synthetic_pom, write_synthetic_pom, DEFAULT_SYNTHETIC_POM_DIR,
    LOMBOK_VERSION,
};
pub use script::{GradleScript, SyntheticDependency};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradleError {
    #[error("failed to read gradle build script `{}`: {source}", path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write synthetic pom `{}`: {source}", path.display())]
    WritePom {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GradleError>;
