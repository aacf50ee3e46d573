use infer_core::{ArtifactKind, Coordinate};
use std::path::{Path, PathBuf};

/// Path of `coordinate`'s jar inside the Maven home `maven_home` (usually `~/.m2`).
///
/// The group id's dots become directory separators:
/// `<home>/repository/org/foo/bar/baz/1.2.3/baz-1.2.3.jar`.
pub fn maven_jar_path(maven_home: &Path, coordinate: &Coordinate, kind: ArtifactKind) -> PathBuf {
    let mut path = maven_home.join("repository");
    for segment in coordinate.group.split('.') {
        path.push(segment);
    }
    path.join(&coordinate.artifact)
        .join(&coordinate.version)
        .join(coordinate.jar_file_name(kind))
}

/// A local Maven repository rooted at a Maven home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    home: PathBuf,
}

impl MavenRepository {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns the jar for `coordinate` if it has already been downloaded.
    pub fn find_jar(&self, coordinate: &Coordinate, kind: ArtifactKind) -> Option<PathBuf> {
        let jar = maven_jar_path(&self.home, coordinate, kind);
        if jar.is_file() {
            Some(jar)
        } else {
            tracing::debug!(
                target: "infer.maven",
                coordinate = %coordinate,
                path = %jar.display(),
                "jar not present in local maven repository"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_binary_and_sources_paths() {
        let coord = Coordinate::new("org.foo.bar", "baz", "1.2.3");
        let home = Path::new("/home/user/.m2");

        let binary = maven_jar_path(home, &coord, ArtifactKind::Binary);
        assert!(binary.ends_with("org/foo/bar/baz/1.2.3/baz-1.2.3.jar"));
        assert!(binary.starts_with("/home/user/.m2/repository"));

        let sources = maven_jar_path(home, &coord, ArtifactKind::Sources);
        assert!(sources.ends_with("org/foo/bar/baz/1.2.3/baz-1.2.3-sources.jar"));
    }

    #[test]
    fn find_jar_checks_existence() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = MavenRepository::new(tmp.path());
        let coord = Coordinate::new("com.example", "lib", "2.0");

        assert_eq!(repo.find_jar(&coord, ArtifactKind::Binary), None);

        let jar = maven_jar_path(tmp.path(), &coord, ArtifactKind::Binary);
        std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
        std::fs::write(&jar, b"PK").unwrap();

        assert_eq!(repo.find_jar(&coord, ArtifactKind::Binary), Some(jar));
        assert_eq!(repo.find_jar(&coord, ArtifactKind::Sources), None);
    }
}
