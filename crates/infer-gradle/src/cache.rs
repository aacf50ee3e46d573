use infer_core::{ArtifactKind, Coordinate};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Depth of `modules-*/files-*/<group>/<artifact>/<version>/<hash>/<file>` below `caches/`.
const CACHE_LAYOUT_DEPTH: usize = 7;

/// The Gradle user home (usually `~/.gradle`) used as a read-only jar cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleCache {
    home: PathBuf,
}

enum Segment<'a> {
    Prefix(&'a str),
    Exact(&'a str),
    Any,
}

impl Segment<'_> {
    fn matches(&self, name: &OsStr) -> bool {
        let Some(name) = name.to_str() else {
            return false;
        };
        match self {
            Segment::Prefix(prefix) => name.starts_with(prefix),
            Segment::Exact(expected) => name == *expected,
            Segment::Any => true,
        }
    }
}

impl GradleCache {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Find `coordinate`'s jar below
    /// `caches/modules-*/files-*/<group>/<artifact>/<version>/*/<file>`.
    ///
    /// The `*` before the file name is a content hash, so the location cannot be
    /// computed up front the way it can for a Maven repository. Directories that
    /// cannot lead to a match are pruned during the walk; when several hash
    /// directories hold the jar the first one in file-name order wins.
    pub fn find_jar(&self, coordinate: &Coordinate, kind: ArtifactKind) -> Option<PathBuf> {
        let base = self.home.join("caches");
        if !base.is_dir() {
            tracing::debug!(
                target: "infer.gradle",
                path = %base.display(),
                "gradle cache directory does not exist"
            );
            return None;
        }

        let file_name = coordinate.jar_file_name(kind);
        let layout = [
            Segment::Prefix("modules-"),
            Segment::Prefix("files-"),
            Segment::Exact(&coordinate.group),
            Segment::Exact(&coordinate.artifact),
            Segment::Exact(&coordinate.version),
            Segment::Any,
            Segment::Exact(&file_name),
        ];

        let found = WalkDir::new(&base)
            .max_depth(CACHE_LAYOUT_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match entry.depth() {
                0 => true,
                depth => layout[depth - 1].matches(entry.file_name()),
            })
            .filter_map(Result::ok)
            .find(|entry| entry.depth() == CACHE_LAYOUT_DEPTH && entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path);

        if found.is_none() {
            tracing::debug!(
                target: "infer.gradle",
                coordinate = %coordinate,
                cache = %base.display(),
                "jar not present in gradle cache"
            );
        }
        found
    }
}
