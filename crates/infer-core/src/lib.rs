//! Core shared types for classpath inference.
//!
//! This crate is intentionally small: it only knows how to name a dependency
//! (`group:artifact:version[:classifier]`) and which flavour of jar a caller is
//! looking for.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("`{input}` is not a `group:artifact:version` coordinate")]
    TooFewSegments { input: String },

    #[error("`{input}` has an empty segment at position {index}")]
    EmptySegment { input: String, index: usize },

    #[error("`{input}` has more than four `:`-separated segments")]
    TooManySegments { input: String },
}

/// The identity of a single dependency jar.
///
/// Two coordinates are equal only when every field matches exactly; there is
/// no version-range or wildcard handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let segments: Vec<&str> = input.split(':').collect();
        if segments.len() < 3 {
            return Err(CoordinateError::TooFewSegments {
                input: input.to_string(),
            });
        }
        if segments.len() > 4 {
            return Err(CoordinateError::TooManySegments {
                input: input.to_string(),
            });
        }
        if let Some(index) = segments.iter().take(3).position(|s| s.is_empty()) {
            return Err(CoordinateError::EmptySegment {
                input: input.to_string(),
                index,
            });
        }

        Ok(Self {
            group: segments[0].to_string(),
            artifact: segments[1].to_string(),
            version: segments[2].to_string(),
            classifier: segments
                .get(3)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        })
    }

    /// File name of the jar for this coordinate, e.g. `guava-33.0-jre-sources.jar`.
    pub fn jar_file_name(&self, kind: ArtifactKind) -> String {
        match (kind, self.classifier.as_deref()) {
            (ArtifactKind::Sources, _) => {
                format!("{}-{}-sources.jar", self.artifact, self.version)
            }
            (ArtifactKind::Binary, Some(classifier)) => {
                format!("{}-{}-{classifier}.jar", self.artifact, self.version)
            }
            (ArtifactKind::Binary, None) => format!("{}-{}.jar", self.artifact, self.version),
        }
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// Which jar a lookup is after: the compiled classes or the `-sources` jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Binary,
    Sources,
}

impl ArtifactKind {
    pub fn is_sources(self) -> bool {
        matches!(self, ArtifactKind::Sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_segment_coordinate() {
        let coord = Coordinate::parse("com.google.guava:guava:33.0.0-jre").unwrap();
        assert_eq!(coord.group, "com.google.guava");
        assert_eq!(coord.artifact, "guava");
        assert_eq!(coord.version, "33.0.0-jre");
        assert_eq!(coord.classifier, None);
    }

    #[test]
    fn display_round_trips_parsed_segments() {
        for input in [
            "org.foo:bar:1.0",
            "a:b:c",
            "io.netty:netty-transport-native-epoll:4.1.100.Final:linux-x86_64",
        ] {
            let coord: Coordinate = input.parse().unwrap();
            assert_eq!(coord.to_string(), input);
        }
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(matches!(
            Coordinate::parse("org.foo:bar"),
            Err(CoordinateError::TooFewSegments { .. })
        ));
        assert!(matches!(
            Coordinate::parse("org.foo::1.0"),
            Err(CoordinateError::EmptySegment { index: 1, .. })
        ));
        assert!(matches!(
            Coordinate::parse(""),
            Err(CoordinateError::TooFewSegments { .. })
        ));
        assert!(matches!(
            Coordinate::parse("a:b:c:d:e"),
            Err(CoordinateError::TooManySegments { .. })
        ));
    }

    #[test]
    fn does_not_normalize_whitespace_or_case() {
        let coord = Coordinate::parse(" Org.Foo:Bar:1.0").unwrap();
        assert_eq!(coord.group, " Org.Foo");
        assert_eq!(coord.artifact, "Bar");
    }

    #[test]
    fn jar_file_names() {
        let coord = Coordinate::new("org.foo", "baz", "1.2.3");
        assert_eq!(coord.jar_file_name(ArtifactKind::Binary), "baz-1.2.3.jar");
        assert_eq!(
            coord.jar_file_name(ArtifactKind::Sources),
            "baz-1.2.3-sources.jar"
        );

        let classified = coord.with_classifier("tests");
        assert_eq!(
            classified.jar_file_name(ArtifactKind::Binary),
            "baz-1.2.3-tests.jar"
        );
    }
}
