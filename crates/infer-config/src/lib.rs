//! Workspace configuration (`.infer.toml`) and tracing setup.

use serde::{Deserialize, Serialize};
use std::{
    env,
    ffi::OsString,
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::{Mutex, Once},
    time::Duration,
};
use thiserror::Error;
use tracing_subscriber::{prelude::*, EnvFilter};

/// File name looked up at the workspace root by [`ClasspathConfig::discover`].
pub const CONFIG_FILE_NAME: &str = ".infer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClasspathConfig {
    /// `group:artifact:version[:classifier]` coordinates resolved straight
    /// from the local Maven/Gradle caches.
    pub external_dependencies: Vec<String>,

    /// Maven user home (the directory holding `repository/`).
    pub maven_home: Option<PathBuf>,

    /// Gradle user home (the directory holding `caches/`).
    pub gradle_home: Option<PathBuf>,

    pub build: BuildConfig,

    pub logging: LoggingConfig,
}

impl ClasspathConfig {
    /// Load a config file from TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.message().to_string(),
        })
    }

    /// Load `<root>/.infer.toml`, or the defaults when there is no such file.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(target: "infer.config", path = %path.display(), "loading config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The configured Maven home, else `~/.m2`.
    pub fn maven_home(&self) -> Option<PathBuf> {
        self.maven_home
            .clone()
            .or_else(|| home_dir().map(|home| home.join(".m2")))
    }

    /// The configured Gradle home, else `$GRADLE_USER_HOME`, else `~/.gradle`.
    pub fn gradle_home(&self) -> Option<PathBuf> {
        self.gradle_home
            .clone()
            .or_else(|| default_gradle_home(env::var_os("GRADLE_USER_HOME"), home_dir()))
    }
}

/// Build tool invocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Maven executable; `mvn` (`mvn.cmd` on Windows) from `PATH` when unset.
    pub mvn_path: Option<PathBuf>,

    /// Bazel executable (or a wrapper such as `bazelisk`).
    pub bazel_path: PathBuf,

    /// Kill a build tool that has not exited after this many seconds.
    pub timeout_secs: Option<u64>,

    /// Directory, relative to the workspace root, receiving the Maven
    /// descriptor generated for Gradle projects.
    pub synthetic_pom_dir: String,
}

impl BuildConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mvn_path: None,
            bazel_path: PathBuf::from("bazel"),
            timeout_secs: None,
            synthetic_pom_dir: ".jls".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    pub level: String,

    /// Emit logs in JSON format.
    pub json: bool,

    /// Also append logs to this file. Ignored if it cannot be opened.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// `level` as `EnvFilter` directives.
    ///
    /// Bare level names are case-insensitive and `warning` means `warn`.
    /// Anything else (`infer.bazel=debug,warn`, ...) passes through unchanged.
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        let lower = level.to_ascii_lowercase();
        match lower.as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            "trace" | "debug" | "info" | "warn" | "error" => lower.clone(),
            _ => level.to_owned(),
        }
    }

    /// Filter installed by [`init_tracing`]: [`LoggingConfig::directives`]
    /// followed by `RUST_LOG`, so `RUST_LOG` wins where both name a target.
    ///
    /// Unparseable input falls back to the configured level alone, then to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let combined = match env::var("RUST_LOG") {
            Ok(rust_log) if !rust_log.trim().is_empty() => {
                format!("{configured},{}", rust_log.trim())
            }
            _ => configured.clone(),
        };
        EnvFilter::try_new(combined)
            .or_else(|_| EnvFilter::try_new(configured))
            .unwrap_or_else(|_| EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr (stdout carries command results) and, optionally, to
/// `config.file`. Only the first call has any effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config.file.as_ref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_open_failed = config.file.is_some() && file.is_none();
        let file_layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
        });

        let stderr_layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer);
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        if file_open_failed {
            if let Some(path) = config.file.as_ref() {
                tracing::warn!(
                    target: "infer.config",
                    path = %path.display(),
                    "failed to open log file; logging to stderr only"
                );
            }
        }
    });
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn default_gradle_home(
    gradle_user_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    gradle_user_home
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| home.join(".gradle")))
}
