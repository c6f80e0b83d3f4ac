// src/exec/executable.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Description of a program to launch.
///
/// `environment` is a `BTreeMap`, so it iterates in ascending key order and
/// the marshaled `envp` is deterministic. The environment is passed as-is:
/// nothing is inherited from the calling process unless the caller copies it
/// in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Executable {
    /// Path handed to `execve`. No `PATH` lookup is performed.
    pub path: PathBuf,

    /// Arguments following the program name in `argv`.
    pub arguments: Vec<String>,

    /// Complete environment of the child.
    pub environment: BTreeMap<String, String>,
}

impl Executable {
    /// Create a descriptor for `path` with no arguments and an empty
    /// environment.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            arguments: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.environment.insert(k.into(), v.into());
        }
        self
    }

    /// Look up a file called `name` directly inside `directory`.
    ///
    /// Returns a descriptor with empty arguments and environment, or `None`
    /// if the directory cannot be read or holds no entry with that name.
    /// Subdirectories are not searched.
    pub fn find_in(name: &str, directory: impl AsRef<Path>) -> Option<Self> {
        let directory = directory.as_ref();
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = ?directory, error = %e, "cannot read directory while looking up executable");
                return None;
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_name() == name)
            .map(|entry| Self::new(entry.path()))
    }
}
