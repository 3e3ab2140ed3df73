//! Package loading errors.

/// A failure loading the package graph. Terminal for the run.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// Reading, parsing or resolving a package failed. `reason` starts with
    /// `file:line:col` when the failure has a source location.
    #[error("cannot load package {path}: {reason}")]
    PackageLoadFailure { path: String, reason: String },

    /// The directory holds no Go files that take part in the build.
    #[error("no Go files in package {path}")]
    EmptyPackageSet { path: String },
}

impl LoadError {
    #[cold]
    pub(crate) fn failure(path: &str, reason: impl Into<String>) -> Self {
        LoadError::PackageLoadFailure {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}
