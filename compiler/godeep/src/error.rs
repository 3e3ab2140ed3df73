//! Errors of a command-line run.

use std::io;

use godeep_gen::GenError;
use godeep_types::LoadError;

/// Everything that makes a run exit with status 1.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The arguments do not describe a run.
    #[error("{0}")]
    Config(String),

    #[error("cannot write {target}: {source}")]
    OutputIo {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Gen(#[from] GenError),
}
