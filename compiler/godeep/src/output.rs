//! Where the generated file goes.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `-` and the empty string mean standard output.
    pub fn parse(arg: &str) -> Self {
        match arg {
            "" | "-" => Output::Stdout,
            path => Output::File(PathBuf::from(path)),
        }
    }

    /// Write `text` in one go, replacing any previous contents.
    pub fn write(&self, text: &str) -> Result<(), Error> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|source| Error::OutputIo {
                        target: "standard output".to_owned(),
                        source,
                    })
            }
            Output::File(path) => {
                std::fs::write(path, text).map_err(|source| Error::OutputIo {
                    target: path.display().to_string(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), bytes = text.len(), "wrote output");
                Ok(())
            }
        }
    }
}
