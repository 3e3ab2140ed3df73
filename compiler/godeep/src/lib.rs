//! Command-line front end of the generator.
//!
//! [`Config`] is built from the parsed [`Cli`]; [`run`] loads the package,
//! generates the file and writes it. Nothing is written unless generation
//! succeeds.

mod config;
mod error;
mod output;

pub use config::{invocation, Cli, Config};
pub use error::Error;
pub use output::Output;

use godeep_gen::{generate, GenerateOptions};
use godeep_types::{load_program, FsTree};

/// Load the configured package and generate the file's text.
pub fn generate_source(config: &Config) -> Result<String, Error> {
    // Module discovery walks up from the directory, so it must be absolute.
    // A directory that cannot be resolved is reported by the loader.
    let dir = config
        .package_dir
        .canonicalize()
        .unwrap_or_else(|_| config.package_dir.clone());
    tracing::debug!(dir = %dir.display(), types = config.requests.len(), "generating");
    let program = load_program(&FsTree, &dir)?;
    let options = GenerateOptions {
        shape: config.shape,
        invocation: config.invocation.clone(),
    };
    Ok(generate(&program, &config.requests, &options)?)
}

pub fn run(config: &Config) -> Result<(), Error> {
    let text = generate_source(config)?;
    config.output.write(&text)
}
