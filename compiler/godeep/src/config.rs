//! Command-line arguments and the run they describe.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use godeep_gen::{CopyRequest, Shape, SkipSet};

use crate::{Error, Output};

#[derive(Debug, Parser)]
#[command(name = "godeep", version, about = "Generate DeepCopy methods for Go types")]
pub struct Cli {
    /// Type to generate a DeepCopy method for; repeat for several types
    #[arg(short = 't', long = "type", value_name = "NAME")]
    pub types: Vec<String>,

    /// Comma-separated field, element ([i]) or entry ([k]) selectors to
    /// copy shallowly; the Nth --skip applies to the Nth --type
    #[arg(long = "skip", value_name = "SELECTORS")]
    pub skips: Vec<String>,

    /// Generate `func (o *T) DeepCopy() *T` instead of value receivers
    #[arg(long)]
    pub pointer_receiver: bool,

    /// File to write, or - for standard output
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    pub output: String,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory of the Go package declaring the types
    #[arg(value_name = "PACKAGE_DIR")]
    pub package_dir: PathBuf,
}

/// A validated run.
#[derive(Clone, Debug)]
pub struct Config {
    pub requests: Vec<CopyRequest>,
    pub shape: Shape,
    pub output: Output,
    pub package_dir: PathBuf,
    /// Command line recorded in the generated header.
    pub invocation: String,
}

impl Config {
    pub fn from_cli(cli: Cli, invocation: String) -> Result<Self, Error> {
        if cli.types.first().is_none_or(String::is_empty) {
            return Err(Error::Config("no type given".to_owned()));
        }
        if cli.skips.len() > cli.types.len() {
            tracing::warn!(
                types = cli.types.len(),
                skips = cli.skips.len(),
                "more --skip flags than --type flags; the extra ones are ignored"
            );
        }

        let mut skips = cli.skips.iter();
        let requests = cli
            .types
            .into_iter()
            .map(|name| {
                let request = CopyRequest::new(name);
                match skips.next() {
                    Some(list) => request.with_skips(SkipSet::parse(list)),
                    None => request,
                }
            })
            .collect();

        Ok(Config {
            requests,
            shape: Shape::from_pointer(cli.pointer_receiver),
            output: Output::parse(&cli.output),
            package_dir: cli.package_dir,
            invocation,
        })
    }
}

/// The header's record of a command line: the program's file name followed
/// by its arguments.
pub fn invocation<S: AsRef<str>>(args: &[S]) -> String {
    let mut parts = args.iter().map(AsRef::as_ref);
    let program = parts.next().map_or("godeep", |arg0| {
        Path::new(arg0)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(arg0)
    });
    let mut line = program.to_owned();
    for arg in parts {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
