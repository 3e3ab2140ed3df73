//! Deep-copy method synthesis for Go types.
//!
//! [`generate`] locates each requested type in the target package, walks
//! it to emit a `DeepCopy` method, and assembles the methods with their
//! imports into one Go file that is parsed back before it is returned.
//!
//! All requested types form the generation set: a type that refers to
//! another requested type (or to itself) calls that type's `DeepCopy`
//! even though it does not exist yet.

mod buffer;
mod capability;
mod emit;
mod error;
mod imports;
mod locate;
mod render;
mod skip;
mod walk;

pub use capability::{capability, Capability, Shape};
pub use emit::{assemble, validate};
pub use error::GenError;
pub use imports::{flatten_path, ImportTable};
pub use locate::locate;
pub use skip::SkipSet;
pub use walk::Session;

use godeep_types::Program;

/// One type to generate a method for.
#[derive(Clone, Debug, Default)]
pub struct CopyRequest {
    pub type_name: String,
    /// Paths below the receiver to leave shallow.
    pub skips: SkipSet,
}

impl CopyRequest {
    pub fn new(type_name: impl Into<String>) -> Self {
        CopyRequest {
            type_name: type_name.into(),
            skips: SkipSet::new(),
        }
    }

    #[must_use]
    pub fn with_skips(mut self, skips: SkipSet) -> Self {
        self.skips = skips;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct GenerateOptions {
    pub shape: Shape,
    /// Command line recorded in the generated header.
    pub invocation: String,
}

/// Generate the file holding a `DeepCopy` method for every request, in
/// request order.
pub fn generate(
    program: &Program,
    requests: &[CopyRequest],
    options: &GenerateOptions,
) -> Result<String, GenError> {
    let generating = requests
        .iter()
        .map(|request| locate(program, &request.type_name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session::new();
    for (request, &ty) in requests.iter().zip(&generating) {
        session.generate_method(program, &generating, options.shape, ty, &request.skips)?;
        for selector in request.skips.unmatched() {
            tracing::warn!(
                ty = %request.type_name,
                selector,
                "skip selector matched no field, element or entry"
            );
        }
    }

    let package = &program.package(program.target()).name;
    let text = assemble(&options.invocation, package, session.imports(), session.methods());
    validate(&text)?;
    tracing::debug!(
        methods = requests.len(),
        imports = session.imports().len(),
        "generated file"
    );
    Ok(text)
}

#[cfg(test)]
mod tests;
