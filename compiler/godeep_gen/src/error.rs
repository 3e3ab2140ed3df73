//! Generation errors.

/// A failure generating deep-copy methods. Terminal for the run.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GenError {
    #[error("type {name} not found in package {package}")]
    TypeNotFound { name: String, package: String },

    /// Go does not allow methods on named pointer or interface types.
    #[error("cannot declare DeepCopy on {name}: its underlying type is {kind}")]
    InvalidReceiver { name: String, kind: &'static str },

    /// A named type reached again below itself with no `DeepCopy` to call.
    #[error(
        "type {ty} refers back to itself at {path}; request it with another --type so it is copied through its own DeepCopy"
    )]
    UnsupportedRecursiveType { ty: String, path: String },

    /// The generated text does not parse as Go.
    #[error("generated source does not parse: {error}\nsource:\n{generated}")]
    MalformedOutput { error: String, generated: String },
}
