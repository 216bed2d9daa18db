//! Configuration-class errors for the class registry.

/// Errors raised while registering or consulting the class registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A class name was registered twice.
    #[error("class {0:?} is already registered")]
    DuplicateClass(String),
    /// A serialized record carried a class marker this registry has no
    /// factory for.
    #[error("unknown class {0:?}")]
    UnknownClass(String),
}
