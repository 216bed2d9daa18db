//! Codec error taxonomy.

use eventgraph_registry::RegistryError;
use eventgraph_types::Path;

/// Errors raised while serializing or deserializing a value tree.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A tagged record was missing a field its `type` requires
    /// (e.g. `date` without `dateValue`).
    #[error("tagged record of type {type_name:?} missing required field {field:?}")]
    MissingField {
        /// The `type` marker of the offending record.
        type_name: String,
        /// The missing field's name.
        field: &'static str,
    },
    /// A tagged record's `type` marker did not match any known wire shape.
    #[error("unknown tagged record type {0:?}")]
    UnknownTag(String),
    /// A reference node's path could not be resolved in either scope.
    #[error("unresolvable reference path: {0}")]
    UnresolvedReference(Path),
    /// The JSON tree was structurally invalid for the node it was meant to
    /// decode as (e.g. `map.entries` not an array of pairs).
    #[error("malformed {node}: {detail}")]
    Malformed {
        /// What kind of node failed to parse.
        node: &'static str,
        /// Why it failed.
        detail: String,
    },
    /// A class-marked record's prototype could not be reattached.
    #[error(transparent)]
    Class(#[from] RegistryError),
}
