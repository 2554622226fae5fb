//! Library error type.
//!
//! Nearly every irregularity in the matcher degrades to "no statement"; what
//! remains here are the cases where a whole request has to be abandoned.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A contract role names a type the workspace does not describe.
    #[error("type role `{0}` does not resolve to a known shape")]
    UnresolvedRole(String),

    #[error("contract `{contract}` expects {expected} type argument(s), found {found}")]
    ContractArity {
        contract: String,
        expected: usize,
        found: usize,
    },

    #[error("method `{0}` does not have a mapping signature")]
    UnsupportedSignature(String),

    #[error("invalid type notation `{text}`: {reason}")]
    TypeSyntax { text: String, reason: String },

    #[error("member name `{0}` is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("expected a JSON object for the {0} record")]
    NotAnObject(&'static str),

    /// JSON failed to deserialize; the message carries the JSON path.
    #[error("{0}")]
    Load(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
