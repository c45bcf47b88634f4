//! Typed errors for the rendering engine.
//!
//! Handlers return these to the dispatcher, which decides centrally what to
//! do with a failed subtree (it is logged and dropped). None of them abort a
//! whole render.

use thiserror::Error;

use crate::parser::NodeId;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The node is missing structure its handler depends on.
    #[error("malformed <{kind}> node {id}: {reason}")]
    MalformedNode {
        id: NodeId,
        kind: String,
        reason: String,
    },

    /// An override attribute could not be interpreted.
    #[error("invalid value {value:?} for attribute '{name}' on <{kind}>")]
    InvalidAttribute {
        kind: String,
        name: String,
        value: String,
    },
}

/// Errors raised while parsing a style string such as `"bold red on black"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("unknown style token '{0}'")]
    UnknownToken(String),

    #[error("invalid hex color '{0}'")]
    InvalidHex(String),

    #[error("'on' must be followed by a color")]
    MissingBackground,
}
