//! Error types for the data-array codec.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::kind::ElementKind;

/// A type name that is not one of the eight canonical element kinds (or an accepted synonym).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown element type '{name}'")]
pub struct UnknownTypeError {
    /// The offending name, as written in the document.
    pub name: String,
}

/// Every failure the codec can report.
///
/// Lenient ascii parsing is *not* represented here: a malformed token silently becomes zero.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The `type` attribute could not be resolved to an [`ElementKind`].
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// A dynamically typed read was requested but the tag carries no `type` attribute.
    #[error("data array has no 'type' attribute")]
    MissingType,

    /// External location declared without a `format`.
    #[error("external data file '{}' has no 'format' attribute", file.display())]
    MissingFormat {
        /// The external file named by the `file` attribute.
        file: PathBuf,
    },

    /// The `format` attribute is neither `ascii` nor `binary`.
    #[error("unknown data format '{0}'")]
    UnknownFormat(String),

    /// The `endian` attribute is neither `big` nor `little`.
    #[error("unknown byte order '{0}'")]
    UnknownEndian(String),

    /// Inline storage was selected but the tag has no text content.
    #[error("inline data array has no text content")]
    MissingInlineText,

    /// An external file could not be opened, read, created or written.
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A binary file holds fewer bytes than `count * byte_width`.
    #[error("'{}' is truncated: expected {expected} bytes, found {actual}", path.display())]
    TruncatedData {
        /// The binary file being read.
        path: PathBuf,
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// Ascii data holds fewer tokens than requested, and strict token counts were asked for.
    #[error("expected {expected} ascii values, found {actual}")]
    TooFewTokens {
        /// Number of values requested.
        expected: usize,
        /// Number of tokens available.
        actual: usize,
    },

    /// Typed access to a [`DynamicArray`](crate::DynamicArray) of another kind.
    #[error("element kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// The kind requested by the caller.
        expected: ElementKind,
        /// The kind actually stored.
        actual: ElementKind,
    },

    /// A byte buffer whose length is not a multiple of the element width.
    #[error("{len} bytes is not a whole number of '{kind}' elements")]
    InvalidLength {
        /// Kind of the elements.
        kind: ElementKind,
        /// Length of the offending buffer.
        len: usize,
    },
}

impl CodecError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CodecError::Io { path: path.into(), source }
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
