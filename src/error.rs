//! The error type shared by the clustering engine, the container builder, and the codec.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while building, encoding, decoding, or expanding a [`Container`].
///
/// No operation in this crate retries. Errors are returned to the immediate caller,
/// and an encode or decode that fails never yields a partial container.
///
/// [`Container`]: crate::Container
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A precondition on the inputs was violated,
    /// e.g., an empty training set, a cluster count of zero,
    /// or a label count that does not divide evenly by the width.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Reading from or writing to the underlying stream failed.
    #[error("{context}: {source}")]
    Io {
        /// The operation that was being performed.
        context: &'static str,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The stream ended inside the named region (the header, the labels, or the palette).
    #[error("unexpected end of stream while reading the {0}")]
    UnexpectedEof(&'static str),
    /// The data is structurally readable but not meaningful,
    /// e.g., a label that points past the end of the palette.
    #[error("corrupt data: {0}")]
    CorruptData(String),
    /// The pixel representation or file format cannot be handled.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Wraps an I/O error with the operation that caused it,
    /// turning a premature end of stream into [`Error::UnexpectedEof`] for the given `region`.
    pub(crate) fn read(source: io::Error, context: &'static str, region: &'static str) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof(region)
        } else {
            Self::Io { context, source }
        }
    }

    /// Wraps an I/O error with the operation that caused it.
    pub(crate) fn io(source: io::Error, context: &'static str) -> Self {
        Self::Io { context, source }
    }
}

/// A [`Result`](std::result::Result) with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premature_end_becomes_unexpected_eof() {
        let err = Error::read(io::ErrorKind::UnexpectedEof.into(), "reading", "header");
        assert!(matches!(err, Error::UnexpectedEof("header")));

        let err = Error::read(io::ErrorKind::InvalidData.into(), "reading", "header");
        assert!(matches!(err, Error::Io { context: "reading", .. }));
    }

    #[test]
    fn io_errors_keep_their_context() {
        let err = Error::io(io::Error::other("disk full"), "writing the labels");
        assert_eq!(err.to_string(), "writing the labels: disk full");
    }
}
