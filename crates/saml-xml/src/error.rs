//! XML tree errors.

use thiserror::Error;

/// Result type for XML tree operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors raised while reading an XML document into an element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax {
        /// Byte offset reported by the reader.
        position: usize,
        /// Reader diagnostic.
        message: String,
    },

    /// An element or attribute uses a prefix with no namespace in scope.
    #[error("namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),

    /// The document contains no root element.
    #[error("document has no root element")]
    NoRootElement,

    /// Content that is not valid UTF-8.
    #[error("invalid UTF-8 in XML content: {0}")]
    Encoding(String),
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for XmlError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
