use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every failure this library can report.
///
/// Only structural violations of the binary format are surfaced as errors. Damaged optional
/// data (for example a corrupt hot-table header) is treated as absent and never reaches the
/// caller, and unresolvable references are reported as `None` by the resolvers.
///
/// # Examples
///
/// ```rust
/// use dotmeta::{Error, metadata::root::MetadataHeader};
///
/// match MetadataHeader::read(&[0u8; 4], true) {
///     Ok(header) => println!("version {}", header.version),
///     Err(Error::Malformed { message, .. }) => eprintln!("malformed: {}", message),
///     Err(Error::OutOfBounds) => eprintln!("truncated header"),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be parsed.
    ///
    /// The error records the source location where the malformation was detected, the
    /// message names the offending field.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Recursion limit reached while decoding a nested type signature.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The underlying byte source has already been released.
    #[error("The underlying byte source has been disposed")]
    Disposed,

    /// A token refers to a table that is not valid in the requested position.
    #[error("Invalid token for this context - {0}")]
    InvalidToken(Token),

    /// A value could not be encoded into its binary representation.
    #[error("Encoding failed - {0}")]
    Encoding(String),

    /// I/O error raised by a chunk writer.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
