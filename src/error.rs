//! Error types for the streamflate library.

use std::fmt;

/// Result type alias for streamflate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The output sink rejected a buffer. The failure is sticky: the
    /// compressed stream is truncated and the session cannot continue.
    ///
    /// A fixed-size output buffer running out of space surfaces as this
    /// same error, since a full [`SliceSink`](crate::sink::SliceSink)
    /// rejects the write.
    SinkRejected,
    /// Data was fed (or a second finish attempted) after the stream was
    /// already finished.
    StreamFinished,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SinkRejected => {
                write!(f, "output sink rejected a write; stream is truncated")
            }
            Error::StreamFinished => {
                write!(f, "compressor already finished; no further data accepted")
            }
        }
    }
}

impl std::error::Error for Error {}
