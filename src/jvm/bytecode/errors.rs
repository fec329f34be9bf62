use std::{io, num::TryFromIntError};

/// An error when writing a JVM element to a writer.
#[derive(Debug, thiserror::Error)]
pub enum ToWriterError {
    /// Forwarded from the underlying writer.
    #[error(transparent)]
    IO(#[from] io::Error),
    /// A length does not fit the range of its wire-format field.
    #[error("Length exceeds the range of the length field")]
    TooLong(#[from] TryFromIntError),
}
