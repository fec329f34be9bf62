//! The wire format of the constant pool section of a class file.

pub(super) mod constant_pool;
pub(super) mod errors;
mod reader_utils;

use std::{io::Write, num::TryFromIntError};

pub use errors::ToWriterError;
use num_traits::ToBytes;

/// Trait for writing a raw JVM element to a writer.
pub trait ToWriter {
    /// Writes the raw JVM element to the given writer.
    ///
    /// # Errors
    /// This function will only forward the error returned by the underlying
    /// writer, or report a length that does not fit its wire-format field.
    fn to_writer<W: Write>(&self, writer: &mut W) -> Result<(), ToWriterError>;
}

pub(crate) fn write_length<Len>(writer: &mut impl Write, length: usize) -> Result<(), ToWriterError>
where
    usize: TryInto<Len, Error = TryFromIntError>,
    Len: ToBytes,
{
    let length: Len = length.try_into()?;
    writer.write_all(length.to_be_bytes().as_ref())?;
    Ok(())
}
