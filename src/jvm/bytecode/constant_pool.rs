//! Wire codec for the entries of a constant pool.

use std::{
    borrow::Cow,
    io::{self, Read, Write},
};

use cesu8::{from_java_cesu8, to_java_cesu8};

use super::{
    ToWriter, ToWriterError,
    reader_utils::{ValueReaderExt, read_byte_chunk},
    write_length,
};
use crate::jvm::{JavaString, class::constant_pool::Constant};

impl Constant {
    /// Parses a single constant, starting at its tag byte.
    pub(crate) fn parse<R>(reader: &mut R) -> io::Result<Self>
    where
        R: Read + ?Sized,
    {
        let tag: u8 = reader.read_value()?;
        match tag {
            1 => Self::parse_utf8(reader),
            3 => Ok(Self::Integer(reader.read_value()?)),
            4 => Ok(Self::Float(reader.read_value()?)),
            5 => Ok(Self::Long(reader.read_value()?)),
            6 => Ok(Self::Double(reader.read_value()?)),
            7 => Ok(Self::Class {
                name_index: reader.read_value()?,
            }),
            8 => Ok(Self::String {
                string_index: reader.read_value()?,
            }),
            9 => Ok(Self::FieldRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            10 => Ok(Self::MethodRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            11 => Ok(Self::InterfaceMethodRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            12 => Ok(Self::NameAndType {
                name_index: reader.read_value()?,
                descriptor_index: reader.read_value()?,
            }),
            15 => Ok(Self::MethodHandle {
                reference_kind: reader.read_value()?,
                reference_index: reader.read_value()?,
            }),
            16 => Ok(Self::MethodType {
                descriptor_index: reader.read_value()?,
            }),
            17 => Ok(Self::Dynamic {
                bootstrap_method_attr_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            18 => Ok(Self::InvokeDynamic {
                bootstrap_method_attr_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            19 => Ok(Self::Module {
                name_index: reader.read_value()?,
            }),
            20 => Ok(Self::Package {
                name_index: reader.read_value()?,
            }),
            unexpected => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unexpected constant pool tag: {unexpected}"),
            )),
        }
    }

    fn parse_utf8<R>(reader: &mut R) -> io::Result<Self>
    where
        R: Read + ?Sized,
    {
        let length: u16 = reader.read_value()?;
        let cesu8_content = read_byte_chunk(reader, usize::from(length))?;
        match from_java_cesu8(cesu8_content.as_slice()) {
            Ok(value) => Ok(Self::Utf8(JavaString::ValidUtf8(value.into_owned()))),
            Err(_) => Ok(Self::Utf8(JavaString::InvalidUtf8(cesu8_content))),
        }
    }
}

impl ToWriter for Constant {
    fn to_writer<W: Write>(&self, writer: &mut W) -> Result<(), ToWriterError> {
        writer.write_all(&[self.tag()])?;
        match self {
            Self::Utf8(payload) => {
                let content: Cow<'_, [u8]> = match payload {
                    JavaString::ValidUtf8(value) => to_java_cesu8(value),
                    JavaString::InvalidUtf8(bytes) => Cow::Borrowed(bytes.as_slice()),
                };
                write_length::<u16>(writer, content.len())?;
                writer.write_all(content.as_ref())?;
            }
            Self::Integer(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Float(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Long(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Double(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Class { name_index }
            | Self::Module { name_index }
            | Self::Package { name_index } => {
                writer.write_all(&name_index.to_be_bytes())?;
            }
            Self::String { string_index } => writer.write_all(&string_index.to_be_bytes())?,
            Self::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Self::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Self::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => {
                writer.write_all(&class_index.to_be_bytes())?;
                writer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Self::NameAndType {
                name_index,
                descriptor_index,
            } => {
                writer.write_all(&name_index.to_be_bytes())?;
                writer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Self::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                writer.write_all(&[*reference_kind])?;
                writer.write_all(&reference_index.to_be_bytes())?;
            }
            Self::MethodType { descriptor_index } => {
                writer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Self::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            }
            | Self::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                writer.write_all(&bootstrap_method_attr_index.to_be_bytes())?;
                writer.write_all(&name_and_type_index.to_be_bytes())?;
            }
        }
        Ok(())
    }
}
