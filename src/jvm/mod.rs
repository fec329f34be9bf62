//! Module containing the APIs for the JVM elements.

use std::fmt::{self, Display};

use itertools::Itertools;

pub mod bytecode;
pub mod class;

/// A string stored in a class file.
///
/// Class files encode strings in Modified UTF-8 (a variant of CESU-8).
/// Payloads that do not decode are kept byte-exact so that a rewritten
/// class file can carry them through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum JavaString {
    /// A payload that decoded cleanly.
    ValidUtf8(String),
    /// The raw bytes of a payload that is not valid Modified UTF-8.
    InvalidUtf8(Vec<u8>),
}

impl From<&str> for JavaString {
    fn from(value: &str) -> Self {
        Self::ValidUtf8(value.to_owned())
    }
}

impl Display for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidUtf8(value) => write!(f, "\"{value}\""),
            Self::InvalidUtf8(bytes) => write!(
                f,
                "[{}] // Invalid UTF-8",
                bytes.iter().map(|it| format!("0x{it:02X}")).join(" ")
            ),
        }
    }
}
