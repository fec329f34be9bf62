//! JVM classes and interfaces.

pub mod constant_pool;

use crate::macros::see_jvm_spec;

/// A JVM constant pool.
///
/// The pool is an ordered table of reference-counted entries. Indices are
/// stable for the lifetime of the pool: entries are appended, interned, or
/// blanked in place, never moved or removed, so the indices embedded in the
/// rest of the class file stay valid across rewrites.
#[doc = see_jvm_spec!(4, 4)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    inner: Vec<constant_pool::Slot>,
}
