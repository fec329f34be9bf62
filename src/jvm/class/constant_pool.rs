//! Constant pool in a JVM class file.

use std::io::{self, Read};

use crate::{
    jvm::{
        JavaString,
        bytecode::{ToWriter, ToWriterError, write_length},
        class::ConstantPool,
    },
    macros::see_jvm_spec,
    utils::enum_discriminant,
};

/// A slot of the pool table.
///
/// A `Padding` slot is unoccupied but still takes up an index: the reserved
/// slot 0, the slot following a `Long` or `Double`, and any absent slot a
/// legacy class file references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Slot {
    Entry(Entry),
    Padding,
}

/// An entry of the [`ConstantPool`]: a [`Constant`] together with the number
/// of direct references the owning class file holds to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    constant: Constant,
    ref_count: u32,
}

impl Entry {
    /// Creates an entry with a reference count of zero.
    #[must_use]
    pub const fn new(constant: Constant) -> Self {
        Self {
            constant,
            ref_count: 0,
        }
    }

    /// Sets the initial reference count.
    #[must_use]
    pub const fn with_ref_count(mut self, ref_count: u32) -> Self {
        self.ref_count = ref_count;
        self
    }

    /// Gets the constant stored in this entry.
    #[must_use]
    pub const fn constant(&self) -> &Constant {
        &self.constant
    }

    /// Gets the number of direct references to this entry, as established by
    /// the last [`ConstantPool::recompute_ref_counts`] and adjusted since.
    #[must_use]
    pub const fn ref_count(&self) -> u32 {
        self.ref_count
    }

    fn blank(&mut self) {
        self.constant = Constant::Utf8(JavaString::ValidUtf8(String::new()));
    }
}

/// The owner of a [`ConstantPool`], typically the enclosing class file.
///
/// The pool cannot see which of the owner's fields, methods, and attributes
/// point into it; during [`ConstantPool::recompute_ref_counts`] the owner
/// reports them through these hooks, calling
/// [`ConstantPool::inc_ref_count`] once per direct reference it holds.
pub trait ReferenceSource {
    /// Reports every direct reference to a [`Constant::Utf8`] entry.
    fn mark_utf8_refs(&self, pool: &mut ConstantPool);

    /// Reports every direct reference to a [`Constant::NameAndType`] entry.
    fn mark_name_and_type_refs(&self, pool: &mut ConstantPool);
}

impl ConstantPool {
    /// Creates a new constant pool containing only the reserved slot 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: vec![Slot::Padding],
        }
    }

    /// Creates a new constant pool with the given capacity.
    /// # Parameters
    /// - `count`: the maximum index of entries in the constant pool plus one.
    #[must_use]
    pub fn with_capacity(count: u16) -> Self {
        // The `constant_pool` table is indexed from `1` to `constant_pool_count - 1`.
        let mut inner = Vec::with_capacity(usize::from(count) + 1);
        inner.push(Slot::Padding);
        Self { inner }
    }

    /// Builds a constant pool from a pre-parsed sequence of entries.
    ///
    /// Slot `i` of the pool holds the `i`-th element of `entries`; a `None`
    /// marks an unoccupied slot (the reserved slot 0, or the slot following
    /// an 8-byte constant). Order and indices are preserved exactly, and the
    /// contents are taken as-is.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Option<Entry>>,
    {
        let inner = entries
            .into_iter()
            .map(|it| it.map_or(Slot::Padding, Slot::Entry))
            .collect();
        Self { inner }
    }

    /// Parses the constant pool section of a class file.
    /// - `constant_pool_count` is the maximum index of entries in the
    ///   constant pool plus one.
    ///
    /// Every parsed entry starts with a reference count of zero;
    /// [`Self::recompute_ref_counts`] establishes the real counts.
    #[doc = see_jvm_spec!(4, 1)]
    /// # Errors
    /// Propagates the reader's errors; a malformed entry maps to
    /// [`io::ErrorKind::InvalidData`].
    pub fn from_reader<R>(reader: &mut R, constant_pool_count: u16) -> io::Result<Self>
    where
        R: Read + ?Sized,
    {
        let mut constant_pool = Self::with_capacity(constant_pool_count);
        while constant_pool.inner.len() < usize::from(constant_pool_count) {
            // NOTE: Do not use `intern_utf8` here since it would deduplicate.
            let entry = Entry::new(Constant::parse(reader)?);
            if matches!(entry.constant, Constant::Long(_) | Constant::Double(_)) {
                constant_pool.inner.push(Slot::Entry(entry));
                constant_pool.inner.push(Slot::Padding);
            } else {
                constant_pool.inner.push(Slot::Entry(entry));
            }
        }
        Ok(constant_pool)
    }

    /// Gets the count of the constant pool.
    ///
    /// This is the number of slots, not the number of entries; it is the
    /// value serialized as `constant_pool_count`.
    #[doc = see_jvm_spec!(4, 1)]
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Every operation that grows the pool checks that the slot \
                  count stays within the bounds of u16, so the cast is safe."
    )]
    pub fn count(&self) -> u16 {
        self.inner.len() as u16
    }

    /// Gets the constant pool entry at the given index.
    /// # Errors
    /// - [`Error::BadIndex`] if `index` does not point to an occupied slot.
    pub fn get_entry(&self, index: u16) -> Result<&Entry, Error> {
        match self.inner.get(usize::from(index)) {
            Some(Slot::Entry(entry)) => Ok(entry),
            _ => Err(Error::BadIndex(index)),
        }
    }

    /// Iterates over the occupied slots of the pool in index order.
    ///
    /// The iterator borrows the live table rather than a snapshot of it.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &Entry)> {
        self.inner
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Every operation that grows the pool checks that \
                              the slot count stays within the bounds of u16, \
                              so the cast is safe."
                )]
                Slot::Entry(entry) => Some((index as u16, entry)),
                Slot::Padding => None,
            })
    }

    /// Finds the first entry that satisfies the given predicate.
    pub fn find<P>(&self, predicate: P) -> Option<(u16, &Entry)>
    where
        P: Fn(&Entry) -> bool,
    {
        self.entries().find(|(_, entry)| predicate(entry))
    }

    pub(crate) fn find_index<P>(&self, predicate: P) -> Option<u16>
    where
        P: Fn(&Entry) -> bool,
    {
        self.find(predicate).map(|(index, _)| index)
    }

    /// Increments the reference count of the entry at the given index.
    ///
    /// An index that does not refer to an occupied slot is ignored: class
    /// files emitted by some older compilers reference such slots, and the
    /// pool keeps accepting them.
    pub fn inc_ref_count(&mut self, index: u16) {
        if let Some(Slot::Entry(entry)) = self.inner.get_mut(usize::from(index)) {
            entry.ref_count += 1;
        }
    }

    /// Decrements the reference count of the entry at the given index.
    ///
    /// Unoccupied slots are ignored, like in [`Self::inc_ref_count`], and
    /// counts never go below zero. Reaching zero does not blank the entry;
    /// counts legitimately pass through zero while a rewrite is in flight,
    /// so blanking is deferred to [`Self::recompute_ref_counts`].
    pub fn dec_ref_count(&mut self, index: u16) {
        if let Some(Slot::Entry(entry)) = self.inner.get_mut(usize::from(index)) {
            entry.ref_count = entry.ref_count.saturating_sub(1);
        }
    }

    /// Rebuilds every reference count from the references `source` reports.
    ///
    /// Runs in two phases: first every count is reset to zero, then `source`
    /// reports its references through [`ReferenceSource::mark_utf8_refs`]
    /// and [`ReferenceSource::mark_name_and_type_refs`], each invoked
    /// exactly once. Afterwards every `Utf8` entry left with a count of zero
    /// has its payload blanked; the slot itself is kept, so existing indices
    /// stay valid and [`Self::intern_utf8`] can reuse it.
    ///
    /// Invoking this twice with the same `source` yields the same counts and
    /// the same blanked slots.
    pub fn recompute_ref_counts<S>(&mut self, source: &S)
    where
        S: ReferenceSource + ?Sized,
    {
        for entry in self.entries_mut() {
            entry.ref_count = 0;
        }
        source.mark_utf8_refs(self);
        source.mark_name_and_type_refs(self);
        for entry in self.entries_mut() {
            if entry.ref_count == 0 && matches!(entry.constant, Constant::Utf8(_)) {
                entry.blank();
            }
        }
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.inner.iter_mut().filter_map(|slot| match slot {
            Slot::Entry(entry) => Some(entry),
            Slot::Padding => None,
        })
    }

    /// Appends an entry to the end of the pool and returns its index.
    ///
    /// A `Long` or `Double` occupies two slots; the extra slot stays
    /// unoccupied. Indices are never reused by this method, and the entry is
    /// stored even if an equal one already exists — deduplication is the
    /// business of [`Self::intern_utf8`].
    /// # Errors
    /// - [`Error::Overflow`] if the constant pool is full.
    pub fn push_entry(&mut self, entry: Entry) -> Result<u16, Error> {
        let width = match entry.constant {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        };
        if self.inner.len() + width > usize::from(u16::MAX) {
            return Err(Error::Overflow);
        }
        let new_index = self.count();
        self.inner.push(Slot::Entry(entry));
        if width == 2 {
            self.inner.push(Slot::Padding);
        }
        Ok(new_index)
    }

    /// Interns a string, returning the index of a `Utf8` entry holding it.
    ///
    /// Resolution order:
    /// 1. an occupied `Utf8` slot whose payload equals `s` — its reference
    ///    count is incremented;
    /// 2. a `Utf8` slot whose reference count is zero — its payload is
    ///    overwritten and its count becomes one;
    /// 3. a fresh entry appended with a count of one.
    ///
    /// Matching an existing payload wins over reusing a dead slot, which in
    /// turn wins over growing the pool. Both scans are linear in the pool
    /// length.
    /// # Errors
    /// - [`Error::Overflow`] if a fresh entry is needed and the pool is full.
    pub fn intern_utf8(&mut self, s: &str) -> Result<u16, Error> {
        if let Some(index) = self.find_index(|entry| {
            matches!(entry.constant(), Constant::Utf8(JavaString::ValidUtf8(payload)) if payload == s)
        }) {
            self.inc_ref_count(index);
            return Ok(index);
        }
        let reusable = self
            .inner
            .iter_mut()
            .enumerate()
            .find_map(|(index, slot)| match slot {
                Slot::Entry(entry)
                    if entry.ref_count == 0 && matches!(entry.constant, Constant::Utf8(_)) =>
                {
                    Some((index, entry))
                }
                _ => None,
            });
        if let Some((index, entry)) = reusable {
            entry.constant = Constant::Utf8(JavaString::ValidUtf8(s.to_owned()));
            entry.ref_count = 1;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Every operation that grows the pool checks that the \
                          slot count stays within the bounds of u16, so the \
                          cast is safe."
            )]
            return Ok(index as u16);
        }
        let index = self.push_entry(Entry::new(Constant::Utf8(JavaString::ValidUtf8(
            s.to_owned(),
        ))))?;
        self.inc_ref_count(index);
        Ok(index)
    }

    /// Replaces a reference to the `Utf8` entry at `old_index` with one to a
    /// `Utf8` entry holding `new_string`, returning the new index.
    ///
    /// The old entry is not rewritten in place — other parts of the class
    /// file may still reference the old payload until they are remapped in
    /// turn. Its count is decremented, and the next
    /// [`Self::recompute_ref_counts`] reclaims it if nothing else holds on.
    /// # Errors
    /// - [`Error::Overflow`] if interning `new_string` needs a fresh entry
    ///   and the pool is full.
    pub fn remap_utf8(&mut self, old_index: u16, new_string: &str) -> Result<u16, Error> {
        self.dec_ref_count(old_index);
        self.intern_utf8(new_string)
    }
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ToWriter for ConstantPool {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<(), ToWriterError> {
        write_length::<u16>(writer, self.inner.len())?;
        for slot in &self.inner {
            slot.to_writer(writer)?;
        }
        Ok(())
    }
}

impl ToWriter for Slot {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<(), ToWriterError> {
        if let Self::Entry(entry) = self {
            entry.constant.to_writer(writer)?;
        }
        Ok(())
    }
}

/// An error raised by the index-checked operations of the [`ConstantPool`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The index used to access the constant pool is invalid.
    #[error("Bad constant pool index: {0}")]
    BadIndex(u16),
    /// The constant pool is full.
    #[error("The constant pool is full")]
    Overflow,
}

/// A constant stored in an [`Entry`] of the [`ConstantPool`].
///
/// The discriminants are the tag values of the class file format.
#[derive(Debug, Clone, PartialEq)]
#[repr(u8)]
#[non_exhaustive]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Constant {
    /// A UTF-8 string.
    #[doc = see_jvm_spec!(4, 4, 7)]
    Utf8(JavaString) = 1,
    /// An integer.
    Integer(i32) = 3,
    /// A float.
    Float(f32) = 4,
    /// A long. Occupies two slots of the pool.
    Long(i64) = 5,
    /// A double. Occupies two slots of the pool.
    Double(f64) = 6,
    /// A class.
    #[doc = see_jvm_spec!(4, 4, 1)]
    Class {
        /// The index of the [`Constant::Utf8`] holding its binary name.
        name_index: u16,
    } = 7,
    /// A string literal.
    String {
        /// The index of the [`Constant::Utf8`] holding its value.
        string_index: u16,
    } = 8,
    /// A field reference.
    #[doc = see_jvm_spec!(4, 4, 2)]
    FieldRef {
        /// The index of the [`Constant::Class`] containing the field.
        class_index: u16,
        /// The index of the [`Constant::NameAndType`] of the field.
        name_and_type_index: u16,
    } = 9,
    /// A method reference.
    #[doc = see_jvm_spec!(4, 4, 2)]
    MethodRef {
        /// The index of the [`Constant::Class`] containing the method.
        class_index: u16,
        /// The index of the [`Constant::NameAndType`] of the method.
        name_and_type_index: u16,
    } = 10,
    /// An interface method reference.
    InterfaceMethodRef {
        /// The index of the [`Constant::Class`] of the interface.
        class_index: u16,
        /// The index of the [`Constant::NameAndType`] of the method.
        name_and_type_index: u16,
    } = 11,
    /// A name and a descriptor.
    #[doc = see_jvm_spec!(4, 4, 6)]
    NameAndType {
        /// The index of the [`Constant::Utf8`] holding the name.
        name_index: u16,
        /// The index of the [`Constant::Utf8`] holding the descriptor.
        descriptor_index: u16,
    } = 12,
    /// A method handle.
    #[doc = see_jvm_spec!(4, 4, 8)]
    MethodHandle {
        /// The kind of the method handle.
        reference_kind: u8,
        /// The index of the [`Constant::FieldRef`], [`Constant::MethodRef`],
        /// or [`Constant::InterfaceMethodRef`] it stands for.
        reference_index: u16,
    } = 15,
    /// A method type.
    MethodType {
        /// The index of the [`Constant::Utf8`] holding the descriptor.
        descriptor_index: u16,
    } = 16,
    /// A dynamically computed constant.
    #[doc = see_jvm_spec!(4, 4, 10)]
    Dynamic {
        /// The index of the bootstrap method in the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// The index of the [`Constant::NameAndType`] of the constant.
        name_and_type_index: u16,
    } = 17,
    /// An `invokedynamic` call site.
    #[doc = see_jvm_spec!(4, 4, 10)]
    InvokeDynamic {
        /// The index of the bootstrap method in the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// The index of the [`Constant::NameAndType`] of the call site.
        name_and_type_index: u16,
    } = 18,
    /// A module.
    Module {
        /// The index of the [`Constant::Utf8`] holding the name.
        name_index: u16,
    } = 19,
    /// A package.
    Package {
        /// The index of the [`Constant::Utf8`] holding the name.
        name_index: u16,
    } = 20,
}

impl Eq for Constant {}

impl Constant {
    /// Returns the tag of this constant.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        // SAFETY: Self is marked as repr(u8)
        unsafe { enum_discriminant(self) }
    }

    /// Gets the kind of this constant.
    #[must_use]
    pub const fn constant_kind<'a>(&self) -> &'a str {
        match self {
            Self::Utf8(_) => "CONSTANT_Utf8",
            Self::Integer(_) => "CONSTANT_Integer",
            Self::Float(_) => "CONSTANT_Float",
            Self::Long(_) => "CONSTANT_Long",
            Self::Double(_) => "CONSTANT_Double",
            Self::Class { .. } => "CONSTANT_Class",
            Self::String { .. } => "CONSTANT_String",
            Self::FieldRef { .. } => "CONSTANT_Fieldref",
            Self::MethodRef { .. } => "CONSTANT_Methodref",
            Self::InterfaceMethodRef { .. } => "CONSTANT_InterfaceMethodref",
            Self::NameAndType { .. } => "CONSTANT_NameAndType",
            Self::MethodHandle { .. } => "CONSTANT_MethodHandle",
            Self::MethodType { .. } => "CONSTANT_MethodType",
            Self::Dynamic { .. } => "CONSTANT_Dynamic",
            Self::InvokeDynamic { .. } => "CONSTANT_InvokeDynamic",
            Self::Module { .. } => "CONSTANT_Module",
            Self::Package { .. } => "CONSTANT_Package",
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::jvm::bytecode::constant_pool::tests::arb_constant_pool_bytes;

    fn utf8(s: &str) -> Constant {
        Constant::Utf8(JavaString::ValidUtf8(s.to_owned()))
    }

    fn payload(pool: &ConstantPool, index: u16) -> &str {
        match pool.get_entry(index).unwrap().constant() {
            Constant::Utf8(JavaString::ValidUtf8(value)) => value,
            unexpected => panic!("Expected a Utf8 entry, got {unexpected:?}"),
        }
    }

    struct NoRefs;

    impl ReferenceSource for NoRefs {
        fn mark_utf8_refs(&self, _pool: &mut ConstantPool) {}
        fn mark_name_and_type_refs(&self, _pool: &mut ConstantPool) {}
    }

    /// Reports a fixed set of references, the way a class file reports the
    /// indices embedded in its own structures.
    struct FixedRefs {
        utf8: Vec<u16>,
        name_and_type: Vec<u16>,
    }

    impl ReferenceSource for FixedRefs {
        fn mark_utf8_refs(&self, pool: &mut ConstantPool) {
            for &index in &self.utf8 {
                pool.inc_ref_count(index);
            }
        }

        fn mark_name_and_type_refs(&self, pool: &mut ConstantPool) {
            for &index in &self.name_and_type {
                pool.inc_ref_count(index);
            }
        }
    }

    #[test]
    fn from_entries_preserves_order_and_indices() {
        let pool = ConstantPool::from_entries([
            None,
            Some(Entry::new(utf8("alpha"))),
            Some(Entry::new(Constant::Class { name_index: 1 })),
            Some(Entry::new(Constant::Long(42)).with_ref_count(3)),
            None,
        ]);
        assert_eq!(pool.count(), 5);
        assert_eq!(payload(&pool, 1), "alpha");
        assert_eq!(
            pool.get_entry(2).unwrap().constant(),
            &Constant::Class { name_index: 1 }
        );
        assert_eq!(pool.get_entry(3).unwrap().ref_count(), 3);
        assert!(matches!(pool.get_entry(4), Err(Error::BadIndex(4))));
    }

    #[test]
    fn get_entry_fails_past_the_end() {
        let pool = ConstantPool::from_entries([Some(Entry::new(utf8("alpha")))]);
        assert!(matches!(
            pool.get_entry(pool.count()),
            Err(Error::BadIndex(1))
        ));
        assert!(matches!(pool.get_entry(u16::MAX), Err(Error::BadIndex(_))));
    }

    #[test]
    fn ref_count_ops_tolerate_unoccupied_slots() {
        let mut pool = ConstantPool::new();
        let index = pool.push_entry(Entry::new(utf8("alpha"))).unwrap();

        // Slot 0 is reserved and index 100 is past the end; class files
        // referencing such slots are still processed.
        pool.inc_ref_count(0);
        pool.dec_ref_count(0);
        pool.inc_ref_count(100);
        pool.dec_ref_count(100);

        pool.inc_ref_count(index);
        assert_eq!(pool.get_entry(index).unwrap().ref_count(), 1);
    }

    #[test]
    fn dec_ref_count_saturates_at_zero() {
        let mut pool = ConstantPool::from_entries([Some(Entry::new(utf8("alpha")))]);
        pool.dec_ref_count(0);
        pool.dec_ref_count(0);
        assert_eq!(pool.get_entry(0).unwrap().ref_count(), 0);
    }

    #[test]
    fn recount_zeroes_unreferenced_entries_and_blanks_utf8() {
        let mut pool = ConstantPool::from_entries([
            Some(Entry::new(utf8("kept")).with_ref_count(7)),
            Some(Entry::new(utf8("dropped")).with_ref_count(7)),
            Some(Entry::new(Constant::Integer(13)).with_ref_count(7)),
        ]);
        pool.recompute_ref_counts(&FixedRefs {
            utf8: vec![0, 0],
            name_and_type: vec![],
        });

        assert_eq!(pool.get_entry(0).unwrap().ref_count(), 2);
        assert_eq!(payload(&pool, 0), "kept");

        // Unreferenced entries end at zero; only Utf8 payloads are blanked.
        assert_eq!(pool.get_entry(1).unwrap().ref_count(), 0);
        assert_eq!(payload(&pool, 1), "");
        assert_eq!(pool.get_entry(2).unwrap().ref_count(), 0);
        assert_eq!(
            pool.get_entry(2).unwrap().constant(),
            &Constant::Integer(13)
        );
    }

    #[test]
    fn recount_is_idempotent() {
        let source = FixedRefs {
            utf8: vec![1, 1, 3],
            name_and_type: vec![4],
        };
        let mut pool = ConstantPool::from_entries([
            None,
            Some(Entry::new(utf8("name"))),
            Some(Entry::new(utf8("gone")).with_ref_count(9)),
            Some(Entry::new(utf8("descriptor"))),
            Some(Entry::new(Constant::NameAndType {
                name_index: 1,
                descriptor_index: 3,
            })),
        ]);

        pool.recompute_ref_counts(&source);
        let first = pool.clone();
        pool.recompute_ref_counts(&source);
        assert_eq!(pool, first);
    }

    #[test]
    fn intern_deduplicates_identical_strings() {
        let mut pool = ConstantPool::new();
        let first = pool.intern_utf8("a/b").unwrap();
        let second = pool.intern_utf8("a/b").unwrap();
        assert_eq!(first, second);
        assert!(pool.get_entry(first).unwrap().ref_count() >= 2);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn intern_reuses_a_dead_slot_before_growing() {
        let mut pool = ConstantPool::from_entries([
            Some(Entry::new(utf8("alive")).with_ref_count(1)),
            Some(Entry::new(utf8("")).with_ref_count(0)),
        ]);
        let index = pool.intern_utf8("fresh").unwrap();
        assert_eq!(index, 1);
        assert_eq!(payload(&pool, 1), "fresh");
        assert_eq!(pool.get_entry(1).unwrap().ref_count(), 1);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn intern_prefers_dedup_over_reuse() {
        let mut pool = ConstantPool::from_entries([
            Some(Entry::new(utf8("")).with_ref_count(0)),
            Some(Entry::new(utf8("target")).with_ref_count(1)),
        ]);
        let index = pool.intern_utf8("target").unwrap();
        assert_eq!(index, 1);
        assert_eq!(pool.get_entry(1).unwrap().ref_count(), 2);
        // The dead slot at 0 is left alone.
        assert_eq!(payload(&pool, 0), "");
    }

    #[test]
    fn intern_appends_when_nothing_matches() {
        let mut pool = ConstantPool::from_entries([
            Some(Entry::new(utf8("taken")).with_ref_count(1)),
            Some(Entry::new(Constant::Integer(0)).with_ref_count(0)),
        ]);
        let index = pool.intern_utf8("fresh").unwrap();
        assert_eq!(index, 2);
        assert_eq!(pool.get_entry(index).unwrap().ref_count(), 1);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn remap_decrements_old_and_interns_new() {
        let mut pool = ConstantPool::from_entries([
            Some(Entry::new(utf8("com/example/Widget")).with_ref_count(2)),
            Some(Entry::new(utf8("taken")).with_ref_count(1)),
        ]);
        let new_index = pool.remap_utf8(0, "a/a").unwrap();
        assert_eq!(pool.get_entry(0).unwrap().ref_count(), 1);
        assert_eq!(new_index, 2);
        assert_eq!(payload(&pool, new_index), "a/a");
        assert_eq!(pool.get_entry(new_index).unwrap().ref_count(), 1);
    }

    #[test]
    fn dead_entry_is_blanked_then_reused() {
        let mut pool =
            ConstantPool::from_entries([Some(Entry::new(utf8("A")).with_ref_count(2))]);
        pool.dec_ref_count(0);
        pool.recompute_ref_counts(&NoRefs);
        assert_eq!(pool.get_entry(0).unwrap().ref_count(), 0);
        assert_eq!(payload(&pool, 0), "");

        let index = pool.intern_utf8("B").unwrap();
        assert_eq!(index, 0);
        assert_eq!(payload(&pool, 0), "B");
        assert_eq!(pool.get_entry(0).unwrap().ref_count(), 1);
    }

    #[test]
    fn push_entry_pads_eight_byte_constants() {
        let mut pool = ConstantPool::new();
        let long_index = pool.push_entry(Entry::new(Constant::Long(1))).unwrap();
        let next_index = pool.push_entry(Entry::new(Constant::Integer(2))).unwrap();
        assert_eq!(long_index, 1);
        assert_eq!(next_index, 3);
        assert!(matches!(pool.get_entry(2), Err(Error::BadIndex(2))));
    }

    #[test]
    fn push_entry_never_deduplicates() {
        let mut pool = ConstantPool::new();
        let first = pool.push_entry(Entry::new(utf8("same"))).unwrap();
        let second = pool.push_entry(Entry::new(utf8("same"))).unwrap();
        assert_ne!(first, second);
    }

    proptest! {

        #[test]
        fn intern_twice_returns_the_same_index(s in ".*") {
            let mut pool = ConstantPool::new();
            let first = pool.intern_utf8(&s).unwrap();
            let second = pool.intern_utf8(&s).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(pool.get_entry(first).unwrap().ref_count() >= 2);
        }

        #[test]
        fn get_entry_fails_beyond_count(index in any::<u16>()) {
            let pool = ConstantPool::new();
            prop_assume!(index >= pool.count());
            prop_assert!(pool.get_entry(index).is_err());
        }

        #[test]
        fn from_reader((count, bytes) in arb_constant_pool_bytes()) {
            let mut reader = bytes.as_slice();
            let constant_pool = ConstantPool::from_reader(&mut reader, count);
            prop_assert!(constant_pool.is_ok());
            prop_assert!(reader.is_empty());
        }

        #[test]
        fn from_reader_err_on_wrong_count((count, bytes) in arb_constant_pool_bytes()) {
            let mut reader = bytes.as_slice();
            let constant_pool = ConstantPool::from_reader(&mut reader, count + 1);
            prop_assert!(constant_pool.is_err());
        }

        #[test]
        fn constant_kind(constant in any::<Constant>()) {
            prop_assert!(constant.constant_kind().starts_with("CONSTANT_"));
        }

    }
}
