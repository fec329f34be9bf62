/// Reads the discriminant of an enum that is `repr(u8)`.
///
/// # Safety
/// `T` must be a `repr(u8)` enum.
pub(crate) const unsafe fn enum_discriminant<T>(value: &T) -> u8 {
    // SAFETY: Because `T` is marked `repr(u8)`, its layout is a `repr(C)`
    // union between `repr(C)` structs, each of which has the `u8`
    // discriminant as its first field, so the discriminant can be read
    // without offsetting the pointer.
    unsafe { *std::ptr::from_ref(value).cast::<u8>() }
}
