use smallvec::SmallVec;

/// Converts a `u64` to its ASCII decimal digits.
///
/// Array elements are written as documents keyed by decimal indices, so the
/// encoder needs a cheap index-to-digits conversion that stays off the heap.
///
/// # Example
///
/// ```
/// use bson::util::u64_to_decimal_digits;
///
/// assert_eq!(&u64_to_decimal_digits(0)[..], &b"0"[..]);
/// assert_eq!(&u64_to_decimal_digits(158)[..], &b"158"[..]);
/// ```
pub fn u64_to_decimal_digits(mut num: u64) -> SmallVec<[u8; 20]> {
    let mut out = SmallVec::new();
    loop {
        out.push(b'0' + (num % 10) as u8);
        num /= 10;
        if num == 0 {
            break;
        }
    }
    out.reverse();
    out
}

#[macro_export]
/// Helper macro to compose `From` implementations.
macro_rules! compose_from {
    ($to:tt, $mid:tt, $from:ty) => {
        impl From<$from> for $to {
            fn from(f: $from) -> Self { Self::from($mid::from(f)) }
        }
    };
}

#[macro_export]
/// Helper macro to make implementing `From` easier.
macro_rules! from_fn {
    ($to:ty, $from:ty, $fn:expr) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $fn(f) }
        }
    };
}
