// Author: Lukas Bower
// Purpose: Bounded text copy used to populate fixed-capacity record fields.

//! Truncating copy into fixed-capacity strings.

use heapless::String as HeaplessString;

/// Copy `src` into a fresh fixed-capacity string of at most `N` bytes.
///
/// Characters are copied whole; the copy stops before the first character
/// that would not fit, so the result is always valid UTF-8 and never longer
/// than `N` bytes. The tracked length takes the place of the terminator a
/// C-style fixed buffer would carry.
#[must_use]
pub fn copy_truncated<const N: usize>(src: &str) -> HeaplessString<N> {
    let mut dst = HeaplessString::new();
    for ch in src.chars() {
        if dst.push(ch).is_err() {
            break;
        }
    }
    dst
}
