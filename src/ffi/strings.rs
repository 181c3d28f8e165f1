//! C string codecs
//!
//! Both directions are validating: a null pointer or non-UTF-8 input, and
//! text with an embedded NUL on the way out, are validation errors rather
//! than truncation.

use std::ffi::{CStr, CString};

use libc::c_char;

use crate::errors::{LoreError, LoreResult};

/// Copies a caller-owned C string into an owned Rust string.
///
/// # Safety
///
/// `ptr`, when non-null, must point to a NUL-terminated byte sequence.
pub(super) unsafe fn read_c_string(ptr: *const c_char) -> LoreResult<String> {
    if ptr.is_null() {
        return Err(LoreError::validation("unexpected null string pointer"));
    }
    let bytes = CStr::from_ptr(ptr);
    let text = bytes.to_str().map_err(|e| {
        LoreError::validation(format!("string crossing the boundary is not UTF-8: {}", e))
    })?;
    Ok(text.to_string())
}

/// Allocates a C string the caller owns; reclaim with `free_lore_string`.
pub(super) fn alloc_c_string(text: &str) -> LoreResult<*const c_char> {
    let cstring = CString::new(text).map_err(|_| {
        LoreError::validation("text with an embedded NUL byte cannot cross the boundary")
    })?;
    Ok(cstring.into_raw() as *const c_char)
}

/// Releases a string previously produced by `alloc_c_string`.
///
/// # Safety
///
/// `ptr` must be null or a pointer obtained from `alloc_c_string` that has
/// not been released before.
pub(super) unsafe fn release_c_string(ptr: *const c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_string_roundtrip() {
        let text = "Eyjafjallajökull!";
        let ptr = alloc_c_string(text).unwrap();
        let back = unsafe { read_c_string(ptr) }.unwrap();
        assert_eq!(back, text);
        unsafe { release_c_string(ptr) };
    }

    #[test]
    fn test_empty_string_roundtrip() {
        let ptr = alloc_c_string("").unwrap();
        let back = unsafe { read_c_string(ptr) }.unwrap();
        assert_eq!(back, "");
        unsafe { release_c_string(ptr) };
    }

    #[test]
    fn test_null_pointer_is_rejected() {
        let result = unsafe { read_c_string(ptr::null()) };
        assert!(result.is_err());
    }

    #[test]
    fn test_embedded_nul_is_rejected_not_truncated() {
        let err = alloc_c_string("cut\0here").unwrap_err();
        assert!(err.to_string().contains("NUL"));
    }

    #[test]
    fn test_release_tolerates_null() {
        unsafe { release_c_string(ptr::null()) };
    }
}
