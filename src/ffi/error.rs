//! The error channel
//!
//! Every boundary operation reports its outcome through one text return
//! slot: the empty string on success, a human-readable message on failure.
//! The success sentinel is a static empty C string, so the caller's check
//! is unconditional; the channel never returns null.
//!
//! Failure messages live in a thread-local slot owned by the library. The
//! pointer stays valid until the next boundary call on the same thread;
//! callers copy the message before issuing another call. No allocation
//! escapes on the error path, so there is nothing for the caller to free.

use std::cell::RefCell;
use std::ffi::CString;

use libc::c_char;

use crate::errors::LoreResult;
use crate::observability::Logger;

static SUCCESS_SENTINEL: [u8; 1] = [0];

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Renders an operation outcome into the error channel.
pub(super) fn report(operation: &str, result: LoreResult<()>) -> *const c_char {
    match result {
        Ok(()) => SUCCESS_SENTINEL.as_ptr() as *const c_char,
        Err(err) => {
            let message = err.to_string();
            Logger::error(
                "boundary_error",
                &[("operation", operation), ("error", &message)],
            );

            // The channel itself must never fail: strip NUL bytes (none of
            // our messages carry any) and guarantee a non-empty message so
            // the failure can never read as the success sentinel.
            let mut bytes: Vec<u8> = message.into_bytes();
            bytes.retain(|b| *b != 0);
            if bytes.is_empty() {
                bytes.extend_from_slice(b"unspecified error");
            }
            let rendered = unsafe { CString::from_vec_unchecked(bytes) };

            LAST_ERROR.with(|slot| {
                let mut slot = slot.borrow_mut();
                *slot = Some(rendered);
                match slot.as_ref() {
                    Some(message) => message.as_ptr(),
                    None => SUCCESS_SENTINEL.as_ptr() as *const c_char,
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoreError;
    use std::ffi::CStr;

    unsafe fn channel_text(ptr: *const c_char) -> String {
        CStr::from_ptr(ptr).to_str().unwrap().to_string()
    }

    #[test]
    fn test_success_is_the_empty_string_not_null() {
        let ptr = report("op", Ok(()));
        assert!(!ptr.is_null());
        assert_eq!(unsafe { channel_text(ptr) }, "");
    }

    #[test]
    fn test_failure_is_a_non_empty_message() {
        let ptr = report("op", Err(LoreError::validation("bad input")));
        let text = unsafe { channel_text(ptr) };
        assert!(!text.is_empty());
        assert!(text.contains("bad input"));
    }

    #[test]
    fn test_message_survives_until_the_next_call() {
        let ptr = report("op", Err(LoreError::validation("first failure")));
        // Unrelated work on another thread must not disturb the slot.
        std::thread::spawn(|| {
            let _ = report("op", Err(LoreError::validation("elsewhere")));
        })
        .join()
        .unwrap();
        assert!(unsafe { channel_text(ptr) }.contains("first failure"));
    }

    #[test]
    fn test_next_call_replaces_the_message() {
        let _ = report("op", Err(LoreError::validation("first")));
        let ptr = report("op", Err(LoreError::validation("second")));
        assert!(unsafe { channel_text(ptr) }.contains("second"));
    }
}
