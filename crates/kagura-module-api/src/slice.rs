#![forbid(unsafe_op_in_unsafe_fn)]

//! Non-owning views across the boundary.
//!
//! A [`RawSlice`] is a borrow of module-owned storage. It stays valid only
//! until the next call into the module that may mutate that storage
//! (advance, the clear entry points, destroy). Consumers must copy out
//! anything they need past that point and must never store a view across a
//! frame boundary.

use crate::types::{AssetCommand, CollisionEvent, RenderableObject, TextCommand};

/// Pointer + length pair over `T`. The POD spelling of `&[T]`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawSlice<T> {
    pub ptr: *const T,
    pub len: usize,
}

impl<T> RawSlice<T> {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
        }
    }

    #[inline]
    pub fn from_slice(s: &[T]) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.ptr.is_null()
    }

    /// # Safety
    ///
    /// The backing storage must still be alive and unmutated since this view
    /// was produced, and the caller must not let the returned slice outlive
    /// the next call into the producing module.
    #[inline]
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        if self.is_empty() {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
    }
}

pub type RenderableSlice = RawSlice<RenderableObject>;
pub type AssetCommandSlice = RawSlice<AssetCommand>;
pub type TextCommandSlice = RawSlice<TextCommand>;
pub type CollisionEventSlice = RawSlice<CollisionEvent>;

/// Pointer + length pair over UTF-8 bytes. The POD spelling of `&str`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl RawStr {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
        }
    }

    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0 || self.ptr.is_null()
    }

    /// # Safety
    ///
    /// Same liveness rules as [`RawSlice::as_slice`]; the bytes must be the
    /// UTF-8 they were when the view was produced.
    #[inline]
    pub unsafe fn as_str<'a>(&self) -> &'a str {
        if self.is_empty() {
            return "";
        }
        let bytes = unsafe { core::slice::from_raw_parts(self.ptr, self.len) };
        core::str::from_utf8(bytes).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_views_are_safe() {
        let s: RawSlice<RenderableObject> = RawSlice::empty();
        assert!(s.is_empty());
        assert_eq!(unsafe { s.as_slice() }.len(), 0);

        let t = RawStr::empty();
        assert_eq!(unsafe { t.as_str() }, "");
    }

    #[test]
    fn str_view_round_trips() {
        let backing = String::from("assets/textures/player.png");
        let view = RawStr::from_str(&backing);
        assert_eq!(unsafe { view.as_str() }, backing);
    }
}
