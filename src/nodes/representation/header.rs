//! The common header shared by every node variant.

use std::hash::Hash;

use crate::set::ValueSet;

/// Maximum number of inline path-compression bytes per node.
///
/// Longer shared prefixes chain through successor nodes. This bound is part
/// of the layout arithmetic (it keeps the length within a nibble and the
/// hot header fields inside the first cache line) and must not be raised.
pub(crate) const MAX_PREFIX_LEN: usize = 14;

/// Common fields of every node variant: child count, the inline
/// path-compressed prefix, and the optional value set making the node a
/// terminal.
///
/// `num_children` is a `u16` because the full node can hold 256 children,
/// one past `u8::MAX`. The value set is boxed so a non-terminal node pays
/// one pointer for it.
#[derive(Debug, Clone)]
#[repr(C)]
pub(crate) struct Header<T> {
    pub(crate) num_children: u16,
    prefix_len: u8,
    prefix: [u8; MAX_PREFIX_LEN],
    pub(crate) value: Option<Box<ValueSet<T>>>,
}

impl<T> Header<T> {
    /// A header with the given inline prefix, no children and no value.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` is longer than [`MAX_PREFIX_LEN`].
    pub(crate) fn new(prefix: &[u8]) -> Self {
        let mut header = Header {
            num_children: 0,
            prefix_len: 0,
            prefix: [0; MAX_PREFIX_LEN],
            value: None,
        };
        header.set_prefix(prefix);
        header
    }

    pub(crate) fn num_children(&self) -> usize {
        usize::from(self.num_children)
    }

    /// The initialized portion of the inline prefix.
    #[inline]
    pub(crate) fn prefix(&self) -> &[u8] {
        &self.prefix[..usize::from(self.prefix_len)]
    }

    #[inline]
    pub(crate) fn prefix_len(&self) -> usize {
        usize::from(self.prefix_len)
    }

    /// Replace the inline prefix.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` is longer than [`MAX_PREFIX_LEN`].
    pub(crate) fn set_prefix(&mut self, prefix: &[u8]) {
        assert!(
            prefix.len() <= MAX_PREFIX_LEN,
            "prefix of {} bytes exceeds the inline limit of {MAX_PREFIX_LEN}",
            prefix.len()
        );
        self.prefix[..prefix.len()].copy_from_slice(prefix);
        self.prefix_len = prefix.len() as u8;
    }

    /// Drop the first `count` bytes of the prefix, shifting the remainder to
    /// the front.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the current prefix length.
    pub(crate) fn ltrim_prefix(&mut self, count: usize) {
        let len = self.prefix_len();
        assert!(
            count <= len,
            "cannot trim {count} bytes from a {len}-byte prefix"
        );
        self.prefix.copy_within(count..len, 0);
        self.prefix_len = (len - count) as u8;
    }

    /// Prepend `bytes` to the prefix, as when a node absorbs its parent's
    /// edge during path compaction.
    ///
    /// # Panics
    ///
    /// Panics if the combined prefix would exceed [`MAX_PREFIX_LEN`].
    pub(crate) fn prepend_prefix(&mut self, bytes: &[u8]) {
        let len = self.prefix_len();
        assert!(
            bytes.len() + len <= MAX_PREFIX_LEN,
            "combined prefix of {} bytes exceeds the inline limit of {MAX_PREFIX_LEN}",
            bytes.len() + len
        );
        self.prefix.copy_within(0..len, bytes.len());
        self.prefix[..bytes.len()].copy_from_slice(bytes);
        self.prefix_len = (bytes.len() + len) as u8;
    }

    /// Whether this node is a terminal, i.e. carries values for the key
    /// formed by the path from the root through this node's prefix.
    pub(crate) fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn value(&self) -> Option<&ValueSet<T>> {
        self.value.as_deref()
    }

    /// Detach the value set, leaving the node non-terminal.
    pub(crate) fn take_value(&mut self) -> Option<Box<ValueSet<T>>> {
        self.value.take()
    }
}

impl<T: Eq + Hash> Header<T> {
    /// Add a value to this node's set, allocating the set on first use.
    /// Returns `true` if the node became a terminal by this call.
    pub(crate) fn add_value(&mut self, value: T) -> bool {
        match &mut self.value {
            Some(set) => {
                set.insert(value);
                false
            }
            None => {
                let mut set = ValueSet::new();
                set.insert(value);
                self.value = Some(Box::new(set));
                true
            }
        }
    }

    /// Remove a single value from this node's set. An emptied set is
    /// dropped, so a stored set is never empty. Returns `true` if the node
    /// stopped being a terminal by this call.
    pub(crate) fn remove_value(&mut self, value: &T) -> bool {
        if let Some(set) = &mut self.value {
            set.remove(value);
            if set.is_empty() {
                self.value = None;
                return true;
            }
        }
        false
    }
}
