//! The full inner node: direct indexing over an external 256-slot array.
//!
//! The node object itself stays small (header, bitmap and one pointer) so
//! the presence check is answered from the node's own cache lines; the slot
//! array lives in a separate boxed allocation indexed directly by key byte.

use crate::nodes::bitmap::PresenceBitmap;
use crate::nodes::representation::{ArtNode, Header};

/// Inner node with a slot for every possible key byte.
#[derive(Debug, Clone)]
#[repr(C, align(64))]
pub(crate) struct InnerNode256<T> {
    pub(crate) header: Header<T>,
    bitmap: PresenceBitmap,
    children: Box<[Option<ArtNode<T>>; 256]>,
}

impl<T> InnerNode256<T> {
    pub(crate) const CAPACITY: usize = 256;
    pub(crate) const SHRINK_AT: usize = 96;

    /// A node with the given header and no children. The header's child
    /// count is reset; prefix and value carry over.
    pub(crate) fn from_header(mut header: Header<T>) -> Self {
        header.num_children = 0;
        InnerNode256 {
            header,
            bitmap: PresenceBitmap::EMPTY,
            children: Box::new(std::array::from_fn(|_| None)),
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.header.num_children() >= Self::CAPACITY
    }

    pub(crate) fn should_shrink(&self) -> bool {
        self.header.num_children() <= Self::SHRINK_AT
    }

    pub(crate) fn lookup_child(&self, key_byte: u8) -> Option<&ArtNode<T>> {
        if !self.bitmap.get(key_byte) {
            return None;
        }
        match self.children[usize::from(key_byte)].as_ref() {
            Some(child) => Some(child),
            None => panic!("presence bit set for key byte {key_byte} but child slot is empty"),
        }
    }

    pub(crate) fn lookup_child_mut(&mut self, key_byte: u8) -> Option<&mut ArtNode<T>> {
        if !self.bitmap.get(key_byte) {
            return None;
        }
        match self.children[usize::from(key_byte)].as_mut() {
            Some(child) => Some(child),
            None => panic!("presence bit set for key byte {key_byte} but child slot is empty"),
        }
    }

    /// Assign the slot for `key_byte`.
    ///
    /// # Panics
    ///
    /// Panics if a child already occupies the slot.
    pub(crate) fn write_child(&mut self, key_byte: u8, child: ArtNode<T>) {
        assert!(
            self.children[usize::from(key_byte)].is_none(),
            "full node already has a child for key byte {key_byte}"
        );
        self.children[usize::from(key_byte)] = Some(child);
        self.bitmap.set(key_byte);
        self.header.num_children += 1;
        debug_assert_eq!(self.bitmap.count(), self.header.num_children());
    }

    /// Clear the slot for `key_byte`.
    ///
    /// # Panics
    ///
    /// Panics if no child exists for `key_byte`.
    pub(crate) fn remove_child(&mut self, key_byte: u8) -> ArtNode<T> {
        let child = self.children[usize::from(key_byte)]
            .take()
            .unwrap_or_else(|| panic!("full node has no child for key byte {key_byte}"));
        self.bitmap.clear(key_byte);
        self.header.num_children -= 1;
        debug_assert_eq!(self.bitmap.count(), self.header.num_children());
        child
    }

    /// Iterate the populated entries in ascending key-byte order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, &ArtNode<T>)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| child.as_ref().map(|child| (index as u8, child)))
    }

    /// Decompose into the header and the populated `(byte, child)` pairs in
    /// ascending order, for shrinking into the sorted variant.
    pub(crate) fn into_entries(self) -> (Header<T>, Vec<(u8, ArtNode<T>)>) {
        let children = *self.children;
        let entries = children
            .into_iter()
            .enumerate()
            .filter_map(|(index, child)| child.map(|child| (index as u8, child)))
            .collect();
        (self.header, entries)
    }

    /// Rebuild from a header and child entries.
    pub(crate) fn from_parts(header: Header<T>, entries: Vec<(u8, ArtNode<T>)>) -> Self {
        let mut node = Self::from_header(header);
        for (key_byte, child) in entries {
            node.write_child(key_byte, child);
        }
        node
    }
}
