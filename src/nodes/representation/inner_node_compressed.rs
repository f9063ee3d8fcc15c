//! The small inner node variants: unsorted key arrays with linear lookup.
//!
//! The three compressed variants hold 4, 11 and 25 children. Their key
//! arrays are kept unsorted (insertion appends, removal backfills from the
//! end), and lookup scans the array in 8-byte chunks using a broadcast-XOR,
//! zero-byte-detect idiom instead of a byte-at-a-time loop.

use crate::nodes::representation::{ArtNode, Header};

const LO_BYTES: u64 = 0x0101_0101_0101_0101;
const HI_BITS: u64 = 0x8080_8080_8080_8080;

/// Position of `target` within the first `len` entries of `keys`, scanning
/// 8-byte chunks at a time.
///
/// Each chunk is XORed against a broadcast copy of `target`, turning a match
/// into a zero byte, which the `(x - 0x01..) & !x & 0x80..` idiom flags. The
/// idiom can flag extra lanes next to a real zero, so every candidate is
/// verified before being returned; it never misses a true match.
fn find_key_byte(keys: &[u8], len: usize, target: u8) -> Option<usize> {
    debug_assert!(len <= keys.len());
    let broadcast = u64::from(target).wrapping_mul(LO_BYTES);
    for (chunk_index, chunk) in keys.chunks(8).enumerate() {
        let base = chunk_index * 8;
        if base >= len {
            break;
        }
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        let x = u64::from_le_bytes(word) ^ broadcast;
        let mut candidates = x.wrapping_sub(LO_BYTES) & !x & HI_BITS;
        while candidates != 0 {
            let index = base + (candidates.trailing_zeros() as usize >> 3);
            if index < len && keys[index] == target {
                return Some(index);
            }
            candidates &= candidates - 1;
        }
    }
    None
}

macro_rules! compressed_node {
    (
        $(#[$doc:meta])*
        $name:ident {
            capacity: $cap:literal,
            align: $align:literal,
            shrink_at: $shrink_at:literal $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        #[repr(C, align($align))]
        pub(crate) struct $name<T> {
            pub(crate) header: Header<T>,
            keys: [u8; $cap],
            children: [Option<ArtNode<T>>; $cap],
        }

        impl<T> $name<T> {
            pub(crate) const CAPACITY: usize = $cap;
            pub(crate) const SHRINK_AT: usize = $shrink_at;

            /// A node with the given header and no children. The header's
            /// child count is reset; prefix and value carry over.
            pub(crate) fn from_header(mut header: Header<T>) -> Self {
                header.num_children = 0;
                $name {
                    header,
                    keys: [0; $cap],
                    children: std::array::from_fn(|_| None),
                }
            }

            pub(crate) fn is_full(&self) -> bool {
                self.header.num_children() >= Self::CAPACITY
            }

            pub(crate) fn should_shrink(&self) -> bool {
                self.header.num_children() <= Self::SHRINK_AT
            }

            fn child_index(&self, key_byte: u8) -> Option<usize> {
                find_key_byte(&self.keys, self.header.num_children(), key_byte)
            }

            pub(crate) fn lookup_child(&self, key_byte: u8) -> Option<&ArtNode<T>> {
                let index = self.child_index(key_byte)?;
                self.children[index].as_ref()
            }

            pub(crate) fn lookup_child_mut(&mut self, key_byte: u8) -> Option<&mut ArtNode<T>> {
                let index = self.child_index(key_byte)?;
                self.children[index].as_mut()
            }

            /// Append a child. The key array stays unsorted.
            ///
            /// # Panics
            ///
            /// Panics if the node is full or already has a child for
            /// `key_byte`.
            pub(crate) fn write_child(&mut self, key_byte: u8, child: ArtNode<T>) {
                assert!(
                    !self.is_full(),
                    "{} has no capacity left for key byte {key_byte}",
                    stringify!($name)
                );
                assert!(
                    self.child_index(key_byte).is_none(),
                    "{} already has a child for key byte {key_byte}",
                    stringify!($name)
                );
                let index = self.header.num_children();
                self.keys[index] = key_byte;
                self.children[index] = Some(child);
                self.header.num_children += 1;
            }

            /// Remove the child for `key_byte`, backfilling the vacated slot
            /// with the last entry (order is irrelevant here).
            ///
            /// # Panics
            ///
            /// Panics if no child exists for `key_byte`.
            pub(crate) fn remove_child(&mut self, key_byte: u8) -> ArtNode<T> {
                let index = self.child_index(key_byte).unwrap_or_else(|| {
                    panic!(
                        "{} has no child for key byte {key_byte}",
                        stringify!($name)
                    )
                });
                let child = self.children[index]
                    .take()
                    .expect("key array entry must have a matching child");
                let last = self.header.num_children() - 1;
                self.keys[index] = self.keys[last];
                self.children.swap(index, last);
                self.header.num_children -= 1;
                child
            }

            /// Iterate the populated entries in slot order (unsorted).
            pub(crate) fn entries(&self) -> impl Iterator<Item = (u8, &ArtNode<T>)> {
                self.keys
                    .iter()
                    .zip(&self.children)
                    .take(self.header.num_children())
                    .map(|(key, child)| {
                        (
                            *key,
                            child
                                .as_ref()
                                .expect("key array entry must have a matching child"),
                        )
                    })
            }

            /// Decompose into the header and the populated `(byte, child)`
            /// pairs, for rebuilding as another variant.
            pub(crate) fn into_entries(self) -> (Header<T>, Vec<(u8, ArtNode<T>)>) {
                let len = self.header.num_children();
                let entries = self
                    .keys
                    .into_iter()
                    .zip(self.children)
                    .take(len)
                    .map(|(key, child)| {
                        (
                            key,
                            child.expect("key array entry must have a matching child"),
                        )
                    })
                    .collect();
                (self.header, entries)
            }

            /// Rebuild from a header and child entries, e.g. when a
            /// neighbouring variant grows or shrinks into this one.
            ///
            /// # Panics
            ///
            /// Panics if more entries are supplied than this variant holds.
            pub(crate) fn from_parts(
                header: Header<T>,
                entries: Vec<(u8, ArtNode<T>)>,
            ) -> Self {
                let mut node = Self::from_header(header);
                for (key_byte, child) in entries {
                    node.write_child(key_byte, child);
                }
                node
            }
        }
    };
}

compressed_node!(
    /// Inner node with up to 4 children, the first rung of the capacity
    /// ladder above the leaf.
    InnerNode4 {
        capacity: 4,
        align: 128,
        shrink_at: 1,
    }
);

compressed_node!(
    /// Inner node with up to 11 children.
    InnerNode11 {
        capacity: 11,
        align: 256,
        shrink_at: 3,
    }
);

compressed_node!(
    /// Inner node with up to 25 children, the largest variant searched
    /// linearly.
    InnerNode25 {
        capacity: 25,
        align: 512,
        shrink_at: 10,
    }
);
