//! The mid-size inner node variants: presence bitmap plus a sorted key
//! array searched by binary search.
//!
//! The two sorted variants hold 50 and 107 children. The bitmap answers the
//! common "no child for this byte" case from the node's leading cache lines;
//! only a confirmed hit pays for the binary search.

use crate::nodes::bitmap::PresenceBitmap;
use crate::nodes::representation::{ArtNode, Header};

macro_rules! sorted_node {
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
            bitmap: PresenceBitmap,
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
                    bitmap: PresenceBitmap::EMPTY,
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

            /// Position of `key_byte` in the sorted key array, going through
            /// the bitmap first.
            ///
            /// # Panics
            ///
            /// Panics if the presence bit is set but the sorted array has no
            /// matching entry; the two must never disagree.
            fn child_index(&self, key_byte: u8) -> Option<usize> {
                if !self.bitmap.get(key_byte) {
                    return None;
                }
                match self.keys[..self.header.num_children()].binary_search(&key_byte) {
                    Ok(index) => Some(index),
                    Err(_) => panic!(
                        "{}: presence bit set for key byte {key_byte} but no sorted entry",
                        stringify!($name)
                    ),
                }
            }

            pub(crate) fn lookup_child(&self, key_byte: u8) -> Option<&ArtNode<T>> {
                let index = self.child_index(key_byte)?;
                self.children[index].as_ref()
            }

            pub(crate) fn lookup_child_mut(&mut self, key_byte: u8) -> Option<&mut ArtNode<T>> {
                let index = self.child_index(key_byte)?;
                self.children[index].as_mut()
            }

            /// Insert a child, keeping the key array sorted and setting the
            /// presence bit.
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
                let len = self.header.num_children();
                let index = match self.keys[..len].binary_search(&key_byte) {
                    Err(index) => index,
                    Ok(_) => panic!(
                        "{} already has a child for key byte {key_byte}",
                        stringify!($name)
                    ),
                };
                self.keys.copy_within(index..len, index + 1);
                self.keys[index] = key_byte;
                self.children[index..=len].rotate_right(1);
                self.children[index] = Some(child);
                self.bitmap.set(key_byte);
                self.header.num_children += 1;
            }

            /// Remove the child for `key_byte`, left-shifting the entries
            /// behind it and clearing the presence bit.
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
                let len = self.header.num_children();
                let child = self.children[index]
                    .take()
                    .expect("sorted entry must have a matching child");
                self.keys.copy_within(index + 1..len, index);
                self.children[index..len].rotate_left(1);
                self.bitmap.clear(key_byte);
                self.header.num_children -= 1;
                child
            }

            /// Iterate the populated entries in ascending key-byte order.
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
                                .expect("sorted entry must have a matching child"),
                        )
                    })
            }

            /// Decompose into the header and the populated `(byte, child)`
            /// pairs in ascending order, for rebuilding as another variant.
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
                            child.expect("sorted entry must have a matching child"),
                        )
                    })
                    .collect();
                (self.header, entries)
            }

            /// Rebuild from a header and child entries in any order.
            ///
            /// # Panics
            ///
            /// Panics if more entries are supplied than this variant holds.
            pub(crate) fn from_parts(
                header: Header<T>,
                mut entries: Vec<(u8, ArtNode<T>)>,
            ) -> Self {
                entries.sort_unstable_by_key(|(key_byte, _)| *key_byte);
                let mut node = Self::from_header(header);
                for (key_byte, child) in entries {
                    node.write_child(key_byte, child);
                }
                node
            }
        }
    };
}

sorted_node!(
    /// Inner node with up to 50 children; the first of the bitmap-guarded,
    /// binary-searched variants.
    InnerNode50 {
        capacity: 50,
        align: 1024,
        shrink_at: 22,
    }
);

sorted_node!(
    /// Inner node with up to 107 children, the largest variant with a key
    /// array.
    InnerNode107 {
        capacity: 107,
        align: 2048,
        shrink_at: 45,
    }
);
