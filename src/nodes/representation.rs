//! Node family representation.
//!
//! The tree is built from seven node variants sharing a common [`Header`]
//! and differing in fan-out and child-lookup strategy. The variants form a
//! capacity ladder: a node that runs out of child slots is rebuilt as the
//! next-larger variant, and one that empties out far enough is rebuilt as
//! the next-smaller one. [`ArtNode`] is the tagged sum over the variants;
//! the discriminant replaces the pointer-cast dispatch a shared-header
//! layout would need, so variant access is checked by construction.

mod header;
mod inner_node_compressed;
mod inner_node_full;
mod inner_node_sorted;
mod leaf;

pub(crate) use header::{Header, MAX_PREFIX_LEN};
pub(crate) use inner_node_compressed::{InnerNode11, InnerNode25, InnerNode4};
pub(crate) use inner_node_full::InnerNode256;
pub(crate) use inner_node_sorted::{InnerNode107, InnerNode50};
pub(crate) use leaf::LeafNode;

use std::fmt;

/// Discriminant of a node variant, ordered by the capacity ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum NodeType {
    Leaf,
    Node4,
    Node11,
    Node25,
    Node50,
    Node107,
    Node256,
}

impl NodeType {
    /// The most children a node of this variant can reference.
    #[cfg(test)]
    pub(crate) fn max_children(self) -> usize {
        match self {
            NodeType::Leaf => LeafNode::<()>::CAPACITY,
            NodeType::Node4 => InnerNode4::<()>::CAPACITY,
            NodeType::Node11 => InnerNode11::<()>::CAPACITY,
            NodeType::Node25 => InnerNode25::<()>::CAPACITY,
            NodeType::Node50 => InnerNode50::<()>::CAPACITY,
            NodeType::Node107 => InnerNode107::<()>::CAPACITY,
            NodeType::Node256 => InnerNode256::<()>::CAPACITY,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Leaf => "Leaf",
            NodeType::Node4 => "Node4",
            NodeType::Node11 => "Node11",
            NodeType::Node25 => "Node25",
            NodeType::Node50 => "Node50",
            NodeType::Node107 => "Node107",
            NodeType::Node256 => "Node256",
        };
        f.write_str(name)
    }
}

/// A tree node: the tagged sum over the seven variants.
///
/// Each variant is boxed at its own size class, so a handle is one
/// discriminant plus one pointer and child arrays stay compact.
#[derive(Debug, Clone)]
pub(crate) enum ArtNode<T> {
    Leaf(Box<LeafNode<T>>),
    Node4(Box<InnerNode4<T>>),
    Node11(Box<InnerNode11<T>>),
    Node25(Box<InnerNode25<T>>),
    Node50(Box<InnerNode50<T>>),
    Node107(Box<InnerNode107<T>>),
    Node256(Box<InnerNode256<T>>),
}

/// Run `$action` with `$inner` bound to whichever variant `$node` holds.
macro_rules! dispatch {
    ($node:expr, $inner:ident => $action:expr) => {
        match $node {
            ArtNode::Leaf($inner) => $action,
            ArtNode::Node4($inner) => $action,
            ArtNode::Node11($inner) => $action,
            ArtNode::Node25($inner) => $action,
            ArtNode::Node50($inner) => $action,
            ArtNode::Node107($inner) => $action,
            ArtNode::Node256($inner) => $action,
        }
    };
}

impl<T> ArtNode<T> {
    /// A fresh leaf with the given inline prefix, no child and no value.
    pub(crate) fn new_leaf(prefix: &[u8]) -> Self {
        ArtNode::Leaf(Box::new(LeafNode::from_header(Header::new(prefix))))
    }

    pub(crate) fn node_type(&self) -> NodeType {
        match self {
            ArtNode::Leaf(_) => NodeType::Leaf,
            ArtNode::Node4(_) => NodeType::Node4,
            ArtNode::Node11(_) => NodeType::Node11,
            ArtNode::Node25(_) => NodeType::Node25,
            ArtNode::Node50(_) => NodeType::Node50,
            ArtNode::Node107(_) => NodeType::Node107,
            ArtNode::Node256(_) => NodeType::Node256,
        }
    }

    pub(crate) fn header(&self) -> &Header<T> {
        dispatch!(self, node => &node.header)
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header<T> {
        dispatch!(self, node => &mut node.header)
    }

    /// The child branching off at `key_byte`, found with this variant's
    /// lookup strategy.
    pub(crate) fn lookup_child(&self, key_byte: u8) -> Option<&ArtNode<T>> {
        dispatch!(self, node => node.lookup_child(key_byte))
    }

    pub(crate) fn lookup_child_mut(&mut self, key_byte: u8) -> Option<&mut ArtNode<T>> {
        dispatch!(self, node => node.lookup_child_mut(key_byte))
    }

    /// Attach a child for `key_byte`.
    ///
    /// # Panics
    ///
    /// Panics if the node is at capacity or already has a child for that
    /// byte; callers grow the node first.
    pub(crate) fn write_child(&mut self, key_byte: u8, child: ArtNode<T>) {
        dispatch!(self, node => node.write_child(key_byte, child))
    }

    /// Detach and return the child for `key_byte`.
    ///
    /// # Panics
    ///
    /// Panics if no child exists for that byte.
    pub(crate) fn remove_child(&mut self, key_byte: u8) -> ArtNode<T> {
        dispatch!(self, node => node.remove_child(key_byte))
    }

    pub(crate) fn is_full(&self) -> bool {
        dispatch!(self, node => node.is_full())
    }

    /// Whether the child count has dropped far enough for the next-smaller
    /// variant to take over with slack. The thresholds sit well below each
    /// variant's capacity so alternating insert/remove traffic does not
    /// oscillate between size classes.
    pub(crate) fn should_shrink(&self) -> bool {
        dispatch!(self, node => node.should_shrink())
    }

    /// The populated `(branch byte, child)` pairs in ascending byte order.
    pub(crate) fn children_in_order(&self) -> Vec<(u8, &ArtNode<T>)> {
        match self {
            ArtNode::Leaf(node) => node.entries().collect(),
            ArtNode::Node4(node) => sorted_entries(node.entries()),
            ArtNode::Node11(node) => sorted_entries(node.entries()),
            ArtNode::Node25(node) => sorted_entries(node.entries()),
            ArtNode::Node50(node) => node.entries().collect(),
            ArtNode::Node107(node) => node.entries().collect(),
            ArtNode::Node256(node) => node.entries().collect(),
        }
    }

    /// Rebuild this node as the next-larger variant, preserving children,
    /// value set and inline prefix.
    ///
    /// # Panics
    ///
    /// Panics on the full node, which has nowhere to grow.
    pub(crate) fn grow(self) -> Self {
        let node_type = self.node_type();
        match self {
            ArtNode::Leaf(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node4(Box::new(InnerNode4::from_parts(header, entries)))
            }
            ArtNode::Node4(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node11(Box::new(InnerNode11::from_parts(header, entries)))
            }
            ArtNode::Node11(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node25(Box::new(InnerNode25::from_parts(header, entries)))
            }
            ArtNode::Node25(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node50(Box::new(InnerNode50::from_parts(header, entries)))
            }
            ArtNode::Node50(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node107(Box::new(InnerNode107::from_parts(header, entries)))
            }
            ArtNode::Node107(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node256(Box::new(InnerNode256::from_parts(header, entries)))
            }
            ArtNode::Node256(_) => {
                panic!("cannot grow a {node_type}, it already holds every key byte")
            }
        }
    }

    /// Rebuild this node as the next-smaller variant, preserving children,
    /// value set and inline prefix.
    ///
    /// # Panics
    ///
    /// Panics on a leaf, or if the current children do not fit the smaller
    /// variant.
    pub(crate) fn shrink(self) -> Self {
        let node_type = self.node_type();
        match self {
            ArtNode::Leaf(_) => panic!("cannot shrink a {node_type}"),
            ArtNode::Node4(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Leaf(Box::new(LeafNode::from_parts(header, entries)))
            }
            ArtNode::Node11(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node4(Box::new(InnerNode4::from_parts(header, entries)))
            }
            ArtNode::Node25(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node11(Box::new(InnerNode11::from_parts(header, entries)))
            }
            ArtNode::Node50(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node25(Box::new(InnerNode25::from_parts(header, entries)))
            }
            ArtNode::Node107(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node50(Box::new(InnerNode50::from_parts(header, entries)))
            }
            ArtNode::Node256(node) => {
                let (header, entries) = node.into_entries();
                ArtNode::Node107(Box::new(InnerNode107::from_parts(header, entries)))
            }
        }
    }

    /// Replace this node in place via an owning transformation, e.g. a grow
    /// or shrink that consumes the old variant.
    pub(crate) fn update_in_place(&mut self, transform: impl FnOnce(ArtNode<T>) -> ArtNode<T>) {
        let owned = std::mem::replace(self, ArtNode::new_leaf(&[]));
        *self = transform(owned);
    }
}

fn sorted_entries<'a, T>(
    entries: impl Iterator<Item = (u8, &'a ArtNode<T>)>,
) -> Vec<(u8, &'a ArtNode<T>)> {
    let mut entries: Vec<_> = entries.collect();
    entries.sort_unstable_by_key(|(key_byte, _)| *key_byte);
    entries
}
