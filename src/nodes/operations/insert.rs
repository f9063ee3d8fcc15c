//! Insertion, node growth and split-on-mismatch.

use std::hash::Hash;

use crate::key::common_prefix_len;
use crate::nodes::representation::{ArtNode, Header, InnerNode4, MAX_PREFIX_LEN};

/// Add `value` to the set stored under `key`, building out the tree as
/// needed. Returns `true` if the key had no values before this call.
pub(crate) fn insert<T: Eq + Hash>(
    root: &mut Option<ArtNode<T>>,
    key: &[u8],
    value: T,
) -> bool {
    match root {
        Some(node) => insert_rec(node, key, 0, value),
        None => {
            *root = Some(leaf_chain_with_value(key, value));
            true
        }
    }
}

fn insert_rec<T: Eq + Hash>(node: &mut ArtNode<T>, key: &[u8], depth: usize, value: T) -> bool {
    let prefix_len = node.header().prefix_len();
    let rest = &key[depth..];
    let lcp = common_prefix_len(node.header().prefix(), rest);

    if lcp == prefix_len && lcp == rest.len() {
        // The key ends exactly at this node; it becomes (or already is) a
        // terminal.
        return node.header_mut().add_value(value);
    }

    if lcp == prefix_len {
        // The key continues past this node's prefix.
        let next_depth = depth + prefix_len;
        let key_byte = key[next_depth];
        if let Some(child) = node.lookup_child_mut(key_byte) {
            return insert_rec(child, key, next_depth, value);
        }
        if node.is_full() {
            node.update_in_place(ArtNode::grow);
        }
        node.write_child(key_byte, leaf_chain_with_value(&key[next_depth..], value));
        return true;
    }

    // The key disagrees with this node's prefix at `lcp` (or ends inside
    // it): split the prefix around the shared portion.
    split_prefix(node, key, depth, lcp, value);
    true
}

/// Split `node` at `lcp` bytes into its prefix. A new 4-child interior node
/// takes over the shared prefix portion and the existing node, trimmed to
/// the disagreeing remainder, becomes its child. The inserted key either
/// terminates at the new interior node or hangs off it as a fresh leaf.
fn split_prefix<T: Eq + Hash>(
    node: &mut ArtNode<T>,
    key: &[u8],
    depth: usize,
    lcp: usize,
    value: T,
) {
    node.update_in_place(|mut existing| {
        let shared = existing.header().prefix()[..lcp].to_vec();
        existing.header_mut().ltrim_prefix(lcp);
        let branch_byte = existing.header().prefix()[0];
        let mut interior = InnerNode4::from_header(Header::new(&shared));
        interior.write_child(branch_byte, existing);
        ArtNode::Node4(Box::new(interior))
    });
    let rest = &key[depth..];
    if rest.len() == lcp {
        // The inserted key ends at the split point; the new interior node
        // is its terminal.
        node.header_mut().add_value(value);
    } else {
        let next_depth = depth + lcp;
        node.write_child(key[next_depth], leaf_chain_with_value(&key[next_depth..], value));
    }
}

/// Build a leaf holding `value` for the given key suffix. A suffix longer
/// than the inline prefix limit becomes a chain of leaves, each absorbing
/// the next run of up to 14 bytes.
fn leaf_chain_with_value<T: Eq + Hash>(suffix: &[u8], value: T) -> ArtNode<T> {
    let mut chunks = suffix.chunks(MAX_PREFIX_LEN).rev();
    let mut node = {
        let last = chunks.next().unwrap_or(&[]);
        let mut leaf = ArtNode::new_leaf(last);
        leaf.header_mut().add_value(value);
        leaf
    };
    for chunk in chunks {
        let mut link = ArtNode::new_leaf(chunk);
        link.write_child(node.header().prefix()[0], node);
        node = link;
    }
    node
}
