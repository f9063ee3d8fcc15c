//! Bounded in-order traversal.
//!
//! One traversal routine serves every range query shape: each bound is a
//! [`Bound`] over key bytes, so half-open, closed and unbounded intervals
//! all reduce to the same walk. Terminals are visited in ascending key
//! order, and a subtree is skipped as soon as its accumulated path proves
//! that every key inside it falls outside the bounds.

use std::hash::Hash;
use std::ops::Bound;

use crate::key::Key;
use crate::nodes::representation::ArtNode;
use crate::set::ValueSet;

/// Union the value sets of every terminal within the bounds into `out`.
pub(crate) fn collect_values<T: Clone + Eq + Hash>(
    root: Option<&ArtNode<T>>,
    lower: Bound<&[u8]>,
    upper: Bound<&[u8]>,
    out: &mut ValueSet<T>,
) {
    if let Some(root) = root {
        let mut path = Vec::new();
        visit(root, &mut path, lower, upper, &mut |_, set| {
            out.extend_from(set)
        });
    }
}

/// Clone every terminal key, in ascending order.
pub(crate) fn collect_keys<T>(root: Option<&ArtNode<T>>) -> Vec<Key> {
    let mut keys = Vec::new();
    if let Some(root) = root {
        let mut path = Vec::new();
        let mut record = |key_bytes: &[u8], _: &ValueSet<T>| {
            keys.push(Key::from_vec(key_bytes.to_vec()));
        };
        visit(root, &mut path, Bound::Unbounded, Bound::Unbounded, &mut record);
    }
    keys
}

/// Count the terminals, i.e. the number of keys with at least one value.
#[cfg(test)]
pub(crate) fn count_terminals<T>(root: Option<&ArtNode<T>>) -> usize {
    let mut count = 0;
    if let Some(root) = root {
        let mut path = Vec::new();
        visit(root, &mut path, Bound::Unbounded, Bound::Unbounded, &mut |_, _| {
            count += 1
        });
    }
    count
}

fn visit<'a, T>(
    node: &'a ArtNode<T>,
    path: &mut Vec<u8>,
    lower: Bound<&[u8]>,
    upper: Bound<&[u8]>,
    f: &mut impl FnMut(&[u8], &'a ValueSet<T>),
) {
    let parent_len = path.len();
    path.extend_from_slice(node.header().prefix());

    // Every key in this subtree extends the accumulated path, so the path
    // alone can prove the whole subtree out of bounds.
    if subtree_above_upper(path, upper) || subtree_below_lower(path, lower) {
        path.truncate(parent_len);
        return;
    }

    if let Some(set) = node.header().value() {
        if key_within_lower(path, lower) && key_within_upper(path, upper) {
            f(path, set);
        }
    }

    for (_, child) in node.children_in_order() {
        visit(child, path, lower, upper, f);
    }
    path.truncate(parent_len);
}

/// Every key extending `local` compares above the upper bound.
fn subtree_above_upper(local: &[u8], upper: Bound<&[u8]>) -> bool {
    match upper {
        // Extensions of `local` sort at or after it, so once the path
        // itself passes the bound nothing below can come back.
        Bound::Included(upper) => local > upper,
        Bound::Excluded(upper) => local >= upper,
        Bound::Unbounded => false,
    }
}

/// Every key extending `local` compares below the lower bound.
fn subtree_below_lower(local: &[u8], lower: Bound<&[u8]>) -> bool {
    match lower {
        // If the path already disagrees with the bound somewhere, all
        // extensions inherit that comparison; if the path is a prefix of
        // the bound, some extension may still reach it.
        Bound::Included(lower) | Bound::Excluded(lower) => {
            local < lower && !lower.starts_with(local)
        }
        Bound::Unbounded => false,
    }
}

fn key_within_lower(key: &[u8], lower: Bound<&[u8]>) -> bool {
    match lower {
        Bound::Included(lower) => key >= lower,
        Bound::Excluded(lower) => key > lower,
        Bound::Unbounded => true,
    }
}

fn key_within_upper(key: &[u8], upper: Bound<&[u8]>) -> bool {
    match upper {
        Bound::Included(upper) => key <= upper,
        Bound::Excluded(upper) => key < upper,
        Bound::Unbounded => true,
    }
}
