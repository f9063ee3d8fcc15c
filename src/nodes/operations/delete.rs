//! Removal, node shrinking and path compaction.

use std::hash::Hash;

use crate::key::common_prefix_len;
use crate::nodes::representation::{ArtNode, MAX_PREFIX_LEN};

/// What to clear once the terminal for the key is found.
enum Mode<'a, T> {
    /// Discard the whole value set.
    Key,
    /// Remove one value; the set is discarded when it empties.
    Value(&'a T),
}

/// Result of a removal below some node.
struct Outcome {
    /// The key's value set was dropped, so the tree holds one terminal
    /// fewer.
    terminal_dropped: bool,
    /// The node the call ran on is now valueless and childless and should
    /// be unlinked by its parent.
    prune: bool,
}

impl Outcome {
    const NOT_FOUND: Outcome = Outcome {
        terminal_dropped: false,
        prune: false,
    };
}

/// Drop the value set stored under `key`. Returns `true` if the key was
/// present; an absent key is a no-op.
pub(crate) fn remove_key<T: Eq + Hash>(root: &mut Option<ArtNode<T>>, key: &[u8]) -> bool {
    remove(root, key, &Mode::Key)
}

/// Remove one value from the set stored under `key`. Returns `true` if this
/// removed the key's last value; absent keys and absent values are no-ops.
pub(crate) fn remove_value<T: Eq + Hash>(
    root: &mut Option<ArtNode<T>>,
    key: &[u8],
    value: &T,
) -> bool {
    remove(root, key, &Mode::Value(value))
}

fn remove<T: Eq + Hash>(root: &mut Option<ArtNode<T>>, key: &[u8], mode: &Mode<'_, T>) -> bool {
    let outcome = match root {
        Some(node) => remove_rec(node, key, 0, mode),
        None => return false,
    };
    if outcome.prune {
        *root = None;
    }
    outcome.terminal_dropped
}

fn remove_rec<T: Eq + Hash>(
    node: &mut ArtNode<T>,
    key: &[u8],
    depth: usize,
    mode: &Mode<'_, T>,
) -> Outcome {
    let prefix_len = node.header().prefix_len();
    let rest = &key[depth..];
    let lcp = common_prefix_len(node.header().prefix(), rest);
    if lcp < prefix_len {
        return Outcome::NOT_FOUND;
    }
    if lcp == rest.len() {
        let header = node.header_mut();
        let terminal_dropped = match mode {
            Mode::Key => header.take_value().is_some(),
            Mode::Value(value) => header.remove_value(value),
        };
        let prune = terminal_dropped && node.header().num_children() == 0;
        if terminal_dropped && !prune {
            // A former terminal left with a single child is a pure pass-
            // through edge now; fold it into the child where possible.
            try_collapse(node);
        }
        return Outcome {
            terminal_dropped,
            prune,
        };
    }

    let next_depth = depth + prefix_len;
    let key_byte = key[next_depth];
    let outcome = match node.lookup_child_mut(key_byte) {
        Some(child) => remove_rec(child, key, next_depth, mode),
        None => return Outcome::NOT_FOUND,
    };
    if outcome.prune {
        node.remove_child(key_byte);
        if node.should_shrink() {
            node.update_in_place(ArtNode::shrink);
        }
        try_collapse(node);
    }
    Outcome {
        terminal_dropped: outcome.terminal_dropped,
        prune: !node.header().has_value() && node.header().num_children() == 0,
    }
}

/// Collapse a valueless single-child node into that child by concatenating
/// prefixes, provided the merged prefix still fits inline. An overlong
/// merge leaves the chain as is.
fn try_collapse<T>(node: &mut ArtNode<T>) {
    if node.header().has_value() || node.header().num_children() != 1 {
        return;
    }
    let (branch_byte, merged_len) = {
        let children = node.children_in_order();
        let (branch_byte, child) = children[0];
        (
            branch_byte,
            node.header().prefix_len() + child.header().prefix_len(),
        )
    };
    if merged_len > MAX_PREFIX_LEN {
        return;
    }
    node.update_in_place(|mut parent| {
        let mut child = parent.remove_child(branch_byte);
        child.header_mut().prepend_prefix(parent.header().prefix());
        child
    });
}
