//! Test-only structural checker.
//!
//! Walks a whole tree and verifies the invariants the node family and the
//! mutation algorithms promise each other. Mutation tests run this after
//! every interesting step, so a bug that corrupts structure without (yet)
//! corrupting query results still fails loudly.

use crate::nodes::representation::{ArtNode, MAX_PREFIX_LEN};

/// A violated structural invariant, with the path at which it was found.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MalformedTreeError {
    /// A non-root node has an empty inline prefix, which would make its
    /// branch byte unrepresentable.
    EmptyPrefixBelowRoot { path: Vec<u8> },
    /// A child's first prefix byte disagrees with the byte its parent
    /// addresses it under.
    BranchByteMismatch {
        path: Vec<u8>,
        branch_byte: u8,
        prefix_byte: u8,
    },
    /// An inline prefix is longer than the inline limit.
    PrefixTooLong { path: Vec<u8>, len: usize },
    /// A node's recorded child count disagrees with its populated slots.
    WrongChildCount {
        path: Vec<u8>,
        recorded: usize,
        actual: usize,
    },
    /// A node references more children than its variant allows.
    CapacityExceeded { path: Vec<u8>, count: usize },
    /// Two children branch off under the same byte.
    DuplicateBranchByte { path: Vec<u8>, branch_byte: u8 },
    /// A byte with no child entry is answered positively, or a byte with an
    /// entry negatively, by the variant's lookup strategy.
    LookupDisagreesWithEntries { path: Vec<u8>, key_byte: u8 },
    /// A node stores an empty value set; emptied sets must be dropped.
    EmptyValueSet { path: Vec<u8> },
    /// The number of terminals does not match the tracked key count.
    WrongKeyCount { expected: usize, actual: usize },
}

/// Check every structural invariant of the tree and that the number of
/// terminals equals `expected_keys`.
pub(crate) fn check_tree<T>(
    root: &Option<ArtNode<T>>,
    expected_keys: usize,
) -> Result<(), MalformedTreeError> {
    let mut terminals = 0;
    if let Some(root) = root {
        let mut path = Vec::new();
        check_node(root, &mut path, true, &mut terminals)?;
    }
    if terminals != expected_keys {
        return Err(MalformedTreeError::WrongKeyCount {
            expected: expected_keys,
            actual: terminals,
        });
    }
    Ok(())
}

fn check_node<T>(
    node: &ArtNode<T>,
    path: &mut Vec<u8>,
    is_root: bool,
    terminals: &mut usize,
) -> Result<(), MalformedTreeError> {
    let prefix = node.header().prefix();
    if prefix.len() > MAX_PREFIX_LEN {
        return Err(MalformedTreeError::PrefixTooLong {
            path: path.clone(),
            len: prefix.len(),
        });
    }
    if !is_root && prefix.is_empty() {
        return Err(MalformedTreeError::EmptyPrefixBelowRoot { path: path.clone() });
    }
    path.extend_from_slice(prefix);

    if let Some(set) = node.header().value() {
        if set.is_empty() {
            let err = MalformedTreeError::EmptyValueSet { path: path.clone() };
            path.truncate(path.len() - prefix.len());
            return Err(err);
        }
        *terminals += 1;
    }

    let result = check_children(node, path, terminals);
    let prefix_len = node.header().prefix_len();
    path.truncate(path.len() - prefix_len);
    result
}

fn check_children<T>(
    node: &ArtNode<T>,
    path: &mut Vec<u8>,
    terminals: &mut usize,
) -> Result<(), MalformedTreeError> {
    let entries = node.children_in_order();
    if entries.len() != node.header().num_children() {
        return Err(MalformedTreeError::WrongChildCount {
            path: path.clone(),
            recorded: node.header().num_children(),
            actual: entries.len(),
        });
    }
    if entries.len() > node.node_type().max_children() {
        return Err(MalformedTreeError::CapacityExceeded {
            path: path.clone(),
            count: entries.len(),
        });
    }
    for pair in entries.windows(2) {
        if pair[0].0 >= pair[1].0 {
            return Err(MalformedTreeError::DuplicateBranchByte {
                path: path.clone(),
                branch_byte: pair[1].0,
            });
        }
    }
    for (branch_byte, child) in &entries {
        let first = child.header().prefix().first().copied();
        if first != Some(*branch_byte) {
            return Err(MalformedTreeError::BranchByteMismatch {
                path: path.clone(),
                branch_byte: *branch_byte,
                prefix_byte: first.unwrap_or(0),
            });
        }
    }
    // The variant's own lookup strategy (linear scan, bitmap plus binary
    // search, or direct indexing) must agree byte for byte with the entry
    // list in both directions.
    let mut present = [false; 256];
    for (branch_byte, _) in &entries {
        present[usize::from(*branch_byte)] = true;
    }
    for key_byte in 0..=255u8 {
        if node.lookup_child(key_byte).is_some() != present[usize::from(key_byte)] {
            return Err(MalformedTreeError::LookupDisagreesWithEntries {
                path: path.clone(),
                key_byte,
            });
        }
    }
    for (_, child) in entries {
        check_node(child, path, false, terminals)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::operations::insert::insert;

    #[test]
    fn accepts_an_empty_tree() {
        assert_eq!(check_tree::<i32>(&None, 0), Ok(()));
    }

    #[test]
    fn accepts_a_grown_tree() {
        let mut root = None;
        for byte in 0..60u8 {
            insert(&mut root, &[byte, byte ^ 0x55], i32::from(byte));
        }
        check_tree(&root, 60).unwrap();
    }

    #[test]
    fn rejects_a_wrong_key_count() {
        let mut root = None;
        insert(&mut root, b"a", 1);
        assert_eq!(
            check_tree(&root, 2),
            Err(MalformedTreeError::WrongKeyCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_a_branch_byte_mismatch() {
        // Corrupt a child of an inner node, whose branch byte is recorded
        // in the parent's key array.
        let mut root: Option<ArtNode<i32>> = None;
        insert(&mut root, b"ka", 1);
        insert(&mut root, b"kb", 2);
        let root_node = root.as_mut().unwrap();
        let child = root_node.lookup_child_mut(b'a').unwrap();
        child.header_mut().set_prefix(b"z");
        assert!(matches!(
            check_tree(&root, 2),
            Err(MalformedTreeError::BranchByteMismatch { .. })
        ));
    }

    #[test]
    fn rejects_an_empty_value_set() {
        let mut root: Option<ArtNode<i32>> = None;
        insert(&mut root, b"a", 1);
        root.as_mut()
            .unwrap()
            .header_mut()
            .value = Some(Box::new(crate::set::ValueSet::new()));
        assert_eq!(
            check_tree(&root, 1),
            Err(MalformedTreeError::EmptyValueSet { path: b"a".to_vec() })
        );
    }

    #[test]
    fn rejects_an_empty_prefix_below_the_root() {
        let mut root: Option<ArtNode<i32>> = None;
        insert(&mut root, b"ka", 1);
        insert(&mut root, b"kb", 2);
        let root_node = root.as_mut().unwrap();
        let child = root_node.lookup_child_mut(b'a').unwrap();
        child.header_mut().set_prefix(b"");
        assert!(matches!(
            check_tree(&root, 2),
            Err(MalformedTreeError::EmptyPrefixBelowRoot { .. })
                | Err(MalformedTreeError::BranchByteMismatch { .. })
        ));
    }

    #[test]
    fn rejects_a_corrupted_child_count() {
        // The leaf stores its count separately from its child slot, so a
        // bad count is observable there.
        let mut root: Option<ArtNode<i32>> = None;
        insert(&mut root, b"ab", 1);
        insert(&mut root, b"abc", 2);
        root.as_mut().unwrap().header_mut().num_children = 7;
        assert!(matches!(
            check_tree(&root, 2),
            Err(MalformedTreeError::WrongChildCount { .. })
        ));
    }
}
