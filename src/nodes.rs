//! Internal tree machinery: the node family, the algorithms over it, and
//! the test-only structural checker.

pub(crate) mod bitmap;
pub(crate) mod operations;
pub(crate) mod representation;
#[cfg(test)]
pub(crate) mod visitor;
