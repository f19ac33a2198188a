//! Path extraction over the link tree: the unique sequence of links connecting
//! two nodes, with per-segment direction bookkeeping.
//!
//! A path that connects two links in a tree always climbs first (toward the
//! common ancestor) and then descends, so the upward segments form a prefix of
//! the sequence. That makes the direction of any segment recoverable from a
//! single counter: segment `i` is downward (parent-to-child in sequence order)
//! exactly when `i >= num_upward_connections`. The Jacobian sign and the joint
//! velocity contribution of every crossed joint depend on this direction.

use crate::link::{LinkId, LinkTree};

/// Ordered sequence of links connecting two nodes of a [`LinkTree`].
#[derive(Clone, Debug, Default)]
pub struct LinkPath {
    links: Vec<LinkId>,
    num_upward: usize,
}

impl LinkPath {
    pub fn new() -> Self {
        LinkPath {
            links: Vec::new(),
            num_upward: 0,
        }
    }

    /// Path between two arbitrary links, empty if `end` is not reachable.
    pub fn between(tree: &LinkTree, root: LinkId, end: LinkId) -> Self {
        let mut path = LinkPath::new();
        path.find(tree, root, end);
        path
    }

    /// Path from the tree root down to `end`.
    pub fn from_root(tree: &LinkTree, end: LinkId) -> Self {
        let mut path = LinkPath::new();
        path.find_from_root(tree, end);
        path
    }

    /// Depth-first search from `root` to `end`, children first in sibling
    /// order, then the parent, never re-entering the node just arrived from.
    /// On failure the buffer is left empty and `false` is returned; the search
    /// terminates cleanly even when `end` lives in a different tree of the
    /// arena.
    pub fn find(&mut self, tree: &LinkTree, root: LinkId, end: LinkId) -> bool {
        self.links.clear();
        self.num_upward = 0;
        let found = self.find_sub(tree, root, None, end, false);
        if !found {
            self.links.clear();
        }
        found
    }

    fn find_sub(
        &mut self,
        tree: &LinkTree,
        link: LinkId,
        prev: Option<LinkId>,
        end: LinkId,
        upward: bool,
    ) -> bool {
        self.links.push(link);
        if upward {
            self.num_upward += 1;
        }

        if link == end {
            return true;
        }

        let mut child = tree.link(link).child;
        while let Some(c) = child {
            if Some(c) != prev && self.find_sub(tree, c, Some(link), end, false) {
                return true;
            }
            child = tree.link(c).sibling;
        }

        if let Some(parent) = tree.link(link).parent {
            if Some(parent) != prev && self.find_sub(tree, parent, Some(link), end, true) {
                return true;
            }
        }

        // Failed branch: the pop and the counter unwind stay paired so no
        // partial garbage survives backtracking.
        self.links.pop();
        if upward {
            self.num_upward -= 1;
        }
        false
    }

    /// Climbs from `end` up to the tree root and reverses, so the result runs
    /// root to end. The whole path is a single downward chain, hence the
    /// upward counter is zero.
    pub fn find_from_root(&mut self, tree: &LinkTree, end: LinkId) {
        self.links.clear();
        self.num_upward = 0;
        let mut current = Some(end);
        while let Some(id) = current {
            self.links.push(id);
            current = tree.link(id).parent;
        }
        self.links.reverse();
    }

    /// Whether the pair at positions `i`/`i + 1` reflects a parent-to-child
    /// relation when read in sequence order.
    pub fn is_downward(&self, i: usize) -> bool {
        i >= self.num_upward
    }

    /// Count of segments traversed from a link toward its parent.
    pub fn num_upward_connections(&self) -> usize {
        self.num_upward
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link(&self, i: usize) -> LinkId {
        self.links[i]
    }

    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    pub fn root_link(&self) -> Option<LinkId> {
        self.links.first().copied()
    }

    pub fn end_link(&self) -> Option<LinkId> {
        self.links.last().copied()
    }
}
