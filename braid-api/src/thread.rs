//! Converts the flat, parent-referencing comment list into a bounded-depth
//! reply tree, and computes nesting depth from the parent chain.

use std::collections::{HashMap, HashSet};

use crate::{Comment, CommentId, MAX_DEPTH};

/// Client-side materialization of one comment and its replies. Built fresh
/// from the flat list on every load, never persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub record: Comment,
    /// Number of ancestors; roots are 0. Assigned during tree assembly.
    pub depth: u32,
    /// Replies, in the order the flat list listed them.
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Depth-first search for a node, anywhere in the forest. The one tree
    /// walk shared by vote, delete, reply insertion and id reconciliation.
    pub fn find_in(nodes: &mut [CommentNode], id: CommentId) -> Option<&mut CommentNode> {
        for n in nodes.iter_mut() {
            if n.record.id == id {
                return Some(n);
            }
            if let Some(found) = CommentNode::find_in(&mut n.children, id) {
                return Some(found);
            }
        }
        None
    }

    /// Detaches a node (with its subtree) from the forest and returns it.
    pub fn remove_in(nodes: &mut Vec<CommentNode>, id: CommentId) -> Option<CommentNode> {
        if let Some(pos) = nodes.iter().position(|n| n.record.id == id) {
            return Some(nodes.remove(pos));
        }
        for n in nodes.iter_mut() {
            if let Some(removed) = CommentNode::remove_in(&mut n.children, id) {
                return Some(removed);
            }
        }
        None
    }

    /// All ids of the forest in depth-first order.
    pub fn flatten(nodes: &[CommentNode]) -> Vec<CommentId> {
        let mut ids = Vec::new();
        for n in nodes {
            ids.push(n.record.id);
            ids.extend(CommentNode::flatten(&n.children));
        }
        ids
    }
}

/// Threads a flat list into a forest of [`CommentNode`]s.
///
/// One pass groups records by `parent_id`, one pass assembles, so the whole
/// thing is O(n). Sibling order is the order of the input list; callers
/// wanting chronological siblings sort before calling. Records whose parent
/// is not in the list (and anything beneath them) are unreachable from any
/// root and get dropped, so a partial or inconsistent flat list still
/// threads without failing.
pub fn build_tree(records: Vec<Comment>) -> Vec<CommentNode> {
    let ids: HashSet<CommentId> = records.iter().map(|c| c.id).collect();
    let mut roots: Vec<Comment> = Vec::new();
    let mut by_parent: HashMap<CommentId, Vec<Comment>> = HashMap::new();
    for c in records {
        match c.parent_id {
            None => roots.push(c),
            Some(parent) if ids.contains(&parent) => {
                by_parent.entry(parent).or_insert_with(Vec::new).push(c)
            }
            Some(_) => (), // dangling parent
        }
    }
    roots
        .into_iter()
        .map(|c| attach_children(c, 0, &mut by_parent))
        .collect()
}

fn attach_children(
    record: Comment,
    depth: u32,
    by_parent: &mut HashMap<CommentId, Vec<Comment>>,
) -> CommentNode {
    let children = by_parent
        .remove(&record.id)
        .unwrap_or_default()
        .into_iter()
        .map(|c| attach_children(c, depth + 1, by_parent))
        .collect();
    CommentNode {
        record,
        depth,
        children,
    }
}

/// Number of ancestor hops from `target` to its root, or `None` if `target`
/// is not in `records`.
///
/// Traversal stops after `MAX_DEPTH + 1` hops: a chain that long can never
/// host a reply anyway, and the cap keeps a malformed (cyclic) chain from
/// looping. Callers treat any returned depth above [`MAX_DEPTH`] as "too
/// deep" without caring about the exact count.
pub fn compute_depth(records: &[Comment], target: CommentId) -> Option<u32> {
    let by_id: HashMap<CommentId, &Comment> = records.iter().map(|c| (c.id, c)).collect();
    let mut current = *by_id.get(&target)?;
    let mut depth = 0;
    while let Some(parent) = current.parent_id {
        depth += 1;
        if depth > MAX_DEPTH {
            return Some(depth);
        }
        match by_id.get(&parent) {
            Some(c) => current = *c,
            // broken chain: the hop exists but its end does not
            None => break,
        }
    }
    Some(depth)
}
