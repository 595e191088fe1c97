//! Flat-to-tree materialization.
//!
//! Notes arrive from the service as a flat list where each entry points at its
//! parent. [`build_tree`] turns that list into nested [`TreeNode`]s:
//!
//! - an entry whose parent equals the configured root value is top level,
//! - an entry whose parent is present becomes that parent's child,
//! - an entry whose parent is missing from the list is promoted to top level.
//!
//! Each entry is placed by a single parent lookup, so malformed input with a
//! parent cycle cannot loop; entries on a detached cycle are simply not
//! reachable from any top-level node. Building, counting and dropping use
//! explicit work stacks, so tree depth is not bounded by the call stack.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::models::{Note, NoteId};

/// An entity that knows its own identifier and its parent's.
pub trait TreeItem {
    type Id: Eq + Hash + Clone;

    fn id(&self) -> Self::Id;
    fn parent_id(&self) -> Option<Self::Id>;
}

impl TreeItem for Note {
    type Id = NoteId;

    fn id(&self) -> NoteId {
        self.id
    }

    fn parent_id(&self) -> Option<NoteId> {
        self.parent_id
    }
}

type Compare<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;
type Comparator<T> = Box<Compare<T>>;

/// Root value and sibling ordering for [`build_tree`]
pub struct TreeOptions<T: TreeItem> {
    /// Parent value marking top-level entries; `None` by default
    pub root_parent_id: Option<T::Id>,
    sort_by: Option<Comparator<T>>,
}

impl<T: TreeItem> Default for TreeOptions<T> {
    fn default() -> Self {
        Self {
            root_parent_id: None,
            sort_by: None,
        }
    }
}

impl<T: TreeItem> TreeOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(mut self, root_parent_id: T::Id) -> Self {
        self.root_parent_id = Some(root_parent_id);
        self
    }

    /// Order siblings with `compare`; applied to every level independently.
    #[must_use]
    pub fn sort_by(mut self, compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.sort_by = Some(Box::new(compare));
        self
    }
}

impl TreeOptions<Note> {
    /// Top-level notes, siblings ordered by position then id.
    pub fn notes_by_position() -> Self {
        Self::new().sort_by(Note::sibling_order)
    }
}

/// An entity plus its ordered children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub const fn leaf(item: T) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        self.depth_first().count()
    }

    /// Pre-order walk yielding `(depth, item)`; this node is depth 0.
    pub fn depth_first(&self) -> DepthFirst<'_, T> {
        DepthFirst {
            stack: vec![(0, self)],
        }
    }
}

impl<T> Drop for TreeNode<T> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Total node count across a forest.
pub fn tree_node_count<T>(nodes: &[TreeNode<T>]) -> usize {
    nodes.iter().map(TreeNode::node_count).sum()
}

/// Pre-order walk across a forest, yielding `(depth, item)`.
pub fn walk_forest<T>(nodes: &[TreeNode<T>]) -> impl Iterator<Item = (usize, &T)> {
    nodes.iter().flat_map(TreeNode::depth_first)
}

pub struct DepthFirst<'a, T> {
    stack: Vec<(usize, &'a TreeNode<T>)>,
}

impl<'a, T> Iterator for DepthFirst<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, &node.item))
    }
}

/// Build a nested tree from a flat, parent-referencing list.
///
/// The input is not modified; entries are cloned into the returned nodes.
pub fn build_tree<T>(items: &[T], options: &TreeOptions<T>) -> Vec<TreeNode<T>>
where
    T: TreeItem + Clone,
{
    let index: HashMap<T::Id, usize> = items
        .iter()
        .enumerate()
        .map(|(position, item)| (item.id(), position))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut top_level = Vec::new();

    for (position, item) in items.iter().enumerate() {
        let parent = item.parent_id();
        if parent == options.root_parent_id {
            top_level.push(position);
        } else if let Some(parent) = parent {
            match index.get(&parent) {
                Some(&parent_position) => children[parent_position].push(position),
                None => top_level.push(position),
            }
        }
        // A null parent under a non-null root value matches no rule.
    }

    materialize(&top_level, items, &children, options.sort_by.as_deref())
}

/// Clone the placed entries into nodes, children before their parents.
fn materialize<T: Clone>(
    top_level: &[usize],
    items: &[T],
    children: &[Vec<usize>],
    compare: Option<&Compare<T>>,
) -> Vec<TreeNode<T>> {
    let mut preorder = Vec::new();
    let mut pending = top_level.to_vec();
    while let Some(position) = pending.pop() {
        preorder.push(position);
        pending.extend_from_slice(&children[position]);
    }

    let mut built: Vec<Option<TreeNode<T>>> =
        std::iter::repeat_with(|| None).take(items.len()).collect();
    for &position in preorder.iter().rev() {
        let nodes = collect_level(&children[position], &mut built, compare);
        built[position] = Some(TreeNode {
            item: items[position].clone(),
            children: nodes,
        });
    }
    collect_level(top_level, &mut built, compare)
}

fn collect_level<T>(
    positions: &[usize],
    built: &mut [Option<TreeNode<T>>],
    compare: Option<&Compare<T>>,
) -> Vec<TreeNode<T>> {
    let mut nodes: Vec<TreeNode<T>> = positions
        .iter()
        .filter_map(|&position| built[position].take())
        .collect();
    if let Some(compare) = compare {
        nodes.sort_by(|a, b| compare(&a.item, &b.item));
    }
    nodes
}
