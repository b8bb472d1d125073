//! Index of collected node ids with their parent/child links.
//!
//! Inserting a node id materializes every ancestor the splitter reports, so
//! the index always holds complete chains from the root down.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::node_id::{AncestorKind, Ancestors, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: AncestorKind,
    pub parent: Option<NodeId>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct NodeTree {
    entries: HashMap<NodeId, TreeEntry>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Empty tree holding only the root.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            NodeId::root(),
            TreeEntry {
                kind: AncestorKind::Root,
                parent: None,
                children: Vec::new(),
            },
        );
        Self { entries }
    }

    /// Insert `nodeid` and all of its ancestors. Returns how many entries
    /// were created.
    pub fn insert(&mut self, nodeid: &str) -> usize {
        let mut created = 0;
        let mut parent: Option<&str> = None;
        for ancestor in Ancestors::new(nodeid) {
            if !self.entries.contains_key(ancestor.id) {
                let parent_id = parent.map(NodeId::from);
                if let Some(p) = parent_id.as_ref() {
                    if let Some(entry) = self.entries.get_mut(p.as_str()) {
                        entry.children.push(NodeId::from(ancestor.id));
                    }
                }
                self.entries.insert(
                    NodeId::from(ancestor.id),
                    TreeEntry {
                        kind: ancestor.kind,
                        parent: parent_id,
                        children: Vec::new(),
                    },
                );
                created += 1;
            }
            parent = Some(ancestor.id);
        }
        if created > 0 {
            log::trace!("node tree: inserted {nodeid:?} ({created} new entries)");
        }
        created
    }

    pub fn get(&self, nodeid: &str) -> Option<&TreeEntry> {
        self.entries.get(nodeid)
    }

    pub fn contains(&self, nodeid: &str) -> bool {
        self.entries.contains_key(nodeid)
    }

    pub fn children(&self, nodeid: &str) -> &[NodeId] {
        self.entries
            .get(nodeid)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Ids of `nodeid`'s chain (root first) that are present in the tree.
    pub fn ancestors<'a>(&'a self, nodeid: &'a str) -> impl Iterator<Item = &'a NodeId> + 'a {
        Ancestors::new(nodeid).filter_map(move |a| self.entries.get_key_value(a.id).map(|(k, _)| k))
    }

    /// Entries without children, excluding an otherwise empty root.
    pub fn leaves(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.entries
            .iter()
            .filter(|(id, e)| e.children.is_empty() && !id.is_root())
            .map(|(id, _)| id)
    }

    /// Depth-first walk from the root in insertion order.
    pub fn walk(&self) -> Vec<&NodeId> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<&NodeId> = self
            .entries
            .get_key_value("")
            .map(|(k, _)| k)
            .into_iter()
            .collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id.as_str()).iter().rev());
        }
        out
    }

    /// Number of entries, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only the root is present.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }
}

impl<'a> FromIterator<&'a str> for NodeTree {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tree = NodeTree::new();
        for id in iter {
            tree.insert(id);
        }
        tree
    }
}

/// Serialized form: the leaf ids in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub nodeids: Vec<NodeId>,
}

impl From<&NodeTree> for TreeSnapshot {
    fn from(tree: &NodeTree) -> Self {
        let nodeids = tree
            .walk()
            .into_iter()
            .filter(|id| tree.children(id.as_str()).is_empty() && !id.is_root())
            .cloned()
            .collect();
        TreeSnapshot { nodeids }
    }
}

impl From<&TreeSnapshot> for NodeTree {
    fn from(snapshot: &TreeSnapshot) -> Self {
        snapshot.nodeids.iter().map(NodeId::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_creates_missing_ancestors_once() {
        let mut tree = NodeTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.insert("a/b.py::C::t"), 4);
        assert_eq!(tree.insert("a/b.py::C::u"), 1);
        assert_eq!(tree.insert("a/b.py::C::u"), 0);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.children("a/b.py::C"), ["a/b.py::C::t", "a/b.py::C::u"]);
        assert_eq!(tree.get("a/b.py").unwrap().kind, AncestorKind::Path);
        assert_eq!(tree.get("a/b.py::C").unwrap().kind, AncestorKind::Item);
        assert_eq!(
            tree.get("a/b.py::C::t").unwrap().parent.as_ref().unwrap(),
            "a/b.py::C"
        );
    }

    #[test]
    fn ancestors_lists_existing_chain() {
        let tree: NodeTree = ["x/y.py::z"].into_iter().collect();
        let chain: Vec<&str> = tree.ancestors("x/y.py::z").map(NodeId::as_str).collect();
        assert_eq!(chain, ["", "x", "x/y.py", "x/y.py::z"]);
        let partial: Vec<&str> = tree.ancestors("x/other.py").map(NodeId::as_str).collect();
        assert_eq!(partial, ["", "x"]);
    }

    #[test]
    fn walk_is_depth_first_in_insertion_order() {
        let tree: NodeTree = ["a/1.py::t", "b.py::t", "a/2.py::t"].into_iter().collect();
        let order: Vec<&str> = tree.walk().into_iter().map(NodeId::as_str).collect();
        assert_eq!(
            order,
            ["", "a", "a/1.py", "a/1.py::t", "a/2.py", "a/2.py::t", "b.py", "b.py::t"]
        );
    }

    #[test]
    fn snapshot_round_trips_leaves() {
        let tree: NodeTree = ["a/1.py::t", "b.py::t"].into_iter().collect();
        let snap = TreeSnapshot::from(&tree);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"nodeids":["a/1.py::t","b.py::t"]}"#);
        let restored = NodeTree::from(&snap);
        assert_eq!(restored.len(), tree.len());
        let mut leaves: Vec<&NodeId> = restored.leaves().collect();
        leaves.sort();
        assert_eq!(leaves, ["a/1.py::t", "b.py::t"]);
    }
}
