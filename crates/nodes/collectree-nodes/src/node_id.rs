//! NodeId parsing and ancestor enumeration.
//!
//! Grammar:
//!   path/to/file.py::Class::test
//! - '/' separates path segments
//! - '::' separates item qualifiers, and is only honoured once no '/' is left
//!   to consume, i.e. inside the last '/'-separated segment
//! - a single ':' is an ordinary character
//!
//! Examples:
//!   "a/b/c::D::eee" -> "", "a", "a/b", "a/b/c", "a/b/c::D", "a/b/c::D::eee"
//!   "a/b/c::D/d::e" -> "", "a", "a/b", "a/b/c::D", "a/b/c::D/d", "a/b/c::D/d::e"
//!
//! Every ancestor is a prefix of the id, so iteration borrows from the input
//! and never allocates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

pub const PATH_SEP: &str = "/";
pub const ITEM_SEP: &str = "::";

/// How an ancestor id was reached while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorKind {
    /// The empty id every node descends from.
    Root,
    /// Named by a path segment (directories, files, packages).
    Path,
    /// Named after a '::' boundary (classes, functions, parametrizations).
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestor<'a> {
    pub id: &'a str,
    pub kind: AncestorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Root,
    Path,
    Item,
    Done,
}

/// Iterator over the ancestors of a node id, root first, the id itself last.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    nodeid: &'a str,
    pos: usize,
    phase: Phase,
    item_seen: bool,
}

impl<'a> Ancestors<'a> {
    pub fn new(nodeid: &'a str) -> Self {
        Self {
            nodeid,
            pos: 0,
            phase: Phase::Root,
            item_seen: false,
        }
    }

    /// Byte offset after the last separator consumed so far.
    fn name_start(&self) -> usize {
        self.pos
    }

    /// Kind of the component that starts at the current position.
    fn current_kind(&self) -> AncestorKind {
        if self.item_seen {
            AncestorKind::Item
        } else {
            AncestorKind::Path
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Ancestor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let sep = match self.phase {
                Phase::Root => {
                    self.phase = Phase::Path;
                    return Some(Ancestor {
                        id: "",
                        kind: AncestorKind::Root,
                    });
                }
                Phase::Path => PATH_SEP,
                Phase::Item => ITEM_SEP,
                Phase::Done => return None,
            };
            match self.nodeid[self.pos..].find(sep) {
                Some(offset) => {
                    let at = self.pos + offset;
                    self.pos = at + sep.len();
                    let kind = self.current_kind();
                    if self.phase == Phase::Item {
                        self.item_seen = true;
                    }
                    // a separator at offset 0 has no non-empty prefix to report
                    if at > 0 {
                        return Some(Ancestor {
                            id: &self.nodeid[..at],
                            kind,
                        });
                    }
                }
                None if self.phase == Phase::Path => self.phase = Phase::Item,
                None => {
                    self.phase = Phase::Done;
                    if !self.nodeid.is_empty() {
                        return Some(Ancestor {
                            id: self.nodeid,
                            kind: self.current_kind(),
                        });
                    }
                }
            }
        }
    }
}

impl FusedIterator for Ancestors<'_> {}

/// Ancestor ids only; see [`iter_parent_node_ids`].
#[derive(Debug, Clone)]
pub struct ParentNodeIds<'a>(Ancestors<'a>);

impl<'a> Iterator for ParentNodeIds<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|a| a.id)
    }
}

impl FusedIterator for ParentNodeIds<'_> {}

/// Ancestor ids of `nodeid`, from `""` up to and including `nodeid`.
///
/// ```
/// use collectree_nodes::iter_parent_node_ids;
///
/// let ids: Vec<&str> = iter_parent_node_ids("a/bbb/c::D").collect();
/// assert_eq!(ids, ["", "a", "a/bbb", "a/bbb/c", "a/bbb/c::D"]);
/// ```
pub fn iter_parent_node_ids(nodeid: &str) -> ParentNodeIds<'_> {
    ParentNodeIds(Ancestors::new(nodeid))
}

/// Identifier of a node in the collection tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the session node.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parents(&self) -> ParentNodeIds<'_> {
        iter_parent_node_ids(&self.0)
    }

    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors::new(&self.0)
    }

    /// Kind of this id as the last step of its own ancestor chain.
    pub fn kind(&self) -> AncestorKind {
        self.ancestors()
            .last()
            .map(|a| a.kind)
            .unwrap_or(AncestorKind::Root)
    }

    /// Closest proper ancestor; `None` for the root.
    pub fn parent(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        let mut prev = None;
        for id in self.parents() {
            if id.len() == self.0.len() {
                break;
            }
            prev = Some(id);
        }
        prev
    }

    /// The last component: the text after the last separator the splitter
    /// consumed.
    pub fn name(&self) -> &str {
        let mut it = self.ancestors();
        for _ in it.by_ref() {}
        &self.0[it.name_start()..]
    }

    /// Everything before the first '::', the part that names a file system path.
    pub fn file_part(&self) -> &str {
        self.0.split(ITEM_SEP).next().unwrap_or("")
    }

    /// True when `self` is a proper ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        self.0.len() < other.0.len() && other.parents().any(|id| id == self.0)
    }

    /// Child reached through a '/' boundary.
    pub fn join_path(&self, name: &str) -> NodeId {
        self.join(PATH_SEP, name)
    }

    /// Child reached through a '::' boundary.
    pub fn join_item(&self, name: &str) -> NodeId {
        self.join(ITEM_SEP, name)
    }

    fn join(&self, sep: &str, name: &str) -> NodeId {
        if self.is_root() {
            return NodeId::new(name);
        }
        let mut id = String::with_capacity(self.0.len() + sep.len() + name.len());
        id.push_str(&self.0);
        id.push_str(sep);
        id.push_str(name);
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NodeId::new(s))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<NodeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(NodeId)
    }
}
