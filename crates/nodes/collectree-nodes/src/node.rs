//! Collection nodes.
//!
//! Nodes are built top-down from a session root. The named constructors
//! ([`Node::from_parent`], [`Node::from_parent_path`]) derive everything a
//! child needs from its parent. [`Node::create`] is the legacy direct
//! constructor: whatever it has to borrow from the parent is reported with a
//! deprecation warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use collectree_warnings::deprecated::NODE_IMPLIED_CTOR_ARG;
use collectree_warnings::{Warning, WarningError, WarningRecord, WarningSink};

use crate::node_id::NodeId;
use crate::path::nodeid_for_path;

/// State shared by every node of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    rootdir: PathBuf,
    initial_paths: Vec<PathBuf>,
}

impl Session {
    pub fn new(rootdir: impl Into<PathBuf>, initial_paths: Vec<PathBuf>) -> Self {
        Self {
            rootdir: rootdir.into(),
            initial_paths,
        }
    }

    pub fn rootdir(&self) -> &Path {
        &self.rootdir
    }

    pub fn initial_paths(&self) -> &[PathBuf] {
        &self.initial_paths
    }
}

/// Arguments of [`Node::create`]. Anything left `None` is implied from the
/// parent and reported.
#[derive(Debug, Clone, Default)]
pub struct NodeArgs {
    pub name: String,
    pub nodeid: Option<NodeId>,
    pub fs_path: Option<PathBuf>,
    pub session: Option<Arc<Session>>,
}

impl NodeArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_nodeid(mut self, nodeid: impl Into<NodeId>) -> Self {
        self.nodeid = Some(nodeid.into());
        self
    }

    pub fn with_fs_path(mut self, fs_path: impl Into<PathBuf>) -> Self {
        self.fs_path = Some(fs_path.into());
        self
    }

    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }
}

#[derive(Debug)]
pub struct Node {
    name: String,
    nodeid: NodeId,
    fs_path: Option<PathBuf>,
    parent: Option<Arc<Node>>,
    session: Arc<Session>,
}

impl Node {
    /// Root of the tree; its node id is empty and its path is the rootdir.
    pub fn session_root(session: Arc<Session>) -> Arc<Node> {
        let name = session
            .rootdir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Arc::new(Node {
            name,
            nodeid: NodeId::root(),
            fs_path: Some(session.rootdir().to_path_buf()),
            parent: None,
            session,
        })
    }

    /// Child item named `name`; its id is `parent::name`.
    pub fn from_parent(parent: &Arc<Node>, name: &str) -> Arc<Node> {
        Arc::new(Node {
            name: name.to_string(),
            nodeid: parent.nodeid.join_item(name),
            fs_path: parent.fs_path.clone(),
            parent: Some(Arc::clone(parent)),
            session: Arc::clone(&parent.session),
        })
    }

    /// Child collected from `path`; its id is derived from the path.
    pub fn from_parent_path(parent: &Arc<Node>, path: &Path) -> Arc<Node> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Arc::new(Node {
            name,
            nodeid: nodeid_for_path(&parent.session, path),
            fs_path: Some(path.to_path_buf()),
            parent: Some(Arc::clone(parent)),
            session: Arc::clone(&parent.session),
        })
    }

    /// Direct constructor. Each of `nodeid`, `fs_path` and `session` that is
    /// missing from `args` is taken from `parent` and emits
    /// `NODE_IMPLIED_CTOR_ARG` into `sink`.
    pub fn create(
        parent: &Arc<Node>,
        args: NodeArgs,
        sink: &dyn WarningSink,
    ) -> Result<Arc<Node>, WarningError> {
        let NodeArgs {
            name,
            nodeid,
            fs_path,
            session,
        } = args;

        let mut implied: Vec<&'static str> = Vec::new();
        let nodeid = nodeid.unwrap_or_else(|| {
            implied.push("nodeid");
            parent.nodeid.join_item(&name)
        });
        let fs_path = match fs_path {
            Some(path) => Some(path),
            None => {
                implied.push("fs_path");
                parent.fs_path.clone()
            }
        };
        let session = session.unwrap_or_else(|| {
            implied.push("session");
            Arc::clone(&parent.session)
        });

        for arg in implied {
            log::debug!("node {nodeid:?}: implying {arg} from parent");
            let warning = NODE_IMPLIED_CTOR_ARG.format(&[("arg", arg)])?;
            sink.emit(WarningRecord::at(warning, nodeid.as_str()))?;
        }

        Ok(Arc::new(Node {
            name,
            nodeid,
            fs_path,
            parent: Some(Arc::clone(parent)),
            session,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodeid(&self) -> &NodeId {
        &self.nodeid
    }

    pub fn fs_path(&self) -> Option<&Path> {
        self.fs_path.as_deref()
    }

    pub fn parent(&self) -> Option<&Arc<Node>> {
        self.parent.as_ref()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Nodes from the root down to `self`.
    pub fn chain(&self) -> Vec<&Node> {
        let mut chain = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(node) = current {
            chain.push(node);
            current = node.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Emit `warning` attributed to this node. Any category is accepted.
    pub fn warn(&self, warning: Warning, sink: &dyn WarningSink) -> Result<(), WarningError> {
        let location = match &self.fs_path {
            Some(path) => path.display().to_string(),
            None => self.nodeid.to_string(),
        };
        sink.emit(WarningRecord::at(warning, location))
    }
}
