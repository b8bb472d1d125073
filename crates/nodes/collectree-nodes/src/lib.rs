//! collectree-nodes: node ids and the collection tree built from them.

pub mod error;
pub mod inifile;
pub mod node;
pub mod node_id;
pub mod path;
pub mod rootdir;
pub mod tree;

pub use error::SetupError;
pub use inifile::{load_config_dict_from_file, ConfigLoader, IniConfig, IniValue};
pub use node::{Node, NodeArgs, Session};
pub use node_id::{iter_parent_node_ids, Ancestor, AncestorKind, Ancestors, NodeId, ParentNodeIds};
pub use path::{initial_path_relpath, nodeid_for_path};
pub use rootdir::{
    common_ancestor, determine_rootdir, determine_setup, dirs_from_args, locate_config, RootDirSetup,
};
pub use tree::{NodeTree, TreeEntry, TreeSnapshot};
