use crate::error::{AppError, Result};
use crate::gather::FileEntry;
use indexmap::IndexMap;
use log;
use serde::{Serialize, Serializer};

/// A node of the included-file tree. Children keep insertion order, which is
/// the order files were walked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectoryNode {
    #[serde(rename_all = "camelCase")]
    Leaf { name: String, line_count: usize },
    Directory {
        name: String,
        #[serde(serialize_with = "serialize_children")]
        children: IndexMap<String, DirectoryNode>,
    },
}

// Child names are not valid element names for every format, so the map is
// written as a list; each node already carries its name.
fn serialize_children<S>(
    children: &IndexMap<String, DirectoryNode>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(children.values())
}

impl DirectoryNode {
    /// The unnamed root directory.
    pub fn root() -> Self {
        Self::directory("")
    }

    pub fn directory(name: &str) -> Self {
        DirectoryNode::Directory {
            name: name.to_string(),
            children: IndexMap::new(),
        }
    }

    pub fn leaf(name: &str, line_count: usize) -> Self {
        DirectoryNode::Leaf {
            name: name.to_string(),
            line_count,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DirectoryNode::Leaf { name, .. } | DirectoryNode::Directory { name, .. } => name,
        }
    }

    /// Leaves show their line count, directories just their name.
    pub fn display_name(&self) -> String {
        match self {
            DirectoryNode::Leaf { name, line_count } => format!("{} ({} lines)", name, line_count),
            DirectoryNode::Directory { name, .. } => name.clone(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DirectoryNode::Leaf { .. })
    }

    pub fn children(&self) -> Option<&IndexMap<String, DirectoryNode>> {
        match self {
            DirectoryNode::Directory { children, .. } => Some(children),
            DirectoryNode::Leaf { .. } => None,
        }
    }

    /// Returns the child directory `name`, creating it if absent.
    pub fn child_directory(&mut self, name: &str) -> Result<&mut DirectoryNode> {
        match self {
            DirectoryNode::Directory { children, .. } => {
                let child = children
                    .entry(name.to_string())
                    .or_insert_with(|| DirectoryNode::directory(name));
                if child.is_leaf() {
                    return Err(AppError::TreeConflict(format!(
                        "'{}' is a file and cannot contain other entries",
                        name
                    )));
                }
                Ok(child)
            }
            DirectoryNode::Leaf { name: leaf, .. } => Err(AppError::TreeConflict(format!(
                "cannot add '{}' under file '{}'",
                name, leaf
            ))),
        }
    }

    /// Inserts a leaf at the `/`-separated `path`, creating intermediate
    /// directories.
    pub fn insert_file(&mut self, path: &str, line_count: usize) -> Result<()> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.pop() else {
            return Err(AppError::TreeConflict(format!("empty file path '{}'", path)));
        };

        let mut node = self;
        for segment in segments {
            node = node.child_directory(segment)?;
        }

        match node {
            DirectoryNode::Directory { children, .. } => {
                if children.get(file_name).is_some_and(|existing| !existing.is_leaf()) {
                    return Err(AppError::TreeConflict(format!(
                        "file '{}' would replace a directory",
                        path
                    )));
                }
                children.insert(file_name.to_string(), DirectoryNode::leaf(file_name, line_count));
                Ok(())
            }
            DirectoryNode::Leaf { name, .. } => Err(AppError::TreeConflict(format!(
                "cannot add '{}' under file '{}'",
                path, name
            ))),
        }
    }

    /// `/`-joined paths of every leaf below this node, in display order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(children) = self.children() {
            for child in children.values() {
                child.collect_leaf_paths("", &mut paths);
            }
        }
        paths
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        let path = if prefix.is_empty() {
            self.name().to_string()
        } else {
            format!("{}/{}", prefix, self.name())
        };
        match self {
            DirectoryNode::Leaf { .. } => out.push(path),
            DirectoryNode::Directory { children, .. } => {
                for child in children.values() {
                    child.collect_leaf_paths(&path, out);
                }
            }
        }
    }

    /// This node and everything below it, one `- name` line per node indented
    /// two spaces per level starting at `depth`.
    pub fn render(&self, depth: usize) -> String {
        let mut out = String::new();
        self.render_into(depth, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str("- ");
        out.push_str(&self.display_name());
        out.push('\n');
        if let Some(children) = self.children() {
            for child in children.values() {
                child.render_into(depth + 1, out);
            }
        }
    }
}

pub fn build_tree(entries: &[FileEntry]) -> Result<DirectoryNode> {
    log::debug!("Building structure tree from {} file(s)", entries.len());
    let mut root = DirectoryNode::root();
    for entry in entries {
        root.insert_file(&entry.path, entry.line_count)?;
    }
    Ok(root)
}

/// Renders the children of `root`; the root itself has no line.
pub fn render_tree(root: &DirectoryNode) -> String {
    let mut out = String::new();
    if let Some(children) = root.children() {
        for child in children.values() {
            child.render_into(0, &mut out);
        }
    }
    out
}
