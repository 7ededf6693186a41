//! Walks a generator output root into relative output nodes

use crate::error::SyncError;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Kind of an output node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File { size: u64 },
}

/// A directory or file under the output root, keyed by its relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNode {
    pub relative: PathBuf,
    pub kind: NodeKind,
}

impl OutputNode {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }
}

/// Walker over one output root
pub struct OutputWalker {
    root: PathBuf,
    follow_symlinks: bool,
}

impl OutputWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            follow_symlinks: false,
        }
    }

    /// Follow symbolic links while walking (default: off)
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Collect every node below the root, sorted by relative path.
    ///
    /// The root itself is not returned. Entries that are neither files nor
    /// directories (unfollowed symlinks, sockets) are skipped.
    pub fn walk(&self) -> Result<Vec<OutputNode>, SyncError> {
        let mut nodes = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_symlinks);

        for entry in walker {
            let entry = entry.map_err(|e| SyncError::Walk {
                path: self.root.clone(),
                message: e.to_string(),
            })?;

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| SyncError::OutsideRoot {
                    path: entry.path().to_path_buf(),
                    root: self.root.clone(),
                })?
                .to_path_buf();

            let metadata = entry.metadata().map_err(|e| SyncError::Walk {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;

            if metadata.is_dir() {
                nodes.push(OutputNode {
                    relative,
                    kind: NodeKind::Directory,
                });
            } else if metadata.is_file() {
                nodes.push(OutputNode {
                    relative,
                    kind: NodeKind::File {
                        size: metadata.len(),
                    },
                });
            }
        }

        nodes.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(nodes)
    }
}
