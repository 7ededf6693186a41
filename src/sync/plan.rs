//! Pure planning: output nodes to destination operations

use super::walker::{NodeKind, OutputNode};
use std::path::PathBuf;

/// One destination operation, relative to the container root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOp {
    CreateFolder { relative: PathBuf },
    CopyFile { relative: PathBuf, size: u64 },
}

impl SyncOp {
    pub fn relative(&self) -> &PathBuf {
        match self {
            SyncOp::CreateFolder { relative } | SyncOp::CopyFile { relative, .. } => relative,
        }
    }
}

/// Ordered operations reproducing an output tree; parents precede their children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    ops: Vec<SyncOp>,
}

impl SyncPlan {
    pub fn from_nodes(mut nodes: Vec<OutputNode>) -> Self {
        // Component-wise ordering places every directory before its descendants.
        nodes.sort_by(|a, b| a.relative.cmp(&b.relative));
        let ops = nodes
            .into_iter()
            .map(|node| match node.kind {
                NodeKind::Directory => SyncOp::CreateFolder {
                    relative: node.relative,
                },
                NodeKind::File { size } => SyncOp::CopyFile {
                    relative: node.relative,
                    size,
                },
            })
            .collect();
        Self { ops }
    }

    pub fn ops(&self) -> &[SyncOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SyncOp::CopyFile { .. }))
            .count()
    }

    pub fn total_bytes(&self) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                SyncOp::CopyFile { size, .. } => *size,
                SyncOp::CreateFolder { .. } => 0,
            })
            .sum()
    }
}
