//! Output tree synchronization
//!
//! Mirrors the generator's output root into a destination container. The
//! walker and planner turn the output tree into an ordered list of
//! operations, [`apply_plan`] copies it into a hidden sibling of the
//! container, and [`PreparedOutput::install`] renames that copy into place and
//! registers it with the host project model. The container is therefore
//! either complete or absent, never half written.

pub mod apply;
pub mod install;
pub mod plan;
pub mod walker;

pub use apply::{apply_plan, register_plan, SyncReport};
pub use install::PreparedOutput;
pub use plan::{SyncOp, SyncPlan};
pub use walker::{NodeKind, OutputNode, OutputWalker};

use crate::error::GenerateError;
use crate::host::ProjectHost;
use std::path::Path;

/// Copy `source_root` beside `container`, then install it. `container` must not exist.
pub fn synchronize(
    source_root: &Path,
    container: &Path,
    host: &dyn ProjectHost,
) -> Result<SyncReport, GenerateError> {
    PreparedOutput::build(source_root, container)?.install(container, host)
}
