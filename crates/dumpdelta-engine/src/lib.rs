//! dumpdelta engine - row-level differencing
//!
//! This crate implements the comparison of two snapshots:
//! - Merge-join row differ for one table
//! - Per-table change sets
//! - Snapshot-wide orchestration with an explicit schema-mismatch policy
//! - Rendering change sets as SQL mutation statements

pub mod change_set;
pub mod render;
pub mod row_diff;
pub mod snapshot_diff;

pub use change_set::{ChangeSet, RowUpdate};
pub use render::DiffRenderer;
pub use row_diff::{RowDiffer, RowOperation};
pub use snapshot_diff::{SnapshotDiff, SnapshotDiffer};
