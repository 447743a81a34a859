pub mod differ;
pub mod store;

pub use differ::{find_changes, textual_diff, ChangeKind, RateChange};
pub use store::SnapshotStore;
