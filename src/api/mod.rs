pub mod channel;
pub mod json_blob;
pub mod memory;
pub mod store;

pub use channel::{ReplicationChannel, SyncStatus};
pub use json_blob::JsonBlobStore;
pub use memory::MemorySnapshotStore;
pub use store::SnapshotStore;
