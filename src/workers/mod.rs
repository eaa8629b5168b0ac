pub mod countdown;
pub mod poller;
pub mod publisher;

pub use countdown::CountdownWorker;
pub use poller::SnapshotPollerWorker;
pub use publisher::{Broadcaster, SnapshotPublisherWorker};
