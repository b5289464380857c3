mod error_handling;
mod snapshot_gate;
mod task_service;

pub use error_handling::TwodooError;
pub use snapshot_gate::SnapshotGate;
pub use task_service::TaskService;
