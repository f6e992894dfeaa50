pub mod app;
pub mod engine;
pub mod indexer;
pub mod job;
pub mod partition;
pub mod rpc;
pub mod task;
pub mod wordcount;

pub use app::{Application, MapFn, ReduceFn};
pub use job::{JobSnapshot, JobStatus, PhaseCounts};
pub use partition::KeyValue;
pub use rpc::{
    JobDoneResponse, TaskAssignment, TaskAssignmentRequest, TaskAssignmentResponse,
    TaskCompleteRequest, TaskCompleteResponse, WorkerId,
};
pub use task::{Phase, Task, TaskNumber, TaskStatus};
