pub mod error;
pub mod job;
pub mod chat;
pub mod suggestions;

pub use error::{ClientError, HttpError};
pub use job::{FailureKind, JobHandle, JobOutcome, JobRequest, JobStatus};
pub use chat::ChatReply;
