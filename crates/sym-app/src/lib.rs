pub mod chat;
pub mod config;
pub mod events;
pub mod gateway;
pub mod generator;
pub mod health;

pub use chat::ChatClient;
pub use config::ClientConfig;
pub use events::{EventSink, JobEvent, ProgressEvent};
pub use gateway::{Gateway, HttpGateway};
pub use generator::{JobLifecycleClient, PollOptions};
pub use health::{HealthProbe, HealthStatus};
