pub use crate::chat::{ChatOrchestrator, ProviderList, ProviderStatus};
pub use crate::result::{ChatReply, FailureClass};

pub mod handlers;
pub mod server;
