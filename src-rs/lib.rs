pub mod chat;
pub mod config;
pub mod fallback;
pub mod helpers;
pub mod result;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "tools/lib.rs"]
pub mod tools;
#[path = "api/lib.rs"]
pub mod api;

pub use chat::ChatOrchestrator;
pub use config::RelayConfig;
pub use result::{ChatReply, FailureClass};
