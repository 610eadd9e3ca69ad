pub mod error;
pub mod health;
pub mod openai_adapter;
pub mod provider;
pub mod registry;
pub mod rotation;
pub mod types;

pub use error::{classify_status, ErrorKind, ProviderError, Severity};
pub use health::{HealthSnapshot, HealthTracker};
pub use openai_adapter::OpenAiAdapter;
pub use provider::{Provider, ProviderDefinition, ProviderProfile};
pub use registry::{ProviderRegistry, RegisteredProvider, RegistryError};
pub use rotation::ProviderSelector;
pub use types::{Completion, CompletionRequest, FunctionCall, ProviderAdapter, Role, ToolInvocation, Turn};
