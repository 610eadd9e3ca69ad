pub mod image;
pub mod registry;
pub mod types;

pub use image::{image_tool_schema, ImageToolInvoker, IMAGE_TOOL_NAME};
pub use registry::ToolRegistry;
pub use types::{ToolEntry, ToolError, ToolHandler, ToolSchema};
