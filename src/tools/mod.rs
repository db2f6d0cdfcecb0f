pub mod dispatcher;
pub mod echo;
pub mod registry;

pub use dispatcher::{DispatchOutcome, ToolDispatcher, TOOL_RESULT_PREFIX};
pub use echo::EchoTool;
pub use registry::{Tool, ToolRegistry};
