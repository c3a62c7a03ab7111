//! Built-in node handlers, one per node type.

mod condition;
mod http;
mod image;
mod iterator;
mod llm;
mod text_input;
mod viewer;

pub use condition::ConditionHandler;
pub use http::ApiCallHandler;
pub use image::ImageGeneratorHandler;
pub use iterator::LoopHandler;
pub use llm::LlmProcessorHandler;
pub use text_input::TextInputHandler;
pub use viewer::ViewerHandler;
