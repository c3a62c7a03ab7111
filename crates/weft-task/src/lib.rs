//! Node handlers for weft.
//!
//! Each node type maps to a [`NodeHandler`] registered in a
//! [`HandlerRegistry`] under its type tag. Handlers receive a [`TaskContext`]
//! with the node's config and resolved inputs, plus the run's cancellation
//! token, and return one JSON value.
//!
//! ```text
//! ┌──────────────────┐     tag      ┌──────────────────────┐
//! │ HandlerRegistry  │─────────────▶│ dyn NodeHandler      │
//! └──────────────────┘              └──────────┬───────────┘
//!                                              │ llm / image
//!                                              ▼
//!                                   ┌──────────────────────┐
//!                                   │ Providers            │
//!                                   │ (TextGenerator,      │
//!                                   │  PromptEnhancer,     │
//!                                   │  ImageGenerator)     │
//!                                   └──────────────────────┘
//! ```
//!
//! Generative services sit behind the provider traits; [`OpenAiCompatible`]
//! implements all three over HTTP.

mod error;
mod handler;
pub mod handlers;
mod openai;
mod providers;
mod template;
mod types;

pub use error::TaskError;
pub use handler::{HandlerRegistry, NodeHandler};
pub use openai::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, OpenAiCompatible, image_size};
pub use providers::{
  EnhancedPrompt, GenerationError, ImageGenerator, PromptEnhancer, Providers, TextGenerator,
};
pub use template::render_prompt;
pub use types::TaskContext;
