pub mod message;
pub mod request;
pub mod response;

pub use message::{ChatMessage, Role};
pub use request::CreateCompletionOptions;
pub use response::{
    CompletionChoice, CompletionResponse, Model, ModelAccess, ModelResponse, Usage,
};
