pub mod error;
pub mod openai;
pub mod retry;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use openai::OpenAi;
pub use retry::{with_backoff, Exhausted, ModelChain, Retried, RetryPolicy};
pub use traits::{ChatModel, ChatOptions, Completion, ContentPart, Message, MessageRole, TokenUsage};
pub use util::strip_code_blocks;
