pub mod bedrock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logger;
pub mod models;
pub mod response;
pub mod synthesis;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use bedrock::{BedrockClient, BedrockRuntime, ImageClient, SdkRuntime, TextClient};
pub use config::{BedrockConfig, GenerationConfig};
pub use dispatcher::RequestDispatcher;
pub use error::{GenerationError, Result};
pub use models::*;
pub use response::ResponseBuilder;
pub use synthesis::{SynthesisBackend, SynthesisRegistry};
