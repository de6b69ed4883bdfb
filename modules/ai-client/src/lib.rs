pub mod error;
pub mod openrouter;
pub mod traits;
pub mod util;
pub mod wire;
pub mod xai;

pub use error::{ProviderError, Result};
pub use openrouter::OpenRouterClient;
pub use traits::{ChatProvider, ProviderId, RawReply};
pub use xai::XaiClient;
