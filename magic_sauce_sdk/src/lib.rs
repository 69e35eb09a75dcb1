//! Entry point for the Apply Magic Sauce SDK crate.
//! Consumers should import exported types via the crate root.
//!
//! # Example
//!
//! ```no_run
//! use magic_sauce_sdk::{ClientConfig, MagicSauceClient, PredictionOptions, Source};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), magic_sauce_sdk::MagicSauceError> {
//!     let client = MagicSauceClient::new(ClientConfig::default().with_api_key("YOUR_API_KEY"))?;
//!     let session = client.session(1234, None).await?;
//!
//!     let options = PredictionOptions::text(Source::Other, &["BIG5"], true);
//!     let prediction = client
//!         .predict_text("Lorem ipsum dolor sit amet", &options, &session)
//!         .await?;
//!     println!("{prediction:?}");
//!
//!     let ids = ["5845317146", "6460713406", "22404294985"];
//!     let options = PredictionOptions::like_ids(&[] as &[&str], true, true);
//!     let prediction = client.predict_like_ids(&ids, &options, &session).await?;
//!     println!("{prediction:?}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod handler;
pub mod options;
pub mod transport;
pub mod implementation {
    include!("impl.rs");
}

pub use auth::{AuthSession, TokenManager};
pub use config::ClientConfig;
pub use dto::*;
pub use handler::{run_prediction_handler, PredictionInput, PredictionRequest};
pub use implementation::MagicSauceClient;
pub use options::{OptionKey, PredictionOptions, Source};
