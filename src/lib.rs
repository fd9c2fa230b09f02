//! # neptune-api-client
//!
//! Typed async client for the Amazon Neptune bulk loader API.
//!
//! ## Overview
//!
//! The crate covers the three loader operations (start a load job, read its
//! status, cancel it) and the request pipeline behind them: requests are
//! built from typed inputs, pointed at the configured cluster endpoint,
//! optionally signed with AWS Signature V4, and sent through a pluggable
//! [`Transport`]. Responses decode into typed outputs or a structured
//! [`ApiError`].
//!
//! Nothing is retried and no timeout is imposed here; both belong to the
//! caller and to the underlying transport.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neptune_api_client::{GetLoaderInput, NeptuneClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> neptune_api_client::Result<()> {
//!     let client = NeptuneClientBuilder::from_env()
//!         .address("https://my-cluster.cluster-xyz.us-east-1.neptune.amazonaws.com:8182")
//!         .region("us-east-1")
//!         .with_env_credentials()?
//!         .build()?;
//!
//!     let status = client
//!         .get_loader
//!         .call(&GetLoaderInput::for_load("ef478d76-d9da-4d94-8ff1-08d9d4863aa5"))
//!         .await?;
//!     println!("{:?}", status.overall_status());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Loader operation handlers, inputs, outputs, and the API error body |
//! | [`client`] | Client facade and builder |
//! | [`transport`] | Transport client, SigV4 signer, and the transport capability |
//! | [`error`] | Crate-wide error type |

pub mod api;
pub mod client;
pub mod transport;

// Re-export main types for convenience
pub use api::{
    ApiError, CancelLoaderInput, CreateLoaderInput, CreateLoaderOutput, Format, GetLoaderInput,
    GetLoaderOutput, Mode, Parallelism,
};
pub use client::{ClientConfig, NeptuneClient, NeptuneClientBuilder};
pub use transport::{Credentials, RequestSigner, SigV4Signer, Transport, TransportError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
