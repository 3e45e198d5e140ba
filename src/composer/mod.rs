// Compose service boundary: the stateless adapter that submits build
// requests to the external compose service and polls job status.

pub mod client;
pub mod errors;
pub mod types;

pub use client::{ComposeService, HttpComposeClient};
pub use errors::{ComposeError, ComposeResult};
pub use types::{
    AwsS3UploadOptions, ComposeRequest, ComposeStatus, ImageRequest, WireCustomizations, WireUser,
};
