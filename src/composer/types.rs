//! # Compose Service Wire Types
//!
//! Request and response shapes of the compose service v2 API. These mirror
//! the service's published schema and are produced exclusively by the
//! build-request translator; nothing else in the core constructs them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of a compose submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub distribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizations: Option<WireCustomizations>,
    pub image_request: ImageRequest,
}

/// Customizations section of a compose submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireCustomizations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<WireUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<WireServices>,
}

/// User entry on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireUser {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Service toggles on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireServices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Vec<String>>,
}

/// The single image request of a compose submission. The service accepts a
/// list; this core always submits exactly one image per compose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub architecture: String,
    pub image_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ostree: Option<WireOsTree>,
    pub upload_options: AwsS3UploadOptions,
}

/// OS-tree section on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOsTree {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Upload-target configuration; exactly one is set per image request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsS3UploadOptions {
    pub region: String,
}

/// Response body of an accepted compose submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeSubmitted {
    pub id: Uuid,
}

/// Response body of a status poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeStatusResponse {
    pub status: ComposeStatus,
}

/// Tri-state job status reported by the compose service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposeStatus {
    Pending,
    Success,
    Failure,
}
