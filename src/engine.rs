//! Engine client trait - the collaborator the listers query.
//!
//! The engine owns all image and network state. This crate only asks it for
//! listings and reshapes the answers, so the interface is deliberately
//! narrow:
//!
//! - `list_images`: every image record, optionally including intermediates
//! - `list_networks`: every network record, unfiltered
//! - `network_id`: the engine's name-to-ID mapping
//!
//! # Source Records
//!
//! [`ImageSummary`] and [`NetworkListReport`] mirror the JSON podman prints
//! for `images --format json` and `network ls --format json`. Unknown fields
//! are ignored so newer engines keep deserializing.
//!
//! # Transport
//!
//! How the engine is reached (local socket, SSH tunnel, CLI) is an
//! implementation detail. See [`PodmanCli`] for the bundled implementation.
//!
//! [`PodmanCli`]: crate::podman::PodmanCli

use crate::constants::LIST_SEPARATOR;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Image Records
// =============================================================================

/// One image as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageSummary {
    /// Full image ID.
    pub id: String,
    /// Parent image ID, empty for base images.
    #[serde(default)]
    pub parent_id: String,
    /// Repo-tag strings, absent or `null` for untagged images.
    #[serde(default)]
    pub repo_tags: Option<Vec<String>>,
    /// Creation time as a unix timestamp.
    #[serde(default)]
    pub created: i64,
    /// Size in bytes.
    #[serde(default)]
    pub size: i64,
    /// Image labels.
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

impl ImageSummary {
    /// Repo-tag strings, empty when the engine sent none.
    pub fn repo_tags(&self) -> &[String] {
        self.repo_tags.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// Network Records
// =============================================================================

/// Plugin type entry inside a [`NetworkConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConf {
    /// Plugin type, e.g. `bridge`, `macvlan`, `portmap`.
    #[serde(rename = "type", default)]
    pub plugin_type: String,
}

/// One plugin of a network's configuration list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfig {
    /// Parsed plugin configuration.
    #[serde(default)]
    pub network: Option<NetConf>,
}

/// The plugin descriptor of a network.
///
/// Opaque to this crate apart from the plugin types, which feed driver
/// detection through [`describe_plugins`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfigList {
    /// Network name.
    pub name: String,
    /// CNI specification version.
    #[serde(rename = "CNIVersion", default)]
    pub cni_version: String,
    /// Configured plugins in chain order.
    #[serde(default)]
    pub plugins: Vec<NetworkConfig>,
}

/// One network as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkListReport {
    /// Plugin descriptor (also carries the name).
    #[serde(flatten)]
    pub config: NetworkConfigList,
    /// Network labels.
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

impl NetworkListReport {
    /// Network name.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Renders a plugin descriptor as comma-joined plugin types.
///
/// Used only for substring matching against driver names.
pub fn describe_plugins(config: &NetworkConfigList) -> String {
    config
        .plugins
        .iter()
        .filter_map(|plugin| plugin.network.as_ref())
        .map(|net| net.plugin_type.as_str())
        .filter(|plugin_type| !plugin_type.is_empty())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Network ID as podman v3 derives it: hex SHA-256 of the name.
pub fn network_id_from_name(name: &str) -> String {
    hex::encode(Sha256::digest(name.as_bytes()))
}

// =============================================================================
// EngineClient Trait
// =============================================================================

/// Read-only view of a container engine.
///
/// Implementations must be safe to share across tasks. Each call is a single
/// request; retries and caching are left to callers.
///
/// ## Cancellation
///
/// Implementations must stop waiting and return [`Error::Cancelled`] once
/// `cancel` fires. Timeouts are likewise reported as [`Error::Timeout`].
/// Error messages returned by an engine API belong in [`Error::Remote`].
///
/// [`Error::Cancelled`]: crate::error::Error::Cancelled
/// [`Error::Timeout`]: crate::error::Error::Timeout
/// [`Error::Remote`]: crate::error::Error::Remote
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Lists images. `include_all` also returns intermediate layers.
    async fn list_images(
        &self,
        include_all: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImageSummary>>;

    /// Lists networks without filters.
    async fn list_networks(&self, cancel: &CancellationToken) -> Result<Vec<NetworkListReport>>;

    /// Resolves a network name to its ID.
    ///
    /// The default matches podman v3, where network IDs are not stored but
    /// derived from the name.
    fn network_id(&self, name: &str) -> String {
        network_id_from_name(name)
    }
}
