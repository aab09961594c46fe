//! # Network Lister
//!
//! Flattens the engine's network listing into display rows.
//!
//! ## Driver Detection
//!
//! Podman v3 networks are CNI plugin chains with no explicit driver field.
//! The driver is inferred from the chain's plugin types:
//!
//! | Plugin descriptor contains | Reported driver |
//! |----------------------------|-----------------|
//! | `macvlan`                  | `macvlan`       |
//! | anything else              | `bridge`        |
//!
//! Only these two values are representable; other plugin types (ipvlan,
//! host-device, ...) report as `bridge`.
//!
//! ## Labels
//!
//! Labels are flattened to `key=value` pairs joined by `,`, sorted by key
//! so repeated listings print identically.

use crate::constants::{DEFAULT_NETWORK_DRIVER, LIST_SEPARATOR, MACVLAN_NETWORK_DRIVER};
use crate::engine::{EngineClient, NetworkListReport, describe_plugins};
use crate::error::Result;
use crate::image::short_id;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// One row of a network listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    /// Network name.
    pub name: String,
    /// Shortened network ID.
    pub id: String,
    /// `bridge` or `macvlan`.
    pub driver: String,
    /// Always empty; per-network interfaces are not reported.
    pub network_interface: String,
    /// Comma-joined `key=value` labels.
    pub labels: String,
}

/// Lists every network known to the engine.
///
/// # Errors
///
/// Whatever [`EngineClient::list_networks`] returns, unchanged.
pub async fn list_networks(
    engine: &(impl EngineClient + ?Sized),
    cancel: &CancellationToken,
) -> Result<Vec<Network>> {
    let reports = engine.list_networks(cancel).await?;

    let networks: Vec<Network> = reports
        .iter()
        .map(|report| network_from_report(engine, report))
        .collect();

    info!("listed {} networks", networks.len());
    Ok(networks)
}

/// Builds the listing row for one engine record.
pub fn network_from_report(
    engine: &(impl EngineClient + ?Sized),
    report: &NetworkListReport,
) -> Network {
    let name = report.name().to_string();
    Network {
        id: short_id(&engine.network_id(&name)),
        driver: detect_driver(&describe_plugins(&report.config)).to_string(),
        network_interface: String::new(),
        labels: report
            .labels
            .as_ref()
            .map(flatten_labels)
            .unwrap_or_default(),
        name,
    }
}

/// Classifies a rendered plugin descriptor.
pub fn detect_driver(plugins: &str) -> &'static str {
    if plugins.contains(MACVLAN_NETWORK_DRIVER) {
        MACVLAN_NETWORK_DRIVER
    } else {
        DEFAULT_NETWORK_DRIVER
    }
}

/// Joins labels as `k1=v1,k2=v2`, sorted by key.
pub fn flatten_labels(labels: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = labels.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
