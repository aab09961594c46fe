//! # pdcs
//!
//! **Podman image and network listings, normalized for display**
//!
//! This crate asks a container engine for its images and networks and
//! reshapes the answers into flat rows a table formatter can print directly.
//! The engine owns all state; nothing here mutates it.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              pdcs                                   │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │   list_images(engine, cancel)        list_networks(engine, cancel)  │
//! │     ├── repo_tag_decompose()           ├── describe_plugins()       │
//! │     │     └── Reference::parse()       ├── detect_driver()          │
//! │     └── short_id()                     └── flatten_labels()         │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                       EngineClient Trait                            │
//! │   list_images(include_all) │ list_networks() │ network_id(name)     │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                           PodmanCli                                 │
//! │   podman [--url|--identity|--connection] ... --format json          │
//! │   timeout │ cancellation │ output size limit                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Model
//!
//! | Failure                       | Outcome                               |
//! |-------------------------------|---------------------------------------|
//! | Engine call fails / times out | Error returned unchanged, no rows     |
//! | Repo-tag does not parse       | Row shows `<none>` / `<none>`         |
//! | Image has no repo-tags        | One row with `<none>` / `<none>`      |
//!
//! # Example
//!
//! ```rust,ignore
//! use pdcs::{PodmanCli, PodmanConfig, list_images};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> pdcs::Result<()> {
//!     let engine = PodmanCli::with_config(
//!         PodmanConfig::default().with_connection("prod"),
//!     );
//!     for image in list_images(&engine, &CancellationToken::new()).await? {
//!         println!("{}:{} {}", image.repository, image.tag, image.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod engine;
pub mod error;
pub mod image;
pub mod network;
pub mod podman;
pub mod reference;

// Re-exports
pub use constants::*;
pub use engine::{
    EngineClient, ImageSummary, NetConf, NetworkConfig, NetworkConfigList, NetworkListReport,
    describe_plugins, network_id_from_name,
};
pub use error::{Error, ReferenceError, Result};
pub use image::{Image, images_from_summary, list_images, repo_tag_decompose, short_id};
pub use network::{Network, detect_driver, flatten_labels, list_networks, network_from_report};
pub use podman::{PodmanCli, PodmanConfig};
pub use reference::Reference;
