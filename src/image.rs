//! # Image Lister
//!
//! Flattens the engine's image listing into one [`Image`] row per repo-tag,
//! the shape `podman images` prints:
//!
//! ```text
//! ImageSummary { id, repo_tags: ["a/b:v1", "a/b:v2"], .. }
//!        │
//!        ├──► Image { repository: "a/b", tag: "v1", .. }
//!        └──► Image { repository: "a/b", tag: "v2", .. }
//!
//! ImageSummary { id, repo_tags: [], .. }
//!        │
//!        └──► Image { repository: "<none>", tag: "<none>", .. }
//! ```
//!
//! ## Sentinel Fallback
//!
//! A repo-tag that does not parse as a reference is shown as
//! `<none>`/`<none>` instead of failing the listing. One odd name must not
//! hide every other image from the user. The fallback is logged at `warn`.

use crate::constants::{ID_DIGEST_PREFIX, NONE_REFERENCE, NONE_REPO_TAG, SHORT_ID_LEN};
use crate::engine::{EngineClient, ImageSummary};
use crate::error::Result;
use crate::reference::Reference;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One row of an image listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Shortened image ID.
    pub id: String,
    /// Shortened parent ID, empty for base images.
    pub parent_id: String,
    /// Repository name without tag, or `<none>`.
    pub repository: String,
    /// Tag, or `<none>`.
    pub tag: String,
    /// Creation time as a unix timestamp.
    pub created: i64,
    /// Size in bytes.
    pub size: i64,
    /// Image labels.
    pub labels: HashMap<String, String>,
}

/// Lists every image known to the engine, intermediate layers included.
///
/// # Errors
///
/// Whatever [`EngineClient::list_images`] returns, unchanged. No partial
/// listing is produced on failure.
pub async fn list_images(
    engine: &(impl EngineClient + ?Sized),
    cancel: &CancellationToken,
) -> Result<Vec<Image>> {
    let reports = engine.list_images(true, cancel).await?;

    let mut images = Vec::with_capacity(reports.len());
    for report in &reports {
        images.extend(images_from_summary(report));
    }

    info!(
        "listed {} image rows from {} engine records",
        images.len(),
        reports.len()
    );
    Ok(images)
}

/// Expands one engine record into its listing rows.
pub fn images_from_summary(report: &ImageSummary) -> Vec<Image> {
    let row = |repository: String, tag: String| Image {
        id: short_id(&report.id),
        parent_id: short_id(&report.parent_id),
        repository,
        tag,
        created: report.created,
        size: report.size,
        labels: report.labels.clone().unwrap_or_default(),
    };

    let repo_tags = report.repo_tags();
    if repo_tags.is_empty() {
        return vec![row(NONE_REFERENCE.to_string(), NONE_REFERENCE.to_string())];
    }

    repo_tags
        .iter()
        .map(|repo_tag| {
            let (repository, tag) = repo_tag_decompose(repo_tag);
            row(repository, tag)
        })
        .collect()
}

/// Splits a repo-tag string into `(repository, tag)`.
///
/// Never fails: anything that cannot be determined becomes `<none>`.
///
/// | Input                       | Output                                 |
/// |-----------------------------|----------------------------------------|
/// | `<none>:<none>`             | (`<none>`, `<none>`)                   |
/// | `UP:PER:CASE`               | (`<none>`, `<none>`)                   |
/// | `registry.example.com/app`  | (`registry.example.com/app`, `<none>`) |
/// | `app:`                      | (`app`, `<none>`)                      |
/// | `a/b:v1`                    | (`a/b`, `v1`)                          |
pub fn repo_tag_decompose(repo_tag: &str) -> (String, String) {
    let none = || NONE_REFERENCE.to_string();

    if repo_tag == NONE_REPO_TAG {
        return (none(), none());
    }

    let reference = match Reference::parse(repo_tag) {
        Ok(reference) => reference,
        Err(e) => {
            warn!("showing repo-tag '{}' as {}: {}", repo_tag, NONE_REFERENCE, e);
            return (none(), none());
        }
    };

    let name = match reference.name() {
        Some("") => none(),
        Some(name) => name.to_string(),
        None => return (repo_tag.to_string(), none()),
    };

    let tag = match reference.tag() {
        Some("") | None => none(),
        Some(tag) => tag.to_string(),
    };

    (name, tag)
}

/// Shortens an image or network ID for display.
///
/// Strips a `sha256:` prefix and keeps the first [`SHORT_ID_LEN`]
/// characters. Shorter IDs, including the empty string, pass through.
///
/// [`SHORT_ID_LEN`]: crate::constants::SHORT_ID_LEN
pub fn short_id(id: &str) -> String {
    let id = id.strip_prefix(ID_DIGEST_PREFIX).unwrap_or(id);
    id.chars().take(SHORT_ID_LEN).collect()
}
