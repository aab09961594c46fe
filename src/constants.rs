//! # Listing Constants
//!
//! Defines the sentinels, driver names, identifier lengths, timeouts and
//! output limits used across the crate. These constants are the **single
//! source of truth** for values that callers (table formatters, scripts
//! parsing our output) may depend on.
//!
//! ## Cross-References
//!
//! - [`crate::image`]: Uses the sentinel and identifier length
//! - [`crate::network`]: Uses the driver names
//! - [`crate::reference`]: Uses the name and tag length limits
//! - [`crate::podman`]: Uses timeouts and output limits

use std::time::Duration;

// =============================================================================
// Display Sentinels
// =============================================================================

/// Placeholder for a repository or tag that cannot be determined.
///
/// Matches what podman itself prints for dangling images, so tables built
/// from our records line up with `podman images` output.
pub const NONE_REFERENCE: &str = "<none>";

/// The literal `<none>:<none>` repo-tag some engine versions report for
/// untagged images.
///
/// It must never be parsed as a real image name.
pub const NONE_REPO_TAG: &str = "<none>:<none>";

/// Number of characters kept when shortening image and network IDs.
pub const SHORT_ID_LEN: usize = 12;

/// Digest algorithm prefix stripped from IDs before shortening.
pub const ID_DIGEST_PREFIX: &str = "sha256:";

// =============================================================================
// Network Drivers
// =============================================================================
//
// Only two driver values are representable. Classification is a substring
// search over the plugin descriptor, see `network::detect_driver`.
// =============================================================================

/// Driver reported when no alternate plugin marker is found.
pub const DEFAULT_NETWORK_DRIVER: &str = "bridge";

/// Alternate driver, also the marker searched for in the plugin descriptor.
pub const MACVLAN_NETWORK_DRIVER: &str = "macvlan";

/// Separator used when flattening network labels and plugin types.
pub const LIST_SEPARATOR: &str = ",";

// =============================================================================
// Reference Limits
// =============================================================================

/// Maximum length of the name portion of an image reference.
///
/// Longer names are rejected by the reference parser, which the image
/// lister then maps to the sentinel pair.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a tag (first character plus 127 more).
pub const MAX_TAG_LEN: usize = 128;

/// Minimum number of hex characters in a reference digest.
pub const MIN_DIGEST_HEX_LEN: usize = 32;

// =============================================================================
// Engine Invocation
// =============================================================================

/// Default engine binary looked up on `PATH`.
pub const DEFAULT_PODMAN_BINARY: &str = "podman";

/// Timeout for a single engine listing command.
///
/// **Rationale**: Listing is read-only and normally sub-second locally.
/// Remote tunnels over SSH need more headroom for the handshake.
pub const ENGINE_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum engine output captured per command (16 MiB).
///
/// **Security**: Stdout is read through a window of this size, so an engine
/// (or something impersonating it on `PATH`) streaming unbounded output is
/// killed instead of exhausting memory.
pub const MAX_OUTPUT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum stderr bytes kept in error messages.
pub const MAX_STDERR_IN_ERROR: usize = 4096;

// =============================================================================
// Environment
// =============================================================================

/// Environment variable overriding the engine binary.
pub const ENV_PODMAN_BINARY: &str = "PDCS_PODMAN";

/// Environment variable holding a remote service URL.
pub const ENV_REMOTE_URL: &str = "PDCS_URL";

/// Environment variable holding the SSH identity for remote access.
pub const ENV_REMOTE_IDENTITY: &str = "PDCS_IDENTITY";

/// Environment variable naming a configured system connection.
pub const ENV_CONNECTION: &str = "PDCS_CONNECTION";

/// Environment variable overriding the command timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PDCS_TIMEOUT";
