//! Tests for the podman CLI engine.
//!
//! A shell script standing in for `podman` records its arguments and prints
//! canned JSON, so command construction, decoding and failure mapping can be
//! checked without a real engine.

#![cfg(unix)]

use pdcs::{EngineClient, Error, PodmanCli, PodmanConfig, list_images, list_networks};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const IMAGES_JSON: &str = r#"[
  {
    "Id": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    "ParentId": "",
    "RepoTags": ["quay.io/podman/stable:v3", "quay.io/podman/stable:latest"],
    "RepoDigests": [],
    "Created": 1634000000,
    "Size": 5610000,
    "SharedSize": 0,
    "VirtualSize": 5610000,
    "Labels": {"maintainer": "ops"},
    "Containers": 0
  },
  {
    "Id": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    "ParentId": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    "RepoTags": null,
    "Created": 1634000100,
    "Size": 1024,
    "Labels": null
  }
]"#;

const NETWORKS_JSON: &str = r#"[
  {"Name": "podman", "CNIVersion": "0.4.0", "Plugins": [{"Network": {"type": "bridge"}}, {"Network": {"type": "portmap"}}], "Labels": null},
  {"Name": "lan", "CNIVersion": "0.4.0", "Plugins": [{"Network": {"type": "macvlan"}}], "Labels": {"env": "prod"}}
]"#;

// =============================================================================
// Stub Engine
// =============================================================================

struct Stub {
    dir: TempDir,
    binary: PathBuf,
}

impl Stub {
    fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("images.json"), IMAGES_JSON).unwrap();
        std::fs::write(dir.path().join("networks.json"), NETWORKS_JSON).unwrap();

        let binary = dir.path().join("podman");
        let script = format!(
            "#!/bin/sh\nDIR=\"$(dirname \"$0\")\"\necho \"$@\" > \"$DIR/args\"\n{}\n",
            body
        );
        std::fs::write(&binary, script).unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, binary }
    }

    /// Stub that answers like a healthy engine.
    fn healthy() -> Self {
        Self::new(concat!(
            "case \"$*\" in\n",
            "  *\"network ls\"*) cat \"$DIR/networks.json\" ;;\n",
            "  *images*) cat \"$DIR/images.json\" ;;\n",
            "esac"
        ))
    }

    fn client(&self) -> PodmanCli {
        PodmanCli::with_config(PodmanConfig::default().with_binary(&self.binary))
    }

    fn recorded_args(&self) -> String {
        read_trimmed(&self.dir.path().join("args"))
    }
}

fn read_trimmed(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap().trim().to_string()
}

// =============================================================================
// Command Construction
// =============================================================================

#[tokio::test]
async fn test_list_images_command_line() {
    let stub = Stub::healthy();
    let client = stub.client();

    client
        .list_images(true, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stub.recorded_args(), "images --all --format json");

    client
        .list_images(false, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stub.recorded_args(), "images --format json");
}

#[tokio::test]
async fn test_list_networks_command_line() {
    let stub = Stub::healthy();
    stub.client()
        .list_networks(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stub.recorded_args(), "network ls --format json");
}

#[tokio::test]
async fn test_remote_flags_precede_subcommand() {
    let stub = Stub::healthy();
    let client = PodmanCli::with_config(
        PodmanConfig::default()
            .with_binary(&stub.binary)
            .with_url("ssh://core@example.com/run/podman/podman.sock")
            .with_identity("/keys/id"),
    );
    client
        .list_networks(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        stub.recorded_args(),
        "--url ssh://core@example.com/run/podman/podman.sock --identity /keys/id network ls --format json"
    );
}

// =============================================================================
// Listing Through the CLI
// =============================================================================

#[tokio::test]
async fn test_images_end_to_end() {
    let stub = Stub::healthy();
    let images = list_images(&stub.client(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(images.len(), 3, "two tags plus one untagged image");
    assert_eq!(images[0].repository, "quay.io/podman/stable");
    assert_eq!(images[0].tag, "v3");
    assert_eq!(images[1].tag, "latest");
    assert_eq!(images[0].id, "e3b0c44298fc");
    assert_eq!(images[2].repository, "<none>");
    assert_eq!(images[2].tag, "<none>");
    assert_eq!(images[2].parent_id, "e3b0c44298fc");
}

#[tokio::test]
async fn test_networks_end_to_end() {
    let stub = Stub::healthy();
    let networks = list_networks(&stub.client(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(networks.len(), 2);
    assert_eq!(networks[0].name, "podman");
    assert_eq!(networks[0].driver, "bridge");
    assert_eq!(networks[0].id.len(), 12);
    assert_eq!(networks[1].driver, "macvlan");
    assert_eq!(networks[1].labels, "env=prod");
}

#[tokio::test]
async fn test_empty_output_is_empty_listing() {
    let stub = Stub::new("exit 0");
    let images = list_images(&stub.client(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn test_null_output_is_empty_listing() {
    let stub = Stub::new("echo null");
    let networks = list_networks(&stub.client(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(networks.is_empty());
}

// =============================================================================
// Failure Mapping
// =============================================================================

#[tokio::test]
async fn test_non_zero_exit_is_command_failed() {
    let stub = Stub::new("echo 'Error: unable to connect to Podman socket' >&2\nexit 125");
    let err = list_images(&stub.client(), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::CommandFailed { command, stderr, .. } => {
            assert!(command.contains("images --all --format json"));
            assert_eq!(stderr, "Error: unable to connect to Podman socket");
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_serialization_error() {
    let stub = Stub::new("echo '{not json'");
    let err = list_networks(&stub.client(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_slow_engine_times_out() {
    let stub = Stub::new("sleep 5");
    let client = PodmanCli::with_config(
        PodmanConfig::default()
            .with_binary(&stub.binary)
            .with_timeout(Duration::from_millis(200)),
    );
    let err = list_images(&client, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { duration, .. } if duration == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_cancelled_token_aborts() {
    let stub = Stub::new("sleep 5");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = list_images(&stub.client(), &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
}

#[tokio::test]
async fn test_cancel_while_running() {
    let stub = Stub::new("sleep 5");
    let client = stub.client();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = list_networks(&client, &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
}

// =============================================================================
// Output Limit
// =============================================================================

#[tokio::test]
async fn test_oversized_output_rejected() {
    let stub = Stub::new("head -c 4096 /dev/zero");
    let client = PodmanCli::with_config(
        PodmanConfig::default()
            .with_binary(&stub.binary)
            .with_max_output_size(1024),
    );
    let err = list_images(&client, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::OutputTooLarge { command, limit } => {
            assert_eq!(limit, 1024);
            assert!(command.contains("images --all --format json"));
        }
        other => panic!("expected OutputTooLarge, got {:?}", other),
    }
}

#[tokio::test]
async fn test_endless_output_stops_at_limit() {
    let stub = Stub::new("exec yes '[]'");
    let client = PodmanCli::with_config(
        PodmanConfig::default()
            .with_binary(&stub.binary)
            .with_max_output_size(1024)
            .with_timeout(Duration::from_secs(10)),
    );
    let err = list_networks(&client, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::OutputTooLarge { limit: 1024, .. }),
        "reading should stop at the limit instead of waiting for the engine, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_output_at_limit_accepted() {
    let stub = Stub::healthy();
    let client = PodmanCli::with_config(
        PodmanConfig::default()
            .with_binary(&stub.binary)
            .with_max_output_size(IMAGES_JSON.len()),
    );
    let images = list_images(&client, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(images.len(), 3);
}

#[tokio::test]
async fn test_missing_binary_is_engine_unavailable() {
    let dir = TempDir::new().unwrap();
    let client = PodmanCli::with_config(
        PodmanConfig::default().with_binary(dir.path().join("no-such-podman")),
    );
    let err = list_images(&client, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EngineUnavailable { .. }));
}
