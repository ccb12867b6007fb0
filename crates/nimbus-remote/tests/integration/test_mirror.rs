//! End-to-end mirroring of a served tree onto local disk

use std::sync::Arc;

use nimbus_core::domain::RemotePath;
use nimbus_core::usecases::MirrorTreeUseCase;
use nimbus_remote::provider::HttpRemoteStorage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, node};

async fn mount_tree(server: &wiremock::MockServer) {
    common::mount_info(server, "/a", node("a", "/", "a", "FOLDER")).await;
    common::mount_info(server, "/a/sub", node("sub", "/a/", "sub", "FOLDER")).await;
    common::mount_children(
        server,
        "/a/",
        vec![
            node("f1", "/a/", "b.txt", "FILE"),
            node("sub", "/a/", "sub", "FOLDER"),
        ],
    )
    .await;
    common::mount_children(server, "/a/sub/", vec![node("f2", "/a/sub/", "c.txt", "FILE")]).await;
    common::mount_download(server, "f1", b"x").await;
    common::mount_download(server, "f2", b"deep").await;
}

#[tokio::test]
async fn test_mirror_served_tree() {
    let (server, client) = common::setup().await;
    mount_tree(&server).await;

    let mirror = MirrorTreeUseCase::new(Arc::new(HttpRemoteStorage::new(client)));
    let base = tempfile::tempdir().unwrap();

    let root = RemotePath::parse("/a").unwrap();
    let tree = mirror.build_tree(&root).await;
    let report = mirror.materialize(&tree, base.path()).await;

    let paths: Vec<&str> = tree.paths().map(|p| p.as_str()).collect();
    assert_eq!(paths, vec!["/a/b.txt", "/a/sub", "/a/sub/c.txt"]);
    assert!(report.is_complete(), "failures: {:?}", report.failures);
    assert_eq!(report.files_written, 2);

    assert_eq!(std::fs::read(base.path().join("a/b.txt")).unwrap(), b"x");
    assert_eq!(std::fs::read(base.path().join("a/sub/c.txt")).unwrap(), b"deep");
}

#[tokio::test]
async fn test_mirror_skips_failed_subtree() {
    let (server, client) = common::setup().await;

    common::mount_info(&server, "/a", node("a", "/", "a", "FOLDER")).await;
    common::mount_children(
        &server,
        "/a/",
        vec![
            node("bad", "/a/", "broken", "FOLDER"),
            node("f1", "/a/", "ok.txt", "FILE"),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/nodes/info"))
        .and(query_param("path", "/a/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    common::mount_download(&server, "f1", b"fine").await;

    let mirror = MirrorTreeUseCase::new(Arc::new(HttpRemoteStorage::new(client)));
    let base = tempfile::tempdir().unwrap();
    let root = RemotePath::parse("/a").unwrap();
    let tree = mirror.build_tree(&root).await;
    let report = mirror.materialize(&tree, base.path()).await;

    assert_eq!(tree.len(), 2);
    assert!(report.is_complete());
    assert!(base.path().join("a/broken").is_dir());
    assert_eq!(std::fs::read(base.path().join("a/ok.txt")).unwrap(), b"fine");
}

#[tokio::test]
async fn test_malformed_sibling_does_not_hide_folder() {
    let (server, client) = common::setup().await;

    common::mount_info(&server, "/a", node("a", "/", "a", "FOLDER")).await;
    common::mount_children(
        &server,
        "/a/",
        vec![
            node("good-1", "/a/", "ok1.txt", "FILE"),
            node("bad id", "/a/", "weird.txt", "FILE"),
            node("good-2", "/a/", "ok2.txt", "FILE"),
        ],
    )
    .await;

    let mirror = MirrorTreeUseCase::new(Arc::new(HttpRemoteStorage::new(client)));
    let tree = mirror.build_tree(&RemotePath::parse("/a").unwrap()).await;

    let paths: Vec<&str> = tree.paths().map(|p| p.as_str()).collect();
    assert_eq!(paths, vec!["/a/ok1.txt", "/a/ok2.txt"]);
}
