use clip_viewer::{
    resources::read_asset,
    viewer::{
        catalog,
        loader::{self, ViewerEvent},
        session::Session,
    },
    LoadCause,
};

use crate::common::test_utils::{binary_fbx, document, geometry, model, oo, MockModel};
mod common;

#[tokio::test]
async fn missing_file_is_an_io_failure() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = catalog::resolve(root.path(), "Boxing");

    let failure = read_asset("Boxing", path.clone())
        .await
        .expect_err("nothing on disk");
    assert_eq!(failure.asset, "Boxing");
    match failure.cause {
        LoadCause::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected an io failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_file_is_a_parse_failure() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = catalog::resolve(root.path(), "Walking");
    std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
    std::fs::write(&path, b"; FBX 7.4.0 project file\n").expect("write");

    let failure = read_asset("Walking", path).await.expect_err("ascii fbx");
    assert!(matches!(failure.cause, LoadCause::Parse(_)));
}

#[tokio::test]
async fn binary_file_on_disk_decodes() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = catalog::resolve(root.path(), "Punching Bag");
    std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
    let doc = document(
        vec![
            model(1, "Bag", vec![]),
            geometry(10, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, -3], vec![]),
        ],
        vec![oo(1, 0), oo(10, 1)],
    );
    std::fs::write(&path, binary_fbx(&doc)).expect("write");

    let asset = read_asset("Punching Bag", path).await.expect("decodes");
    assert_eq!(asset.nodes[0].name, "Bag");
    assert_eq!(asset.meshes[0].indices, vec![0, 1, 2]);
    assert!(asset.clips.is_empty());
}

#[tokio::test]
async fn loader_returns_the_ticket_with_the_result() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut session: Session<MockModel> = Session::new(root.path());
    let ticket = session.request("Fast Run");

    let ViewerEvent::Decoded {
        ticket: returned,
        result,
    } = loader::load(ticket.clone()).await;
    assert_eq!(returned, ticket);
    assert!(result.is_err());
}
