use std::io;

use clip_viewer::{
    viewer::{
        catalog,
        input::dispatch_key,
        session::{Session, SwapOutcome},
    },
    AssetLoadFailure, LoadCause,
};

use crate::common::test_utils::{asset_root, loaded, slide_clip, MockModel};
mod common;

fn missing_file(asset: &str) -> AssetLoadFailure {
    AssetLoadFailure::new(
        asset,
        LoadCause::Io {
            path: catalog::resolve(&asset_root(), asset),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        },
    )
}

#[test]
fn requests_are_numbered_and_resolved() {
    let mut session: Session<MockModel> = Session::new(asset_root());
    let first = session.request("Offensive Idle");
    let second = session.request("Walking");

    assert_eq!(first.seq + 1, second.seq);
    assert_eq!(first.path, asset_root().join("models/fbx/Offensive Idle.fbx"));
    assert_eq!(second.asset, "Walking");
    assert!(!session.is_latest(&first));
    assert!(session.is_latest(&second));
}

#[test]
fn attach_replaces_and_disposes_previous_model() {
    let mut session = Session::new(asset_root());

    let ticket = session.request("Offensive Idle");
    let (first, first_counts) = loaded("Offensive Idle", vec![slide_clip("mixamo.com", 2.0)]);
    assert_eq!(
        session.complete(&ticket, Ok(first)),
        SwapOutcome::Attached { animated: true }
    );
    assert_eq!(session.current_asset(), Some("Offensive Idle"));
    assert_eq!(first_counts.poses(), 1);

    let ticket = session.request("Walking");
    let (second, second_counts) = loaded("Walking", vec![slide_clip("mixamo.com", 1.0)]);
    session.complete(&ticket, Ok(second));

    assert_eq!(first_counts.disposals(), 1);
    assert_eq!(second_counts.disposals(), 0);
    assert_eq!(session.current().map(|m| m.name.as_str()), Some("Walking"));
    assert_eq!(session.mixer().map(|m| m.duration()), Some(1.0));
}

#[test]
fn model_without_clips_is_static() {
    let mut session = Session::new(asset_root());
    let ticket = session.request("Punching Bag");
    let (bag, counts) = loaded("Punching Bag", vec![]);

    assert_eq!(
        session.complete(&ticket, Ok(bag)),
        SwapOutcome::Attached { animated: false }
    );
    assert!(session.mixer().is_none());

    session.advance(0.5);
    session.advance(0.5);
    assert_eq!(counts.poses(), 0);
    assert_eq!(session.current_asset(), Some("Punching Bag"));
}

#[test]
fn only_the_first_clip_plays() {
    let mut session = Session::new(asset_root());
    let ticket = session.request("Fast Run");
    let (run, counts) = loaded(
        "Fast Run",
        vec![slide_clip("run", 2.0), slide_clip("t-pose", 5.0)],
    );
    session.complete(&ticket, Ok(run));

    let mixer = session.mixer().expect("mixer");
    assert_eq!(mixer.clip_name(), "run");
    assert_eq!(mixer.duration(), 2.0);

    session.advance(1.5);
    session.advance(1.0);
    assert_eq!(counts.poses(), 3);

    let pose = session
        .current()
        .and_then(|m| m.last_pose.clone())
        .expect("posed");
    assert!((pose[&0].position.x - 0.5).abs() < 1e-5);
}

#[test]
fn failed_load_keeps_current_model() {
    let mut session = Session::new(asset_root());
    let ticket = session.request("Walking");
    let (walking, counts) = loaded("Walking", vec![slide_clip("walk", 1.0)]);
    session.complete(&ticket, Ok(walking));
    session.advance(0.25);

    let ticket = session.request("Missing");
    let failure = missing_file("Missing");
    assert_eq!(session.complete(&ticket, Err(failure)), SwapOutcome::Failed);

    assert_eq!(session.current_asset(), Some("Walking"));
    assert_eq!(counts.disposals(), 0);
    let mixer = session.mixer().expect("mixer survives");
    assert_eq!(mixer.clip_name(), "walk");
    assert!((mixer.pose()[&0].position.x - 0.25).abs() < 1e-5);
}

#[test]
fn failure_before_any_model_leaves_empty_stage() {
    let mut session: Session<MockModel> = Session::new(asset_root());
    let ticket = session.request("Offensive Idle");
    let failure = AssetLoadFailure::new(
        "Offensive Idle",
        LoadCause::Malformed("missing Objects section".into()),
    );

    assert_eq!(session.complete(&ticket, Err(failure)), SwapOutcome::Failed);
    assert!(session.current().is_none());
    assert!(session.mixer().is_none());
}

#[test]
fn stale_success_is_disposed() {
    let mut session = Session::new(asset_root());
    let slow = session.request("Roundhouse Kick");
    let fast = session.request("Fast Run");

    let (run, run_counts) = loaded("Fast Run", vec![slide_clip("run", 1.0)]);
    session.complete(&fast, Ok(run));

    let (kick, kick_counts) = loaded("Roundhouse Kick", vec![slide_clip("kick", 3.0)]);
    assert_eq!(session.complete(&slow, Ok(kick)), SwapOutcome::Superseded);

    assert_eq!(kick_counts.disposals(), 1);
    assert_eq!(run_counts.disposals(), 0);
    assert_eq!(session.current_asset(), Some("Fast Run"));
    assert_eq!(session.mixer().map(|m| m.clip_name()), Some("run"));
}

#[test]
fn superseded_result_is_dropped_before_upload() {
    let mut session: Session<MockModel> = Session::new(asset_root());
    let stale = session.request("Walking");
    let latest = session.request("Fast Run");

    // The viewer checks freshness before uploading, while only reading the session.
    let view = &session;
    assert!(!view.is_latest(&stale));
    assert_eq!(view.discard(&stale), SwapOutcome::Superseded);

    assert!(session.current().is_none());
    assert!(session.is_latest(&latest));
}

#[test]
fn last_request_wins_regardless_of_completion_order() {
    let mut session = Session::new(asset_root());
    let first = session.request("Walking");
    let second = session.request("Dancing Twerk");

    let (walking, _) = loaded("Walking", vec![]);
    assert_eq!(session.complete(&first, Ok(walking)), SwapOutcome::Superseded);
    assert!(session.current().is_none());

    let (twerk, _) = loaded("Dancing Twerk", vec![slide_clip("dance", 1.0)]);
    assert_eq!(
        session.complete(&second, Ok(twerk)),
        SwapOutcome::Attached { animated: true }
    );
    assert_eq!(session.current_asset(), Some("Dancing Twerk"));
}

#[test]
fn number_keys_swap_and_boxing_fails() {
    let mut session = Session::new(asset_root());

    let ticket = session.request("Offensive Idle");
    let (idle, idle_counts) = loaded("Offensive Idle", vec![slide_clip("idle", 4.0)]);
    session.complete(&ticket, Ok(idle));

    let mut ticket = None;
    dispatch_key(53, |asset| ticket = Some(session.request(asset)));
    let ticket = ticket.expect("key 5 is bound");
    assert_eq!(ticket.asset, "Dancing Twerk");
    let (twerk, twerk_counts) = loaded("Dancing Twerk", vec![slide_clip("twerk", 2.0)]);
    session.complete(&ticket, Ok(twerk));
    assert_eq!(idle_counts.disposals(), 1);

    let mut ticket = None;
    dispatch_key(50, |asset| ticket = Some(session.request(asset)));
    let ticket = ticket.expect("key 2 is bound");
    assert_eq!(ticket.asset, "Boxing");
    assert!(!catalog::is_listed(&ticket.asset));
    let failure = missing_file(&ticket.asset);
    assert_eq!(
        failure.to_string(),
        format!(
            "Error loading asset: Boxing: could not read {}: no such file",
            ticket.path.display()
        )
    );
    assert_eq!(session.complete(&ticket, Err(failure)), SwapOutcome::Failed);

    assert_eq!(session.current_asset(), Some("Dancing Twerk"));
    assert_eq!(twerk_counts.disposals(), 0);
    assert_eq!(session.mixer().map(|m| m.clip_name()), Some("twerk"));
}
