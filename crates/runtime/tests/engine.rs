mod common;

use std::sync::Arc;

use common::{Host, document_with, runner};
use pattern_core::{
    Action, BulletDef, BulletSource, Expression, Fire, Node, NodeRef, PatternDocument, Reference,
    RepeatBody, SpeedSpec,
};
use pattern_runtime::{PatternEngine, RunnerState, StepError};

fn shot(label: &str) -> NodeRef {
    Node::fire(Fire::new(BulletSource::inline(BulletDef::labeled(label))))
}

#[test]
fn faulty_pattern_does_not_stop_the_others() {
    common::init_tracing();
    let healthy = document_with(
        vec![Node::repeat(3.0, RepeatBody::action(vec![shot("ok"), Node::wait(2.0)]))],
        vec![],
    );
    let broken = document_with(
        vec![Node::wait("$4".parse::<Expression>().expect("parses"))],
        vec![],
    );

    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let good_id = engine.insert(host.spawn_owner(), Some(runner(healthy)));
    let bad_id = engine.insert(host.spawn_owner(), Some(runner(broken)));

    let report = engine.tick(&mut host.frame(1.0));
    assert_eq!(report.aborted.len(), 1);
    assert_eq!(report.aborted[0].0, bad_id);
    assert!(matches!(report.aborted[0].1, StepError::Expression(_)));
    assert_eq!(report.spawned.len(), 1);

    // the faulty bullet stays, its pattern does not run again
    assert!(engine.get(bad_id).is_some());
    assert_eq!(
        engine.runner(bad_id).map(|runner| runner.state()),
        Some(RunnerState::Aborted)
    );

    let mut fired = report.spawned.len();
    for _ in 0..10 {
        let report = engine.tick(&mut host.frame(1.0));
        assert!(report.aborted.is_empty());
        fired += report.spawned.len();
    }
    assert_eq!(fired, 3);
    assert_eq!(
        engine.runner(good_id).map(|runner| runner.state()),
        Some(RunnerState::Completed)
    );
}

#[test]
fn vanished_bullets_leave_and_spawns_join_after_the_pass() {
    let document = document_with(vec![shot("child"), Node::vanish()], vec![]);
    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let owner = engine.insert(host.spawn_owner(), Some(runner(document)));

    let first = engine.tick(&mut host.frame(1.0));
    assert_eq!(first.spawned.len(), 1);
    assert_eq!(engine.len(), 2);

    let second = engine.tick(&mut host.frame(1.0));
    assert_eq!(second.removed, vec![owner]);
    assert!(engine.get(owner).is_none());
    assert_eq!(engine.len(), 1);
    assert_eq!(
        engine.bullets().next().and_then(|bullet| bullet.label.as_deref()),
        Some("child")
    );
}

#[test]
fn remove_cancels_running_pattern() {
    let document = document_with(vec![Node::wait(100.0)], vec![]);
    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let id = engine.insert(host.spawn_owner(), Some(runner(document)));
    engine.tick(&mut host.frame(1.0));

    let removed = engine.remove(id).expect("bullet present");
    assert_eq!(removed.id, id);
    assert!(engine.is_empty());
    assert!(engine.remove(id).is_none());
}

#[test]
fn completed_patterns_are_reported_once() {
    let document = document_with(vec![shot("only")], vec![]);
    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let id = engine.insert(host.spawn_owner(), Some(runner(document)));

    assert_eq!(engine.tick(&mut host.frame(1.0)).completed, vec![id]);
    assert!(engine.tick(&mut host.frame(1.0)).completed.is_empty());
    assert_eq!(engine.len(), 2);
}

#[test]
fn spawns_before_a_fault_still_join_the_engine() {
    common::init_tracing();
    let failing = Node::fire(
        Fire::new(BulletSource::inline(BulletDef::labeled("b")))
            .with_speed(SpeedSpec::absolute("$5".parse::<Expression>().expect("parses"))),
    );
    let document = document_with(
        vec![Node::repeat(1.0, RepeatBody::action(vec![shot("a"), failing]))],
        vec![],
    );
    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let owner = engine.insert(host.spawn_owner(), Some(runner(document)));

    let report = engine.tick(&mut host.frame(1.0));
    assert_eq!(host.created_labels(), vec![Some("a")]);
    assert_eq!(report.spawned.len(), 1);
    assert_eq!(engine.len(), 2);
    assert_eq!(report.aborted.len(), 1);
    assert_eq!(report.aborted[0].0, owner);
    assert!(matches!(report.aborted[0].1, StepError::Expression(_)));
    assert!(
        engine
            .get(report.spawned[0])
            .is_some_and(|bullet| bullet.label.as_deref() == Some("a"))
    );
}

#[test]
fn broken_child_pattern_does_not_abort_the_parent() {
    common::init_tracing();
    let child = BulletDef::labeled("child")
        .with_actions(vec![Node::action_ref(Reference::new("ghost", vec![]))]);
    let document = PatternDocument::builder()
        .action(Action::labeled(
            "top",
            vec![Node::fire(Fire::new(BulletSource::inline(child))), shot("later")],
        ))
        .build_unchecked()
        .expect("unchecked build skips validation");
    let mut host = Host::new();
    let mut engine = PatternEngine::new();
    let parent = engine.insert(host.spawn_owner(), Some(runner(Arc::new(document))));

    let first = engine.tick(&mut host.frame(1.0));
    assert_eq!(first.spawned.len(), 1);
    let child_id = first.spawned[0];
    assert_eq!(first.aborted.len(), 1);
    assert_eq!(first.aborted[0].0, child_id);
    assert!(first.aborted[0].1.is_definition_not_found());
    assert!(engine.get(child_id).is_some());
    assert!(engine.runner(child_id).is_none());
    assert_eq!(
        engine.runner(parent).map(|runner| runner.state()),
        Some(RunnerState::Running)
    );

    let second = engine.tick(&mut host.frame(1.0));
    assert!(second.aborted.is_empty());
    assert_eq!(second.spawned.len(), 1);
    assert_eq!(host.created_labels(), vec![Some("child"), Some("later")]);
}
