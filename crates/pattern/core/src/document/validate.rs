//! Load-time reference validation.

use crate::document::{
    Action, BulletDef, BulletSource, DocumentError, Fire, Node, NodeRef, PatternDocument,
    RepeatBody,
};

pub(super) fn validate(document: &PatternDocument) -> Result<(), DocumentError> {
    for action in document.actions() {
        check_action(document, action)?;
    }
    for fire in document.fires() {
        check_fire(document, fire)?;
    }
    for bullet in document.bullets() {
        check_bullet(document, bullet)?;
    }
    Ok(())
}

fn check_action(document: &PatternDocument, action: &Action) -> Result<(), DocumentError> {
    action
        .children
        .iter()
        .try_for_each(|child| check_node(document, child))
}

fn check_node(document: &PatternDocument, node: &NodeRef) -> Result<(), DocumentError> {
    match node.as_ref() {
        Node::Action(action) => check_action(document, action),
        Node::ActionRef(reference) => document.resolve_action(&reference.label).map(|_| ()),
        Node::Repeat(repeat) => match &repeat.body {
            RepeatBody::Action(action) => check_action(document, action),
            RepeatBody::Reference(reference) => {
                document.resolve_action(&reference.label).map(|_| ())
            }
        },
        Node::Fire(fire) => check_fire(document, fire),
        Node::FireRef(reference) => document.resolve_fire(&reference.label).map(|_| ()),
        Node::ChangeDirection(_)
        | Node::ChangeSpeed(_)
        | Node::Accel(_)
        | Node::Wait(_)
        | Node::Vanish => Ok(()),
    }
}

fn check_fire(document: &PatternDocument, fire: &Fire) -> Result<(), DocumentError> {
    match &fire.bullet {
        BulletSource::Inline(bullet) => check_bullet(document, bullet),
        BulletSource::Reference(reference) => document.resolve_bullet(&reference.label).map(|_| ()),
    }
}

fn check_bullet(document: &PatternDocument, bullet: &BulletDef) -> Result<(), DocumentError> {
    bullet
        .actions
        .iter()
        .try_for_each(|node| check_node(document, node))
}
