//! Operation node tree.
//!
//! Nodes are immutable once built and shared through `Arc`, so every bullet
//! running the same pattern reads the same tree. Runtime step trees keep
//! `Arc` handles into it and never copy node contents.

use std::sync::Arc;

use crate::expr::Expression;

/// Shared handle to an operation node.
pub type NodeRef = Arc<Node>;

/// One operation inside an action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Action(Arc<Action>),
    ActionRef(Arc<Reference>),
    Repeat(Arc<Repeat>),
    Fire(Arc<Fire>),
    FireRef(Arc<Reference>),
    ChangeDirection(Arc<ChangeDirection>),
    ChangeSpeed(Arc<ChangeSpeed>),
    /// Present in the input schema; has no executable step.
    Accel(Arc<Accel>),
    Wait(Arc<Wait>),
    Vanish,
}

/// Discriminant of [`Node`], named the way the input document names its tags.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "camelCase")]
pub enum NodeKind {
    Action,
    ActionRef,
    Repeat,
    Fire,
    FireRef,
    ChangeDirection,
    ChangeSpeed,
    Accel,
    Wait,
    Vanish,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Action(_) => NodeKind::Action,
            Self::ActionRef(_) => NodeKind::ActionRef,
            Self::Repeat(_) => NodeKind::Repeat,
            Self::Fire(_) => NodeKind::Fire,
            Self::FireRef(_) => NodeKind::FireRef,
            Self::ChangeDirection(_) => NodeKind::ChangeDirection,
            Self::ChangeSpeed(_) => NodeKind::ChangeSpeed,
            Self::Accel(_) => NodeKind::Accel,
            Self::Wait(_) => NodeKind::Wait,
            Self::Vanish => NodeKind::Vanish,
        }
    }

    // ===== shorthand constructors =====

    pub fn action(action: Action) -> NodeRef {
        Arc::new(Self::Action(Arc::new(action)))
    }

    pub fn action_ref(reference: Reference) -> NodeRef {
        Arc::new(Self::ActionRef(Arc::new(reference)))
    }

    pub fn repeat(times: impl Into<Expression>, body: RepeatBody) -> NodeRef {
        Arc::new(Self::Repeat(Arc::new(Repeat {
            times: times.into(),
            body,
        })))
    }

    pub fn fire(fire: Fire) -> NodeRef {
        Arc::new(Self::Fire(Arc::new(fire)))
    }

    pub fn fire_ref(reference: Reference) -> NodeRef {
        Arc::new(Self::FireRef(Arc::new(reference)))
    }

    pub fn change_direction(direction: DirectionSpec, term: impl Into<Expression>) -> NodeRef {
        Arc::new(Self::ChangeDirection(Arc::new(ChangeDirection {
            direction,
            term: term.into(),
        })))
    }

    pub fn change_speed(speed: SpeedSpec, term: impl Into<Expression>) -> NodeRef {
        Arc::new(Self::ChangeSpeed(Arc::new(ChangeSpeed {
            speed,
            term: term.into(),
        })))
    }

    pub fn wait(duration: impl Into<Expression>) -> NodeRef {
        Arc::new(Self::Wait(Arc::new(Wait {
            duration: duration.into(),
        })))
    }

    pub fn vanish() -> NodeRef {
        Arc::new(Self::Vanish)
    }
}

/// Ordered sequence of operations.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub label: Option<String>,
    pub children: Vec<NodeRef>,
}

impl Action {
    pub fn new(children: Vec<NodeRef>) -> Self {
        Self {
            label: None,
            children,
        }
    }

    pub fn labeled(label: impl Into<String>, children: Vec<NodeRef>) -> Self {
        Self {
            label: Some(label.into()),
            children,
        }
    }
}

/// Indirection to a labelled definition, with argument expressions evaluated
/// against the caller's parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reference {
    pub label: String,
    pub args: Vec<Expression>,
}

impl Reference {
    pub fn new(label: impl Into<String>, args: Vec<Expression>) -> Self {
        Self {
            label: label.into(),
            args,
        }
    }
}

/// Bounded loop over one action body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Repeat {
    pub times: Expression,
    pub body: RepeatBody,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeatBody {
    Action(Arc<Action>),
    Reference(Arc<Reference>),
}

impl RepeatBody {
    pub fn action(children: Vec<NodeRef>) -> Self {
        Self::Action(Arc::new(Action::new(children)))
    }

    pub fn reference(reference: Reference) -> Self {
        Self::Reference(Arc::new(reference))
    }
}

/// Request for one new bullet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fire {
    pub label: Option<String>,
    pub direction: Option<DirectionSpec>,
    pub speed: Option<SpeedSpec>,
    pub bullet: BulletSource,
}

impl Fire {
    pub fn new(bullet: BulletSource) -> Self {
        Self {
            label: None,
            direction: None,
            speed: None,
            bullet,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_direction(mut self, direction: DirectionSpec) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_speed(mut self, speed: SpeedSpec) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Where a fire gets its bullet definition from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BulletSource {
    Inline(Arc<BulletDef>),
    Reference(Arc<Reference>),
}

impl BulletSource {
    pub fn inline(def: BulletDef) -> Self {
        Self::Inline(Arc::new(def))
    }

    pub fn reference(reference: Reference) -> Self {
        Self::Reference(Arc::new(reference))
    }
}

/// Bullet definition: optional defaults for heading/speed plus the actions the
/// spawned bullet runs. `actions` holds `Action` or `ActionRef` nodes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BulletDef {
    pub label: Option<String>,
    pub direction: Option<DirectionSpec>,
    pub speed: Option<SpeedSpec>,
    pub actions: Vec<NodeRef>,
}

impl BulletDef {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: DirectionSpec) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_speed(mut self, speed: SpeedSpec) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_actions(mut self, actions: Vec<NodeRef>) -> Self {
        self.actions = actions;
        self
    }
}

/// How a direction value is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DirectionKind {
    /// Offset from the heading towards the target.
    #[default]
    Aim,
    /// Heading as given.
    Absolute,
    /// Offset from the owner's current heading.
    Relative,
    /// Offset from the last fired heading (fire) or a rate per time unit (change).
    Sequence,
}

/// How a speed value is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SpeedKind {
    #[default]
    Absolute,
    Relative,
    Sequence,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionSpec {
    pub kind: DirectionKind,
    pub value: Expression,
}

impl DirectionSpec {
    pub fn new(kind: DirectionKind, value: impl Into<Expression>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn aim(value: impl Into<Expression>) -> Self {
        Self::new(DirectionKind::Aim, value)
    }

    pub fn absolute(value: impl Into<Expression>) -> Self {
        Self::new(DirectionKind::Absolute, value)
    }

    pub fn relative(value: impl Into<Expression>) -> Self {
        Self::new(DirectionKind::Relative, value)
    }

    pub fn sequence(value: impl Into<Expression>) -> Self {
        Self::new(DirectionKind::Sequence, value)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedSpec {
    pub kind: SpeedKind,
    pub value: Expression,
}

impl SpeedSpec {
    pub fn new(kind: SpeedKind, value: impl Into<Expression>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn absolute(value: impl Into<Expression>) -> Self {
        Self::new(SpeedKind::Absolute, value)
    }

    pub fn relative(value: impl Into<Expression>) -> Self {
        Self::new(SpeedKind::Relative, value)
    }

    pub fn sequence(value: impl Into<Expression>) -> Self {
        Self::new(SpeedKind::Sequence, value)
    }
}

/// Heading change spread over `term` time units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeDirection {
    pub direction: DirectionSpec,
    pub term: Expression,
}

/// Speed change spread over `term` time units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeSpeed {
    pub speed: SpeedSpec,
    pub term: Expression,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accel {
    pub horizontal: Option<SpeedSpec>,
    pub vertical: Option<SpeedSpec>,
    pub term: Expression,
}

/// Suspends the enclosing action for `duration` time units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wait {
    pub duration: Expression,
}
