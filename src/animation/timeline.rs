use crate::{
    animation::tween::Tween,
    foundation::core::{ElementId, Signal, TimelineId},
    foundation::error::CardmotionResult,
    stage::model::{InlineFlags, Prop, Stage},
};

/// Insertion position for timeline children.
///
/// Offsets are resolved once, when the child is inserted, from declared
/// durations. Nothing is re-resolved at play time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum At {
    /// Append after the current content end (the default).
    End,
    /// Explicit offset in seconds from the timeline start.
    Secs(f64),
    /// Predecessor start plus `k` times the predecessor's duration.
    PrevFrac(f64),
}

/// Zero-duration side effect fired by `call` steps and completion hooks.
///
/// Actions are data rather than closures so timelines stay serializable and
/// completion handling needs no captured state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Action {
    Broadcast { channel: String, state: String },
    ClearInline { targets: Vec<ElementId> },
    AddClass { target: ElementId, class: String },
    RemoveClass { target: ElementId, class: String },
    Signal(Signal),
}

/// Zero-duration style write, applied on forward crossing and undone on
/// reverse crossing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SetStep {
    pub target: ElementId,
    pub props: Vec<(Prop, f64)>,
    pub flags: Option<InlineFlags>,
    #[serde(skip)]
    prior: Option<SetSnapshot>,
}

#[derive(Clone, Debug)]
struct SetSnapshot {
    props: Vec<(Prop, Option<f64>)>,
    flags: InlineFlags,
}

impl SetStep {
    pub fn new(target: ElementId) -> Self {
        Self {
            target,
            props: Vec::new(),
            flags: None,
            prior: None,
        }
    }

    pub fn prop(mut self, prop: Prop, value: f64) -> Self {
        self.props.push((prop, value));
        self
    }

    pub fn flags(mut self, flags: InlineFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub(crate) fn is_applied(&self) -> bool {
        self.prior.is_some()
    }

    pub(crate) fn apply(&mut self, stage: &mut Stage) -> CardmotionResult<()> {
        let mut prior_props = Vec::with_capacity(self.props.len());
        for &(prop, value) in &self.props {
            prior_props.push((prop, stage.inline(self.target, prop)?));
            stage.set_inline(self.target, prop, value)?;
        }
        let prior_flags = stage.flags(self.target)?;
        if let Some(flags) = self.flags {
            stage.set_flags(self.target, flags)?;
        }
        self.prior = Some(SetSnapshot {
            props: prior_props,
            flags: prior_flags,
        });
        Ok(())
    }

    pub(crate) fn restore(&mut self, stage: &mut Stage) -> CardmotionResult<()> {
        let Some(snapshot) = self.prior.take() else {
            return Ok(());
        };
        for (prop, value) in snapshot.props {
            match value {
                Some(v) => stage.set_inline(self.target, prop, v)?,
                None => {
                    stage.remove_inline(self.target, prop)?;
                }
            }
        }
        stage.set_flags(self.target, snapshot.flags)?;
        Ok(())
    }
}

/// Reversible class toggle, applied on forward crossing and undone on
/// reverse crossing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassOp {
    pub target: ElementId,
    pub class: String,
    pub add: bool,
    #[serde(skip)]
    prior: Option<bool>,
}

impl ClassOp {
    pub fn add(target: ElementId, class: impl Into<String>) -> Self {
        Self {
            target,
            class: class.into(),
            add: true,
            prior: None,
        }
    }

    pub fn remove(target: ElementId, class: impl Into<String>) -> Self {
        Self {
            target,
            class: class.into(),
            add: false,
            prior: None,
        }
    }

    pub(crate) fn is_applied(&self) -> bool {
        self.prior.is_some()
    }

    pub(crate) fn apply(&mut self, stage: &mut Stage) -> CardmotionResult<()> {
        self.prior = Some(stage.has_class(self.target, &self.class)?);
        if self.add {
            stage.add_class(self.target, self.class.clone())?;
        } else {
            stage.remove_class(self.target, &self.class)?;
        }
        Ok(())
    }

    pub(crate) fn restore(&mut self, stage: &mut Stage) -> CardmotionResult<()> {
        let Some(had) = self.prior.take() else {
            return Ok(());
        };
        if had {
            stage.add_class(self.target, self.class.clone())?;
        } else {
            stage.remove_class(self.target, &self.class)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CallStep {
    pub action: Action,
    #[serde(skip)]
    pub fired: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) enum ChildKind {
    Tween(Tween),
    Set(SetStep),
    Class(ClassOp),
    Call(CallStep),
    Nested(TimelineId),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct Child {
    pub at: f64,
    pub kind: ChildKind,
}

/// Playback direction a timeline resolves its local time through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Playback state of a root timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlayState {
    /// Built but not started; nothing auto-plays a timeline.
    Paused,
    Playing,
    Reversing,
    Completed,
}

/// A composed, time-ordered group of animation steps.
///
/// Timelines live in the [`crate::Player`] arena and are built through it;
/// this type is the pure data model.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    pub name: String,
    pub(crate) children: Vec<Child>,
    pub(crate) playhead: f64,
    pub(crate) state: PlayState,
    pub(crate) direction: Direction,
    /// Set when the timeline was inserted into a parent; parented timelines
    /// are driven by the parent's scrub, never advanced as roots.
    pub(crate) parented: bool,
    pub(crate) on_complete: Vec<Action>,
    pub(crate) on_reverse_complete: Vec<Action>,
}

impl Timeline {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            playhead: 0.0,
            state: PlayState::Paused,
            direction: Direction::Forward,
            parented: false,
            on_complete: Vec::new(),
            on_reverse_complete: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
