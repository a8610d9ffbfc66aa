use crate::{
    animation::timeline::{
        Action, At, CallStep, Child, ChildKind, ClassOp, Direction, PlayState, SetStep, Timeline,
    },
    animation::tween::Tween,
    foundation::core::{Signal, TimelineId},
    foundation::error::{CardmotionError, CardmotionResult},
    stage::bus::EventBus,
    stage::model::Stage,
};

const EPS: f64 = 1e-9;

/// Events reported by [`Player::advance`], in the order they occurred.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PlayerEvent {
    /// A timeline's playhead reached its duration moving forward.
    Completed(TimelineId),
    /// A timeline's playhead reached zero moving backward.
    ReverseCompleted(TimelineId),
    /// A `Signal` action fired.
    Signaled(Signal),
}

/// Introspection record for one timeline child.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum ChildInfo {
    Tween {
        name: String,
        target: crate::foundation::core::ElementId,
        at: f64,
        duration_secs: f64,
    },
    Set {
        target: crate::foundation::core::ElementId,
        at: f64,
    },
    Class {
        target: crate::foundation::core::ElementId,
        class: String,
        at: f64,
    },
    Call {
        at: f64,
    },
    Nested {
        timeline: TimelineId,
        name: String,
        at: f64,
        duration_secs: f64,
    },
}

/// Arena that owns every timeline and drives playback against a stage.
///
/// Timelines are created paused and started explicitly; `advance` is the
/// single suspension point of the whole engine — one call per animation
/// frame, applying every active step in insertion order.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Player {
    timelines: Vec<Timeline>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, empty, paused timeline.
    pub fn timeline(&mut self, name: impl Into<String>) -> TimelineId {
        let id = TimelineId(self.timelines.len());
        self.timelines.push(Timeline::new(name));
        id
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    fn get(&self, id: TimelineId) -> CardmotionResult<&Timeline> {
        self.timelines
            .get(id.0)
            .ok_or_else(|| CardmotionError::animation(format!("unknown timeline id {}", id.0)))
    }

    fn get_mut(&mut self, id: TimelineId) -> CardmotionResult<&mut Timeline> {
        self.timelines
            .get_mut(id.0)
            .ok_or_else(|| CardmotionError::animation(format!("unknown timeline id {}", id.0)))
    }

    pub fn name(&self, id: TimelineId) -> CardmotionResult<&str> {
        Ok(&self.get(id)?.name)
    }

    pub fn state(&self, id: TimelineId) -> CardmotionResult<PlayState> {
        Ok(self.get(id)?.state)
    }

    pub fn playhead(&self, id: TimelineId) -> CardmotionResult<f64> {
        Ok(self.get(id)?.playhead)
    }

    /// Declared duration: the furthest content end over all children,
    /// resolved recursively through nested timelines.
    pub fn duration(&self, id: TimelineId) -> CardmotionResult<f64> {
        self.get(id)?;
        Ok(self.content_end(id))
    }

    fn content_end(&self, id: TimelineId) -> f64 {
        self.timelines[id.0]
            .children
            .iter()
            .map(|c| c.at + self.child_duration(&c.kind))
            .fold(0.0, f64::max)
    }

    fn child_duration(&self, kind: &ChildKind) -> f64 {
        match kind {
            ChildKind::Tween(t) => t.duration(),
            ChildKind::Nested(id) => self.content_end(*id),
            ChildKind::Set(_) | ChildKind::Class(_) | ChildKind::Call(_) => 0.0,
        }
    }

    fn resolve_at(&self, id: TimelineId, at: At) -> CardmotionResult<f64> {
        match at {
            At::End => Ok(self.content_end(id)),
            At::Secs(s) => {
                if !(s >= 0.0) {
                    return Err(CardmotionError::animation(
                        "insertion offset must be finite and >= 0",
                    ));
                }
                Ok(s)
            }
            At::PrevFrac(k) => {
                let Some(prev) = self.timelines[id.0].children.last() else {
                    return Err(CardmotionError::animation(
                        "At::PrevFrac requires a preceding child",
                    ));
                };
                Ok(prev.at + k * self.child_duration(&prev.kind))
            }
        }
    }

    fn insert(&mut self, id: TimelineId, kind: ChildKind, at: At) -> CardmotionResult<()> {
        self.get(id)?;
        let at = self.resolve_at(id, at)?;
        self.timelines[id.0].children.push(Child { at, kind });
        Ok(())
    }

    pub fn add_tween(&mut self, id: TimelineId, tween: Tween, at: At) -> CardmotionResult<()> {
        if !(tween.duration() >= 0.0) {
            return Err(CardmotionError::animation(
                "tween duration must be finite and >= 0",
            ));
        }
        self.insert(id, ChildKind::Tween(tween), at)
    }

    pub fn add_set(&mut self, id: TimelineId, set: SetStep, at: At) -> CardmotionResult<()> {
        self.insert(id, ChildKind::Set(set), at)
    }

    pub fn add_class_op(&mut self, id: TimelineId, op: ClassOp, at: At) -> CardmotionResult<()> {
        self.insert(id, ChildKind::Class(op), at)
    }

    /// Insert a zero-duration action at `at`; fires once, forward only.
    pub fn call(&mut self, id: TimelineId, action: Action, at: At) -> CardmotionResult<()> {
        self.insert(
            id,
            ChildKind::Call(CallStep {
                action,
                fired: false,
            }),
            at,
        )
    }

    /// Insert `child` into `parent` at `at`. The child is driven by the
    /// parent's scrub from then on and cannot be advanced as a root.
    pub fn add_nested(
        &mut self,
        parent: TimelineId,
        child: TimelineId,
        at: At,
    ) -> CardmotionResult<()> {
        self.get(child)?;
        if parent == child {
            return Err(CardmotionError::animation(
                "cannot nest a timeline into itself",
            ));
        }
        if self.contains_nested(child, parent) {
            return Err(CardmotionError::animation(
                "nesting would create a timeline cycle",
            ));
        }
        self.insert(parent, ChildKind::Nested(child), at)?;
        self.timelines[child.0].parented = true;
        Ok(())
    }

    fn contains_nested(&self, root: TimelineId, needle: TimelineId) -> bool {
        self.timelines[root.0].children.iter().any(|c| match c.kind {
            ChildKind::Nested(id) => id == needle || self.contains_nested(id, needle),
            _ => false,
        })
    }

    /// Start forward playback of a root timeline.
    pub fn play(&mut self, id: TimelineId) -> CardmotionResult<()> {
        let tl = self.get_mut(id)?;
        if tl.parented {
            return Err(CardmotionError::animation(
                "cannot play a timeline owned by a parent sequence",
            ));
        }
        tl.state = PlayState::Playing;
        Ok(())
    }

    /// Flip a timeline to reverse playback from its current position.
    ///
    /// A parented timeline only changes direction; its parent keeps driving
    /// it. A root additionally starts reversing on the next advance.
    pub fn reverse(&mut self, id: TimelineId) -> CardmotionResult<()> {
        let tl = self.get_mut(id)?;
        tl.direction = Direction::Reverse;
        if !tl.parented {
            tl.state = PlayState::Reversing;
        }
        Ok(())
    }

    /// Replace the actions run when `id` completes forward playback.
    pub fn on_complete(&mut self, id: TimelineId, actions: Vec<Action>) -> CardmotionResult<()> {
        self.get_mut(id)?.on_complete = actions;
        Ok(())
    }

    /// Replace the actions run when `id` completes reverse playback.
    pub fn on_reverse_complete(
        &mut self,
        id: TimelineId,
        actions: Vec<Action>,
    ) -> CardmotionResult<()> {
        self.get_mut(id)?.on_reverse_complete = actions;
        Ok(())
    }

    /// True when no root timeline is playing or reversing.
    pub fn idle(&self) -> bool {
        self.timelines.iter().all(|t| {
            t.parented || matches!(t.state, PlayState::Paused | PlayState::Completed)
        })
    }

    /// Advance every active root by `dt` seconds, applying steps to the
    /// stage and firing broadcast/side-effect actions on the bus.
    #[tracing::instrument(skip(self, stage, bus))]
    pub fn advance(
        &mut self,
        stage: &mut Stage,
        bus: &mut EventBus,
        dt: f64,
    ) -> CardmotionResult<Vec<PlayerEvent>> {
        if !(dt > 0.0) {
            return Err(CardmotionError::animation("advance dt must be > 0"));
        }

        let mut events = Vec::new();
        for idx in 0..self.timelines.len() {
            let id = TimelineId(idx);
            let (state, parented, from) = {
                let t = &self.timelines[idx];
                (t.state, t.parented, t.playhead)
            };
            if parented {
                continue;
            }
            let dur = self.content_end(id);
            match state {
                PlayState::Playing => {
                    if dur <= EPS {
                        // Nothing to scrub; an empty sequence completes at once.
                        self.finish_root(id, &mut events, stage, bus, true)?;
                        continue;
                    }
                    let to = (from + dt).min(dur);
                    self.scrub(id, from, to, stage, bus, &mut events)?;
                    if to >= dur - EPS {
                        self.timelines[idx].state = PlayState::Completed;
                    }
                }
                PlayState::Reversing => {
                    let to = (from - dt).max(0.0);
                    self.scrub(id, from, to, stage, bus, &mut events)?;
                    if to <= EPS {
                        self.timelines[idx].state = PlayState::Completed;
                    }
                }
                PlayState::Paused | PlayState::Completed => {}
            }
        }
        Ok(events)
    }

    fn finish_root(
        &mut self,
        id: TimelineId,
        events: &mut Vec<PlayerEvent>,
        stage: &mut Stage,
        bus: &mut EventBus,
        forward: bool,
    ) -> CardmotionResult<()> {
        self.timelines[id.0].state = PlayState::Completed;
        let actions = if forward {
            self.timelines[id.0].on_complete.clone()
        } else {
            self.timelines[id.0].on_reverse_complete.clone()
        };
        events.push(if forward {
            PlayerEvent::Completed(id)
        } else {
            PlayerEvent::ReverseCompleted(id)
        });
        for action in actions {
            run_action(action, stage, bus, events)?;
        }
        Ok(())
    }

    /// Move `id`'s playhead from `from` to `to`, applying children along the
    /// way and recursing into nested timelines.
    fn scrub(
        &mut self,
        id: TimelineId,
        from: f64,
        to: f64,
        stage: &mut Stage,
        bus: &mut EventBus,
        events: &mut Vec<PlayerEvent>,
    ) -> CardmotionResult<()> {
        let forward = to > from;
        let backward = to < from;

        for ci in 0..self.timelines[id.0].children.len() {
            let at = self.timelines[id.0].children[ci].at;
            let nested = match self.timelines[id.0].children[ci].kind {
                ChildKind::Nested(child) => Some(child),
                _ => None,
            };

            if let Some(child) = nested {
                let cdur = self.content_end(child);
                let f = (from - at).clamp(0.0, cdur);
                let t = (to - at).clamp(0.0, cdur);
                if (f - t).abs() <= EPS {
                    continue;
                }
                let (cf, ct) = match self.timelines[child.0].direction {
                    Direction::Forward => (f, t),
                    Direction::Reverse => (cdur - f, cdur - t),
                };
                self.scrub(child, cf, ct, stage, bus, events)?;
                continue;
            }

            // Leaf steps: the stage and bus are external borrows, so the
            // child can be mutated in place.
            let mut deferred: Option<Action> = None;
            match &mut self.timelines[id.0].children[ci].kind {
                ChildKind::Tween(tw) => {
                    let f = (from - at).clamp(0.0, tw.duration());
                    let t = (to - at).clamp(0.0, tw.duration());
                    if (f - t).abs() > EPS {
                        tw.scrub(stage, t)?;
                    }
                }
                ChildKind::Set(set) => {
                    if forward && to >= at && !set.is_applied() {
                        set.apply(stage)?;
                    } else if backward && to <= at && set.is_applied() {
                        set.restore(stage)?;
                    }
                }
                ChildKind::Class(op) => {
                    if forward && to >= at && !op.is_applied() {
                        op.apply(stage)?;
                    } else if backward && to <= at && op.is_applied() {
                        op.restore(stage)?;
                    }
                }
                ChildKind::Call(call) => {
                    if forward && !call.fired && from <= at + EPS && to >= at {
                        call.fired = true;
                        deferred = Some(call.action.clone());
                    }
                }
                // Nested children were handled above.
                ChildKind::Nested(_) => {}
            }
            if let Some(action) = deferred {
                run_action(action, stage, bus, events)?;
            }
        }

        // Edge detection against the declared duration, then actions.
        let dur = self.content_end(id);
        self.timelines[id.0].playhead = to;
        if forward && to >= dur - EPS && from < dur - EPS {
            let actions = self.timelines[id.0].on_complete.clone();
            events.push(PlayerEvent::Completed(id));
            for action in actions {
                run_action(action, stage, bus, events)?;
            }
        } else if backward && to <= EPS && from > EPS {
            let actions = self.timelines[id.0].on_reverse_complete.clone();
            events.push(PlayerEvent::ReverseCompleted(id));
            for action in actions {
                run_action(action, stage, bus, events)?;
            }
        }
        Ok(())
    }

    /// Introspect a timeline's children (offsets resolved, declared
    /// durations) without touching playback state.
    pub fn describe(&self, id: TimelineId) -> CardmotionResult<Vec<ChildInfo>> {
        let tl = self.get(id)?;
        let mut out = Vec::with_capacity(tl.children.len());
        for child in &tl.children {
            out.push(match &child.kind {
                ChildKind::Tween(t) => ChildInfo::Tween {
                    name: t.name.clone(),
                    target: t.target,
                    at: child.at,
                    duration_secs: t.duration(),
                },
                ChildKind::Set(s) => ChildInfo::Set {
                    target: s.target,
                    at: child.at,
                },
                ChildKind::Class(c) => ChildInfo::Class {
                    target: c.target,
                    class: c.class.clone(),
                    at: child.at,
                },
                ChildKind::Call(_) => ChildInfo::Call { at: child.at },
                ChildKind::Nested(n) => ChildInfo::Nested {
                    timeline: *n,
                    name: self.timelines[n.0].name.clone(),
                    at: child.at,
                    duration_secs: self.content_end(*n),
                },
            });
        }
        Ok(out)
    }
}

fn run_action(
    action: Action,
    stage: &mut Stage,
    bus: &mut EventBus,
    events: &mut Vec<PlayerEvent>,
) -> CardmotionResult<()> {
    match action {
        Action::Broadcast { channel, state } => bus.fire(channel, state),
        Action::ClearInline { targets } => {
            for target in targets {
                stage.clear_inline(target)?;
            }
        }
        Action::AddClass { target, class } => stage.add_class(target, class)?,
        Action::RemoveClass { target, class } => stage.remove_class(target, &class)?,
        Action::Signal(signal) => events.push(PlayerEvent::Signaled(signal)),
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/player.rs"]
mod tests;
