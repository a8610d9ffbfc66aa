use crate::{
    animation::ease::Ease,
    foundation::{core::ElementId, error::CardmotionResult},
    stage::model::{Prop, Stage},
};

/// One property target inside a [`Tween`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropTo {
    pub prop: Prop,
    pub value: f64,
    /// Interpret `value` as an offset from the captured start value.
    pub relative: bool,
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
struct PropSpan {
    prop: Prop,
    from: f64,
    to: f64,
}

/// A single property-interpolation animation over a fixed duration.
///
/// Start values are captured lazily, on the first forward application, so a
/// tween always departs from whatever the stage looks like when playback
/// reaches it. Scrubbing back to local time zero restores those exact start
/// values, which is what makes every opening step invertible.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Tween {
    pub name: String,
    pub target: ElementId,
    pub duration_secs: f64,
    pub ease: Ease,
    pub props: Vec<PropTo>,
    /// Drop the target's inline overrides once the tween completes forward.
    pub clear_inline_on_complete: bool,
    #[serde(skip)]
    start: Option<Vec<PropSpan>>,
    #[serde(skip)]
    cleared: bool,
}

impl Tween {
    pub fn new(
        name: impl Into<String>,
        target: ElementId,
        duration_secs: f64,
        ease: Ease,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            duration_secs,
            ease,
            props: Vec::new(),
            clear_inline_on_complete: false,
            start: None,
            cleared: false,
        }
    }

    pub fn prop(mut self, prop: Prop, value: f64) -> Self {
        self.props.push(PropTo {
            prop,
            value,
            relative: false,
        });
        self
    }

    pub fn prop_relative(mut self, prop: Prop, value: f64) -> Self {
        self.props.push(PropTo {
            prop,
            value,
            relative: true,
        });
        self
    }

    pub fn clear_inline_on_complete(mut self) -> Self {
        self.clear_inline_on_complete = true;
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration_secs
    }

    /// Apply the tween state for `local` seconds into its own window.
    pub(crate) fn scrub(&mut self, stage: &mut Stage, local: f64) -> CardmotionResult<()> {
        if self.start.is_none() {
            if local <= 0.0 {
                return Ok(());
            }
            let mut spans = Vec::with_capacity(self.props.len());
            for p in &self.props {
                let from = stage.resolve(self.target, p.prop)?;
                let to = if p.relative { from + p.value } else { p.value };
                spans.push(PropSpan {
                    prop: p.prop,
                    from,
                    to,
                });
            }
            self.start = Some(spans);
        }

        let t = if self.duration_secs <= 0.0 {
            1.0
        } else {
            (local / self.duration_secs).clamp(0.0, 1.0)
        };
        let te = self.ease.apply(t);

        let Some(spans) = self.start.as_ref() else {
            return Ok(());
        };
        for s in spans {
            stage.set_inline(self.target, s.prop, s.from + (s.to - s.from) * te)?;
        }

        if t >= 1.0 {
            if self.clear_inline_on_complete && !self.cleared {
                stage.clear_inline(self.target)?;
                self.cleared = true;
            }
        } else {
            self.cleared = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
