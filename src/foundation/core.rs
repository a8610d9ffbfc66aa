use crate::foundation::error::{CardmotionError, CardmotionResult};

pub use kurbo::{Point, Rect, Vec2};

/// Stable handle to an element owned by a [`crate::Stage`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub usize);

/// Stable index of a card within the bound layout (page order).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CardId(pub usize);

/// Handle to a timeline owned by the [`crate::Player`] arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimelineId(pub usize);

/// Viewport dimensions, read synchronously at animation-build time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> CardmotionResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(CardmotionError::validation(
                "Viewport width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn center_x(self) -> f64 {
        self.width / 2.0
    }
}

/// Domain signals surfaced to the layout by `Call` steps and completion hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Signal {
    /// The floating container started moving; the layout may refresh its
    /// hit-test bookkeeping.
    CardMove { card: CardId },
    /// Reverse playback of a card's master timeline ran to completion.
    CardClosed { card: CardId },
}
