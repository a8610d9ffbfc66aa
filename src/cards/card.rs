use crate::{
    animation::ease::Ease,
    animation::player::Player,
    animation::timeline::{Action, At, ClassOp, SetStep},
    animation::tween::Tween,
    foundation::core::{CardId, ElementId, Signal, TimelineId},
    foundation::error::{CardmotionError, CardmotionResult},
    stage::model::{InlineFlags, Prop, Stage},
};

/// Class removed from the container while it floats to the detail rect.
pub const CLASS_CONTAINER_CLOSED: &str = "card__container--closed";

/// Class added to the body while a card is open (scroll lock).
pub const CLASS_BODY_HIDDEN: &str = "body--hidden";

const CONTENT_SLIDE_SECS: f64 = 0.8;
const FLOAT_MOVE_SECS: f64 = 0.8;
const FLOAT_WIDEN_SECS: f64 = 0.3;
const LETTER_FADE_SECS: f64 = 0.4;
const LETTER_STAGGER_SECS: f64 = 0.1;
const LETTER_FALL_PX: f64 = 20.0;
const HIDE_SECS: f64 = 0.4;
const SHOW_SECS: f64 = 0.5;
const HIDE_SCALE: f64 = 0.8;

// Floating target rect, as fractions of the viewport.
const OPEN_HEIGHT_FRAC: f64 = 0.9 * 0.3;
const OPEN_WIDTH_FRAC: f64 = 0.9;

/// Element handles for one grid tile, in page order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CardElements {
    pub root: ElementId,
    pub container: ElementId,
    pub clip: ElementId,
    pub letters: Vec<ElementId>,
}

/// One grid tile's animation state and its open/close/hide/show operations.
///
/// A card owns at most one master timeline at a time. Opening builds a fresh
/// one and marks the card open immediately; closing plays that same timeline
/// in reverse and only marks the card closed when the reversal completes —
/// this asymmetry is what the dispatch guard relies on.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Card {
    pub id: CardId,
    elements: CardElements,
    content: ElementId,
    body: ElementId,
    is_open: bool,
    timeline: Option<TimelineId>,
}

impl Card {
    pub(crate) fn new(
        id: CardId,
        elements: CardElements,
        content: ElementId,
        body: ElementId,
    ) -> Self {
        Self {
            id,
            elements,
            content,
            body,
            is_open: false,
            timeline: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn timeline(&self) -> Option<TimelineId> {
        self.timeline
    }

    pub fn elements(&self) -> &CardElements {
        &self.elements
    }

    /// Build and return the master open timeline.
    ///
    /// The sub-animations run in parallel: the shared content panel slides
    /// off-screen, the container floats from its grid rect to the centered
    /// detail rect, and the caption glyphs fall away staggered. The card is
    /// marked open right here, before any playback.
    #[tracing::instrument(skip(self, stage, player))]
    pub fn open_card(
        &mut self,
        stage: &mut Stage,
        player: &mut Player,
        on_move: Option<Signal>,
    ) -> CardmotionResult<TimelineId> {
        let tl = player.timeline("card");

        let slide = self.slide_content_down(stage);
        let float = self.float_container(stage, player, on_move)?;
        let letters = self.falling_letters(player)?;

        player.add_tween(tl, slide, At::End)?;
        player.add_nested(tl, float, At::Secs(0.0))?;
        player.add_nested(tl, letters, At::Secs(0.0))?;

        self.is_open = true;
        self.timeline = Some(tl);
        Ok(tl)
    }

    fn slide_content_down(&self, stage: &Stage) -> Tween {
        Tween::new(
            "slide-content-down",
            self.content,
            CONTENT_SLIDE_SECS,
            Ease::InOutExpo,
        )
        .prop(Prop::Y, stage.viewport().height)
    }

    /// Reposition/resize the container from its on-screen rect to the fixed,
    /// centered detail rect.
    ///
    /// The bounding rect must be read before the container is switched to
    /// fixed positioning; otherwise the tween departs from the wrong origin.
    fn float_container(
        &self,
        stage: &mut Stage,
        player: &mut Player,
        on_move: Option<Signal>,
    ) -> CardmotionResult<TimelineId> {
        stage.add_class(self.body, CLASS_BODY_HIDDEN)?;

        let rect = stage.bounding_rect(self.elements.container)?;
        let viewport = stage.viewport();

        let tl = player.timeline("float-container");
        player.add_set(
            tl,
            SetStep::new(self.elements.container)
                .prop(Prop::Width, rect.width())
                .prop(Prop::Height, rect.height())
                .prop(Prop::X, rect.x0)
                .prop(Prop::Y, rect.y0)
                .flags(InlineFlags {
                    fixed: true,
                    overflow_hidden: true,
                }),
            At::Secs(0.0),
        )?;
        player.add_class_op(
            tl,
            ClassOp::remove(self.elements.container, CLASS_CONTAINER_CLOSED),
            At::Secs(0.0),
        )?;
        if let Some(signal) = on_move {
            player.call(tl, Action::Signal(signal), At::Secs(0.0))?;
        }
        player.add_tween(
            tl,
            Tween::new(
                "float-move",
                self.elements.container,
                FLOAT_MOVE_SECS,
                Ease::OutQuad,
            )
            .prop(Prop::X, viewport.center_x())
            .prop(Prop::Y, 0.0)
            .prop(Prop::XPercent, -50.0)
            .prop(Prop::Height, viewport.height * OPEN_HEIGHT_FRAC),
            At::End,
        )?;
        player.add_tween(
            tl,
            Tween::new(
                "float-widen",
                self.elements.container,
                FLOAT_WIDEN_SECS,
                Ease::InExpo,
            )
            .prop(Prop::Width, viewport.width * OPEN_WIDTH_FRAC),
            At::End,
        )?;
        Ok(tl)
    }

    /// Decorative stagger: caption glyphs fade and drop one after another.
    fn falling_letters(&self, player: &mut Player) -> CardmotionResult<TimelineId> {
        let tl = player.timeline("falling-letters");
        for (i, &glyph) in self.elements.letters.iter().enumerate() {
            let tween = Tween::new("letter-fall", glyph, LETTER_FADE_SECS, Ease::InOutQuad)
                .prop(Prop::Alpha, 0.0)
                .prop_relative(Prop::Y, LETTER_FALL_PX);
            player.add_tween(tl, tween, At::Secs(i as f64 * LETTER_STAGGER_SECS))?;
        }
        Ok(tl)
    }

    /// Flip the stored master timeline to reverse playback and register the
    /// teardown that runs when the reversal completes: inline overrides on
    /// the container and content panel are cleared, the body scroll lock is
    /// lifted, and the card reports itself closed.
    ///
    /// Calling this before [`Card::open_card`] has built a timeline is a
    /// precondition violation.
    #[tracing::instrument(skip(self, player))]
    pub fn close_card(&mut self, player: &mut Player) -> CardmotionResult<TimelineId> {
        let tl = self.timeline.ok_or_else(|| {
            CardmotionError::animation("close_card called before open_card built a timeline")
        })?;
        player.on_reverse_complete(
            tl,
            vec![
                Action::ClearInline {
                    targets: vec![self.elements.container, self.content],
                },
                Action::RemoveClass {
                    target: self.body,
                    class: CLASS_BODY_HIDDEN.to_string(),
                },
                Action::Signal(Signal::CardClosed { card: self.id }),
            ],
        )?;
        player.reverse(tl)?;
        Ok(tl)
    }

    /// Fade+shrink tween applied to this card when a sibling opens.
    pub fn hide_card(&self) -> Tween {
        Tween::new("hide-card", self.elements.root, HIDE_SECS, Ease::InOutExpo)
            .prop(Prop::Scale, HIDE_SCALE)
            .prop(Prop::Alpha, 0.0)
    }

    /// Restore tween applied to this card when a sibling closes; leaves no
    /// inline overrides behind.
    pub fn show_card(&self) -> Tween {
        Tween::new("show-card", self.elements.root, SHOW_SECS, Ease::InOutExpo)
            .prop(Prop::Scale, 1.0)
            .prop(Prop::Alpha, 1.0)
            .clear_inline_on_complete()
    }

    pub(crate) fn set_closed(&mut self) {
        self.is_open = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cards/card.rs"]
mod tests;
