use crate::{
    animation::player::{Player, PlayerEvent},
    animation::timeline::{Action, At},
    cards::card::{Card, CardElements},
    foundation::core::{CardId, ElementId, Signal, TimelineId},
    foundation::error::{CardmotionError, CardmotionResult},
    stage::bus::{EventBus, STATE_DISABLE, STATE_ENABLE, SWITCH_SWIPER},
    stage::model::Stage,
};

/// Fraction of the close timeline after which the sibling reveal starts, so
/// the grid reappears near the end of the collapse instead of after it.
const REVEAL_AT_CLOSE_FRAC: f64 = 0.8;

/// A user gesture routed to the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Gesture {
    /// Click on a card's trigger image.
    OpenClick { card: CardId },
    /// Click on the shared close control; the target card is whichever one
    /// was recorded on the control when it opened.
    CloseClick,
}

/// The sequencer: owns the cards in page order and turns gestures into
/// top-level sequences.
///
/// Built once per page; the card list is never mutated after bind.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layout {
    cards: Vec<Card>,
    body: ElementId,
    content: ElementId,
    close_control: ElementId,
    last_open: Option<CardId>,
}

impl Layout {
    /// Construct one card per binding, in the order given (page order).
    pub fn bind(
        body: ElementId,
        content: ElementId,
        close_control: ElementId,
        bindings: Vec<CardElements>,
    ) -> Self {
        let cards = bindings
            .into_iter()
            .enumerate()
            .map(|(i, elements)| Card::new(CardId(i), elements, content, body))
            .collect();
        Self {
            cards,
            body,
            content,
            close_control,
            last_open: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> CardmotionResult<&Card> {
        self.cards
            .get(id.0)
            .ok_or_else(|| CardmotionError::validation(format!("unknown card id {}", id.0)))
    }

    fn card_mut(&mut self, id: CardId) -> CardmotionResult<&mut Card> {
        self.cards
            .get_mut(id.0)
            .ok_or_else(|| CardmotionError::validation(format!("unknown card id {}", id.0)))
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn content(&self) -> ElementId {
        self.content
    }

    pub fn close_control(&self) -> ElementId {
        self.close_control
    }

    /// Card currently recorded on the close control.
    pub fn last_open(&self) -> Option<CardId> {
        self.last_open
    }

    /// Build and start the sequence for one gesture.
    ///
    /// Returns `Ok(None)` for the one no-op case: an open gesture on a card
    /// that is already open. Everything else assembles a paused sequence —
    /// sibling visibility plus the target card's open or close timeline —
    /// and then explicitly plays it.
    #[tracing::instrument(skip(self, stage, player, bus))]
    pub fn dispatch(
        &mut self,
        gesture: Gesture,
        stage: &mut Stage,
        player: &mut Player,
        bus: &mut EventBus,
    ) -> CardmotionResult<Option<TimelineId>> {
        let (id, is_open_click) = match gesture {
            Gesture::OpenClick { card } => (card, true),
            Gesture::CloseClick => {
                let card = self.last_open.ok_or_else(|| {
                    CardmotionError::sequence("close control has no card recorded")
                })?;
                (card, false)
            }
        };

        // Prevent re-opening a card that is already open.
        if self.card(id)?.is_open() && is_open_click {
            return Ok(None);
        }

        let sequence = player.timeline("main");
        let others = self.show_hide_other_cards(id, player)?;

        if !self.card(id)?.is_open() {
            self.last_open = Some(id);

            let open =
                self.card_mut(id)?
                    .open_card(stage, player, Some(Signal::CardMove { card: id }))?;
            player.add_nested(sequence, others, At::End)?;
            player.add_nested(sequence, open, At::Secs(0.0))?;
            player.call(
                sequence,
                Action::Broadcast {
                    channel: SWITCH_SWIPER.to_string(),
                    state: STATE_DISABLE.to_string(),
                },
                At::Secs(0.0),
            )?;
        } else {
            // Re-enabling the slider is not synchronized to the animation;
            // it goes out before the sequence even starts.
            bus.fire(SWITCH_SWIPER, STATE_ENABLE);

            let close = self.card_mut(id)?.close_card(player)?;
            let reveal_at = player.duration(close)? * REVEAL_AT_CLOSE_FRAC;
            player.add_nested(sequence, close, At::End)?;
            player.add_nested(sequence, others, At::Secs(reveal_at))?;
        }

        player.play(sequence)?;
        Ok(Some(sequence))
    }

    /// Timeline toggling every card except the selected one, all at offset
    /// zero: hide them when the selected card is about to open, show them
    /// when it is about to close.
    fn show_hide_other_cards(
        &self,
        id: CardId,
        player: &mut Player,
    ) -> CardmotionResult<TimelineId> {
        let tl = player.timeline("other-cards");
        let selected_open = self.card(id)?.is_open();
        for card in &self.cards {
            if card.id == id {
                continue;
            }
            let tween = if selected_open {
                card.show_card()
            } else {
                card.hide_card()
            };
            player.add_tween(tl, tween, At::Secs(0.0))?;
        }
        Ok(tl)
    }

    /// Route player events back onto card state. A completed reversal is the
    /// only thing that marks a card closed.
    pub fn handle_events(&mut self, events: &[PlayerEvent]) {
        for event in events {
            if let PlayerEvent::Signaled(Signal::CardClosed { card }) = event
                && let Ok(card) = self.card_mut(*card)
            {
                card.set_closed();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cards/layout.rs"]
mod tests;
