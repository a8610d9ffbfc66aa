//! Cardmotion is a headless animation sequencing engine for card-grid pages.
//!
//! It models the open/close choreography of a card grid — a clicked tile
//! floats from its grid rect to a fixed, centered detail rect while sibling
//! tiles fade away — as one reversible timeline played against a [`Stage`]
//! (an explicit element model standing in for the document).
//!
//! # Pipeline overview
//!
//! 1. **Bind**: [`Layout::bind`] builds one [`Card`] per tile, in page order
//! 2. **Dispatch**: a [`Gesture`] becomes a paused top-level sequence
//!    (sibling show/hide plus the target card's open or close timeline)
//! 3. **Play**: the sequence is explicitly started; [`Player::advance`]
//!    scrubs it against the stage once per animation frame
//! 4. **Settle**: completion events flow back to the layout — a finished
//!    reverse playback is the only thing that marks a card closed
//!
//! Key constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: insertion offsets are resolved once, at build time,
//!   from declared durations; playback is a pure function of elapsed ticks.
//! - **Single-threaded**: all "concurrency" is offset scheduling inside one
//!   advance pass, never separate execution contexts.
#![forbid(unsafe_code)]

mod animation;
mod cards;
mod foundation;
mod stage;
mod theme;

pub use animation::ease::Ease;
pub use animation::player::{ChildInfo, Player, PlayerEvent};
pub use animation::timeline::{Action, At, ClassOp, Direction, PlayState, SetStep};
pub use animation::tween::{PropTo, Tween};
pub use cards::card::{CLASS_BODY_HIDDEN, CLASS_CONTAINER_CLOSED, Card, CardElements};
pub use cards::layout::{Gesture, Layout};
pub use foundation::core::{CardId, ElementId, Point, Rect, Signal, TimelineId, Vec2, Viewport};
pub use foundation::error::{CardmotionError, CardmotionResult};
pub use foundation::math::{point_in_circle, rect_circle};
pub use stage::bus::{BroadcastEvent, EventBus, STATE_DISABLE, STATE_ENABLE, SWITCH_SWIPER};
pub use stage::model::{Element, InlineFlags, Prop, Stage};
pub use theme::app::{App, CircleTrack, MOBILE_BREAKPOINT, ThemeConfig};
pub use theme::slider::{SliderState, SliderSwitch};
pub use theme::transitions::{
    CLASS_LOADER_VISIBLE, CLASS_PAGE_INVISIBLE, Next, PageTransitions,
};
