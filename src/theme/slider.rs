use crate::{
    foundation::core::ElementId,
    foundation::error::CardmotionResult,
    stage::bus::STATE_DISABLE,
    stage::model::{Prop, Stage},
};

/// Height cap applied to the slider container while a card is open.
const DISABLED_MAX_HEIGHT: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SliderState {
    Enabled,
    Disabled,
}

/// The `switch_swiper` subscriber: collapses the home slider while a card
/// is open and restores it afterwards. Unknown states fall back to enable.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SliderSwitch {
    container: ElementId,
    pagination: ElementId,
    state: SliderState,
}

impl SliderSwitch {
    pub fn new(container: ElementId, pagination: ElementId) -> Self {
        Self {
            container,
            pagination,
            state: SliderState::Enabled,
        }
    }

    pub fn state(&self) -> SliderState {
        self.state
    }

    pub fn apply(&mut self, state: &str, stage: &mut Stage) -> CardmotionResult<()> {
        if state == STATE_DISABLE {
            stage.set_inline(self.container, Prop::MaxHeight, DISABLED_MAX_HEIGHT)?;
            stage.set_inline(self.pagination, Prop::Alpha, 0.0)?;
            self.state = SliderState::Disabled;
        } else {
            stage.clear_inline(self.container)?;
            stage.clear_inline(self.pagination)?;
            self.state = SliderState::Enabled;
        }
        Ok(())
    }
}
