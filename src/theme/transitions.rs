use crate::{
    foundation::core::ElementId,
    foundation::error::{CardmotionError, CardmotionResult},
    stage::model::Stage,
};

/// Class put on the loader while a page transition is in flight.
pub const CLASS_LOADER_VISIBLE: &str = "is-visible";

/// Class put on the page wrapper while its content is being swapped.
pub const CLASS_PAGE_INVISIBLE: &str = "is-invisible";

/// Single-resolution continuation handed to transition hooks.
///
/// The owner of the transition lifecycle passes one of these to each hook
/// and expects it to be resolved exactly once when the hook's own visual
/// work is finished.
#[derive(Debug, Default)]
pub struct Next {
    calls: u32,
}

impl Next {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call(&mut self) -> CardmotionResult<()> {
        if self.calls > 0 {
            return Err(CardmotionError::sequence(
                "transition continuation resolved more than once",
            ));
        }
        self.calls = 1;
        Ok(())
    }

    pub fn was_called(&self) -> bool {
        self.calls > 0
    }
}

/// Page-transition hooks: show the loader on the way out, hide it on the
/// way in, and resolve `next` once the local work is done.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PageTransitions {
    loader: ElementId,
    page: ElementId,
}

impl PageTransitions {
    pub fn new(loader: ElementId, page: ElementId) -> Self {
        Self { loader, page }
    }

    /// Outgoing hook: cover the page, then hand control back.
    pub fn leave(&self, stage: &mut Stage, next: &mut Next) -> CardmotionResult<()> {
        stage.add_class(self.loader, CLASS_LOADER_VISIBLE)?;
        stage.add_class(self.page, CLASS_PAGE_INVISIBLE)?;
        next.call()
    }

    /// Incoming hook: uncover the new page, then hand control back.
    pub fn enter(&self, stage: &mut Stage, next: &mut Next) -> CardmotionResult<()> {
        stage.remove_class(self.loader, CLASS_LOADER_VISIBLE)?;
        stage.remove_class(self.page, CLASS_PAGE_INVISIBLE)?;
        next.call()
    }
}
