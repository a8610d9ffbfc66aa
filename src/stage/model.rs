use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::{
    core::{ElementId, Rect, Viewport},
    error::{CardmotionError, CardmotionResult},
};

/// Tweenable scalar style properties.
///
/// Percent translations are relative to the element's own size, so
/// `XPercent = -50` shifts an element left by half its width.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Prop {
    X,
    Y,
    XPercent,
    YPercent,
    Width,
    Height,
    MaxHeight,
    Scale,
    Alpha,
}

impl Prop {
    /// Value an element reports when neither base style nor an inline
    /// override provides one.
    pub fn default_value(self) -> f64 {
        match self {
            Self::Scale | Self::Alpha => 1.0,
            _ => 0.0,
        }
    }
}

/// Discrete inline state written by zero-duration set steps and removed by
/// [`Stage::clear_inline`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InlineFlags {
    pub fixed: bool,
    pub overflow_hidden: bool,
}

/// One stage element: base style from the page layout, inline overrides
/// written by animations, and a class set.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Element {
    pub name: String,
    base: BTreeMap<Prop, f64>,
    inline: BTreeMap<Prop, f64>,
    flags: InlineFlags,
    classes: BTreeSet<String>,
}

/// Headless stand-in for the document: a viewport plus a flat element table.
///
/// Effective style is inline-over-base; [`Stage::clear_inline`] is the
/// "clear all overrides" operation that closing animations rely on to
/// restore an element to its page layout.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Stage {
    viewport: Viewport,
    elements: Vec<Element>,
}

impl Stage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            elements: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        base: impl IntoIterator<Item = (Prop, f64)>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            name: name.into(),
            base: base.into_iter().collect(),
            inline: BTreeMap::new(),
            flags: InlineFlags::default(),
            classes: BTreeSet::new(),
        });
        id
    }

    /// Add an element whose base style is a page rect.
    pub fn add_element_at(&mut self, name: impl Into<String>, rect: Rect) -> ElementId {
        self.add_element(
            name,
            [
                (Prop::X, rect.x0),
                (Prop::Y, rect.y0),
                (Prop::Width, rect.width()),
                (Prop::Height, rect.height()),
            ],
        )
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn element(&self, id: ElementId) -> CardmotionResult<&Element> {
        self.elements
            .get(id.0)
            .ok_or_else(|| CardmotionError::validation(format!("unknown element id {}", id.0)))
    }

    fn element_mut(&mut self, id: ElementId) -> CardmotionResult<&mut Element> {
        self.elements
            .get_mut(id.0)
            .ok_or_else(|| CardmotionError::validation(format!("unknown element id {}", id.0)))
    }

    pub fn name(&self, id: ElementId) -> CardmotionResult<&str> {
        Ok(&self.element(id)?.name)
    }

    /// Effective value of `prop`: inline override, else base style, else the
    /// property default.
    pub fn resolve(&self, id: ElementId, prop: Prop) -> CardmotionResult<f64> {
        let el = self.element(id)?;
        Ok(el
            .inline
            .get(&prop)
            .or_else(|| el.base.get(&prop))
            .copied()
            .unwrap_or_else(|| prop.default_value()))
    }

    pub fn inline(&self, id: ElementId, prop: Prop) -> CardmotionResult<Option<f64>> {
        Ok(self.element(id)?.inline.get(&prop).copied())
    }

    pub fn set_inline(&mut self, id: ElementId, prop: Prop, value: f64) -> CardmotionResult<()> {
        self.element_mut(id)?.inline.insert(prop, value);
        Ok(())
    }

    pub fn remove_inline(&mut self, id: ElementId, prop: Prop) -> CardmotionResult<Option<f64>> {
        Ok(self.element_mut(id)?.inline.remove(&prop))
    }

    /// Drop every inline override and inline flag, restoring the element to
    /// its page layout. Classes are untouched.
    pub fn clear_inline(&mut self, id: ElementId) -> CardmotionResult<()> {
        let el = self.element_mut(id)?;
        el.inline.clear();
        el.flags = InlineFlags::default();
        Ok(())
    }

    pub fn flags(&self, id: ElementId) -> CardmotionResult<InlineFlags> {
        Ok(self.element(id)?.flags)
    }

    pub fn set_flags(&mut self, id: ElementId, flags: InlineFlags) -> CardmotionResult<()> {
        self.element_mut(id)?.flags = flags;
        Ok(())
    }

    pub fn add_class(&mut self, id: ElementId, class: impl Into<String>) -> CardmotionResult<()> {
        self.element_mut(id)?.classes.insert(class.into());
        Ok(())
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) -> CardmotionResult<()> {
        self.element_mut(id)?.classes.remove(class);
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> CardmotionResult<bool> {
        Ok(self.element(id)?.classes.contains(class))
    }

    /// Live bounding rect from effective style.
    ///
    /// Percent translations are applied against the element's own effective
    /// size. Scale and alpha are visual-only and do not move the rect.
    pub fn bounding_rect(&self, id: ElementId) -> CardmotionResult<Rect> {
        let w = self.resolve(id, Prop::Width)?;
        let h = self.resolve(id, Prop::Height)?;
        let x = self.resolve(id, Prop::X)? + self.resolve(id, Prop::XPercent)? / 100.0 * w;
        let y = self.resolve(id, Prop::Y)? + self.resolve(id, Prop::YPercent)? / 100.0 * h;
        Ok(Rect::new(x, y, x + w, y + h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/model.rs"]
mod tests;
