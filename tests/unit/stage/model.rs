use super::*;
use crate::foundation::core::{Rect, Viewport};

fn stage() -> Stage {
    Stage::new(Viewport::new(1440.0, 900.0).unwrap())
}

#[test]
fn resolve_prefers_inline_over_base_over_default() {
    let mut stage = stage();
    let el = stage.add_element("tile", [(Prop::Width, 320.0)]);

    assert_eq!(stage.resolve(el, Prop::Width).unwrap(), 320.0);
    assert_eq!(stage.resolve(el, Prop::Scale).unwrap(), 1.0);
    assert_eq!(stage.resolve(el, Prop::X).unwrap(), 0.0);

    stage.set_inline(el, Prop::Width, 100.0).unwrap();
    assert_eq!(stage.resolve(el, Prop::Width).unwrap(), 100.0);
}

#[test]
fn clear_inline_restores_base_style_and_flags() {
    let mut stage = stage();
    let el = stage.add_element("tile", [(Prop::X, 60.0)]);
    stage.set_inline(el, Prop::X, 720.0).unwrap();
    stage
        .set_flags(
            el,
            InlineFlags {
                fixed: true,
                overflow_hidden: true,
            },
        )
        .unwrap();

    stage.clear_inline(el).unwrap();
    assert_eq!(stage.resolve(el, Prop::X).unwrap(), 60.0);
    assert_eq!(stage.flags(el).unwrap(), InlineFlags::default());
}

#[test]
fn clear_inline_leaves_classes_alone() {
    let mut stage = stage();
    let el = stage.add_element("tile", []);
    stage.add_class(el, "card__container--closed").unwrap();
    stage.set_inline(el, Prop::Alpha, 0.0).unwrap();

    stage.clear_inline(el).unwrap();
    assert!(stage.has_class(el, "card__container--closed").unwrap());
}

#[test]
fn bounding_rect_follows_effective_style() {
    let mut stage = stage();
    let el = stage.add_element_at("tile", Rect::new(60.0, 400.0, 380.0, 600.0));

    assert_eq!(
        stage.bounding_rect(el).unwrap(),
        Rect::new(60.0, 400.0, 380.0, 600.0)
    );

    stage.set_inline(el, Prop::X, 720.0).unwrap();
    stage.set_inline(el, Prop::XPercent, -50.0).unwrap();
    let rect = stage.bounding_rect(el).unwrap();
    // XPercent shifts by half the element's own width.
    assert_eq!(rect.x0, 720.0 - 160.0);
    assert_eq!(rect.width(), 320.0);
}

#[test]
fn unknown_element_ids_are_validation_errors() {
    let stage = stage();
    let missing = crate::foundation::core::ElementId(99);
    assert!(matches!(
        stage.resolve(missing, Prop::X),
        Err(CardmotionError::Validation(_))
    ));
}
