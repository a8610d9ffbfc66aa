use super::*;
use crate::animation::player::{ChildInfo, PlayerEvent};
use crate::foundation::core::{Rect, Viewport};
use crate::stage::bus::EventBus;

fn fixture() -> (Stage, Player, EventBus, Card) {
    let mut stage = Stage::new(Viewport::new(1440.0, 900.0).unwrap());
    let body = stage.add_element_at("body", Rect::new(0.0, 0.0, 1440.0, 900.0));
    let content = stage.add_element_at("content", Rect::new(0.0, 0.0, 1440.0, 900.0));
    let root = stage.add_element_at("card-0", Rect::new(60.0, 400.0, 380.0, 600.0));
    let container = stage.add_element_at("card-0-container", Rect::new(68.0, 408.0, 372.0, 592.0));
    let clip = stage.add_element_at("card-0-clip", Rect::new(72.0, 412.0, 368.0, 588.0));
    let letters = (0..3)
        .map(|i| {
            stage.add_element_at(
                format!("letter-{i}"),
                Rect::new(60.0 + i as f64 * 18.0, 376.0, 78.0 + i as f64 * 18.0, 400.0),
            )
        })
        .collect();

    let card = Card::new(
        CardId(0),
        CardElements {
            root,
            container,
            clip,
            letters,
        },
        content,
        body,
    );
    (stage, Player::new(), EventBus::new(), card)
}

#[test]
fn open_card_marks_open_immediately_and_stores_the_timeline() {
    let (mut stage, mut player, _bus, mut card) = fixture();
    assert!(!card.is_open());
    assert!(card.timeline().is_none());

    let tl = card.open_card(&mut stage, &mut player, None).unwrap();
    assert!(card.is_open());
    assert_eq!(card.timeline(), Some(tl));
    // Nothing has played yet; the flag is set at build time.
    assert_eq!(player.playhead(tl).unwrap(), 0.0);
}

#[test]
fn open_timeline_composes_slide_float_and_letters_in_parallel() {
    let (mut stage, mut player, _bus, mut card) = fixture();
    let tl = card.open_card(&mut stage, &mut player, None).unwrap();

    let children = player.describe(tl).unwrap();
    assert_eq!(children.len(), 3);
    assert!(matches!(
        &children[0],
        ChildInfo::Tween { name, at, .. } if name == "slide-content-down" && *at == 0.0
    ));
    assert!(matches!(
        &children[1],
        ChildInfo::Nested { name, at, .. } if name == "float-container" && *at == 0.0
    ));
    assert!(matches!(
        &children[2],
        ChildInfo::Nested { name, at, .. } if name == "falling-letters" && *at == 0.0
    ));

    // Float: move for 0.8s, then widen for 0.3s chained after it.
    let float = children
        .iter()
        .find_map(|c| match c {
            ChildInfo::Nested { timeline, name, .. } if name == "float-container" => {
                Some(*timeline)
            }
            _ => None,
        })
        .unwrap();
    let steps = player.describe(float).unwrap();
    assert!(steps.iter().any(|c| matches!(
        c,
        ChildInfo::Tween { name, at, .. } if name == "float-widen" && (*at - 0.8).abs() < 1e-12
    )));
    assert_eq!(player.duration(float).unwrap(), 1.1);
}

#[test]
fn open_card_adds_the_body_scroll_lock() {
    let (mut stage, mut player, _bus, mut card) = fixture();
    card.open_card(&mut stage, &mut player, None).unwrap();
    // The body is element 0 in the fixture.
    assert!(stage.has_class(ElementId(0), CLASS_BODY_HIDDEN).unwrap());
}

#[test]
fn float_origin_is_read_at_build_time_not_play_time() {
    let (mut stage, mut player, mut bus, mut card) = fixture();
    let container = card.elements().container;
    let built_rect = stage.bounding_rect(container).unwrap();

    let tl = card.open_card(&mut stage, &mut player, None).unwrap();

    // Disturb the container after the timeline was built; the set step must
    // still depart from the rect captured at build time.
    stage.set_inline(container, Prop::X, 9999.0).unwrap();

    player.play(tl).unwrap();
    player.advance(&mut stage, &mut bus, 0.001).unwrap();
    assert!(stage.flags(container).unwrap().fixed);
    let x = stage.inline(container, Prop::X).unwrap().unwrap();
    // One millisecond into a 0.8s tween the origin still dominates.
    assert!((x - built_rect.x0).abs() < 5.0, "x departed from {x}");
}

#[test]
fn close_before_open_is_a_precondition_error() {
    let (_stage, mut player, _bus, mut card) = fixture();
    let err = card.close_card(&mut player).unwrap_err();
    assert!(matches!(err, CardmotionError::Animation(_)));
}

#[test]
fn close_reverses_the_master_and_tears_down_on_completion() {
    let (mut stage, mut player, mut bus, mut card) = fixture();
    let container = card.elements().container;
    let content = ElementId(1);

    let tl = card.open_card(&mut stage, &mut player, None).unwrap();
    player.play(tl).unwrap();
    player.advance(&mut stage, &mut bus, 2.0).unwrap();
    assert!(stage.inline(container, Prop::X).unwrap().is_some());
    assert!(stage.inline(content, Prop::Y).unwrap().is_some());

    let reversed = card.close_card(&mut player).unwrap();
    assert_eq!(reversed, tl);

    let mut saw_closed = false;
    for _ in 0..200 {
        let events = player.advance(&mut stage, &mut bus, 0.05).unwrap();
        if events.contains(&PlayerEvent::Signaled(Signal::CardClosed { card: CardId(0) })) {
            saw_closed = true;
        }
        if player.idle() {
            break;
        }
    }
    assert!(saw_closed);
    assert_eq!(stage.inline(container, Prop::X).unwrap(), None);
    assert_eq!(stage.inline(content, Prop::Y).unwrap(), None);
    assert!(!stage.flags(container).unwrap().fixed);
    assert!(!stage.has_class(ElementId(0), CLASS_BODY_HIDDEN).unwrap());

    // The flag itself is flipped by the layout when it sees the signal.
    assert!(card.is_open());
    card.set_closed();
    assert!(!card.is_open());
}

#[test]
fn hide_and_show_tweens_have_the_sibling_shapes() {
    let (_stage, _player, _bus, card) = fixture();

    let hide = card.hide_card();
    assert_eq!(hide.name, "hide-card");
    assert_eq!(hide.duration(), 0.4);
    assert!(!hide.clear_inline_on_complete);

    let show = card.show_card();
    assert_eq!(show.name, "show-card");
    assert_eq!(show.duration(), 0.5);
    assert!(show.clear_inline_on_complete);
}
