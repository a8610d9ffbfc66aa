use super::*;
use crate::animation::player::ChildInfo;
use crate::foundation::core::{Rect, Viewport};

fn fixture(cards: usize) -> (Stage, Player, EventBus, Layout) {
    let mut stage = Stage::new(Viewport::new(1440.0, 900.0).unwrap());
    let body = stage.add_element_at("body", Rect::new(0.0, 0.0, 1440.0, 900.0));
    let content = stage.add_element_at("content", Rect::new(0.0, 0.0, 1440.0, 900.0));
    let close = stage.add_element_at("closecross", Rect::new(1360.0, 40.0, 1400.0, 80.0));

    let mut bindings = Vec::new();
    for i in 0..cards {
        let x = 60.0 + i as f64 * 360.0;
        let tile = Rect::new(x, 400.0, x + 320.0, 600.0);
        bindings.push(CardElements {
            root: stage.add_element_at(format!("card-{i}"), tile),
            container: stage.add_element_at(format!("card-{i}-container"), tile.inset(-8.0)),
            clip: stage.add_element_at(format!("card-{i}-clip"), tile.inset(-12.0)),
            letters: vec![
                stage.add_element_at(format!("card-{i}-letter-0"), Rect::new(x, 376.0, x + 18.0, 400.0)),
            ],
        });
    }
    (
        stage,
        Player::new(),
        EventBus::new(),
        Layout::bind(body, content, close, bindings),
    )
}

fn nested_named(player: &Player, seq: TimelineId, name: &str) -> TimelineId {
    player
        .describe(seq)
        .unwrap()
        .into_iter()
        .find_map(|c| match c {
            ChildInfo::Nested {
                timeline,
                name: n,
                ..
            } if n == name => Some(timeline),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no nested timeline named '{name}'"))
}

fn tween_names(player: &Player, tl: TimelineId) -> Vec<String> {
    player
        .describe(tl)
        .unwrap()
        .into_iter()
        .filter_map(|c| match c {
            ChildInfo::Tween { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

#[test]
fn open_dispatch_builds_siblings_card_and_broadcast_at_zero() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(3);

    let seq = layout
        .dispatch(
            Gesture::OpenClick { card: CardId(1) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap()
        .expect("open builds a sequence");

    assert!(layout.card(CardId(1)).unwrap().is_open());
    assert_eq!(layout.last_open(), Some(CardId(1)));

    let children = player.describe(seq).unwrap();
    assert_eq!(children.len(), 3);
    for child in &children {
        let at = match child {
            ChildInfo::Nested { at, .. } | ChildInfo::Call { at, .. } => *at,
            other => panic!("unexpected child {other:?}"),
        };
        assert_eq!(at, 0.0);
    }

    let others = nested_named(&player, seq, "other-cards");
    let names = tween_names(&player, others);
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n == "hide-card"));
}

#[test]
fn open_gesture_on_an_open_card_is_a_no_op() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(3);
    layout
        .dispatch(
            Gesture::OpenClick { card: CardId(1) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap();
    let before = player.timeline_count();
    let fired = bus.log().len();

    let result = layout
        .dispatch(
            Gesture::OpenClick { card: CardId(1) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap();

    assert!(result.is_none());
    assert_eq!(player.timeline_count(), before);
    assert_eq!(bus.log().len(), fired);
    assert!(layout.card(CardId(1)).unwrap().is_open());
}

#[test]
fn disable_broadcast_fires_at_sequence_start_exactly_once() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(3);
    layout
        .dispatch(
            Gesture::OpenClick { card: CardId(0) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap();

    // Synchronously nothing has been broadcast; the disable call sits at
    // relative time zero inside the sequence.
    assert!(bus.log().is_empty());

    player.advance(&mut stage, &mut bus, 1.0 / 60.0).unwrap();
    assert_eq!(bus.last(SWITCH_SWIPER), Some(STATE_DISABLE));
    assert_eq!(bus.log().len(), 1);

    player.advance(&mut stage, &mut bus, 1.0 / 60.0).unwrap();
    assert_eq!(bus.log().len(), 1);
}

#[test]
fn close_dispatch_reveals_siblings_at_eighty_percent_of_the_collapse() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(3);
    layout
        .dispatch(
            Gesture::OpenClick { card: CardId(1) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap();
    // Drive the open sequence to rest first.
    for _ in 0..120 {
        player.advance(&mut stage, &mut bus, 1.0 / 60.0).unwrap();
    }

    let seq = layout
        .dispatch(Gesture::CloseClick, &mut stage, &mut player, &mut bus)
        .unwrap()
        .expect("close builds a sequence");

    // Enable goes out before the sequence has moved at all.
    assert_eq!(bus.last(SWITCH_SWIPER), Some(STATE_ENABLE));
    assert_eq!(player.playhead(seq).unwrap(), 0.0);

    let close = nested_named(&player, seq, "card");
    let close_secs = player.duration(close).unwrap();
    let children = player.describe(seq).unwrap();
    let reveal_at = children
        .iter()
        .find_map(|c| match c {
            ChildInfo::Nested { name, at, .. } if name == "other-cards" => Some(*at),
            _ => None,
        })
        .expect("sibling reveal present");
    assert!((reveal_at - close_secs * 0.8).abs() < 1e-12);
    assert!(reveal_at > 0.0);
    assert!(reveal_at < close_secs);

    let others = nested_named(&player, seq, "other-cards");
    let names = tween_names(&player, others);
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n == "show-card"));
}

#[test]
fn close_without_a_recorded_card_is_a_sequence_error() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(2);
    let err = layout
        .dispatch(Gesture::CloseClick, &mut stage, &mut player, &mut bus)
        .unwrap_err();
    assert!(matches!(err, CardmotionError::Sequence(_)));
}

#[test]
fn unknown_card_ids_are_validation_errors() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(2);
    let err = layout
        .dispatch(
            Gesture::OpenClick { card: CardId(9) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap_err();
    assert!(matches!(err, CardmotionError::Validation(_)));
}

#[test]
fn a_completed_reversal_is_what_closes_the_card() {
    let (mut stage, mut player, mut bus, mut layout) = fixture(3);
    layout
        .dispatch(
            Gesture::OpenClick { card: CardId(2) },
            &mut stage,
            &mut player,
            &mut bus,
        )
        .unwrap();
    for _ in 0..120 {
        let events = player.advance(&mut stage, &mut bus, 1.0 / 60.0).unwrap();
        layout.handle_events(&events);
    }
    assert!(layout.card(CardId(2)).unwrap().is_open());

    layout
        .dispatch(Gesture::CloseClick, &mut stage, &mut player, &mut bus)
        .unwrap();
    // Still open until the reversal has actually completed.
    assert!(layout.card(CardId(2)).unwrap().is_open());

    for _ in 0..200 {
        let events = player.advance(&mut stage, &mut bus, 1.0 / 60.0).unwrap();
        layout.handle_events(&events);
        if player.idle() {
            break;
        }
    }
    assert!(!layout.card(CardId(2)).unwrap().is_open());
}
