use crate::{
    animation::player::{Player, PlayerEvent},
    cards::card::CardElements,
    cards::layout::{Gesture, Layout},
    foundation::core::{CardId, Point, Rect, Signal, TimelineId, Viewport},
    foundation::error::{CardmotionError, CardmotionResult},
    foundation::math::rect_circle,
    stage::bus::{EventBus, SWITCH_SWIPER},
    stage::model::Stage,
    theme::slider::SliderSwitch,
};

/// Default responsive breakpoint below which the page counts as mobile.
pub const MOBILE_BREAKPOINT: f64 = 992.0;

const TILE_W: f64 = 320.0;
const TILE_H: f64 = 200.0;
const TILE_GAP: f64 = 40.0;
const TILE_LEFT: f64 = 60.0;
const TILE_TOP: f64 = 400.0;
const CONTAINER_INSET: f64 = 8.0;
const CLIP_INSET: f64 = 12.0;
const LETTERS_PER_CARD: usize = 8;
const LETTER_W: f64 = 18.0;
const LETTER_H: f64 = 24.0;

/// Cached viewport bookkeeping, refreshed on resize.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThemeConfig {
    pub viewport: Viewport,
    pub is_mobile: bool,
    pub mobile_breakpoint: f64,
}

impl ThemeConfig {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            is_mobile: viewport.width < MOBILE_BREAKPOINT,
            mobile_breakpoint: MOBILE_BREAKPOINT,
        }
    }

    /// Refresh cached values; returns whether the width actually changed
    /// (height-only changes are ignored, as the page treats them).
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport.width == self.viewport.width {
            return false;
        }
        self.viewport = viewport;
        self.is_mobile = viewport.width < self.mobile_breakpoint;
        true
    }
}

/// Circle bookkeeping refreshed by card-move signals: the floating
/// container's center and half-width, ready for a circular hit-test.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CircleTrack {
    pub center: Point,
    pub radius: f64,
}

/// Page bootstrap: owns the stage, player, bus, layout, and slider glue,
/// and exposes the gesture entry points plus the tick loop.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct App {
    pub stage: Stage,
    pub player: Player,
    pub bus: EventBus,
    pub layout: Layout,
    pub slider: SliderSwitch,
    config: ThemeConfig,
    track: Option<CircleTrack>,
}

impl App {
    /// Build a standard demo page: body, content panel, close control,
    /// slider, and `card_count` tiles laid out in one row.
    pub fn bootstrap(viewport: Viewport, card_count: usize) -> CardmotionResult<Self> {
        if card_count == 0 {
            return Err(CardmotionError::validation(
                "bootstrap requires at least one card",
            ));
        }

        let mut stage = Stage::new(viewport);
        let body = stage.add_element_at(
            "body",
            Rect::new(0.0, 0.0, viewport.width, viewport.height),
        );
        let content = stage.add_element_at(
            "ajax-content",
            Rect::new(0.0, 0.0, viewport.width, viewport.height),
        );
        let close_control = stage.add_element_at(
            "closecross",
            Rect::new(viewport.width - 80.0, 40.0, viewport.width - 40.0, 80.0),
        );
        let slider_container = stage.add_element_at(
            "swiper-container",
            Rect::new(0.0, 0.0, viewport.width, viewport.height * 0.6),
        );
        let slider_pagination = stage.add_element_at(
            "swiper-pagination",
            Rect::new(
                viewport.width / 2.0 - 100.0,
                viewport.height * 0.6 - 20.0,
                viewport.width / 2.0 + 100.0,
                viewport.height * 0.6,
            ),
        );

        let mut bindings = Vec::with_capacity(card_count);
        for i in 0..card_count {
            let x = TILE_LEFT + i as f64 * (TILE_W + TILE_GAP);
            let tile = Rect::new(x, TILE_TOP, x + TILE_W, TILE_TOP + TILE_H);
            let root = stage.add_element_at(format!("card-{i}"), tile);
            let container = stage.add_element_at(
                format!("card-{i}-container"),
                tile.inset(-CONTAINER_INSET),
            );
            let clip =
                stage.add_element_at(format!("card-{i}-clip"), tile.inset(-CLIP_INSET));
            let letters = (0..LETTERS_PER_CARD)
                .map(|l| {
                    let lx = x + l as f64 * LETTER_W;
                    stage.add_element_at(
                        format!("card-{i}-letter-{l}"),
                        Rect::new(lx, TILE_TOP - LETTER_H, lx + LETTER_W, TILE_TOP),
                    )
                })
                .collect();
            bindings.push(CardElements {
                root,
                container,
                clip,
                letters,
            });
        }

        let layout = Layout::bind(body, content, close_control, bindings);
        let slider = SliderSwitch::new(slider_container, slider_pagination);

        Ok(Self {
            stage,
            player: Player::new(),
            bus: EventBus::new(),
            layout,
            slider,
            config: ThemeConfig::new(viewport),
            track: None,
        })
    }

    pub fn config(&self) -> ThemeConfig {
        self.config
    }

    /// Latest circle bookkeeping from card-move signals, if any.
    pub fn track(&self) -> Option<CircleTrack> {
        self.track
    }

    pub fn click_card(&mut self, card: usize) -> CardmotionResult<Option<TimelineId>> {
        self.layout.dispatch(
            Gesture::OpenClick {
                card: CardId(card),
            },
            &mut self.stage,
            &mut self.player,
            &mut self.bus,
        )
    }

    pub fn click_close(&mut self) -> CardmotionResult<Option<TimelineId>> {
        self.layout.dispatch(
            Gesture::CloseClick,
            &mut self.stage,
            &mut self.player,
            &mut self.bus,
        )
    }

    /// One animation frame: advance playback, route events to the layout,
    /// and deliver broadcasts fired this tick to their subscribers.
    #[tracing::instrument(skip(self))]
    pub fn tick(&mut self, dt: f64) -> CardmotionResult<Vec<PlayerEvent>> {
        let events = self.player.advance(&mut self.stage, &mut self.bus, dt)?;
        self.layout.handle_events(&events);

        for event in &events {
            if let PlayerEvent::Signaled(Signal::CardMove { card }) = event {
                let container = self.layout.card(*card)?.elements().container;
                let (center, radius) = rect_circle(self.stage.bounding_rect(container)?);
                self.track = Some(CircleTrack { center, radius });
            }
        }

        for broadcast in self.bus.drain() {
            if broadcast.channel == SWITCH_SWIPER {
                self.slider.apply(&broadcast.state, &mut self.stage)?;
            }
        }
        Ok(events)
    }

    /// Tick until no root timeline is active, collecting all events.
    pub fn run_until_idle(&mut self, dt: f64) -> CardmotionResult<Vec<PlayerEvent>> {
        const MAX_TICKS: usize = 100_000;
        let mut events = Vec::new();
        for _ in 0..MAX_TICKS {
            if self.player.idle() {
                return Ok(events);
            }
            events.extend(self.tick(dt)?);
        }
        Err(CardmotionError::sequence(
            "playback did not settle within the tick budget",
        ))
    }

    /// Window-resize bookkeeping; the stage viewport follows the config.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let changed = self.config.resize(viewport);
        if changed {
            self.stage.set_viewport(viewport);
        }
        changed
    }
}
