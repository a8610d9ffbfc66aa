use std::collections::BTreeMap;

/// Channel used to suspend/resume the home slider while a card is open.
pub const SWITCH_SWIPER: &str = "switch_swiper";

/// Broadcast state asking the slider to resume.
pub const STATE_ENABLE: &str = "enable";

/// Broadcast state asking the slider to suspend.
pub const STATE_DISABLE: &str = "disable";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BroadcastEvent {
    pub channel: String,
    pub state: String,
}

/// Fire-and-forget named-event publish mechanism.
///
/// Per channel the bus keeps only the latest state (last-write-wins); the
/// pending queue exists so subscribers polled once per tick still observe
/// every fire from that tick, in order. The full log is retained for
/// inspection.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct EventBus {
    last: BTreeMap<String, String>,
    pending: Vec<BroadcastEvent>,
    log: Vec<BroadcastEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self, channel: impl Into<String>, state: impl Into<String>) {
        let ev = BroadcastEvent {
            channel: channel.into(),
            state: state.into(),
        };
        self.last.insert(ev.channel.clone(), ev.state.clone());
        self.pending.push(ev.clone());
        self.log.push(ev);
    }

    /// Latest state broadcast on `channel`, if any.
    pub fn last(&self, channel: &str) -> Option<&str> {
        self.last.get(channel).map(String::as_str)
    }

    /// Take the events fired since the previous drain.
    pub fn drain(&mut self) -> Vec<BroadcastEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Every event fired since construction, in order.
    pub fn log(&self) -> &[BroadcastEvent] {
        &self.log
    }
}
