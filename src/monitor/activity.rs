/// Interaction signals that count as "the user is still here".
/// Only occurrence matters; nothing about the event payload is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerMove,
    PointerDown,
    KeyDown,
    TouchStart,
    Scroll,
    VisibilityChange,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::PointerMove,
        ActivityKind::PointerDown,
        ActivityKind::KeyDown,
        ActivityKind::TouchStart,
        ActivityKind::Scroll,
        ActivityKind::VisibilityChange,
    ];

    fn bit(&self) -> u8 {
        match self {
            ActivityKind::PointerMove => 1 << 0,
            ActivityKind::PointerDown => 1 << 1,
            ActivityKind::KeyDown => 1 << 2,
            ActivityKind::TouchStart => 1 << 3,
            ActivityKind::Scroll => 1 << 4,
            ActivityKind::VisibilityChange => 1 << 5,
        }
    }

    /// DOM event name this kind is sourced from.
    pub fn event_name(&self) -> &'static str {
        match self {
            ActivityKind::PointerMove => "mousemove",
            ActivityKind::PointerDown => "mousedown",
            ActivityKind::KeyDown => "keypress",
            ActivityKind::TouchStart => "touchstart",
            ActivityKind::Scroll => "scroll",
            ActivityKind::VisibilityChange => "visibilitychange",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.event_name() == name)
    }
}

/// The set of activity kinds a monitor is subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySources(u8);

impl ActivitySources {
    pub fn all() -> Self { Self(ActivityKind::ALL.iter().fold(0, |acc, k| acc | k.bit())) }
    pub fn none() -> Self { Self(0) }
    pub fn with(self, kind: ActivityKind) -> Self { Self(self.0 | kind.bit()) }
    pub fn without(self, kind: ActivityKind) -> Self { Self(self.0 & !kind.bit()) }
    pub fn contains(&self, kind: ActivityKind) -> bool { self.0 & kind.bit() != 0 }
    pub fn is_empty(&self) -> bool { self.0 == 0 }
}

impl Default for ActivitySources {
    fn default() -> Self { Self::all() }
}

impl FromIterator<ActivityKind> for ActivitySources {
    fn from_iter<I: IntoIterator<Item = ActivityKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), |s, k| s.with(k))
    }
}
