use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Pushover application API token (`token`).
///
/// Invariant: must not be empty.
pub struct AppToken(String);

impl AppToken {
    /// Body field name used by Pushover (`token`).
    pub const FIELD: &'static str = "token";

    /// Create a validated [`AppToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the token as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Pushover user or group key (`user`).
///
/// Invariant: must not be empty.
pub struct UserKey(String);

impl UserKey {
    /// Body field name used by Pushover (`user`).
    pub const FIELD: &'static str = "user";

    /// Create a validated [`UserKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the user key as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Priority names and their numeric values, lowest first.
pub const PRIORITIES: [(&str, i8); 5] = [
    ("lowest", -2),
    ("low", -1),
    ("normal", 0),
    ("high", 1),
    ("emergency", 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Message priority (`priority`).
///
/// Discriminants index into [`PRIORITIES`].
pub enum Priority {
    Lowest = 0,
    Low = 1,
    Normal = 2,
    High = 3,
    Emergency = 4,
}

impl Priority {
    /// Body field name used by Pushover (`priority`).
    pub const FIELD: &'static str = "priority";

    pub const ALL: [Priority; 5] = [
        Self::Lowest,
        Self::Low,
        Self::Normal,
        Self::High,
        Self::Emergency,
    ];

    /// Lowercase name, e.g. `"emergency"`.
    pub fn name(self) -> &'static str {
        PRIORITIES[self as usize].0
    }

    /// Numeric value sent on the wire, `-2..=2`.
    pub fn value(self) -> i8 {
        PRIORITIES[self as usize].1
    }

    /// Look up a priority by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        PRIORITIES
            .iter()
            .position(|(known, _)| *known == name)
            .map(|idx| Self::ALL[idx])
    }

    /// Look up a priority by its numeric value.
    pub fn from_value(value: i64) -> Option<Self> {
        PRIORITIES
            .iter()
            .position(|(_, known)| i64::from(*known) == value)
            .map(|idx| Self::ALL[idx])
    }
}

/// Notification sound identifiers accepted by Pushover.
pub const SOUNDS: [&str; 23] = [
    "pushover",
    "bike",
    "bugle",
    "cashregister",
    "classical",
    "cosmic",
    "falling",
    "gamelan",
    "incoming",
    "intermission",
    "magic",
    "mechanical",
    "pianobar",
    "siren",
    "spacealarm",
    "tugboat",
    "alien",
    "climb",
    "persistent",
    "echo",
    "updown",
    "vibrate",
    "none",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Notification sound (`sound`).
///
/// Discriminants index into [`SOUNDS`].
pub enum Sound {
    Pushover = 0,
    Bike,
    Bugle,
    CashRegister,
    Classical,
    Cosmic,
    Falling,
    Gamelan,
    Incoming,
    Intermission,
    Magic,
    Mechanical,
    PianoBar,
    Siren,
    SpaceAlarm,
    Tugboat,
    Alien,
    Climb,
    Persistent,
    Echo,
    UpDown,
    Vibrate,
    None,
}

impl Sound {
    /// Body field name used by Pushover (`sound`).
    pub const FIELD: &'static str = "sound";

    pub const ALL: [Sound; 23] = [
        Self::Pushover,
        Self::Bike,
        Self::Bugle,
        Self::CashRegister,
        Self::Classical,
        Self::Cosmic,
        Self::Falling,
        Self::Gamelan,
        Self::Incoming,
        Self::Intermission,
        Self::Magic,
        Self::Mechanical,
        Self::PianoBar,
        Self::Siren,
        Self::SpaceAlarm,
        Self::Tugboat,
        Self::Alien,
        Self::Climb,
        Self::Persistent,
        Self::Echo,
        Self::UpDown,
        Self::Vibrate,
        Self::None,
    ];

    /// Identifier as sent to Pushover, e.g. `"cashregister"`.
    pub fn as_str(self) -> &'static str {
        SOUNDS[self as usize]
    }

    /// Look up a sound by its identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        SOUNDS
            .iter()
            .position(|known| *known == name)
            .map(|idx| Self::ALL[idx])
    }
}
