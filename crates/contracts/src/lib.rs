//! v1 cross-boundary contracts for the moderation kernel, CLI, and observers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Number of fixed difficulty phases in one session.
pub const PHASE_COUNT: usize = 10;

/// Belt speed per phase, in belt units per second. Strictly increasing.
pub const PHASE_SPEEDS: [f64; PHASE_COUNT] = [
    24.0, 36.0, 52.0, 72.0, 96.0, 124.0, 156.0, 192.0, 232.0, 280.0,
];

/// Distance a pair travels from spawn to the exit boundary.
pub const BELT_LENGTH: f64 = 1480.0;

/// Minimum spacing between consecutive pairs on the belt.
pub const CARD_CLEARANCE: f64 = 220.0;

/// The warning zone covers the last stretch of belt before the exit.
pub const WARNING_ZONE_DEPTH: f64 = 330.0;

pub const VERIFY_DURATION_MS: u64 = 2_000;
pub const MESSAGE_DURATION_MS: u64 = 3_000;

pub const STABILITY_MIN: i64 = 0;
pub const STABILITY_MAX: i64 = 100;

pub const DEFAULT_SESSION_DURATION_MS: u64 = 600_000;

pub fn phase_speed(phase_index: usize) -> f64 {
    PHASE_SPEEDS[phase_index.min(PHASE_COUNT - 1)]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub schema_version: String,
    pub run_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub duration_ms: u64,
    pub notes: Option<String>,
}

impl SessionConfig {
    pub fn phase_duration_ms(&self) -> u64 {
        (self.duration_ms / PHASE_COUNT as u64).max(1)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "shift_local_001".to_string(),
            seed: 1337,
            duration_ms: DEFAULT_SESSION_DURATION_MS,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    NotStarted,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Collapse,
    Completed,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStatus {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub elapsed_ms: u64,
    pub duration_ms: u64,
    pub mode: SessionMode,
    pub outcome: Option<OutcomeKind>,
    pub phase_index: u8,
    pub belt_speed: f64,
    pub queue_depth: usize,
    pub live_pairs: usize,
}

impl SessionStatus {
    pub fn is_complete(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed_ms)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} tick={} elapsed={}ms/{}ms mode={:?} phase={} speed={} pairs={} queue_depth={}",
            self.run_id,
            self.tick,
            self.elapsed_ms,
            self.duration_ms,
            self.mode,
            self.phase_index,
            self.belt_speed,
            self.live_pairs,
            self.queue_depth
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Love,
    Haha,
    Like,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        Self::Love,
        Self::Haha,
        Self::Like,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Haha => "haha",
            Self::Like => "like",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Promote,
    Suppress,
    Verify,
}

impl PlayerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Promote => "promote",
            Self::Suppress => "suppress",
            Self::Verify => "verify",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Player,
    Algorithm,
}

impl DecisionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Algorithm => "algorithm",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    SessionStart,
    SessionReset,
    SelectPost,
    PerformAction,
    SetLossCheckOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    SessionStart,
    SessionReset,
    SelectPost { post_id: String },
    PerformAction { action: PlayerAction },
    SetLossCheckOverride { enabled: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub schema_version: String,
    pub command_id: String,
    pub run_id: String,
    pub issued_at_tick: u64,
    pub command_type: CommandType,
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(
        command_id: impl Into<String>,
        run_id: impl Into<String>,
        issued_at_tick: u64,
        command_type: CommandType,
        payload: CommandPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command_id.into(),
            run_id: run_id.into(),
            issued_at_tick,
            command_type,
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStarted,
    SessionReset,
    SessionEnded,
    CommandApplied,
    PhaseAdvanced,
    PairSpawned,
    PairEnteredWarningZone,
    PairExited,
    PostSelected,
    FeedUpdated,
    SuppressedUpdated,
    AlgorithmPreferenceShifted,
    VerificationStarted,
    VerificationProgressed,
    VerificationCompleted,
    VerificationCancelled,
    ScoreChanged,
    StabilityWarningRaised,
    TimerUpdated,
    MessageShown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub created_at: String,
    pub event_id: String,
    pub sequence_in_tick: u64,
    pub event_type: EventType,
    pub subject_id: String,
    pub caused_by: Vec<String>,
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSnapshot {
    pub post_id: String,
    pub reaction: ReactionKind,
    pub engagement_value: i64,
    pub stability_delta: i64,
    pub fake_news_probability: f32,
    pub is_fake_news: bool,
    pub verified: bool,
    pub suppressed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairSnapshot {
    pub pair_id: String,
    pub position: f64,
    pub algorithm_prefers_a: bool,
    pub resolved: bool,
    pub in_warning_zone: bool,
    pub post_a: PostSnapshot,
    pub post_b: PostSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationView {
    pub post_id: String,
    pub fraction_complete: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageView {
    pub text: String,
    pub alpha: f32,
}

/// Per-frame derived values for the presentation layer. The event log covers
/// discrete transitions; continuous readouts are polled from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayState {
    pub engagement: i64,
    pub stability: i64,
    pub phase_index: u8,
    pub phase_count: u8,
    pub remaining_ms: u64,
    pub belt_speed: f64,
    pub backlash_count: u32,
    pub selected_post_id: Option<String>,
    pub verification: Option<VerificationView>,
    pub message: Option<MessageView>,
    pub loss_check_override: bool,
    pub mode: SessionMode,
    pub outcome: Option<OutcomeKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub created_at: String,
    pub snapshot_id: String,
    pub world_state_hash: String,
    pub session_state: Value,
    pub pair_states: Value,
}

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}
