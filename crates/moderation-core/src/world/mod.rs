use std::collections::BTreeMap;

mod commands;
mod decision;
mod events;
mod init;
mod inspect;
mod snapshot;
mod spawn;
mod step;

use contracts::{
    phase_speed, Command, CommandPayload, DecisionSource, DisplayState, Event, EventType,
    MessageView, OutcomeKind, PairSnapshot, PlayerAction, SessionConfig, SessionMode,
    SessionStatus, Snapshot, VerificationView, BELT_LENGTH, CARD_CLEARANCE, MESSAGE_DURATION_MS,
    PHASE_COUNT, SCHEMA_VERSION_V1, STABILITY_MIN, VERIFY_DURATION_MS, WARNING_ZONE_DEPTH,
};
use serde_json::{json, Value};

use crate::economy::{PromotionOutcome, ScoreLedger};
use crate::generator::{Post, PostGenerator};

#[derive(Debug, Clone)]
struct QueuedCommand {
    effective_tick: u64,
    insertion_sequence: u64,
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMetrics {
    pub advanced_ms: u64,
    pub spawned_pairs: u64,
    pub exited_pairs: u64,
}

/// Two posts traveling together at one belt position. The pair resolves as a
/// whole; individual posts can be suppressed before that.
#[derive(Debug, Clone)]
pub struct PostPair {
    pub pair_id: String,
    pub post_a: Post,
    pub post_b: Post,
    pub position: f64,
    pub algorithm_prefers_a: bool,
    pub resolved: bool,
    pub in_warning_zone: bool,
}

impl PostPair {
    pub fn contains(&self, post_id: &str) -> bool {
        self.post_a.post_id == post_id || self.post_b.post_id == post_id
    }

    pub fn post(&self, post_id: &str) -> Option<&Post> {
        if self.post_a.post_id == post_id {
            Some(&self.post_a)
        } else if self.post_b.post_id == post_id {
            Some(&self.post_b)
        } else {
            None
        }
    }

    pub fn post_mut(&mut self, post_id: &str) -> Option<&mut Post> {
        if self.post_a.post_id == post_id {
            Some(&mut self.post_a)
        } else if self.post_b.post_id == post_id {
            Some(&mut self.post_b)
        } else {
            None
        }
    }

    pub fn label_of(&self, post_id: &str) -> &'static str {
        if self.post_a.post_id == post_id {
            "A"
        } else {
            "B"
        }
    }

    pub fn both_suppressed(&self) -> bool {
        self.post_a.suppressed && self.post_b.suppressed
    }

    pub fn snapshot(&self) -> PairSnapshot {
        PairSnapshot {
            pair_id: self.pair_id.clone(),
            position: self.position,
            algorithm_prefers_a: self.algorithm_prefers_a,
            resolved: self.resolved,
            in_warning_zone: self.in_warning_zone,
            post_a: self.post_a.snapshot(),
            post_b: self.post_b.snapshot(),
        }
    }
}

#[derive(Debug, Clone)]
struct VerificationState {
    post_id: String,
    elapsed_ms: u64,
}

#[derive(Debug, Clone)]
struct TransientMessage {
    text: String,
    remaining_ms: u64,
}

/// One-shot warning thresholds, most severe first.
const STABILITY_WARNING_THRESHOLDS: [i64; 3] = [20, 33, 50];

/// The session aggregate. Owns every piece of mutable game state; all writes
/// happen inside `step` or the action handlers it dispatches to.
#[derive(Debug)]
pub struct ModerationWorld {
    config: SessionConfig,
    status: SessionStatus,
    scores: ScoreLedger,
    pairs: Vec<PostPair>,
    generator: PostGenerator,
    selected_post: Option<String>,
    pending_verification: Option<VerificationState>,
    spawn_timer_ms: u64,
    pair_sequence: u64,
    queued_commands: Vec<QueuedCommand>,
    next_command_sequence: u64,
    sequence_in_tick: u64,
    event_log: Vec<Event>,
    event_index_by_id: BTreeMap<String, usize>,
    state_hash: u64,
    replay_hash: u64,
    loss_check_override: bool,
    warnings_raised: BTreeMap<i64, bool>,
    message: Option<TransientMessage>,
    last_timer_second: u64,
    last_progress_decile: u64,
    last_step_metrics: StepMetrics,
}

fn synthetic_timestamp(elapsed_ms: u64, seq: u64) -> String {
    let total_seconds = elapsed_ms / 1_000;
    format!(
        "1970-01-01T{:02}:{:02}:{:02}.{:03}Z",
        (total_seconds / 3_600) % 24,
        (total_seconds / 60) % 60,
        total_seconds % 60,
        (elapsed_ms + seq) % 1_000
    )
}

fn mix_state_hash(state_hash: u64, tick: u64, sequence_in_tick: u64) -> u64 {
    let mut hash = state_hash ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    hash ^= sequence_in_tick.wrapping_mul(0x517C_C1B7_2722_0A95);
    hash.rotate_left(17)
}

fn mix_replay_hash(current: u64, event_id: &str, tick: u64, sequence: u64) -> u64 {
    let mut hash = current ^ tick.wrapping_mul(0xA24B_1C62_5B93_2D47);
    hash ^= sequence.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for byte in event_id.as_bytes() {
        hash = hash.rotate_left(7) ^ u64::from(*byte);
        hash = hash.wrapping_mul(0x517C_C1B7_2722_0A95);
    }
    hash
}

#[cfg(test)]
mod tests;
