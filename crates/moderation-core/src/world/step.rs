use super::*;

impl ModerationWorld {
    /// Begin the shift. No-op unless the session has not started yet.
    pub fn start(&mut self) {
        if self.status.mode != SessionMode::NotStarted {
            return;
        }
        self.status.mode = SessionMode::Running;
        self.push_event(
            EventType::SessionStarted,
            "session".to_string(),
            Vec::new(),
            Some(json!({ "duration_ms": self.status.duration_ms })),
        );
        // Seed the belt: first pair a full clearance ahead, countdown primed
        // so the second spawns on the next tick at proper spacing.
        self.spawn_pair(CARD_CLEARANCE);
        self.spawn_timer_ms = self.spawn_interval_ms().ceil() as u64;
        self.show_message("Choose what the world sees.");
    }

    /// God mode: disables the collapse check only. Scoring is unaffected.
    pub fn set_loss_check_override(&mut self, enabled: bool) {
        self.loss_check_override = enabled;
        if enabled {
            self.show_message("Loss checks disabled.");
        }
    }

    pub fn run_id(&self) -> &str {
        &self.status.run_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn engagement(&self) -> i64 {
        self.scores.engagement
    }

    pub fn stability(&self) -> i64 {
        self.scores.stability
    }

    pub fn backlash_count(&self) -> u32 {
        self.scores.suppression_backlash
    }

    pub fn selected_post(&self) -> Option<&str> {
        self.selected_post.as_deref()
    }

    pub fn replay_hash(&self) -> u64 {
        self.replay_hash
    }

    pub fn last_step_metrics(&self) -> StepMetrics {
        self.last_step_metrics
    }

    pub fn enqueue_command(&mut self, command: Command, effective_tick: u64) {
        self.queued_commands.push(QueuedCommand {
            effective_tick,
            insertion_sequence: self.next_command_sequence,
            command,
        });
        self.next_command_sequence = self.next_command_sequence.saturating_add(1);
        self.sync_queue_depth();
    }

    pub fn inject_command(&mut self, command: Command) {
        let effective_tick = self.status.tick + 1;
        self.enqueue_command(command, effective_tick);
    }

    /// Advance the session by one frame. Returns false when the session is
    /// not running (commands are still drained, so a queued start takes
    /// effect on the tick it becomes due).
    pub fn step(&mut self, delta_ms: u64) -> bool {
        self.last_step_metrics = StepMetrics::default();
        self.sequence_in_tick = 0;
        let tick = self.status.tick.saturating_add(1);
        self.status.tick = tick;

        self.process_due_commands(tick);

        if self.status.mode != SessionMode::Running {
            self.sync_queue_depth();
            return false;
        }

        // Terminal checks short-circuit the rest of the tick.
        if self.scores.stability <= STABILITY_MIN && !self.loss_check_override {
            self.end_session(OutcomeKind::Collapse);
            return true;
        }
        if self.status.is_complete() {
            self.end_session(OutcomeKind::Completed);
            return true;
        }

        self.status.elapsed_ms = self.status.elapsed_ms.saturating_add(delta_ms);
        self.advance_phase();
        self.process_pairs(delta_ms);
        self.process_spawn_timer(delta_ms);
        self.refresh_timer_display();
        self.check_stability_warnings();
        self.fade_message(delta_ms);
        self.advance_verification(delta_ms);

        self.state_hash = mix_state_hash(self.state_hash, tick, self.sequence_in_tick);
        self.last_step_metrics.advanced_ms = delta_ms;
        self.sync_queue_depth();
        true
    }

    pub fn step_n(&mut self, steps: u64, delta_ms: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..steps {
            if !self.step(delta_ms) {
                break;
            }
            committed += 1;
        }
        committed
    }

    /// Step at a fixed cadence until the session ends. Requires a running
    /// session and a nonzero delta.
    pub fn run_to_completion(&mut self, delta_ms: u64) -> u64 {
        if delta_ms == 0 {
            return 0;
        }
        let mut committed = 0_u64;
        while self.status.mode == SessionMode::Running {
            if !self.step(delta_ms) {
                break;
            }
            committed += 1;
        }
        committed
    }

    fn end_session(&mut self, outcome: OutcomeKind) {
        self.status.mode = SessionMode::Ended;
        self.status.outcome = Some(outcome);
        let details = json!({
            "outcome": outcome.as_str(),
            "final_engagement": self.scores.engagement,
            "final_stability": self.scores.stability,
            "final_phase": self.status.phase_index + 1,
        });
        self.push_event(
            EventType::SessionEnded,
            "session".to_string(),
            Vec::new(),
            Some(details),
        );
        match outcome {
            OutcomeKind::Collapse => self.show_message("The platform accelerated the fracture."),
            OutcomeKind::Completed => self.show_message("Term completed. The world kept watching."),
        }
    }

    fn advance_phase(&mut self) {
        let phase_duration = self.config.phase_duration_ms();
        let new_phase = ((self.status.elapsed_ms / phase_duration) as usize).min(PHASE_COUNT - 1);
        if new_phase as u8 == self.status.phase_index {
            return;
        }
        self.status.phase_index = new_phase as u8;
        self.status.belt_speed = phase_speed(new_phase);
        // restart the countdown from the new speed, never a stale interval
        self.spawn_timer_ms = 0;
        self.push_event(
            EventType::PhaseAdvanced,
            "session".to_string(),
            Vec::new(),
            Some(json!({
                "phase_index": new_phase,
                "belt_speed": self.status.belt_speed,
            })),
        );
        let banner = match new_phase {
            7.. => format!("Phase {}. Content is flooding in.", new_phase + 1),
            4.. => format!("Phase {}. Speed increasing.", new_phase + 1),
            _ => format!("Phase {} begins.", new_phase + 1),
        };
        self.show_message(&banner);
    }

    fn process_pairs(&mut self, delta_ms: u64) {
        let travel = self.status.belt_speed * delta_ms as f64 / 1_000.0;
        // last-to-first so removal during iteration is safe
        let mut index = self.pairs.len();
        while index > 0 {
            index -= 1;
            self.pairs[index].position += travel;
            let position = self.pairs[index].position;

            if !self.pairs[index].in_warning_zone
                && !self.pairs[index].resolved
                && position >= BELT_LENGTH - WARNING_ZONE_DEPTH
            {
                self.pairs[index].in_warning_zone = true;
                let pair_id = self.pairs[index].pair_id.clone();
                self.push_event(
                    EventType::PairEnteredWarningZone,
                    pair_id,
                    Vec::new(),
                    Some(json!({ "position": position })),
                );
            }

            self.cancel_verification_if_out_of_time(index);

            if position > BELT_LENGTH {
                let pair = self.pairs.remove(index);
                self.status.live_pairs = self.pairs.len();
                let exit_event = self.push_event(
                    EventType::PairExited,
                    pair.pair_id.clone(),
                    Vec::new(),
                    Some(json!({ "resolved": pair.resolved })),
                );
                self.algorithm_decides(&pair, exit_event);
                self.last_step_metrics.exited_pairs += 1;
            }
        }
    }

    fn cancel_verification_if_out_of_time(&mut self, index: usize) {
        let Some(pending) = &self.pending_verification else {
            return;
        };
        if !self.pairs[index].contains(&pending.post_id) {
            return;
        }
        let remaining_travel_ms =
            (BELT_LENGTH - self.pairs[index].position).max(0.0) / self.status.belt_speed * 1_000.0;
        let unprocessed_ms = VERIFY_DURATION_MS.saturating_sub(pending.elapsed_ms);
        if remaining_travel_ms < unprocessed_ms as f64 {
            let post_id = pending.post_id.clone();
            self.pending_verification = None;
            self.last_progress_decile = 0;
            self.push_event(
                EventType::VerificationCancelled,
                post_id,
                Vec::new(),
                Some(json!({ "reason": "insufficient_time" })),
            );
            self.show_message("No time to finish verification.");
        }
    }

    fn process_spawn_timer(&mut self, delta_ms: u64) {
        self.spawn_timer_ms = self.spawn_timer_ms.saturating_add(delta_ms);
        if self.spawn_timer_ms as f64 >= self.spawn_interval_ms() {
            self.spawn_timer_ms = 0;
            self.spawn_pair(0.0);
            self.last_step_metrics.spawned_pairs += 1;
        }
    }

    fn refresh_timer_display(&mut self) {
        let remaining = self.status.remaining_ms();
        let second = remaining / 1_000;
        if second != self.last_timer_second {
            self.last_timer_second = second;
            self.push_event(
                EventType::TimerUpdated,
                "session".to_string(),
                Vec::new(),
                Some(json!({ "remaining_ms": remaining })),
            );
        }
    }

    fn check_stability_warnings(&mut self) {
        for threshold in STABILITY_WARNING_THRESHOLDS {
            if self.scores.stability > threshold {
                continue;
            }
            if self.warnings_raised.get(&threshold).copied().unwrap_or(false) {
                continue;
            }
            self.warnings_raised.insert(threshold, true);
            self.push_event(
                EventType::StabilityWarningRaised,
                "session".to_string(),
                Vec::new(),
                Some(json!({
                    "threshold": threshold,
                    "stability": self.scores.stability,
                })),
            );
            let text = match threshold {
                20 => "Critical. Society is fracturing.",
                33 => "Stability critical. Be careful.",
                _ => "Stability dropping. Watch the reactions.",
            };
            self.show_message(text);
            break;
        }
    }

    fn fade_message(&mut self, delta_ms: u64) {
        if let Some(message) = &mut self.message {
            message.remaining_ms = message.remaining_ms.saturating_sub(delta_ms);
            if message.remaining_ms == 0 {
                self.message = None;
            }
        }
    }

    fn advance_verification(&mut self, delta_ms: u64) {
        let Some(pending) = &mut self.pending_verification else {
            return;
        };
        pending.elapsed_ms = pending.elapsed_ms.saturating_add(delta_ms);
        let elapsed = pending.elapsed_ms;
        let post_id = pending.post_id.clone();

        if elapsed >= VERIFY_DURATION_MS {
            self.pending_verification = None;
            self.last_progress_decile = 0;
            let pair_index = self.pairs.iter().position(|pair| pair.contains(&post_id));
            let Some(pair_index) = pair_index else {
                // the post left the belt mid-verification
                self.push_event(
                    EventType::VerificationCancelled,
                    post_id,
                    Vec::new(),
                    Some(json!({ "reason": "post_gone" })),
                );
                return;
            };
            let mut revealed = None;
            if let Some(post) = self.pairs[pair_index].post_mut(&post_id) {
                post.verified = true;
                revealed = Some(post.is_fake_news);
            }
            if let Some(is_fake_news) = revealed {
                self.push_event(
                    EventType::VerificationCompleted,
                    post_id,
                    Vec::new(),
                    Some(json!({ "is_fake_news": is_fake_news })),
                );
                self.show_message(if is_fake_news {
                    "Verified: fabricated."
                } else {
                    "Verified: genuine."
                });
            }
            return;
        }

        let decile = elapsed * 10 / VERIFY_DURATION_MS;
        if decile != self.last_progress_decile {
            self.last_progress_decile = decile;
            self.push_event(
                EventType::VerificationProgressed,
                post_id,
                Vec::new(),
                Some(json!({ "fraction_complete": decile as f64 / 10.0 })),
            );
        }
    }

    pub(super) fn sync_queue_depth(&mut self) {
        self.status.queue_depth = self.queued_commands.len();
    }
}
