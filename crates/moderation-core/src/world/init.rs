use super::*;

impl ModerationWorld {
    pub fn new(config: SessionConfig) -> Self {
        let status = SessionStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: config.run_id.clone(),
            tick: 0,
            elapsed_ms: 0,
            duration_ms: config.duration_ms,
            mode: SessionMode::NotStarted,
            outcome: None,
            phase_index: 0,
            belt_speed: phase_speed(0),
            queue_depth: 0,
            live_pairs: 0,
        };
        let generator = PostGenerator::new(config.seed);
        let warnings_raised = STABILITY_WARNING_THRESHOLDS
            .iter()
            .map(|threshold| (*threshold, false))
            .collect::<BTreeMap<_, _>>();
        let last_timer_second = config.duration_ms / 1_000;

        Self {
            config,
            status,
            scores: ScoreLedger::new(),
            pairs: Vec::new(),
            generator,
            selected_post: None,
            pending_verification: None,
            spawn_timer_ms: 0,
            pair_sequence: 0,
            queued_commands: Vec::new(),
            next_command_sequence: 0,
            sequence_in_tick: 0,
            event_log: Vec::new(),
            event_index_by_id: BTreeMap::new(),
            state_hash: 0,
            replay_hash: 0,
            loss_check_override: false,
            warnings_raised,
            message: None,
            last_timer_second,
            last_progress_decile: 0,
            last_step_metrics: StepMetrics::default(),
        }
    }

    /// Destroy all live pairs and reinitialize every session field from the
    /// config. The generator is re-seeded, so a reset session replays
    /// identically to a fresh one.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
        self.push_event(
            EventType::SessionReset,
            "session".to_string(),
            Vec::new(),
            None,
        );
    }
}
