use super::*;

impl ModerationWorld {
    pub(super) fn push_event(
        &mut self,
        event_type: EventType,
        subject_id: String,
        caused_by: Vec<String>,
        details: Option<Value>,
    ) -> String {
        self.sequence_in_tick = self.sequence_in_tick.saturating_add(1);
        let tick = self.status.tick;
        let event_id = format!("evt_{tick:06}_{:04}", self.sequence_in_tick);
        self.event_log.push(Event {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.status.run_id.clone(),
            tick,
            created_at: synthetic_timestamp(self.status.elapsed_ms, self.sequence_in_tick),
            event_id: event_id.clone(),
            sequence_in_tick: self.sequence_in_tick,
            event_type,
            subject_id,
            caused_by,
            details,
        });
        self.event_index_by_id
            .insert(event_id.clone(), self.event_log.len().saturating_sub(1));
        self.replay_hash = mix_replay_hash(self.replay_hash, &event_id, tick, self.sequence_in_tick);
        event_id
    }

    pub(super) fn show_message(&mut self, text: &str) {
        self.message = Some(TransientMessage {
            text: text.to_string(),
            remaining_ms: MESSAGE_DURATION_MS,
        });
        self.push_event(
            EventType::MessageShown,
            "session".to_string(),
            Vec::new(),
            Some(json!({ "text": text })),
        );
    }

    pub(super) fn emit_score_changed(&mut self, caused_by: Vec<String>) -> String {
        let details = json!({
            "engagement": self.scores.engagement,
            "stability": self.scores.stability,
        });
        self.push_event(
            EventType::ScoreChanged,
            "session".to_string(),
            caused_by,
            Some(details),
        )
    }

    /// Walk the `caused_by` links from an event back to its root. Command
    /// references terminate the walk.
    pub fn traverse_causal_chain(&self, event_id: &str) -> Vec<Event> {
        let mut chain = Vec::new();
        let mut cursor = Some(event_id.to_string());
        while let Some(id) = cursor.take() {
            let Some(index) = self.event_index_by_id.get(&id) else {
                break;
            };
            let Some(event) = self.event_log.get(*index) else {
                break;
            };
            cursor = event
                .caused_by
                .first()
                .filter(|parent| parent.starts_with("evt_"))
                .cloned();
            chain.push(event.clone());
            if chain.len() > self.event_log.len() {
                break;
            }
        }
        chain
    }
}
