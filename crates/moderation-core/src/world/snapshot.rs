use super::*;

impl ModerationWorld {
    pub fn snapshot_for_current_tick(&self) -> Snapshot {
        let pair_states = self
            .pairs
            .iter()
            .map(|pair| serde_json::to_value(pair.snapshot()).unwrap_or_else(|_| json!({})))
            .collect::<Vec<_>>();

        let session_state = json!({
            "mode": self.status.mode,
            "outcome": self.status.outcome,
            "engagement": self.scores.engagement,
            "stability": self.scores.stability,
            "suppression_backlash": self.scores.suppression_backlash,
            "phase_index": self.status.phase_index,
            "belt_speed": self.status.belt_speed,
            "elapsed_ms": self.status.elapsed_ms,
            "selected_post": self.selected_post,
            "pending_verification": self.pending_verification.as_ref().map(|pending| json!({
                "post_id": pending.post_id,
                "elapsed_ms": pending.elapsed_ms,
            })),
            "loss_check_override": self.loss_check_override,
        });

        Snapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.status.run_id.clone(),
            tick: self.status.tick,
            created_at: synthetic_timestamp(self.status.elapsed_ms, 0),
            snapshot_id: format!("snap_{:06}", self.status.tick),
            world_state_hash: format!("{:016x}", self.state_hash),
            session_state,
            pair_states: Value::Array(pair_states),
        }
    }
}
