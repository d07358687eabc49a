use super::*;

impl ModerationWorld {
    /// Derived values the presentation layer reads every frame.
    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            engagement: self.scores.engagement,
            stability: self.scores.stability,
            phase_index: self.status.phase_index,
            phase_count: PHASE_COUNT as u8,
            remaining_ms: self.status.remaining_ms(),
            belt_speed: self.status.belt_speed,
            backlash_count: self.scores.suppression_backlash,
            selected_post_id: self.selected_post.clone(),
            verification: self.pending_verification.as_ref().map(|pending| {
                VerificationView {
                    post_id: pending.post_id.clone(),
                    fraction_complete: (pending.elapsed_ms as f32 / VERIFY_DURATION_MS as f32)
                        .min(1.0),
                }
            }),
            message: self.message.as_ref().map(|message| MessageView {
                text: message.text.clone(),
                // full strength until the final second, then a linear fade
                alpha: (message.remaining_ms as f32 / 1_000.0).min(1.0),
            }),
            loss_check_override: self.loss_check_override,
            mode: self.status.mode,
            outcome: self.status.outcome,
        }
    }

    pub fn inspect_pair(&self, pair_id: &str) -> Option<Value> {
        self.pairs
            .iter()
            .find(|pair| pair.pair_id == pair_id)
            .map(|pair| {
                json!({
                    "pair_id": pair.pair_id,
                    "position": pair.position,
                    "distance_to_exit": (BELT_LENGTH - pair.position).max(0.0),
                    "in_warning_zone": pair.in_warning_zone,
                    "resolved": pair.resolved,
                    "algorithm_prefers_a": pair.algorithm_prefers_a,
                    "post_a": serde_json::to_value(pair.post_a.snapshot())
                        .unwrap_or_else(|_| json!({})),
                    "post_b": serde_json::to_value(pair.post_b.snapshot())
                        .unwrap_or_else(|_| json!({})),
                })
            })
    }

    pub fn inspect_session(&self) -> Value {
        let warnings_raised = self
            .warnings_raised
            .iter()
            .filter(|(_, raised)| **raised)
            .map(|(threshold, _)| *threshold)
            .collect::<Vec<_>>();
        json!({
            "status": serde_json::to_value(&self.status).unwrap_or_else(|_| json!({})),
            "engagement": self.scores.engagement,
            "stability": self.scores.stability,
            "suppression_backlash": self.scores.suppression_backlash,
            "warnings_raised": warnings_raised,
            "selected_post": self.selected_post,
            "event_count": self.event_log.len(),
            "replay_hash": format!("{:016x}", self.replay_hash),
        })
    }
}
