use super::*;

impl ModerationWorld {
    /// Interval between spawns at the current belt speed. Pairs are spaced by
    /// travel time, so the clearance distance holds at every speed.
    pub(super) fn spawn_interval_ms(&self) -> f64 {
        CARD_CLEARANCE / self.status.belt_speed * 1_000.0
    }

    pub(super) fn spawn_pair(&mut self, position: f64) -> String {
        self.pair_sequence += 1;
        let pair_id = format!("pair:{:04}", self.pair_sequence);
        let post_a = self
            .generator
            .generate(format!("post:{:04}:a", self.pair_sequence));
        let post_b = self
            .generator
            .generate(format!("post:{:04}:b", self.pair_sequence));
        let algorithm_prefers_a = post_a.engagement_value >= post_b.engagement_value;

        // spawn payload carries only player-visible attributes; hidden fields
        // stay out of the presentation surface until revealed
        let details = json!({
            "position": position,
            "algorithm_prefers_a": algorithm_prefers_a,
            "post_a": {
                "post_id": post_a.post_id,
                "reaction": post_a.reaction.as_str(),
                "engagement_value": post_a.engagement_value,
            },
            "post_b": {
                "post_id": post_b.post_id,
                "reaction": post_b.reaction.as_str(),
                "engagement_value": post_b.engagement_value,
            },
        });

        self.pairs.push(PostPair {
            pair_id: pair_id.clone(),
            post_a,
            post_b,
            position,
            algorithm_prefers_a,
            resolved: false,
            in_warning_zone: false,
        });
        self.status.live_pairs = self.pairs.len();
        self.push_event(EventType::PairSpawned, pair_id.clone(), Vec::new(), Some(details));
        pair_id
    }
}
