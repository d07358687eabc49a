use contracts::{DecisionSource, STABILITY_MAX, STABILITY_MIN};

/// Result of promoting one post into the feed, for event payloads.
/// `original_stability_delta` is the pre-penalty number (scaled for player
/// promotions) so displays can show the fake-news penalty distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub engagement_delta: i64,
    pub stability_delta: i64,
    pub original_stability_delta: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionOutcome {
    pub impact: i64,
    pub backlash_count: u32,
    pub was_fake: bool,
}

/// The two session scores and the suppression-backlash counter.
///
/// Stability is clamped into `[STABILITY_MIN, STABILITY_MAX]` after every
/// mutation; engagement only ever grows under normal play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    pub engagement: i64,
    pub stability: i64,
    pub suppression_backlash: u32,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self {
            engagement: 0,
            stability: STABILITY_MAX,
            suppression_backlash: 0,
        }
    }

    /// Apply a promotion. Player promotions carry a 1.25x bonus on both
    /// scores; fake news inverts a positive stability delta and doubles a
    /// negative one before scaling.
    pub fn apply_promotion(
        &mut self,
        engagement_value: i64,
        stability_delta: i64,
        is_fake_news: bool,
        source: DecisionSource,
    ) -> PromotionOutcome {
        let scaled = source == DecisionSource::Player;
        let engagement_delta = if scaled {
            player_scale(engagement_value)
        } else {
            engagement_value
        };

        let mut effect = stability_delta;
        if is_fake_news {
            effect = if effect > 0 { -effect } else { effect * 2 };
        }
        let stability_effect = if scaled { player_scale(effect) } else { effect };
        let original = if scaled {
            player_scale(stability_delta)
        } else {
            stability_delta
        };

        self.engagement += engagement_delta;
        self.stability += stability_effect;
        self.clamp_stability();

        PromotionOutcome {
            engagement_delta,
            stability_delta: stability_effect,
            original_stability_delta: original,
        }
    }

    /// Apply a suppression. Suppressing genuine content draws an escalating
    /// backlash (-1, -2, -3, ... across the session); suppressing fake news
    /// earns a flat +1.
    pub fn apply_suppression(&mut self, is_fake_news: bool) -> SuppressionOutcome {
        let impact = if is_fake_news {
            1
        } else {
            self.suppression_backlash = self.suppression_backlash.saturating_add(1);
            -i64::from(self.suppression_backlash)
        };
        self.stability += impact;
        self.clamp_stability();

        SuppressionOutcome {
            impact,
            backlash_count: self.suppression_backlash,
            was_fake: is_fake_news,
        }
    }

    fn clamp_stability(&mut self) {
        self.stability = self.stability.clamp(STABILITY_MIN, STABILITY_MAX);
    }
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// 1.25x with floor-toward-negative-infinity semantics, exact in integers.
fn player_scale(value: i64) -> i64 {
    (value * 5).div_euclid(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_promotion_scales_both_scores() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 50;
        let outcome = ledger.apply_promotion(1_000, 2, false, DecisionSource::Player);
        assert_eq!(outcome.engagement_delta, 1_250);
        assert_eq!(outcome.stability_delta, 2);
        assert_eq!(ledger.engagement, 1_250);
        assert_eq!(ledger.stability, 52);
    }

    #[test]
    fn algorithm_promotion_is_unscaled() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 50;
        let outcome = ledger.apply_promotion(1_000, 2, false, DecisionSource::Algorithm);
        assert_eq!(outcome.engagement_delta, 1_000);
        assert_eq!(outcome.stability_delta, 2);
    }

    #[test]
    fn fake_positive_delta_inverts_before_scale() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 50;
        let outcome = ledger.apply_promotion(1_000, 3, true, DecisionSource::Algorithm);
        assert_eq!(outcome.stability_delta, -3);
        assert_eq!(outcome.original_stability_delta, 3);
        assert_eq!(ledger.stability, 47);
    }

    #[test]
    fn fake_negative_delta_doubles_before_scale() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 50;
        let outcome = ledger.apply_promotion(1_000, -3, true, DecisionSource::Algorithm);
        assert_eq!(outcome.stability_delta, -6);
        assert_eq!(ledger.stability, 44);
    }

    #[test]
    fn player_scale_floors_toward_negative_infinity() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 50;
        // fake +3 inverts to -3, then -3 * 1.25 floors to -4
        let outcome = ledger.apply_promotion(100, 3, true, DecisionSource::Player);
        assert_eq!(outcome.stability_delta, -4);
        assert_eq!(outcome.original_stability_delta, 3);
    }

    #[test]
    fn suppression_backlash_escalates() {
        let mut ledger = ScoreLedger::new();
        let impacts = (0..3)
            .map(|_| ledger.apply_suppression(false).impact)
            .collect::<Vec<_>>();
        assert_eq!(impacts, vec![-1, -2, -3]);
        assert_eq!(ledger.suppression_backlash, 3);
        assert_eq!(ledger.stability, 94);
    }

    #[test]
    fn suppressing_fake_news_rewards_one_point() {
        let mut ledger = ScoreLedger::new();
        ledger.stability = 40;
        let outcome = ledger.apply_suppression(true);
        assert_eq!(outcome.impact, 1);
        assert_eq!(outcome.backlash_count, 0);
        assert_eq!(ledger.stability, 41);
    }

    #[test]
    fn stability_clamps_at_both_bounds() {
        let mut ledger = ScoreLedger::new();
        ledger.apply_promotion(10, 5, false, DecisionSource::Algorithm);
        assert_eq!(ledger.stability, STABILITY_MAX);

        ledger.stability = 2;
        ledger.apply_promotion(10, -3, true, DecisionSource::Algorithm);
        assert_eq!(ledger.stability, STABILITY_MIN);
    }
}
