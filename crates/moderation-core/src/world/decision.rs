use super::*;

impl ModerationWorld {
    /// Select a post for the next action. Resolved pairs and suppressed
    /// posts are not selectable; an unknown id is ignored.
    pub fn select_post(&mut self, post_id: &str) {
        let Some(pair) = self.pairs.iter().find(|pair| pair.contains(post_id)) else {
            return;
        };
        if pair.resolved {
            return;
        }
        if pair.post(post_id).map(|post| post.suppressed).unwrap_or(true) {
            return;
        }
        self.selected_post = Some(post_id.to_string());
        self.push_event(EventType::PostSelected, post_id.to_string(), Vec::new(), None);
    }

    /// Apply a player action to the selected post. Every invalid combination
    /// is a silent no-op: no selection, pair gone, pair resolved, post
    /// suppressed, verify while one is in flight or already verified.
    pub fn perform_action(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::Promote => self.promote_selected(),
            PlayerAction::Suppress => self.suppress_selected(),
            PlayerAction::Verify => self.verify_selected(),
        }
    }

    fn selected_pair_index(&self) -> Option<usize> {
        let selected = self.selected_post.as_deref()?;
        self.pairs.iter().position(|pair| pair.contains(selected))
    }

    fn promote_selected(&mut self) {
        let Some(index) = self.selected_pair_index() else {
            return;
        };
        if self.pairs[index].resolved {
            return;
        }
        let Some(post_id) = self.selected_post.clone() else {
            return;
        };
        let post = match self.pairs[index].post(&post_id) {
            Some(post) if !post.suppressed => post.clone(),
            _ => return,
        };
        let label = self.pairs[index].label_of(&post_id);
        self.pairs[index].resolved = true;

        let outcome = self.scores.apply_promotion(
            post.engagement_value,
            post.stability_delta,
            post.is_fake_news,
            DecisionSource::Player,
        );
        let feed_event = self.emit_feed_update(&post, label, DecisionSource::Player, &outcome, Vec::new());
        self.emit_score_changed(vec![feed_event]);

        if post.is_fake_news {
            self.show_message("You promoted fabricated content.");
        } else if outcome.stability_delta >= 2 {
            self.show_message("Good call. Stability improved.");
        }
        self.selected_post = None;
    }

    fn suppress_selected(&mut self) {
        let Some(index) = self.selected_pair_index() else {
            return;
        };
        if self.pairs[index].resolved {
            return;
        }
        let Some(post_id) = self.selected_post.clone() else {
            return;
        };
        let is_fake = match self.pairs[index].post(&post_id) {
            Some(post) if !post.suppressed => post.is_fake_news,
            _ => return,
        };
        if let Some(post) = self.pairs[index].post_mut(&post_id) {
            post.suppressed = true;
        }

        let outcome = self.scores.apply_suppression(is_fake);
        let suppress_event = self.push_event(
            EventType::SuppressedUpdated,
            post_id,
            Vec::new(),
            Some(json!({
                "is_fake_news": outcome.was_fake,
                "impact": outcome.impact,
                "backlash_count": outcome.backlash_count,
            })),
        );
        self.emit_score_changed(vec![suppress_event.clone()]);
        self.recompute_algorithm_preference(index, suppress_event);

        if outcome.was_fake {
            self.show_message("Fabricated content blocked. Good call.");
        } else {
            self.show_message("Backlash. That was genuine content.");
        }
        self.selected_post = None;
    }

    fn recompute_algorithm_preference(&mut self, index: usize, caused_by: String) {
        let pair = &mut self.pairs[index];
        let prefers = if pair.both_suppressed() {
            pair.resolved = true;
            None
        } else if pair.post_a.suppressed {
            pair.algorithm_prefers_a = false;
            Some("b")
        } else if pair.post_b.suppressed {
            pair.algorithm_prefers_a = true;
            Some("a")
        } else {
            pair.algorithm_prefers_a = pair.post_a.engagement_value >= pair.post_b.engagement_value;
            Some(if pair.algorithm_prefers_a { "a" } else { "b" })
        };
        let pair_id = pair.pair_id.clone();
        self.push_event(
            EventType::AlgorithmPreferenceShifted,
            pair_id,
            vec![caused_by],
            Some(json!({ "prefers": prefers })),
        );
    }

    fn verify_selected(&mut self) {
        if self.pending_verification.is_some() {
            return;
        }
        let Some(index) = self.selected_pair_index() else {
            return;
        };
        if self.pairs[index].resolved {
            return;
        }
        let Some(post_id) = self.selected_post.clone() else {
            return;
        };
        match self.pairs[index].post(&post_id) {
            Some(post) if !post.verified && !post.suppressed => {}
            _ => return,
        }
        self.pending_verification = Some(VerificationState {
            post_id: post_id.clone(),
            elapsed_ms: 0,
        });
        self.last_progress_decile = 0;
        self.push_event(
            EventType::VerificationStarted,
            post_id,
            Vec::new(),
            Some(json!({ "duration_ms": VERIFY_DURATION_MS })),
        );
        // selection is intentionally kept while the verification runs
    }

    /// Default resolution for a pair crossing the exit boundary unresolved.
    /// One suppressed post forces the other; otherwise raw engagement wins
    /// with ties favoring A; both suppressed means nothing is promoted.
    pub(super) fn algorithm_decides(&mut self, pair: &PostPair, exit_event: String) {
        if pair.resolved {
            return;
        }
        let a = &pair.post_a;
        let b = &pair.post_b;
        if a.suppressed && b.suppressed {
            return;
        }
        let chosen_is_a = if a.suppressed {
            false
        } else if b.suppressed {
            true
        } else {
            a.engagement_value >= b.engagement_value
        };
        let post = if chosen_is_a { a.clone() } else { b.clone() };
        let label = if chosen_is_a { "A" } else { "B" };

        let outcome = self.scores.apply_promotion(
            post.engagement_value,
            post.stability_delta,
            post.is_fake_news,
            DecisionSource::Algorithm,
        );
        let feed_event = self.emit_feed_update(
            &post,
            label,
            DecisionSource::Algorithm,
            &outcome,
            vec![exit_event],
        );
        self.emit_score_changed(vec![feed_event]);

        if post.is_fake_news {
            self.show_message("The engine promoted fabricated content.");
        } else if outcome.stability_delta <= -2 {
            self.show_message("The engine spread destabilizing content.");
        }
    }

    fn emit_feed_update(
        &mut self,
        post: &Post,
        label: &str,
        source: DecisionSource,
        outcome: &PromotionOutcome,
        caused_by: Vec<String>,
    ) -> String {
        let details = json!({
            "label": label,
            "source": source.as_str(),
            "engagement_delta": outcome.engagement_delta,
            "stability_delta": outcome.stability_delta,
            "original_stability_delta": outcome.original_stability_delta,
            "is_fake_news": post.is_fake_news,
            "reaction": post.reaction.as_str(),
        });
        self.push_event(EventType::FeedUpdated, post.post_id.clone(), caused_by, Some(details))
    }
}
