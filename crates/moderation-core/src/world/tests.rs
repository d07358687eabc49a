use super::*;

use contracts::{CommandType, ReactionKind, STABILITY_MAX};

fn test_config() -> SessionConfig {
    SessionConfig {
        run_id: "shift_test".to_string(),
        seed: 42,
        ..SessionConfig::default()
    }
}

fn running_world() -> ModerationWorld {
    let mut world = ModerationWorld::new(test_config());
    world.start();
    world
}

fn crafted_post(
    post_id: &str,
    reaction: ReactionKind,
    engagement: i64,
    stability: i64,
    fake: bool,
) -> Post {
    Post {
        post_id: post_id.to_string(),
        reaction,
        engagement_value: engagement,
        stability_delta: stability,
        fake_news_probability: 0.1,
        is_fake_news: fake,
        verified: false,
        suppressed: false,
    }
}

fn push_crafted_pair(
    world: &mut ModerationWorld,
    pair_id: &str,
    post_a: Post,
    post_b: Post,
    position: f64,
) {
    let algorithm_prefers_a = post_a.engagement_value >= post_b.engagement_value;
    world.pairs.push(PostPair {
        pair_id: pair_id.to_string(),
        post_a,
        post_b,
        position,
        algorithm_prefers_a,
        resolved: false,
        in_warning_zone: false,
    });
    world.status.live_pairs = world.pairs.len();
}

fn events_of(world: &ModerationWorld, event_type: EventType) -> Vec<&Event> {
    world
        .events()
        .iter()
        .filter(|event| event.event_type == event_type)
        .collect()
}

#[test]
fn start_spawns_seeded_pair_and_primes_countdown() {
    let world = running_world();
    assert_eq!(world.pairs.len(), 1);
    assert!((world.pairs[0].position - CARD_CLEARANCE).abs() < f64::EPSILON);
    assert!(world.spawn_timer_ms as f64 >= world.spawn_interval_ms());
    assert_eq!(events_of(&world, EventType::SessionStarted).len(), 1);
    assert_eq!(events_of(&world, EventType::PairSpawned).len(), 1);
}

#[test]
fn second_pair_spawns_with_full_clearance() {
    let mut world = running_world();
    assert!(world.step(16));
    assert_eq!(world.pairs.len(), 2);
    let gap = world.pairs[0].position - world.pairs[1].position;
    assert!(gap >= CARD_CLEARANCE, "spawn gap {gap} below clearance");
}

#[test]
fn player_promote_end_to_end() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Haha, 1_000, 2, false),
        crafted_post("post:craft:b", ReactionKind::Angry, 2_000, -1, true),
        100.0,
    );

    world.select_post("post:craft:a");
    assert_eq!(world.selected_post(), Some("post:craft:a"));
    world.perform_action(PlayerAction::Promote);

    assert_eq!(world.engagement(), 1_250);
    assert_eq!(world.stability(), STABILITY_MAX);
    assert!(world.pairs.iter().any(|pair| pair.pair_id == "pair:craft" && pair.resolved));
    assert_eq!(world.selected_post(), None);

    let feeds = events_of(&world, EventType::FeedUpdated);
    assert_eq!(feeds.len(), 1);
    let details = feeds[0].details.as_ref().expect("feed details");
    assert_eq!(details["source"], "player");
    assert_eq!(details["label"], "A");
    assert_eq!(details["engagement_delta"], 1_250);
    assert_eq!(details["stability_delta"], 2);
    assert_eq!(details["is_fake_news"], false);
}

#[test]
fn player_promote_fake_applies_scaled_penalty() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Love, 1_000, 3, true),
        crafted_post("post:craft:b", ReactionKind::Like, 500, 1, false),
        100.0,
    );

    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Promote);

    // +3 inverts to -3, then scales to floor(-3.75) = -4
    assert_eq!(world.stability(), 96);
    let feeds = events_of(&world, EventType::FeedUpdated);
    let details = feeds[0].details.as_ref().expect("feed details");
    assert_eq!(details["stability_delta"], -4);
    assert_eq!(details["original_stability_delta"], 3);
    assert_eq!(details["is_fake_news"], true);
}

#[test]
fn suppression_backlash_escalates_across_pairs() {
    let mut world = running_world();
    for index in 0..3 {
        push_crafted_pair(
            &mut world,
            &format!("pair:craft{index}"),
            crafted_post(&format!("post:craft{index}:a"), ReactionKind::Like, 5_000, 1, false),
            crafted_post(&format!("post:craft{index}:b"), ReactionKind::Sad, 4_000, -2, false),
            50.0,
        );
    }

    for index in 0..3 {
        world.select_post(&format!("post:craft{index}:a"));
        world.perform_action(PlayerAction::Suppress);
    }

    assert_eq!(world.backlash_count(), 3);
    assert_eq!(world.stability(), 94);
    let impacts = events_of(&world, EventType::SuppressedUpdated)
        .iter()
        .map(|event| {
            let details = event.details.as_ref().expect("suppress details");
            (
                details["impact"].as_i64().expect("impact"),
                details["backlash_count"].as_u64().expect("backlash"),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(impacts, vec![(-1, 1), (-2, 2), (-3, 3)]);
}

#[test]
fn suppressing_fake_shifts_preference_to_other() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Angry, 9_000, -3, true),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        50.0,
    );
    assert!(world.pairs.last().expect("pair").algorithm_prefers_a);

    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Suppress);

    assert_eq!(world.stability(), STABILITY_MAX);
    assert_eq!(world.backlash_count(), 0);
    let pair = world
        .pairs
        .iter()
        .find(|pair| pair.pair_id == "pair:craft")
        .expect("pair");
    assert!(!pair.algorithm_prefers_a);
    assert!(!pair.resolved);

    let shifts = events_of(&world, EventType::AlgorithmPreferenceShifted);
    assert_eq!(shifts.len(), 1);
    let details = shifts[0].details.as_ref().expect("shift details");
    assert_eq!(details["prefers"], "b");
}

#[test]
fn both_suppressed_pair_resolves_and_exit_changes_nothing() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Angry, 9_000, -3, true),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        50.0,
    );

    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Suppress);
    world.select_post("post:craft:b");
    world.perform_action(PlayerAction::Suppress);

    // +1 for the fake, -1 backlash for the genuine one
    assert_eq!(world.stability(), 99);
    let pair_index = world
        .pairs
        .iter()
        .position(|pair| pair.pair_id == "pair:craft")
        .expect("pair");
    assert!(world.pairs[pair_index].resolved);

    world.pairs[pair_index].position = BELT_LENGTH + 1.0;
    let engagement_before = world.engagement();
    let stability_before = world.stability();
    assert!(world.step(16));

    assert!(events_of(&world, EventType::PairExited)
        .iter()
        .any(|event| event.subject_id == "pair:craft"));
    assert!(events_of(&world, EventType::FeedUpdated).is_empty());
    assert_eq!(world.engagement(), engagement_before);
    assert_eq!(world.stability(), stability_before);
}

#[test]
fn algorithm_tie_break_chooses_a() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Wow, 5_000, -1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 5_000, -2, false),
        BELT_LENGTH + 1.0,
    );

    assert!(world.step(16));

    assert_eq!(world.engagement(), 5_000);
    let feeds = events_of(&world, EventType::FeedUpdated);
    assert_eq!(feeds.len(), 1);
    let details = feeds[0].details.as_ref().expect("feed details");
    assert_eq!(details["label"], "A");
    assert_eq!(details["source"], "algorithm");
    assert_eq!(details["engagement_delta"], 5_000);
}

#[test]
fn algorithm_prefers_unsuppressed_post() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Angry, 9_000, -3, false),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        50.0,
    );
    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Suppress);

    let pair_index = world
        .pairs
        .iter()
        .position(|pair| pair.pair_id == "pair:craft")
        .expect("pair");
    world.pairs[pair_index].position = BELT_LENGTH + 1.0;
    assert!(world.step(16));

    let feeds = events_of(&world, EventType::FeedUpdated);
    assert_eq!(feeds.len(), 1);
    let details = feeds[0].details.as_ref().expect("feed details");
    assert_eq!(details["label"], "B");
    assert_eq!(details["engagement_delta"], 1_000);
}

#[test]
fn verification_completes_and_reveals() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Wow, 3_000, -1, true),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        10.0,
    );

    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Verify);
    assert!(world.pending_verification.is_some());
    assert_eq!(world.selected_post(), Some("post:craft:a"));

    assert!(world.step(1_000));
    assert!(!events_of(&world, EventType::VerificationProgressed).is_empty());
    assert_eq!(world.selected_post(), Some("post:craft:a"));

    assert!(world.step(1_000));
    assert!(world.pending_verification.is_none());
    let completions = events_of(&world, EventType::VerificationCompleted);
    assert_eq!(completions.len(), 1);
    let details = completions[0].details.as_ref().expect("completion details");
    assert_eq!(details["is_fake_news"], true);
    let post = world
        .pairs
        .iter()
        .find_map(|pair| pair.post("post:craft:a"))
        .expect("post");
    assert!(post.verified);

    // a second verify on the revealed post is a no-op
    world.perform_action(PlayerAction::Verify);
    assert!(world.pending_verification.is_none());
}

#[test]
fn verification_cancelled_when_no_time_left() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Wow, 3_000, -1, true),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        BELT_LENGTH - 10.0,
    );

    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Verify);
    assert!(world.step(16));

    assert!(world.pending_verification.is_none());
    let cancellations = events_of(&world, EventType::VerificationCancelled);
    assert_eq!(cancellations.len(), 1);
    let details = cancellations[0].details.as_ref().expect("cancel details");
    assert_eq!(details["reason"], "insufficient_time");
}

#[test]
fn actions_without_selection_are_noops() {
    let mut world = running_world();
    world.perform_action(PlayerAction::Promote);
    world.perform_action(PlayerAction::Suppress);
    world.perform_action(PlayerAction::Verify);

    assert_eq!(world.engagement(), 0);
    assert_eq!(world.stability(), STABILITY_MAX);
    assert!(events_of(&world, EventType::FeedUpdated).is_empty());
    assert!(events_of(&world, EventType::SuppressedUpdated).is_empty());
    assert!(world.pending_verification.is_none());
}

#[test]
fn actions_on_resolved_pair_are_noops() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Like, 1_000, 1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 2_000, -2, false),
        50.0,
    );
    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Promote);
    let engagement_after_first = world.engagement();

    world.select_post("post:craft:b");
    assert_eq!(world.selected_post(), None);
    world.perform_action(PlayerAction::Promote);
    world.perform_action(PlayerAction::Suppress);

    assert_eq!(world.engagement(), engagement_after_first);
    assert_eq!(events_of(&world, EventType::FeedUpdated).len(), 1);
}

#[test]
fn dangling_selection_after_exit_is_noop() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Like, 1_000, 1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 2_000, -2, false),
        50.0,
    );
    world.select_post("post:craft:a");
    let pair_index = world
        .pairs
        .iter()
        .position(|pair| pair.pair_id == "pair:craft")
        .expect("pair");
    world.pairs[pair_index].position = BELT_LENGTH + 1.0;
    assert!(world.step(16));

    let engagement_after_exit = world.engagement();
    world.perform_action(PlayerAction::Promote);
    assert_eq!(world.engagement(), engagement_after_exit);
}

#[test]
fn collapse_ends_session_unless_god_mode() {
    let mut world = running_world();
    world.scores.stability = 0;
    assert!(world.step(16));
    assert_eq!(world.status().mode, SessionMode::Ended);
    assert_eq!(world.status().outcome, Some(OutcomeKind::Collapse));
    let ended = events_of(&world, EventType::SessionEnded);
    assert_eq!(ended.len(), 1);
    let details = ended[0].details.as_ref().expect("end details");
    assert_eq!(details["outcome"], "collapse");

    let mut god_world = running_world();
    god_world.set_loss_check_override(true);
    god_world.scores.stability = 0;
    assert!(god_world.step(16));
    assert_eq!(god_world.status().mode, SessionMode::Running);
    // the override never touches the score itself
    assert_eq!(god_world.stability(), 0);
}

#[test]
fn completed_outcome_at_full_duration() {
    let mut world = ModerationWorld::new(SessionConfig {
        duration_ms: 2_000,
        ..test_config()
    });
    world.start();
    world.step_n(10, 500);

    assert_eq!(world.status().mode, SessionMode::Ended);
    assert_eq!(world.status().outcome, Some(OutcomeKind::Completed));
    let ended = events_of(&world, EventType::SessionEnded);
    assert_eq!(ended.len(), 1);
    let details = ended[0].details.as_ref().expect("end details");
    assert_eq!(details["outcome"], "completed");
    assert_eq!(details["final_stability"], 100);
}

#[test]
fn reset_restores_initial_state() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Like, 1_000, 1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 2_000, -2, false),
        50.0,
    );
    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Suppress);
    world.set_loss_check_override(true);
    world.step(500);

    world.reset();

    assert_eq!(world.status().mode, SessionMode::NotStarted);
    assert_eq!(world.status().elapsed_ms, 0);
    assert_eq!(world.status().phase_index, 0);
    assert_eq!(world.engagement(), 0);
    assert_eq!(world.stability(), STABILITY_MAX);
    assert_eq!(world.backlash_count(), 0);
    assert!(world.pairs.is_empty());
    assert_eq!(world.selected_post(), None);
    assert!(world.pending_verification.is_none());
    assert!(!world.loss_check_override);
    assert_eq!(world.events().len(), 1);
    assert_eq!(world.events()[0].event_type, EventType::SessionReset);
}

#[test]
fn phase_advance_updates_speed_and_resets_countdown() {
    let mut world = ModerationWorld::new(SessionConfig {
        duration_ms: 10_000,
        ..test_config()
    });
    world.start();
    assert!(world.step(1_000));

    assert_eq!(world.status().phase_index, 1);
    assert!((world.status().belt_speed - contracts::PHASE_SPEEDS[1]).abs() < f64::EPSILON);
    let advances = events_of(&world, EventType::PhaseAdvanced);
    assert_eq!(advances.len(), 1);
    let details = advances[0].details.as_ref().expect("phase details");
    assert_eq!(details["phase_index"], 1);
}

#[test]
fn warning_zone_flagged_once() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Like, 1_000, 1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 2_000, -2, false),
        BELT_LENGTH - WARNING_ZONE_DEPTH - 50.0,
    );

    assert!(world.step(3_000));
    assert!(world.step(16));

    let warnings = events_of(&world, EventType::PairEnteredWarningZone)
        .iter()
        .filter(|event| event.subject_id == "pair:craft")
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn commands_drive_selection_and_action() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Like, 1_000, 1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 2_000, -2, false),
        50.0,
    );

    world.inject_command(Command::new(
        "cmd_select",
        world.run_id().to_string(),
        world.status().tick,
        CommandType::SelectPost,
        CommandPayload::SelectPost {
            post_id: "post:craft:a".to_string(),
        },
    ));
    world.inject_command(Command::new(
        "cmd_promote",
        world.run_id().to_string(),
        world.status().tick,
        CommandType::PerformAction,
        CommandPayload::PerformAction {
            action: PlayerAction::Promote,
        },
    ));
    assert_eq!(world.status().queue_depth, 2);

    assert!(world.step(16));

    assert_eq!(world.engagement(), 1_250);
    assert_eq!(world.status().queue_depth, 0);
    assert_eq!(events_of(&world, EventType::CommandApplied).len(), 2);
}

#[test]
fn stability_warnings_fire_once_each_most_severe_first() {
    let mut world = running_world();
    world.scores.stability = 45;
    assert!(world.step(16));
    world.scores.stability = 45;
    assert!(world.step(16));

    let raised = events_of(&world, EventType::StabilityWarningRaised);
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].details.as_ref().expect("details")["threshold"], 50);

    world.scores.stability = 15;
    assert!(world.step(16));
    let raised = events_of(&world, EventType::StabilityWarningRaised);
    assert_eq!(raised.len(), 2);
    assert_eq!(raised[1].details.as_ref().expect("details")["threshold"], 20);
}

#[test]
fn timer_event_on_whole_second_boundary() {
    let mut world = running_world();
    assert!(world.step(500));
    assert_eq!(events_of(&world, EventType::TimerUpdated).len(), 1);
    assert!(world.step(200));
    assert_eq!(events_of(&world, EventType::TimerUpdated).len(), 1);
    assert!(world.step(400));
    assert_eq!(events_of(&world, EventType::TimerUpdated).len(), 2);
}

#[test]
fn display_state_tracks_selection_and_verification() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Wow, 3_000, -1, true),
        crafted_post("post:craft:b", ReactionKind::Like, 1_000, 1, false),
        10.0,
    );
    world.select_post("post:craft:a");
    world.perform_action(PlayerAction::Verify);
    assert!(world.step(500));

    let display = world.display_state();
    assert_eq!(display.mode, SessionMode::Running);
    assert_eq!(display.stability, STABILITY_MAX);
    assert_eq!(display.selected_post_id.as_deref(), Some("post:craft:a"));
    assert_eq!(display.remaining_ms, world.status().remaining_ms());
    let verification = display.verification.expect("verification view");
    assert_eq!(verification.post_id, "post:craft:a");
    assert!((verification.fraction_complete - 0.25).abs() < 1e-6);
    assert!(display.message.is_some());

    let pair_view = world.inspect_pair("pair:craft").expect("pair view");
    assert_eq!(pair_view["post_a"]["post_id"], "post:craft:a");
    assert!(pair_view["distance_to_exit"].as_f64().expect("distance") > 0.0);

    let session_view = world.inspect_session();
    assert_eq!(session_view["event_count"], world.events().len() as u64);
}

#[test]
fn causal_chain_links_feed_to_exit() {
    let mut world = running_world();
    push_crafted_pair(
        &mut world,
        "pair:craft",
        crafted_post("post:craft:a", ReactionKind::Wow, 5_000, -1, false),
        crafted_post("post:craft:b", ReactionKind::Sad, 4_000, -2, false),
        BELT_LENGTH + 1.0,
    );
    assert!(world.step(16));

    let score_event = events_of(&world, EventType::ScoreChanged)
        .last()
        .expect("score event")
        .event_id
        .clone();
    let chain = world.traverse_causal_chain(&score_event);
    let chain_types = chain.iter().map(|event| event.event_type).collect::<Vec<_>>();
    assert_eq!(
        chain_types,
        vec![
            EventType::ScoreChanged,
            EventType::FeedUpdated,
            EventType::PairExited,
        ]
    );
}
