//! Post generation: weighted reaction sampling over deterministic streams.
//!
//! Every draw mixes the session seed with a monotonically increasing stream
//! counter, so a given seed always produces the same belt of posts and runs
//! replay bit-for-bit.

use contracts::{PostSnapshot, ReactionKind};

/// Symmetric uniform noise band added to each kind's base engagement.
pub const ENGAGEMENT_NOISE_BAND: i64 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct ReactionProfile {
    pub kind: ReactionKind,
    pub weight: u32,
    pub stability_base: i64,
    pub fake_chance_bps: u32,
    pub engagement_base: i64,
}

/// The fixed reaction table. Weights are relative; fake chance is in basis
/// points. Emotional kinds carry more engagement and worse stability.
pub static REACTION_PROFILES: [ReactionProfile; 6] = [
    ReactionProfile {
        kind: ReactionKind::Love,
        weight: 10,
        stability_base: 3,
        fake_chance_bps: 500,
        engagement_base: 50_000,
    },
    ReactionProfile {
        kind: ReactionKind::Haha,
        weight: 15,
        stability_base: 2,
        fake_chance_bps: 1_500,
        engagement_base: 20_000,
    },
    ReactionProfile {
        kind: ReactionKind::Like,
        weight: 25,
        stability_base: 1,
        fake_chance_bps: 1_000,
        engagement_base: 5_000,
    },
    ReactionProfile {
        kind: ReactionKind::Wow,
        weight: 20,
        stability_base: -1,
        fake_chance_bps: 2_500,
        engagement_base: 40_000,
    },
    ReactionProfile {
        kind: ReactionKind::Sad,
        weight: 15,
        stability_base: -2,
        fake_chance_bps: 2_000,
        engagement_base: 30_000,
    },
    ReactionProfile {
        kind: ReactionKind::Angry,
        weight: 15,
        stability_base: -3,
        fake_chance_bps: 4_000,
        engagement_base: 60_000,
    },
];

pub fn profile_for(kind: ReactionKind) -> &'static ReactionProfile {
    REACTION_PROFILES
        .iter()
        .find(|profile| profile.kind == kind)
        .unwrap_or(&REACTION_PROFILES[0])
}

/// One content item. Attribute fields are fixed at generation time;
/// `verified` and `suppressed` each flip at most once during the lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub post_id: String,
    pub reaction: ReactionKind,
    pub engagement_value: i64,
    pub stability_delta: i64,
    pub fake_news_probability: f32,
    pub is_fake_news: bool,
    pub verified: bool,
    pub suppressed: bool,
}

impl Post {
    pub fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            post_id: self.post_id.clone(),
            reaction: self.reaction,
            engagement_value: self.engagement_value,
            stability_delta: self.stability_delta,
            fake_news_probability: self.fake_news_probability,
            is_fake_news: self.is_fake_news,
            verified: self.verified,
            suppressed: self.suppressed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostGenerator {
    seed: u64,
    stream: u64,
}

impl PostGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn generate(&mut self, post_id: String) -> Post {
        let profile = self.pick_profile();

        let engagement_value = (profile.engagement_base
            + self.sample_range(-ENGAGEMENT_NOISE_BAND, ENGAGEMENT_NOISE_BAND))
        .max(1);

        let mut stability_delta = profile.stability_base + self.sample_range(-1, 1);
        if stability_delta == 0 {
            // every post nudges the world one way or the other
            stability_delta = if self.sample_range(0, 1) == 0 { 1 } else { -1 };
        }

        let is_fake_news = self.sample_range(0, 9_999) < i64::from(profile.fake_chance_bps);

        Post {
            post_id,
            reaction: profile.kind,
            engagement_value,
            stability_delta,
            fake_news_probability: profile.fake_chance_bps as f32 / 10_000.0,
            is_fake_news,
            verified: false,
            suppressed: false,
        }
    }

    fn pick_profile(&mut self) -> &'static ReactionProfile {
        let total = REACTION_PROFILES
            .iter()
            .map(|profile| i64::from(profile.weight))
            .sum::<i64>();
        let mut roll = self.sample_range(0, total - 1);
        for profile in &REACTION_PROFILES {
            roll -= i64::from(profile.weight);
            if roll < 0 {
                return profile;
            }
        }
        &REACTION_PROFILES[REACTION_PROFILES.len() - 1]
    }

    fn sample_range(&mut self, min: i64, max: i64) -> i64 {
        self.stream = self.stream.wrapping_add(1);
        sample_range_i64(self.seed, self.stream, min, max)
    }
}

fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut value = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    value ^= value.rotate_left(29);
    value = value.wrapping_mul(0x517C_C1B7_2722_0A95);
    value ^ (value >> 31)
}

fn sample_range_i64(seed: u64, stream: u64, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    let span = (max - min + 1) as u64;
    let mixed = mix_seed(seed, stream);
    min + (mixed % span) as i64
}
