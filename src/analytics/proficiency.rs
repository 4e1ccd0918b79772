// src/analytics/proficiency.rs
//! Placeholder proficiency figures shown on the dashboard.
//!
//! No stored signal backs these numbers yet. Each read draws fresh values
//! from a fixed band, so consecutive reads differ.

use rand::Rng;

pub const PROFICIENCY_FLOOR: f64 = 75.0;
pub const PROFICIENCY_CEILING: f64 = 100.0;
pub const SKILL_SCORE_RANGE: std::ops::RangeInclusive<u32> = 75..=95;

pub trait ProficiencySource: Send + Sync {
    /// Current level for one skill, in `[PROFICIENCY_FLOOR, PROFICIENCY_CEILING)`
    fn current_level(&self, skill: &str) -> f64;

    /// Overall score for a user with at least one skill
    fn skill_score(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomProficiency;

impl ProficiencySource for RandomProficiency {
    fn current_level(&self, _skill: &str) -> f64 {
        rand::thread_rng().gen_range(PROFICIENCY_FLOOR..PROFICIENCY_CEILING)
    }

    fn skill_score(&self) -> u32 {
        rand::thread_rng().gen_range(SKILL_SCORE_RANGE)
    }
}

/// Same answer on every call
#[derive(Debug, Clone, Copy)]
pub struct FixedProficiency {
    pub level: f64,
    pub score: u32,
}

impl ProficiencySource for FixedProficiency {
    fn current_level(&self, _skill: &str) -> f64 {
        self.level
    }

    fn skill_score(&self) -> u32 {
        self.score
    }
}
