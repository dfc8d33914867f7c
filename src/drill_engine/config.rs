use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drill_engine::{
    answer::DEFAULT_TOLERANCE,
    error::{DrillError, Result},
    pool::SamplerSettings,
};

/// Session tunables. Every field has a default; presets match the three drill modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time allowed per question.
    #[serde(with = "duration_secs")]
    pub question_timeout: Duration,
    /// Records a level pool should hold before a draw.
    pub buffer_target: usize,
    /// Distinct expressions remembered for anti-repeat.
    pub recent_window: usize,
    /// Points per level step: `level = ceil((score + 1) / score_step)`.
    pub score_step: u32,
    pub level_cap: u8,
    /// Highest level accepted from the corpus.
    pub corpus_levels: u8,
    pub max_draw_attempts: usize,
    /// Upper bound (exclusive) of the random number of corpus entries skipped at start.
    pub max_initial_skip: u64,
    pub answer_tolerance: f64,
    pub high_score_key: String,
    /// Where recent history is persisted; `None` keeps it in-session only.
    pub recent_key: Option<String>,
    /// Fixed session seed; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::arithmetic_drill()
    }
}

impl SessionConfig {
    /// Streaming arithmetic corpus, 30 levels.
    pub fn arithmetic_drill() -> Self {
        Self {
            question_timeout: Duration::from_secs(20),
            buffer_target: 512,
            recent_window: 500,
            score_step: 5,
            level_cap: 30,
            corpus_levels: 30,
            max_draw_attempts: 10,
            max_initial_skip: 100_000,
            answer_tolerance: DEFAULT_TOLERANCE,
            high_score_key: "highScore".to_string(),
            recent_key: Some("recentQs".to_string()),
            seed: None,
        }
    }

    /// Exact-value trig bank, 10 levels.
    pub fn trig_drill() -> Self {
        Self {
            question_timeout: Duration::from_secs(15),
            buffer_target: 4,
            recent_window: 10,
            level_cap: 10,
            corpus_levels: 10,
            max_initial_skip: 0,
            high_score_key: "trigHighScore".to_string(),
            recent_key: None,
            ..Self::arithmetic_drill()
        }
    }

    /// Endless degree/radian conversion, single level.
    pub fn radian_drill() -> Self {
        Self {
            question_timeout: Duration::from_secs(15),
            buffer_target: 8,
            recent_window: 4,
            score_step: 3,
            level_cap: 1,
            corpus_levels: 1,
            max_initial_skip: 0,
            high_score_key: "rdHighScore".to_string(),
            recent_key: None,
            ..Self::arithmetic_drill()
        }
    }

    /// Apply `DRILL_*` environment overrides; unset or unparsable variables are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an injectable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T, L>(lookup: &L, name: &str) -> Option<T>
        where
            T: std::str::FromStr,
            L: Fn(&str) -> Option<String>,
        {
            lookup(name).and_then(|v| v.trim().parse().ok())
        }

        if let Some(secs) = parsed(&lookup, "DRILL_TIMEOUT_SECS") {
            self.question_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = parsed(&lookup, "DRILL_BUFFER_TARGET") {
            self.buffer_target = v;
        }
        if let Some(v) = parsed(&lookup, "DRILL_RECENT_WINDOW") {
            self.recent_window = v;
        }
        if let Some(v) = parsed(&lookup, "DRILL_SCORE_STEP") {
            self.score_step = v;
        }
        if let Some(v) = parsed(&lookup, "DRILL_LEVEL_CAP") {
            self.level_cap = v;
        }
        if let Some(v) = parsed(&lookup, "DRILL_SEED") {
            self.seed = Some(v);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.question_timeout.is_zero() {
            return Err(DrillError::config("question_timeout must be positive"));
        }
        if self.buffer_target == 0 {
            return Err(DrillError::config("buffer_target must be at least 1"));
        }
        if self.score_step == 0 {
            return Err(DrillError::config("score_step must be at least 1"));
        }
        if self.level_cap == 0 || self.corpus_levels == 0 {
            return Err(DrillError::config("level_cap and corpus_levels must be at least 1"));
        }
        if self.level_cap > self.corpus_levels {
            return Err(DrillError::config(format!(
                "level_cap {} exceeds corpus_levels {}",
                self.level_cap, self.corpus_levels
            )));
        }
        if self.max_draw_attempts == 0 {
            return Err(DrillError::config("max_draw_attempts must be at least 1"));
        }
        if !(self.answer_tolerance > 0.0) {
            return Err(DrillError::config("answer_tolerance must be positive"));
        }
        Ok(())
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            buffer_target: self.buffer_target,
            max_level: self.corpus_levels,
            max_draw_attempts: self.max_draw_attempts,
            recent_window: self.recent_window,
        }
    }

    /// `min(level_cap, ceil((score + 1) / score_step))`, never below 1.
    pub fn level_for_score(&self, score: i64) -> u8 {
        let step = self.score_step.max(1) as i64;
        let raw = (score + 1).max(0);
        let level = (raw + step - 1) / step;
        level.clamp(1, self.level_cap.max(1) as i64) as u8
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        SessionConfig::arithmetic_drill().validate().unwrap();
        SessionConfig::trig_drill().validate().unwrap();
        SessionConfig::radian_drill().validate().unwrap();
    }

    #[test]
    fn level_for_score_matches_the_step_scheme() {
        let cfg = SessionConfig::trig_drill();
        assert_eq!(cfg.level_for_score(0), 1);
        assert_eq!(cfg.level_for_score(1), 1);
        assert_eq!(cfg.level_for_score(4), 1);
        assert_eq!(cfg.level_for_score(5), 2);
        assert_eq!(cfg.level_for_score(6), 2);
        assert_eq!(cfg.level_for_score(1000), 10);
        assert_eq!(cfg.level_for_score(-1), 1);
    }

    #[test]
    fn json_uses_seconds_and_fills_defaults() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"question_timeout": 7, "buffer_target": 3}"#).unwrap();
        assert_eq!(cfg.question_timeout, Duration::from_secs(7));
        assert_eq!(cfg.buffer_target, 3);
        assert_eq!(cfg.score_step, 5);
        let text = serde_json::to_string(&cfg).unwrap();
        assert!(text.contains(r#""question_timeout":7"#));
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let cfg = SessionConfig::trig_drill().with_overrides(|name| match name {
            "DRILL_TIMEOUT_SECS" => Some("30".into()),
            "DRILL_SEED" => Some("42".into()),
            "DRILL_BUFFER_TARGET" => Some("many".into()),
            _ => None,
        });
        assert_eq!(cfg.question_timeout, Duration::from_secs(30));
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.buffer_target, 4);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cfg = SessionConfig { score_step: 0, ..SessionConfig::trig_drill() };
        assert!(matches!(cfg.validate(), Err(DrillError::Config(_))));
        let cfg = SessionConfig { level_cap: 12, ..SessionConfig::trig_drill() };
        assert!(cfg.validate().is_err());
    }
}
