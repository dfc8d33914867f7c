//! Per-level question buffers and the anti-repeat sampler.
//!
//! Each level owns a [`LevelPool`] with its own [`ParkMiller`] sequence,
//! seeded from the session seed plus a level offset: two sessions with
//! different seeds draw differently, while a fixed seed reproduces a level's
//! draw order exactly.
//!
//! Anti-repeat is best effort. A draw makes at most `max_draw_attempts`
//! random picks looking for an expression outside the [`RecencyWindow`] and
//! takes the last pick if every attempt collides.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::debug;

use crate::drill_engine::{
    corpus::RecordSource,
    error::{DrillError, Result},
    models::QuestionRecord,
};

const PM_MODULUS: u64 = 0x7fff_ffff;
const PM_MULTIPLIER: u64 = 48_271;
/// Seed distance between consecutive levels.
pub const LEVEL_SEED_STRIDE: u64 = 97;

// ---------------------------------------------------------------------------
// Deterministic sequence
// ---------------------------------------------------------------------------

/// Park–Miller minimal standard generator: `s ← s · 48271 mod (2³¹ − 1)`.
#[derive(Debug, Clone)]
pub struct ParkMiller {
    state: u64,
}

impl ParkMiller {
    /// Any seed is accepted; it is folded into `1..2³¹−1` (zero would be a fixed point).
    pub fn new(seed: u64) -> Self {
        let state = seed % PM_MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Sequence for `level` within a session seeded with `session_seed`.
    pub fn for_level(session_seed: u64, level: u8) -> Self {
        Self::new(session_seed.wrapping_add(level as u64 * LEVEL_SEED_STRIDE))
    }

    pub fn next_value(&mut self) -> u32 {
        self.state = (self.state * PM_MULTIPLIER) % PM_MODULUS;
        self.state as u32
    }

    /// Index in `0..len`. `len` must be non-zero.
    pub fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.next_value() as usize % len
    }
}

// ---------------------------------------------------------------------------
// Recency window
// ---------------------------------------------------------------------------

/// The last `capacity` distinct expressions served, oldest first.
#[derive(Debug, Clone)]
pub struct RecencyWindow {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl RecencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(1024)),
            members: HashSet::new(),
            capacity,
        }
    }

    /// Window pre-filled from persisted history (oldest first).
    pub fn seeded<I: IntoIterator<Item = String>>(capacity: usize, history: I) -> Self {
        let mut window = Self::new(capacity);
        for expr in history {
            window.record(expr);
        }
        window
    }

    pub fn contains(&self, expression: &str) -> bool {
        self.members.contains(expression)
    }

    /// Mark `expression` as most recent, evicting the oldest past capacity.
    pub fn record(&mut self, expression: String) {
        if self.capacity == 0 {
            return;
        }
        if self.members.contains(&expression) {
            self.order.retain(|e| e != &expression);
        } else {
            self.members.insert(expression.clone());
        }
        self.order.push_back(expression);
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.members.remove(&old);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest first, the order persisted between sessions.
    pub fn to_vec(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Level pool
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LevelPool {
    level: u8,
    records: Vec<QuestionRecord>,
    rng: ParkMiller,
}

impl LevelPool {
    pub fn new(level: u8, session_seed: u64) -> Self {
        Self {
            level,
            records: Vec::new(),
            rng: ParkMiller::for_level(session_seed, level),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: QuestionRecord) {
        self.records.push(record);
    }

    /// Take one record, trying up to `attempts` picks to avoid `recent`.
    pub fn take(&mut self, recent: &RecencyWindow, attempts: usize) -> Option<QuestionRecord> {
        if self.records.is_empty() {
            return None;
        }
        let mut idx = self.rng.pick(self.records.len());
        for _ in 1..attempts.max(1) {
            if !recent.contains(&self.records[idx].expression) {
                break;
            }
            idx = self.rng.pick(self.records.len());
        }
        Some(self.records.remove(idx))
    }
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    /// Records a pool should hold before drawing.
    pub buffer_target: usize,
    /// Highest level routed into a pool; records above it are dropped.
    pub max_level: u8,
    pub max_draw_attempts: usize,
    pub recent_window: usize,
}

pub struct Sampler<S> {
    source: S,
    settings: SamplerSettings,
    session_seed: u64,
    pools: BTreeMap<u8, LevelPool>,
    recent: RecencyWindow,
    discarded: u64,
}

impl<S: RecordSource> Sampler<S> {
    pub fn new(source: S, settings: SamplerSettings, session_seed: u64) -> Self {
        Self::with_history(source, settings, session_seed, Vec::new())
    }

    /// Sampler whose recency window starts from persisted history.
    pub fn with_history(
        source: S,
        settings: SamplerSettings,
        session_seed: u64,
        history: Vec<String>,
    ) -> Self {
        Self {
            source,
            settings,
            session_seed,
            pools: BTreeMap::new(),
            recent: RecencyWindow::seeded(settings.recent_window, history),
            discarded: 0,
        }
    }

    /// Skip `n` upcoming source entries to start somewhere else in the corpus.
    pub fn skip_initial(&mut self, n: u64) -> Result<u64> {
        let skipped = self.source.skip(n)?;
        debug!(requested = n, skipped, "initial corpus skip");
        Ok(skipped)
    }

    fn pool_mut(&mut self, level: u8) -> &mut LevelPool {
        let seed = self.session_seed;
        self.pools
            .entry(level)
            .or_insert_with(|| LevelPool::new(level, seed))
    }

    /// Fill `level` to the buffer target, routing every pulled record to its own pool.
    pub fn ensure(&mut self, level: u8) -> Result<()> {
        let target = self.settings.buffer_target.max(1);
        let before = self.pool_len(level);
        while self.pool_len(level) < target {
            let Some(record) = self.source.next_record()? else {
                debug!(level, have = self.pool_len(level), target, "corpus exhausted");
                return Err(DrillError::StreamExhausted { level });
            };
            if record.level == 0 || record.level > self.settings.max_level {
                self.discarded += 1;
                continue;
            }
            self.pool_mut(record.level).push(record);
        }
        let after = self.pool_len(level);
        if after > before {
            debug!(level, before, after, "level pool refilled");
        }
        Ok(())
    }

    /// Remove one record from `level`'s pool and note it as recent.
    pub fn draw(&mut self, level: u8) -> Option<QuestionRecord> {
        let attempts = self.settings.max_draw_attempts;
        let pool = self.pools.get_mut(&level)?;
        let record = pool.take(&self.recent, attempts)?;
        self.recent.record(record.expression.clone());
        Some(record)
    }

    /// `ensure` then `draw`.
    pub fn next_question(&mut self, level: u8) -> Result<QuestionRecord> {
        self.ensure(level)?;
        self.draw(level)
            .ok_or(DrillError::StreamExhausted { level })
    }

    pub fn pool_len(&self, level: u8) -> usize {
        self.pools.get(&level).map_or(0, LevelPool::len)
    }

    pub fn recent(&self) -> &RecencyWindow {
        &self.recent
    }

    /// Records dropped for an out-of-range level.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
