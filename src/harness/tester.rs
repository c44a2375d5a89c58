use super::source::{KeySource, RngSource};
use crate::engine::{schedule, BoxSize, Key};
use crate::error::{Rc4Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use tracing::{debug, warn};

/// Trials run when the caller gives no usable count.
pub const DEFAULT_TRIAL_COUNT: u64 = 100_000;

const DEFAULT_TRIALS: NonZeroU64 = match NonZeroU64::new(DEFAULT_TRIAL_COUNT) {
    Some(n) => n,
    None => panic!("default trial count must be positive"),
};

/// Length of the random keys built for each trial.
pub const DEFAULT_KEY_SIZE: usize = 13;

/// Which statistic a test run collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Per-position survival of the value written by its own scheduling swap,
    /// across many independent keys.
    #[default]
    SwapPersistence,
    /// Keystream value frequencies from one key under sustained use.
    Randomness,
}

impl std::str::FromStr for TestKind {
    type Err = Rc4Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "swap" | "swap-persistence" | "persistence" => Ok(Self::SwapPersistence),
            "random" | "randomness" => Ok(Self::Randomness),
            _ => Err(Rc4Error::UnsupportedTest(s.to_string())),
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SwapPersistence => write!(f, "swap-persistence"),
            Self::Randomness => write!(f, "randomness"),
        }
    }
}

/// Number of trials (or keystream draws) in a run. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCount(NonZeroU64);

impl TrialCount {
    pub fn new(count: u64) -> Option<Self> {
        NonZeroU64::new(count).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Parse a count from user input.
    ///
    /// Accepts only a positive decimal integer without sign or leading zeros.
    /// Anything else is replaced by [`DEFAULT_TRIAL_COUNT`] and reported with
    /// a warning instead of failing.
    pub fn parse_lenient(input: &str) -> Self {
        let well_formed = input.starts_with(|c: char| ('1'..='9').contains(&c))
            && input.bytes().all(|b| b.is_ascii_digit());
        let parsed = if well_formed {
            input.parse::<u64>().ok().and_then(Self::new)
        } else {
            None
        };

        match parsed {
            Some(count) => count,
            None => {
                warn!(
                    input,
                    default = DEFAULT_TRIAL_COUNT,
                    "invalid trial count, using default"
                );
                Self::default()
            }
        }
    }
}

impl Default for TrialCount {
    fn default() -> Self {
        Self(DEFAULT_TRIALS)
    }
}

impl std::fmt::Display for TrialCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occurrence counts indexed by outcome `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: Vec<u64>,
}

impl FrequencyTable {
    pub fn new(n: BoxSize) -> Self {
        Self {
            counts: vec![0; n.get()],
        }
    }

    fn record(&mut self, outcome: usize) {
        self.counts[outcome] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn get(&self, outcome: usize) -> Option<u64> {
        self.counts.get(outcome).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Shape of the engines a tester builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TesterConfig {
    pub key_size: usize,
    pub box_size: BoxSize,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            key_size: DEFAULT_KEY_SIZE,
            box_size: BoxSize::default(),
        }
    }
}

/// Drives repeated trials against freshly scheduled engines.
pub struct StatTester<S = RngSource> {
    config: TesterConfig,
    source: S,
}

impl StatTester<RngSource> {
    /// Tester with its own entropy-seeded randomness.
    pub fn new(config: TesterConfig) -> Result<Self> {
        Self::with_source(config, RngSource::from_entropy())
    }

    pub fn seeded(config: TesterConfig, seed: u64) -> Result<Self> {
        Self::with_source(config, RngSource::seeded(seed))
    }
}

impl<S: KeySource> StatTester<S> {
    /// Fails with `InvalidKey` when `key_size` is zero.
    pub fn with_source(config: TesterConfig, source: S) -> Result<Self> {
        if config.key_size == 0 {
            return Err(Rc4Error::InvalidKey);
        }
        Ok(Self { config, source })
    }

    pub fn config(&self) -> TesterConfig {
        self.config
    }

    /// New random key of `key_size` bytes, each drawn from
    /// `0..=min(key_size, 255)`.
    pub fn make_key(&mut self) -> Key {
        let high = u8::try_from(self.config.key_size).unwrap_or(u8::MAX);
        let bytes = (0..self.config.key_size)
            .map(|_| self.source.draw(0, high))
            .collect();
        Key::from_nonempty(bytes)
    }

    /// Run `count` trials of the given kind and return the counts.
    pub fn run_trial(&mut self, kind: TestKind, count: TrialCount) -> FrequencyTable {
        debug!(
            %kind,
            count = count.get(),
            key_size = self.config.key_size,
            box_size = self.config.box_size.get(),
            "starting test run"
        );
        let table = match kind {
            TestKind::Randomness => self.randomness(count),
            TestKind::SwapPersistence => self.swap_persistence(count),
        };
        debug!(%kind, total = table.total(), "test run finished");
        table
    }

    /// One key, `count` keystream draws from the same ongoing generator.
    fn randomness(&mut self, count: TrialCount) -> FrequencyTable {
        let mut table = FrequencyTable::new(self.config.box_size);
        let key = self.make_key();
        let (mut state, _) = schedule(&key, self.config.box_size);
        for _ in 0..count.get() {
            table.record(state.next_output());
        }
        table
    }

    /// `count` fresh keys; position `idx` scores when its final value equals
    /// the value recorded right after its own scheduling swap. A value swapped
    /// away and later swapped back also scores.
    fn swap_persistence(&mut self, count: TrialCount) -> FrequencyTable {
        let mut table = FrequencyTable::new(self.config.box_size);
        for _ in 0..count.get() {
            let key = self.make_key();
            let (state, snapshot) = schedule(&key, self.config.box_size);
            for (idx, (now, then)) in state
                .as_slice()
                .iter()
                .zip(snapshot.as_slice())
                .enumerate()
            {
                if now == then {
                    table.record(idx);
                }
            }
        }
        table
    }
}
