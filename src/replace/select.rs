use crate::error::{Result, SeqError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// How replacement targets are chosen. Fixed for the whole run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Mode {
    /// One random record per replacement string, each at a random offset.
    Random,
    /// One random record per replacement string, each at `offset`.
    RandomFixed { offset: usize },
    /// Every record at `offset`, rotating through the replacement strings.
    Position { offset: usize },
    /// Only the record at 1-based `ordinal`, at `offset`, with the first replacement string.
    Single { ordinal: usize, offset: usize },
}

impl Mode {
    /// Random modes need the total record count before the replacing pass can start.
    pub fn needs_count(&self) -> bool {
        matches!(self, Mode::Random | Mode::RandomFixed { .. })
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Random => write!(f, "random"),
            Mode::RandomFixed { offset } => write!(f, "random-fixed (position {offset})"),
            Mode::Position { offset } => write!(f, "position {offset}"),
            Mode::Single { ordinal, offset } => {
                write!(f, "single (read #{ordinal}, position {offset})")
            }
        }
    }
}

/// A decision that one replacement string should go into the current record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Index into the replacement list.
    pub index: usize,
    /// 0-based offset into the sequence.
    pub offset: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Placement {
    Pending,
    At(usize),
    // the selected record is shorter than the replacement
    Unplaceable,
}

#[derive(Clone, Debug)]
struct Draw {
    ordinal: usize,
    placement: Placement,
}

/// Decides which records receive which replacement, and where.
///
/// Owns the run's random generator, so two selectors built with the same seed make identical
/// choices over the same input.
pub struct Selector {
    mode: Mode,
    replacements: Vec<Vec<u8>>,
    rng: StdRng,
    draws: Vec<Draw>,
    applied: usize,
}

impl Selector {
    /// # Errors
    ///
    /// Returns `SeqError::Config` if there are no replacement strings, one of them is empty,
    /// or a single-mode ordinal is 0.
    pub fn new(mode: Mode, replacements: Vec<Vec<u8>>, seed: u64) -> Result<Self> {
        if replacements.is_empty() {
            return Err(SeqError::Config(
                "at least one replacement sequence must be specified".into(),
            ));
        }
        if replacements.iter().any(|r| r.is_empty()) {
            return Err(SeqError::Config("replacement sequences cannot be empty".into()));
        }
        if let Mode::Single { ordinal: 0, .. } = mode {
            return Err(SeqError::Config("read number must be >= 1".into()));
        }

        Ok(Self {
            mode,
            replacements,
            rng: StdRng::seed_from_u64(seed),
            draws: Vec::new(),
            applied: 0,
        })
    }

    pub fn replacement(&self, index: usize) -> &[u8] {
        &self.replacements[index]
    }

    pub fn replacements(&self) -> &[Vec<u8>] {
        &self.replacements
    }

    /// Draws one 1-based target ordinal per replacement string, uniformly from
    /// `1..=total_records`. Duplicates are allowed. Only meaningful for random modes.
    ///
    /// Returns `false` when there is nothing to draw from.
    pub fn draw_ordinals(&mut self, total_records: usize) -> bool {
        if total_records == 0 {
            return false;
        }

        self.draws = (0..self.replacements.len())
            .map(|_| Draw {
                ordinal: self.rng.gen_range(1..=total_records),
                placement: Placement::Pending,
            })
            .collect();
        true
    }

    /// The ordinals drawn for random modes, in replacement-list order.
    pub fn drawn_ordinals(&self) -> Vec<usize> {
        self.draws.iter().map(|d| d.ordinal).collect()
    }

    /// Returns the replacements selected for the record at 1-based `ordinal` whose sequence is
    /// `seq_len` long, in replacement-list order.
    ///
    /// Random offsets are drawn here, the first time a selected record is visited. A target may
    /// still overflow the sequence; the caller skips it in that case.
    pub fn select(&mut self, ordinal: usize, seq_len: usize) -> Vec<Target> {
        match self.mode {
            Mode::Position { offset } => vec![Target {
                index: self.applied % self.replacements.len(),
                offset,
            }],
            Mode::Single { ordinal: target, offset } => {
                if ordinal == target {
                    vec![Target { index: 0, offset }]
                } else {
                    Vec::new()
                }
            }
            Mode::RandomFixed { offset } => self
                .draws
                .iter()
                .enumerate()
                .filter(|(_, d)| d.ordinal == ordinal)
                .map(|(index, _)| Target { index, offset })
                .collect(),
            Mode::Random => {
                let mut targets = Vec::new();
                for (index, draw) in self.draws.iter_mut().enumerate() {
                    if draw.ordinal != ordinal {
                        continue;
                    }

                    if draw.placement == Placement::Pending {
                        let len = self.replacements[index].len();
                        draw.placement = if seq_len >= len {
                            Placement::At(self.rng.gen_range(0..=seq_len - len))
                        } else {
                            Placement::Unplaceable
                        };
                    }

                    if let Placement::At(offset) = draw.placement {
                        targets.push(Target { index, offset });
                    }
                }
                targets
            }
        }
    }

    /// Records that a selected replacement was actually applied.
    pub fn mark_applied(&mut self) {
        self.applied += 1;
    }
}
