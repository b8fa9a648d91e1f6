pub mod changelog;
pub mod select;

use crate::error::{Result, SeqError};
use crate::io::{ensure_distinct, OutputFile};
use crate::reader::RecordSource;
use crate::record::SequenceFormat;
use crate::writer::RecordSink;
use itertools::Itertools;
use serde::Serialize;
use std::path::PathBuf;

use self::changelog::{splice, write_entry, ReplacementRecord};
use self::select::{Mode, Selector};

/// Everything a replacement run needs. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct ReplaceConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
    pub mode: Mode,
    pub replacements: Vec<Vec<u8>>,
    pub seed: u64,
}

/// Where a run currently is. Random modes go through `Counting` before `Streaming`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Counting,
    Streaming,
    Done,
    Failed,
}

/// Counters reported at the end of a run, or as far as a failed run got.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceStats {
    pub mode: Mode,
    pub seed: u64,
    pub total_records: usize,
    pub replacements: usize,
    pub headers_seen: usize,
    pub headers_dropped: usize,
    pub selected_ordinals: Vec<usize>,
}

/// Streams a FASTQ/FASTA file to a new file, substituting replacement strings into the records
/// picked by a `Selector` and logging every substitution.
pub struct ReplacementEngine {
    config: ReplaceConfig,
    format: SequenceFormat,
    selector: Selector,
    phase: Phase,
    stats: ReplaceStats,
}

const PROGRESS_INTERVAL: usize = 50_000;

impl ReplacementEngine {
    /// Validates the configuration. No files are touched until `run`.
    ///
    /// # Errors
    ///
    /// Returns `SeqError::Config` if the input suffix is not a known format, the input, output
    /// and log paths are not all different, or the replacement settings are invalid.
    pub fn new(config: ReplaceConfig) -> Result<Self> {
        let format = SequenceFormat::from_path(&config.input)?;
        ensure_distinct(&config.input, &config.output)?;
        ensure_distinct(&config.input, &config.log)?;
        ensure_distinct(&config.output, &config.log)?;

        let selector = Selector::new(config.mode, config.replacements.clone(), config.seed)?;

        let stats = ReplaceStats {
            mode: config.mode,
            seed: config.seed,
            total_records: 0,
            replacements: 0,
            headers_seen: 0,
            headers_dropped: 0,
            selected_ordinals: Vec::new(),
        };

        Ok(Self {
            config,
            format,
            selector,
            phase: Phase::Init,
            stats,
        })
    }

    pub fn stats(&self) -> &ReplaceStats {
        &self.stats
    }

    /// Runs the counting pass (random modes only) and then the replacing pass.
    ///
    /// On failure the output and log files keep whatever was written before the error, and
    /// `stats` holds the counters reached so far.
    pub fn run(&mut self) -> Result<&ReplaceStats> {
        if self.phase != Phase::Init {
            return Err(SeqError::Config("a replacement run can only be started once".into()));
        }

        info!(
            "Replacing in {} ({}): mode {}, sequences [{}]",
            self.config.input.display(),
            self.format,
            self.config.mode,
            self.selector
                .replacements()
                .iter()
                .map(|r| String::from_utf8_lossy(r))
                .join(", ")
        );
        if self.config.mode.needs_count() {
            info!("Random seed: {}", self.config.seed);
        }

        match self.run_passes() {
            Ok(()) => {
                self.phase = Phase::Done;
                Ok(&self.stats)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn run_passes(&mut self) -> Result<()> {
        if self.config.mode.needs_count() {
            self.phase = Phase::Counting;
            let total = self.count_records()?;

            if !self.selector.draw_ordinals(total) {
                return Err(SeqError::NoRecords {
                    path: self.config.input.clone(),
                });
            }

            self.stats.selected_ordinals = self.selector.drawn_ordinals();
            info!(
                "Random mode: selected {} out of {total} records",
                self.stats
                    .selected_ordinals
                    .iter()
                    .map(|o| format!("#{o}"))
                    .join(", ")
            );
        }

        self.phase = Phase::Streaming;
        self.replace_records()
    }

    /// First pass: counts records. The source is closed before the replacing pass opens a
    /// fresh one.
    fn count_records(&mut self) -> Result<usize> {
        let mut source = RecordSource::open(&self.config.input, self.format)?;

        let mut total = 0;
        for record in source.by_ref() {
            record?;
            total += 1;
        }

        if RecordSource::format(&source) == SequenceFormat::Fasta {
            debug!(
                "Counted {total} sequences ({} headers, {} with empty sequences)",
                source.headers_seen(),
                source.headers_dropped()
            );
        } else {
            debug!("Counted {total} reads");
        }
        Ok(total)
    }

    fn replace_records(&mut self) -> Result<()> {
        let mut source = RecordSource::open(&self.config.input, self.format)?;
        let mut sink = RecordSink::create(&self.config.output)?;
        let mut log = OutputFile::create(&self.config.log)?;

        self.stats.total_records = 0;
        self.stats.replacements = 0;

        for record in source.by_ref() {
            let mut record = record?;
            self.stats.total_records += 1;
            let ordinal = self.stats.total_records;

            for target in self.selector.select(ordinal, record.len()) {
                let replacement = self.selector.replacement(target.index);

                let Some(original) = splice(&mut record.seq, target.offset, replacement) else {
                    debug!(
                        "Skipping {}: position {} + {} exceeds length {}",
                        record.id_str(),
                        target.offset,
                        replacement.len(),
                        record.len()
                    );
                    continue;
                };

                write_entry(
                    &mut log,
                    &ReplacementRecord {
                        sequence_id: &record.id,
                        offset: target.offset,
                        original: &original,
                        replacement,
                    },
                )
                .map_err(|source| SeqError::Write {
                    path: self.config.log.clone(),
                    source,
                })?;

                debug!(
                    "Replaced in {} at position {}: {} -> {} (sequence #{})",
                    record.id_str(),
                    target.offset,
                    String::from_utf8_lossy(&original),
                    String::from_utf8_lossy(replacement),
                    target.index + 1
                );

                self.selector.mark_applied();
                self.stats.replacements += 1;
            }

            sink.write(&record)?;

            if ordinal % PROGRESS_INTERVAL == 0 {
                debug!("Processed: {ordinal}");
            }
        }

        self.stats.headers_seen = source.headers_seen();
        self.stats.headers_dropped = source.headers_dropped();

        sink.finish()?;
        log.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const THREE_READS: &str = "@r1\nACGTACGT\n+\nIIIIIIII\n\
                               @r2\nACGTACGT\n+\nIIIIIIII\n\
                               @r3\nACGTACGT\n+\nIIIIIIII\n";

    struct Run {
        dir: TempDir,
        config: ReplaceConfig,
    }

    impl Run {
        fn new(name: &str, contents: &str, mode: Mode, replacements: &[&str], seed: u64) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join(name);
            std::fs::write(&input, contents).unwrap();
            let ext = Path::new(name).extension().unwrap().to_str().unwrap();

            let config = ReplaceConfig {
                input,
                output: dir.path().join(format!("out.{ext}")),
                log: dir.path().join("replacements.log"),
                mode,
                replacements: replacements.iter().map(|r| r.as_bytes().to_vec()).collect(),
                seed,
            };
            Self { dir, config }
        }

        fn run(&self) -> (ReplaceStats, String, String) {
            let mut engine = ReplacementEngine::new(self.config.clone()).unwrap();
            let stats = engine.run().unwrap().clone();
            assert_eq!(engine.phase, Phase::Done);
            (
                stats,
                std::fs::read_to_string(&self.config.output).unwrap(),
                std::fs::read_to_string(&self.config.log).unwrap(),
            )
        }

        fn output_path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    fn sequences(fastq: &str) -> Vec<&str> {
        fastq.lines().skip(1).step_by(4).collect()
    }

    #[test]
    fn position_mode_example() {
        let run = Run::new(
            "in.fq",
            "@r1\nACGTACGT\n+\nIIIIIIII\n",
            Mode::Position { offset: 2 },
            &["GG"],
            0,
        );
        let (stats, output, log) = run.run();

        assert_eq!(output, "@r1\nACGGACGT\n+\nIIIIIIII\n");
        assert_eq!(log, "Sequence ID: r1\nPosition: 2\nOriginal: GT\nReplaced: GG\n---\n");
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.replacements, 1);
    }

    #[test]
    fn position_mode_round_robin() {
        let input = "@a\nTTTTTTTT\n+\nIIIIIIII\n\
                     @b\nTTTTTTTT\n+\nIIIIIIII\n\
                     @c\nTTTTTTTT\n+\nIIIIIIII\n";
        let run = Run::new("in.fastq", input, Mode::Position { offset: 2 }, &["AAAA", "CCCC"], 0);
        let (stats, output, _) = run.run();

        assert_eq!(sequences(&output), vec!["TTAAAATT", "TTCCCCTT", "TTAAAATT"]);
        assert_eq!(stats.replacements, 3);
    }

    #[test]
    fn position_mode_short_reads_do_not_advance_rotation() {
        let input = "@a\nTTTTTTTT\n+\nIIIIIIII\n\
                     @short\nTTT\n+\nIII\n\
                     @b\nTTTTTTTT\n+\nIIIIIIII\n";
        let run = Run::new("in.fq", input, Mode::Position { offset: 2 }, &["AAAA", "CCCC"], 0);
        let (stats, output, log) = run.run();

        assert_eq!(sequences(&output), vec!["TTAAAATT", "TTT", "TTCCCCTT"]);
        assert_eq!(stats.replacements, 2);
        assert!(!log.contains("short"));
    }

    #[test]
    fn single_mode_touches_one_record() {
        let mode = Mode::Single { ordinal: 2, offset: 0 };
        let run = Run::new("in.fq", THREE_READS, mode, &["TTTT"], 0);
        let (stats, output, log) = run.run();

        let input_lines: Vec<&str> = THREE_READS.lines().collect();
        let output_lines: Vec<&str> = output.lines().collect();
        assert_eq!(output_lines[..4], input_lines[..4]);
        assert_eq!(output_lines[5], "TTTTACGT");
        assert_eq!(output_lines[8..], input_lines[8..]);

        assert_eq!(log.matches("---").count(), 1);
        assert!(log.starts_with("Sequence ID: r2\nPosition: 0\nOriginal: ACGT\nReplaced: TTTT\n"));
        assert_eq!(stats.replacements, 1);
    }

    #[test]
    fn overflowing_replacement_is_skipped() {
        let mode = Mode::Single { ordinal: 1, offset: 6 };
        let run = Run::new("in.fq", THREE_READS, mode, &["GGG"], 0);
        let (stats, output, log) = run.run();

        assert_eq!(output, THREE_READS);
        assert_eq!(log, "");
        assert_eq!(stats.replacements, 0);
    }

    #[test]
    fn random_runs_are_reproducible() {
        let run = Run::new("in.fq", THREE_READS, Mode::Random, &["GG", "CCC"], 77);
        let first = run.run();
        let second = run.run();

        assert_eq!(first.0.selected_ordinals, second.0.selected_ordinals);
        assert_eq!(first.1, second.1);
        assert_eq!(first.2, second.2);
        assert_eq!(first.0.replacements, 2);
        assert!(first.0.selected_ordinals.iter().all(|o| (1..=3).contains(o)));
    }

    #[test]
    fn random_fixed_uses_configured_offset() {
        let run = Run::new("in.fq", THREE_READS, Mode::RandomFixed { offset: 4 }, &["TT"], 5);
        let (stats, output, log) = run.run();

        assert_eq!(stats.selected_ordinals.len(), 1);
        assert_eq!(stats.replacements, 1);
        assert!(log.contains("Position: 4\nOriginal: AC\nReplaced: TT\n"));
        assert_eq!(sequences(&output).iter().filter(|s| **s == "ACGTTTGT").count(), 1);
    }

    #[test]
    fn random_fixed_same_record_gets_every_replacement() {
        let run = Run::new(
            "in.fq",
            "@only\nAAAAAAAA\n+\nIIIIIIII\n",
            Mode::RandomFixed { offset: 1 },
            &["CC", "G"],
            3,
        );
        let (stats, output, log) = run.run();

        // both land at offset 1, the second on top of the first
        assert_eq!(sequences(&output), vec!["AGCAAAAA"]);
        assert_eq!(stats.replacements, 2);
        assert!(log.contains("Original: AA\nReplaced: CC\n"));
        assert!(log.contains("Original: C\nReplaced: G\n"));
    }

    fn log_entries(log: &str) -> Vec<(usize, &str)> {
        log.split_terminator("---\n")
            .map(|entry| {
                let field = |name: &str| {
                    entry
                        .lines()
                        .find_map(|l| l.strip_prefix(name))
                        .unwrap()
                };
                (field("Position: ").parse().unwrap(), field("Replaced: "))
            })
            .collect()
    }

    #[test]
    fn random_same_record_gets_every_replacement_in_order() {
        let run = Run::new(
            "in.fq",
            "@only\nAAAAAAAA\n+\nIIIIIIII\n",
            Mode::Random,
            &["CC", "GGG"],
            11,
        );
        let (stats, _, log) = run.run();

        assert_eq!(stats.selected_ordinals, vec![1, 1]);
        assert_eq!(stats.replacements, 2);

        let entries = log_entries(&log);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, "CC");
        assert!(entries[0].0 <= 6);
        assert_eq!(entries[1].1, "GGG");
        assert!(entries[1].0 <= 5);
    }

    #[test]
    fn random_modes_on_fasta() {
        let input = ">a\nACGT\nACGT\n>b\nTTTTTTTT\n";

        let run = Run::new("in.fa", input, Mode::Random, &["NN"], 9);
        let (stats, output, log) = run.run();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.replacements, 1);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!((lines[0], lines[2]), (">a", ">b"));
        match stats.selected_ordinals[..] {
            [1] => {
                assert!(lines[1].contains("NN"));
                assert_eq!(lines[3], "TTTTTTTT");
                assert!(log.starts_with("Sequence ID: a\n"));
            }
            [2] => {
                assert_eq!(lines[1], "ACGTACGT");
                assert!(lines[3].contains("NN"));
                assert!(log.starts_with("Sequence ID: b\n"));
            }
            ref other => panic!("unexpected ordinals {other:?}"),
        }

        let run = Run::new("in.fasta", input, Mode::RandomFixed { offset: 2 }, &["GG"], 9);
        let (stats, output, log) = run.run();
        assert_eq!(stats.replacements, 1);
        assert_eq!(log_entries(&log), vec![(2, "GG")]);
        let changed = output
            .lines()
            .filter(|l| *l == "ACGGACGT" || *l == "TTGGTTTT")
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn corrupt_gzip_input_is_a_read_error() {
        let run = Run::new(
            "in.fq.gz",
            "@r1\nACGT\n+\nIIII\n",
            Mode::Position { offset: 0 },
            &["T"],
            0,
        );
        let mut engine = ReplacementEngine::new(run.config.clone()).unwrap();

        let err = engine.run().map(|_| ()).unwrap_err();
        assert!(matches!(err, SeqError::Read { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(engine.phase, Phase::Failed);
    }

    #[test]
    fn random_mode_needs_records() {
        let run = Run::new("empty.fq", "", Mode::Random, &["A"], 1);
        let mut engine = ReplacementEngine::new(run.config.clone()).unwrap();

        assert!(matches!(engine.run(), Err(SeqError::NoRecords { .. })));
        assert_eq!(engine.phase, Phase::Failed);
    }

    #[test]
    fn fasta_records_are_joined_and_rewritten() {
        let input = ">chr1 test\nACGT\nACGT\n>empty\n>chr2\nTTTT\n";
        let run = Run::new("in.fasta", input, Mode::Position { offset: 3 }, &["NN"], 0);
        let (stats, output, log) = run.run();

        assert_eq!(output, ">chr1 test\nACGNNCGT\n>chr2\nTTTT\n");
        assert_eq!(log, "Sequence ID: chr1 test\nPosition: 3\nOriginal: TA\nReplaced: NN\n---\n");
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.headers_seen, 3);
        assert_eq!(stats.headers_dropped, 1);
    }

    #[test]
    fn truncated_input_fails_mid_stream() {
        let run = Run::new(
            "in.fq",
            "@r1\nACGT\n+\nIIII\n@r2\nACGT\n",
            Mode::Position { offset: 0 },
            &["T"],
            0,
        );
        let mut engine = ReplacementEngine::new(run.config.clone()).unwrap();

        assert!(matches!(engine.run(), Err(SeqError::Format { .. })));
        assert_eq!(engine.phase, Phase::Failed);
        assert_eq!(engine.stats().total_records, 1);
        assert_eq!(engine.stats().replacements, 1);
        // the partial output stays on disk
        assert!(run.config.output.exists());
    }

    #[test]
    fn configuration_errors() {
        let run = Run::new("in.txt", THREE_READS, Mode::Random, &["A"], 0);
        assert!(matches!(
            ReplacementEngine::new(run.config.clone()),
            Err(SeqError::Config(_))
        ));

        let run = Run::new("in.fq", THREE_READS, Mode::Random, &["A"], 0);
        let mut config = run.config.clone();
        config.output = config.input.clone();
        assert!(matches!(ReplacementEngine::new(config), Err(SeqError::Config(_))));

        let mut config = run.config.clone();
        config.log = run.output_path("out.fq");
        assert!(matches!(ReplacementEngine::new(config), Err(SeqError::Config(_))));
    }
}
