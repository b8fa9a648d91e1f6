use crate::id::IdTemplate;
use crate::replace::select::Mode;
use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 seqsplice version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   splice test sequences into FASTQ/FASTA reads, and merge FASTQ files";

const REPLACE_EXAMPLES: &str = indoc::indoc! {"
    Examples:
      seqsplice replace -i reads.fq -o out.fq -s GGGG -p 10
      seqsplice replace -i reads.fastq.gz -o out.fastq.gz -s ACGT TTTT -r --seed 42
      seqsplice replace -i genome.fa -o out.fa -s NNNN -1 3 100 -l changes.log
"};

const MERGE_EXAMPLES: &str = indoc::indoc! {"
    Examples:
      seqsplice merge -i a.fq b.fq -o merged.fq
      seqsplice merge -i lane1.fq.gz lane2.fq.gz -o merged.fq.gz -p M00123 -f 000000000-A1B2C -l 2
"};

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    /// log every replacement and progress messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge FASTQ files into one, replacing every read ID with a synthetic Illumina-style ID
    #[command(arg_required_else_help = true, after_help = MERGE_EXAMPLES)]
    Merge(MergeArgs),

    /// Write replacement sequences into reads of a FASTQ or FASTA file, logging every change
    #[command(arg_required_else_help = true, after_help = REPLACE_EXAMPLES)]
    Replace(ReplaceArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// the input .fastq files, merged in the order given
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// the merged output file (gzip-compressed if it ends in .gz)
    #[arg(short, long)]
    pub output: PathBuf,

    /// instrument name, the first field of every id
    #[arg(short = 'p', long, alias = "prefix", default_value = "INSTRUMENT")]
    pub instrument: String,

    #[arg(short, long, default_value = "1")]
    pub run_id: String,

    #[arg(short, long, default_value = "FLOWCELL")]
    pub flowcell: String,

    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub lane: u32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub read_num: u32,

    /// mark reads as filtered (Y) instead of passing (N)
    #[arg(long)]
    pub filtered: bool,

    #[arg(long, default_value_t = 0)]
    pub control_bits: u32,

    /// index sequence
    #[arg(long, default_value = "ATCG")]
    pub index: String,

    /// write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl MergeArgs {
    pub fn id_template(&self) -> IdTemplate {
        IdTemplate {
            instrument: self.instrument.clone(),
            run_id: self.run_id.clone(),
            flowcell: self.flowcell.clone(),
            lane: self.lane,
            read_num: self.read_num,
            filtered: self.filtered,
            control_bits: self.control_bits,
            index: self.index.clone(),
            ..IdTemplate::default()
        }
    }
}

#[derive(Args)]
pub struct ReplaceArgs {
    /// the input file: .fq/.fastq or .fa/.fasta, optionally .gz
    #[arg(short, long)]
    pub input: PathBuf,

    /// the output file, in the same format as the input
    #[arg(short, long)]
    pub output: PathBuf,

    /// replacement sequences
    #[arg(short = 's', long = "sequence", required = true, num_args = 1..)]
    pub sequences: Vec<String>,

    #[command(flatten)]
    pub mode: ModeArgs,

    /// the replacement log
    #[arg(short, long, default_value = "replacements.log")]
    pub log: PathBuf,

    /// seed for the random modes. defaults to the current time
    #[arg(long)]
    pub seed: Option<u64>,

    /// write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Exactly one way of choosing which reads to change.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ModeArgs {
    /// one random read per sequence, at a random position
    #[arg(short = 'r', long)]
    pub random: bool,

    /// one random read per sequence, at position POS (0-based)
    #[arg(short = 'R', long, value_name = "POS")]
    pub random_pos: Option<usize>,

    /// every read, at position POS (0-based), cycling through the sequences
    #[arg(short = 'p', long, value_name = "POS")]
    pub position: Option<usize>,

    /// only read number READ (1-based), at position POS (0-based), with the first sequence
    #[arg(
        short = '1',
        long,
        num_args = 2,
        value_names = ["READ", "POS"],
        value_parser = clap::value_parser!(usize)
    )]
    pub single: Option<Vec<usize>>,
}

impl ModeArgs {
    pub fn mode(&self) -> Mode {
        match (self.random_pos, self.position, self.single.as_deref()) {
            (Some(offset), _, _) => Mode::RandomFixed { offset },
            (_, Some(offset), _) => Mode::Position { offset },
            (_, _, Some(&[ordinal, offset])) => Mode::Single { ordinal, offset },
            _ => Mode::Random,
        }
    }
}
