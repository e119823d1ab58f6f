use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "reqseg",
    version,
    about = "Requirement-document segmentation and read-back tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment a document export into persisted, uniquely identified segments
    Segment(SegmentArgs),
    /// Reconstruct the filtered leaf-segment title/content arrays for a batch
    Requirements(RequirementsArgs),
    /// Report the latest run manifest and database counts
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    /// Document export JSON produced by the document loader
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = ".cache/reqseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=31))]
    pub datacenter_id: u8,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=31))]
    pub worker_id: u8,

    #[arg(long, value_enum, default_value_t = MissingLevelPolicy::Compress)]
    pub missing_level_policy: MissingLevelPolicy,
}

/// How to number a heading whose intermediate outline levels were never seen
/// (for example a level-3 heading directly under a level-1 heading).
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MissingLevelPolicy {
    /// Outline numbers contain only the levels actually counted so far
    Compress,
    /// Absent levels contribute a literal "0" component
    ZeroFill,
}

impl MissingLevelPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::ZeroFill => "zero-fill",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RequirementsArgs {
    #[arg(long, default_value = ".cache/reqseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub batch_id: String,

    /// Keep segments in the conventional front-matter chapters (1, 2, 3)
    #[arg(long, default_value_t = false)]
    pub keep_front_matter: bool,

    /// Keep container segments that other segments name as their parent
    #[arg(long, default_value_t = false)]
    pub include_parents: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/reqseg")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
