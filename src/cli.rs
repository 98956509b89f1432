use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "hashwish")]
#[command(about = "Nudge commit timestamps until the commit id starts with a wished prefix")]
pub struct CliArgs {
    /// Wished hash prefixes (e.g. cafe bad); any one of them is enough
    pub prefixes: Vec<String>,

    /// Repository to read the commit from
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Revision of the commit to rework
    #[arg(long, default_value = "HEAD")]
    pub rev: String,

    /// Read the raw commit object from a file instead ("-" for stdin)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// How many seconds timestamps may be advanced (overrides config)
    #[arg(long)]
    pub max_offset: Option<u64>,

    /// Hash candidates on all cores (overrides config)
    #[arg(long)]
    pub parallel: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
