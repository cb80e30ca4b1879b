use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "include-smasher",
    version,
    about = "Rank C/C++ files by the size of their transitive #include closure",
    long_about = "Scan a source tree for #include lines, expand every header into its transitive includes (duplicates kept, cycles cut per path) and report which translation units and headers pull in the most. Headers are matched by file name only; this is a heuristic, not a preprocessor."
)]
pub struct Cli {
    /// Only print totals (suppress per-file and per-header tables)
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score every translation unit under ROOT
    Scan {
        /// Root folder to explore
        root: PathBuf,
        /// Header root folder(s) to explore (repeatable)
        #[arg(short = 'I', long = "include-path", value_name = "DIR")]
        include_paths: Vec<PathBuf>,
        /// Path to a TOML configuration file (default: ROOT/include-smasher.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Translation unit whose descendants --save writes out (default: foo.cpp)
        #[arg(long)]
        filename: Option<String>,
        /// Save the descendants of --filename to --save-path
        #[arg(long, default_value_t = false)]
        save: bool,
        /// Where --save writes (default: /tmp/deps)
        #[arg(long)]
        save_path: Option<PathBuf>,
        /// Print every descendant header of each file
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
        /// Report header popularity across all files
        #[arg(long, default_value_t = false)]
        headers: bool,
        /// Keep lowercase-only (system-looking) headers in the popularity report
        #[arg(long, default_value_t = false)]
        system: bool,
        /// Skip translation units whose path matches this regex
        #[arg(long, value_name = "REGEX")]
        exclude: Option<String>,
        /// Honour .gitignore/.ignore files when discovering sources
        #[arg(long, default_value_t = false)]
        respect_ignore: bool,
        /// Reuse and update the include cache in ROOT
        #[arg(long, default_value_t = false)]
        cache: bool,
        /// Discard the include cache and rebuild it (implies --cache)
        #[arg(long, default_value_t = false)]
        rebuild: bool,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Column width of header names in the popularity report (default: 40)
        #[arg(long, value_name = "N")]
        header_width: Option<usize>,
    },
    /// List the transitive includes of one header
    Descendants {
        /// Root folder to explore
        root: PathBuf,
        /// Header to expand (file name; any directory part is ignored)
        #[arg(long)]
        header: String,
        /// Header root folder(s) to explore (repeatable)
        #[arg(short = 'I', long = "include-path", value_name = "DIR")]
        include_paths: Vec<PathBuf>,
        /// Path to a TOML configuration file (default: ROOT/include-smasher.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Honour .gitignore/.ignore files when discovering sources
        #[arg(long, default_value_t = false)]
        respect_ignore: bool,
        /// Reuse and update the include cache in ROOT
        #[arg(long, default_value_t = false)]
        cache: bool,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Skip the first N results
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Show at most N results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
