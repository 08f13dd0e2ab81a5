//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "doctpl", version, about = "Render and check DOCX templates")]
pub struct Cli {
    /// Configuration file layered over the built-in defaults
    /// (default: ./doctpl.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG also applies
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill every tag from a context file
    Render(RenderArgs),
    /// Show field names in place of tags, with tag positions highlighted
    Draft(DraftArgs),
    /// Fill entered values and show highlighted defaults for the rest
    Preview(PreviewArgs),
    /// Compare template tags with schema fields and print a JSON report
    Check(CheckArgs),
    /// Print the tags a template uses, one per line
    Tags(TagsArgs),
    /// Merge split tag runs so that each tag is a single run
    Prepare(PrepareArgs),
    /// Rasterize the first page of the draft into a PNG
    Thumbnail(ThumbnailArgs),
}

impl Commands {
    /// Highlight color requested on the command line, if any.
    pub fn highlight(&self) -> Option<&str> {
        match self {
            Commands::Draft(args) => args.highlight.as_deref(),
            Commands::Preview(args) => args.highlight.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    pub template: PathBuf,
    /// YAML or JSON mapping of tag to value
    #[arg(short, long, value_name = "FILE")]
    pub context: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    /// Convert the result to PDF
    #[arg(long)]
    pub pdf: bool,
}

#[derive(Debug, Args)]
pub struct DraftArgs {
    pub template: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Output file (default: "<title>_шаблон.docx" next to the template)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub pdf: bool,
    /// Highlight color, overriding engine.highlight
    #[arg(long, value_name = "COLOR")]
    pub highlight: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub template: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Entered values; empty values count as not entered
    #[arg(short, long, value_name = "FILE")]
    pub context: Option<PathBuf>,
    /// Output file (default: "<title>_preview.docx" next to the template)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub pdf: bool,
    #[arg(long, value_name = "COLOR")]
    pub highlight: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub template: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Exit with an error when the template and schema disagree
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct TagsArgs {
    pub template: PathBuf,
}

#[derive(Debug, Args)]
pub struct PrepareArgs {
    pub template: PathBuf,
    /// Output file (default: rewrite the template in place)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ThumbnailArgs {
    pub template: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    /// Width in pixels, overriding thumbnail.width
    #[arg(long)]
    pub width: Option<u32>,
    /// Height in pixels, overriding thumbnail.height
    #[arg(long)]
    pub height: Option<u32>,
}
