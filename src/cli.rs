//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "smurf",
    version,
    about = "Unified CI check reporting",
    long_about = "smurf — aggregate heterogeneous per-check results into one report.\n\nPer-tool outputs are normalized into a canonical problem model, optionally\nfiltered down to the lines a patch actually touched, summarized and rendered\nas XML, HTML or plain text.\n\nConfiguration precedence: CLI > smurf.toml > defaults.",
    after_help = "Examples:\n  smurf report --directory /tmp/results --format xml\n  smurf report --directory /tmp/results --patchset patchset.xml --format html\n  smurf changes --diff fix.diff --output xml > patchset.xml\n  smurf convert --format phplint < lint.txt > lint.xml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for reporting, diff extraction, and conversion.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current smurf version.")]
    Version,
    /// Build the unified report from per-check results
    #[command(
        about = "Build the unified report",
        long_about = "Aggregate the per-check result files from a directory into one report.\nChecks whose result file is missing, empty or malformed are skipped.\nExit code is 1 when the report contains errors.",
        after_help = "Examples:\n  smurf report --directory /tmp/results\n  smurf report --directory /tmp/results --patchset patchset.xml\n  smurf report --directory /tmp/results --repository https://github.com/acme/widget --branch main"
    )]
    Report {
        #[arg(long, help = "Directory where the per-check result files are stored")]
        directory: String,
        #[arg(long, help = "Patchset file name (inside the directory) used to filter problems")]
        patchset: Option<String>,
        #[arg(long, help = "Output format: xml|html|txt (default: xml)")]
        format: Option<String>,
        #[arg(long, help = "Repository URL used to derive problem deep links")]
        repository: Option<String>,
        #[arg(long, help = "Branch name substituted into deep links (default: main)")]
        branch: Option<String>,
        #[arg(long, help = "Code root trimmed from problem file paths")]
        codedir: Option<String>,
        #[arg(long, help = "Path to a checks manifest TOML (default: built-in checks)")]
        manifest: Option<String>,
    },
    /// Extract changed lines from a unified diff
    #[command(
        about = "Extract changed lines from a diff",
        long_about = "Scan a unified diff and emit the added-line intervals per file, in a\nformat suitable as patchset input for the report command.",
        after_help = "Examples:\n  smurf changes --diff fix.diff\n  smurf changes --diff fix.diff --output xml > patchset.xml"
    )]
    Changes {
        #[arg(long, help = "Unified diff file to process")]
        diff: String,
        #[arg(long, help = "Output format: txt|xml (default: txt)")]
        output: Option<String>,
    },
    /// Convert raw tool output to checkstyle XML
    #[command(
        about = "Convert tool output to checkstyle XML",
        long_about = "Read one tool's raw output on stdin and write the checkstyle XML form\non stdout. Lines that do not match the selected convention are skipped.",
        after_help = "Examples:\n  smurf convert --format phplint < lint.txt > lint.xml\n  smurf convert --format commits < commits.txt > commits.xml"
    )]
    Convert {
        #[arg(long, help = "Input convention: phplint|gruntdiff|thirdparty|commits|eslint")]
        format: String,
    },
}
