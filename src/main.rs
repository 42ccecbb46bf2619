//! smurf CLI binary entry point.
//! Delegates to modules for report/changes/convert and prints results.

mod aggregate;
mod cli;
mod config;
mod diffchanges;
mod models;
mod normalize;
mod patchset;
mod render;

use clap::Parser;
use cli::{Cli, Commands};
use normalize::ConvertFormat;
use patchset::PatchsetIndex;
use render::RenderFormat;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Report {
            directory,
            patchset,
            format,
            repository,
            branch,
            codedir,
            manifest,
        } => {
            let eff = config::resolve_effective(
                Path::new("."),
                format.as_deref(),
                repository.as_deref(),
                branch.as_deref(),
                codedir.as_deref(),
                manifest.as_deref(),
            );
            // Configuration is validated before any processing begins.
            let Some(render_format) = RenderFormat::parse(&eff.format) else {
                eprintln!(
                    "error: unsupported output format '{}' (expected one of: {})",
                    eff.format,
                    RenderFormat::NAMES.join(", ")
                );
                std::process::exit(2);
            };
            let dir = PathBuf::from(&directory);
            if !dir.is_dir() {
                eprintln!("error: incorrect directory: {}", directory);
                std::process::exit(2);
            }
            let specs = match &eff.manifest {
                Some(path) => match models::manifest::load_manifest(Path::new(path)) {
                    Ok(specs) => specs,
                    Err(e) => {
                        eprintln!("error: {}", e);
                        std::process::exit(2);
                    }
                },
                None => models::manifest::default_checks(),
            };
            // Filtering was explicitly requested; a bad patchset cannot
            // silently degrade.
            let index = match &patchset {
                Some(name) => {
                    let path = dir.join(name);
                    let text = match fs::read_to_string(&path) {
                        Ok(text) => text,
                        Err(e) => {
                            eprintln!(
                                "error: cannot access the patchset file {}: {}",
                                path.display(),
                                e
                            );
                            std::process::exit(1);
                        }
                    };
                    match PatchsetIndex::parse(&text) {
                        Ok(index) => Some(index),
                        Err(e) => {
                            eprintln!("error: {}: {}", path.display(), e);
                            std::process::exit(1);
                        }
                    }
                }
                None => None,
            };
            let urls = eff
                .repository
                .as_deref()
                .map(|repo| config::url_templates(repo, &eff.branch))
                .unwrap_or_default();
            let (report, notes) = aggregate::run_report(
                &dir,
                &specs,
                eff.codedir.as_deref(),
                index.as_ref(),
                &urls,
            );
            for note in &notes {
                eprintln!("note: {}", note);
            }
            print!("{}", render::render(&report, render_format));
            if report.summary.num_errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Changes { diff, output } => {
            let output = output.unwrap_or_else(|| "txt".to_string());
            if output != "txt" && output != "xml" {
                eprintln!("error: unsupported output format '{}' (expected txt or xml)", output);
                std::process::exit(2);
            }
            let file = match fs::File::open(&diff) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("error: diff file not available or unreadable ({}): {}", diff, e);
                    std::process::exit(1);
                }
            };
            let changes = match diffchanges::extract_changes(BufReader::new(file)) {
                Ok(changes) => changes,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            if output == "xml" {
                print!("{}", diffchanges::render_xml(&changes));
            } else {
                print!("{}", diffchanges::render_txt(&changes));
            }
        }
        Commands::Convert { format } => {
            let Some(convert_format) = ConvertFormat::parse(&format) else {
                eprintln!(
                    "error: invalid format '{}' (expected one of: {})",
                    format,
                    ConvertFormat::NAMES.join(", ")
                );
                std::process::exit(2);
            };
            let stdin = io::stdin();
            match normalize::convert(convert_format, stdin.lock()) {
                Ok(xml) => print!("{}", xml),
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
