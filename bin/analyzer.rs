// The command-line entry point: `analyzer <file-or-directory>`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mc_analyzer::{analyze_file, collect_mc_files};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// A single `.mc` file, or a directory to walk recursively.
    path: PathBuf,
}

pub fn main() -> ExitCode {
    let args = Args::parse();

    let files = match collect_mc_files(&args.path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error reading {}: {e}", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    if files.is_empty() {
        println!("No .mc files found.");
        return ExitCode::SUCCESS;
    }

    let mut total = 0;
    let mut failed = 0;

    for file in &files {
        total += 1;
        println!("\n=== Analyzing {} ===", file.display());

        let result = match analyze_file(file) {
            Ok(result) => result,
            Err(e) => {
                println!("Internal error: {e}");
                failed += 1;
                continue;
            }
        };

        if result.has_errors() {
            failed += 1;
            println!("Errors found:");
            result.report();
        } else {
            println!("No errors found.");
        }
    }

    println!("\n==============================");
    println!("Analyzed {total} file(s)");
    println!("Passed: {}", total - failed);
    println!("Failed: {failed}");

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
