//! EFU compiler entry point.

use std::fs;
use std::process::ExitCode;

use clap::Parser as _;

use efuc::cli::{resolve_out_path, Cli, VALID_RUNTIMES};
use efuc::style::Style;
use efuc::{compile, Target};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", Style::bold_red(&format!("error: cannot read '{}': {}", cli.input.display(), e)));
            return ExitCode::FAILURE;
        }
    };

    let target = match Target::from_name(&cli.target) {
        Some(t) => t,
        None => {
            eprintln!("{}", Style::bold_red(&format!("error: unknown target '{}' (expected 'go' or 'js')", cli.target)));
            return ExitCode::FAILURE;
        }
    };

    if let Some(runtime) = &cli.runtime {
        if !VALID_RUNTIMES.contains(&runtime.as_str()) {
            eprintln!(
                "{}",
                Style::bold_red(&format!("error: unknown runtime '{}' (expected node, bun, or deno)", runtime))
            );
            return ExitCode::FAILURE;
        }
    }

    match compile(&source, target, cli.debug_ir) {
        Ok(out) => {
            if let Some(ir) = out.debug_ir {
                println!("{}", ir);
                return ExitCode::SUCCESS;
            }

            let out_path = resolve_out_path(&cli, target.extension());
            if let Err(e) = fs::write(&out_path, &out.code) {
                eprintln!(
                    "{}",
                    Style::bold_red(&format!("error: failed to write '{}': {}", out_path.display(), e))
                );
                return ExitCode::FAILURE;
            }

            if cli.run {
                println!("note: -run is treated as an external collaborator step; not spawned by this build");
            }
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e.display_with_source(&source));
            }
            ExitCode::FAILURE
        }
    }
}
