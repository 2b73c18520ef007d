//! Command-line interface (spec.md §6 "CLI").
//!
//! Grounded on the teacher's `clap::Parser` derive struct in
//! `src/cli.rs`, collapsed from a subcommand enum to a single
//! positional-plus-flags shape since the EFU compiler has one job,
//! not a build-tool's command set.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "efuc")]
#[command(about = "EFU language compiler", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source file to compile
    pub input: PathBuf,

    /// Backend to emit: `go` (static target) or `js` (dynamic target)
    #[arg(long = "target", short = 't', default_value = "go")]
    pub target: String,

    /// Output path; a trailing-slash directory derives the name from
    /// the input file's basename
    #[arg(long = "out", short = 'o')]
    pub out: Option<PathBuf>,

    /// Spawn the target toolchain on the emitted output (out of core
    /// scope; this build only prints a notice)
    #[arg(long = "run", short = 'r')]
    pub run: bool,

    /// Host to spawn under `-run` for the dynamic target
    #[arg(long = "runtime")]
    pub runtime: Option<String>,

    /// Print the parsed AST's debug-IR form and skip emission
    #[arg(long = "debug-ir")]
    pub debug_ir: bool,
}

pub const VALID_RUNTIMES: &[&str] = &["node", "bun", "deno"];

/// Resolves the output path per spec.md §6's `-out` rule: an explicit
/// non-directory path is used as-is; a directory (an existing directory
/// or a path with a trailing `/`) gets `<input-basename>.<ext>` appended;
/// with no `-out` at all, the basename is written alongside the input.
pub fn resolve_out_path(cli: &Cli, ext: &str) -> PathBuf {
    let basename = cli.input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    match &cli.out {
        Some(p) => {
            let trailing_slash = p.to_string_lossy().ends_with('/');
            if trailing_slash || p.is_dir() {
                p.join(format!("{}.{}", basename, ext))
            } else {
                p.clone()
            }
        }
        None => PathBuf::from(format!("{}.{}", basename, ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_out_path_appends_basename_for_trailing_slash() {
        let cli = Cli {
            input: PathBuf::from("prog.efu"),
            target: "go".to_string(),
            out: Some(PathBuf::from("build/")),
            run: false,
            runtime: None,
            debug_ir: false,
        };
        assert_eq!(resolve_out_path(&cli, "go"), PathBuf::from("build/prog.go"));
    }

    #[test]
    fn resolve_out_path_uses_explicit_file_path_as_is() {
        let cli = Cli {
            input: PathBuf::from("prog.efu"),
            target: "go".to_string(),
            out: Some(PathBuf::from("out.go")),
            run: false,
            runtime: None,
            debug_ir: false,
        };
        assert_eq!(resolve_out_path(&cli, "go"), PathBuf::from("out.go"));
    }

    #[test]
    fn resolve_out_path_defaults_to_input_basename() {
        let cli = Cli {
            input: PathBuf::from("dir/prog.efu"),
            target: "go".to_string(),
            out: None,
            run: false,
            runtime: None,
            debug_ir: false,
        };
        assert_eq!(resolve_out_path(&cli, "js"), PathBuf::from("prog.js"));
    }
}
