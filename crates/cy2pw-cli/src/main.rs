//! `cy2pw` command line
//!
//! `convert` rewrites Cypress specs into Playwright Test code; `scan` lists
//! the patterns the converter would act on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rayon::prelude::*;
use serde::Serialize;

use cy2pw_core::{ComplexPatternConverter, ConvertConfig, FileConversionResult};
use cy2pw_pattern::{extract_all, Family, Pattern};

/// Patterns found in one file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport {
    file_path: String,
    patterns: Vec<Pattern>,
}

fn cli() -> Command {
    let files = Arg::new("files")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .help("Cypress spec files");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("cy2pw")
        .version(clap::crate_version!())
        .about("Convert Cypress specs to Playwright Test")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (RUST_LOG overrides)"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert files and write or print the result")
                .arg(files.clone())
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for converted files"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("scan")
                .about("List the patterns found in each file")
                .arg(files)
                .arg(json),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn files(args: &ArgMatches) -> Vec<PathBuf> {
    args.get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// `login.cy.ts` becomes `login.spec.ts`; other names are kept
fn output_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted.spec.ts".to_string());
    match name.rfind(".cy.") {
        Some(idx) => format!("{}.spec.{}", &name[..idx], &name[idx + 4..]),
        None => name,
    }
}

fn summary_line(result: &FileConversionResult) -> String {
    let status = match (&result.error, result.is_valid) {
        (Some(_), _) => "failed",
        (None, true) => "valid",
        (None, false) => "invalid",
    };
    format!(
        "{}: {}/{} patterns converted, {} need review, {status}",
        result.file_path,
        result.summary.succeeded,
        result.summary.total_patterns,
        result.summary.manual_review
    )
}

fn convert(args: &ArgMatches) -> Result<bool> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => ConvertConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConvertConfig::default(),
    };
    let converter = ComplexPatternConverter::new(config);
    let paths = files(args);

    let results: Vec<FileConversionResult> = paths
        .par_iter()
        .map(|path| {
            converter
                .convert_file(path)
                .with_context(|| format!("converting {}", path.display()))
        })
        .collect::<Result<_>>()?;
    let all_ok = results.iter().all(|r| r.conversion_succeeded);

    if let Some(dir) = args.get_one::<PathBuf>("out-dir") {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (path, result) in paths.iter().zip(&results) {
            let target = dir.join(output_name(path));
            std::fs::write(&target, &result.converted_code)
                .with_context(|| format!("writing {}", target.display()))?;
            tracing::info!("Wrote {}", target.display());
        }
    }

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if args.contains_id("out-dir") {
        for result in &results {
            println!("{}", summary_line(result));
            for note in &result.notes {
                println!("  - {note}");
            }
        }
    } else {
        let many = results.len() > 1;
        for result in &results {
            if many {
                println!("// ==> {}", result.file_path);
            }
            println!("{}", result.converted_code.trim_end());
            eprintln!("{}", summary_line(result));
        }
    }
    Ok(all_ok)
}

fn scan(args: &ArgMatches) -> Result<()> {
    let reports: Vec<ScanReport> = files(args)
        .par_iter()
        .map(|path| {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(ScanReport {
                file_path: path.display().to_string(),
                patterns: extract_all(&source),
            })
        })
        .collect::<Result<_>>()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        println!("{}: {} patterns", report.file_path, report.patterns.len());
        for pattern in &report.patterns {
            println!(
                "  {}:{} {} {} ({})",
                report.file_path,
                pattern.line(),
                Family::of(pattern.kind()).as_str(),
                pattern.kind().as_str(),
                pattern.complexity()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("convert", args)) => {
            if !convert(args)? {
                std::process::exit(1);
            }
        }
        Some(("scan", args)) => scan(args)?,
        _ => unreachable!("a subcommand is required"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn output_names() {
        assert_eq!(output_name(Path::new("specs/login.cy.ts")), "login.spec.ts");
        assert_eq!(output_name(Path::new("home.cy.js")), "home.spec.js");
        assert_eq!(output_name(Path::new("other.ts")), "other.ts");
    }

    #[test]
    fn parses_convert_arguments() {
        let matches = cli()
            .try_get_matches_from(["cy2pw", "convert", "a.cy.ts", "b.cy.ts", "--json", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "convert");
        assert_eq!(files(args), vec![PathBuf::from("a.cy.ts"), PathBuf::from("b.cy.ts")]);
        assert!(args.get_flag("json"));
    }
}
