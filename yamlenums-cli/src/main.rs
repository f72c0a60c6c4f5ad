//! yamlenums CLI - generate YAML (un)marshalling methods for Go integer enums.
//!
//! Meant to be run from a `//go:generate yamlenums -type=T` directive. Flags
//! follow the Go convention (`-type=Pill`); `--type=Pill` works too.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use yamlenums_core::{
    init_structured_logging, log_error, parse_type_list, print_json, AliasPolicy, GenerationReport,
    Yamlenums, YamlenumsError,
};

/// Long flags that may be written with a single dash.
const GO_STYLE_FLAGS: &[&str] = &["type", "prefix", "suffix", "alias", "json", "help", "version"];

#[derive(Parser, Debug)]
#[command(
    name = "yamlenums",
    version,
    about = "Generate MarshalYAML/UnmarshalYAML methods for Go integer enums"
)]
pub struct Cli {
    /// Comma-separated list of type names; must be set
    #[arg(long = "type", value_name = "TYPES")]
    types: Option<String>,

    /// Prefix to be added to the output file
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix to be added to the output file [default: _yamlenums]
    #[arg(long)]
    suffix: Option<String>,

    /// Name kept for values with several constants: lexical or first [default: lexical]
    #[arg(long, value_parser = parse_alias)]
    alias: Option<AliasPolicy>,

    /// Print a JSON summary of the generated files on stdout
    #[arg(long)]
    json: bool,

    /// Directory holding the package [default: .]
    #[arg(value_name = "DIR")]
    dirs: Vec<String>,
}

fn parse_alias(s: &str) -> std::result::Result<AliasPolicy, String> {
    s.parse()
}

/// Rewrite Go-style `-flag` arguments to `--flag` so clap accepts them.
///
/// Arguments after a bare `--` are left alone.
fn normalize_go_flags(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut flags_done = false;
    for (i, arg) in args.iter().enumerate() {
        if i == 0 || flags_done {
            out.push(arg.clone());
            continue;
        }
        if arg == "--" {
            flags_done = true;
            out.push(arg.clone());
            continue;
        }
        let single_dash = arg.len() > 2 && arg.starts_with('-') && !arg.starts_with("--");
        let name = arg
            .trim_start_matches('-')
            .split('=')
            .next()
            .unwrap_or_default();
        if single_dash && GO_STYLE_FLAGS.contains(&name) {
            out.push(format!("-{}", arg));
        } else {
            out.push(arg.clone());
        }
    }
    out
}

/// Resolve the single package directory, relative to the working directory.
fn package_dir(dirs: &[String]) -> Result<PathBuf> {
    let dir = match dirs {
        [] => ".",
        [one] => one.as_str(),
        _ => return Err(YamlenumsError::usage("only one directory at a time").into()),
    };
    let path = Path::new(dir);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("unable to determine the working directory")?;
    Ok(cwd.join(path))
}

fn run(cli: &Cli, command: &str) -> Result<GenerationReport> {
    let types = parse_type_list(cli.types.as_deref().unwrap_or_default())?;
    let dir = package_dir(&cli.dirs)?;

    let mut builder = Yamlenums::new(&dir).types(types).command(command);
    if let Some(prefix) = &cli.prefix {
        builder = builder.prefix(prefix);
    }
    if let Some(suffix) = &cli.suffix {
        builder = builder.suffix(suffix);
    }
    if let Some(alias) = cli.alias {
        builder = builder.alias(alias);
    }

    let report = builder
        .generate()
        .with_context(|| format!("generating code for package in {}", dir.display()))?;

    if cli.json {
        print_json(&report);
    }
    Ok(report)
}

fn main() -> Result<()> {
    // Structured logging: JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(normalize_go_flags(&args));
    let command = args.get(1..).unwrap_or_default().join(" ");

    run(&cli, &command)
        .map(|_| ())
        .inspect_err(|e| log_error(&format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("yamlenums_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn cli(list: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_go_flags(&args(list))).unwrap()
    }

    fn painkiller(name: &str) -> PathBuf {
        let dir = create_temp_dir(name);
        fs::write(
            dir.join("pill.go"),
            "package painkiller\n\ntype Pill int\n\nconst (\n\tPlacebo Pill = iota\n\tAspirin\n)\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_go_style_flags_normalized() {
        let out = normalize_go_flags(&args(&[
            "yamlenums",
            "-type=Pill,Color",
            "-prefix",
            "x",
            "--suffix=_y",
            "-json",
            "-",
            "--",
            "-type",
        ]));
        assert_eq!(
            out,
            args(&[
                "yamlenums",
                "--type=Pill,Color",
                "--prefix",
                "x",
                "--suffix=_y",
                "--json",
                "-",
                "--",
                "-type",
            ])
        );
    }

    #[test]
    fn test_flags_parse() {
        let c = cli(&["yamlenums", "-type=Pill", "-alias=lexical", "-suffix=_y", "pkg"]);
        assert_eq!(c.types.as_deref(), Some("Pill"));
        assert_eq!(c.alias, Some(AliasPolicy::Lexical));
        assert_eq!(c.suffix.as_deref(), Some("_y"));
        assert_eq!(c.dirs, vec!["pkg".to_string()]);
        assert!(c.prefix.is_none());
    }

    #[test]
    fn test_bad_alias_rejected_by_parser() {
        let parsed = Cli::try_parse_from(normalize_go_flags(&args(&[
            "yamlenums",
            "-type=Pill",
            "-alias=alpha",
        ])));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_missing_type_is_usage_error() {
        let dir = painkiller("missing_type");
        let c = cli(&["yamlenums", dir.to_str().unwrap()]);
        let err = run(&c, "").unwrap_err();
        let inner = err.downcast_ref::<YamlenumsError>().unwrap();
        assert!(matches!(inner, YamlenumsError::Usage { .. }));
        assert!(!dir.join("pill_yamlenums.go").exists());
    }

    #[test]
    fn test_multiple_directories_rejected() {
        let c = cli(&["yamlenums", "-type=Pill", "a", "b"]);
        let err = run(&c, "-type=Pill a b").unwrap_err();
        assert!(err.to_string().contains("only one directory at a time"));
    }

    #[test]
    fn test_run_writes_file() {
        let dir = painkiller("run_writes");
        let c = cli(&["yamlenums", "-type=Pill", "-prefix=gen_", dir.to_str().unwrap()]);
        let report = run(&c, "-type=Pill -prefix=gen_").unwrap();
        let path = dir.join("gen_pill_yamlenums.go");
        assert_eq!(report.files[0].path, path);
        let src = fs::read_to_string(&path).unwrap();
        assert!(src.contains("\"yamlenums -type=Pill -prefix=gen_\""));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_relative_dir_is_made_absolute() {
        let dir = package_dir(&["some/pkg".to_string()]).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("some/pkg"));
        assert!(package_dir(&[]).unwrap().is_absolute());
    }
}
