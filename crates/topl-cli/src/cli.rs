//! topl CLI - resolve placeholders in configuration files
//!
//! Usage:
//!   topl resolve config.toml -p name=Alice
//!   topl get config.toml database.url
//!   topl check config.toml other.toml

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use topl_core::engine::collect_unresolved;
use topl_core::{
    load_file, resolve_with_options, Error, ErrorKind, Params, ResolveOptions, ResolvedConfig,
    SourceFormat, Value, DEFAULT_MAX_PASSES,
};
use tracing_subscriber::EnvFilter;

/// topl - resolve {{path.to.key}} placeholders in configuration files
#[derive(Parser)]
#[command(name = "topl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log each substitution and pass to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a configuration file and print the result
    Resolve {
        /// Configuration file (TOML, or JSON/YAML by extension)
        file: PathBuf,

        /// External parameter, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output format: toml, json, yaml
        #[arg(short, long, default_value = "toml", value_parser = ["toml", "json", "yaml"])]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Internal passes allowed before references count as circular
        #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
        max_passes: usize,
    },

    /// Get a single resolved value
    Get {
        /// Configuration file
        file: PathBuf,

        /// Path to the value (e.g., database.host or servers[0])
        path: String,

        /// External parameter, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text", value_parser = ["text", "json", "yaml"])]
        format: String,

        /// Internal passes allowed before references count as circular
        #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
        max_passes: usize,
    },

    /// Parse files without resolving them
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            file,
            params,
            format,
            output,
            max_passes,
        } => cmd_resolve(&file, params, &format, output, max_passes),

        Commands::Get {
            file,
            path,
            params,
            format,
            max_passes,
        } => cmd_get(&file, &path, params, &format, max_passes),

        Commands::Check { files } => cmd_check(files),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("TOPL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "error" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_key_val(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        Some(_) => Err(format!("empty key in '{}'", arg)),
        None => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Heading printed for failures that stop a command
fn failure_category(err: &Error) -> &'static str {
    match err.kind {
        ErrorKind::SourceNotFound | ErrorKind::Io => "File error",
        ErrorKind::SourceMalformed => "Parse error",
        ErrorKind::CircularReference { .. } => "Circular reference detected",
        ErrorKind::Serialize => "Output error",
        ErrorKind::PathNotFound | ErrorKind::TypeCoercion => "Error",
    }
}

fn report_failure(err: &Error) -> ExitCode {
    eprintln!("{} {}: {}", "✗".red(), failure_category(err).red().bold(), err);
    ExitCode::from(2)
}

fn load_and_resolve(
    file: &Path,
    params: Vec<(String, String)>,
    max_passes: usize,
) -> Result<ResolvedConfig, Error> {
    let file = expand_home(file);
    let tree = load_file(&file)?;

    let params: Params = params.into_iter().collect();
    let options = ResolveOptions::new().with_max_passes(max_passes);
    let config = resolve_with_options(&tree, &params, &options)?;

    log::debug!(
        "Resolved {} in {} internal passes",
        file.display(),
        config.passes()
    );
    Ok(config)
}

fn warn_unresolved(unresolved: &[String]) {
    eprintln!(
        "{} {} unresolved placeholder(s): {}",
        "⚠".yellow(),
        unresolved.len(),
        unresolved.join(", ").yellow()
    );
}

fn cmd_resolve(
    file: &Path,
    params: Vec<(String, String)>,
    format: &str,
    output: Option<PathBuf>,
    max_passes: usize,
) -> ExitCode {
    let config = match load_and_resolve(file, params, max_passes) {
        Ok(c) => c,
        Err(e) => return report_failure(&e),
    };

    let rendered = match format {
        "json" => config.to_json().map(|mut s| {
            s.push('\n');
            s
        }),
        "yaml" => config.to_yaml(),
        _ => config.to_toml(),
    };
    let content = match rendered {
        Ok(s) => s,
        Err(e) => return report_failure(&e),
    };

    if let Some(output_path) = output {
        let output_path = expand_home(&output_path);
        if let Err(e) = std::fs::write(&output_path, &content) {
            eprintln!("{}: {}", "Error writing file".red(), e);
            return ExitCode::from(2);
        }
        eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
    } else {
        print!("{}", content);
    }

    if config.has_unresolved() {
        warn_unresolved(config.unresolved_placeholders());
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn cmd_get(
    file: &Path,
    path: &str,
    params: Vec<(String, String)>,
    format: &str,
    max_passes: usize,
) -> ExitCode {
    let config = match load_and_resolve(file, params, max_passes) {
        Ok(c) => c,
        Err(e) => return report_failure(&e),
    };

    let value = match config.get(path) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("{}: Path '{}' not found", "Error".red(), path);
            return ExitCode::from(1);
        }
    };

    let rendered = match format {
        "json" => serde_json::to_string_pretty(value).map(|s| s + "\n").map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        _ => match value {
            Value::Sequence(_) | Value::Mapping(_) => {
                serde_yaml::to_string(value).map_err(|e| e.to_string())
            }
            scalar => Ok(format!("{}\n", scalar)),
        },
    };

    match rendered {
        Ok(s) => print!("{}", s),
        Err(e) => {
            eprintln!("{}: {}", "Output error".red(), e);
            return ExitCode::from(2);
        }
    }

    // Only placeholders inside the selected value matter here
    let unresolved = collect_unresolved(value);
    if !unresolved.is_empty() {
        warn_unresolved(&unresolved);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        let file = expand_home(&file);
        match load_file(&file) {
            Ok(_) => {
                println!(
                    "{} {}: valid {}",
                    "✓".green(),
                    file.display(),
                    SourceFormat::from_path(&file).name().to_uppercase()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("name=Alice").unwrap(),
            ("name".to_string(), "Alice".to_string())
        );
        // Only the first '=' separates key from value
        assert_eq!(
            parse_key_val("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=value").is_err());
    }

    #[test]
    fn test_expand_home() {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let expanded = expand_home(Path::new("~/conf/app.toml"));
        match home {
            Some(home) => assert_eq!(expanded, home.join("conf/app.toml")),
            None => assert_eq!(expanded, PathBuf::from("~/conf/app.toml")),
        }

        assert_eq!(
            expand_home(Path::new("conf/~app.toml")),
            PathBuf::from("conf/~app.toml")
        );
    }

    #[test]
    fn test_failure_categories() {
        assert_eq!(
            failure_category(&Error::source_not_found("x.toml")),
            "File error"
        );
        assert_eq!(
            failure_category(&Error::source_malformed("bad")),
            "Parse error"
        );
        assert_eq!(
            failure_category(&Error::circular_reference(10, &[])),
            "Circular reference detected"
        );
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
