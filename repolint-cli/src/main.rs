mod http;
mod repo;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use http::{DEFAULT_API_URL, HttpTransport};
use repolint_core::{Settings, run_config, run_lint};
use repolint_github::Client;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "repolint",
    version,
    about = "Check a GitHub repository against a declarative policy and optionally fix it."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    args: GlobalArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the merged policy with the origin of every value and validate references.
    Config,
    /// Print the version.
    Version,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Policy file to use instead of discovering repo and org configuration.
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Apply fixes for fixable issues.
    #[arg(long, global = true, default_value_t = false)]
    fix: bool,

    /// Check names to skip, comma separated (e.g. `settings,files(LICENSE)`).
    #[arg(long, global = true, value_delimiter = ',')]
    skip: Vec<String>,

    /// List every check on success and log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Target repository as owner/name (default: the origin remote).
    #[arg(long, global = true, env = "GH_REPO")]
    repo: Option<String>,

    /// API token (falls back to GH_TOKEN).
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API root, for GitHub Enterprise Server.
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    match cli.cmd {
        None => cmd_lint(&cli.args),
        Some(Command::Config) => cmd_config(&cli.args),
        Some(Command::Version) => {
            println!("repolint version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn cmd_lint(args: &GlobalArgs) -> anyhow::Result<()> {
    let settings = settings(args)?;
    let client = client(args, &settings)?;

    let outcome = run_lint(&client, &settings)?;
    print!("{}", outcome.report);
    outcome.verdict()?;
    Ok(())
}

fn cmd_config(args: &GlobalArgs) -> anyhow::Result<()> {
    let settings = settings(args)?;
    let client = client(args, &settings)?;

    let outcome = run_config(&client, &settings)?;
    print!("{}", outcome.report);
    outcome.verdict()?;
    Ok(())
}

fn settings(args: &GlobalArgs) -> anyhow::Result<Settings> {
    let workdir = Utf8PathBuf::from(".");
    let (owner, repo) = repo::resolve(args.repo.as_deref(), &workdir)?;
    debug!(owner = %owner, repo = %repo, "target repository");

    Ok(Settings {
        workdir,
        owner,
        repo,
        config_path: args.config.clone(),
        skip: skip_list(&args.skip),
        fix: args.fix,
        verbose: args.verbose,
        use_color: io::stdout().is_terminal(),
    })
}

fn client(args: &GlobalArgs, settings: &Settings) -> anyhow::Result<Client> {
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|t| !t.is_empty());
    if token.is_none() {
        warn!("no GITHUB_TOKEN or GH_TOKEN set; requests are unauthenticated");
    }
    Ok(settings.client(HttpTransport::new(&args.api_url, token)?))
}

fn skip_list(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("repolint").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn skip_is_comma_separated_and_trimmed() {
        let cli = parse(&["--skip", "settings, files(LICENSE) ,", "--skip", "actions"]);
        assert_eq!(
            skip_list(&cli.args.skip),
            vec!["settings", "files(LICENSE)", "actions"]
        );
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["config", "--config", "policy.yml", "--repo", "acme/widgets"]);
        assert!(matches!(cli.cmd, Some(Command::Config)));
        assert_eq!(cli.args.config, Some(Utf8PathBuf::from("policy.yml")));
        assert_eq!(cli.args.repo.as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn bare_invocation_lints() {
        let cli = parse(&["--fix", "-v"]);
        assert!(cli.cmd.is_none());
        assert!(cli.args.fix);
        assert!(cli.args.verbose);
    }
}
