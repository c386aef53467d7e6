use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use container_version_checker::check::VersionChecker;
use container_version_checker::color::{
    ColorMode, color_enabled_stderr, color_enabled_stdout, log_error_stderr, log_warn_stderr,
};
use container_version_checker::config::{CheckerConfig, cache_dir};
use container_version_checker::report::{Report, render_table};
use container_version_checker::tools::{PinChange, ToolRegistry, builtin};
use container_version_checker::update::git::CommandGit;
use container_version_checker::update::{BumpStatus, CommitStatus, UpdateOptions, Updater};
use container_version_checker::version::cache::ResponseCache;
use container_version_checker::version::fetcher::HttpFetcher;
use container_version_checker::version::semver::BumpLevel;

#[derive(Parser)]
#[command(name = "container-versions")]
#[command(version, about = "Check and update tool version pins of a dev-container image")]
struct Cli {
    /// Repository root that pin files are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare pinned versions against upstream releases
    Check(CheckArgs),
    /// Rewrite outdated pins and optionally commit them
    Update(UpdateArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    cache: CacheArgs,
}

#[derive(Args)]
struct CacheArgs {
    /// Ignore cached responses
    #[arg(long)]
    no_cache: bool,

    /// Seconds a cached response stays fresh
    #[arg(long, value_name = "N")]
    cache_duration: Option<u64>,
}

#[derive(Args)]
struct UpdateArgs {
    /// Show what would change without writing files
    #[arg(long)]
    dry_run: bool,

    /// Do not commit the changes
    #[arg(long)]
    no_commit: bool,

    /// Do not bump the VERSION file
    #[arg(long)]
    no_bump: bool,

    /// Report produced by `check --json`; runs a check when omitted
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BumpArg::Patch)]
    bump_level: BumpArg,

    #[command(flatten)]
    cache: CacheArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum BumpArg {
    Patch,
    Minor,
    Major,
}

impl From<BumpArg> for BumpLevel {
    fn from(arg: BumpArg) -> Self {
        match arg {
            BumpArg::Patch => BumpLevel::Patch,
            BumpArg::Minor => BumpLevel::Minor,
            BumpArg::Major => BumpLevel::Major,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = container_version_checker::logging::init(cli.log_file.as_deref())?;
    let config = CheckerConfig::load(cli.config.as_deref())?;
    let registry = builtin::registry().without(config.tools.disabled.as_slice());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match &cli.command {
        Command::Check(args) => {
            let report = runtime.block_on(run_check(&cli.root, &config, &args.cache, &registry))?;
            print_report(&report, args.json, cli.color)?;
            Ok(ExitCode::from(report.exit_code as u8))
        }
        Command::Update(args) => {
            let report = match &args.input {
                Some(path) => Report::from_json(&std::fs::read_to_string(path)?)?,
                None => runtime.block_on(run_check(&cli.root, &config, &args.cache, &registry))?,
            };
            Ok(run_update(&cli.root, &registry, &report, args, cli.color))
        }
    }
}

async fn run_check(
    root: &Path,
    config: &CheckerConfig,
    cache_args: &CacheArgs,
    registry: &ToolRegistry,
) -> anyhow::Result<Report> {
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.fetch.timeout_secs),
        &config.fetch.user_agent,
    )?
    .with_github_token(HttpFetcher::github_token_from_env());

    let duration = cache_args
        .cache_duration
        .unwrap_or(config.cache.duration_secs);
    let mut cache = ResponseCache::new(cache_dir(), Duration::from_secs(duration));
    if cache_args.no_cache || !config.cache.enabled {
        cache = cache.without_reads();
    }

    let records = VersionChecker::new(registry, &cache, &fetcher, root)
        .run()
        .await;
    Ok(Report::from_records(&records, chrono::Utc::now()))
}

fn print_report(report: &Report, json: bool, color: ColorMode) -> anyhow::Result<()> {
    if json {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", render_table(report, color_enabled_stdout(color)));
    if report.has_outdated() {
        log_warn_stderr(
            color_enabled_stderr(color),
            &format!(
                "Warning: {} tool(s) are outdated. Run `container-versions update` to update them.",
                report.summary.outdated
            ),
        );
    }
    Ok(())
}

fn run_update(
    root: &Path,
    registry: &ToolRegistry,
    report: &Report,
    args: &UpdateArgs,
    color: ColorMode,
) -> ExitCode {
    let use_err = color_enabled_stderr(color);
    let options = UpdateOptions {
        dry_run: args.dry_run,
        commit: !args.no_commit,
        bump: (!args.no_bump).then(|| args.bump_level.into()),
    };

    let git = CommandGit::new(root);
    let outcome = Updater::new(registry, &git, root, options).run(report);

    if outcome.changes.is_empty() && outcome.skipped.is_empty() {
        println!("All tools are up to date.");
        return ExitCode::SUCCESS;
    }

    for (tool, change) in &outcome.changes {
        match change {
            PinChange::Applied { file, from, to } => {
                println!("Updated {tool}: {from} -> {to} ({})", file.display())
            }
            PinChange::Planned { file, from, to } => {
                println!("Would update {tool}: {from} -> {to} ({})", file.display())
            }
            PinChange::AlreadyCurrent { file } => {
                println!("{tool} already current in {}", file.display())
            }
        }
    }
    for skipped in &outcome.skipped {
        log_warn_stderr(use_err, &format!("Skipped {}: {}", skipped.tool, skipped.reason));
    }

    println!(
        "\n{} updated, {} skipped",
        outcome.applied_count(),
        outcome.skipped.len()
    );

    match &outcome.commit {
        CommitStatus::Committed => println!("Committed changes."),
        CommitStatus::Failed(reason) => log_error_stderr(
            use_err,
            &format!("Commit failed; changes left uncommitted: {reason}"),
        ),
        CommitStatus::NotAttempted => {}
    }

    match &outcome.bump {
        BumpStatus::Bumped { from, to } => println!("Bumped VERSION {from} -> {to}"),
        BumpStatus::Skipped(reason) => {
            log_warn_stderr(use_err, &format!("VERSION not bumped: {reason}"))
        }
        BumpStatus::CommitFailed { from, to, reason } => log_error_stderr(
            use_err,
            &format!("Bumped VERSION {from} -> {to} but the commit failed; left uncommitted: {reason}"),
        ),
        BumpStatus::NotAttempted => {}
    }

    if outcome.has_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
