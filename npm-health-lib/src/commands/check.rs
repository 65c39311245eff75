use super::Host;
use super::common::{CommonArgs, LogLevel, build_aggregator, init_logging};
use crate::Result;
use crate::service::{AggregatedResult, HealthReport, SignalHealth, assess};
use chrono::{DateTime, Utc};
use clap::Parser;
use ohno::{IntoAppError, app_err};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Name of the npm package to check, e.g. `hono` or `@hono/node-server`
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Print the result as JSON instead of a console report
    #[arg(long)]
    pub json: bool,

    /// Exit with status code 1 if any signal is unhealthy
    #[arg(long)]
    pub error_if_unhealthy: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    package: &'a str,

    #[serde(flatten)]
    result: &'a AggregatedResult,

    health: HealthReport,
    verdict: SignalHealth,
}

/// Aggregate and assess a single package, bypassing the rate limiter
pub async fn check_package<H: Host>(host: &mut H, args: &CheckArgs) -> Result<()> {
    init_logging(args.common.log_level.unwrap_or(LogLevel::None), false);

    let config = args.common.load_config()?;
    let aggregator = build_aggregator(&config, args.common.github_token.as_deref())?;

    let result = match aggregator.aggregate(&args.name).await {
        Ok(result) => result,
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Unable to check package '{}': {e}", args.name);
            host.exit(1);
            return Err(app_err!("unable to check package '{}': {e}", args.name));
        }
    };

    let health = assess(&result, &config.health, Utc::now());

    if args.json {
        let report = CheckReport {
            package: &args.name,
            result: &result,
            health,
            verdict: health.overall(),
        };
        let json = serde_json::to_string_pretty(&report).into_app_err("serializing check report")?;
        let _ = writeln!(host.output(), "{json}");
    } else {
        let mut text = String::new();
        render_console(&mut text, &args.name, &result, &health, config.download_period.as_str(), Utc::now(), args.common.color.use_colors())?;
        let _ = write!(host.output(), "{text}");
    }

    if args.error_if_unhealthy && health.overall() == SignalHealth::Unhealthy {
        host.exit(1);
    }

    Ok(())
}

fn styled(health: SignalHealth, use_colors: bool) -> String {
    if !use_colors {
        return health.to_string();
    }

    match health {
        SignalHealth::Healthy => health.green().bold().to_string(),
        SignalHealth::Unhealthy => health.red().bold().to_string(),
        SignalHealth::Unknown => health.yellow().to_string(),
    }
}

fn render_console<W: core::fmt::Write>(
    writer: &mut W,
    name: &str,
    result: &AggregatedResult,
    health: &HealthReport,
    period: &str,
    now: DateTime<Utc>,
    use_colors: bool,
) -> Result<()> {
    let latest = result.latest();
    let age_days = now.signed_duration_since(latest.published_at).num_days();

    writeln!(writer, "{name} is {}", styled(health.overall(), use_colors))?;
    writeln!(
        writer,
        "  {:<12} : {} published {} ({age_days} days ago) [{}]",
        "release",
        latest.version,
        latest.published_at.format("%Y-%m-%d"),
        styled(health.release, use_colors)
    )?;
    writeln!(
        writer,
        "  {:<12} : {} ({period}) [{}]",
        "downloads",
        result.downloads(),
        styled(health.downloads, use_colors)
    )?;

    match (result.contributors(), result.github_url()) {
        (Some(count), Some(url)) => writeln!(
            writer,
            "  {:<12} : {count} ({url}) [{}]",
            "contributors",
            styled(health.contributors, use_colors)
        )?,
        _ => writeln!(
            writer,
            "  {:<12} : n/a (no GitHub repository declared) [{}]",
            "contributors",
            styled(health.contributors, use_colors)
        )?,
    }

    Ok(())
}
