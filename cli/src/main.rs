mod args;
mod report;
mod settings;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use config::Map;
use kvcluster_cluster::Orchestrator;
use report::print_report;
use std::io::{self, Write};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "info" } else { "warn" })),
        )
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = run_with_output(&args, None, &mut out).await;
    let _ = out.flush();
    process::exit(code);
}

/// Run once and write the outcome to `out`; returns the process exit code.
///
/// `env` replaces the process environment when set.
async fn run_with_output<W: Write>(
    args: &Args,
    env: Option<Map<String, String>>,
    out: &mut W,
) -> i32 {
    match run(args, env, out).await {
        Ok(code) => code,
        Err(e) => {
            let _ = writeln!(out, "fail").and_then(|_| writeln!(out, "{:#}", e));
            1
        }
    }
}

async fn run<W: Write>(args: &Args, env: Option<Map<String, String>>, out: &mut W) -> Result<i32> {
    let config = settings::load_with_env(args, env).context("failed to load configuration")?;
    debug!("Effective configuration: {:?}", config);

    let orchestrator = Orchestrator::connect(config)?;
    let report = orchestrator.run().await;

    print_report(&report, out)?;

    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_args(argv: &[&str]) -> (i32, String) {
        let mut full = vec!["kvcluster-bootstrap"];
        full.extend_from_slice(argv);
        let args = Args::parse_from(full);

        let mut out = Vec::new();
        let code = run_with_output(&args, Some(Map::new()), &mut out).await;
        (code, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_endpoint_fails() {
        let (code, output) = run_args(&["no-port"]).await;

        assert_eq!(code, 1);
        assert!(output.starts_with("fail\n"));
        assert!(output.contains("`no-port` must have the form host:port"));
    }

    #[tokio::test]
    async fn test_empty_roles_in_file_fail() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "roles = []").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let (code, output) = run_args(&["-c", path.as_str()]).await;

        assert_eq!(code, 1);
        assert!(output.starts_with("fail\n"));
        assert!(output.contains("at least one role"));
    }

    #[tokio::test]
    async fn test_missing_config_file_fails() {
        let (code, output) = run_args(&["-c", "/nonexistent/kvcluster.toml"]).await;

        assert_eq!(code, 1);
        assert!(output.starts_with("fail\nfailed to load configuration"));
    }
}
