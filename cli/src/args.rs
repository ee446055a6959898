use clap::Parser;
use std::path::PathBuf;

/// Assign an application role to the bootstrap node of a cluster
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Control-plane address
    #[arg(value_name = "HOST:PORT")]
    pub endpoint: Option<String>,

    /// Role to assign, may be repeated
    #[arg(short, long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Liveness probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,

    /// Query and mutation timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Fail when the endpoint's own uri is not among discovered servers
    #[arg(long)]
    pub strict_self: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
