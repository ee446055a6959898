use crate::args::Args;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use kvcluster_cluster::{BootstrapConfig, FallbackPolicy};

pub const ENV_PREFIX: &str = "KVCLUSTER";

/// Layer defaults, the optional file, `KVCLUSTER_*` variables and flags.
///
/// `env` replaces the process environment when set.
pub fn load_with_env(args: &Args, env: Option<Map<String, String>>) -> Result<BootstrapConfig> {
    let defaults = Config::try_from(&BootstrapConfig::default())
        .context("failed to serialize default configuration")?;

    let mut builder = Config::builder().add_source(defaults);

    if let Some(path) = &args.config {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(true),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("roles")
            .try_parsing(true)
            .source(env),
    );

    let mut config: BootstrapConfig = builder
        .build()
        .and_then(|c| c.try_deserialize())
        .context("invalid configuration")?;

    if let Some(endpoint) = &args.endpoint {
        config.client.endpoint = endpoint.clone();
    }
    if !args.roles.is_empty() {
        config.roles = args.roles.clone();
    }
    if let Some(secs) = args.probe_timeout {
        config.client.probe_timeout_seconds = secs;
    }
    if let Some(secs) = args.request_timeout {
        config.client.request_timeout_seconds = secs;
    }
    if args.strict_self {
        config.fallback = FallbackPolicy::Fail;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["kvcluster-bootstrap"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = load_with_env(&args(&[]), Some(Map::new())).unwrap();
        assert_eq!(config, BootstrapConfig::default());
        assert_eq!(config.client.endpoint, "127.0.0.1:8081");
        assert_eq!(config.roles, ["key-value"]);
    }

    #[test]
    fn test_file_then_env_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
roles = ["vshard-storage"]
fallback = "fail"

[client]
endpoint = "10.0.0.1:9000"
request_timeout_seconds = 15
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();

        let config = load_with_env(&args(&["-c", path.as_str()]), Some(Map::new())).unwrap();
        assert_eq!(config.client.endpoint, "10.0.0.1:9000");
        assert_eq!(config.client.request_timeout_seconds, 15);
        assert_eq!(config.client.probe_timeout_seconds, 10);
        assert_eq!(config.roles, ["vshard-storage"]);
        assert_eq!(config.fallback, FallbackPolicy::Fail);

        let mut env = Map::new();
        env.insert(
            "KVCLUSTER_CLIENT__ENDPOINT".to_string(),
            "10.0.0.2:9000".to_string(),
        );
        env.insert(
            "KVCLUSTER_ROLES".to_string(),
            "key-value,vshard-router".to_string(),
        );
        let config = load_with_env(&args(&["-c", path.as_str()]), Some(env.clone())).unwrap();
        assert_eq!(config.client.endpoint, "10.0.0.2:9000");
        assert_eq!(config.roles, ["key-value", "vshard-router"]);

        let config = load_with_env(
            &args(&["-c", path.as_str(), "10.0.0.3:9000", "-r", "key-value"]),
            Some(env),
        )
        .unwrap();
        assert_eq!(config.client.endpoint, "10.0.0.3:9000");
        assert_eq!(config.roles, ["key-value"]);
    }

    #[test]
    fn test_flags() {
        let config = load_with_env(
            &args(&["--probe-timeout", "2", "--request-timeout", "7", "--strict-self"]),
            Some(Map::new()),
        )
        .unwrap();
        assert_eq!(config.client.probe_timeout_seconds, 2);
        assert_eq!(config.client.request_timeout_seconds, 7);
        assert_eq!(config.fallback, FallbackPolicy::Fail);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_with_env(
            &args(&["-c", "/nonexistent/kvcluster.toml"]),
            Some(Map::new()),
        );
        assert!(result.is_err());
    }
}
