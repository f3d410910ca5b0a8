//! Node Configuration
//!
//! Both node roles run from the same binary. Settings come from command-line
//! flags, fall back to environment variables, and finally to the defaults the
//! deployment has always used (primary on 8080, replica on 8081).

use crate::directory::types::IdPolicy;
use crate::replica::sync::{DEFAULT_RETRY_DELAY, DEFAULT_SYNC_INTERVAL};

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_PRIMARY_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_REPLICA_BIND: &str = "0.0.0.0:8081";
pub const DEFAULT_PRIMARY_URL: &str = "http://localhost:8080";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

pub const USAGE: &str = "Usage: directory-node --role <primary|replica> [--bind <addr:port>] \
[--primary <url>] [--interval-secs <n>] [--retry-secs <n>] [--timeout-ms <n>] \
[--id-policy <count|monotonic>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Replica,
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Role::Primary),
            "replica" => Ok(Role::Replica),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub role: Role,
    pub bind_addr: SocketAddr,
    /// Base URL the replica pulls snapshots from.
    pub primary_url: String,
    pub sync_interval: Duration,
    pub retry_delay: Duration,
    pub fetch_timeout: Duration,
    pub id_policy: IdPolicy,
}

impl NodeConfig {
    /// Defaults for `role`, before any flag or variable is applied.
    pub fn for_role(role: Role) -> Result<Self> {
        let bind = match role {
            Role::Primary => DEFAULT_PRIMARY_BIND,
            Role::Replica => DEFAULT_REPLICA_BIND,
        };

        Ok(Self {
            role,
            bind_addr: bind.parse()?,
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            id_policy: IdPolicy::default(),
        })
    }

    /// Reads the process arguments and environment.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args_and_env(&args, |key| std::env::var(key).ok())
    }

    /// Builds a config from `args` (without the program name), consulting
    /// `env` for anything the flags leave unset.
    pub fn from_args_and_env<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut role: Option<String> = None;
        let mut bind: Option<String> = None;
        let mut primary: Option<String> = None;
        let mut interval_secs: Option<u64> = None;
        let mut retry_secs: Option<u64> = None;
        let mut timeout_ms: Option<u64> = None;
        let mut id_policy: Option<IdPolicy> = None;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = || {
                args.get(i + 1)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))
            };

            match flag {
                "--role" => role = Some(value()?),
                "--bind" => bind = Some(value()?),
                "--primary" => primary = Some(value()?),
                "--interval-secs" => interval_secs = Some(value()?.parse()?),
                "--retry-secs" => retry_secs = Some(value()?.parse()?),
                "--timeout-ms" => timeout_ms = Some(value()?.parse()?),
                "--id-policy" => id_policy = Some(value()?.parse()?),
                other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
            }
            i += 2;
        }

        let role: Role = role
            .or_else(|| env("DIRECTORY_ROLE"))
            .ok_or_else(|| anyhow::anyhow!("--role is required"))?
            .parse()?;

        let mut config = Self::for_role(role)?;

        if let Some(bind) = bind.or_else(|| env("DIRECTORY_BIND")) {
            config.bind_addr = bind.parse()?;
        }
        if let Some(url) = primary.or_else(|| env("PRIMARY_URL")) {
            config.primary_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = interval_secs {
            config.sync_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = retry_secs {
            config.retry_delay = Duration::from_secs(secs);
        }
        if let Some(ms) = timeout_ms {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = id_policy {
            config.id_policy = policy;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync_interval.is_zero() {
            return Err(anyhow::anyhow!("Sync interval must be positive"));
        }
        if self.retry_delay >= self.sync_interval {
            return Err(anyhow::anyhow!(
                "Retry delay ({:?}) must be shorter than the sync interval ({:?})",
                self.retry_delay,
                self.sync_interval
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(anyhow::anyhow!("Fetch timeout must be positive"));
        }
        Ok(())
    }
}
