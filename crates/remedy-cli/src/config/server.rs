//! Listener and shutdown settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::bail;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Accepted range for both timeouts, in seconds.
const TIMEOUT_RANGE_SECS: RangeInclusive<u64> = 1..=300;

/// First port that does not need elevated privileges.
const FIRST_UNPRIVILEGED_PORT: u16 = 1024;

/// Where the HTTP API listens and how long it waits on requests.
///
/// Set through `HOST`, `PORT`, `REQUEST_TIMEOUT` and `SHUTDOWN_TIMEOUT`
/// or the matching flags.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Interface to bind; `0.0.0.0` listens everywhere
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "loopback")]
    pub host: IpAddr,

    /// Port to listen on (1024-65535)
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds before an unfinished request is answered with 503
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Seconds to drain connections and let workers finish on shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn loopback() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    /// Rejects privileged ports and timeouts outside 1-300 seconds.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port < FIRST_UNPRIVILEGED_PORT {
            bail!(
                "PORT {} needs elevated privileges; choose {FIRST_UNPRIVILEGED_PORT} or above",
                self.port
            );
        }

        for (name, secs) in [
            ("REQUEST_TIMEOUT", self.request_timeout),
            ("SHUTDOWN_TIMEOUT", self.shutdown_timeout),
        ] {
            if !TIMEOUT_RANGE_SECS.contains(&secs) {
                bail!(
                    "{name} of {secs}s is outside {}-{}s",
                    TIMEOUT_RANGE_SECS.start(),
                    TIMEOUT_RANGE_SECS.end()
                );
            }
        }

        Ok(())
    }

    /// Address the listener binds to.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Whether the host is the unspecified address of either family.
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            request_timeout_secs = self.request_timeout,
            shutdown_timeout_secs = self.shutdown_timeout,
            all_interfaces = self.binds_to_all_interfaces(),
            "Listener configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: loopback(),
            port: 3000,
            request_timeout: 30,
            shutdown_timeout: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_local() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.binds_to_all_interfaces());
        assert_eq!(config.server_addr(), SocketAddr::from(([127, 0, 0, 1], 3000)));
    }

    #[test]
    fn privileged_port_is_rejected() {
        let config = ServerConfig {
            port: 443,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeouts_must_be_within_range() {
        let too_long = ServerConfig {
            request_timeout: 301,
            ..ServerConfig::default()
        };
        assert!(too_long.validate().is_err());

        let zero = ServerConfig {
            shutdown_timeout: 0,
            ..ServerConfig::default()
        };
        assert!(zero.validate().is_err());

        let edge = ServerConfig {
            request_timeout: 300,
            shutdown_timeout: 1,
            ..ServerConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn unspecified_host_listens_everywhere() {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            ..ServerConfig::default()
        };
        assert!(config.binds_to_all_interfaces());
    }
}
