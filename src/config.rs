//! Environment-driven configuration.
//!
//! Mirrors the pattern this codebase's other network services use: a
//! `clap::Parser` struct with `env = "..."` attributes and explicit
//! defaults, loaded once at process start. An optional `.env` file is
//! read first so local development doesn't require exporting variables
//! by hand; real environment variables always take precedence.

use std::path::PathBuf;

use clap::Parser;

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_hostname() -> String {
    "agent".to_string()
}

/// Validated, immutable configuration for one agent process.
#[derive(Parser, Debug, Clone)]
#[command(name = "ffmpeg-agent", about = "Transcoding fleet worker agent")]
pub struct AgentConfig {
    /// Base HTTP(S) URL of the controller; translated to ws(s):// for the session URL.
    #[arg(long, env = "CONTROLLER_URL", default_value = "http://localhost:4000")]
    pub controller_url: String,

    /// Bearer token presented to the controller on connect.
    #[arg(long, env = "AGENT_TOKEN", default_value = "dev-token")]
    pub agent_token: String,

    /// Path or name of the encoder executable.
    #[arg(long, env = "FFMPEG_PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: String,

    /// Maximum number of simultaneously running jobs.
    #[arg(long, env = "CONCURRENCY", default_value_t = default_concurrency())]
    pub concurrency: usize,

    /// Hostname component of the advertised agent id (`<hostname>-<pid>`).
    #[arg(long, env = "HOSTNAME", default_value_t = default_hostname())]
    pub hostname: String,

    /// Wall-clock seconds allowed per job before the child is force-killed.
    #[arg(long, env = "JOB_TIMEOUT_SECS", default_value_t = 1800)]
    pub job_timeout_secs: u64,

    /// Maximum upload attempts before a job is reported as failed.
    #[arg(long, env = "UPLOAD_MAX_RETRIES", default_value_t = 3)]
    pub upload_max_retries: u32,

    /// Per-attempt TCP connect timeout for the uploader, in seconds.
    #[arg(long, env = "REQ_CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub request_connect_timeout_secs: u64,

    /// Per-attempt total request timeout for the uploader, in seconds.
    #[arg(long, env = "REQ_TIMEOUT_SECS", default_value_t = 900)]
    pub request_timeout_secs: u64,

    /// Minimum interval between heartbeat messages, in seconds.
    #[arg(long, env = "HEARTBEAT_INTERVAL_SECS", default_value_t = 10)]
    pub heartbeat_interval_secs: u64,

    /// Directory under which per-job temporary output files are created.
    #[arg(long, env = "TMPDIR", default_value = "/tmp")]
    pub tmp_dir: PathBuf,
}

impl AgentConfig {
    /// Parses configuration from the process environment, loading an
    /// optional `.env` file first. Returns a descriptive error instead of
    /// silently falling back to a default when a numeric tunable is present
    /// but unparseable, and rejects zero for every tunable that must be a
    /// positive integer.
    pub fn load() -> anyhow::Result<Self> {
        // Ignore the error: a missing .env file is the common case, not a failure.
        let _ = dotenvy::dotenv();
        let config = AgentConfig::try_parse()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero value for any tunable that must be a positive
    /// integer. Zero is otherwise a valid `u64`/`u32`/`usize`, so clap's
    /// own parsing can't catch this; left unchecked it would otherwise flow
    /// through to a flooring `.max(1)` at the point of use, or worse (an
    /// un-floored zero-second timeout) — both are the silent fallback this
    /// guards against.
    fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("CONCURRENCY must be at least 1");
        }
        if self.job_timeout_secs == 0 {
            anyhow::bail!("JOB_TIMEOUT_SECS must be at least 1");
        }
        if self.upload_max_retries == 0 {
            anyhow::bail!("UPLOAD_MAX_RETRIES must be at least 1");
        }
        if self.request_connect_timeout_secs == 0 {
            anyhow::bail!("REQ_CONNECT_TIMEOUT_SECS must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQ_TIMEOUT_SECS must be at least 1");
        }
        if self.heartbeat_interval_secs == 0 {
            anyhow::bail!("HEARTBEAT_INTERVAL_SECS must be at least 1");
        }
        Ok(())
    }

    /// The effective concurrency, guaranteed to be at least 1.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Identifier advertised to the controller: `<hostname>-<pid>`.
    pub fn agent_id(&self) -> String {
        format!("{}-{}", self.hostname, std::process::id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AgentConfig {
        AgentConfig {
            controller_url: "http://localhost:4000".into(),
            agent_token: "dev-token".into(),
            ffmpeg_path: "ffmpeg".into(),
            concurrency: 4,
            hostname: "box".into(),
            job_timeout_secs: 1800,
            upload_max_retries: 3,
            request_connect_timeout_secs: 10,
            request_timeout_secs: 900,
            heartbeat_interval_secs: 10,
            tmp_dir: PathBuf::from("/tmp"),
        }
    }

    #[test]
    fn default_hostname_is_the_literal_agent() {
        assert_eq!(default_hostname(), "agent");
    }

    #[test]
    fn validate_accepts_a_fully_populated_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut cfg = valid_config();
        cfg.concurrency = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_job_timeout() {
        let mut cfg = valid_config();
        cfg.job_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_upload_max_retries() {
        let mut cfg = valid_config();
        cfg.upload_max_retries = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_connect_timeout() {
        let mut cfg = valid_config();
        cfg.request_connect_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_request_timeout() {
        let mut cfg = valid_config();
        cfg.request_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_heartbeat_interval() {
        let mut cfg = valid_config();
        cfg.heartbeat_interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn agent_id_combines_hostname_and_pid() {
        let cfg = AgentConfig {
            controller_url: "http://localhost:4000".into(),
            agent_token: "dev-token".into(),
            ffmpeg_path: "ffmpeg".into(),
            concurrency: 4,
            hostname: "box".into(),
            job_timeout_secs: 1800,
            upload_max_retries: 3,
            request_connect_timeout_secs: 10,
            request_timeout_secs: 900,
            heartbeat_interval_secs: 10,
            tmp_dir: PathBuf::from("/tmp"),
        };
        assert_eq!(cfg.agent_id(), format!("box-{}", std::process::id()));
        assert_eq!(cfg.concurrency(), 4);
    }

    #[test]
    fn concurrency_floors_at_one() {
        let mut cfg = AgentConfig {
            controller_url: "http://localhost:4000".into(),
            agent_token: "dev-token".into(),
            ffmpeg_path: "ffmpeg".into(),
            concurrency: 0,
            hostname: "box".into(),
            job_timeout_secs: 1800,
            upload_max_retries: 3,
            request_connect_timeout_secs: 10,
            request_timeout_secs: 900,
            heartbeat_interval_secs: 10,
            tmp_dir: PathBuf::from("/tmp"),
        };
        assert_eq!(cfg.concurrency(), 1);
        cfg.concurrency = 2;
        assert_eq!(cfg.concurrency(), 2);
    }
}
