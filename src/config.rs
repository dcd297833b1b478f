use std::time::Duration;

use clap::Args;

/// Runtime settings of the controller
#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Address of the metrics and diagnostics server
    #[arg(long, env = "FLINK_OPERATOR_BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind_address: String,

    /// Interval of the periodic resync of a converged cluster, in seconds
    #[arg(long, env = "FLINK_OPERATOR_RESYNC_SECONDS", default_value_t = 300)]
    pub resync_seconds: u64,

    /// Delay before a failed pass is retried, in seconds
    #[arg(long, env = "FLINK_OPERATOR_ERROR_REQUEUE_SECONDS", default_value_t = 60)]
    pub error_requeue_seconds: u64,

    /// Field manager recorded on created and updated objects
    #[arg(long, env = "FLINK_OPERATOR_FIELD_MANAGER", default_value = "flink-session-operator")]
    pub field_manager: String,
}

impl Config {
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_seconds)
    }

    pub fn error_requeue_interval(&self) -> Duration {
        Duration::from_secs(self.error_requeue_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            resync_seconds: 300,
            error_requeue_seconds: 60,
            field_manager: "flink-session-operator".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["controller", "--resync-seconds", "30"]);
        assert_eq!(cli.config.resync_interval(), Duration::from_secs(30));
        assert_eq!(cli.config.error_requeue_interval(), Duration::from_secs(60));
        assert_eq!(cli.config.field_manager, "flink-session-operator");
    }

    #[test]
    fn defaults_match_flag_defaults() {
        let cli = Cli::parse_from(["controller"]);
        let defaults = Config::default();
        assert_eq!(cli.config.bind_address, defaults.bind_address);
        assert_eq!(cli.config.resync_interval(), defaults.resync_interval());
        assert_eq!(
            cli.config.error_requeue_interval(),
            defaults.error_requeue_interval()
        );
        assert_eq!(cli.config.field_manager, defaults.field_manager);
    }
}
