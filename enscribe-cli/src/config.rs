//! CLI settings.

/// Default root label tag.
pub const DEFAULT_ROOT_TAG: &str = "root";

const LOG_FILTER: &str = "enscribe=info,warn";
const LOG_FILTER_VERBOSE: &str = "enscribe=debug,info";

/// Settings shared by every subcommand.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Render records with protocol-shortened entries instead of raw hex
    pub human: bool,
    /// Tag of the synthetic root label (`[tag]`)
    pub root_tag: String,
    /// Debug logging
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            human: false,
            root_tag: DEFAULT_ROOT_TAG.into(),
            verbose: false,
        }
    }
}

impl CliConfig {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            LOG_FILTER_VERBOSE
        } else {
            LOG_FILTER
        }
    }
}
