use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use rentscope_client::GatewayConfig;

/// The prefix of the environment variables that override the configuration file.
pub const ENV_PREFIX: &str = "RENTSCOPE_";

#[derive(Debug, Clone, Default, serde::Deserialize)]
/// The configuration of the `rentscope` CLI.
pub struct CliConfig {
    /// How to reach the backend.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// The file holding the persisted session and language.
    ///
    /// Defaults to `~/.rentscope/storage.json`.
    #[serde(default)]
    pub storage_path: Option<Utf8PathBuf>,
}

impl CliConfig {
    /// Load the configuration by merging, in increasing order of priority:
    ///
    /// 1. The YAML file at `path`, if it exists.
    /// 2. Environment variables prefixed with `RENTSCOPE_`.
    ///    Nested keys are separated by `__`, e.g. `RENTSCOPE_GATEWAY__ORIGIN`.
    pub fn load(path: &Utf8Path) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}
