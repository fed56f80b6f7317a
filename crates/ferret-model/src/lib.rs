mod types;
mod provider;
mod mock;
mod yaml_mock;

pub use types::*;
pub use provider::{ModelProvider, ResponseStream};
pub use mock::{MockProvider, ScriptedMockProvider};
pub use yaml_mock::YamlMockProvider;

use anyhow::{bail, Context};
use ferret_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Provider selection:
/// - `"mock"` → [`MockProvider`] (echo-back)
/// - `"yaml-mock"` → [`YamlMockProvider`] loaded from `mock_responses_file`
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    match cfg.provider.as_str() {
        "mock" => Ok(Box::new(MockProvider)),
        "yaml-mock" => {
            let path = cfg
                .mock_responses_file
                .as_deref()
                .context("provider \"yaml-mock\" needs model.mock_responses_file")?;
            Ok(Box::new(YamlMockProvider::from_file(path)?))
        }
        other => bail!("unknown model provider: {other}"),
    }
}
