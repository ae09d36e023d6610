use brf_benchmark_core::config::EngineConfig;
use brf_benchmark_core::peers::DistrictRules;

use crate::input;

/// Engine configuration from `--config` (TOML), falling back to defaults.
///
/// `--district-rules` switches on the built-in Stockholm district table
/// unless the file already supplies its own.
pub fn load_engine_config(
    path: Option<&str>,
    district_rules: bool,
) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config: EngineConfig = match path {
        Some(p) => {
            tracing::debug!(path = p, "loading engine config");
            input::file::read_toml(p)?
        }
        None => EngineConfig::default(),
    };

    if district_rules && config.districts.is_none() {
        config.districts = Some(DistrictRules::stockholm());
    }

    config.validate()?;
    Ok(config)
}
