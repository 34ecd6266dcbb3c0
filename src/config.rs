use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub observer: ObserverConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize)]
pub struct ObserverConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Height above the ellipsoid, km
    pub height_km: f64,
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    pub coefficient_file: PathBuf,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config: Config = toml::from_str(
            r#"
            [observer]
            name = "Home"
            latitude = 36.1
            longitude = -86.7
            height_km = 0.2

            [model]
            coefficient_file = "WMM.COF"
            "#,
        )
        .unwrap();
        assert_eq!(config.observer.name, "Home");
        assert_eq!(config.model.coefficient_file, PathBuf::from("WMM.COF"));
    }
}
