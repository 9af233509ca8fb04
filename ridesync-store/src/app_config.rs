use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub locations: LocationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Matching rule overrides; the defaults are the production values.
#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_after_window_mins")]
    pub after_window_mins: i64,
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,
    #[serde(default = "default_recommend_timeout_secs")]
    pub recommend_timeout_secs: u64,
}

fn default_after_window_mins() -> i64 {
    60
}

fn default_max_group_size() -> usize {
    4
}

fn default_recommend_timeout_secs() -> u64 {
    10
}

/// The known location taxonomy, frozen at startup into the engine's
/// location index.
#[derive(Debug, Deserialize, Clone)]
pub struct LocationsConfig {
    pub hostels: Vec<String>,
    pub airport_terminals: Vec<String>,
    pub railway_stations: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of RIDESYNC)
            // Eg.. `RIDESYNC_DEBUG=1` would set the `debug` key
            .add_source(config::Environment::with_prefix("RIDESYNC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn matching_section_falls_back_to_production_defaults() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/ridesync"

            [matching]

            [locations]
            hostels = ["Uniworld-1", "Uniworld-2"]
            airport_terminals = ["Terminal-1"]
            railway_stations = []
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.matching.after_window_mins, 60);
        assert_eq!(config.matching.max_group_size, 4);
        assert_eq!(config.matching.recommend_timeout_secs, 10);
        assert_eq!(config.locations.hostels.len(), 2);
    }

    #[test]
    fn explicit_matching_values_win() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/ridesync"

            [matching]
            after_window_mins = 90
            max_group_size = 3
            recommend_timeout_secs = 5

            [locations]
            hostels = []
            airport_terminals = []
            railway_stations = []
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.matching.after_window_mins, 90);
        assert_eq!(config.matching.max_group_size, 3);
        assert_eq!(config.matching.recommend_timeout_secs, 5);
    }
}
