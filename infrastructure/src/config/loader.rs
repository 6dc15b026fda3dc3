//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["sherlock.toml", ".sherlock.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `SHERLOCK_*` environment variables, `__` separating sections
    ///    (e.g. `SHERLOCK_SWARM__MAX_HANDOFFS=4`), then `AWS_REGION`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./sherlock.toml` or `./.sherlock.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/sherlock/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(
                Env::raw().filter_map(|key| {
                    key.as_str()
                        .eq_ignore_ascii_case("AWS_REGION")
                        .then(|| "aws.region".into())
                }),
            )
            .merge(Env::prefixed("SHERLOCK_").split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sherlock").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] SHERLOCK_<SECTION>__<KEY>, AWS_REGION");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [FOUND] Project: {}", path.display()),
            None => println!("  [     ] Project: ./sherlock.toml or ./.sherlock.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", mark, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use sherlock_domain::RepeatVisitPolicy;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("sherlock/config.toml"));
    }

    #[test]
    fn test_project_file_explicit_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "sherlock.toml",
                r#"
[swarm]
max_handoffs = 3
max_tool_turns = 10

[aws]
region = "eu-west-1"
"#,
            )?;
            jail.create_file("incident.toml", "[swarm]\nmax_tool_turns = 15\n")?;
            jail.set_env("SHERLOCK_SWARM__REPEAT_VISITS", "concatenate");

            let config = ConfigLoader::load(Some(Path::new("incident.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.swarm.max_handoffs, Some(3));
            assert_eq!(config.swarm.max_tool_turns, 15);
            assert_eq!(config.swarm.repeat_visits, RepeatVisitPolicy::Concatenate);
            assert_eq!(config.aws.region, "eu-west-1");
            assert_eq!(config.backends, FileConfig::default().backends);
            Ok(())
        });
    }

    #[test]
    fn test_aws_region_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("AWS_REGION", "ap-southeast-2");
            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.aws.region, "ap-southeast-2");

            jail.set_env("SHERLOCK_AWS__REGION", "us-west-2");
            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.aws.region, "us-west-2");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(".sherlock.toml", "[swarm]\nmax_tool_turns = \"many\"\n")?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
