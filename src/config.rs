use config::{Config, File};
use serde::{Deserialize, Serialize};

/// Configuration for the gateway.
/// This struct is used to deserialize the configuration from a TOML file.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GatewayConfig {
    pub node: Node,
    #[serde(default)]
    pub core: Core,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Node {
    pub rpc_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_password: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Core {
    #[serde(default = "default_max_parallel_fetches")]
    pub max_parallel_fetches: usize,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            max_parallel_fetches: default_max_parallel_fetches(),
        }
    }
}

fn default_max_parallel_fetches() -> usize {
    crate::gateway::DEFAULT_MAX_PARALLEL_FETCHES
}

impl GatewayConfig {
    /// Loads gateway configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Panics
    /// Will panic if the file cannot be read or if required configuration variables are missing
    pub fn from_toml(path: &str) -> Self {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .unwrap_or_else(|_| {
                panic!("Failed to read configuration file at {path}");
            });

        config.try_deserialize().unwrap()
    }

    pub fn from_str(toml_str: &str) -> Self {
        let config = Config::builder()
            .add_source(File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .expect("Failed to build config from string");

        config.try_deserialize().expect("Deserialization failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_valid_config() {
        let toml_content = r#"
            [node]
            rpc_url="http://localhost:8332"
            rpc_user="satstack"
            rpc_password="hunter2"

            [core]
            max_parallel_fetches=4
            "#;

        let config = GatewayConfig::from_str(toml_content);

        assert_eq!(config.node.rpc_url, "http://localhost:8332");
        assert_eq!(config.node.rpc_user.as_deref(), Some("satstack"));
        assert_eq!(config.node.rpc_password.as_deref(), Some("hunter2"));
        assert_eq!(config.core.max_parallel_fetches, 4);
    }

    #[test]
    fn test_from_str_defaults() {
        let toml_content = r#"
            [node]
            rpc_url="http://localhost:8332"
            "#;

        let config = GatewayConfig::from_str(toml_content);

        assert_eq!(config.node.rpc_user, None);
        assert_eq!(config.node.rpc_password, None);
        assert_eq!(
            config.core.max_parallel_fetches,
            crate::gateway::DEFAULT_MAX_PARALLEL_FETCHES
        );
    }
}
