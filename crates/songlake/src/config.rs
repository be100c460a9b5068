use std::{fmt, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Region used when neither the file nor the environment names one.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Application configuration.
///
/// Loaded once at startup from an optional TOML file, then overlaid with
/// environment variables and command-line flags. It is passed explicitly to
/// the storage backends and never written back into the process environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root holding `song_data/` and `log_data/`.
    pub input_root: String,
    /// Root the tables are written under.
    pub output_root: String,
    /// Object storage credentials. Required by the `s3` backend only.
    pub aws: Option<AwsSettings>,
}

/// Explicit credentials for object storage.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores. Enables path-style addressing.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            region: default_region(),
            endpoint_url: None,
        }
    }
}

impl fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSettings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

impl Config {
    /// Parses a TOML document.
    ///
    /// ```toml
    /// input_root = "s3a://udacity-dend/"
    /// output_root = "s3a://sparkify-lake/"
    ///
    /// [aws]
    /// access_key_id = "AKIA..."
    /// secret_access_key = "..."
    /// region = "us-west-2"
    /// ```
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Loads the file at `path`, or starts from defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&content, &display)
    }

    /// Overlays values from environment variables.
    ///
    /// `lookup` resolves a variable name, e.g. `|key| std::env::var(key).ok()`.
    ///
    /// - `SONGLAKE_INPUT` - input root
    /// - `SONGLAKE_OUTPUT` - output root
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`,
    ///   `AWS_ENDPOINT_URL` - object storage settings
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(input) = lookup("SONGLAKE_INPUT") {
            self.input_root = input;
        }
        if let Some(output) = lookup("SONGLAKE_OUTPUT") {
            self.output_root = output;
        }

        let access_key_id = lookup("AWS_ACCESS_KEY_ID");
        let secret_access_key = lookup("AWS_SECRET_ACCESS_KEY");
        let region = lookup("AWS_REGION");
        let endpoint_url = lookup("AWS_ENDPOINT_URL");
        let any_aws = access_key_id.is_some()
            || secret_access_key.is_some()
            || region.is_some()
            || endpoint_url.is_some();
        if !any_aws {
            return;
        }

        let aws = self.aws.get_or_insert_with(AwsSettings::default);
        if let Some(value) = access_key_id {
            aws.access_key_id = value;
        }
        if let Some(value) = secret_access_key {
            aws.secret_access_key = value;
        }
        if let Some(value) = region {
            aws.region = value;
        }
        if let Some(value) = endpoint_url {
            aws.endpoint_url = Some(value);
        }
    }

    /// Applies command-line overrides, which take precedence over everything.
    pub fn apply_overrides(&mut self, input: Option<String>, output: Option<String>) {
        if let Some(input) = input {
            self.input_root = input;
        }
        if let Some(output) = output {
            self.output_root = output;
        }
    }

    /// Checks that the required values are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_root.is_empty() {
            return Err(ConfigError::Missing("input_root"));
        }
        if self.output_root.is_empty() {
            return Err(ConfigError::Missing("output_root"));
        }
        if let Some(aws) = &self.aws {
            if aws.access_key_id.is_empty() {
                return Err(ConfigError::Missing("aws.access_key_id"));
            }
            if aws.secret_access_key.is_empty() {
                return Err(ConfigError::Missing("aws.secret_access_key"));
            }
            if aws.region.is_empty() {
                return Err(ConfigError::Missing("aws.region"));
            }
        }
        Ok(())
    }
}
