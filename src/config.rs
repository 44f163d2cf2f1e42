//! Loads the secrets needed to reach the database.
//!
//! Secrets are read from a TOML file:
//!
//! ```toml
//! [database]
//! url = "sqlite://data/cashbook.sqlite"
//! auth_token = "my-token"
//! ```
//!
//! The environment variables [DATABASE_URL_VAR] and [AUTH_TOKEN_VAR] take
//! precedence over the file. The file may be omitted if both are set.

use std::{
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_VAR: &str = "CASHBOOK_DATABASE_URL";
/// Environment variable that overrides `database.auth_token`.
pub const AUTH_TOKEN_VAR: &str = "CASHBOOK_AUTH_TOKEN";

/// Errors that stop the application from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The secrets file exists but could not be read.
    #[error("could not read the secrets file {path:?}: {source}")]
    Read {
        /// The path to the secrets file.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The secrets file is not valid TOML or has the wrong shape.
    #[error("could not parse the secrets file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required secret was not set in the file or the environment.
    #[error("the secret \"{name}\" is missing, set it in the secrets file or with {env_var}")]
    MissingSecret {
        /// The key of the secret in the secrets file.
        name: &'static str,
        /// The environment variable that can be used instead.
        env_var: &'static str,
    },
}

/// All secrets used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secrets {
    /// How to reach the database.
    pub database: DatabaseSecrets,
}

/// The location of the database and the credential used to access it.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSecrets {
    /// The database URL, e.g. `sqlite://data/cashbook.sqlite`.
    pub url: String,
    /// The token used to authenticate with the database.
    pub auth_token: String,
}

impl Debug for DatabaseSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSecrets")
            .field("url", &self.url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretsFile {
    database: DatabaseSecretsFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseSecretsFile {
    url: Option<String>,
    auth_token: Option<String>,
}

impl Secrets {
    /// Load the secrets from the file at `path` and the process environment.
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    /// Returns a [ConfigError] if the file cannot be read or parsed, or if a
    /// secret is set in neither the file nor the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading secrets from {path:?}");

        let contents = match fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!("No secrets file found at {path:?}, using the environment only");
                None
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        Self::from_sources(contents.as_deref(), |name| std::env::var(name).ok())
    }

    /// Build the secrets from the contents of a secrets file and a lookup for
    /// environment variables.
    ///
    /// # Errors
    /// Returns a [ConfigError] if `file_contents` cannot be parsed or if a
    /// secret is empty or missing from both sources.
    pub fn from_sources(
        file_contents: Option<&str>,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: SecretsFile = match file_contents {
            Some(contents) => toml::from_str(contents)?,
            None => SecretsFile::default(),
        };

        let url = resolve_secret(
            "database.url",
            DATABASE_URL_VAR,
            file.database.url,
            &env_var,
        )?;
        let auth_token = resolve_secret(
            "database.auth_token",
            AUTH_TOKEN_VAR,
            file.database.auth_token,
            &env_var,
        )?;

        Ok(Self {
            database: DatabaseSecrets { url, auth_token },
        })
    }
}

fn resolve_secret(
    name: &'static str,
    env_var_name: &'static str,
    from_file: Option<String>,
    env_var: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    env_var(env_var_name)
        .or(from_file)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingSecret {
            name,
            env_var: env_var_name,
        })
}

#[cfg(test)]
mod secrets_tests {
    use std::path::Path;

    use super::{AUTH_TOKEN_VAR, ConfigError, DATABASE_URL_VAR, Secrets};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn reads_secrets_from_file() {
        let contents = r#"
            [database]
            url = "sqlite://cashbook.sqlite"
            auth_token = "hunter2"
        "#;

        let secrets = Secrets::from_sources(Some(contents), no_env).unwrap();

        assert_eq!(secrets.database.url, "sqlite://cashbook.sqlite");
        assert_eq!(secrets.database.auth_token, "hunter2");
    }

    #[test]
    fn environment_overrides_file() {
        let contents = r#"
            [database]
            url = "sqlite://cashbook.sqlite"
            auth_token = "hunter2"
        "#;

        let secrets = Secrets::from_sources(Some(contents), |name| match name {
            DATABASE_URL_VAR => Some("file:other.sqlite".to_owned()),
            _ => None,
        })
        .unwrap();

        assert_eq!(secrets.database.url, "file:other.sqlite");
        assert_eq!(secrets.database.auth_token, "hunter2");
    }

    #[test]
    fn environment_alone_is_enough() {
        let secrets = Secrets::from_sources(None, |name| match name {
            DATABASE_URL_VAR => Some("cashbook.sqlite".to_owned()),
            AUTH_TOKEN_VAR => Some("token".to_owned()),
            _ => None,
        })
        .unwrap();

        assert_eq!(secrets.database.url, "cashbook.sqlite");
        assert_eq!(secrets.database.auth_token, "token");
    }

    #[test]
    fn fails_on_missing_token() {
        let contents = r#"
            [database]
            url = "sqlite://cashbook.sqlite"
        "#;

        let result = Secrets::from_sources(Some(contents), no_env);

        assert!(matches!(
            result,
            Err(ConfigError::MissingSecret {
                name: "database.auth_token",
                ..
            })
        ));
    }

    #[test]
    fn fails_on_empty_url() {
        let contents = r#"
            [database]
            url = "  "
            auth_token = "hunter2"
        "#;

        let result = Secrets::from_sources(Some(contents), no_env);

        assert!(matches!(
            result,
            Err(ConfigError::MissingSecret {
                name: "database.url",
                ..
            })
        ));
    }

    #[test]
    fn fails_on_invalid_toml() {
        let result = Secrets::from_sources(Some("[database"), no_env);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn debug_output_redacts_token() {
        let secrets = Secrets::from_sources(
            Some("[database]\nurl = \"db.sqlite\"\nauth_token = \"super-secret\""),
            no_env,
        )
        .unwrap();

        let debug = format!("{secrets:?}");

        assert!(!debug.contains("super-secret"), "token leaked in {debug}");
        assert!(debug.contains("db.sqlite"));
    }

    #[test]
    fn missing_file_falls_back_to_environment() {
        let result = Secrets::load(Path::new("/definitely/not/a/secrets.toml"));

        if std::env::var(DATABASE_URL_VAR).is_err() || std::env::var(AUTH_TOKEN_VAR).is_err() {
            assert!(matches!(result, Err(ConfigError::MissingSecret { .. })));
        }
    }
}
