//! Configuration loading: a YAML file with `${VAR}` environment-variable
//! interpolation, deserialized into the sections the repository client and
//! publication workflow need.
//!
//! Grounded on `plastron-repo/src/plastron/context/__init__.py`'s
//! `PlastronContext` (config-driven lazy accessors) and
//! `plastron-utils/src/plastron/utils/__init__.py::envsubst`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    #[serde(rename = "REST_ENDPOINT")]
    pub rest_endpoint: String,
    #[serde(rename = "RELPATH", default = "default_relpath")]
    pub relpath: String,
    #[serde(rename = "EXTERNAL_URL", default)]
    pub external_url: Option<String>,
    #[serde(rename = "STRUCTURE", default = "default_structure")]
    pub structure: String,
    /// Seconds between transaction keep-alive `POST`s (spec default 90 s);
    /// must stay strictly less than the server's transaction expiry.
    #[serde(rename = "KEEP_ALIVE_INTERVAL", default = "default_keep_alive_interval_secs")]
    pub keep_alive_interval_secs: u64,
    #[serde(rename = "AUTH_TOKEN", default)]
    pub auth_token: Option<String>,
    #[serde(rename = "JWT_SECRET", default)]
    pub jwt_secret: Option<String>,
    #[serde(rename = "JWT_SUBJECT", default)]
    pub jwt_subject: Option<String>,
    #[serde(rename = "CLIENT_CERT", default)]
    pub client_cert: Option<String>,
    #[serde(rename = "CLIENT_KEY", default)]
    pub client_key: Option<String>,
    #[serde(rename = "FEDORA_USER", default)]
    pub fedora_user: Option<String>,
    #[serde(rename = "FEDORA_PASSWORD", default)]
    pub fedora_password: Option<String>,
}

fn default_relpath() -> String {
    "/".to_string()
}

fn default_structure() -> String {
    "flat".to_string()
}

fn default_keep_alive_interval_secs() -> u64 {
    90
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationWorkflowConfig {
    #[serde(rename = "HANDLE_SERVICE_URL")]
    pub handle_service_url: String,
    #[serde(rename = "HANDLE_SERVICE_TOKEN", default)]
    pub handle_service_token: Option<String>,
    /// Template for a resource's public URL, with `{uuid}`/`{path}` fields
    /// substituted in, e.g. `https://repo.example.edu/items/{uuid}`.
    #[serde(rename = "PUBLIC_URL_PATTERN")]
    pub public_url_pattern: String,
    /// The repo tag (`HandleInfo.repo`) a handle is expected to carry once
    /// published here, compared/corrected by `publish()` alongside the
    /// target URL and repo identifier.
    #[serde(rename = "HANDLE_REPO")]
    pub handle_repo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "REPOSITORY")]
    pub repository: RepositoryConfig,
    #[serde(rename = "PUBLICATION_WORKFLOW", default)]
    pub publication_workflow: Option<PublicationWorkflowConfig>,
    /// Recognised but unused outside this client's scope (message broker,
    /// Solr verification) — kept as opaque passthrough rather than parsed
    /// structs, since those collaborators are out of scope.
    #[serde(rename = "MESSAGE_BROKER", default)]
    pub message_broker: Option<serde_json::Value>,
    #[serde(rename = "SOLR", default)]
    pub solr: Option<serde_json::Value>,
}

impl Config {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let substituted = envsubst(&raw);
        let config: Config = serde_yaml::from_str(&substituted)?;
        Ok(config)
    }
}

/// Substitutes `${NAME}` occurrences in `input` with the value of the
/// environment variable `NAME`; a missing variable is left in the text
/// literally, with a warning logged (never an error), matching
/// `utils.py::envsubst`.
pub fn envsubst(input: &str) -> String {
    let env: HashMap<String, String> = std::env::vars().collect();
    envsubst_with(input, &env)
}

fn envsubst_with(input: &str, env: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }
        if chars.peek().map(|(_, c)| *c) != Some('{') {
            output.push(c);
            continue;
        }
        chars.next(); // consume '{'
        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            name.push(c);
        }
        if !closed {
            output.push_str("${");
            output.push_str(&name);
            continue;
        }
        match env.get(&name) {
            Some(value) => output.push_str(value),
            None => {
                tracing::warn!(variable = %name, "environment variable not set, leaving literal");
                output.push_str("${");
                output.push_str(&name);
                output.push('}');
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envsubst_replaces_known_variable() {
        let mut env = HashMap::new();
        env.insert("HOST".to_string(), "repo.example.org".to_string());
        assert_eq!(envsubst_with("http://${HOST}/rest", &env), "http://repo.example.org/rest");
    }

    #[test]
    fn test_envsubst_leaves_unknown_variable_literal() {
        let env = HashMap::new();
        assert_eq!(envsubst_with("${MISSING}", &env), "${MISSING}");
    }

    #[test]
    fn test_envsubst_ignores_plain_dollar_sign() {
        let env = HashMap::new();
        assert_eq!(envsubst_with("$5.00", &env), "$5.00");
    }

    #[test]
    fn test_load_parses_repository_section() {
        let dir = tempdir_for_test();
        let path = dir.join("config.yml");
        std::fs::write(
            &path,
            "REPOSITORY:\n  REST_ENDPOINT: http://localhost:8080/rest\n  RELPATH: /\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.repository.rest_endpoint, "http://localhost:8080/rest");
        std::fs::remove_dir_all(dir).ok();
    }

    fn tempdir_for_test() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ldprepo-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
