//! Compiler configuration
//!
//! Everything the pipeline can be tuned with. A config file is optional; any
//! key it leaves out keeps its default. TOML and YAML are both accepted,
//! chosen by file extension.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How string literals are written into shell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralPolicy {
    /// Shell-quote anything that is not a plain word
    #[default]
    Escape,
    /// Fail on shell metacharacters; emit the rest as-is
    Reject,
    /// Emit the text untouched
    Verbatim,
}

impl LiteralPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Escape => "escape",
            Self::Reject => "reject",
            Self::Verbatim => "verbatim",
        }
    }
}

impl FromStr for LiteralPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "escape" => Ok(Self::Escape),
            "reject" => Ok(Self::Reject),
            "verbatim" => Ok(Self::Verbatim),
            other => Err(format!(
                "unknown literal policy '{}' (expected escape, reject or verbatim)",
                other
            )),
        }
    }
}

/// Which top-level grammar the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// Exactly one `def name() { ... }`
    #[default]
    Function,
    /// A bare list of statements
    Statements,
}

impl FromStr for Grammar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "statements" => Ok(Self::Statements),
            other => Err(format!(
                "unknown grammar '{}' (expected function or statements)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub grammar: Grammar,
    /// Cluster CLI the generated commands call
    pub cli: String,
    /// Shell started by bash_into
    pub shell: String,
    /// Prefix for each line of a function body
    pub indent: String,
    pub literals: LiteralPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            grammar: Grammar::Function,
            cli: "kubectl".to_string(),
            shell: "/bin/bash".to_string(),
            indent: "  ".to_string(),
            literals: LiteralPolicy::Escape,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot write TOML config: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported config format for {path} (expected .toml, .yaml or .yml)")]
    UnsupportedFormat { path: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl CompilerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty YAML document means "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The config as a TOML document that `from_toml_str` reads back.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Load a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(ConfigError::UnsupportedFormat { path: display }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cli.trim().is_empty() {
            return Err(ConfigError::Invalid("cli must not be empty".to_string()));
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::Invalid("shell must not be empty".to_string()));
        }
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::Invalid(
                "indent may only contain spaces and tabs".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.cli, "kubectl");
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.grammar, Grammar::Function);
        assert_eq!(config.literals, LiteralPolicy::Escape);
    }

    #[test]
    fn test_write_toml() {
        let config = CompilerConfig {
            grammar: Grammar::Statements,
            cli: "oc".to_string(),
            literals: LiteralPolicy::Verbatim,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("grammar = \"statements\""));
        assert!(text.contains("literals = \"verbatim\""));
        assert_eq!(CompilerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CompilerConfig::from_toml_str("cli = \"oc\"\nliterals = \"reject\"\n").unwrap();
        assert_eq!(config.cli, "oc");
        assert_eq!(config.literals, LiteralPolicy::Reject);
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.indent, "  ");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(CompilerConfig::from_toml_str("").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_yaml() {
        let config = CompilerConfig::from_yaml_str("grammar: statements\nshell: /bin/sh\n").unwrap();
        assert_eq!(config.grammar, Grammar::Statements);
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(CompilerConfig::from_yaml_str("").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CompilerConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validation() {
        let err = CompilerConfig::from_toml_str("cli = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = CompilerConfig::from_toml_str("indent = \"--\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("VERBATIM".parse::<LiteralPolicy>().unwrap(), LiteralPolicy::Verbatim);
        assert!("loose".parse::<LiteralPolicy>().is_err());
        assert_eq!("statements".parse::<Grammar>().unwrap(), Grammar::Statements);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let path = std::env::temp_dir().join("kubescript-config-test.ini");
        std::fs::write(&path, "cli = oc").unwrap();
        let err = CompilerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompilerConfig::load(Path::new("/nonexistent/kubescript.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
