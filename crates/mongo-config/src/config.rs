// config.rs - loading a mongo client configuration block from YAML or JSON

use std::{fs, path::Path};
use tracing::debug;

use crate::{error::Error, factory::MongoClientFactory};

impl MongoClientFactory {
    /// Parse and validate a YAML configuration block.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        let factory: Self = serde_yaml::from_str(yaml).map_err(|source| Error::Yaml { source })?;
        factory.validate()?;
        Ok(factory)
    }

    /// Parse and validate a JSON configuration block.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let factory: Self = serde_json::from_str(json).map_err(|source| Error::Json { source })?;
        factory.validate()?;
        Ok(factory)
    }

    /// Read a configuration file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Loading mongo client configuration from {}", path.display());

        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let contents = fs::read_to_string(path).map_err(|source| Error::Read { source })?;

        match extension.as_str() {
            "yml" | "yaml" => Self::from_yaml_str(&contents),
            "json" => Self::from_json_str(&contents),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address::Endpoint, error::ValidationError};

    #[test]
    fn loads_yaml_block() {
        let factory = MongoClientFactory::from_yaml_str(
            "server: test\ncredentials:\n  - nope@yep:maybe\noptions:\n  connectTimeout: 20000\n",
        )
        .unwrap();

        assert_eq!(factory.server, Endpoint::new("test", 27017));
        assert_eq!(factory.credentials.len(), 1);
        assert_eq!(factory.options["connectTimeout"], "20000");
    }

    #[test]
    fn empty_options_block_is_allowed() {
        let factory = MongoClientFactory::from_yaml_str("options:\n").unwrap();
        assert!(factory.options.is_empty());
    }

    #[test]
    fn malformed_address_fails_while_parsing() {
        let err = MongoClientFactory::from_yaml_str("server: \"host:port\"\n").unwrap_err();
        match err {
            Error::Yaml { source } => assert!(source.to_string().contains("invalid port")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_credential_fails_while_parsing() {
        let err = MongoClientFactory::from_json_str(r#"{"credentials": ["nobody"]}"#).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn validation_runs_after_parsing() {
        let err =
            MongoClientFactory::from_yaml_str("options:\n  writeConcern: whenever\n").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn aliases_of_one_option_are_rejected_on_every_load() {
        for _ in 0..32 {
            let err = MongoClientFactory::from_json_str(
                r#"{"options": {"maxPoolSize": "10", "connectionsPerHost": "84"}}"#,
            )
            .unwrap_err();

            match err {
                Error::Validation(errors) => assert_eq!(
                    errors.errors(),
                    &[ValidationError::ConflictingOptions {
                        field: "max_pool_size",
                        keys: vec!["connectionsPerHost".to_string(), "maxPoolSize".to_string()],
                    }]
                ),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn null_option_values_are_skipped() {
        let factory =
            MongoClientFactory::from_yaml_str("options:\n  appName:\n  maxPoolSize: 8\n").unwrap();

        assert!(!factory.options.contains_key("appName"));
        assert_eq!(factory.options["maxPoolSize"], "8");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        fs::write(file.path(), "server = \"test\"").unwrap();

        let err = MongoClientFactory::from_path(file.path()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref extension) if extension == "toml"));
    }
}
