// error.rs - error types raised while loading, validating and building a client

use std::fmt;

use crate::address::AddressError;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid server address: {0}")]
    Address(#[from] AddressError),
    #[error("Configuration failed validation: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Reading configuration file failed with error: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing YAML configuration failed with error: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Parsing JSON configuration failed with error: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported configuration file extension: {0}")]
    UnsupportedFormat(String),
    #[error("Creating mongo client failed with error: {source}")]
    Client {
        #[source]
        source: mongodb::error::Error,
    },
}

/// A single violated configuration constraint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(".options.readPreference must be one of \"primary\", \"primaryPreferred\", \"secondary\", \"secondaryPreferred\", or \"nearest\" (got \"{0}\")")]
    ReadPreference(String),
    #[error(".options.writeConcern must name a known write concern, case insensitive (got \"{0}\")")]
    WriteConcern(String),
    #[error(".options.dbDecoderFactory must be one of \"lazy\", \"lazy-writeable\", or \"default\" (got \"{0}\")")]
    DecoderFactory(String),
    #[error(".credentials may hold at most one credential (got {0})")]
    TooManyCredentials(usize),
    #[error(".options.{} all set {field}, keep only one of them", .keys.join(", .options."))]
    ConflictingOptions { field: &'static str, keys: Vec<String> },
    #[error(".options.{0} is not a known client option")]
    UnknownOption(String),
    #[error(".options.{key} must be {expected} (got \"{value}\")")]
    OptionValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Every violation found by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
