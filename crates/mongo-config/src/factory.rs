// factory.rs - the mongo client configuration block and the client it builds

use mongodb::{
    options::{ClientOptions, Credential, ServerAddress},
    Client,
};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::{
    address::Endpoint,
    credential::CredentialDescriptor,
    error::{Error, ValidationError, ValidationErrors},
    options::{
        self,
        named::{DecoderFactory, DB_DECODER_FACTORY_KEY},
        AppliedOptions, OptionMap,
    },
};

/// Lifecycle hooks of the application hosting the client.
pub trait Environment {
    /// Called once with every client built for this environment.
    fn manage(&self, _client: &Client) {
        debug!("Client is not registered with a lifecycle manager");
    }
}

/// An environment without lifecycle management.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

impl Environment for Standalone {}

/// Declared mongo client configuration: topology, credentials and tunable options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct MongoClientFactory {
    /// Single node, used when `servers` is empty.
    pub server: Endpoint,
    /// Replica set members in seed order.
    pub servers: Vec<Endpoint>,
    pub credentials: Vec<CredentialDescriptor>,
    #[serde(deserialize_with = "scalar_map")]
    pub options: OptionMap,
    /// Reject unknown option keys and unparsable values instead of ignoring them.
    pub strict_options: bool,
}

// Option values may be written as plain YAML/JSON scalars, they are kept as text
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Null,
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Str(value) => Some(value),
            Scalar::Int(value) => Some(value.to_string()),
            Scalar::UInt(value) => Some(value.to_string()),
            Scalar::Float(value) => Some(value.to_string()),
            Scalar::Bool(value) => Some(value.to_string()),
        }
    }
}

fn scalar_map<'de, D>(deserializer: D) -> Result<OptionMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Scalar>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value.into_string() {
            Some(value) => Some((key, value)),
            None => {
                warn!("Ignoring option {} without a value", key);
                None
            }
        })
        .collect())
}

impl MongoClientFactory {
    /// Run every validation and report all violations together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = options::check_named(&self.options);
        errors.extend(options::check_conflicts(&self.options));

        if self.credentials.len() > 1 {
            errors.push(ValidationError::TooManyCredentials(self.credentials.len()));
        }
        if self.strict_options {
            errors.extend(options::check_known(&self.options));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// The seed list the client connects to.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        if self.servers.is_empty() {
            vec![self.server.clone()]
        } else {
            self.servers.clone()
        }
    }

    /// Replace the configured topology with a single node.
    pub fn override_server(&mut self, address: &str) -> Result<(), Error> {
        self.server = address.parse()?;
        self.servers.clear();
        Ok(())
    }

    pub fn decoder_factory(&self) -> DecoderFactory {
        self.options
            .get(DB_DECODER_FACTORY_KEY)
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }

    /// Resolve hosts, credential and options without creating a client.
    pub fn client_options(&self) -> Result<AppliedOptions, Error> {
        self.validate()?;

        let mut client_options = ClientOptions::default();
        client_options.hosts = self
            .endpoints()
            .into_iter()
            .map(ServerAddress::from)
            .collect();
        client_options.credential = self.credentials.first().map(Credential::from);

        debug!(
            "Resolved {} host(s), credential: {}",
            client_options.hosts.len(),
            self.credentials
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(options::apply(&self.options, client_options))
    }

    /// Validate the configuration and create the client. Must run inside a Tokio runtime.
    pub fn build<E>(&self, environment: &E) -> Result<Client, Error>
    where
        E: Environment + ?Sized,
    {
        let applied = self.client_options()?;
        let hosts: Vec<String> = applied
            .client_options
            .hosts
            .iter()
            .map(ToString::to_string)
            .collect();

        let client = Client::with_options(applied.client_options)
            .map_err(|source| Error::Client { source })?;
        info!("Created mongo client for {}", hosts.join(","));

        environment.manage(&client);
        Ok(client)
    }
}
