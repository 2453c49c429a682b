// lib.rs - binds a declarative configuration block to a configured mongo client

pub mod address;
pub mod config;
pub mod credential;
pub mod error;
pub mod factory;
pub mod options;

pub use address::Endpoint;
pub use credential::CredentialDescriptor;
pub use error::{Error, ValidationError, ValidationErrors};
pub use factory::{Environment, MongoClientFactory, Standalone};
pub use options::{named::DecoderFactory, AppliedOptions, OptionMap};
