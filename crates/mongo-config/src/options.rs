// options.rs - applies the string option map onto driver client options

use mongodb::options::ClientOptions;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

pub mod named;
pub mod registry;

use crate::error::ValidationError;
use named::{DecoderFactory, DB_DECODER_FACTORY_KEY, READ_PREFERENCE_KEY, WRITE_CONCERN_KEY};

pub type OptionMap = HashMap<String, String>;

/// Client options together with the settings the driver has no field for.
#[derive(Debug, Clone)]
pub struct AppliedOptions {
    pub client_options: ClientOptions,
    pub decoder_factory: DecoderFactory,
}

/// Check the three named options against their vocabularies.
pub fn check_named(options: &OptionMap) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(name) = options.get(READ_PREFERENCE_KEY) {
        if named::read_preference(name).is_none() {
            errors.push(ValidationError::ReadPreference(name.clone()));
        }
    }
    if let Some(name) = options.get(WRITE_CONCERN_KEY) {
        if named::write_concern(name).is_none() {
            errors.push(ValidationError::WriteConcern(name.clone()));
        }
    }
    if let Some(name) = options.get(DB_DECODER_FACTORY_KEY) {
        if name.parse::<DecoderFactory>().is_err() {
            errors.push(ValidationError::DecoderFactory(name.clone()));
        }
    }

    errors
}

/// Check every other option against the option table.
pub fn check_known(options: &OptionMap) -> Vec<ValidationError> {
    let mut keys: Vec<&String> = options.keys().collect();
    keys.sort();

    keys.into_iter()
        .filter(|key| !is_named(key))
        .filter_map(|key| {
            let value = &options[key];
            match registry::lookup(key) {
                None => Some(ValidationError::UnknownOption(key.clone())),
                Some(setter) => setter
                    .check(value)
                    .err()
                    .map(|expected| ValidationError::OptionValue {
                        key: key.clone(),
                        value: value.clone(),
                        expected,
                    }),
            }
        })
        .collect()
}

/// Reject option maps that set one driver field through more than one alias.
pub fn check_conflicts(options: &OptionMap) -> Vec<ValidationError> {
    let mut by_field: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for key in options.keys() {
        if let Some(field) = registry::field(key) {
            by_field.entry(field).or_default().push(key.clone());
        }
    }

    by_field
        .into_iter()
        .filter(|(_, keys)| keys.len() > 1)
        .map(|(field, mut keys)| {
            keys.sort();
            ValidationError::ConflictingOptions { field, keys }
        })
        .collect()
}

fn is_named(key: &str) -> bool {
    key == READ_PREFERENCE_KEY || key == WRITE_CONCERN_KEY || key == DB_DECODER_FACTORY_KEY
}

/// Populate `client_options` from an already validated option map.
///
/// Keys missing from the option table and values that do not parse are skipped with a
/// warning, so a permissive configuration never aborts here.
pub fn apply(options: &OptionMap, mut client_options: ClientOptions) -> AppliedOptions {
    let mut decoder_factory = DecoderFactory::default();

    let mut entries: Vec<(&String, &String)> = options.iter().collect();
    entries.sort();

    for (key, value) in entries {
        match key.as_str() {
            READ_PREFERENCE_KEY => match named::read_preference(value) {
                Some(criteria) => client_options.selection_criteria = Some(criteria),
                None => warn!("Ignoring unknown read preference: {}", value),
            },
            WRITE_CONCERN_KEY => match named::write_concern(value) {
                Some(concern) => client_options.write_concern = Some(concern),
                None => warn!("Ignoring unknown write concern: {}", value),
            },
            DB_DECODER_FACTORY_KEY => match value.parse() {
                Ok(factory) => decoder_factory = factory,
                Err(_) => warn!("Ignoring unknown decoder factory: {}", value),
            },
            _ => match registry::lookup(key) {
                Some(setter) => match setter.apply(&mut client_options, value) {
                    Ok(()) => debug!("Applied client option {}={}", key, value),
                    Err(expected) => warn!(
                        "Ignoring client option {}: expected {}, got \"{}\"",
                        key, expected, value
                    ),
                },
                None => warn!("Ignoring unknown client option: {}", key),
            },
        }
    }

    AppliedOptions {
        client_options,
        decoder_factory,
    }
}
