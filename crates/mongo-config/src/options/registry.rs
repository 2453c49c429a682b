// options/registry.rs - table of known client options and their typed setters

use mongodb::options::ClientOptions;
use std::time::Duration;

/// The primitive a raw option string must parse as.
#[derive(Debug, Clone, Copy)]
pub enum Setter {
    Int(fn(&mut ClientOptions, u32)),
    Bool(fn(&mut ClientOptions, bool)),
    Str(fn(&mut ClientOptions, String)),
    Millis(fn(&mut ClientOptions, Duration)),
}

impl Setter {
    pub fn expected(&self) -> &'static str {
        match self {
            Setter::Int(_) => "a non-negative integer",
            Setter::Bool(_) => "true or false",
            Setter::Str(_) => "a string",
            Setter::Millis(_) => "a duration in milliseconds",
        }
    }

    /// Parse the raw value, or report why it does not fit this setter.
    pub fn check(&self, value: &str) -> Result<(), &'static str> {
        let parsed = match self {
            Setter::Int(_) => value.trim().parse::<u32>().is_ok(),
            Setter::Bool(_) => parse_bool(value).is_some(),
            Setter::Str(_) => true,
            Setter::Millis(_) => value.trim().parse::<u64>().is_ok(),
        };
        if parsed {
            Ok(())
        } else {
            Err(self.expected())
        }
    }

    pub fn apply(&self, options: &mut ClientOptions, value: &str) -> Result<(), &'static str> {
        match self {
            Setter::Int(set) => {
                let value = value.trim().parse().map_err(|_| self.expected())?;
                set(options, value);
            }
            Setter::Bool(set) => set(options, parse_bool(value).ok_or(self.expected())?),
            Setter::Str(set) => set(options, value.to_string()),
            Setter::Millis(set) => {
                let millis = value.trim().parse().map_err(|_| self.expected())?;
                set(options, Duration::from_millis(millis));
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Option name (connection string spelling first, then legacy aliases), the driver field
/// it sets, and its setter. Aliases share a field.
pub const OPTIONS: &[(&str, &str, Setter)] = &[
    ("appName", "app_name", Setter::Str(|o, v| o.app_name = Some(v))),
    ("description", "app_name", Setter::Str(|o, v| o.app_name = Some(v))),
    ("replicaSet", "repl_set_name", Setter::Str(|o, v| o.repl_set_name = Some(v))),
    ("requiredReplicaSetName", "repl_set_name", Setter::Str(|o, v| o.repl_set_name = Some(v))),
    ("defaultDatabase", "default_database", Setter::Str(|o, v| o.default_database = Some(v))),
    ("maxPoolSize", "max_pool_size", Setter::Int(|o, v| o.max_pool_size = Some(v))),
    ("connectionsPerHost", "max_pool_size", Setter::Int(|o, v| o.max_pool_size = Some(v))),
    ("minPoolSize", "min_pool_size", Setter::Int(|o, v| o.min_pool_size = Some(v))),
    ("minConnectionsPerHost", "min_pool_size", Setter::Int(|o, v| o.min_pool_size = Some(v))),
    ("connectTimeoutMS", "connect_timeout", Setter::Millis(|o, v| o.connect_timeout = Some(v))),
    ("connectTimeout", "connect_timeout", Setter::Millis(|o, v| o.connect_timeout = Some(v))),
    ("serverSelectionTimeoutMS", "server_selection_timeout", Setter::Millis(|o, v| o.server_selection_timeout = Some(v))),
    ("serverSelectionTimeout", "server_selection_timeout", Setter::Millis(|o, v| o.server_selection_timeout = Some(v))),
    ("maxWaitTime", "server_selection_timeout", Setter::Millis(|o, v| o.server_selection_timeout = Some(v))),
    ("heartbeatFrequencyMS", "heartbeat_freq", Setter::Millis(|o, v| o.heartbeat_freq = Some(v))),
    ("heartbeatFrequency", "heartbeat_freq", Setter::Millis(|o, v| o.heartbeat_freq = Some(v))),
    ("localThresholdMS", "local_threshold", Setter::Millis(|o, v| o.local_threshold = Some(v))),
    ("acceptableLatencyDifference", "local_threshold", Setter::Millis(|o, v| o.local_threshold = Some(v))),
    ("maxIdleTimeMS", "max_idle_time", Setter::Millis(|o, v| o.max_idle_time = Some(v))),
    ("maxConnectionIdleTime", "max_idle_time", Setter::Millis(|o, v| o.max_idle_time = Some(v))),
    ("directConnection", "direct_connection", Setter::Bool(|o, v| o.direct_connection = Some(v))),
    ("retryReads", "retry_reads", Setter::Bool(|o, v| o.retry_reads = Some(v))),
    ("retryWrites", "retry_writes", Setter::Bool(|o, v| o.retry_writes = Some(v))),
    ("loadBalanced", "load_balanced", Setter::Bool(|o, v| o.load_balanced = Some(v))),
];

pub fn lookup(name: &str) -> Option<&'static Setter> {
    OPTIONS
        .iter()
        .find(|(key, _, _)| *key == name)
        .map(|(_, _, setter)| setter)
}

/// Driver field an option name sets.
pub fn field(name: &str) -> Option<&'static str> {
    OPTIONS
        .iter()
        .find(|(key, _, _)| *key == name)
        .map(|(_, field, _)| *field)
}
