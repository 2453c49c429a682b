// options/named.rs - fixed vocabularies for read preference, write concern and decoder factory

use mongodb::options::{
    Acknowledgment, ReadPreference, ReadPreferenceOptions, SelectionCriteria, WriteConcern,
};
use std::{fmt, str::FromStr};

pub const READ_PREFERENCE_KEY: &str = "readPreference";
pub const WRITE_CONCERN_KEY: &str = "writeConcern";
pub const DB_DECODER_FACTORY_KEY: &str = "dbDecoderFactory";

pub const READ_PREFERENCE_NAMES: [&str; 5] = [
    "primary",
    "primaryPreferred",
    "secondary",
    "secondaryPreferred",
    "nearest",
];

/// Resolve a read preference by its exact name.
pub fn read_preference(name: &str) -> Option<SelectionCriteria> {
    let options = ReadPreferenceOptions::default();
    let preference = match name {
        "primary" => ReadPreference::Primary,
        "primaryPreferred" => ReadPreference::PrimaryPreferred { options },
        "secondary" => ReadPreference::Secondary { options },
        "secondaryPreferred" => ReadPreference::SecondaryPreferred { options },
        "nearest" => ReadPreference::Nearest { options },
        _ => return None,
    };
    Some(SelectionCriteria::ReadPreference(preference))
}

fn acknowledged_by(w: Acknowledgment, journal: bool) -> WriteConcern {
    let mut concern = WriteConcern::default();
    concern.w = Some(w);
    if journal {
        concern.journal = Some(true);
    }
    concern
}

/// Resolve a write concern from the named registry, ignoring case.
pub fn write_concern(name: &str) -> Option<WriteConcern> {
    let concern = match name.to_ascii_uppercase().as_str() {
        "ACKNOWLEDGED" | "SAFE" | "W1" => acknowledged_by(Acknowledgment::Nodes(1), false),
        "UNACKNOWLEDGED" | "NORMAL" | "NONE" | "ERRORS_IGNORED" => {
            acknowledged_by(Acknowledgment::Nodes(0), false)
        }
        "W2" | "REPLICAS_SAFE" | "REPLICA_ACKNOWLEDGED" => {
            acknowledged_by(Acknowledgment::Nodes(2), false)
        }
        "W3" => acknowledged_by(Acknowledgment::Nodes(3), false),
        "MAJORITY" => acknowledged_by(Acknowledgment::Majority, false),
        // The driver has no fsync flag, the journal covers durability
        "JOURNALED" | "JOURNAL_SAFE" | "FSYNCED" | "FSYNC_SAFE" => {
            acknowledged_by(Acknowledgment::Nodes(1), true)
        }
        _ => return None,
    };
    Some(concern)
}

/// How documents read through the client should be decoded by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderFactory {
    /// Keep raw BSON (`RawDocumentBuf`), decode fields on access.
    Lazy,
    /// Raw BSON that is converted to an owned `Document` before modification.
    LazyWriteable,
    /// Eager decoding into `Document`.
    #[default]
    Default,
}

impl DecoderFactory {
    pub fn name(&self) -> &'static str {
        match self {
            DecoderFactory::Lazy => "lazy",
            DecoderFactory::LazyWriteable => "lazy-writeable",
            DecoderFactory::Default => "default",
        }
    }
}

impl FromStr for DecoderFactory {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "lazy" => Ok(DecoderFactory::Lazy),
            "lazy-writeable" => Ok(DecoderFactory::LazyWriteable),
            "default" => Ok(DecoderFactory::Default),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for DecoderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
