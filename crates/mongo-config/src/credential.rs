// credential.rs - parsing of credential descriptor strings into driver credentials
//
// Descriptor shapes:
//   username@source:password                     password based, negotiated SCRAM
//   SCRAM-SHA-1:username@source:password         password based, explicit mechanism
//   SCRAM-SHA-256:username@source:password
//   MONGODB-X509:subject                         certificate based, source $external
//   PLAIN:username@source:password               plain text (LDAP)
//   GSSAPI:principal[;NAME=value]*               kerberos, source $external
//   MONGODB-CR:username@source:password          legacy, read as negotiated SCRAM
//
// Whitespace around the whole descriptor is ignored.

use mongodb::{
    bson::{Bson, Document},
    options::{AuthMechanism, Credential},
};
use serde::Deserialize;
use std::{fmt, str::FromStr};

pub const EXTERNAL_SOURCE: &str = "$external";
pub const SERVICE_NAME: &str = "SERVICE_NAME";
pub const CANONICALIZE_HOST_NAME: &str = "CANONICALIZE_HOST_NAME";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential descriptor is empty")]
    Empty,
    #[error("credential for \"{0}\" is missing a \":password\" part")]
    MissingPassword(String),
    #[error("credential \"{0}\" is missing an \"@source\" part")]
    MissingSource(String),
    #[error("credential has an empty {0}")]
    EmptyField(&'static str),
    #[error("mechanism property \"{0}\" is not of the form NAME=value")]
    MalformedProperty(String),
    #[error("mechanism property \"{0}\" is given more than once")]
    DuplicateProperty(String),
    #[error("mechanism property CANONICALIZE_HOST_NAME must be true or false (got \"{0}\")")]
    CanonicalizeHostName(String),
}

/// Password material that never shows up in debug or display output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Secret(secret.to_string())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Explicit SCRAM variants a password credential may pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScramMechanism {
    Sha1,
    Sha256,
}

impl From<ScramMechanism> for AuthMechanism {
    fn from(mechanism: ScramMechanism) -> Self {
        match mechanism {
            ScramMechanism::Sha1 => AuthMechanism::ScramSha1,
            ScramMechanism::Sha256 => AuthMechanism::ScramSha256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanismProperty {
    Str(String),
    Bool(bool),
}

/// Parsed authentication material, one variant per supported mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum CredentialDescriptor {
    Password {
        mechanism: Option<ScramMechanism>,
        username: String,
        source: String,
        password: Secret,
    },
    X509 {
        subject: String,
    },
    Plain {
        username: String,
        source: String,
        password: Secret,
    },
    Gssapi {
        principal: String,
        properties: Vec<(String, MechanismProperty)>,
    },
}

impl CredentialDescriptor {
    /// Name of the mechanism as the server knows it.
    pub fn mechanism_name(&self) -> &'static str {
        match self {
            CredentialDescriptor::Password { mechanism, .. } => match mechanism {
                None => "SCRAM",
                Some(ScramMechanism::Sha1) => "SCRAM-SHA-1",
                Some(ScramMechanism::Sha256) => "SCRAM-SHA-256",
            },
            CredentialDescriptor::X509 { .. } => "MONGODB-X509",
            CredentialDescriptor::Plain { .. } => "PLAIN",
            CredentialDescriptor::Gssapi { .. } => "GSSAPI",
        }
    }

    pub fn username(&self) -> &str {
        match self {
            CredentialDescriptor::Password { username, .. }
            | CredentialDescriptor::Plain { username, .. } => username,
            CredentialDescriptor::X509 { subject } => subject,
            CredentialDescriptor::Gssapi { principal, .. } => principal,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            CredentialDescriptor::Password { source, .. }
            | CredentialDescriptor::Plain { source, .. } => source,
            CredentialDescriptor::X509 { .. } | CredentialDescriptor::Gssapi { .. } => {
                EXTERNAL_SOURCE
            }
        }
    }

    pub fn property(&self, name: &str) -> Option<&MechanismProperty> {
        match self {
            CredentialDescriptor::Gssapi { properties, .. } => properties
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

fn parse_password_shape(payload: &str) -> Result<(String, String, Secret), CredentialError> {
    // The identity ends at the first colon, the password may contain anything
    let (identity, password) = payload
        .split_once(':')
        .ok_or_else(|| CredentialError::MissingPassword(payload.to_string()))?;
    let (username, source) = identity
        .rsplit_once('@')
        .ok_or_else(|| CredentialError::MissingSource(identity.to_string()))?;

    if username.is_empty() {
        return Err(CredentialError::EmptyField("username"));
    }
    if source.is_empty() {
        return Err(CredentialError::EmptyField("source"));
    }
    if password.is_empty() {
        return Err(CredentialError::EmptyField("password"));
    }

    Ok((username.to_string(), source.to_string(), password.into()))
}

fn parse_gssapi(payload: &str) -> Result<CredentialDescriptor, CredentialError> {
    let mut parts = payload.split(';');
    let principal = parts.next().unwrap_or_default();
    if principal.is_empty() {
        return Err(CredentialError::EmptyField("principal"));
    }

    let mut properties: Vec<(String, MechanismProperty)> = Vec::new();
    for part in parts {
        let (name, value) = part
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| CredentialError::MalformedProperty(part.to_string()))?;
        if properties.iter().any(|(key, _)| key == name) {
            return Err(CredentialError::DuplicateProperty(name.to_string()));
        }

        let value = if name == CANONICALIZE_HOST_NAME {
            match value.to_ascii_lowercase().as_str() {
                "true" => MechanismProperty::Bool(true),
                "false" => MechanismProperty::Bool(false),
                _ => return Err(CredentialError::CanonicalizeHostName(value.to_string())),
            }
        } else {
            MechanismProperty::Str(value.to_string())
        };
        properties.push((name.to_string(), value));
    }

    Ok(CredentialDescriptor::Gssapi {
        principal: principal.to_string(),
        properties,
    })
}

impl FromStr for CredentialDescriptor {
    type Err = CredentialError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(CredentialError::Empty);
        }

        // A leading mechanism name selects the shape, anything else is username@source:password
        let (prefix, payload) = descriptor.split_once(':').unwrap_or((descriptor, ""));
        match prefix.to_ascii_uppercase().as_str() {
            "SCRAM-SHA-1" | "SCRAM-SHA-256" => {
                let mechanism = if prefix.eq_ignore_ascii_case("SCRAM-SHA-1") {
                    ScramMechanism::Sha1
                } else {
                    ScramMechanism::Sha256
                };
                let (username, source, password) = parse_password_shape(payload)?;
                Ok(CredentialDescriptor::Password {
                    mechanism: Some(mechanism),
                    username,
                    source,
                    password,
                })
            }
            "MONGODB-X509" => {
                if payload.is_empty() {
                    return Err(CredentialError::EmptyField("subject"));
                }
                Ok(CredentialDescriptor::X509 {
                    subject: payload.to_string(),
                })
            }
            "PLAIN" => {
                let (username, source, password) = parse_password_shape(payload)?;
                Ok(CredentialDescriptor::Plain {
                    username,
                    source,
                    password,
                })
            }
            "GSSAPI" => parse_gssapi(payload),
            // Servers no longer speak MONGODB-CR, the driver negotiates SCRAM instead
            "MONGODB-CR" => {
                let (username, source, password) = parse_password_shape(payload)?;
                Ok(CredentialDescriptor::Password {
                    mechanism: None,
                    username,
                    source,
                    password,
                })
            }
            _ => {
                let (username, source, password) = parse_password_shape(descriptor)?;
                Ok(CredentialDescriptor::Password {
                    mechanism: None,
                    username,
                    source,
                    password,
                })
            }
        }
    }
}

impl TryFrom<String> for CredentialDescriptor {
    type Error = CredentialError;

    fn try_from(descriptor: String) -> Result<Self, Self::Error> {
        descriptor.parse()
    }
}

impl fmt::Display for CredentialDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}@{}",
            self.mechanism_name(),
            self.username(),
            self.source()
        )
    }
}

impl From<&CredentialDescriptor> for Credential {
    fn from(descriptor: &CredentialDescriptor) -> Self {
        let mut credential = Credential::default();
        credential.username = Some(descriptor.username().to_string());
        credential.source = Some(descriptor.source().to_string());

        match descriptor {
            CredentialDescriptor::Password {
                mechanism,
                password,
                ..
            } => {
                credential.mechanism = mechanism.map(AuthMechanism::from);
                credential.password = Some(password.expose().to_string());
            }
            CredentialDescriptor::X509 { .. } => {
                credential.mechanism = Some(AuthMechanism::MongoDbX509);
            }
            CredentialDescriptor::Plain { password, .. } => {
                credential.mechanism = Some(AuthMechanism::Plain);
                credential.password = Some(password.expose().to_string());
            }
            CredentialDescriptor::Gssapi { properties, .. } => {
                credential.mechanism = Some(AuthMechanism::Gssapi);
                if !properties.is_empty() {
                    let mut document = Document::new();
                    for (name, value) in properties {
                        let value = match value {
                            MechanismProperty::Str(value) => Bson::String(value.clone()),
                            MechanismProperty::Bool(value) => Bson::Boolean(*value),
                        };
                        document.insert(name.clone(), value);
                    }
                    credential.mechanism_properties = Some(document);
                }
            }
        }

        credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_password_descriptor_with_negotiated_mechanism() {
        let descriptor: CredentialDescriptor = "nope@yep:maybe".parse().unwrap();
        assert_eq!(
            descriptor,
            CredentialDescriptor::Password {
                mechanism: None,
                username: "nope".to_string(),
                source: "yep".to_string(),
                password: "maybe".into(),
            }
        );

        let credential = Credential::from(&descriptor);
        assert_eq!(credential.username.as_deref(), Some("nope"));
        assert_eq!(credential.source.as_deref(), Some("yep"));
        assert_eq!(credential.password.as_deref(), Some("maybe"));
        assert!(credential.mechanism.is_none());
    }

    #[test]
    fn parses_legacy_cr_as_negotiated_password() {
        let descriptor: CredentialDescriptor = "MONGODB-CR:nope@yep:maybe".parse().unwrap();
        assert_eq!(
            descriptor,
            CredentialDescriptor::Password {
                mechanism: None,
                username: "nope".to_string(),
                source: "yep".to_string(),
                password: "maybe".into(),
            }
        );
        assert!(Credential::from(&descriptor).mechanism.is_none());
        assert_eq!(
            "mongodb-cr:nope@yep".parse::<CredentialDescriptor>(),
            Err(CredentialError::MissingPassword("nope@yep".to_string()))
        );
    }

    #[rstest]
    #[case(" nope@yep:maybe ")]
    #[case("\tnope@yep:maybe\n")]
    fn surrounding_whitespace_is_ignored(#[case] input: &str) {
        let descriptor: CredentialDescriptor = input.parse().unwrap();
        assert_eq!(descriptor.username(), "nope");
        assert_eq!(descriptor.source(), "yep");
        match descriptor {
            CredentialDescriptor::Password { password, .. } => assert_eq!(password.expose(), "maybe"),
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn password_keeps_colons_and_at_signs() {
        let descriptor: CredentialDescriptor =
            "ops@example.com@admin:p@ss:word".parse().unwrap();
        assert_eq!(descriptor.username(), "ops@example.com");
        assert_eq!(descriptor.source(), "admin");
        match descriptor {
            CredentialDescriptor::Password { password, .. } => {
                assert_eq!(password.expose(), "p@ss:word")
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[rstest]
    #[case("SCRAM-SHA-1:app@admin:secret", ScramMechanism::Sha1)]
    #[case("scram-sha-256:app@admin:secret", ScramMechanism::Sha256)]
    fn parses_explicit_scram_mechanism(#[case] input: &str, #[case] expected: ScramMechanism) {
        let descriptor: CredentialDescriptor = input.parse().unwrap();
        match &descriptor {
            CredentialDescriptor::Password { mechanism, .. } => {
                assert_eq!(*mechanism, Some(expected))
            }
            other => panic!("unexpected variant {other:?}"),
        }
        assert_eq!(
            Credential::from(&descriptor).mechanism,
            Some(AuthMechanism::from(expected))
        );
    }

    #[test]
    fn parses_x509_subject_with_external_source() {
        let descriptor: CredentialDescriptor =
            "MONGODB-X509:cn=blee,dc=somewhere".parse().unwrap();
        assert_eq!(
            descriptor,
            CredentialDescriptor::X509 {
                subject: "cn=blee,dc=somewhere".to_string()
            }
        );

        let credential = Credential::from(&descriptor);
        assert_eq!(credential.username.as_deref(), Some("cn=blee,dc=somewhere"));
        assert_eq!(credential.source.as_deref(), Some("$external"));
        assert!(credential.password.is_none());
        assert_eq!(credential.mechanism, Some(AuthMechanism::MongoDbX509));
    }

    #[test]
    fn parses_plain_descriptor() {
        let descriptor: CredentialDescriptor = "PLAIN:me@yeppers:excellent".parse().unwrap();
        let credential = Credential::from(&descriptor);
        assert_eq!(credential.username.as_deref(), Some("me"));
        assert_eq!(credential.source.as_deref(), Some("yeppers"));
        assert_eq!(credential.password.as_deref(), Some("excellent"));
        assert_eq!(credential.mechanism, Some(AuthMechanism::Plain));
    }

    #[test]
    fn gssapi_properties_round_trip() {
        let descriptor: CredentialDescriptor =
            "GSSAPI:user;SERVICE_NAME=custom;CANONICALIZE_HOST_NAME=true"
                .parse()
                .unwrap();
        assert_eq!(descriptor.source(), "$external");
        assert_eq!(
            descriptor.property(SERVICE_NAME),
            Some(&MechanismProperty::Str("custom".to_string()))
        );
        assert_eq!(
            descriptor.property(CANONICALIZE_HOST_NAME),
            Some(&MechanismProperty::Bool(true))
        );

        let credential = Credential::from(&descriptor);
        assert_eq!(credential.username.as_deref(), Some("user"));
        assert_eq!(credential.source.as_deref(), Some("$external"));
        assert!(credential.password.is_none());
        assert_eq!(credential.mechanism, Some(AuthMechanism::Gssapi));

        let properties = credential.mechanism_properties.unwrap();
        assert_eq!(properties.get_str(SERVICE_NAME).unwrap(), "custom");
        assert!(properties.get_bool(CANONICALIZE_HOST_NAME).unwrap());
    }

    #[test]
    fn gssapi_without_properties_has_no_property_document() {
        let descriptor: CredentialDescriptor = "GSSAPI:user@REALM".parse().unwrap();
        assert_eq!(descriptor.username(), "user@REALM");
        assert!(Credential::from(&descriptor).mechanism_properties.is_none());
    }

    #[rstest]
    #[case("", CredentialError::Empty)]
    #[case("nope@yep", CredentialError::MissingPassword("nope@yep".to_string()))]
    #[case("nope:maybe", CredentialError::MissingSource("nope".to_string()))]
    #[case("@yep:maybe", CredentialError::EmptyField("username"))]
    #[case("nope@:maybe", CredentialError::EmptyField("source"))]
    #[case("nope@yep:", CredentialError::EmptyField("password"))]
    #[case("PLAIN:me@yeppers", CredentialError::MissingPassword("me@yeppers".to_string()))]
    #[case("MONGODB-X509:", CredentialError::EmptyField("subject"))]
    #[case("GSSAPI:", CredentialError::EmptyField("principal"))]
    #[case("GSSAPI:user;SERVICE_NAME", CredentialError::MalformedProperty("SERVICE_NAME".to_string()))]
    #[case("GSSAPI:user;=x", CredentialError::MalformedProperty("=x".to_string()))]
    #[case("GSSAPI:user;A=1;A=2", CredentialError::DuplicateProperty("A".to_string()))]
    #[case("GSSAPI:user;CANONICALIZE_HOST_NAME=yes", CredentialError::CanonicalizeHostName("yes".to_string()))]
    fn rejects_malformed_descriptors(#[case] input: &str, #[case] expected: CredentialError) {
        assert_eq!(input.parse::<CredentialDescriptor>().unwrap_err(), expected);
    }

    #[test]
    fn debug_and_display_hide_passwords() {
        let descriptor: CredentialDescriptor = "nope@yep:hunter2".parse().unwrap();
        assert!(!format!("{descriptor:?}").contains("hunter2"));
        assert_eq!(descriptor.to_string(), "SCRAM nope@yep");
    }
}
