use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between endpoint and generation in the parsable form.
const GENERATION_SEPARATOR: char = '@';

/// Identity of one silo (cluster node).
///
/// Parsed from the runtime's parsable string form `endpoint@generation`,
/// e.g. `10.0.0.1:11111@296354752`. The generation is optional so that
/// symbolic node names such as `node-7` are accepted as-is.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct SiloAddress {
    endpoint: String,
    generation: Option<i32>,
}

impl SiloAddress {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, generation: Option<i32>) -> Self {
        Self {
            endpoint: endpoint.into(),
            generation,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn generation(&self) -> Option<i32> {
        self.generation
    }
}

/// Error returned when a silo address string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Nothing before the generation separator (or an empty string)
    EmptyEndpoint,
    /// Endpoint contains whitespace or control characters
    InvalidEndpoint(String),
    /// Text after `@` is not a 32-bit integer
    InvalidGeneration(String),
}

impl Display for AddressParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddressParseError::EmptyEndpoint => write!(f, "silo address has an empty endpoint"),
            AddressParseError::InvalidEndpoint(e) => {
                write!(f, "silo address endpoint '{e}' contains invalid characters")
            }
            AddressParseError::InvalidGeneration(g) => {
                write!(f, "silo address generation '{g}' is not a 32-bit integer")
            }
        }
    }
}

impl std::error::Error for AddressParseError {}

impl FromStr for SiloAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (endpoint, generation) = match s.rsplit_once(GENERATION_SEPARATOR) {
            Some((endpoint, gen)) => {
                let gen = gen
                    .parse::<i32>()
                    .map_err(|_| AddressParseError::InvalidGeneration(gen.to_string()))?;
                (endpoint, Some(gen))
            }
            None => (s, None),
        };

        if endpoint.is_empty() {
            return Err(AddressParseError::EmptyEndpoint);
        }
        if endpoint
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(AddressParseError::InvalidEndpoint(endpoint.to_string()));
        }

        Ok(Self::new(endpoint, generation))
    }
}

impl Display for SiloAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.generation {
            Some(gen) => write!(f, "{}{GENERATION_SEPARATOR}{gen}", self.endpoint),
            None => f.write_str(&self.endpoint),
        }
    }
}

impl Serialize for SiloAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SiloAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<SiloAddress>().map_err(serde::de::Error::custom)
    }
}
