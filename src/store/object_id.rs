//! Object Identifier Module
//!
//! Store-native 12-byte identifiers, rendered as 24 hex characters.

use std::fmt;
use std::str::FromStr;

use bson::oid;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Length of an identifier in bytes.
pub const OBJECT_ID_LEN: usize = 12;

// == Object Id ==
/// Unique document identifier assigned by the store.
///
/// Wraps the BSON object id so that JSON bodies and cache payloads carry the
/// plain hex string instead of the extended-JSON `{"$oid": ..}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(oid::ObjectId);

/// Returned when a string is not a well-formed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidObjectId(pub String);

impl fmt::Display for InvalidObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid object id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidObjectId {}

impl ObjectId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(oid::ObjectId::new())
    }

    /// Parses exactly 24 hex characters, in either case.
    pub fn parse_str(input: &str) -> Result<Self, InvalidObjectId> {
        if input.len() != OBJECT_ID_LEN * 2 {
            return Err(InvalidObjectId(input.to_string()));
        }

        oid::ObjectId::parse_str(input)
            .map(Self)
            .map_err(|_| InvalidObjectId(input.to_string()))
    }

    /// Returns true if `input` would parse as an identifier.
    pub fn is_valid(input: &str) -> bool {
        Self::parse_str(input).is_ok()
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<oid::ObjectId> for ObjectId {
    fn from(id: oid::ObjectId) -> Self {
        Self(id)
    }
}

impl From<ObjectId> for oid::ObjectId {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(de::Error::custom)
    }
}
