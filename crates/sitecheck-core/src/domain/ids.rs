//! Domain identifiers (strongly-typed IDs).
//!
//! IDs are ULIDs behind a phantom-typed wrapper: `JobId` and `LocationId`
//! share one implementation but cannot be mixed up at compile time. Records
//! are created outside this core, so there is no generator here; we only
//! parse, compare, and display.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// Marker trait for each ID type.
///
/// Provides the prefix used by `Display` ("job-", "loc-").
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ID type.
///
/// `T` is `PhantomData`: zero-sized at runtime, but `Id<Job>` and
/// `Id<Location>` are distinct types to the compiler.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    _marker: PhantomData<T>,
}

// Serde passes through to the ULID so ids travel as plain 26-char
// strings, not a wrapper object. Hand-written to keep the marker type
// out of the serde bounds.
impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ulid.serialize(serializer)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ulid::deserialize(deserializer).map(Self::from_ulid)
    }
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = ulid::DecodeError;

    /// Parse the canonical 26-char ULID form. The display prefix is
    /// accepted and stripped so round-trips through `to_string` work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(s).map(Self::from_ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Marker type for jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Job {}

impl IdMarker for Job {
    fn prefix() -> &'static str {
        "job-"
    }
}

/// Marker type for locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {}

impl IdMarker for Location {
    fn prefix() -> &'static str {
        "loc-"
    }
}

/// Identifier of a Job (the unit of check-in / check-out).
pub type JobId = Id<Job>;

/// Identifier of a Location (owner of the on-site secret).
pub type LocationId = Id<Location>;
