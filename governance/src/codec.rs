//! bincode encoding of the values kept in the referendum store.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ReferendumError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ReferendumError> {
    bincode::serialize(value).map_err(|e| ReferendumError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReferendumError> {
    bincode::deserialize(bytes).map_err(|e| ReferendumError::Serialization(e.to_string()))
}
