//! Request and response bodies of the HTTP surface.
//!
//! Numeric request fields accept a JSON number or a numeric string
//! (`1024` or `"1024"`). Modes accept an octal digit string (`"644"`) or a
//! number whose decimal digits are read as octal (`644`).

use serde::{Deserialize, Deserializer, Serialize};
use shmgate_segment::{IpcKey, Mode, SegmentMetadata, ShmId, ShmResult};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Deserialize a number given either as a JSON number or as a string.
pub fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Permission bits as sent by clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ModeField {
    /// Octal digits as a number, e.g. `644`
    Digits(u64),
    /// Octal digit string, e.g. `"644"` or `"0o644"`
    Text(String),
}

impl ModeField {
    /// Parse into permission bits.
    pub fn to_mode(&self) -> ShmResult<Mode> {
        match self {
            Self::Digits(value) => Mode::from_octal_digits(*value),
            Self::Text(text) => Mode::from_octal_str(text),
        }
    }
}

/// `POST /create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// Caller key
    #[serde(deserialize_with = "lenient_number")]
    pub shm_key: IpcKey,
    /// Segment size in bytes
    #[serde(deserialize_with = "lenient_number")]
    pub shm_segsz: usize,
    /// Permission bits
    pub mode: ModeField,
}

/// Reply to `POST /create`; both fields are strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateResponse {
    /// Caller key, echoed
    pub shm_key: String,
    /// Identifier assigned by the OS
    pub shm_shmid: String,
}

/// `PUT /set/{key}/{shmid}`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// New owner user id
    #[serde(deserialize_with = "lenient_number")]
    pub uid: u32,
    /// New owner group id
    #[serde(deserialize_with = "lenient_number")]
    pub gid: u32,
    /// New permission bits
    pub mode: ModeField,
}

/// `POST /write/{key}/{shmid}`
#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    /// Text stored NUL-terminated at offset 0
    pub data: String,
}

/// Reply to `GET /read/{key}/{shmid}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadResponse {
    /// Segment content up to the first NUL byte
    pub data: String,
}

/// Reply to operations without a result value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoneResponse {
    /// Always `"done"`
    pub op: String,
}

impl DoneResponse {
    /// The single success body.
    pub fn done() -> Self {
        Self {
            op: "done".to_string(),
        }
    }
}

/// Reply to `GET /stat/{key}/{shmid}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatResponse {
    pub shm_key: IpcKey,
    pub shm_shmid: i32,
    pub uid: u32,
    pub gid: u32,
    pub cuid: u32,
    pub cgid: u32,
    /// Three octal digits read as a decimal number (`0o644` → `644`)
    pub mode: u32,
    pub shm_segsz: usize,
    pub shm_lpid: i32,
    pub shm_cpid: i32,
    pub shm_nattch: u64,
    pub shm_atime: i64,
    pub shm_dtime: i64,
    pub shm_ctime: i64,
}

impl StatResponse {
    /// Flatten a metadata snapshot into the wire shape.
    pub fn new(key: IpcKey, id: ShmId, meta: &SegmentMetadata) -> Self {
        Self {
            shm_key: key,
            shm_shmid: id.raw(),
            uid: meta.owner_uid,
            gid: meta.owner_gid,
            cuid: meta.creator_uid,
            cgid: meta.creator_gid,
            mode: meta.mode.as_octal_digits(),
            shm_segsz: meta.size_bytes,
            shm_lpid: meta.last_attach_pid,
            shm_cpid: meta.creator_pid,
            shm_nattch: meta.attach_count,
            shm_atime: meta.last_attach_time,
            shm_dtime: meta.last_detach_time,
            shm_ctime: meta.last_change_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_strings_and_numbers() {
        let from_numbers: CreateRequest =
            serde_json::from_str(r#"{"shm_key": 5678, "shm_segsz": 1024, "mode": 644}"#).unwrap();
        let from_strings: CreateRequest =
            serde_json::from_str(r#"{"shm_key": "5678", "shm_segsz": "1024", "mode": "644"}"#)
                .unwrap();

        for request in [from_numbers, from_strings] {
            assert_eq!(request.shm_key, 5678);
            assert_eq!(request.shm_segsz, 1024);
            assert_eq!(request.mode.to_mode().unwrap().bits(), 0o644);
        }
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        let result: Result<SetRequest, _> =
            serde_json::from_str(r#"{"uid": "root", "gid": 0, "mode": "600"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_mode_digits_rejected() {
        let request: SetRequest =
            serde_json::from_str(r#"{"uid": 0, "gid": 0, "mode": 999}"#).unwrap();
        assert!(request.mode.to_mode().is_err());
    }
}
