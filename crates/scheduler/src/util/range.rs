use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub offset: u64,
    pub length: Option<u64>,
}

impl ByteRange {
    pub fn new(offset: u64, length: Option<u64>) -> Self {
        Self { offset, length }
    }

    /// The byte range shall be expressed and formatted as a byte-range-spec as defined in
    /// IETF RFC 7233:2014, subclause 2.1. It is restricted to a single expression identifying
    /// a contiguous range of bytes.
    pub fn parse<S>(s: S) -> SchedulerResult<Self>
    where
        S: AsRef<str>,
    {
        let s = s.as_ref();
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| SchedulerError::InvalidByteRange(s.to_string()))?;

        let first_byte_pos = start
            .trim()
            .parse::<u64>()
            .map_err(|_| SchedulerError::InvalidByteRange(s.to_string()))?;
        let last_byte_pos = match end.trim() {
            "" => None,
            end => Some(
                end.parse::<u64>()
                    .map_err(|_| SchedulerError::InvalidByteRange(s.to_string()))?,
            ),
        };

        // 0-500 means 501 bytes
        let length = match last_byte_pos {
            Some(last) if last < first_byte_pos => {
                return Err(SchedulerError::InvalidByteRange(s.to_string()))
            }
            Some(last) => Some(last - first_byte_pos + 1),
            None => None,
        };

        Ok(Self::new(first_byte_pos, length))
    }

    pub fn to_http_range(&self) -> String {
        format!("bytes={self}")
    }
}

impl FromStr for ByteRange {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length {
            Some(length) => write!(f, "{}-{}", self.offset, self.offset + length - 1),
            None => write!(f, "{}-", self.offset),
        }
    }
}
