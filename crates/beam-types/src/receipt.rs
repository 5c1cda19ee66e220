use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReceiptKeyError {
    #[error("invalid receipt type in '{0}'")]
    UnknownType(String),
    #[error("malformed receipt key '{0}'")]
    Malformed(String),
}

/// Off-chain tip action that justified a units adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReceiptKey {
    Start { sender_fid: u64, receiver_fid: u64 },
    Follow { sender_fid: u64, receiver_fid: u64 },
    Like { sender_fid: u64, receiver_fid: u64, cast_hash: String },
    Recast { sender_fid: u64, receiver_fid: u64, cast_hash: String },
    Comment { sender_fid: u64, receiver_fid: u64, cast_hash: String },
}

impl ReceiptKey {
    pub fn sender_fid(&self) -> u64 {
        match self {
            ReceiptKey::Start { sender_fid, .. }
            | ReceiptKey::Follow { sender_fid, .. }
            | ReceiptKey::Like { sender_fid, .. }
            | ReceiptKey::Recast { sender_fid, .. }
            | ReceiptKey::Comment { sender_fid, .. } => *sender_fid,
        }
    }

    pub fn receiver_fid(&self) -> u64 {
        match self {
            ReceiptKey::Start { receiver_fid, .. }
            | ReceiptKey::Follow { receiver_fid, .. }
            | ReceiptKey::Like { receiver_fid, .. }
            | ReceiptKey::Recast { receiver_fid, .. }
            | ReceiptKey::Comment { receiver_fid, .. } => *receiver_fid,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ReceiptKey::Start { .. } => "start",
            ReceiptKey::Follow { .. } => "follow",
            ReceiptKey::Like { .. } => "like",
            ReceiptKey::Recast { .. } => "recast",
            ReceiptKey::Comment { .. } => "comment",
        }
    }
}

impl fmt::Display for ReceiptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tip_{}_{}_{}",
            self.kind(),
            self.sender_fid(),
            self.receiver_fid()
        )?;
        match self {
            ReceiptKey::Like { cast_hash, .. }
            | ReceiptKey::Recast { cast_hash, .. }
            | ReceiptKey::Comment { cast_hash, .. } => write!(f, "_{cast_hash}"),
            ReceiptKey::Start { .. } | ReceiptKey::Follow { .. } => Ok(()),
        }
    }
}

impl FromStr for ReceiptKey {
    type Err = ReceiptKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReceiptKeyError::Malformed(s.to_string());
        let parts: Vec<&str> = s.split('_').collect();
        if parts.len() < 2 || parts[0] != "tip" {
            return Err(malformed());
        }
        let fid = |idx: usize| -> Result<u64, ReceiptKeyError> {
            parts
                .get(idx)
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(malformed)
        };
        let cast = || -> Result<String, ReceiptKeyError> {
            match parts.get(4) {
                Some(hash) if !hash.is_empty() => Ok((*hash).to_string()),
                _ => Err(malformed()),
            }
        };

        match (parts[1], parts.len()) {
            ("start", 4) => Ok(ReceiptKey::Start {
                sender_fid: fid(2)?,
                receiver_fid: fid(3)?,
            }),
            ("follow", 4) => Ok(ReceiptKey::Follow {
                sender_fid: fid(2)?,
                receiver_fid: fid(3)?,
            }),
            ("like", 5) => Ok(ReceiptKey::Like {
                sender_fid: fid(2)?,
                receiver_fid: fid(3)?,
                cast_hash: cast()?,
            }),
            ("recast", 5) => Ok(ReceiptKey::Recast {
                sender_fid: fid(2)?,
                receiver_fid: fid(3)?,
                cast_hash: cast()?,
            }),
            ("comment", 5) => Ok(ReceiptKey::Comment {
                sender_fid: fid(2)?,
                receiver_fid: fid(3)?,
                cast_hash: cast()?,
            }),
            ("start" | "follow" | "like" | "recast" | "comment", _) => Err(malformed()),
            _ => Err(ReceiptKeyError::UnknownType(s.to_string())),
        }
    }
}

impl Serialize for ReceiptKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReceiptKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
