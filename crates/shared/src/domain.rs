use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self)
            }
        }
    };
}

id_newtype!(DecisionId);
id_newtype!(OptionId);

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Soft upper bound for evidence uploads. Larger files are still submitted.
pub const EVIDENCE_SIZE_GUIDANCE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    #[serde(default)]
    pub title: String,
}

/// A binary evidence file bound for one decision.
#[derive(Debug, Clone)]
pub struct EvidenceDocument {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl EvidenceDocument {
    pub fn new(
        filename: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }

    pub fn exceeds_size_guidance(&self) -> bool {
        self.bytes.len() > EVIDENCE_SIZE_GUIDANCE_BYTES
    }
}
