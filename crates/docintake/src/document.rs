//! Document-level types shared by the upload front door and the pipeline.

use serde::{Deserialize, Serialize};

/// Onboarding document kinds accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    I9,
    W4,
    Id,
    Passport,
    DriversLicense,
    SocialSecurityCard,
}

impl DocumentType {
    /// All accepted types, in the order they are listed to callers.
    pub const ALL: [DocumentType; 6] = [
        DocumentType::I9,
        DocumentType::W4,
        DocumentType::Id,
        DocumentType::Passport,
        DocumentType::DriversLicense,
        DocumentType::SocialSecurityCard,
    ];

    /// Canonical uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I9 => "I9",
            Self::W4 => "W4",
            Self::Id => "ID",
            Self::Passport => "PASSPORT",
            Self::DriversLicense => "DRIVERSLICENSE",
            Self::SocialSecurityCard => "SOCIALSECURITYCARD",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.to_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }

    /// Comma separated list of valid names, e.g. for error messages.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether this is a government-issued identity document.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Id | Self::Passport | Self::DriversLicense)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown document type: {}", s))
    }
}

/// Lifecycle of a document record as seen by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Verified,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Verified => "verified",
            Self::Error => "error",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Uploaded, Self::Processing)
                | (Self::Processing, Self::Verified)
                | (Self::Processing, Self::Error)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Error)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
