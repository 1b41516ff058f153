//! Model version selectors and output selection.
//!
//! Version branching is a small tagged enum choosing between alternate
//! formula variants of the same derived quantity (e.g. the two saturated
//! vapour pressure formulations), selected once per run.

use crate::errors::{EtLookError, EtLookResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Version of the ET pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EtLookVersion {
    /// Saturated vapour pressure from the daily mean air temperature.
    V2,
    /// Saturated vapour pressure averaged from daily min/max temperatures.
    V3,
}

impl FromStr for EtLookVersion {
    type Err = EtLookError;

    fn from_str(s: &str) -> EtLookResult<Self> {
        match s {
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            other => Err(EtLookError::UnsupportedVersion {
                model: "et_look",
                version: other.to_string(),
                expected: "\"v2\", \"v3\"",
            }),
        }
    }
}

/// Version of the root-zone soil-moisture pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeRootVersion {
    /// Wet limit from the wet-bulb / air temperature blend.
    V2,
    /// Wet limit from a wet-surface energy-balance inversion referenced to
    /// a zone-averaged land-surface temperature.
    Dev,
}

impl FromStr for SeRootVersion {
    type Err = EtLookError;

    fn from_str(s: &str) -> EtLookResult<Self> {
        match s {
            "v2" => Ok(Self::V2),
            "dev" => Ok(Self::Dev),
            other => Err(EtLookError::UnsupportedVersion {
                model: "se_root",
                version: other.to_string(),
                expected: "\"v2\", \"dev\"",
            }),
        }
    }
}

/// Which fields end up in the output container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportSelection {
    /// The pipeline's documented default subset.
    Default,
    /// Every input and computed field.
    All,
    /// An explicit caller-supplied list. Unknown names are a configuration
    /// error, unlike the default list where absent names are dropped.
    Custom(Vec<String>),
}

impl FromStr for ExportSelection {
    type Err = EtLookError;

    fn from_str(s: &str) -> EtLookResult<Self> {
        match s {
            "default" => Ok(Self::Default),
            "all" => Ok(Self::All),
            other => Err(EtLookError::InvalidExportSelection(other.to_string())),
        }
    }
}
