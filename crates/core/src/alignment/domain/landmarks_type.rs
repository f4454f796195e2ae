use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::alignment_error::AlignmentError;

/// Requested output dimensionality, as callers spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "2.5D")]
    TwoHalfD,
    #[serde(rename = "3D")]
    ThreeD,
}

impl Dimension {
    pub const ALL: &[Dimension] = &[Dimension::TwoD, Dimension::TwoHalfD, Dimension::ThreeD];

    pub fn token(&self) -> &'static str {
        match self {
            Dimension::TwoD => "2D",
            Dimension::TwoHalfD => "2.5D",
            Dimension::ThreeD => "3D",
        }
    }

    /// Legacy parser: any token that is not "2D" or "2.5D" becomes `ThreeD`.
    ///
    /// Kept for callers that still pass free-form strings. New code should
    /// go through [`FromStr`], which rejects unknown tokens.
    pub fn from_token_or_3d(token: &str) -> Self {
        match token.parse() {
            Ok(dimension) => dimension,
            Err(_) => {
                log::warn!("Unrecognized dimension {token:?}, falling back to 3D");
                Dimension::ThreeD
            }
        }
    }

    /// Landmark mode the runtime is asked for.
    ///
    /// 2.5D has no mode of its own and runs the 2D network.
    pub fn landmarks_type(&self) -> LandmarksType {
        match self {
            Dimension::TwoD | Dimension::TwoHalfD => LandmarksType::TwoD,
            Dimension::ThreeD => LandmarksType::ThreeD,
        }
    }
}

impl FromStr for Dimension {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2D" => Ok(Dimension::TwoD),
            "2.5D" => Ok(Dimension::TwoHalfD),
            "3D" => Ok(Dimension::ThreeD),
            other => Err(AlignmentError::UnknownDimension(other.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Landmark mode understood by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarksType {
    TwoD,
    ThreeD,
}

impl fmt::Display for LandmarksType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarksType::TwoD => write!(f, "2D"),
            LandmarksType::ThreeD => write!(f, "3D"),
        }
    }
}
