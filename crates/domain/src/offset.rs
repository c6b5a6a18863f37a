//! Offsets: signed minute shifts applied to astronomical sun times.
//!
//! The settings page shows a magnitude box plus a `+`/`-` toggle per channel.
//! Both are folded into one signed integer when the input is accepted.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sign toggle next to an offset box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetSign {
    #[default]
    Plus,
    Minus,
}

impl OffsetSign {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
        }
    }

    /// Split a stored signed offset into toggle state and displayed magnitude.
    #[must_use]
    pub fn split(offset_min: i32) -> (Self, u32) {
        let sign = if offset_min < 0 { Self::Minus } else { Self::Plus };
        (sign, offset_min.unsigned_abs())
    }
}

/// Raw contents of one offset box and its sign toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetInput {
    pub text: String,
    pub sign: OffsetSign,
}

impl OffsetInput {
    #[must_use]
    pub fn new(text: impl Into<String>, sign: OffsetSign) -> Self {
        Self {
            text: text.into(),
            sign,
        }
    }

    /// Prefill from a stored offset.
    #[must_use]
    pub fn from_stored(offset_min: i32) -> Self {
        let (sign, magnitude) = OffsetSign::split(offset_min);
        Self::new(magnitude.to_string(), sign)
    }

    /// Parse into the signed value to store.
    ///
    /// The box only accepts ASCII digits; the sign lives in the toggle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidOffset`] for empty, non-digit or
    /// overflowing input.
    pub fn parse(&self) -> Result<i32, ValidationError> {
        let text = self.text.trim();
        let invalid = || ValidationError::InvalidOffset(self.text.clone());
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude: i32 = text.parse().map_err(|_| invalid())?;
        Ok(match self.sign {
            OffsetSign::Plus => magnitude,
            OffsetSign::Minus => -magnitude,
        })
    }
}

/// Per-channel signed minute offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offsets {
    pub sunrise_min: i32,
    pub sunset_min: i32,
}

impl Offsets {
    /// Parse both boxes; nothing is returned unless both are valid.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError::InvalidOffset`] encountered.
    pub fn parse(sunrise: &OffsetInput, sunset: &OffsetInput) -> Result<Self, ValidationError> {
        Ok(Self {
            sunrise_min: sunrise.parse()?,
            sunset_min: sunset.parse()?,
        })
    }
}
