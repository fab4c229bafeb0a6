//! Common types shared across decoder implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode symbology reported by a decoder.
///
/// Covers the one- and two-dimensional formats a phone camera decoder is
/// typically asked to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Symbology {
    Ean8,
    Ean13,
    Code128,
    Qr,
    Pdf417,
    Code39,
    Code39Mod43,
    Code93,
    Aztec,
    DataMatrix,
    Interleaved2of5,
    Itf14,

    /// Decoder did not report a symbology.
    Unknown,
}

impl Symbology {
    /// Every concrete symbology, in the order decoders are usually
    /// configured with.
    pub const ALL: [Symbology; 12] = [
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::Code128,
        Symbology::Qr,
        Symbology::Pdf417,
        Symbology::Code39,
        Symbology::Code39Mod43,
        Symbology::Code93,
        Symbology::Aztec,
        Symbology::DataMatrix,
        Symbology::Interleaved2of5,
        Symbology::Itf14,
    ];

    /// Get a human-readable name for the symbology.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::Code128 => "Code 128",
            Self::Qr => "QR",
            Self::Pdf417 => "PDF417",
            Self::Code39 => "Code 39",
            Self::Code39Mod43 => "Code 39 Mod 43",
            Self::Code93 => "Code 93",
            Self::Aztec => "Aztec",
            Self::DataMatrix => "Data Matrix",
            Self::Interleaved2of5 => "Interleaved 2 of 5",
            Self::Itf14 => "ITF-14",
            Self::Unknown => "Unknown",
        }
    }

    /// Check whether this is a two-dimensional (matrix or stacked) code.
    pub fn is_two_dimensional(&self) -> bool {
        matches!(
            self,
            Self::Qr | Self::Pdf417 | Self::Aztec | Self::DataMatrix
        )
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoder information.
///
/// Contains metadata about a decoder such as its name, backend and the
/// symbologies it was configured to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderInfo {
    /// Decoder name (e.g., "Mock Decoder").
    pub name: String,

    /// Backend identifier (e.g., "mock", "replay").
    pub backend: String,

    /// Symbologies this decoder reports.
    pub symbologies: Vec<Symbology>,
}

impl DecoderInfo {
    /// Create a new DecoderInfo reporting every symbology.
    pub fn new(name: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            symbologies: Symbology::ALL.to_vec(),
        }
    }

    /// Restrict the reported symbologies.
    pub fn with_symbologies(mut self, symbologies: Vec<Symbology>) -> Self {
        self.symbologies = symbologies;
        self
    }
}
