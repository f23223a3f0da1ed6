//! Enumerated request parameters and their wire tokens.
//!
//! Each type maps one-to-one onto a token accepted by the PUG schema. Parsing
//! an unknown token fails with [`QueryError::InvalidToken`], which is how bad
//! CLI or caller input is rejected before any request is rendered.

use std::fmt;
use std::str::FromStr;

use super::QueryError;

fn parse_token<T: Copy>(
    kind: &'static str,
    value: &str,
    all: &[T],
    as_str: fn(&T) -> &'static str,
) -> Result<T, QueryError> {
    let normalized = value.trim().to_ascii_lowercase();
    all.iter()
        .copied()
        .find(|candidate| as_str(candidate) == normalized)
        .ok_or_else(|| {
            let expected: Vec<&str> = all.iter().map(as_str).collect();
            QueryError::invalid_token(kind, value, &expected)
        })
}

/// Output format of a bulk structure download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadFormat {
    /// ASN.1 text.
    TextAsn,
    /// ASN.1 binary.
    BinaryAsn,
    /// PubChem XML.
    Xml,
    /// MDL structure-data file.
    #[default]
    Sdf,
    /// Full-size PNG depiction.
    Image,
    /// Thumbnail PNG depiction.
    ImageSmall,
    /// `<id> <smiles>` per line.
    Smiles,
    /// `<id> <inchi>` per line.
    Inchi,
}

impl DownloadFormat {
    /// Every accepted format, in schema order.
    pub const ALL: [Self; 8] = [
        Self::TextAsn,
        Self::BinaryAsn,
        Self::Xml,
        Self::Sdf,
        Self::Image,
        Self::ImageSmall,
        Self::Smiles,
        Self::Inchi,
    ];

    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextAsn => "text-asn",
            Self::BinaryAsn => "binary-asn",
            Self::Xml => "xml",
            Self::Sdf => "sdf",
            Self::Image => "image",
            Self::ImageSmall => "image-small",
            Self::Smiles => "smiles",
            Self::Inchi => "inchi",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DownloadFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("download format", s, &Self::ALL, Self::as_str)
    }
}

/// Compression applied by the service to a result payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Uncompressed payload.
    None,
    /// Gzip payload; the only scheme decompressed in memory.
    #[default]
    Gzip,
    /// Bzip2 payload; can be saved to disk but not decompressed.
    Bzip2,
}

impl Compression {
    /// Every accepted compression scheme.
    pub const ALL: [Self; 3] = [Self::None, Self::Gzip, Self::Bzip2];

    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Compression {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("compression", s, &Self::ALL, Self::as_str)
    }
}

/// Record namespace of a list of identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdDatabase {
    /// Compound IDs (CIDs).
    #[default]
    Compound,
    /// Substance IDs (SIDs).
    Substance,
}

impl IdDatabase {
    /// Database name used inside `PCT-ID-List_db`.
    #[must_use]
    pub fn pug_name(&self) -> &'static str {
        match self {
            Self::Compound => "pccompound",
            Self::Substance => "pcsubstance",
        }
    }

    /// Singular identifier name used in REST paths (`cid` / `sid`).
    #[must_use]
    pub fn id_name(&self) -> &'static str {
        match self {
            Self::Compound => "cid",
            Self::Substance => "sid",
        }
    }

    /// Record type used in REST paths (`compound` / `substance`).
    #[must_use]
    pub fn record_name(&self) -> &'static str {
        match self {
            Self::Compound => "compound",
            Self::Substance => "substance",
        }
    }
}

/// How a bioassay data table groups its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// One row per tested substance.
    #[default]
    Substance,
    /// One row per compound.
    Compound,
}

impl GroupBy {
    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substance => "substance",
            Self::Compound => "compound",
        }
    }

    /// Numeric enumeration value paired with the token in the schema.
    #[must_use]
    pub fn schema_value(&self) -> u8 {
        match self {
            Self::Substance => 4,
            Self::Compound => 0,
        }
    }
}

/// Which columns a bioassay data table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssayDataset {
    /// Every reported column.
    #[default]
    Complete,
    /// Summary columns only.
    Concise,
}

impl AssayDataset {
    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Concise => "concise",
        }
    }

    /// Numeric enumeration value paired with the token in the schema.
    #[must_use]
    pub fn schema_value(&self) -> u8 {
        match self {
            Self::Complete => 0,
            Self::Concise => 1,
        }
    }
}

/// Matching rule applied by the identifier exchange service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeOperation {
    /// Exact match.
    #[default]
    Same,
    /// Parent compound.
    Parent,
    /// Same stereochemistry.
    SameStereo,
    /// Same isotopes.
    SameIsotope,
    /// Same connectivity.
    SameConnectivity,
    /// 2-D similarity.
    Similar,
}

impl ExchangeOperation {
    /// Every accepted operation.
    pub const ALL: [Self; 6] = [
        Self::Same,
        Self::Parent,
        Self::SameStereo,
        Self::SameIsotope,
        Self::SameConnectivity,
        Self::Similar,
    ];

    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Same => "same",
            Self::Parent => "parent",
            Self::SameStereo => "samestereo",
            Self::SameIsotope => "sameisotope",
            Self::SameConnectivity => "sameconnectivity",
            Self::Similar => "similar",
        }
    }
}

impl FromStr for ExchangeOperation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("exchange operation", s, &Self::ALL, Self::as_str)
    }
}

/// Identifier type produced by the identifier exchange service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeOutput {
    /// PubChem compound IDs.
    #[default]
    Cid,
    /// PubChem substance IDs.
    Sid,
    /// SMILES strings.
    Smiles,
    /// InChI strings.
    Inchi,
    /// InChIKey strings.
    InchiKey,
}

impl ExchangeOutput {
    /// Every accepted output type.
    pub const ALL: [Self; 5] = [
        Self::Cid,
        Self::Sid,
        Self::Smiles,
        Self::Inchi,
        Self::InchiKey,
    ];

    /// Returns the wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cid => "cid",
            Self::Sid => "sid",
            Self::Smiles => "smiles",
            Self::Inchi => "inchi",
            Self::InchiKey => "inchikey",
        }
    }
}

impl FromStr for ExchangeOutput {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("exchange output", s, &Self::ALL, Self::as_str)
    }
}

/// Input notation for a structure identity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureFormat {
    /// SMILES string.
    #[default]
    Smiles,
    /// SDF record.
    Sdf,
}

impl StructureFormat {
    /// Every accepted structure notation.
    pub const ALL: [Self; 2] = [Self::Smiles, Self::Sdf];

    /// Returns the REST path segment and form field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smiles => "smiles",
            Self::Sdf => "sdf",
        }
    }
}

impl FromStr for StructureFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("structure format", s, &Self::ALL, Self::as_str)
    }
}
