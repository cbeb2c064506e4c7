use phf::{Set, phf_set};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static HYDROPHOBIC: Set<&'static str> = phf_set! {
    "ALA", "VAL", "ILE", "LEU", "MET", "PHE", "TRP", "PRO",
};
static POSITIVELY_CHARGED: Set<&'static str> = phf_set! { "LYS", "ARG", "HIS" };
static NEGATIVELY_CHARGED: Set<&'static str> = phf_set! { "ASP", "GLU" };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AminoAcid {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // A
    Glycine,    // G
    Isoleucine, // I
    Leucine,    // L
    Proline,    // P
    Valine,     // V

    // --- Aromatic ---
    Phenylalanine, // F
    Tryptophan,    // W
    Tyrosine,      // Y

    // --- Polar, Uncharged ---
    Asparagine, // N
    Cysteine,   // C
    Glutamine,  // Q
    Serine,     // S
    Threonine,  // T
    Methionine, // M

    // --- Positively Charged (Basic) ---
    Arginine,  // R
    Histidine, // H
    Lysine,    // K

    // --- Negatively Charged (Acidic) ---
    AsparticAcid, // D
    GlutamicAcid, // E
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Sequence is empty")]
    Empty,
    #[error("Unrecognized residue symbol '{symbol}' at position {position}")]
    UnknownSymbol { symbol: char, position: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid amino acid code: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl AminoAcid {
    pub const ALL: [AminoAcid; 20] = [
        Self::Alanine,
        Self::Glycine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Proline,
        Self::Valine,
        Self::Phenylalanine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Asparagine,
        Self::Cysteine,
        Self::Glutamine,
        Self::Serine,
        Self::Threonine,
        Self::Methionine,
        Self::Arginine,
        Self::Histidine,
        Self::Lysine,
        Self::AsparticAcid,
        Self::GlutamicAcid,
    ];

    pub fn from_one_letter(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' => Some(Self::Alanine),
            'G' => Some(Self::Glycine),
            'I' => Some(Self::Isoleucine),
            'L' => Some(Self::Leucine),
            'P' => Some(Self::Proline),
            'V' => Some(Self::Valine),
            'F' => Some(Self::Phenylalanine),
            'W' => Some(Self::Tryptophan),
            'Y' => Some(Self::Tyrosine),
            'N' => Some(Self::Asparagine),
            'C' => Some(Self::Cysteine),
            'Q' => Some(Self::Glutamine),
            'S' => Some(Self::Serine),
            'T' => Some(Self::Threonine),
            'M' => Some(Self::Methionine),
            'R' => Some(Self::Arginine),
            'H' => Some(Self::Histidine),
            'K' => Some(Self::Lysine),
            'D' => Some(Self::AsparticAcid),
            'E' => Some(Self::GlutamicAcid),
            _ => None,
        }
    }

    pub fn to_one_letter(self) -> char {
        match self {
            Self::Alanine => 'A',
            Self::Glycine => 'G',
            Self::Isoleucine => 'I',
            Self::Leucine => 'L',
            Self::Proline => 'P',
            Self::Valine => 'V',
            Self::Phenylalanine => 'F',
            Self::Tryptophan => 'W',
            Self::Tyrosine => 'Y',
            Self::Asparagine => 'N',
            Self::Cysteine => 'C',
            Self::Glutamine => 'Q',
            Self::Serine => 'S',
            Self::Threonine => 'T',
            Self::Methionine => 'M',
            Self::Arginine => 'R',
            Self::Histidine => 'H',
            Self::Lysine => 'K',
            Self::AsparticAcid => 'D',
            Self::GlutamicAcid => 'E',
        }
    }

    pub fn to_three_letter(self) -> &'static str {
        match self {
            Self::Alanine => "ALA",
            Self::Glycine => "GLY",
            Self::Isoleucine => "ILE",
            Self::Leucine => "LEU",
            Self::Proline => "PRO",
            Self::Valine => "VAL",
            Self::Phenylalanine => "PHE",
            Self::Tryptophan => "TRP",
            Self::Tyrosine => "TYR",
            Self::Asparagine => "ASN",
            Self::Cysteine => "CYS",
            Self::Glutamine => "GLN",
            Self::Serine => "SER",
            Self::Threonine => "THR",
            Self::Methionine => "MET",
            Self::Arginine => "ARG",
            Self::Histidine => "HIS",
            Self::Lysine => "LYS",
            Self::AsparticAcid => "ASP",
            Self::GlutamicAcid => "GLU",
        }
    }

    pub fn from_three_letter(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|aa| aa.to_three_letter() == upper)
    }

    #[inline]
    pub fn is_hydrophobic(self) -> bool {
        HYDROPHOBIC.contains(self.to_three_letter())
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        POSITIVELY_CHARGED.contains(self.to_three_letter())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        NEGATIVELY_CHARGED.contains(self.to_three_letter())
    }

    /// True when one residue is basic and the other acidic.
    pub fn has_opposite_charge(self, other: Self) -> bool {
        (self.is_positive() && other.is_negative()) || (self.is_negative() && other.is_positive())
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = ParseAminoAcidError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        Self::from_one_letter(code).ok_or_else(|| ParseAminoAcidError(code.to_string()))
    }
}

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::try_from(code),
            _ => Self::from_three_letter(trimmed)
                .ok_or_else(|| ParseAminoAcidError(trimmed.to_string())),
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_three_letter())
    }
}

/// Parses a one-letter sequence, rejecting empty input and non-canonical symbols.
pub fn parse_sequence(sequence: &str) -> Result<Vec<AminoAcid>, SequenceError> {
    let trimmed = sequence.trim();
    if trimmed.is_empty() {
        return Err(SequenceError::Empty);
    }
    trimmed
        .chars()
        .enumerate()
        .map(|(position, symbol)| {
            AminoAcid::from_one_letter(symbol)
                .ok_or(SequenceError::UnknownSymbol { symbol, position })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_letter_codes_round_trip_for_every_amino_acid() {
        for aa in AminoAcid::ALL {
            assert_eq!(AminoAcid::from_one_letter(aa.to_one_letter()), Some(aa));
        }
    }

    #[test]
    fn from_one_letter_is_case_insensitive() {
        assert_eq!(AminoAcid::from_one_letter('g'), Some(AminoAcid::Glycine));
        assert_eq!(AminoAcid::from_one_letter('W'), Some(AminoAcid::Tryptophan));
    }

    #[test]
    fn from_one_letter_rejects_non_canonical_codes() {
        assert_eq!(AminoAcid::from_one_letter('B'), None);
        assert_eq!(AminoAcid::from_one_letter('X'), None);
        assert_eq!(AminoAcid::from_one_letter('1'), None);
    }

    #[test]
    fn from_str_accepts_one_and_three_letter_codes() {
        assert_eq!("K".parse::<AminoAcid>().unwrap(), AminoAcid::Lysine);
        assert_eq!("lys".parse::<AminoAcid>().unwrap(), AminoAcid::Lysine);
        assert_eq!(" GLU ".parse::<AminoAcid>().unwrap(), AminoAcid::GlutamicAcid);
        assert!("XYZ".parse::<AminoAcid>().is_err());
        assert!("".parse::<AminoAcid>().is_err());
    }

    #[test]
    fn display_uses_three_letter_name() {
        assert_eq!(AminoAcid::Cysteine.to_string(), "CYS");
    }

    #[test]
    fn classification_sets_match_expected_members() {
        assert!(AminoAcid::Leucine.is_hydrophobic());
        assert!(AminoAcid::Proline.is_hydrophobic());
        assert!(!AminoAcid::Glycine.is_hydrophobic());
        assert!(AminoAcid::Arginine.is_positive());
        assert!(AminoAcid::AsparticAcid.is_negative());
        assert!(!AminoAcid::Serine.is_positive());
        assert!(!AminoAcid::Serine.is_negative());
    }

    #[test]
    fn has_opposite_charge_is_symmetric() {
        assert!(AminoAcid::Lysine.has_opposite_charge(AminoAcid::GlutamicAcid));
        assert!(AminoAcid::GlutamicAcid.has_opposite_charge(AminoAcid::Lysine));
        assert!(!AminoAcid::Lysine.has_opposite_charge(AminoAcid::Arginine));
        assert!(!AminoAcid::AsparticAcid.has_opposite_charge(AminoAcid::GlutamicAcid));
    }

    #[test]
    fn parse_sequence_trims_and_accepts_lowercase() {
        let residues = parse_sequence("  give \n").unwrap();
        assert_eq!(
            residues,
            vec![
                AminoAcid::Glycine,
                AminoAcid::Isoleucine,
                AminoAcid::Valine,
                AminoAcid::GlutamicAcid
            ]
        );
    }

    #[test]
    fn parse_sequence_rejects_empty_input() {
        assert_eq!(parse_sequence(""), Err(SequenceError::Empty));
        assert_eq!(parse_sequence("   "), Err(SequenceError::Empty));
    }

    #[test]
    fn parse_sequence_reports_position_of_unknown_symbol() {
        assert_eq!(
            parse_sequence("GIXE"),
            Err(SequenceError::UnknownSymbol {
                symbol: 'X',
                position: 2
            })
        );
    }
}
