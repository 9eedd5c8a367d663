//! Feature and hash family tables
//!
//! The twelve feature families are positional: row `i` of every family
//! describes the same sentence example, and the dense vector concatenates
//! the decoded families in [`FeatureFamily::ALL`] order.

use crate::transform::Transform;
use evidx_core::{ElementType, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named category of encoded per-sentence features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureFamily {
    /// Bit-packed sentence embedding
    Semantic,
    /// Part-of-speech tag counts
    Pos,
    /// Morphological feature counts
    MorphFeats,
    /// Dependency relation counts
    Syntax,
    /// Consonant cluster counts
    Phonetic,
    /// Character frequency counts
    CharFreq,
    /// Character bigram frequency counts
    BigramFreq,
    /// Word frequency class counts
    WordFreq,
    /// Morphological ambiguity counts
    MorphAmb,
    /// Sequence lengths
    TxtLen,
    /// Language/dialect detector scores
    Dialect,
    /// Emoji counts
    Emoji,
}

impl FeatureFamily {
    /// All families in dense concatenation order
    pub const ALL: [FeatureFamily; 12] = [
        FeatureFamily::Semantic,
        FeatureFamily::Pos,
        FeatureFamily::MorphFeats,
        FeatureFamily::Syntax,
        FeatureFamily::Phonetic,
        FeatureFamily::CharFreq,
        FeatureFamily::BigramFreq,
        FeatureFamily::WordFreq,
        FeatureFamily::MorphAmb,
        FeatureFamily::TxtLen,
        FeatureFamily::Dialect,
        FeatureFamily::Emoji,
    ];

    /// Position in [`FeatureFamily::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureFamily::Semantic => "semantic",
            FeatureFamily::Pos => "pos",
            FeatureFamily::MorphFeats => "morphfeats",
            FeatureFamily::Syntax => "syntax",
            FeatureFamily::Phonetic => "phonetic",
            FeatureFamily::CharFreq => "charfreq",
            FeatureFamily::BigramFreq => "bigramfreq",
            FeatureFamily::WordFreq => "wordfreq",
            FeatureFamily::MorphAmb => "morphamb",
            FeatureFamily::TxtLen => "txtlen",
            FeatureFamily::Dialect => "dialect",
            FeatureFamily::Emoji => "emoji",
        }
    }

    /// Column name the family is stored under upstream
    pub fn source_column(self) -> &'static str {
        match self {
            FeatureFamily::Semantic => "feats1",
            FeatureFamily::Pos => "feats2",
            FeatureFamily::MorphFeats => "feats3",
            FeatureFamily::Syntax => "feats4",
            FeatureFamily::Phonetic => "feats5",
            FeatureFamily::CharFreq => "feats6",
            FeatureFamily::BigramFreq => "feats7",
            FeatureFamily::WordFreq => "feats8",
            FeatureFamily::MorphAmb => "feats9",
            FeatureFamily::TxtLen => "feats12",
            FeatureFamily::Dialect => "feats13",
            FeatureFamily::Emoji => "feats14",
        }
    }

    pub fn element_type(self) -> ElementType {
        match self {
            FeatureFamily::Phonetic
            | FeatureFamily::CharFreq
            | FeatureFamily::BigramFreq
            | FeatureFamily::TxtLen => ElementType::Int16,
            _ => ElementType::Int8,
        }
    }

    pub fn transform(self) -> Transform {
        match self {
            FeatureFamily::Semantic => Transform::BitExpand,
            FeatureFamily::Syntax => Transform::DivideBySum,
            FeatureFamily::TxtLen => Transform::LogCompress,
            FeatureFamily::Dialect => Transform::ScaledFloat,
            _ => Transform::DivideByFirst,
        }
    }
}

impl fmt::Display for FeatureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureFamily {
    type Err = Error;

    /// Accepts the family name or its upstream column name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FeatureFamily::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s) || f.source_column() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown feature family '{s}'")))
    }
}

/// Families of int32 hash slots compared by exact match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFamily {
    Grammar,
    Duplicate,
    Biblio,
}

impl HashFamily {
    pub const ALL: [HashFamily; 3] = [HashFamily::Grammar, HashFamily::Duplicate, HashFamily::Biblio];

    pub fn name(self) -> &'static str {
        match self {
            HashFamily::Grammar => "grammar",
            HashFamily::Duplicate => "duplicate",
            HashFamily::Biblio => "biblio",
        }
    }

    pub fn source_column(self) -> &'static str {
        match self {
            HashFamily::Grammar => "hashes15",
            HashFamily::Duplicate => "hashes16",
            HashFamily::Biblio => "hashes18",
        }
    }

    #[inline]
    pub fn element_type(self) -> ElementType {
        ElementType::Int32
    }
}

impl fmt::Display for HashFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        HashFamily::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(s) || h.source_column() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown hash family '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_index() {
        for (i, family) in FeatureFamily::ALL.iter().enumerate() {
            assert_eq!(family.index(), i);
        }
    }

    #[test]
    fn test_family_table() {
        use ElementType::*;
        use Transform::*;

        let expected = [
            ("semantic", Int8, BitExpand),
            ("pos", Int8, DivideByFirst),
            ("morphfeats", Int8, DivideByFirst),
            ("syntax", Int8, DivideBySum),
            ("phonetic", Int16, DivideByFirst),
            ("charfreq", Int16, DivideByFirst),
            ("bigramfreq", Int16, DivideByFirst),
            ("wordfreq", Int8, DivideByFirst),
            ("morphamb", Int8, DivideByFirst),
            ("txtlen", Int16, LogCompress),
            ("dialect", Int8, ScaledFloat),
            ("emoji", Int8, DivideByFirst),
        ];
        for (family, (name, ty, transform)) in FeatureFamily::ALL.iter().zip(expected) {
            assert_eq!(family.name(), name);
            assert_eq!(family.element_type(), ty, "{name}");
            assert_eq!(family.transform(), transform, "{name}");
        }
    }

    #[test]
    fn test_parse_by_name_or_column() {
        assert_eq!("txtlen".parse::<FeatureFamily>().unwrap(), FeatureFamily::TxtLen);
        assert_eq!("feats13".parse::<FeatureFamily>().unwrap(), FeatureFamily::Dialect);
        assert_eq!("hashes16".parse::<HashFamily>().unwrap(), HashFamily::Duplicate);
        assert!("feats10".parse::<FeatureFamily>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for family in FeatureFamily::ALL {
            let json = serde_json::to_string(&family).unwrap();
            assert_eq!(json, format!("\"{}\"", family.name()));
        }
        for hash in HashFamily::ALL {
            let json = serde_json::to_string(&hash).unwrap();
            assert_eq!(json, format!("\"{}\"", hash.name()));
        }
    }
}
