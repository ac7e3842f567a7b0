//! Camelot wheel key model and harmonic compatibility
//!
//! Keys are `<number 1-12><mode A|B>`; A is minor, B is major. Compatibility is
//! decided from the circular distance between wheel numbers and whether the
//! modes match, so classification is symmetric in its two arguments.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of positions on the Camelot wheel
pub const WHEEL_SIZE: u8 = 12;

/// Key mode (letter on the Camelot wheel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    /// A: minor
    Minor,
    /// B: major
    Major,
}

impl Mode {
    pub fn letter(self) -> char {
        match self {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        }
    }
}

/// A validated position on the Camelot wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CamelotKey {
    number: u8,
    mode: Mode,
}

impl CamelotKey {
    /// Build a key from its parts, rejecting numbers outside 1..=12
    pub fn new(number: u8, mode: Mode) -> Result<Self> {
        if !(1..=WHEEL_SIZE).contains(&number) {
            return Err(Error::InvalidKeyFormat(format!(
                "wheel number {} out of range 1-12",
                number
            )));
        }
        Ok(Self { number, mode })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// All 24 keys, 1A..12A then 1B..12B
    pub fn all() -> impl Iterator<Item = CamelotKey> {
        [Mode::Minor, Mode::Major].into_iter().flat_map(|mode| {
            (1..=WHEEL_SIZE).map(move |number| CamelotKey { number, mode })
        })
    }

    /// Dense index in 0..24, used for relation lookup tables
    pub fn index(&self) -> usize {
        let base = match self.mode {
            Mode::Minor => 0,
            Mode::Major => WHEEL_SIZE as usize,
        };
        base + self.number as usize - 1
    }

    /// Shortest distance around the wheel between two numbers (0..=6)
    fn wheel_distance(&self, other: &CamelotKey) -> u8 {
        let diff = (self.number as i32 - other.number as i32).rem_euclid(WHEEL_SIZE as i32) as u8;
        diff.min(WHEEL_SIZE - diff)
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.mode.letter())
    }
}

impl FromStr for CamelotKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_camelot_key(s)
    }
}

impl Serialize for CamelotKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CamelotKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_camelot_key(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse `<1-12><A|B>`; the mode letter is case-insensitive, leading zeros are rejected
pub fn parse_camelot_key(raw: &str) -> Result<CamelotKey> {
    let s = raw.trim();
    let invalid = || Error::InvalidKeyFormat(format!("'{}' is not <1-12><A|B>", raw));

    let mode_char = s.chars().last().ok_or_else(invalid)?;
    let mode = match mode_char.to_ascii_uppercase() {
        'A' => Mode::Minor,
        'B' => Mode::Major,
        _ => return Err(invalid()),
    };

    let digits = &s[..s.len() - mode_char.len_utf8()];
    if digits.is_empty()
        || digits.len() > 2
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let number: u8 = digits.parse().map_err(|_| invalid())?;
    CamelotKey::new(number, mode).map_err(|_| invalid())
}

/// How two keys sit relative to each other on the wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRelation {
    /// Same key
    Identical,
    /// One step around the wheel, same mode
    Adjacent,
    /// Same number, other mode
    Relative,
    /// One step around the wheel, other mode
    Diagonal,
    /// Two steps (or the seven-step jump) in the same mode
    EnergyBoost,
    /// Three steps same mode, or two steps other mode
    Wide,
    Incompatible,
}

impl KeyRelation {
    /// Base quality of a transition with this relation, before tempo penalty
    ///
    /// `Incompatible` has no rank; clash scoring handles it separately.
    pub fn rank(self) -> f64 {
        match self {
            KeyRelation::Identical => 1.0,
            KeyRelation::Adjacent => 0.9,
            KeyRelation::Relative => 0.85,
            KeyRelation::Diagonal => 0.7,
            KeyRelation::EnergyBoost => 0.65,
            KeyRelation::Wide => 0.55,
            KeyRelation::Incompatible => 0.0,
        }
    }
}

/// Classify the relation between two keys. Symmetric in `a` and `b`.
pub fn key_relation(a: &CamelotKey, b: &CamelotKey) -> KeyRelation {
    let distance = a.wheel_distance(b);
    if a.mode == b.mode {
        match distance {
            0 => KeyRelation::Identical,
            1 => KeyRelation::Adjacent,
            2 | 5 => KeyRelation::EnergyBoost,
            3 => KeyRelation::Wide,
            _ => KeyRelation::Incompatible,
        }
    } else {
        match distance {
            0 => KeyRelation::Relative,
            1 => KeyRelation::Diagonal,
            2 => KeyRelation::Wide,
            _ => KeyRelation::Incompatible,
        }
    }
}

/// Strictness of the harmonic test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicLevel {
    /// Identical, adjacent and relative keys only
    #[default]
    Strict,
    /// Strict plus diagonal and energy-boost moves
    Moderate,
    /// Moderate plus wide moves
    Relaxed,
}

impl HarmonicLevel {
    pub fn accepts(self, relation: KeyRelation) -> bool {
        use KeyRelation::*;
        match (self, relation) {
            (_, Identical | Adjacent | Relative) => true,
            (HarmonicLevel::Moderate | HarmonicLevel::Relaxed, Diagonal | EnergyBoost) => true,
            (HarmonicLevel::Relaxed, Wide) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HarmonicLevel::Strict => "strict",
            HarmonicLevel::Moderate => "moderate",
            HarmonicLevel::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for HarmonicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HarmonicLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(HarmonicLevel::Strict),
            "moderate" => Ok(HarmonicLevel::Moderate),
            "relaxed" => Ok(HarmonicLevel::Relaxed),
            other => Err(Error::Config(format!(
                "unknown harmonic level '{}' (expected strict, moderate or relaxed)",
                other
            ))),
        }
    }
}

/// Harmonic verdict plus the relation it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub harmonic: bool,
    pub relation: KeyRelation,
}

/// Classify two keys under a harmonic level
pub fn is_harmonic_compatible(a: &CamelotKey, b: &CamelotKey, level: HarmonicLevel) -> Compatibility {
    let relation = key_relation(a, b);
    Compatibility {
        harmonic: level.accepts(relation),
        relation,
    }
}

/// Every key the level accepts next to `key`, including `key` itself
pub fn get_compatible_keys(key: &CamelotKey, level: HarmonicLevel) -> Vec<CamelotKey> {
    CamelotKey::all()
        .filter(|other| level.accepts(key_relation(key, other)))
        .collect()
}

/// Precomputed 24x24 relation lookup
///
/// The graph builder classifies key pairs through this table rather than per track pair.
pub struct RelationTable {
    relations: [[KeyRelation; 24]; 24],
}

impl RelationTable {
    pub fn new() -> Self {
        let mut relations = [[KeyRelation::Incompatible; 24]; 24];
        for a in CamelotKey::all() {
            for b in CamelotKey::all() {
                relations[a.index()][b.index()] = key_relation(&a, &b);
            }
        }
        Self { relations }
    }

    pub fn get(&self, a: &CamelotKey, b: &CamelotKey) -> KeyRelation {
        self.relations[a.index()][b.index()]
    }
}

impl Default for RelationTable {
    fn default() -> Self {
        Self::new()
    }
}
