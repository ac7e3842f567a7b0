//! Rekordbox key names to Camelot notation
//!
//! Rekordbox stores the detected key as a musical name (`"Am"`, `"F#m"`,
//! `"Db"`) and, depending on user settings, sometimes as Camelot already.
//! Long forms (`"C# Minor"`, `"F Maj"`) appear in imported collections.

use djkr8_common::camelot::{parse_camelot_key, CamelotKey, Mode};

/// Root note -> wheel number for major keys (B side)
const MAJOR: &[(&str, u8)] = &[
    ("B", 1),
    ("F#", 2),
    ("Gb", 2),
    ("Db", 3),
    ("C#", 3),
    ("Ab", 4),
    ("G#", 4),
    ("Eb", 5),
    ("D#", 5),
    ("Bb", 6),
    ("A#", 6),
    ("F", 7),
    ("C", 8),
    ("G", 9),
    ("D", 10),
    ("A", 11),
    ("E", 12),
];

/// Root note -> wheel number for minor keys (A side)
const MINOR: &[(&str, u8)] = &[
    ("Ab", 1),
    ("G#", 1),
    ("Eb", 2),
    ("D#", 2),
    ("Bb", 3),
    ("A#", 3),
    ("F", 4),
    ("C", 5),
    ("G", 6),
    ("D", 7),
    ("A", 8),
    ("E", 9),
    ("B", 10),
    ("F#", 11),
    ("Gb", 11),
    ("Db", 12),
    ("C#", 12),
];

/// Map a Rekordbox key name to Camelot; `None` when unrecognized
pub fn to_camelot(raw: &str) -> Option<CamelotKey> {
    let name = raw.trim();
    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_camelot_key(name).ok();
    }

    let (root, mode) = split_mode(name)?;
    let table = match mode {
        Mode::Major => MAJOR,
        Mode::Minor => MINOR,
    };
    let number = table
        .iter()
        .find(|(note, _)| *note == root)
        .map(|(_, number)| *number)?;
    CamelotKey::new(number, mode).ok()
}

/// `"C# Minor"` -> `("C#", Minor)`, `"Abm"` -> `("Ab", Minor)`, `"F"` -> `("F", Major)`
fn split_mode(name: &str) -> Option<(&str, Mode)> {
    if let Some((root, suffix)) = name.split_once(' ') {
        let mode = match suffix.trim() {
            "Major" | "Maj" => Mode::Major,
            "Minor" | "Min" => Mode::Minor,
            _ => return None,
        };
        return Some((root, mode));
    }
    match name.strip_suffix('m') {
        Some(root) => Some((root, Mode::Minor)),
        None => Some((name, Mode::Major)),
    }
}
