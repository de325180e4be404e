//! Character to key-chord translation.
//!
//! The monitor takes keyboard input as named key codes, not text, so
//! typing means translating every character into the chord that
//! produces it on a US layout: `a` is the `a` key, `A` is
//! `shift` + `a`, `!` is `shift` + `1`, a newline is the return key.
//!
//! Characters with no mapping (tabs, control characters, anything
//! non-ASCII) are rejected rather than guessed at.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::protocol::KeyValue;

// ============================================================================
// KeyChord
// ============================================================================

/// Keys pressed together as one stroke, e.g. `ctrl-f2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// Key-code names in press order.
    codes: Vec<String>,
}

impl KeyChord {
    /// Creates a chord of a single key.
    #[inline]
    pub fn single(code: impl Into<String>) -> Self {
        Self {
            codes: vec![code.into()],
        }
    }

    /// Parses a `-`-separated chord spec such as `ctrl-alt-f1`.
    ///
    /// Empty components are skipped, so a literal `-` key must be
    /// spelled by its code name `minus`.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        Self {
            codes: spec
                .split('-')
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Returns the key-code names in press order.
    #[inline]
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Returns `true` if the chord holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Builds the wire descriptors for a `send-key` payload.
    #[must_use]
    pub fn descriptors(&self) -> Vec<KeyValue> {
        self.codes.iter().cloned().map(KeyValue::Qcode).collect()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.codes.join("-"))
    }
}

// ============================================================================
// Character Translation
// ============================================================================

/// Translates one character into the chord that types it.
///
/// Returns `None` for characters outside the supported US-layout set.
#[must_use]
pub fn chord_for(character: char) -> Option<KeyChord> {
    if character.is_ascii_lowercase() || character.is_ascii_digit() {
        return Some(KeyChord::single(character.to_string()));
    }

    if character.is_ascii_uppercase() {
        return Some(KeyChord::parse(&format!(
            "shift-{}",
            character.to_ascii_lowercase()
        )));
    }

    symbol_spec(character).map(KeyChord::parse)
}

/// Chord specs for US-layout symbols and whitespace.
fn symbol_spec(character: char) -> Option<&'static str> {
    Some(match character {
        ' ' => "spc",
        '`' => "grave_accent",
        '~' => "shift-grave_accent",
        '!' => "shift-1",
        '@' => "shift-2",
        '#' => "shift-3",
        '$' => "shift-4",
        '%' => "shift-5",
        '^' => "shift-6",
        '&' => "shift-7",
        '*' => "shift-8",
        '(' => "shift-9",
        ')' => "shift-0",
        '-' => "minus",
        '_' => "shift-minus",
        '=' => "equal",
        '+' => "shift-equal",
        '[' => "bracket_left",
        ']' => "bracket_right",
        '{' => "shift-bracket_left",
        '}' => "shift-bracket_right",
        ',' => "comma",
        '.' => "dot",
        '<' => "shift-comma",
        '>' => "shift-dot",
        '/' => "slash",
        '?' => "shift-slash",
        ';' => "semicolon",
        ':' => "shift-semicolon",
        '\'' => "apostrophe",
        '"' => "shift-apostrophe",
        '\\' => "backslash",
        '|' => "shift-backslash",
        '\n' => "ret",
        _ => return None,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(chord: &KeyChord) -> Vec<&str> {
        chord.codes().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_lowercase_and_digits_are_single_keys() {
        assert_eq!(codes(&chord_for('a').unwrap()), ["a"]);
        assert_eq!(codes(&chord_for('z').unwrap()), ["z"]);
        assert_eq!(codes(&chord_for('0').unwrap()), ["0"]);
        assert_eq!(codes(&chord_for('7').unwrap()), ["7"]);
    }

    #[test]
    fn test_uppercase_adds_shift() {
        assert_eq!(codes(&chord_for('A').unwrap()), ["shift", "a"]);
        assert_eq!(codes(&chord_for('Q').unwrap()), ["shift", "q"]);
    }

    #[test]
    fn test_symbols_use_code_names() {
        assert_eq!(codes(&chord_for(' ').unwrap()), ["spc"]);
        assert_eq!(codes(&chord_for('-').unwrap()), ["minus"]);
        assert_eq!(codes(&chord_for('/').unwrap()), ["slash"]);
        assert_eq!(codes(&chord_for('\\').unwrap()), ["backslash"]);
        assert_eq!(codes(&chord_for('\n').unwrap()), ["ret"]);
    }

    #[test]
    fn test_shifted_symbols() {
        assert_eq!(codes(&chord_for('!').unwrap()), ["shift", "1"]);
        assert_eq!(codes(&chord_for('@').unwrap()), ["shift", "2"]);
        assert_eq!(codes(&chord_for('_').unwrap()), ["shift", "minus"]);
        assert_eq!(codes(&chord_for('?').unwrap()), ["shift", "slash"]);
        assert_eq!(codes(&chord_for('"').unwrap()), ["shift", "apostrophe"]);
        assert_eq!(codes(&chord_for('~').unwrap()), ["shift", "grave_accent"]);
    }

    #[test]
    fn test_unmapped_characters() {
        assert!(chord_for('\t').is_none());
        assert!(chord_for('\r').is_none());
        assert!(chord_for('é').is_none());
        assert!(chord_for('€').is_none());
    }

    #[test]
    fn test_parse_chord_spec() {
        assert_eq!(codes(&KeyChord::parse("ctrl-f2")), ["ctrl", "f2"]);
        assert_eq!(
            codes(&KeyChord::parse("ctrl-alt-del")),
            ["ctrl", "alt", "del"]
        );
        assert_eq!(codes(&KeyChord::parse("ret")), ["ret"]);
    }

    #[test]
    fn test_parse_skips_empty_components() {
        assert_eq!(codes(&KeyChord::parse("ctrl--f2")), ["ctrl", "f2"]);
        assert!(KeyChord::parse("").is_empty());
    }

    #[test]
    fn test_display_joins_with_dashes() {
        assert_eq!(KeyChord::parse("ctrl-alt-f1").to_string(), "ctrl-alt-f1");
        assert_eq!(KeyChord::single("ret").to_string(), "ret");
    }

    #[test]
    fn test_descriptors_are_qcodes() {
        let chord = KeyChord::parse("ctrl-f2");
        assert_eq!(
            chord.descriptors(),
            vec![KeyValue::qcode("ctrl"), KeyValue::qcode("f2")]
        );
    }
}
