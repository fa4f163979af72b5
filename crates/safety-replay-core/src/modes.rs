//! Safety mode table
//!
//! Maps human-readable safety mode names to the numeric codes understood by
//! the safety hooks. A name that is not in the table is not an error here:
//! [`SafetyModeTable::resolve`] hands it back as [`ModeArg::Raw`] and the
//! replay engine decides whether it can use it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SAFETY_NOOUTPUT: u16 = 0;
pub const SAFETY_HONDA: u16 = 1;
pub const SAFETY_TOYOTA: u16 = 2;
pub const SAFETY_GM: u16 = 3;
pub const SAFETY_HONDA_BOSCH: u16 = 4;
pub const SAFETY_FORD: u16 = 5;
pub const SAFETY_CADILLAC: u16 = 6;
pub const SAFETY_HYUNDAI: u16 = 7;
pub const SAFETY_TESLA: u16 = 8;
pub const SAFETY_CHRYSLER: u16 = 9;
pub const SAFETY_SUBARU: u16 = 10;
pub const SAFETY_SUBARU_HYBRID: u16 = 11;
pub const SAFETY_GM_ASCM: u16 = 0x334;
pub const SAFETY_TOYOTA_IPAS: u16 = 0x1335;
pub const SAFETY_ALLOUTPUT: u16 = 0x1337;
pub const SAFETY_ELM327: u16 = 0xE327;

const BUILTIN_MODES: &[(&str, u16)] = &[
    ("NOOUTPUT", SAFETY_NOOUTPUT),
    ("HONDA", SAFETY_HONDA),
    ("TOYOTA", SAFETY_TOYOTA),
    ("GM", SAFETY_GM),
    ("HONDA_BOSCH", SAFETY_HONDA_BOSCH),
    ("FORD", SAFETY_FORD),
    ("CADILLAC", SAFETY_CADILLAC),
    ("HYUNDAI", SAFETY_HYUNDAI),
    ("TESLA", SAFETY_TESLA),
    ("CHRYSLER", SAFETY_CHRYSLER),
    ("SUBARU", SAFETY_SUBARU),
    ("SUBARU_HYBRID", SAFETY_SUBARU_HYBRID),
    ("GM_ASCM", SAFETY_GM_ASCM),
    ("TOYOTA_IPAS", SAFETY_TOYOTA_IPAS),
    ("ALLOUTPUT", SAFETY_ALLOUTPUT),
    ("ELM327", SAFETY_ELM327),
];

/// Mode argument handed to the replay engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeArg {
    /// Name was found in the table
    Code(u16),
    /// Name was not in the table and is passed through unchanged
    Raw(String),
}

impl ModeArg {
    /// Numeric code, if the table knew the name
    pub fn code(&self) -> Option<u16> {
        match self {
            ModeArg::Code(code) => Some(*code),
            ModeArg::Raw(_) => None,
        }
    }
}

impl fmt::Display for ModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeArg::Code(code) => write!(f, "{}", code),
            ModeArg::Raw(name) => write!(f, "{}", name),
        }
    }
}

/// Name to code lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyModeTable {
    modes: BTreeMap<String, u16>,
}

impl Default for SafetyModeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SafetyModeTable {
    /// Table with the built-in modes
    pub fn builtin() -> Self {
        Self {
            modes: BUILTIN_MODES
                .iter()
                .map(|(name, code)| (name.to_string(), *code))
                .collect(),
        }
    }

    /// Empty table, mostly useful for tests
    pub fn empty() -> Self {
        Self {
            modes: BTreeMap::new(),
        }
    }

    /// Add entries, overriding existing names
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        for (name, code) in overrides {
            self.modes.insert(name.into(), code);
        }
        self
    }

    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.modes.get(name).copied()
    }

    /// Look a name up, falling back to the name itself on a miss
    pub fn resolve(&self, name: &str) -> ModeArg {
        match self.lookup(name) {
            Some(code) => ModeArg::Code(code),
            None => {
                tracing::debug!("Safety mode '{}' not in table, passing it through", name);
                ModeArg::Raw(name.to_string())
            }
        }
    }

    /// Entries sorted by code
    pub fn entries(&self) -> Vec<(&str, u16)> {
        let mut entries: Vec<(&str, u16)> = self
            .modes
            .iter()
            .map(|(name, code)| (name.as_str(), *code))
            .collect();
        entries.sort_by_key(|(name, code)| (*code, *name));
        entries
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit() {
        let table = SafetyModeTable::builtin();
        assert_eq!(table.lookup("SUBARU"), Some(SAFETY_SUBARU));
        assert_eq!(table.resolve("ALLOUTPUT"), ModeArg::Code(0x1337));
    }

    #[test]
    fn test_resolve_miss_passes_name_through() {
        let table = SafetyModeTable::builtin();
        assert_eq!(table.lookup("UNKNOWN_MODE"), None);
        assert_eq!(
            table.resolve("UNKNOWN_MODE"),
            ModeArg::Raw("UNKNOWN_MODE".to_string())
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = SafetyModeTable::builtin();
        assert_eq!(table.resolve("toyota"), ModeArg::Raw("toyota".to_string()));
    }

    #[test]
    fn test_overrides() {
        let table = SafetyModeTable::builtin().with_overrides([("TOYOTA", 100u16)]);
        assert_eq!(table.resolve("TOYOTA"), ModeArg::Code(100));
        assert_eq!(table.len(), BUILTIN_MODES.len());

        let table = SafetyModeTable::empty().with_overrides([("CUSTOM", 42u16)]);
        assert_eq!(table.lookup("CUSTOM"), Some(42));
        assert_eq!(table.lookup("TOYOTA"), None);
    }

    #[test]
    fn test_entries_sorted_by_code() {
        let table = SafetyModeTable::builtin();
        let entries = table.entries();
        assert_eq!(entries.first(), Some(&("NOOUTPUT", 0)));
        assert_eq!(entries.last(), Some(&("ELM327", 0xE327)));
    }

    #[test]
    fn test_mode_arg_display() {
        assert_eq!(ModeArg::Code(2).to_string(), "2");
        assert_eq!(ModeArg::Raw("X".into()).to_string(), "X");
        assert_eq!(ModeArg::Raw("X".into()).code(), None);
    }
}
