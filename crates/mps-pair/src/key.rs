use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use mps_core::{ErrorInfo, PhaseError};
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

/// Identity of an interaction between two phases.
///
/// Unordered keys compare equal irrespective of argument order
/// (`"a and b" == "b and a"`); ordered keys are directional
/// (`"a in b" != "b in a"`). An ordered key never equals an unordered one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairKey {
    first: String,
    second: String,
    ordered: bool,
}

impl PairKey {
    /// Creates a key; `ordered` makes the direction significant.
    pub fn new(first: impl Into<String>, second: impl Into<String>, ordered: bool) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            ordered,
        }
    }

    /// Symmetric key for `a` and `b`.
    pub fn unordered(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::new(first, second, false)
    }

    /// Directional key: `first` is the distinguished (dispersed) phase.
    pub fn ordered(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::new(first, second, true)
    }

    /// First phase name, as supplied at construction.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Second phase name, as supplied at construction.
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Whether direction is significant.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// The same pair with the phases swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.second.clone(), self.first.clone(), self.ordered)
    }

    /// True when `name` is one of the two phases.
    pub fn involves(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }
}

fn name_hash(name: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(name.as_bytes());
    hasher.finish()
}

impl PartialEq for PairKey {
    fn eq(&self, other: &Self) -> bool {
        if self.ordered != other.ordered {
            return false;
        }
        let same = self.first == other.first && self.second == other.second;
        let swapped = self.first == other.second && self.second == other.first;
        same || (!self.ordered && swapped)
    }
}

impl Eq for PairKey {}

impl Hash for PairKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.ordered {
            state.write_u8(1);
            self.first.hash(state);
            self.second.hash(state);
        } else {
            // Commutative combination keeps (a, b) and (b, a) in one bucket.
            state.write_u8(0);
            state.write_u64(name_hash(&self.first).wrapping_add(name_hash(&self.second)));
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = if self.ordered { "in" } else { "and" };
        write!(f, "{} {} {}", self.first, joiner, self.second)
    }
}

impl FromStr for PairKey {
    type Err = PhaseError;

    /// Parses `"<a> and <b>"` (unordered) or `"<a> in <b>"` (ordered).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [first, "and", second] => Ok(Self::unordered(*first, *second)),
            [first, "in", second] => Ok(Self::ordered(*first, *second)),
            _ => Err(PhaseError::Config(
                ErrorInfo::new("pair-spec", "malformed phase pair specification")
                    .with_context("pair", s)
                    .with_hint("expected \"<a> and <b>\" or \"<a> in <b>\""),
            )),
        }
    }
}

impl TryFrom<String> for PairKey {
    type Error = PhaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PairKey> for String {
    fn from(key: PairKey) -> Self {
        key.to_string()
    }
}
