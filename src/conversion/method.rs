//! Conversion method codes: the bit mask handed to the engine, and the ways
//! callers can spell it.
use crate::error::AacgmError;
use crate::utils::constants::{A2G, ALLOWTRACE, BADIDEA, G2A, GEOCENTRIC, TRACE};
use itertools::Itertools;
use std::fmt;

type Result<T> = std::result::Result<T, AacgmError>;

/// Recognized tokens of a textual method code, in display order
const FLAG_NAMES: [(&str, i32); 6] = [
    ("G2A", G2A),
    ("A2G", A2G),
    ("TRACE", TRACE),
    ("ALLOWTRACE", ALLOWTRACE),
    ("BADIDEA", BADIDEA),
    ("GEOCENTRIC", GEOCENTRIC),
];

/// How to treat tokens of a textual method code that name no known flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Unknown tokens are dropped without complaint
    #[default]
    Lenient,
    /// Unknown tokens are an error
    Strict,
}

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    GeoToAacgm,
    AacgmToGeo,
}

/// Bit mask of conversion options, as the engine understands them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodCode(i32);

impl MethodCode {
    pub const fn from_bits(bits: i32) -> MethodCode {
        MethodCode(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    /// True if any bit of `mask` is set in this code
    pub const fn intersects(self, mask: i32) -> bool {
        self.0 & mask != 0
    }

    pub const fn direction(self) -> Direction {
        if self.intersects(A2G) {
            Direction::AacgmToGeo
        } else {
            Direction::GeoToAacgm
        }
    }

    /// Returns the same options with the direction component replaced.
    pub const fn with_direction(self, direction: Direction) -> MethodCode {
        match direction {
            Direction::GeoToAacgm => MethodCode((self.0 & !A2G) | G2A),
            Direction::AacgmToGeo => MethodCode(self.0 | A2G),
        }
    }

    /// Decodes a pipe-separated list of flag names such as `"G2A|TRACE"`.
    ///
    /// Case and whitespace are ignored, as is the order of the tokens. Flags
    /// are OR-ed rather than summed, so a repeated token counts once:
    /// `"TRACE|TRACE"` is `TRACE`, not `ALLOWTRACE`. A code with no recognized
    /// tokens is `G2A`.
    ///
    /// # Errors
    /// Will return `Err` in [`DecodeMode::Strict`] if a token names no known flag.
    pub fn decode(text: &str, mode: DecodeMode) -> Result<MethodCode> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let mut bits = G2A;
        for token in cleaned.split('|').filter(|t| !t.is_empty()) {
            match FLAG_NAMES.iter().find(|(name, _)| *name == token) {
                Some((_, flag)) => bits |= flag,
                None if mode == DecodeMode::Strict => {
                    return Err(AacgmError::InvalidMethod(format!(
                        "{text}: unrecognized token {token}"
                    )));
                }
                None => {}
            }
        }
        Ok(MethodCode(bits))
    }

    /// Builds a code from individual option switches.
    pub const fn from_flags(
        a2g: bool,
        trace: bool,
        allowtrace: bool,
        badidea: bool,
        geocentric: bool,
    ) -> MethodCode {
        let mut bits = if a2g { A2G } else { G2A };
        if trace {
            bits |= TRACE;
        }
        if allowtrace {
            bits |= ALLOWTRACE;
        }
        if badidea {
            bits |= BADIDEA;
        }
        if geocentric {
            bits |= GEOCENTRIC;
        }
        MethodCode(bits)
    }
}

impl fmt::Display for MethodCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let direction = match self.direction() {
            Direction::GeoToAacgm => "G2A",
            Direction::AacgmToGeo => "A2G",
        };
        let options = FLAG_NAMES
            .iter()
            .filter(|(_, flag)| *flag > A2G && self.intersects(*flag))
            .map(|(name, _)| *name);
        write!(f, "{}", std::iter::once(direction).chain(options).join("|"))
    }
}

/// A method as supplied by a caller, before it is resolved into a bit mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSpec {
    /// Flag names, e.g. `"A2G|TRACE"`
    Text(String),
    /// An already-encoded bit mask, used as is
    Code(i32),
}

impl MethodSpec {
    /// Resolves the method into the bit mask handed to the engine. Integer codes
    /// are passed through without inspecting their bits.
    ///
    /// # Errors
    /// Will return `Err` if textual decoding fails under `mode`.
    pub fn resolve(&self, mode: DecodeMode) -> Result<MethodCode> {
        match self {
            MethodSpec::Text(text) => MethodCode::decode(text, mode),
            MethodSpec::Code(bits) => Ok(MethodCode(*bits)),
        }
    }
}

impl From<&str> for MethodSpec {
    fn from(value: &str) -> Self {
        MethodSpec::Text(value.to_string())
    }
}

impl From<String> for MethodSpec {
    fn from(value: String) -> Self {
        MethodSpec::Text(value)
    }
}

impl From<i32> for MethodSpec {
    fn from(value: i32) -> Self {
        MethodSpec::Code(value)
    }
}

impl From<MethodCode> for MethodSpec {
    fn from(value: MethodCode) -> Self {
        MethodSpec::Code(value.bits())
    }
}

impl Default for MethodSpec {
    fn default() -> Self {
        MethodSpec::Code(G2A)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(text: &str) -> MethodCode {
        MethodCode::decode(text, DecodeMode::Lenient).unwrap()
    }

    #[test]
    fn decode_ignores_case_spacing_and_order() {
        assert_eq!(lenient("G2A|TRACE|BADIDEA"), lenient("BADIDEA | trace | g2a"));
        assert_eq!(lenient("G2A|TRACE|BADIDEA").bits(), TRACE | BADIDEA);
    }

    #[test]
    fn empty_code_defaults_to_g2a() {
        assert_eq!(lenient("").bits(), G2A);
        assert_eq!(lenient("nonsense").direction(), Direction::GeoToAacgm);
    }

    #[test]
    fn unknown_tokens_dropped_when_lenient() {
        assert_eq!(lenient("A2G|TRACEE|GEOCENTRIC").bits(), A2G | GEOCENTRIC);
    }

    #[test]
    fn unknown_tokens_rejected_when_strict() {
        let res = MethodCode::decode("A2G|TRACEE", DecodeMode::Strict);
        assert!(matches!(res, Err(AacgmError::InvalidMethod(_))));
        // a dangling pipe is not a token
        assert_eq!(
            MethodCode::decode("G2A|", DecodeMode::Strict).unwrap().bits(),
            G2A
        );
    }

    #[test]
    fn repeated_tokens_count_once() {
        assert_eq!(lenient("TRACE|trace").bits(), TRACE);
        assert_ne!(lenient("TRACE|TRACE").bits(), ALLOWTRACE);
    }

    #[test]
    fn flags_encode_the_same_as_text() {
        assert_eq!(
            MethodCode::from_flags(true, true, false, false, true),
            lenient("A2G|TRACE|GEOCENTRIC")
        );
        assert_eq!(MethodCode::from_flags(false, false, false, false, false).bits(), G2A);
        assert_eq!(
            MethodCode::from_flags(false, false, true, true, false).bits(),
            ALLOWTRACE | BADIDEA
        );
    }

    #[test]
    fn integer_codes_pass_through_unchecked() {
        let spec = MethodSpec::from(1 << 12);
        assert_eq!(spec.resolve(DecodeMode::Strict).unwrap().bits(), 1 << 12);
    }

    #[test]
    fn direction_can_be_forced() {
        let code = lenient("A2G|TRACE").with_direction(Direction::GeoToAacgm);
        assert_eq!(code.bits(), TRACE);
        assert_eq!(code.with_direction(Direction::AacgmToGeo).bits(), A2G | TRACE);
    }

    #[test]
    fn display_lists_flag_names() {
        assert_eq!(lenient("badidea|a2g|trace").to_string(), "A2G|TRACE|BADIDEA");
        assert_eq!(MethodCode::default().to_string(), "G2A");
    }
}
