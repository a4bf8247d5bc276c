//! Scan operators and operand descriptions.
//!
//! An operand spec string encodes how raw bytes become an integer:
//!
//! | char | meaning                                   |
//! |------|-------------------------------------------|
//! | 1st  | `s` signed, `u` unsigned                  |
//! | 2nd  | `b` 1 byte, `w` 2, `d` 4, `q` 8           |
//! | 3rd  | `l` little, `b` big (width > 1 only)      |
//!
//! e.g. `"ub"`, `"swl"`, `"udb"`, `"sql"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display)]
pub enum ScanOperator {
    #[strum(to_string = "<", serialize = "lt")]
    LessThan,
    #[strum(to_string = "<=", serialize = "le")]
    LessEqual,
    #[strum(to_string = ">", serialize = "gt")]
    GreaterThan,
    #[strum(to_string = ">=", serialize = "ge")]
    GreaterEqual,
    #[strum(to_string = "==", serialize = "=", serialize = "eq")]
    Equal,
    #[strum(to_string = "!=", serialize = "~=", serialize = "ne")]
    NotEqual,
}

impl ScanOperator {
    pub fn parse(token: &str) -> Result<Self> {
        Self::from_str(token.trim()).map_err(|_| Error::InvalidOperator(token.to_string()))
    }

    pub fn symbol(&self) -> &'static str {
        self.into()
    }

    pub fn compare<T: Ord>(self, lhs: T, rhs: T) -> bool {
        match self {
            Self::LessThan => lhs < rhs,
            Self::LessEqual => lhs <= rhs,
            Self::GreaterThan => lhs > rhs,
            Self::GreaterEqual => lhs >= rhs,
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
    Dword,
    Qword,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
            Self::Qword => 8,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// All-ones mask covering the operand width
    pub fn mask(self) -> u64 {
        match self {
            Self::Qword => u64::MAX,
            other => (1u64 << other.bits()) - 1,
        }
    }

    fn token(self) -> char {
        match self {
            Self::Byte => 'b',
            Self::Word => 'w',
            Self::Dword => 'd',
            Self::Qword => 'q',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Signedness, width and byte order of a scanned operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperandSpec {
    pub signed: bool,
    pub width: Width,
    pub endianness: Endianness,
}

impl Default for OperandSpec {
    fn default() -> Self {
        Self::new(false, Width::Byte, Endianness::Little)
    }
}

impl OperandSpec {
    /// Byte order is normalized to little-endian for 1-byte operands.
    pub fn new(signed: bool, width: Width, endianness: Endianness) -> Self {
        let endianness = if width == Width::Byte {
            Endianness::Little
        } else {
            endianness
        };
        Self {
            signed,
            width,
            endianness,
        }
    }

    pub fn width_bytes(&self) -> usize {
        self.width.bytes()
    }

    /// Truncate a 64-bit value to the operand width.
    pub fn truncate(&self, value: u64) -> u64 {
        value & self.width.mask()
    }

    /// Two's-complement reinterpretation of a width-sized bit pattern.
    pub fn sign_extend(&self, raw: u64) -> i64 {
        let shift = 64 - self.width.bits();
        ((raw << shift) as i64) >> shift
    }

    /// Compare two raw width-sized patterns under this spec's signedness.
    pub fn compare(&self, operator: ScanOperator, lhs: u64, rhs: u64) -> bool {
        if self.signed {
            operator.compare(self.sign_extend(lhs), self.sign_extend(rhs))
        } else {
            operator.compare(lhs, rhs)
        }
    }
}

impl FromStr for OperandSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidOperandSpec(format!("'{}': {}", s, reason));
        let mut chars = s.trim().chars();

        let signed = match chars.next() {
            Some('s') => true,
            Some('u') => false,
            Some(c) => return Err(invalid(&format!("unknown signedness '{}'", c))),
            None => return Err(invalid("empty spec")),
        };

        let width = match chars.next() {
            Some('b') => Width::Byte,
            Some('w') => Width::Word,
            Some('d') => Width::Dword,
            Some('q') => Width::Qword,
            Some(c) => return Err(invalid(&format!("unknown width '{}'", c))),
            None => return Err(invalid("missing width")),
        };

        let endianness = match chars.next() {
            Some('l') => Endianness::Little,
            Some('b') => Endianness::Big,
            Some(c) => return Err(invalid(&format!("unknown endianness '{}'", c))),
            None if width == Width::Byte => Endianness::Little,
            None => return Err(invalid("missing endianness for multi-byte width")),
        };

        if let Some(c) = chars.next() {
            return Err(invalid(&format!("unexpected trailing '{}'", c)));
        }

        Ok(Self::new(signed, width, endianness))
    }
}

impl fmt::Display for OperandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.signed { 's' } else { 'u' };
        write!(f, "{}{}", sign, self.width.token())?;
        if self.width != Width::Byte {
            let order = match self.endianness {
                Endianness::Little => 'l',
                Endianness::Big => 'b',
            };
            write!(f, "{}", order)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for OperandSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OperandSpec> for String {
    fn from(spec: OperandSpec) -> Self {
        spec.to_string()
    }
}
