//! Kind lattice
//!
//! A [`Kind`] is a bitmask over the eight primitive token kinds. Signatures
//! declare parameter and return kinds as masks; a parameter accepts an
//! argument when the two masks intersect.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::Error;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Kind: u16 {
        const DECIMAL = 1 << 0;
        const STRING = 1 << 1;
        const BOOLEAN = 1 << 2;
        const TIME = 1 << 3;
        const NULL = 1 << 4;
        const LIST = 1 << 5;
        const MAP = 1 << 6;
        /// An unevaluated block.
        const TOKEN = 1 << 7;

        const ATOM = Self::DECIMAL.bits()
            | Self::STRING.bits()
            | Self::BOOLEAN.bits()
            | Self::TIME.bits()
            | Self::NULL.bits();
        const COLLECTION = Self::LIST.bits() | Self::MAP.bits();
        /// Any evaluated value: everything except a raw block.
        const VALUE = Self::ATOM.bits() | Self::COLLECTION.bits();
        const ANY = Self::VALUE.bits() | Self::TOKEN.bits();
    }
}

const PRIMITIVES: [(Kind, &str); 8] = [
    (Kind::DECIMAL, "Decimal"),
    (Kind::STRING, "String"),
    (Kind::BOOLEAN, "Boolean"),
    (Kind::TIME, "Time"),
    (Kind::NULL, "Null"),
    (Kind::LIST, "List"),
    (Kind::MAP, "Map"),
    (Kind::TOKEN, "Token"),
];

const ALIASES: [(Kind, &str); 4] = [
    (Kind::ANY, "Any"),
    (Kind::VALUE, "Value"),
    (Kind::ATOM, "Atom"),
    (Kind::COLLECTION, "Collection"),
];

impl Kind {
    /// `true` when a parameter of this kind can receive an argument of `other`.
    pub fn accepts(self, other: Kind) -> bool {
        self.intersects(other)
    }

    /// Parameters that accept `Token` receive their argument unevaluated.
    pub fn is_quoting(self) -> bool {
        self.contains(Kind::TOKEN)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((_, name)) = ALIASES.iter().find(|(kind, _)| kind == self) {
            return write!(f, "{name}");
        }
        if self.is_empty() {
            return write!(f, "None");
        }
        let mut first = true;
        for (kind, name) in PRIMITIVES {
            if self.contains(kind) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut kind = Kind::empty();
        for part in s.split('|') {
            let part = part.trim();
            let found = PRIMITIVES
                .iter()
                .chain(ALIASES.iter())
                .find(|(_, name)| name.eq_ignore_ascii_case(part))
                .map(|(kind, _)| *kind)
                .ok_or_else(|| Error::invalid_argument(format!("unknown kind `{part}`")))?;
            kind |= found;
        }
        Ok(kind)
    }
}
