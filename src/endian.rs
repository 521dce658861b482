use std::fmt;

use crate::error::CodecError;
use crate::kind::ElementKind;

/// Byte order of multi-byte scalars, as recorded in the `endian` attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Name `big`.
    Big,
    /// Name `little`.
    Little,
}

impl Endian {
    /// Parse the value of an `endian` attribute.
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "big" => Ok(Endian::Big),
            "little" => Ok(Endian::Little),
            _ => Err(CodecError::UnknownEndian(name.to_string())),
        }
    }

    /// Get the attribute value for this byte order.
    pub fn name(self) -> &'static str {
        match self {
            Endian::Big => "big",
            Endian::Little => "little",
        }
    }

    /// Get the machine endianness.
    pub fn of_machine() -> Self {
        match i32::from_be(0x00_00_00_01) {
            0x00_00_00_01 => Endian::Big,
            _ => Endian::Little,
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

/// Decide whether scalars of `kind` declared as `declared` must be swapped on a `host` machine.
///
/// Byte order is recorded by the producer, never guessed: an absent declaration means the data
/// is taken as-is.  The 8-bit kinds are never swapped.
pub fn resolve_swap(declared: Option<Endian>, host: Endian, kind: ElementKind) -> bool {
    if kind.is_byte_sized() {
        return false;
    }
    match declared {
        Some(declared) => declared != host,
        None => false,
    }
}
