use std::fmt;

use crate::error::UnknownTypeError;

/// The closed set of numeric element kinds a KVSML data array may hold.
///
/// Each kind has a canonical name, as written in the `type` attribute of a data array tag,
/// and a fixed byte width.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kvsml_array::ElementKind;
///
/// let kind = "unsigned short".parse::<ElementKind>()?;
/// assert_eq!(kind, ElementKind::UInt16);
/// assert_eq!(kind.name(), "ushort");
/// assert_eq!(kind.byte_width(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Name `char`.
    Int8,
    /// Name `uchar` (also `unsigned char`).
    UInt8,
    /// Name `short`.
    Int16,
    /// Name `ushort` (also `unsigned short`).
    UInt16,
    /// Name `int`.
    Int32,
    /// Name `uint` (also `unsigned int`).
    UInt32,
    /// Name `float`.
    Float32,
    /// Name `double`.
    Float64,
}

impl ElementKind {
    /// Every kind, in registry order.
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Int8,
        ElementKind::UInt8,
        ElementKind::Int16,
        ElementKind::UInt16,
        ElementKind::Int32,
        ElementKind::UInt32,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    /// Resolve a type name.
    ///
    /// Accepts the eight canonical names plus the synonyms `unsigned char`, `unsigned short`
    /// and `unsigned int`.  Anything else is rejected rather than defaulted.
    pub fn from_name(name: &str) -> Result<Self, UnknownTypeError> {
        match name {
            "char" => Ok(ElementKind::Int8),
            "uchar" | "unsigned char" => Ok(ElementKind::UInt8),
            "short" => Ok(ElementKind::Int16),
            "ushort" | "unsigned short" => Ok(ElementKind::UInt16),
            "int" => Ok(ElementKind::Int32),
            "uint" | "unsigned int" => Ok(ElementKind::UInt32),
            "float" => Ok(ElementKind::Float32),
            "double" => Ok(ElementKind::Float64),
            _ => Err(UnknownTypeError { name: name.to_string() }),
        }
    }

    /// Get the canonical name of this kind.  e.g. `"uchar"`.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "char",
            ElementKind::UInt8 => "uchar",
            ElementKind::Int16 => "short",
            ElementKind::UInt16 => "ushort",
            ElementKind::Int32 => "int",
            ElementKind::UInt32 => "uint",
            ElementKind::Float32 => "float",
            ElementKind::Float64 => "double",
        }
    }

    /// Get the number of bytes for a single value.
    pub fn byte_width(self) -> usize {
        match self {
            ElementKind::Int8 |
            ElementKind::UInt8 => 1,

            ElementKind::Int16 |
            ElementKind::UInt16 => 2,

            ElementKind::Int32 |
            ElementKind::UInt32 |
            ElementKind::Float32 => 4,

            ElementKind::Float64 => 8,
        }
    }

    /// Returns `true` for the two 8-bit kinds, for which byte order is irrelevant.
    pub fn is_byte_sized(self) -> bool {
        self.byte_width() == 1
    }

    /// Returns `true` for `float` and `double`.
    pub fn is_float(self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

impl std::str::FromStr for ElementKind {
    type Err = UnknownTypeError;

    fn from_str(input: &str) -> Result<Self, UnknownTypeError> {
        ElementKind::from_name(input)
    }
}
