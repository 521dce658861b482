//! Per-kind primitives: ascii tokens, native-order bytes, byte swapping and numeric casts.

use std::fmt;

use byteorder::{ByteOrder, NativeEndian};

use crate::kind::ElementKind;

/// A Rust primitive that stores one of the eight [`ElementKind`]s.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `f32` and `f64`.
/// The trait is sealed.
pub trait Scalar: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static + private::Sealed {
    /// The kind this type stores.
    const KIND: ElementKind;

    /// Native-order byte representation, `KIND.byte_width()` bytes long.
    type Bytes: AsRef<[u8]> + Copy;

    /// Parse an ascii token.
    ///
    /// This never fails.  Like the C library conversions it replaces, it reads the longest
    /// numeric prefix of the token, and a token with no such prefix becomes zero.
    fn parse_ascii(token: &str) -> Self;

    /// Format as ascii decimal text.  8-bit kinds are written as numbers, never as characters.
    fn format_ascii(self) -> String;

    /// Reinterpret the first `KIND.byte_width()` bytes in native host order.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than the width of the kind.
    fn read_binary(bytes: &[u8]) -> Self;

    /// Native host order bytes of this value.
    fn write_binary(self) -> Self::Bytes;

    /// Reverse the byte order in place.  A no-op for the 8-bit kinds.
    fn swap_bytes(&mut self);

    #[doc(hidden)]
    fn to_number(self) -> Number;

    #[doc(hidden)]
    fn from_number(number: Number) -> Self;

    /// Numerically convert from another kind.
    ///
    /// Float to integer truncates toward zero (saturating at the bounds), integer to integer
    /// keeps the low bits, anything to float rounds to nearest.
    fn cast_from<U: Scalar>(value: U) -> Self {
        Self::from_number(value.to_number())
    }
}

mod private {
    pub trait Sealed {}
}

/// Intermediate value of a numeric cast.
#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Number {
    /// Any integer kind.
    Int(i64),
    /// Either float kind.
    Float(f64),
}

// Longest prefix of `token` that an integer parser accepts: optional sign then digits.
fn int_prefix(token: &str) -> &str {
    let bytes = token.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start { "" } else { &token[..end] }
}

// Longest prefix of `token` that looks like a decimal float: sign, digits, fraction, exponent.
fn float_prefix(token: &str) -> &str {
    let bytes = token.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !token[mantissa_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return "";
    }

    // the exponent only counts if at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    &token[..end]
}

pub(crate) fn parse_lenient_int(token: &str) -> i64 {
    let token = token.trim_start();
    match token.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let prefix = int_prefix(token);
            match prefix.parse::<i64>() {
                Ok(v) => v,
                // overflow of a well-formed prefix
                Err(_) if !prefix.is_empty() => {
                    if prefix.starts_with('-') { i64::MIN } else { i64::MAX }
                },
                Err(_) => 0,
            }
        },
    }
}

pub(crate) fn parse_lenient_float<F: std::str::FromStr + Default>(token: &str) -> F {
    let token = token.trim_start();
    match token.parse::<F>() {
        Ok(v) => v,
        Err(_) => float_prefix(token).parse::<F>().unwrap_or_default(),
    }
}

macro_rules! impl_int_scalar {
    (
        $( [$kind:ident $int:ident $size:literal ($wide:ty) $read:expr, $swap:expr] )*
    ) => {$(
        impl private::Sealed for $int {}

        impl Scalar for $int {
            const KIND: ElementKind = ElementKind::$kind;
            type Bytes = [u8; $size];

            #[inline]
            fn parse_ascii(token: &str) -> $int {
                parse_lenient_int(token) as $int
            }

            #[inline]
            fn format_ascii(self) -> String {
                <$wide>::from(self).to_string()
            }

            #[inline]
            fn read_binary(bytes: &[u8]) -> $int {
                let read: fn(&[u8]) -> $int = $read;
                read(bytes)
            }

            #[inline]
            fn write_binary(self) -> [u8; $size] {
                self.to_ne_bytes()
            }

            #[inline]
            fn swap_bytes(&mut self) {
                let swap: fn(&mut $int) = $swap;
                swap(self)
            }

            #[inline]
            fn to_number(self) -> Number {
                Number::Int(i64::from(self))
            }

            #[inline]
            fn from_number(number: Number) -> $int {
                match number {
                    Number::Int(v) => v as $int,
                    Number::Float(v) => v as $int,
                }
            }
        }
    )*};
}

impl_int_scalar! {
    [Int8 i8 1 (i16) |bytes| bytes[0] as i8, |_| {}]
    [UInt8 u8 1 (u16) |bytes| bytes[0], |_| {}]
    [Int16 i16 2 (i16) NativeEndian::read_i16, |v| *v = <i16>::swap_bytes(*v)]
    [UInt16 u16 2 (u16) NativeEndian::read_u16, |v| *v = <u16>::swap_bytes(*v)]
    [Int32 i32 4 (i32) NativeEndian::read_i32, |v| *v = <i32>::swap_bytes(*v)]
    [UInt32 u32 4 (u32) NativeEndian::read_u32, |v| *v = <u32>::swap_bytes(*v)]
}

macro_rules! impl_float_scalar {
    ($( [$kind:ident $float:ident $size:literal $read:path] )*) => {$(
        impl private::Sealed for $float {}

        impl Scalar for $float {
            const KIND: ElementKind = ElementKind::$kind;
            type Bytes = [u8; $size];

            #[inline]
            fn parse_ascii(token: &str) -> $float {
                parse_lenient_float::<$float>(token)
            }

            #[inline]
            fn format_ascii(self) -> String {
                self.to_string()
            }

            #[inline]
            fn read_binary(bytes: &[u8]) -> $float {
                $read(bytes)
            }

            #[inline]
            fn write_binary(self) -> [u8; $size] {
                self.to_ne_bytes()
            }

            #[inline]
            fn swap_bytes(&mut self) {
                *self = <$float>::from_bits(self.to_bits().swap_bytes());
            }

            #[inline]
            fn to_number(self) -> Number {
                Number::Float(f64::from(self))
            }

            #[inline]
            fn from_number(number: Number) -> $float {
                match number {
                    Number::Int(v) => v as $float,
                    Number::Float(v) => v as $float,
                }
            }
        }
    )*};
}

impl_float_scalar! {
    [Float32 f32 4 NativeEndian::read_f32]
    [Float64 f64 8 NativeEndian::read_f64]
}
