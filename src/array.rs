use std::fmt;

use crate::error::{CodecError, Result};
use crate::kind::ElementKind;
use crate::scalar::Scalar;

/// A homogeneous array whose element kind is only known at runtime.
///
/// The values live in one native-order byte buffer tagged with an [`ElementKind`].
/// The buffer always holds exactly `len() * kind().byte_width()` bytes.
///
/// ```
/// use kvsml_array::{DynamicArray, ElementKind};
///
/// let array = DynamicArray::from_values(vec![1.0f32, 2.0, 3.0]);
/// assert_eq!(array.kind(), ElementKind::Float32);
/// assert_eq!(array.len(), 3);
/// assert_eq!(array.as_bytes().len(), 12);
/// assert_eq!(array.get::<f32>(1), Some(2.0));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DynamicArray {
    kind: ElementKind,
    count: usize,
    bytes: Vec<u8>,
}

impl DynamicArray {
    /// An array of `count` zero-valued elements.
    pub fn zeroed(kind: ElementKind, count: usize) -> Self {
        DynamicArray { kind, count, bytes: vec![0; count * kind.byte_width()] }
    }

    /// An empty array of the given kind.
    pub fn empty(kind: ElementKind) -> Self {
        DynamicArray::zeroed(kind, 0)
    }

    /// Take ownership of typed values.
    pub fn from_values<T: Scalar>(values: Vec<T>) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * T::KIND.byte_width());
        for value in &values {
            bytes.extend_from_slice(value.write_binary().as_ref());
        }
        DynamicArray { kind: T::KIND, count: values.len(), bytes }
    }

    /// Wrap a native-order byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidLength`] if the buffer is not a whole number of elements.
    pub fn from_bytes(kind: ElementKind, bytes: Vec<u8>) -> Result<Self> {
        let width = kind.byte_width();
        if bytes.len() % width != 0 {
            return Err(CodecError::InvalidLength { kind, len: bytes.len() });
        }
        Ok(DynamicArray { kind, count: bytes.len() / width, bytes })
    }

    /// The kind of every element.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The raw native-order bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Give up the raw native-order bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Bytes of the element at `index`, if in range.
    pub fn element_bytes(&self, index: usize) -> Option<&[u8]> {
        let width = self.kind.byte_width();
        self.bytes.get(index * width..(index + 1) * width)
    }

    /// Decode the element at `index` as `T`.
    ///
    /// Returns `None` if the index is out of range or `T` is not the stored kind.
    pub fn get<T: Scalar>(&self, index: usize) -> Option<T> {
        if T::KIND != self.kind {
            return None;
        }
        self.element_bytes(index).map(T::read_binary)
    }

    /// Iterate over the values as `T`.
    pub fn values<T: Scalar>(&self) -> Result<impl Iterator<Item = T> + '_> {
        self.expect_kind(T::KIND)?;
        Ok(self.bytes.chunks_exact(self.kind.byte_width()).map(T::read_binary))
    }

    /// Copy the values out as `T`.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        Ok(self.values::<T>()?.collect())
    }

    /// Format every element as an ascii token.
    pub fn to_ascii_tokens(&self) -> Vec<String> {
        dispatch_kind!(self.kind, T => {
            self.bytes
                .chunks_exact(T::KIND.byte_width())
                .map(|b| T::read_binary(b).format_ascii())
                .collect()
        })
    }

    /// Reverse the byte order of every element in place.
    ///
    /// This is a no-op for the 8-bit kinds.
    pub fn swap_bytes(&mut self) {
        if self.kind.is_byte_sized() {
            return;
        }
        let width = self.kind.byte_width();
        for element in self.bytes.chunks_exact_mut(width) {
            element.reverse();
        }
    }

    fn expect_kind(&self, expected: ElementKind) -> Result<()> {
        match self.kind == expected {
            true => Ok(()),
            false => Err(CodecError::KindMismatch { expected, actual: self.kind }),
        }
    }
}

impl<T: Scalar> From<Vec<T>> for DynamicArray {
    fn from(values: Vec<T>) -> Self {
        DynamicArray::from_values(values)
    }
}

impl fmt::Debug for DynamicArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DynamicArray")
            .field("kind", &self.kind)
            .field("values", &self.to_ascii_tokens())
            .finish()
    }
}
