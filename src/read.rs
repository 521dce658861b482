use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::array::DynamicArray;
use crate::endian::{resolve_swap, Endian};
use crate::error::{CodecError, Result};
use crate::kind::ElementKind;
use crate::scalar::Scalar;
use crate::storage::{Format, Location, StorageDescriptor};
use crate::tokenizer::{Delimiters, Tokenizer};

/// Configuration for reading data arrays.
///
/// ```
/// # fn main() -> Result<(), kvsml_array::CodecError> {
/// use kvsml_array::{Delimiters, ReadOptions, StorageDescriptor};
///
/// let options = ReadOptions::new().delimiters(Delimiters::WHITESPACE);
/// let values: Vec<i32> = options.read_static(3, &StorageDescriptor::inline(), Some("4 5\n6"))?;
/// assert_eq!(values, [4, 5, 6]);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct ReadOptions<'d> {
    delimiters: Delimiters<'d>,
    strict: bool,
}

impl ReadOptions<'static> {
    /// Default configuration: [`Delimiters::DATA`], lenient token counts.
    pub fn new() -> Self {
        ReadOptions { delimiters: Delimiters::DATA, strict: false }
    }
}

impl Default for ReadOptions<'static> {
    fn default() -> Self {
        ReadOptions::new()
    }
}

impl<'d> ReadOptions<'d> {
    /// Set the characters separating ascii tokens.
    pub fn delimiters<'e>(self, delimiters: Delimiters<'e>) -> ReadOptions<'e> {
        ReadOptions { delimiters, strict: self.strict }
    }

    /// Fail with [`CodecError::TooFewTokens`] when ascii data holds fewer values than requested.
    ///
    /// By default a short ascii array is accepted and the missing trailing elements are zero.
    pub fn strict_token_count(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read `count` elements of `kind`.
    ///
    /// `inline_text` is the text content of the data array tag; it is required for
    /// [`Location::Inline`] and ignored otherwise.  External paths are used as given, so they
    /// should already be resolved with [`StorageDescriptor::relative_to`].
    pub fn read_array(
        &self,
        kind: ElementKind,
        count: usize,
        storage: &StorageDescriptor,
        inline_text: Option<&str>,
    ) -> Result<DynamicArray> {
        match (storage.location(), storage.format()) {
            (Location::External(path), Some(Format::Binary)) => {
                debug!(%kind, count, path = %path.display(), "reading external binary data array");
                let bytes = read_exact_bytes(path, count, kind.byte_width())?;
                let mut array = DynamicArray::from_bytes(kind, bytes)?;
                if self.needs_swap(storage.endian(), kind) {
                    array.swap_bytes();
                }
                Ok(array)
            },
            _ => dispatch_kind!(kind, T => {
                Ok(DynamicArray::from_values(self.read_static::<T>(count, storage, inline_text)?))
            }),
        }
    }

    /// Read `count` elements whose kind is known statically.
    pub fn read_static<T: Scalar>(
        &self,
        count: usize,
        storage: &StorageDescriptor,
        inline_text: Option<&str>,
    ) -> Result<Vec<T>> {
        match (storage.location(), storage.format()) {
            (Location::Inline, _) => {
                debug!(kind = %T::KIND, count, "reading inline data array");
                let text = inline_text.ok_or(CodecError::MissingInlineText)?;
                self.parse_tokens(text, count)
            },
            (Location::External(path), Some(Format::Ascii)) => {
                debug!(kind = %T::KIND, count, path = %path.display(), "reading external ascii data array");
                let text = std::fs::read_to_string(path).map_err(|e| CodecError::io(path, e))?;
                self.parse_tokens(&text, count)
            },
            (Location::External(path), _) => {
                debug!(kind = %T::KIND, count, path = %path.display(), "reading external binary data array");
                let width = T::KIND.byte_width();
                let bytes = read_exact_bytes(path, count, width)?;
                let mut values: Vec<T> = bytes.chunks_exact(width).map(T::read_binary).collect();
                if self.needs_swap(storage.endian(), T::KIND) {
                    values.iter_mut().for_each(Scalar::swap_bytes);
                }
                Ok(values)
            },
        }
    }

    /// Read `count` elements stored as `disk_kind`, converting each one numerically to `T`.
    ///
    /// Every value is decoded at its on-disk width first; no bytes are reinterpreted across
    /// widths.
    pub fn read_static_as<T: Scalar>(
        &self,
        disk_kind: ElementKind,
        count: usize,
        storage: &StorageDescriptor,
        inline_text: Option<&str>,
    ) -> Result<Vec<T>> {
        if disk_kind == T::KIND {
            return self.read_static(count, storage, inline_text);
        }
        trace!(from = %disk_kind, to = %T::KIND, "converting data array elements");
        dispatch_kind!(disk_kind, D => {
            let disk = self.read_static::<D>(count, storage, inline_text)?;
            Ok(disk.into_iter().map(T::cast_from).collect())
        })
    }

    fn parse_tokens<T: Scalar>(&self, text: &str, count: usize) -> Result<Vec<T>> {
        let mut values: Vec<T> = Tokenizer::new(text, self.delimiters)
            .take(count)
            .map(T::parse_ascii)
            .collect();

        let parsed = values.len();
        if parsed < count {
            let too_few = CodecError::TooFewTokens { expected: count, actual: parsed };
            if self.strict || values.try_reserve_exact(count - parsed).is_err() {
                return Err(too_few);
            }
            warn!(expected = count, actual = parsed, "ascii data array is short; trailing elements left as zero");
            values.resize(count, T::default());
        }
        Ok(values)
    }

    fn needs_swap(&self, declared: Option<Endian>, kind: ElementKind) -> bool {
        if kind.is_byte_sized() && declared.is_some() {
            trace!(%kind, "ignoring byte order of a byte-sized kind");
        }
        let swap = resolve_swap(declared, Endian::of_machine(), kind);
        trace!(%kind, swap, "resolved byte order");
        swap
    }
}

/// Read `count` elements of `kind` with the default [`ReadOptions`].
pub fn read_array(
    kind: ElementKind,
    count: usize,
    storage: &StorageDescriptor,
    inline_text: Option<&str>,
) -> Result<DynamicArray> {
    ReadOptions::new().read_array(kind, count, storage, inline_text)
}

/// Read `count` statically typed elements with the default [`ReadOptions`].
pub fn read_static<T: Scalar>(
    count: usize,
    storage: &StorageDescriptor,
    inline_text: Option<&str>,
) -> Result<Vec<T>> {
    ReadOptions::new().read_static(count, storage, inline_text)
}

/// Read `count` elements stored as `disk_kind` into `T`, with the default [`ReadOptions`].
pub fn read_static_as<T: Scalar>(
    disk_kind: ElementKind,
    count: usize,
    storage: &StorageDescriptor,
    inline_text: Option<&str>,
) -> Result<Vec<T>> {
    ReadOptions::new().read_static_as(disk_kind, count, storage, inline_text)
}

// A short file is an error; trailing bytes are ignored.  A byte count too large for `usize`
// saturates, so it is always reported as truncated.
fn read_exact_bytes(path: &Path, count: usize, width: usize) -> Result<Vec<u8>> {
    let expected = count.saturating_mul(width);
    let truncated = |actual| CodecError::TruncatedData { path: path.to_path_buf(), expected, actual };

    let file = File::open(path).map_err(|e| CodecError::io(path, e))?;
    let metadata = file.metadata().map_err(|e| CodecError::io(path, e))?;
    let available = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if metadata.is_file() && available < expected {
        return Err(truncated(available));
    }

    let mut bytes = Vec::with_capacity(expected.min(available));
    file.take(expected as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| CodecError::io(path, e))?;

    if bytes.len() < expected {
        return Err(truncated(bytes.len()));
    }
    Ok(bytes)
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use std::io::Write;

    fn binary_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn foreign_endian() -> Endian {
        match Endian::of_machine() {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }

    #[test]
    fn inline_requires_text() {
        match read_array(ElementKind::Int32, 3, &StorageDescriptor::inline(), None) {
            Err(CodecError::MissingInlineText) => {},
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn inline_values() {
        let array = read_array(ElementKind::UInt8, 4, &StorageDescriptor::inline(), Some("0 65 200 255")).unwrap();
        assert_eq!(array.to_vec::<u8>().unwrap(), [0, 65, 200, 255]);

        let values: Vec<f64> = read_static(3, &StorageDescriptor::inline(), Some("1.5,\t-2\n3e2")).unwrap();
        assert_eq!(values, [1.5, -2.0, 300.0]);
    }

    #[test]
    fn extra_tokens_are_discarded() {
        let values: Vec<i16> = read_static(2, &StorageDescriptor::inline(), Some("1 2 3 4")).unwrap();
        assert_eq!(values, [1, 2]);
    }

    // Short ascii data is accepted and zero-filled.  Whether this should instead be an error
    // like a short binary file is unresolved; `strict_token_count` opts into the error.
    #[test]
    fn short_ascii_is_lenient() {
        let values: Vec<i32> = read_static(5, &StorageDescriptor::inline(), Some("7 8")).unwrap();
        assert_eq!(values, [7, 8, 0, 0, 0]);

        let strict = ReadOptions::new().strict_token_count(true);
        match strict.read_static::<i32>(5, &StorageDescriptor::inline(), Some("7 8")) {
            Err(CodecError::TooFewTokens { expected: 5, actual: 2 }) => {},
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_tokens_become_zero() {
        let values: Vec<f32> = read_static(3, &StorageDescriptor::inline(), Some("1 oops 3")).unwrap();
        assert_eq!(values, [1.0, 0.0, 3.0]);
    }

    #[test]
    fn whitespace_delimiters_keep_commas() {
        let options = ReadOptions::new().delimiters(Delimiters::WHITESPACE);
        let values: Vec<i32> = options.read_static(2, &StorageDescriptor::inline(), Some("1,2 3")).unwrap();
        // "1,2" is one token and parses as its numeric prefix
        assert_eq!(values, [1, 3]);
    }

    #[test]
    fn external_ascii() {
        let file = binary_file(b"1, 2, 3\n4");
        let storage = StorageDescriptor::external(file.path(), Format::Ascii, None);
        let values: Vec<u32> = read_static(4, &storage, None).unwrap();
        assert_eq!(values, [1, 2, 3, 4]);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.dat");
        for format in [Format::Ascii, Format::Binary] {
            let storage = StorageDescriptor::external(&path, format, None);
            match read_array(ElementKind::Float32, 1, &storage, None) {
                Err(CodecError::Io { path: p, .. }) => assert_eq!(p, path),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn native_binary() {
        let bytes: Vec<u8> = [10i32, -20, 30].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let file = binary_file(&bytes);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, None);
        let array = read_array(ElementKind::Int32, 3, &storage, None).unwrap();
        assert_eq!(array.to_vec::<i32>().unwrap(), [10, -20, 30]);

        let storage = StorageDescriptor::external(file.path(), Format::Binary, Some(Endian::of_machine()));
        assert_eq!(read_static::<i32>(3, &storage, None).unwrap(), [10, -20, 30]);
    }

    #[test]
    fn foreign_binary_is_swapped() {
        let bytes: Vec<u8> = [1.5f32, -0.25].iter().flat_map(|v| v.to_bits().swap_bytes().to_ne_bytes()).collect();
        let file = binary_file(&bytes);

        let declared = StorageDescriptor::external(file.path(), Format::Binary, Some(foreign_endian()));
        assert_eq!(read_static::<f32>(2, &declared, None).unwrap(), [1.5, -0.25]);
        let array = read_array(ElementKind::Float32, 2, &declared, None).unwrap();
        assert_eq!(array.to_vec::<f32>().unwrap(), [1.5, -0.25]);

        // without the declaration the bytes are taken as-is
        let undeclared = StorageDescriptor::external(file.path(), Format::Binary, None);
        let raw = read_static::<f32>(2, &undeclared, None).unwrap();
        assert_ne!(raw[0].to_bits(), 1.5f32.to_bits());
    }

    #[test]
    fn byte_kinds_ignore_endian() {
        let file = binary_file(&[1, 2, 255]);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, Some(foreign_endian()));
        assert_eq!(read_static::<u8>(3, &storage, None).unwrap(), [1, 2, 255]);
        assert_eq!(read_static::<i8>(3, &storage, None).unwrap(), [1, 2, -1]);
    }

    #[test]
    fn truncated_binary() {
        let file = binary_file(&[0u8; 6 * 4]);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, None);
        match read_array(ElementKind::Float32, 10, &storage, None) {
            Err(CodecError::TruncatedData { expected: 40, actual: 24, .. }) => {},
            other => panic!("unexpected {:?}", other),
        }
        match read_static::<u32>(10, &storage, None) {
            Err(CodecError::TruncatedData { expected: 40, actual: 24, .. }) => {},
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn oversized_count_is_an_error() {
        let file = binary_file(&[0u8; 8]);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, None);
        match read_array(ElementKind::Float32, usize::MAX / 2, &storage, None) {
            Err(CodecError::TruncatedData { expected: usize::MAX, actual: 8, .. }) => {},
            other => panic!("unexpected {:?}", other),
        }
        match read_static::<f64>(usize::MAX / 16, &storage, None) {
            Err(CodecError::TruncatedData { expected, actual: 8, .. }) => assert_eq!(expected, usize::MAX / 16 * 8),
            other => panic!("unexpected {:?}", other),
        }

        // ascii data cannot be zero-filled that far either
        match read_static::<u8>(usize::MAX, &StorageDescriptor::inline(), Some("1 2")) {
            Err(CodecError::TooFewTokens { expected: usize::MAX, actual: 2 }) => {},
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let file = binary_file(&[1, 0, 2, 0, 3]);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, None);
        assert_eq!(read_array(ElementKind::UInt8, 2, &storage, None).unwrap().len(), 2);
    }

    #[test]
    fn narrowing_conversion() {
        let bytes: Vec<u8> = [1.0f64, 2.5, -3.75].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let file = binary_file(&bytes);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, None);

        let values: Vec<f32> = read_static_as(ElementKind::Float64, 3, &storage, None).unwrap();
        assert_eq!(values, [1.0, 2.5, -3.75]);
        let values: Vec<i32> = read_static_as(ElementKind::Float64, 3, &storage, None).unwrap();
        assert_eq!(values, [1, 2, -3]);
    }

    #[test]
    fn widening_conversion_with_swap() {
        let bytes: Vec<u8> = [300u16, 7].iter().flat_map(|v| v.swap_bytes().to_ne_bytes()).collect();
        let file = binary_file(&bytes);
        let storage = StorageDescriptor::external(file.path(), Format::Binary, Some(foreign_endian()));

        let values: Vec<f64> = read_static_as(ElementKind::UInt16, 2, &storage, None).unwrap();
        assert_eq!(values, [300.0, 7.0]);
    }

    #[test]
    fn zero_count() {
        let array = read_array(ElementKind::Float64, 0, &StorageDescriptor::inline(), Some("")).unwrap();
        assert!(array.is_empty());
    }
}
