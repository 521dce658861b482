use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::array::DynamicArray;
use crate::endian::{resolve_swap, Endian};
use crate::error::{CodecError, Result};
use crate::scalar::Scalar;
use crate::storage::{Format, Location, StorageDescriptor};

/// Separator between values inside a tag.
const INLINE_SEPARATOR: &str = " ";
/// Separator between values in an external ascii file.
const EXTERNAL_SEPARATOR: &str = ", ";

/// What the caller must record in the document after a write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WrittenMetadata {
    /// Nothing was written; the data array tag should be left out of the document.
    pub omitted: bool,
    /// Text content for the tag, for inline storage.
    pub text: Option<String>,
    /// Byte order to record in the `endian` attribute, for external binary storage.
    pub endian: Option<Endian>,
}

impl WrittenMetadata {
    fn omitted() -> Self {
        WrittenMetadata { omitted: true, ..Default::default() }
    }
}

/// Write a dynamically typed array to `target`.
///
/// An empty array is not written at all: no file is created and no text is produced.
///
/// External binary data is written in the byte order named by `target.endian()`, or in host
/// order when it names none; either way the order used is reported back.  The caller's array is
/// never modified.
pub fn write_array(data: &DynamicArray, target: &StorageDescriptor) -> Result<WrittenMetadata> {
    dispatch_kind!(data.kind(), T => write_static::<T>(&data.to_vec::<T>()?, target))
}

/// Write a statically typed array to `target`.  Behaves like [`write_array`].
pub fn write_static<T: Scalar>(data: &[T], target: &StorageDescriptor) -> Result<WrittenMetadata> {
    if data.is_empty() {
        debug!(kind = %T::KIND, "skipping empty data array");
        return Ok(WrittenMetadata::omitted());
    }

    let tokens = || data.iter().map(|v| v.format_ascii());
    match (target.location(), target.format()) {
        (Location::Inline, _) => {
            debug!(kind = %T::KIND, count = data.len(), "writing inline data array");
            Ok(WrittenMetadata {
                text: Some(tokens().collect::<Vec<_>>().join(INLINE_SEPARATOR)),
                ..Default::default()
            })
        },
        (Location::External(path), Some(Format::Ascii)) => {
            debug!(kind = %T::KIND, count = data.len(), path = %path.display(), "writing external ascii data array");
            write_file(path, |w| write_tokens(w, tokens()))?;
            Ok(WrittenMetadata::default())
        },
        (Location::External(path), _) => {
            let endian = target.endian().unwrap_or_else(Endian::of_machine);
            let swap = resolve_swap(Some(endian), Endian::of_machine(), T::KIND);
            debug!(kind = %T::KIND, count = data.len(), path = %path.display(), %endian, "writing external binary data array");
            write_file(path, |w| {
                for mut value in data.iter().copied() {
                    if swap {
                        value.swap_bytes();
                    }
                    w.write_all(value.write_binary().as_ref())?;
                }
                Ok(())
            })?;
            Ok(WrittenMetadata { endian: Some(endian), ..Default::default() })
        },
    }
}

fn write_tokens<W: Write>(w: &mut W, tokens: impl IntoIterator<Item = String>) -> io::Result<()> {
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 {
            w.write_all(EXTERNAL_SEPARATOR.as_bytes())?;
        }
        w.write_all(token.as_bytes())?;
    }
    Ok(())
}

// The file is created (or truncated) even if writing fails part way; there is no rollback.
fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| CodecError::io(path, e))?;
    let mut w = BufWriter::new(file);
    body(&mut w).map_err(|e| CodecError::io(path, e))?;
    w.flush().map_err(|e| CodecError::io(path, e))
}
