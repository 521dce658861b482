#![warn(missing_docs)]

/*!
Typed data arrays for [KVSML](https://github.com/naohisas/KVS) documents.

# Overview

Every KVSML object (points, lines, polygons, volumes, tables, images, transfer functions) keeps
its coordinates, colors, connectivity and values in *data arrays*: flat, homogeneous arrays of one
of eight numeric kinds.  A data array lives in one of three places:

* **inline**: decimal text inside the tag,
* **external ascii**: decimal text in a companion file,
* **external binary**: a headerless dump of native scalars in a companion file, with the
  producer's byte order recorded in the `endian` attribute.

This crate reads and writes those arrays.  It does not parse the surrounding document; a caller
finds the tag, decides how many elements it must hold, and hands the rest to the codec.

## Reading

```
# fn main() -> Result<(), kvsml_array::CodecError> {
use kvsml_array::{read_array, read_static, ElementKind, StorageDescriptor};

// Statically typed...
let coords: Vec<f32> = read_static(6, &StorageDescriptor::inline(), Some("0 0 0, 1 0.5 1"))?;
assert_eq!(coords, [0.0, 0.0, 0.0, 1.0, 0.5, 1.0]);

// ...or typed by the `type` attribute.
let kind: ElementKind = "uchar".parse()?;
let colors = read_array(kind, 3, &StorageDescriptor::inline(), Some("255 128 0"))?;
assert_eq!(colors.to_vec::<u8>()?, [255, 128, 0]);
# Ok(()) }
```

Ascii data is parsed leniently: a malformed token reads as zero, and when fewer tokens are
present than requested the remaining elements are zero.  A binary file that is too short is
always an error ([`CodecError::TruncatedData`]).

## Writing

```
# fn main() -> Result<(), Box<dyn std::error::Error>> {
use kvsml_array::{write_static, read_static, Format, StorageDescriptor};

let dir = tempfile::tempdir()?;
let target = StorageDescriptor::external(dir.path().join("mesh_coord.dat"), Format::Binary, None);

let meta = write_static(&[1.0f32, 2.0, 3.0], &target)?;
// record `meta.endian` as the tag's `endian` attribute
let source = StorageDescriptor::external(dir.path().join("mesh_coord.dat"), Format::Binary, meta.endian);
assert_eq!(read_static::<f32>(3, &source, None)?, [1.0, 2.0, 3.0]);
# Ok(()) }
```

## Working with tags

[`DataArrayTag`] reads the `type`, `file`, `format` and `endian` attributes of a tag through the
[`Node`] trait, resolves the companion file against the document directory, and records the same
attributes on write.  [`Element`] is a detached node for callers without a document tree of their
own.

## Logging

Reads and writes are reported through [`tracing`](https://docs.rs/tracing) at `debug` level;
short ascii data is reported at `warn`.  No subscriber is installed by this crate.
*/

// Run `$body` with `$T` bound to the Rust type storing `$kind`.
macro_rules! dispatch_kind {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::ElementKind::Int8 => { type $T = i8; $body },
            $crate::ElementKind::UInt8 => { type $T = u8; $body },
            $crate::ElementKind::Int16 => { type $T = i16; $body },
            $crate::ElementKind::UInt16 => { type $T = u16; $body },
            $crate::ElementKind::Int32 => { type $T = i32; $body },
            $crate::ElementKind::UInt32 => { type $T = u32; $body },
            $crate::ElementKind::Float32 => { type $T = f32; $body },
            $crate::ElementKind::Float64 => { type $T = f64; $body },
        }
    };
}

mod array;
mod endian;
mod error;
mod kind;
mod read;
mod scalar;
mod storage;
mod tag;
mod tokenizer;
mod write;

pub use array::DynamicArray;
pub use endian::{resolve_swap, Endian};
pub use error::{CodecError, Result, UnknownTypeError};
pub use kind::ElementKind;
pub use read::{read_array, read_static, read_static_as, ReadOptions};
pub use scalar::Scalar;
pub use storage::{external_file_name, select_storage, Format, Location, StorageDescriptor, WritingDataType};
pub use tag::{DataArrayTag, Element, Node};
pub use tokenizer::{Delimiters, Tokenizer};
pub use write::{write_array, write_static, WrittenMetadata};
