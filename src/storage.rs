//! Deciding where and how a data array is stored.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::endian::Endian;
use crate::error::{CodecError, Result};

/// Encoding of an external data file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// Name `ascii`.  Decimal tokens.
    Ascii,
    /// Name `binary`.  A headerless dump of contiguous scalars.
    Binary,
}

impl Format {
    /// Parse the value of a `format` attribute.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "ascii" => Ok(Format::Ascii),
            "binary" => Ok(Format::Binary),
            _ => Err(CodecError::UnknownFormat(name.to_string())),
        }
    }

    /// Get the attribute value for this format.
    pub fn name(self) -> &'static str {
        match self {
            Format::Ascii => "ascii",
            Format::Binary => "binary",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

/// Where the array content lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Text content of the data array tag itself.
    Inline,
    /// A companion file.
    External(PathBuf),
}

/// The encoding of one data array, as declared by (or destined for) its tag.
///
/// `format` and `endian` only mean something for [`Location::External`], and `endian` only for
/// [`Format::Binary`].  Build one with [`select_storage`] or [`StorageDescriptor::inline`] and
/// [`StorageDescriptor::external`], which cannot produce an external location without a format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageDescriptor {
    location: Location,
    format: Format,
    endian: Option<Endian>,
}

impl StorageDescriptor {
    /// Text inside the tag.
    pub fn inline() -> Self {
        StorageDescriptor { location: Location::Inline, format: Format::Ascii, endian: None }
    }

    /// A companion file of the given format.
    pub fn external(file: impl Into<PathBuf>, format: Format, endian: Option<Endian>) -> Self {
        let endian = match format {
            Format::Binary => endian,
            Format::Ascii => None,
        };
        StorageDescriptor { location: Location::External(file.into()), format, endian }
    }

    /// Where the content lives.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The external file, if any.
    pub fn file(&self) -> Option<&Path> {
        match &self.location {
            Location::Inline => None,
            Location::External(path) => Some(path),
        }
    }

    /// The external format.  `None` for inline storage.
    pub fn format(&self) -> Option<Format> {
        match self.location {
            Location::Inline => None,
            Location::External(_) => Some(self.format),
        }
    }

    /// The declared byte order.  `None` unless this is external binary storage with an `endian`.
    pub fn endian(&self) -> Option<Endian> {
        self.endian
    }

    /// Resolve a relative external file against the directory of the owning document.
    ///
    /// Absolute paths and inline storage are returned unchanged.
    pub fn relative_to(self, document_dir: &Path) -> Self {
        match self.location {
            Location::External(path) if path.is_relative() => StorageDescriptor {
                location: Location::External(document_dir.join(path)),
                ..self
            },
            _ => self,
        }
    }
}

/// Choose the storage of a data array from its tag attributes.
///
/// No `file` means inline.  A `file` requires a `format`; `endian` is carried along for binary.
pub fn select_storage(
    file: Option<&Path>,
    format: Option<Format>,
    endian: Option<Endian>,
) -> Result<StorageDescriptor> {
    match (file, format) {
        (None, _) => Ok(StorageDescriptor::inline()),
        (Some(file), None) => Err(CodecError::MissingFormat { file: file.to_path_buf() }),
        (Some(file), Some(format)) => Ok(StorageDescriptor::external(file, format, endian)),
    }
}

/// The writer-side choice of encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum WritingDataType {
    /// Text inside the tag.
    #[default]
    Ascii,
    /// Decimal tokens in a companion file.
    ExternalAscii,
    /// Native-order binary in a companion file.
    ExternalBinary,
}

impl WritingDataType {
    /// The storage for the array playing `role` in the document at `document_path`.
    ///
    /// The companion file is named by [`external_file_name`].
    pub fn storage(self, document_path: &Path, role: &str) -> StorageDescriptor {
        match self {
            WritingDataType::Ascii => StorageDescriptor::inline(),
            WritingDataType::ExternalAscii => {
                StorageDescriptor::external(external_file_name(document_path, role), Format::Ascii, None)
            },
            WritingDataType::ExternalBinary => {
                StorageDescriptor::external(external_file_name(document_path, role), Format::Binary, None)
            },
        }
    }
}

/// Companion file for the array playing `role` in a document: `{basename}_{role}.dat`
/// beside the document.
///
/// ```
/// use std::path::Path;
///
/// let path = kvsml_array::external_file_name(Path::new("data/mesh.kvsml"), "coord");
/// assert_eq!(path, Path::new("data/mesh_coord.dat"));
/// ```
pub fn external_file_name(document_path: &Path, role: &str) -> PathBuf {
    let base = document_path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = format!("{}_{}.dat", base, role);
    match document_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
