//! Glue between the codec and the document tree.
//!
//! A KVSML object reader finds the tag holding an array (e.g. `<Coord>` below `<Vertex>`) with
//! its own document layer, then hands it to [`DataArrayTag`] through the small [`Node`] trait:
//!
//! ```xml
//! <DataArray type="float" file="mesh_coord.dat" format="binary" endian="little"/>
//! <DataArray type="uchar">255 0 0 0 255 0</DataArray>
//! ```

use std::path::{Path, PathBuf};

use tracing::error;

use crate::array::DynamicArray;
use crate::endian::Endian;
use crate::error::{CodecError, Result};
use crate::kind::ElementKind;
use crate::read::ReadOptions;
use crate::scalar::Scalar;
use crate::storage::{select_storage, Format, StorageDescriptor};
use crate::write::{write_array, write_static, WrittenMetadata};

/// What the codec needs from a document node.
pub trait Node {
    /// Tag name, for diagnostics.
    fn name(&self) -> &str;

    /// Value of the named attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Add or replace the named attribute.
    fn set_attribute(&mut self, name: &str, value: &str);

    /// Remove the named attribute, if present.
    fn remove_attribute(&mut self, name: &str);

    /// Text content, if any.
    fn text(&self) -> Option<&str>;

    /// Replace the text content.
    fn set_text(&mut self, text: &str);

    /// Remove the text content.
    fn clear_text(&mut self);
}

/// A detached document node: a name, ordered attributes and optional text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
}

impl Element {
    /// An element with no attributes and no text.
    pub fn new(name: impl Into<String>) -> Self {
        Element { name: name.into(), ..Default::default() }
    }

    /// Builder form of [`Node::set_attribute`].
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Node::set_text`].
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Node for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn clear_text(&mut self) {
        self.text = None;
    }
}

/// The attributes of a data array tag: `type`, `file`, `format` and `endian`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataArrayTag {
    kind: Option<ElementKind>,
    file: Option<PathBuf>,
    format: Option<Format>,
    endian: Option<Endian>,
}

impl DataArrayTag {
    /// Parse the attributes of `node`.
    ///
    /// Unknown `type`, `format` or `endian` values are errors; absent ones are not.
    pub fn from_node(node: &impl Node) -> Result<Self> {
        let kind = node.attribute("type").map(ElementKind::from_name).transpose()?;
        let format = node.attribute("format").map(Format::from_name).transpose()?;
        let endian = node.attribute("endian").map(Endian::from_name).transpose()?;
        let file = node.attribute("file").map(PathBuf::from);
        Ok(DataArrayTag { kind, file, format, endian })
    }

    /// The element kind named by `type`.
    pub fn kind(&self) -> Option<ElementKind> {
        self.kind
    }

    /// The companion file named by `file`, as written.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The storage these attributes describe, with `file` resolved against `document_dir`.
    pub fn storage(&self, document_dir: &Path) -> Result<StorageDescriptor> {
        let storage = select_storage(self.file.as_deref(), self.format, self.endian)?;
        Ok(storage.relative_to(document_dir))
    }

    /// Read `count` elements of the kind named by the `type` attribute.
    pub fn read(
        node: &impl Node,
        count: usize,
        document_dir: &Path,
        options: &ReadOptions,
    ) -> Result<DynamicArray> {
        let result = Self::from_node(node).and_then(|tag| {
            let kind = tag.kind.ok_or(CodecError::MissingType)?;
            options.read_array(kind, count, &tag.storage(document_dir)?, node.text())
        });
        log_failure(node, "read", result)
    }

    /// Read `count` elements into `T`.
    ///
    /// If the `type` attribute names another kind, the stored values are converted numerically.
    pub fn read_static<T: Scalar>(
        node: &impl Node,
        count: usize,
        document_dir: &Path,
        options: &ReadOptions,
    ) -> Result<Vec<T>> {
        let result = Self::from_node(node).and_then(|tag| {
            let storage = tag.storage(document_dir)?;
            let disk_kind = tag.kind.unwrap_or(T::KIND);
            options.read_static_as(disk_kind, count, &storage, node.text())
        });
        log_failure(node, "read", result)
    }

    /// Write `data` to `target` and record its attributes (or text) on `node`.
    ///
    /// Storage attributes or text left on `node` by an earlier write are replaced.  Returns the write metadata; when [`WrittenMetadata::omitted`] is set the node was left
    /// untouched and should be dropped from the document.
    pub fn write(
        node: &mut impl Node,
        data: &DynamicArray,
        target: &StorageDescriptor,
        document_dir: &Path,
    ) -> Result<WrittenMetadata> {
        let result = write_array(data, target);
        let meta = log_failure(node, "write", result)?;
        record(node, data.kind(), target, &meta, document_dir);
        Ok(meta)
    }

    /// Statically typed form of [`DataArrayTag::write`].
    pub fn write_static<T: Scalar>(
        node: &mut impl Node,
        data: &[T],
        target: &StorageDescriptor,
        document_dir: &Path,
    ) -> Result<WrittenMetadata> {
        let result = write_static(data, target);
        let meta = log_failure(node, "write", result)?;
        record(node, T::KIND, target, &meta, document_dir);
        Ok(meta)
    }
}

fn record(
    node: &mut impl Node,
    kind: ElementKind,
    target: &StorageDescriptor,
    meta: &WrittenMetadata,
    document_dir: &Path,
) {
    if meta.omitted {
        return;
    }
    node.set_attribute("type", kind.name());
    match &meta.text {
        Some(text) => node.set_text(text),
        None => node.clear_text(),
    }
    match target.file() {
        Some(file) => {
            let relative = file.strip_prefix(document_dir).unwrap_or(file);
            node.set_attribute("file", &relative.to_string_lossy());
        },
        None => node.remove_attribute("file"),
    }
    match target.format() {
        Some(format) => node.set_attribute("format", format.name()),
        None => node.remove_attribute("format"),
    }
    match meta.endian {
        Some(endian) => node.set_attribute("endian", endian.name()),
        None => node.remove_attribute("endian"),
    }
}

fn log_failure<T>(node: &impl Node, verb: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!(tag = node.name(), "cannot {} data array: {}", verb, e);
    }
    result
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn element_attributes() {
        let mut node = Element::new("DataArray").with_attribute("type", "int");
        assert_eq!(node.attribute("type"), Some("int"));
        node.set_attribute("type", "float");
        assert_eq!(node.attribute("type"), Some("float"));
        assert_eq!(node.attributes().count(), 1);
        assert_eq!(node.attribute("file"), None);
        assert_eq!(node.text(), None);
    }

    #[test]
    fn parse_attributes() {
        let node = Element::new("DataArray")
            .with_attribute("type", "unsigned int")
            .with_attribute("file", "a.dat")
            .with_attribute("format", "binary")
            .with_attribute("endian", "big");
        let tag = DataArrayTag::from_node(&node).unwrap();
        assert_eq!(tag.kind(), Some(ElementKind::UInt32));
        assert_eq!(tag.file(), Some(Path::new("a.dat")));

        let storage = tag.storage(Path::new("/docs")).unwrap();
        assert_eq!(storage.file(), Some(Path::new("/docs/a.dat")));
        assert_eq!(storage.format(), Some(Format::Binary));
        assert_eq!(storage.endian(), Some(Endian::Big));
    }

    #[test]
    fn bad_attributes() {
        let node = Element::new("DataArray").with_attribute("type", "long");
        assert!(matches!(DataArrayTag::from_node(&node), Err(CodecError::UnknownType(_))));

        let node = Element::new("DataArray").with_attribute("format", "xml");
        assert!(matches!(DataArrayTag::from_node(&node), Err(CodecError::UnknownFormat(_))));

        let node = Element::new("DataArray").with_attribute("endian", "middle");
        assert!(matches!(DataArrayTag::from_node(&node), Err(CodecError::UnknownEndian(_))));

        let node = Element::new("DataArray").with_attribute("type", "float").with_attribute("file", "a.dat");
        let result = DataArrayTag::read(&node, 1, Path::new("."), &ReadOptions::new());
        assert!(matches!(result, Err(CodecError::MissingFormat { .. })));
    }

    #[test]
    fn dynamic_read_needs_type() {
        let node = Element::new("DataArray").with_text("1 2 3");
        let result = DataArrayTag::read(&node, 3, Path::new("."), &ReadOptions::new());
        assert!(matches!(result, Err(CodecError::MissingType)));

        // a statically typed reader does not
        let values: Vec<i32> = DataArrayTag::read_static(&node, 3, Path::new("."), &ReadOptions::new()).unwrap();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn inline_roundtrip() {
        let mut node = Element::new("DataArray");
        let data = DynamicArray::from_values(vec![255u8, 0, 128]);
        let meta = DataArrayTag::write(&mut node, &data, &StorageDescriptor::inline(), Path::new(".")).unwrap();
        assert!(!meta.omitted);
        assert_eq!(node.attribute("type"), Some("uchar"));
        assert_eq!(node.attribute("file"), None);
        assert_eq!(node.attribute("format"), None);
        assert_eq!(node.text(), Some("255 0 128"));

        let back = DataArrayTag::read(&node, 3, Path::new("."), &ReadOptions::new()).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn type_attribute_drives_conversion() {
        let node = Element::new("DataArray").with_attribute("type", "double").with_text("0.5 1.5");
        let values: Vec<f32> = DataArrayTag::read_static(&node, 2, Path::new("."), &ReadOptions::new()).unwrap();
        assert_eq!(values, [0.5, 1.5]);
    }

    #[test]
    fn rewrite_replaces_storage() {
        let dir = tempfile::tempdir().unwrap();
        let target = StorageDescriptor::external(dir.path().join("a.dat"), Format::Binary, Some(Endian::Big));
        let options = ReadOptions::new();

        let mut node = Element::new("DataArray").with_text("9 9 9");
        DataArrayTag::write_static(&mut node, &[1i16, 2, 3], &target, dir.path()).unwrap();
        assert_eq!(node.text(), None);
        assert_eq!(node.attribute("endian"), Some("big"));

        DataArrayTag::write_static(&mut node, &[4i16, 5, 6], &StorageDescriptor::inline(), dir.path()).unwrap();
        assert_eq!(node.text(), Some("4 5 6"));
        assert_eq!(node.attributes().collect::<Vec<_>>(), [("type", "short")]);
        let back: Vec<i16> = DataArrayTag::read_static(&node, 3, dir.path(), &options).unwrap();
        assert_eq!(back, [4, 5, 6]);

        let ascii = StorageDescriptor::external(dir.path().join("b.dat"), Format::Ascii, None);
        node.set_attribute("endian", "little");
        DataArrayTag::write_static(&mut node, &[7i16, 8, 9], &ascii, dir.path()).unwrap();
        assert_eq!(node.text(), None);
        assert_eq!(node.attribute("file"), Some("b.dat"));
        assert_eq!(node.attribute("endian"), None);
        let back: Vec<i16> = DataArrayTag::read_static(&node, 3, dir.path(), &options).unwrap();
        assert_eq!(back, [7, 8, 9]);
    }

    #[test]
    fn empty_write_leaves_node_alone() {
        let mut node = Element::new("DataArray");
        let meta = DataArrayTag::write_static::<f32>(&mut node, &[], &StorageDescriptor::inline(), Path::new(".")).unwrap();
        assert!(meta.omitted);
        assert_eq!(node, Element::new("DataArray"));
    }
}
