#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Order-preserving reader and writer for layered INI configuration files.
//!
//! ```ini
//! ; comment
//! [Install]
//! root = C:\App
//! data = *%ROOT%\data
//! /[MAGIC_LOGICAL_NAMES] ROOT=C:\App
//! ```
//!
//! Sections and keys keep the order they were first seen in, across any number of
//! [`Document::parse`] or [`Document::load`] calls, so a rewritten file keeps the layout it was read with.

mod error;
mod parser;
mod section;
mod util;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::{fmt, str};

use encoding_rs::{Encoding, UTF_8, UTF_16LE, WINDOWS_1252};
use indexmap::IndexMap;
use log::{debug, warn};

pub use error::{Error, Result};
pub use section::Section;
pub use util::expand_vars;

use parser::Parser;

/// Section whose entries `%name%` placeholders are looked up in, unless overridden.
pub const DEFAULT_TRANSLATION_SECTION: &str = "MAGIC_LOGICAL_NAMES";

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone)]
pub struct Document {
    sections: IndexMap<String, Section>,
    translation_section: String,
    // Encoding of the data read last; `write_to` encodes with it.
    encoding: &'static Encoding,
    // Section that bare `key=value` lines attach to; survives between parses.
    cursor: String,
}

// The parse cursor and the on-disk encoding are not part of the content.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.translation_section == other.translation_section && self.sections == other.sections
    }
}

impl Eq for Document {}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::with_translation_section(DEFAULT_TRANSLATION_SECTION)
    }

    #[must_use]
    pub fn with_translation_section(name: impl Into<String>) -> Self {
        Self {
            sections: IndexMap::with_capacity(16),
            translation_section: name.into(),
            encoding: UTF_8,
            cursor: String::new(),
        }
    }

    /// Read a whole file into a new document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] if the file cannot be opened or read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut document = Self::new();
        document.load(path)?;
        Ok(document)
    }

    /// Merge `text` into the document.
    ///
    /// Existing keys are overwritten in place; new sections and keys are appended.
    pub fn parse(&mut self, text: &str) {
        Parser::new(&mut self.sections, &mut self.cursor).parse(text);
    }

    /// Read everything from `reader` and merge it into the document.
    ///
    /// The detected encoding (UTF-16 LE with a BOM, UTF-8, or windows-1252 for anything that is
    /// not valid UTF-8) becomes the one [`Document::write_to`] uses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] if `reader` fails; nothing is parsed in that case.
    pub fn read_from<R>(&mut self, reader: &mut R) -> Result<()>
    where
        R: Read,
    {
        let mut buffer = Vec::with_capacity(4096);
        _ = reader
            .read_to_end(&mut buffer)
            .map_err(|source| Error::ReadFailure { source })?;

        let (text, encoding) = decode_data(&buffer);
        debug!("read {} bytes as {}", buffer.len(), encoding.name());

        self.encoding = encoding;
        self.parse(&text);
        Ok(())
    }

    /// Open the file at `path` and merge it into the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] if the file cannot be opened or read.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("loading {}", path.display());

        let mut file = File::open(path).map_err(|source| Error::ReadFailure { source })?;
        self.read_from(&mut file)
    }

    /// Layer another file over what is already loaded.
    ///
    /// Later files win for keys they share with earlier ones; ordering stays that of first sight.
    ///
    /// # Errors
    ///
    /// See [`Document::load`].
    pub fn load_additional(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load(path)
    }

    /// Names of every section, including the unnamed one if anything was assigned to it.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Keys of `section`, or nothing if there is no such section.
    pub fn keys(&self, section: &str) -> impl Iterator<Item = &str> {
        self.sections.get(section).into_iter().flat_map(Section::keys)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Value of `key` in `section`, or `""` if either is missing.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> &str {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .unwrap_or_default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_owned())
            .or_insert_with_key(|name| Section::new(name.clone()))
            .insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn translation_section(&self) -> &str {
        &self.translation_section
    }

    pub fn set_translation_section(&mut self, name: impl Into<String>) {
        self.translation_section = name.into();
    }

    /// Encoding used when writing the document out.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    /// Expand `%name%` placeholders in `text` from the translation section.
    #[must_use]
    pub fn translate(&self, text: &str) -> String {
        expand_vars(text, self.sections.get(&self.translation_section))
    }

    /// Serialize the document in recorded order, encoded with [`Document::encoding`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailure`] if `writer` fails.
    pub fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: Write,
    {
        writer
            .write_all(&encode_data(&self.to_string(), self.encoding))
            .and_then(|()| writer.flush())
            .map_err(|source| Error::WriteFailure { source })
    }

    /// Create (or truncate) the file at `path` and write the document to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailure`] if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("saving {}", path.display());

        let file = File::create(path).map_err(|source| Error::WriteFailure { source })?;
        self.write_to(&mut io::BufWriter::new(file))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in self.sections.values() {
            writeln!(f, "[{}]", section.name())?;

            for (key, value) in section.entries() {
                if !is_representable_key(key) {
                    warn!("key {key:?} in [{}] will not read back as written", section.name());
                }

                // Double a leading `*` so reparsing strips only the one we added, and keep a
                // trailing `+` off the line break so it is not read as a continuation.
                let star = if value.starts_with('*') { "*" } else { "" };
                let pad = if value.ends_with('+') { " " } else { "" };
                writeln!(f, "{key}={star}{value}{pad}")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

/// Whether `key=...` parses back to `key`: the first `=` ends the key, the line is trimmed, and
/// a leading `;`, `#`, `[` or `/[` makes it something other than an assignment.
fn is_representable_key(key: &str) -> bool {
    !key.contains(['=', '\n', '\r'])
        && key.trim() == key
        && !key.starts_with([';', '#', '['])
        && !key.starts_with("/[")
}

// Legacy configuration files come from Windows tools that save either UTF-16 LE with a BOM or
// an 8-bit code page. Windows-1252 maps every byte to a distinct character, so such files
// survive a load and save unchanged.
fn decode_data(data: &[u8]) -> (String, &'static Encoding) {
    if let Some(data) = data.strip_prefix(BOM_LE) {
        let (text, _) = UTF_16LE.decode_without_bom_handling(data);
        return (text.into_owned(), UTF_16LE);
    }

    let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
    match str::from_utf8(data) {
        Ok(text) => (text.to_owned(), UTF_8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(data);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

fn encode_data(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_16LE {
        // encoding_rs only decodes UTF-16, so the units are written by hand.
        let mut data = BOM_LE.to_vec();
        data.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        return data;
    }

    let (data, _, unmappable) = encoding.encode(text);
    if unmappable {
        warn!("characters not in {} were written as numeric references", encoding.name());
    }
    data.into_owned()
}
