//! Key files: creation from collected entropy and loading in every
//! supported on-disk format.
//!
//! # Formats
//!
//! - **Xml**: `<KeyFile><Meta><Version>1.00</Version></Meta><Key><Data>BASE64</Data></Key></KeyFile>`;
//!   the only format [`KeyFile::create`] writes. Comments, processing
//!   instructions and attributes are tolerated. Stored data that is not 32
//!   bytes is hashed with SHA-256; a document without usable `Data` is
//!   treated as an ordinary file.
//! - **Binary32**: a file of exactly 32 bytes is the key itself.
//! - **Hex64**: a file of exactly 64 hex characters decodes to the key.
//! - **Hashed**: any other non-empty file; the key is SHA-256 of its bytes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::encoding::{base64_decode, base64_encode};
use crate::error::{Error, Result};
use crate::random::CryptoRandom;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Version string written into the XML `Meta` block.
pub const XML_VERSION: &str = "1.00";

const ROOT_ELEMENT: &str = "KeyFile";
const KEY_ELEMENT: &str = "Key";
const DATA_ELEMENT: &str = "Data";

/// How the key was stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFileFormat {
    Xml,
    Binary32,
    Hex64,
    Hashed,
}

impl fmt::Display for KeyFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => write!(f, "xml"),
            Self::Binary32 => write!(f, "binary32"),
            Self::Hex64 => write!(f, "hex64"),
            Self::Hashed => write!(f, "hashed"),
        }
    }
}

/// A loaded key file. The key is wiped on drop.
pub struct KeyFile {
    path: PathBuf,
    format: KeyFileFormat,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl KeyFile {
    /// Load and decode a key file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = Zeroizing::new(fs::read(path)?);
        let (format, key) = parse_key_data(&data)?;
        log::debug!("loaded {format} key file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            format,
            key,
        })
    }

    /// Write a new XML key file at `path`, overwriting any existing file.
    ///
    /// The key is 32 bytes from `rng`, hashed together with
    /// `additional_entropy` when that is non-empty (see [`derive_key`]).
    pub fn create(
        path: impl AsRef<Path>,
        additional_entropy: Option<&[u8]>,
        rng: &CryptoRandom,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut random = Zeroizing::new([0u8; KEY_LEN]);
        rng.fill_bytes(random.as_mut_slice())?;
        let key = derive_key(&random, additional_entropy);

        let xml = Zeroizing::new(render_xml(&key));
        fs::write(path, xml.as_bytes())?;
        log::info!("wrote key file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            format: KeyFileFormat::Xml,
            key,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> KeyFileFormat {
        self.format
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// First 8 bytes of SHA-256(key), hex. Identifies a key without
    /// revealing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.as_slice());
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for KeyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyFile")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Final key for a new key file.
///
/// Without additional entropy the random bytes are used directly; otherwise
/// the key is `SHA-256(additional ‖ random)`.
pub fn derive_key(
    random: &[u8; KEY_LEN],
    additional_entropy: Option<&[u8]>,
) -> Zeroizing<[u8; KEY_LEN]> {
    match additional_entropy.filter(|e| !e.is_empty()) {
        None => Zeroizing::new(*random),
        Some(extra) => {
            let mut h = Sha256::new();
            h.update(extra);
            h.update(random);
            Zeroizing::new(h.finalize().into())
        }
    }
}

/// XML key file document, CRLF line breaks and tab indentation.
pub fn render_xml(key: &[u8; KEY_LEN]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n\
         <{ROOT_ELEMENT}>\r\n\
         \t<Meta>\r\n\
         \t\t<Version>{XML_VERSION}</Version>\r\n\
         \t</Meta>\r\n\
         \t<{KEY_ELEMENT}>\r\n\
         \t\t<{DATA_ELEMENT}>{}</{DATA_ELEMENT}>\r\n\
         \t</{KEY_ELEMENT}>\r\n\
         </{ROOT_ELEMENT}>\r\n",
        base64_encode(key)
    )
}

/// Decode raw key file bytes.
pub fn parse_key_data(data: &[u8]) -> Result<(KeyFileFormat, Zeroizing<[u8; KEY_LEN]>)> {
    if data.is_empty() {
        return Err(Error::KeyFile("file is empty".to_string()));
    }

    if let Some(stored) = parse_xml(data) {
        let key = match <[u8; KEY_LEN]>::try_from(stored.as_slice()) {
            Ok(key) => Zeroizing::new(key),
            Err(_) => {
                log::debug!("XML key data is {} bytes, hashing it", stored.len());
                Zeroizing::new(Sha256::digest(stored.as_slice()).into())
            }
        };
        return Ok((KeyFileFormat::Xml, key));
    }

    if data.len() == KEY_LEN {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(data);
        return Ok((KeyFileFormat::Binary32, key));
    }

    if data.len() == KEY_LEN * 2 {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        if hex::decode_to_slice(data, key.as_mut_slice()).is_ok() {
            return Ok((KeyFileFormat::Hex64, key));
        }
    }

    let key = Zeroizing::new(Sha256::digest(data).into());
    Ok((KeyFileFormat::Hashed, key))
}

/// Stored key bytes of an XML key file.
///
/// `None` unless the document root is `KeyFile` and it holds a non-empty,
/// valid base64 `Key/Data`; the caller then treats the file as opaque bytes.
fn parse_xml(data: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
    let text = std::str::from_utf8(data).ok()?;
    let body = skip_prolog(text.trim_start_matches('\u{feff}'))?;
    let root = element_at(body, ROOT_ELEMENT)?;
    let encoded =
        find_element(root, KEY_ELEMENT).and_then(|key| find_element(key, DATA_ELEMENT))?;
    let decoded = Zeroizing::new(base64_decode(encoded)?);
    if decoded.is_empty() {
        return None;
    }
    Some(decoded)
}

/// Skip whitespace, the XML declaration, processing instructions, comments
/// and `<!DOCTYPE>` ahead of the root element.
fn skip_prolog(mut text: &str) -> Option<&str> {
    loop {
        text = text.trim_start();
        text = if let Some(rest) = text.strip_prefix("<?") {
            &rest[rest.find("?>")? + 2..]
        } else if let Some(rest) = text.strip_prefix("<!--") {
            &rest[rest.find("-->")? + 3..]
        } else if let Some(rest) = text.strip_prefix("<!") {
            &rest[rest.find('>')? + 1..]
        } else {
            return Some(text);
        };
    }
}

/// Content of the `name` element that starts exactly at `text`.
///
/// Attributes on the start tag are allowed; `<name/>` has empty content.
fn element_at<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let rest = text.strip_prefix('<')?.strip_prefix(name)?;
    if !rest.starts_with(|c: char| c == '>' || c == '/' || c.is_whitespace()) {
        return None;
    }
    let tag_end = rest.find('>')?;
    if rest[..tag_end].ends_with('/') {
        return Some("");
    }
    let content = &rest[tag_end + 1..];
    let close = format!("</{name}");
    Some(&content[..content.find(&close)?])
}

/// Content of the first `name` element inside `text`, ignoring comments.
fn find_element<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = text;
    loop {
        rest = &rest[rest.find('<')?..];
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
            continue;
        }
        if let Some(content) = element_at(rest, name) {
            return Some(content);
        }
        rest = &rest[1..];
    }
}
