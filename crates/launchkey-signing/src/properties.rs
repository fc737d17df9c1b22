//! Keystore properties file loading
//!
//! Release credentials live in a Java `.properties` file (conventionally
//! `android/key.properties`) with four keys: `keyAlias`, `keyPassword`,
//! `storeFile` and `storePassword`. The file is optional. [`lookup`] never
//! fails: a missing or unreadable file is reported through [`KeystoreLookup`]
//! so callers branch on presence instead of handling errors.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::Chars;

use tracing::debug;

use crate::error::{Result, SigningError};
use crate::secret::Secret;

/// Property key holding the key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Property key holding the key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Property key holding the keystore path
pub const STORE_FILE: &str = "storeFile";
/// Property key holding the keystore password
pub const STORE_PASSWORD: &str = "storePassword";

/// A `\uXXXX` escape that could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedEscape {
    /// 1-based line where the logical line containing the escape starts
    pub line: usize,
}

/// Parsed key/value pairs of a `.properties` document
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

// Values may be passwords, so only keys are shown.
impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl Properties {
    /// Parse a `.properties` document. Later duplicate keys win.
    pub fn parse(input: &str) -> std::result::Result<Self, MalformedEscape> {
        let mut entries = BTreeMap::new();

        for (line, logical) in logical_lines(input) {
            let (raw_key, raw_value) = split_key_value(&logical);
            let key = unescape(raw_key).ok_or(MalformedEscape { line })?;
            let value = unescape(raw_value).ok_or(MalformedEscape { line })?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Split on `\n`, `\r\n` and lone `\r`
fn physical_lines(input: &str) -> impl Iterator<Item = &str> {
    input.split('\n').flat_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split('\r')
    })
}

/// Join continuation lines and drop blanks and comments.
///
/// Returns each logical line with the 1-based line number it starts on.
fn logical_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (index, raw) in physical_lines(input).enumerate() {
        let trimmed = raw.trim_start_matches(is_whitespace);

        if !continuing {
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            start_line = index + 1;
        }

        let trailing_backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            current.push_str(&trimmed[..trimmed.len() - 1]);
            continuing = true;
        } else {
            current.push_str(trimmed);
            lines.push((start_line, std::mem::take(&mut current)));
            continuing = false;
        }
    }

    if continuing {
        lines.push((start_line, current));
    }

    lines
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut explicit_separator = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                explicit_separator = true;
                break;
            }
            c if is_whitespace(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];

    if explicit_separator {
        rest = rest[1..].trim_start_matches(is_whitespace);
    } else {
        rest = rest.trim_start_matches(is_whitespace);
        if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
            rest = stripped.trim_start_matches(is_whitespace);
        }
    }

    (key, rest)
}

fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        code = code * 16 + digit;
    }
    Some(code)
}

/// Decode escapes. Returns `None` on a malformed `\u` escape.
fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let code = read_hex4(&mut chars)?;
                if (0xD800..=0xDBFF).contains(&code) {
                    // High surrogate: must be followed by a `\u` low surrogate
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return None;
                    }
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined)?);
                } else {
                    out.push(char::from_u32(code)?);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Some(out)
}

/// Line number (1-based) of a byte offset, counting breaks like [`physical_lines`]
fn line_at(bytes: &[u8], offset: usize) -> usize {
    let breaks = bytes[..offset]
        .iter()
        .enumerate()
        .filter(|(i, b)| match **b {
            b'\n' => true,
            b'\r' => bytes.get(i + 1) != Some(&b'\n'),
            _ => false,
        })
        .count();
    breaks + 1
}

/// Signing credentials read from a keystore properties file.
///
/// Any of the four fields may be missing; only `storeFile` decides whether
/// the record is usable for release signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeystoreProperties {
    pub key_alias: Option<String>,
    pub key_password: Option<Secret>,
    pub store_file: Option<String>,
    pub store_password: Option<Secret>,
    /// Keys present in the file that are not signing keys
    pub unknown_keys: Vec<String>,
}

impl KeystoreProperties {
    /// Build from already parsed properties
    pub fn from_properties(properties: &Properties) -> Self {
        let known = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];
        Self {
            key_alias: properties.get(KEY_ALIAS).map(str::to_string),
            key_password: properties.get(KEY_PASSWORD).map(Secret::from),
            store_file: properties.get(STORE_FILE).map(str::to_string),
            store_password: properties.get(STORE_PASSWORD).map(Secret::from),
            unknown_keys: properties
                .keys()
                .filter(|k| !known.contains(k))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Parse the text of a properties file
    pub fn parse(input: &str) -> std::result::Result<Self, MalformedEscape> {
        Properties::parse(input).map(|p| Self::from_properties(&p))
    }

    /// Load from disk. Fails on read errors, invalid UTF-8 and malformed escapes.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| SigningError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let text = std::str::from_utf8(&bytes).map_err(|e| SigningError::InvalidEncoding {
            path: path.to_path_buf(),
            line: line_at(&bytes, e.valid_up_to()),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let properties = Properties::parse(text).map_err(|e| SigningError::MalformedEscape {
            path: path.to_path_buf(),
            line: e.line,
        })?;

        debug!(
            path = %path.display(),
            entries = properties.len(),
            "loaded keystore properties"
        );
        Ok(Self::from_properties(&properties))
    }

    /// The `storeFile` value, if present and not blank
    pub fn store_file(&self) -> Option<&str> {
        self.store_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether this record can back a release signing config
    pub fn has_store_file(&self) -> bool {
        self.store_file().is_some()
    }
}

/// Outcome of looking up the keystore properties file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreLookup {
    /// No file at the path
    Missing { path: PathBuf },
    /// The file exists but could not be read or parsed
    Unreadable { path: PathBuf, reason: String },
    /// The file was loaded
    Loaded {
        path: PathBuf,
        properties: KeystoreProperties,
    },
}

impl KeystoreLookup {
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path } | Self::Unreadable { path, .. } | Self::Loaded { path, .. } => {
                path
            }
        }
    }

    /// Whether the backing file exists on disk
    pub fn file_exists(&self) -> bool {
        !matches!(self, Self::Missing { .. })
    }

    /// The loaded record, if any
    pub fn properties(&self) -> Option<&KeystoreProperties> {
        match self {
            Self::Loaded { properties, .. } => Some(properties),
            _ => None,
        }
    }

    pub fn into_properties(self) -> Option<KeystoreProperties> {
        match self {
            Self::Loaded { properties, .. } => Some(properties),
            _ => None,
        }
    }
}

/// Look up keystore properties without failing.
///
/// A missing file or a load failure is reported in the returned
/// [`KeystoreLookup`]. The resolver decides whether that is worth a warning.
pub fn lookup(path: &Path) -> KeystoreLookup {
    if !path.exists() {
        debug!(path = %path.display(), "keystore properties file not found");
        return KeystoreLookup::Missing {
            path: path.to_path_buf(),
        };
    }

    match KeystoreProperties::load(path) {
        Ok(properties) => KeystoreLookup::Loaded {
            path: path.to_path_buf(),
            properties,
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "failed to load keystore properties");
            KeystoreLookup::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
