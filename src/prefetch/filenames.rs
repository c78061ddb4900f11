use crate::error::PrefetchError;
use crate::utils::strings::{utf16_to_string, utf16_units};
use log::error;
use serde::Serialize;

/// One entry of a UTF-16LE string table. The original code units are kept
/// alongside the decoded text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameString {
    /// Byte offset of the string within its table
    pub offset: u32,
    /// Length in UTF-16 code units, excluding the NUL separator
    pub number_of_characters: u32,
    utf16: Vec<u16>,
    text: String,
}

impl FilenameString {
    pub(crate) fn from_units(units: &[u16], offset: u32) -> FilenameString {
        FilenameString {
            offset,
            number_of_characters: units.len() as u32,
            utf16: units.to_vec(),
            text: utf16_to_string(units),
        }
    }

    /// Decoded UTF-8 view
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Original UTF-16 code units
    pub fn utf16_units(&self) -> &[u16] {
        &self.utf16
    }
}

/// Split a contiguous region of NUL-separated UTF-16LE strings. An empty
/// trailing entry produced by a final separator is dropped
pub(crate) fn parse_filename_strings(data: &[u8]) -> Result<Vec<FilenameString>, PrefetchError> {
    if data.len() % 2 != 0 {
        error!(
            "[prefetch] Filename strings section has odd byte length: {}",
            data.len()
        );
        return Err(PrefetchError::MalformedStringTable);
    }

    let units = utf16_units(data);
    let mut entries: Vec<FilenameString> = Vec::new();
    let mut start = 0;

    for (index, unit) in units.iter().enumerate() {
        if *unit != 0 {
            continue;
        }
        entries.push(FilenameString::from_units(
            &units[start..index],
            (start * 2) as u32,
        ));
        start = index + 1;
    }

    // Region may end without a final separator
    if start < units.len() {
        entries.push(FilenameString::from_units(
            &units[start..],
            (start * 2) as u32,
        ));
    }

    Ok(entries)
}
