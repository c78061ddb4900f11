/**
 * Volume information block. Every pointer inside the block is relative to the
 * start of the block itself, so the whole region is decoded as one sub-buffer
 * rather than a set of absolute file offsets.
 */
use crate::error::PrefetchError;
use crate::prefetch::file::ParseWarning;
use crate::prefetch::filenames::FilenameString;
use crate::utils::nom_helper::{nom_unsigned_eight_bytes, nom_unsigned_four_bytes};
use crate::utils::strings::{utf16_to_string, utf16_units};
use log::{error, warn};
use serde::Serialize;

/// Per-volume record size for version 17
pub(crate) const VOLUME_RECORD_SIZE_V17: usize = 104;
/// Per-volume record size for versions 23 and 26
pub(crate) const VOLUME_RECORD_SIZE_V23: usize = 96;

pub(crate) fn volume_record_size(version: u32) -> usize {
    let version17 = 17;
    if version == version17 {
        VOLUME_RECORD_SIZE_V17
    } else {
        VOLUME_RECORD_SIZE_V23
    }
}

/// MFT entry number of an NTFS file reference
pub fn mft_entry(reference: u64) -> u64 {
    reference & 0xffffffffffff
}

/// MFT sequence number of an NTFS file reference
pub fn mft_sequence(reference: u64) -> u64 {
    reference >> 48
}

/// One volume touched by the traced executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeInfo {
    pub device_path: String,
    /// Raw FILETIME of volume creation
    pub creation_time: u64,
    pub serial_number: u32,
    /// NTFS file references of the accessed files on this volume
    pub file_references: Vec<u64>,
    pub directory_strings: Vec<FilenameString>,
    /// Undocumented remainder of the volume record, kept verbatim
    pub unknown: Vec<u8>,
}

struct VolumeRecord {
    device_path_offset: u32,
    device_path_number_of_characters: u32,
    creation_time: u64,
    serial_number: u32,
    file_references_offset: u32,
    directory_strings_array_offset: u32,
    number_of_directory_strings: u32,
    unknown: Vec<u8>,
}

impl VolumeRecord {
    fn parse_record(data: &[u8]) -> nom::IResult<&[u8], VolumeRecord> {
        let (input, device_path_offset) = nom_unsigned_four_bytes(data)?;
        let (input, device_path_number_of_characters) =
            nom_unsigned_four_bytes(input)?;
        let (input, creation_time) = nom_unsigned_eight_bytes(input)?;
        let (input, serial_number) = nom_unsigned_four_bytes(input)?;
        let (input, file_references_offset) = nom_unsigned_four_bytes(input)?;
        let (input, _file_references_size) = nom_unsigned_four_bytes(input)?;
        let (input, directory_strings_array_offset) = nom_unsigned_four_bytes(input)?;
        let (input, number_of_directory_strings) = nom_unsigned_four_bytes(input)?;

        let record = VolumeRecord {
            device_path_offset,
            device_path_number_of_characters,
            creation_time,
            serial_number,
            file_references_offset,
            directory_strings_array_offset,
            number_of_directory_strings,
            unknown: input.to_vec(),
        };

        Ok((input, record))
    }
}

/// Decode the volume information block
pub(crate) fn parse_volumes(
    block: &[u8],
    number_of_volumes: u32,
    version: u32,
) -> Result<(Vec<VolumeInfo>, Vec<ParseWarning>), PrefetchError> {
    let record_size = volume_record_size(version);
    let mut volumes: Vec<VolumeInfo> = Vec::new();
    let mut warnings: Vec<ParseWarning> = Vec::new();
    let mut record_offset = 0;

    for index in 0..number_of_volumes {
        let record_end = record_offset + record_size;
        if record_end > block.len() {
            error!(
                "[prefetch] Volume {index} record escapes the volume block: offset {record_offset}, block size {}",
                block.len()
            );
            return Err(PrefetchError::OffsetOutOfBounds);
        }

        let record_result = VolumeRecord::parse_record(&block[record_offset..record_end]);
        let record = match record_result {
            Ok((_, result)) => result,
            Err(err) => {
                error!("[prefetch] Failed to parse volume {index} record: {err:?}");
                return Err(PrefetchError::ShortInput);
            }
        };

        let device_path = read_device_path(block, &record)?;
        let file_references = read_file_references(block, &record)?;
        let directory_strings = read_directory_strings(block, &record, index, &mut warnings)?;

        let volume = VolumeInfo {
            device_path,
            creation_time: record.creation_time,
            serial_number: record.serial_number,
            file_references,
            directory_strings,
            unknown: record.unknown,
        };
        volumes.push(volume);

        record_offset = record_end;
    }

    Ok((volumes, warnings))
}

/// Decode the device path pointed at by a volume record
fn read_device_path(block: &[u8], record: &VolumeRecord) -> Result<String, PrefetchError> {
    if record.device_path_offset == 0 || record.device_path_number_of_characters == 0 {
        return Ok(String::new());
    }

    let start = record.device_path_offset as u64;
    let end = start + record.device_path_number_of_characters as u64 * 2;
    if end > block.len() as u64 {
        error!(
            "[prefetch] Device path escapes the volume block: offset {start}, characters {}",
            record.device_path_number_of_characters
        );
        return Err(PrefetchError::OffsetOutOfBounds);
    }

    let units = utf16_units(&block[start as usize..end as usize]);
    Ok(utf16_to_string(&units))
}

/// Decode the file reference list pointed at by a volume record. The list
/// starts with an 8 byte header and one unused 64-bit slot, so a declared
/// count of one carries no references
fn read_file_references(block: &[u8], record: &VolumeRecord) -> Result<Vec<u64>, PrefetchError> {
    let offset = record.file_references_offset as usize;
    if offset == 0 {
        return Ok(Vec::new());
    }

    let header_size = 8;
    if offset as u64 + header_size > block.len() as u64 {
        error!("[prefetch] File references header escapes the volume block: offset {offset}");
        return Err(PrefetchError::OffsetOutOfBounds);
    }

    let header_result = file_references_header(&block[offset..]);
    let (_version, number_of_file_references) = match header_result {
        Ok((_, result)) => result,
        Err(err) => {
            error!("[prefetch] Failed to parse file references header: {err:?}");
            return Err(PrefetchError::ShortInput);
        }
    };

    if number_of_file_references == 0 {
        return Ok(Vec::new());
    }

    let end = offset as u64 + header_size + number_of_file_references as u64 * 8;
    if end > block.len() as u64 {
        error!(
            "[prefetch] File references escape the volume block: offset {offset}, count {number_of_file_references}"
        );
        return Err(PrefetchError::OffsetOutOfBounds);
    }

    // The first 64-bit slot after the header holds no reference
    let mut references: Vec<u64> = Vec::new();
    let mut input = &block[offset + 16..end as usize];
    for _ in 1..number_of_file_references {
        let reference_result = nom_unsigned_eight_bytes(input);
        let (remaining, reference) = match reference_result {
            Ok(result) => result,
            Err(err) => {
                error!("[prefetch] Failed to parse file reference: {err:?}");
                return Err(PrefetchError::ShortInput);
            }
        };
        references.push(reference);
        input = remaining;
    }

    Ok(references)
}

fn file_references_header(data: &[u8]) -> nom::IResult<&[u8], (u32, u32)> {
    let (input, version) = nom_unsigned_four_bytes(data)?;
    let (input, number_of_file_references) = nom_unsigned_four_bytes(input)?;

    Ok((input, (version, number_of_file_references)))
}

/// Decode the directory strings of one volume. The table runs from its offset
/// toward the end of the volume block; a shortfall against the declared count
/// is recorded, not fatal
fn read_directory_strings(
    block: &[u8],
    record: &VolumeRecord,
    volume_index: u32,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Vec<FilenameString>, PrefetchError> {
    let offset = record.directory_strings_array_offset as usize;
    let declared = record.number_of_directory_strings;

    if offset == 0 {
        if declared != 0 {
            warn!(
                "[prefetch] Volume {volume_index} declares {declared} directory strings but no array"
            );
            push_count_warning(warnings, volume_index, declared, 0);
        }
        return Ok(Vec::new());
    }
    if offset >= block.len() {
        error!(
            "[prefetch] Directory strings array escapes the volume block: offset {offset}"
        );
        return Err(PrefetchError::OffsetOutOfBounds);
    }

    let entries = walk_strings(&block[offset..], offset as u32, declared);
    if entries.len() as u32 != declared {
        warn!(
            "[prefetch] Volume {volume_index} declares {declared} directory strings, parsed {}",
            entries.len()
        );
        push_count_warning(warnings, volume_index, declared, entries.len() as u32);
    }

    Ok(entries)
}

fn push_count_warning(
    warnings: &mut Vec<ParseWarning>,
    volume_index: u32,
    declared: u32,
    parsed: u32,
) {
    warnings.push(ParseWarning::InconsistentCounts {
        section: format!("volume {volume_index} directory strings"),
        declared,
        parsed,
    });
}

/// Take up to `count` NUL-separated UTF-16 strings from `region`
fn walk_strings(region: &[u8], base_offset: u32, count: u32) -> Vec<FilenameString> {
    let mut entries: Vec<FilenameString> = Vec::new();
    let mut position = 0;

    while (entries.len() as u32) < count {
        let start = position;
        let mut units: Vec<u16> = Vec::new();
        let mut terminated = false;

        while position + 2 <= region.len() {
            let unit = u16::from_le_bytes([region[position], region[position + 1]]);
            position += 2;
            if unit == 0 {
                terminated = true;
                break;
            }
            units.push(unit);
        }

        if !terminated && units.is_empty() {
            // Block ended before the next string started
            break;
        }
        entries.push(FilenameString::from_units(&units, base_offset + start as u32));
        if !terminated {
            break;
        }
    }

    entries
}
