use crate::error::PrefetchError;
use crate::utils::{
    nom_helper::{nom_data, nom_unsigned_four_bytes},
    strings::extract_utf16_string,
};
use log::error;
use serde::Serialize;

/// Fixed size of the file header
pub(crate) const HEADER_SIZE: usize = 84;

/// ASCII "SCCA" read as a little-endian u32
const SCCA_SIGNATURE: u32 = 0x41434353;

/// Format versions this parser understands. Win10+ files (version 30/31) are
/// MAM compressed and rejected up front
pub(crate) const SUPPORTED_VERSIONS: [u32; 3] = [17, 23, 26];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub format_version: u32,
    /// File size declared by the header, which may disagree with the source
    pub file_size: u32,
    /// Executable name, up to 29 UTF-16 code units
    pub executable_filename: String,
    pub prefetch_hash: u32,
}

impl FileHeader {
    /// Decode and validate the 84 byte file header
    pub(crate) fn parse_header(data: &[u8]) -> Result<FileHeader, PrefetchError> {
        let result = FileHeader::header_values(data);
        let (_, (format_version, signature, file_size, filename_data, prefetch_hash)) =
            match result {
                Ok(values) => values,
                Err(err) => {
                    error!("[prefetch] Failed to read file header: {err:?}");
                    return Err(PrefetchError::ShortInput);
                }
            };

        if signature != SCCA_SIGNATURE {
            error!("[prefetch] Invalid header signature: {signature:#x}");
            return Err(PrefetchError::InvalidSignature);
        }
        if !SUPPORTED_VERSIONS.contains(&format_version) {
            error!("[prefetch] Unsupported format version: {format_version}");
            return Err(PrefetchError::UnsupportedVersion(format_version));
        }

        let header = FileHeader {
            format_version,
            file_size,
            executable_filename: extract_utf16_string(filename_data),
            prefetch_hash,
        };

        Ok(header)
    }

    fn header_values(data: &[u8]) -> nom::IResult<&[u8], (u32, u32, u32, &[u8], u32)> {
        let (input, format_version) = nom_unsigned_four_bytes(data)?;
        let (input, signature) = nom_unsigned_four_bytes(input)?;
        let (input, _unknown) = nom_unsigned_four_bytes(input)?;
        let (input, file_size) = nom_unsigned_four_bytes(input)?;

        let filename_size = 60;
        let (input, filename_data) = nom_data(input, filename_size)?;
        let (input, prefetch_hash) = nom_unsigned_four_bytes(input)?;
        let (input, _unknown2) = nom_unsigned_four_bytes(input)?;

        Ok((
            input,
            (format_version, signature, file_size, filename_data, prefetch_hash),
        ))
    }
}
