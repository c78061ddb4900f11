use super::{
    version17::{FILE_INFORMATION_SIZE_V17, Version17},
    version23::{FILE_INFORMATION_SIZE_V23, RUN_TIME_SLOTS_V23, Version23},
    version26::Version26,
};
use crate::error::PrefetchError;
use crate::prefetch::header::HEADER_SIZE;
use crate::prefetch::metrics::metrics_entry_size;
use crate::prefetch::trace_chain::TRACE_CHAIN_ENTRY_SIZE;
use log::error;
use serde::Serialize;

/// Version independent view of the file information block that follows the
/// header. Section offsets are absolute file offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInformation {
    pub metrics_array_offset: u32,
    pub number_of_metrics_entries: u32,
    pub trace_chain_array_offset: u32,
    pub number_of_trace_chain_entries: u32,
    pub filename_strings_offset: u32,
    pub filename_strings_size: u32,
    pub volumes_information_offset: u32,
    pub number_of_volumes: u32,
    pub volumes_information_size: u32,
    /// Raw FILETIME values, most recent first. One slot for version 17,
    /// eight slots for versions 23 and 26
    pub last_run_times: Vec<u64>,
    pub run_count: u32,
    /// Padding and undocumented trailing bytes, kept verbatim
    pub unknown: Vec<u8>,
}

impl FileInformation {
    /// Size of the file information block for a supported version
    pub(crate) fn size_for_version(version: u32) -> usize {
        let version17 = 17;
        if version == version17 {
            FILE_INFORMATION_SIZE_V17
        } else {
            FILE_INFORMATION_SIZE_V23
        }
    }

    /// Number of last run time slots for a supported version
    pub(crate) fn run_time_slots(version: u32) -> usize {
        let version17 = 17;
        if version == version17 { 1 } else { RUN_TIME_SLOTS_V23 }
    }

    /// Get Prefetch file information based on version value
    pub(crate) fn get_file_information(
        data: &[u8],
        version: u32,
    ) -> nom::IResult<&[u8], FileInformation> {
        let version17 = 17; // WinXP
        let version23 = 23; // Vista/Win7
        let version26 = 26; // Win8

        if version == version17 {
            let (input, result) = Version17::parse_file_info_ver17(data)?;
            return Ok((input, FileInformation::from_version17(result)));
        }

        let (input, result) = if version == version23 {
            Version23::parse_file_info_ver23(data)?
        } else if version == version26 {
            Version26::parse_file_info_ver26(data)?
        } else {
            error!("[prefetch] Unsupported Prefetch version: {version}");
            return Err(nom::Err::Incomplete(nom::Needed::Unknown));
        };

        Ok((input, FileInformation::from_version23(result)))
    }

    fn from_version17(info: Version17) -> FileInformation {
        let mut unknown = info.unknown;
        unknown.extend_from_slice(&info.unknown2);

        FileInformation {
            metrics_array_offset: info.metrics_array_offset,
            number_of_metrics_entries: info.number_of_metrics_entries,
            trace_chain_array_offset: info.trace_chain_array_offset,
            number_of_trace_chain_entries: info.number_of_trace_chain_entries,
            filename_strings_offset: info.filename_strings_offset,
            filename_strings_size: info.filename_strings_size,
            volumes_information_offset: info.volumes_information_offset,
            number_of_volumes: info.number_of_volumes,
            volumes_information_size: info.volumes_information_size,
            last_run_times: vec![info.last_run_time],
            run_count: info.run_count,
            unknown,
        }
    }

    fn from_version23(info: Version23) -> FileInformation {
        FileInformation {
            metrics_array_offset: info.metrics_array_offset,
            number_of_metrics_entries: info.number_of_metrics_entries,
            trace_chain_array_offset: info.trace_chain_array_offset,
            number_of_trace_chain_entries: info.number_of_trace_chain_entries,
            filename_strings_offset: info.filename_strings_offset,
            filename_strings_size: info.filename_strings_size,
            volumes_information_offset: info.volumes_information_offset,
            number_of_volumes: info.number_of_volumes,
            volumes_information_size: info.volumes_information_size,
            last_run_times: info.last_run_times,
            run_count: info.run_count,
            unknown: info.unknown,
        }
    }

    /// Check every non-zero section offset against the declared file size.
    /// A zero offset marks an absent section
    pub(crate) fn validate_offsets(
        &self,
        version: u32,
        file_size: u32,
    ) -> Result<(), PrefetchError> {
        let metrics_size =
            self.number_of_metrics_entries as u64 * metrics_entry_size(version) as u64;
        let trace_chain_size =
            self.number_of_trace_chain_entries as u64 * TRACE_CHAIN_ENTRY_SIZE as u64;

        let sections = [
            ("metrics array", self.metrics_array_offset, metrics_size),
            (
                "trace chain array",
                self.trace_chain_array_offset,
                trace_chain_size,
            ),
            (
                "filename strings",
                self.filename_strings_offset,
                self.filename_strings_size as u64,
            ),
            (
                "volumes information",
                self.volumes_information_offset,
                self.volumes_information_size as u64,
            ),
        ];

        for (name, offset, size) in sections {
            if offset == 0 {
                continue;
            }
            let start = offset as u64;
            if start < HEADER_SIZE as u64 || start + size > file_size as u64 {
                error!(
                    "[prefetch] The {name} section escapes the file: offset {offset}, size {size}, file size {file_size}"
                );
                return Err(PrefetchError::OffsetOutOfBounds);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileInformation;
    use crate::error::PrefetchError;

    fn sample_v17_data() -> Vec<u8> {
        let mut data = Vec::new();
        let fields = [240u32, 58, 1400, 96, 2552, 6512, 9064, 1, 2150];
        for field in fields {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.extend_from_slice(&0x01d8ecd228df8359u64.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&80u32.to_le_bytes());
        data.extend_from_slice(&[0; 100]);
        data
    }

    #[test]
    fn test_get_file_information_version17() {
        let test_data = sample_v17_data();

        let (_, result) = FileInformation::get_file_information(&test_data, 17).unwrap();
        assert_eq!(result.metrics_array_offset, 240);
        assert_eq!(result.number_of_metrics_entries, 58);
        assert_eq!(result.last_run_times, vec![0x01d8ecd228df8359]);
        assert_eq!(result.run_count, 80);
        assert_eq!(result.unknown.len(), 108);
    }

    #[test]
    fn test_get_file_information_unsupported() {
        let test_data = sample_v17_data();

        let result = FileInformation::get_file_information(&test_data, 30);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_offsets() {
        let test_data = sample_v17_data();
        let (_, result) = FileInformation::get_file_information(&test_data, 17).unwrap();

        // 9064 + 2150 = 11214
        assert!(result.validate_offsets(17, 11214).is_ok());

        let short_file = result.validate_offsets(17, 11213);
        assert!(matches!(short_file, Err(PrefetchError::OffsetOutOfBounds)));
    }

    #[test]
    fn test_validate_offsets_inside_header() {
        let test_data = sample_v17_data();
        let (_, mut result) = FileInformation::get_file_information(&test_data, 17).unwrap();
        result.metrics_array_offset = 80;

        let status = result.validate_offsets(17, 20000);
        assert!(matches!(status, Err(PrefetchError::OffsetOutOfBounds)));
    }

    #[test]
    fn test_size_for_version() {
        assert_eq!(FileInformation::size_for_version(17), 156);
        assert_eq!(FileInformation::size_for_version(23), 224);
        assert_eq!(FileInformation::size_for_version(26), 224);
    }
}
