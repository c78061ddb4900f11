use crate::utils::nom_helper::{nom_unsigned_eight_bytes, nom_unsigned_four_bytes};
use serde::Serialize;

/// Size in bytes of one metrics array entry
pub(crate) fn metrics_entry_size(version: u32) -> usize {
    let version17 = 17;
    let v17_size = 20;
    let v23_size = 32;
    if version == version17 { v17_size } else { v23_size }
}

/// Per-file statistics recorded for the traced launch. Versions 23 and 26
/// additionally record an average duration and an NTFS file reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsEntry {
    pub start_time_ms: u32,
    pub duration_ms: u32,
    pub average_duration_ms: Option<u32>,
    /// Byte offset of the filename in the filename strings section
    pub filename_string_offset: u32,
    pub filename_string_number_of_characters: u32,
    pub flags: u32,
    pub file_reference: Option<u64>,
}

impl MetricsEntry {
    fn parse_entry(data: &[u8], version: u32) -> nom::IResult<&[u8], MetricsEntry> {
        let version17 = 17;

        let (input, start_time_ms) = nom_unsigned_four_bytes(data)?;
        let (mut input, duration_ms) = nom_unsigned_four_bytes(input)?;

        let mut average_duration_ms = None;
        if version != version17 {
            let (remaining, average) = nom_unsigned_four_bytes(input)?;
            average_duration_ms = Some(average);
            input = remaining;
        }

        let (input, filename_string_offset) = nom_unsigned_four_bytes(input)?;
        let (input, filename_string_number_of_characters) =
            nom_unsigned_four_bytes(input)?;
        let (mut input, flags) = nom_unsigned_four_bytes(input)?;

        let mut file_reference = None;
        if version != version17 {
            let (remaining, reference) = nom_unsigned_eight_bytes(input)?;
            file_reference = Some(reference);
            input = remaining;
        }

        let entry = MetricsEntry {
            start_time_ms,
            duration_ms,
            average_duration_ms,
            filename_string_offset,
            filename_string_number_of_characters,
            flags,
            file_reference,
        };

        Ok((input, entry))
    }
}

/// Walk the metrics array. Tolerates an entry count of zero
pub(crate) fn parse_metrics(
    data: &[u8],
    count: u32,
    version: u32,
) -> nom::IResult<&[u8], Vec<MetricsEntry>> {
    let mut entries: Vec<MetricsEntry> = Vec::new();
    let mut input = data;

    for _ in 0..count {
        let (remaining, entry) = MetricsEntry::parse_entry(input, version)?;
        entries.push(entry);
        input = remaining;
    }

    Ok((input, entries))
}

#[cfg(test)]
mod tests {
    use super::{metrics_entry_size, parse_metrics};

    #[test]
    fn test_parse_metrics_ver17() {
        let mut test_data = Vec::new();
        for field in [0u32, 23, 5200, 56, 0x200] {
            test_data.extend_from_slice(&field.to_le_bytes());
        }

        let (remaining, results) = parse_metrics(&test_data, 1, 17).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start_time_ms, 0);
        assert_eq!(results[0].duration_ms, 23);
        assert_eq!(results[0].average_duration_ms, None);
        assert_eq!(results[0].filename_string_offset, 5200);
        assert_eq!(results[0].filename_string_number_of_characters, 56);
        assert_eq!(results[0].flags, 0x200);
        assert_eq!(results[0].file_reference, None);
    }

    #[test]
    fn test_parse_metrics_ver23() {
        let mut test_data = Vec::new();
        for field in [3u32, 40, 21, 0, 62, 0x2] {
            test_data.extend_from_slice(&field.to_le_bytes());
        }
        test_data.extend_from_slice(&0x0005000000009a42u64.to_le_bytes());

        let (_, results) = parse_metrics(&test_data, 1, 23).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start_time_ms, 3);
        assert_eq!(results[0].duration_ms, 40);
        assert_eq!(results[0].average_duration_ms, Some(21));
        assert_eq!(results[0].filename_string_offset, 0);
        assert_eq!(results[0].filename_string_number_of_characters, 62);
        assert_eq!(results[0].flags, 0x2);
        assert_eq!(results[0].file_reference, Some(0x0005000000009a42));
    }

    #[test]
    fn test_parse_metrics_empty() {
        let (_, results) = parse_metrics(&[], 0, 23).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_metrics_entry_size() {
        assert_eq!(metrics_entry_size(17), 20);
        assert_eq!(metrics_entry_size(23), 32);
        assert_eq!(metrics_entry_size(26), 32);
    }

    #[test]
    fn test_parse_metrics_truncated() {
        let test_data = vec![0, 0, 0, 0];
        let result = parse_metrics(&test_data, 1, 23);
        assert!(result.is_err());
    }
}
