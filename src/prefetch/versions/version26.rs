use super::version23::Version23;

pub(crate) type Version26 = Version23;

impl Version26 {
    /// Parse Prefetch version 26
    /// Layout is identical to version 23
    pub(crate) fn parse_file_info_ver26(data: &[u8]) -> nom::IResult<&[u8], Version26> {
        Version26::parse_file_info_ver23(data)
    }
}

#[cfg(test)]
mod tests {
    use crate::prefetch::versions::version26::Version26;

    #[test]
    fn test_parse_file_info_ver26() {
        let mut test_data = Vec::new();
        let fields = [304u32, 61, 2256, 2774, 35544, 6924, 42468, 1, 1872];
        for field in fields {
            test_data.extend_from_slice(&field.to_le_bytes());
        }
        test_data.extend_from_slice(&0x01d5d3ea15ce315eu64.to_le_bytes());
        test_data.extend_from_slice(&[0; 56]);
        test_data.extend_from_slice(&45u32.to_le_bytes());
        test_data.extend_from_slice(&[0; 120]);

        let (_, result) = Version26::parse_file_info_ver26(&test_data).unwrap();
        assert_eq!(result.metrics_array_offset, 304);
        assert_eq!(result.number_of_metrics_entries, 61);
        assert_eq!(result.trace_chain_array_offset, 2256);
        assert_eq!(result.number_of_trace_chain_entries, 2774);
        assert_eq!(result.filename_strings_offset, 35544);
        assert_eq!(result.filename_strings_size, 6924);
        assert_eq!(result.number_of_volumes, 1);
        assert_eq!(result.volumes_information_size, 1872);
        assert_eq!(result.run_count, 45);
        assert_eq!(result.last_run_times[0], 0x01d5d3ea15ce315e);
    }
}
