use crate::utils::nom_helper::{nom_data, nom_unsigned_eight_bytes, nom_unsigned_four_bytes};

/// File information size for versions 23 (Vista/Win7) and 26 (Win8)
pub(crate) const FILE_INFORMATION_SIZE_V23: usize = 224;

/// Number of last run time slots recorded since version 23
pub(crate) const RUN_TIME_SLOTS_V23: usize = 8;

pub(crate) struct Version23 {
    pub(crate) metrics_array_offset: u32,
    pub(crate) number_of_metrics_entries: u32,
    pub(crate) trace_chain_array_offset: u32,
    pub(crate) number_of_trace_chain_entries: u32,
    pub(crate) filename_strings_offset: u32,
    pub(crate) filename_strings_size: u32,
    pub(crate) volumes_information_offset: u32,
    pub(crate) number_of_volumes: u32,
    pub(crate) volumes_information_size: u32,
    /// Most recent run first. Unused slots stay zero
    pub(crate) last_run_times: Vec<u64>,
    pub(crate) run_count: u32,
    pub(crate) unknown: Vec<u8>,
}

impl Version23 {
    /// Get fileinfo for Prefetch version 23 (Vista/Win7)
    pub(crate) fn parse_file_info_ver23(data: &[u8]) -> nom::IResult<&[u8], Version23> {
        let (input, metrics_array_offset) = nom_unsigned_four_bytes(data)?;
        let (input, number_of_metrics_entries) = nom_unsigned_four_bytes(input)?;
        let (input, trace_chain_array_offset) = nom_unsigned_four_bytes(input)?;
        let (input, number_of_trace_chain_entries) = nom_unsigned_four_bytes(input)?;
        let (input, filename_strings_offset) = nom_unsigned_four_bytes(input)?;
        let (input, filename_strings_size) = nom_unsigned_four_bytes(input)?;

        let (input, volumes_information_offset) = nom_unsigned_four_bytes(input)?;
        let (input, number_of_volumes) = nom_unsigned_four_bytes(input)?;
        let (mut input, volumes_information_size) = nom_unsigned_four_bytes(input)?;

        let mut last_run_times: Vec<u64> = Vec::new();
        while last_run_times.len() != RUN_TIME_SLOTS_V23 {
            let (runs_data, runtime) = nom_unsigned_eight_bytes(input)?;
            last_run_times.push(runtime);
            input = runs_data;
        }

        let (input, run_count) = nom_unsigned_four_bytes(input)?;

        let trailing_size = 120;
        let (input, unknown) = nom_data(input, trailing_size)?;

        let version = Version23 {
            metrics_array_offset,
            number_of_metrics_entries,
            trace_chain_array_offset,
            number_of_trace_chain_entries,
            filename_strings_offset,
            filename_strings_size,
            volumes_information_offset,
            number_of_volumes,
            volumes_information_size,
            last_run_times,
            run_count,
            unknown: unknown.to_vec(),
        };

        Ok((input, version))
    }
}

#[cfg(test)]
mod tests {
    use crate::prefetch::versions::version23::{FILE_INFORMATION_SIZE_V23, Version23};

    #[test]
    fn test_parse_file_info_ver23() {
        let mut test_data = Vec::new();
        let fields = [296u32, 64, 2344, 4459, 38016, 10344, 48360, 1, 2572];
        for field in fields {
            test_data.extend_from_slice(&field.to_le_bytes());
        }
        test_data.extend_from_slice(&0x01d8ecd228df8359u64.to_le_bytes());
        test_data.extend_from_slice(&0x01d8ecd1de5788ccu64.to_le_bytes());
        test_data.extend_from_slice(&[0; 48]);
        test_data.extend_from_slice(&45u32.to_le_bytes());
        test_data.extend_from_slice(&[0; 120]);
        assert_eq!(test_data.len(), FILE_INFORMATION_SIZE_V23);

        let (remaining, result) = Version23::parse_file_info_ver23(&test_data).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(result.metrics_array_offset, 296);
        assert_eq!(result.number_of_metrics_entries, 64);
        assert_eq!(result.trace_chain_array_offset, 2344);
        assert_eq!(result.number_of_trace_chain_entries, 4459);
        assert_eq!(result.filename_strings_offset, 38016);
        assert_eq!(result.filename_strings_size, 10344);
        assert_eq!(result.volumes_information_offset, 48360);
        assert_eq!(result.number_of_volumes, 1);
        assert_eq!(result.volumes_information_size, 2572);
        assert_eq!(result.last_run_times.len(), 8);
        assert_eq!(result.last_run_times[0], 0x01d8ecd228df8359);
        assert_eq!(result.last_run_times[1], 0x01d8ecd1de5788cc);
        assert_eq!(result.last_run_times[7], 0);
        assert_eq!(result.run_count, 45);
        assert_eq!(result.unknown.len(), 120);
    }
}
