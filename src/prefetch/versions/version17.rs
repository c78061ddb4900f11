use crate::utils::nom_helper::{nom_data, nom_unsigned_eight_bytes, nom_unsigned_four_bytes};

/// File information size for version 17 (WinXP/2003)
pub(crate) const FILE_INFORMATION_SIZE_V17: usize = 156;

pub(crate) struct Version17 {
    pub(crate) metrics_array_offset: u32,
    pub(crate) number_of_metrics_entries: u32,
    pub(crate) trace_chain_array_offset: u32,
    pub(crate) number_of_trace_chain_entries: u32,
    pub(crate) filename_strings_offset: u32,
    pub(crate) filename_strings_size: u32,
    pub(crate) volumes_information_offset: u32,
    pub(crate) number_of_volumes: u32,
    pub(crate) volumes_information_size: u32,
    pub(crate) last_run_time: u64,
    pub(crate) run_count: u32,
    pub(crate) unknown: Vec<u8>,
    pub(crate) unknown2: Vec<u8>,
}

impl Version17 {
    /// Get fileinfo for Prefetch version 17 (WinXP)
    pub(crate) fn parse_file_info_ver17(data: &[u8]) -> nom::IResult<&[u8], Version17> {
        let (input, metrics_array_offset) = nom_unsigned_four_bytes(data)?;
        let (input, number_of_metrics_entries) = nom_unsigned_four_bytes(input)?;
        let (input, trace_chain_array_offset) = nom_unsigned_four_bytes(input)?;
        let (input, number_of_trace_chain_entries) = nom_unsigned_four_bytes(input)?;
        let (input, filename_strings_offset) = nom_unsigned_four_bytes(input)?;
        let (input, filename_strings_size) = nom_unsigned_four_bytes(input)?;

        let (input, volumes_information_offset) = nom_unsigned_four_bytes(input)?;
        let (input, number_of_volumes) = nom_unsigned_four_bytes(input)?;
        let (input, volumes_information_size) = nom_unsigned_four_bytes(input)?;

        let (input, last_run_time) = nom_unsigned_eight_bytes(input)?;

        let pad_size = 8;
        let (input, unknown) = nom_data(input, pad_size)?;
        let (input, run_count) = nom_unsigned_four_bytes(input)?;

        let trailing_size = 100;
        let (input, unknown2) = nom_data(input, trailing_size)?;

        let version = Version17 {
            metrics_array_offset,
            number_of_metrics_entries,
            trace_chain_array_offset,
            number_of_trace_chain_entries,
            filename_strings_offset,
            filename_strings_size,
            volumes_information_offset,
            number_of_volumes,
            volumes_information_size,
            last_run_time,
            run_count,
            unknown: unknown.to_vec(),
            unknown2: unknown2.to_vec(),
        };

        Ok((input, version))
    }
}
