use crate::error::PrefetchError;
use crate::prefetch::filenames::FilenameString;
use crate::prefetch::header::FileHeader;
use crate::prefetch::metrics::MetricsEntry;
use crate::prefetch::trace_chain::TraceChainEntry;
use crate::prefetch::versions::version::FileInformation;
use crate::prefetch::volume::VolumeInfo;
use crate::utils::time::{filetime_to_unixepoch, unixepoch_to_iso};
use serde::Serialize;

/// Non-fatal conditions observed while parsing, kept on the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseWarning {
    /// Header declared size differs from the byte source size
    SizeMismatch { declared: u32, actual: u64 },
    /// A declared count disagrees with what was parsed
    InconsistentCounts {
        section: String,
        declared: u32,
        parsed: u32,
    },
}

/// Fully parsed prefetch file. Immutable once constructed and safe to share
/// across threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefetch {
    pub(crate) header: FileHeader,
    pub(crate) file_information: FileInformation,
    pub(crate) metrics: Vec<MetricsEntry>,
    pub(crate) trace_chains: Vec<TraceChainEntry>,
    pub(crate) filenames: Vec<FilenameString>,
    pub(crate) volumes: Vec<VolumeInfo>,
    pub(crate) warnings: Vec<ParseWarning>,
}

impl Prefetch {
    pub fn format_version(&self) -> u32 {
        self.header.format_version
    }

    /// File size declared by the header. Compare with the byte source through
    /// the `SizeMismatch` warning
    pub fn file_size_declared(&self) -> u32 {
        self.header.file_size
    }

    pub fn prefetch_hash(&self) -> u32 {
        self.header.prefetch_hash
    }

    /// Hash rendered the way it appears in prefetch filenames, ex: `AC113AA8`
    pub fn prefetch_hash_string(&self) -> String {
        format!("{:X}", self.header.prefetch_hash)
    }

    pub fn executable_filename(&self) -> &str {
        &self.header.executable_filename
    }

    pub fn run_count(&self) -> u32 {
        self.file_information.run_count
    }

    /// Number of last run time slots for this format version
    pub fn last_run_time_slots(&self) -> usize {
        FileInformation::run_time_slots(self.header.format_version)
    }

    /// Raw FILETIME of a recorded run, most recent first. Slots the format
    /// carries but the file never filled read as zero
    pub fn last_run_time(&self, index: usize) -> Result<u64, PrefetchError> {
        if index >= self.last_run_time_slots() {
            return Err(PrefetchError::IndexOutOfRange);
        }
        Ok(self
            .file_information
            .last_run_times
            .get(index)
            .copied()
            .unwrap_or(0))
    }

    /// Recorded run times as ISO8601 strings, zero slots skipped
    pub fn last_run_times_iso(&self) -> Vec<String> {
        self.file_information
            .last_run_times
            .iter()
            .filter(|runtime| **runtime != 0)
            .map(|runtime| unixepoch_to_iso(&filetime_to_unixepoch(runtime)))
            .collect()
    }

    pub fn file_information(&self) -> &FileInformation {
        &self.file_information
    }

    pub fn metrics(&self) -> &[MetricsEntry] {
        &self.metrics
    }

    pub fn trace_chains(&self) -> &[TraceChainEntry] {
        &self.trace_chains
    }

    pub fn filenames_count(&self) -> usize {
        self.filenames.len()
    }

    /// Decoded filename at `index`
    pub fn filename(&self, index: usize) -> Result<&str, PrefetchError> {
        match self.filenames.get(index) {
            Some(entry) => Ok(entry.as_str()),
            None => Err(PrefetchError::IndexOutOfRange),
        }
    }

    pub fn filenames(&self) -> &[FilenameString] {
        &self.filenames
    }

    pub fn volumes_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn volume(&self, index: usize) -> Result<VolumeView<'_>, PrefetchError> {
        match self.volumes.get(index) {
            Some(info) => Ok(VolumeView { info }),
            None => Err(PrefetchError::IndexOutOfRange),
        }
    }

    pub fn volumes(&self) -> &[VolumeInfo] {
        &self.volumes
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

/// Indexed view over one parsed volume
#[derive(Debug, Clone, Copy)]
pub struct VolumeView<'a> {
    info: &'a VolumeInfo,
}

impl<'a> VolumeView<'a> {
    pub fn device_path(&self) -> &'a str {
        &self.info.device_path
    }

    /// Raw FILETIME of volume creation
    pub fn creation_time(&self) -> u64 {
        self.info.creation_time
    }

    pub fn creation_time_iso(&self) -> String {
        unixepoch_to_iso(&filetime_to_unixepoch(&self.info.creation_time))
    }

    pub fn serial_number(&self) -> u32 {
        self.info.serial_number
    }

    pub fn file_references_count(&self) -> usize {
        self.info.file_references.len()
    }

    /// NTFS file reference at `index`. Split with `mft_entry` and `mft_sequence`
    pub fn file_reference(&self, index: usize) -> Result<u64, PrefetchError> {
        match self.info.file_references.get(index) {
            Some(reference) => Ok(*reference),
            None => Err(PrefetchError::IndexOutOfRange),
        }
    }

    pub fn directory_strings_count(&self) -> usize {
        self.info.directory_strings.len()
    }

    pub fn directory_string(&self, index: usize) -> Result<&'a str, PrefetchError> {
        match self.info.directory_strings.get(index) {
            Some(entry) => Ok(entry.as_str()),
            None => Err(PrefetchError::IndexOutOfRange),
        }
    }

    /// Underlying volume data
    pub fn info(&self) -> &'a VolumeInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseWarning, Prefetch};
    use crate::error::PrefetchError;
    use crate::prefetch::header::FileHeader;
    use crate::prefetch::versions::version::FileInformation;
    use crate::prefetch::volume::VolumeInfo;

    fn sample_prefetch() -> Prefetch {
        Prefetch {
            header: FileHeader {
                format_version: 23,
                file_size: 14130,
                executable_filename: String::from("CMD.EXE"),
                prefetch_hash: 0xAC113AA8,
            },
            file_information: FileInformation {
                metrics_array_offset: 0,
                number_of_metrics_entries: 0,
                trace_chain_array_offset: 0,
                number_of_trace_chain_entries: 0,
                filename_strings_offset: 0,
                filename_strings_size: 0,
                volumes_information_offset: 0,
                number_of_volumes: 0,
                volumes_information_size: 0,
                last_run_times: vec![0x01d012a100000000, 0, 0, 0, 0, 0, 0, 0],
                run_count: 80,
                unknown: Vec::new(),
            },
            metrics: Vec::new(),
            trace_chains: Vec::new(),
            filenames: Vec::new(),
            volumes: vec![VolumeInfo {
                device_path: String::from("\\DEVICE\\HARDDISKVOLUME2"),
                creation_time: 0x01d012a100000000,
                serial_number: 0x7ADCE687,
                file_references: vec![0x0001000000000042],
                directory_strings: Vec::new(),
                unknown: Vec::new(),
            }],
            warnings: vec![ParseWarning::SizeMismatch {
                declared: 14130,
                actual: 14131,
            }],
        }
    }

    #[test]
    fn test_accessors() {
        let prefetch = sample_prefetch();

        assert_eq!(prefetch.format_version(), 23);
        assert_eq!(prefetch.file_size_declared(), 14130);
        assert_eq!(prefetch.prefetch_hash(), 0xAC113AA8);
        assert_eq!(prefetch.prefetch_hash_string(), "AC113AA8");
        assert_eq!(prefetch.executable_filename(), "CMD.EXE");
        assert_eq!(prefetch.run_count(), 80);
        assert_eq!(prefetch.filenames_count(), 0);
        assert_eq!(prefetch.volumes_count(), 1);
        assert_eq!(prefetch.warnings().len(), 1);
    }

    #[test]
    fn test_last_run_time_slots() {
        let prefetch = sample_prefetch();

        assert_eq!(prefetch.last_run_time_slots(), 8);
        assert_eq!(prefetch.last_run_time(0).unwrap(), 0x01d012a100000000);
        assert_eq!(prefetch.last_run_time(7).unwrap(), 0);

        let result = prefetch.last_run_time(8);
        assert!(matches!(result, Err(PrefetchError::IndexOutOfRange)));
    }

    #[test]
    fn test_last_run_times_iso_skips_zero_slots() {
        let prefetch = sample_prefetch();
        assert_eq!(prefetch.last_run_times_iso().len(), 1);
    }

    #[test]
    fn test_volume_view() {
        let prefetch = sample_prefetch();
        let volume = prefetch.volume(0).unwrap();

        assert_eq!(volume.device_path(), "\\DEVICE\\HARDDISKVOLUME2");
        assert_eq!(volume.serial_number(), 0x7ADCE687);
        assert_eq!(volume.file_references_count(), 1);
        assert_eq!(volume.file_reference(0).unwrap(), 0x0001000000000042);
        assert_eq!(volume.directory_strings_count(), 0);

        let result = volume.file_reference(1);
        assert!(matches!(result, Err(PrefetchError::IndexOutOfRange)));

        let missing = prefetch.volume(1);
        assert!(missing.is_err());
    }

    #[test]
    fn test_model_shares_across_threads() {
        fn requires_send_sync<T: Send + Sync>() {}
        requires_send_sync::<Prefetch>();
    }

    #[test]
    fn test_bad_filename_index() {
        let prefetch = sample_prefetch();
        let result = prefetch.filename(0);
        assert!(matches!(result, Err(PrefetchError::IndexOutOfRange)));
    }
}
