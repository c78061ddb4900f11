/**
 * `Prefetch` data tracks execution of applications on Windows workstations.
 * Files carry a fixed header, a version specific file information block, and
 * four sibling sections: the metrics array, the trace chain array, the
 * filename strings, and the volume information block.
 *
 * References:
 *  `https://github.com/libyal/libscca/blob/main/documentation/Windows%20Prefetch%20File%20(PF)%20format.asciidoc`
 */
use crate::error::PrefetchError;
use crate::prefetch::file::{ParseWarning, Prefetch};
use crate::prefetch::filenames::{FilenameString, parse_filename_strings};
use crate::prefetch::header::{FileHeader, HEADER_SIZE};
use crate::prefetch::metrics::{MetricsEntry, metrics_entry_size, parse_metrics};
use crate::prefetch::trace_chain::{TRACE_CHAIN_ENTRY_SIZE, TraceChainEntry, parse_trace_chains};
use crate::prefetch::versions::version::FileInformation;
use crate::prefetch::volume::{VolumeInfo, parse_volumes};
use crate::reader::{ByteReader, FileReader, read_exact_at};
use log::{error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Parse a prefetch file from any byte source
pub fn parse<R: ByteReader>(reader: R) -> Result<Prefetch, PrefetchError> {
    SccaParser::new(reader).parse()
}

/// Read and parse a prefetch file on disk
pub fn parse_file(path: &str) -> Result<Prefetch, PrefetchError> {
    let reader = FileReader::open(path)?;
    parse(reader)
}

/// Signals cooperative cancellation to a running parse from another thread
#[derive(Debug, Clone)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn signal(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_signaled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One-shot parser owning its byte source for the duration of `parse`
pub struct SccaParser<R: ByteReader> {
    reader: R,
    abort: Arc<AtomicBool>,
}

impl<R: ByteReader> SccaParser<R> {
    pub fn new(reader: R) -> SccaParser<R> {
        SccaParser {
            reader,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for aborting this parse before or while it runs
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            flag: Arc::clone(&self.abort),
        }
    }

    /// Set the cooperative abort flag
    pub fn signal_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    fn check_abort(&self) -> Result<(), PrefetchError> {
        if self.abort.load(Ordering::Relaxed) {
            warn!("[prefetch] Parse aborted");
            return Err(PrefetchError::Aborted);
        }
        Ok(())
    }

    /// Run the decode pipeline and assemble the parsed file
    pub fn parse(mut self) -> Result<Prefetch, PrefetchError> {
        self.check_abort()?;
        if !self.reader.is_open() {
            error!("[prefetch] Byte source is not open");
            return Err(PrefetchError::InvalidArgument);
        }

        let source_size = self.reader.size()?;
        if source_size == 0 {
            error!("[prefetch] Byte source is empty");
            return Err(PrefetchError::InvalidArgument);
        }

        let mut warnings: Vec<ParseWarning> = Vec::new();

        let header_data = read_exact_at(&mut self.reader, 0, HEADER_SIZE)?;
        let header = FileHeader::parse_header(&header_data)?;

        if header.file_size as u64 != source_size {
            warn!(
                "[prefetch] Header declares {} bytes but source has {source_size}",
                header.file_size
            );
            warnings.push(ParseWarning::SizeMismatch {
                declared: header.file_size,
                actual: source_size,
            });
        }

        self.check_abort()?;
        let file_information = self.read_file_information(&header)?;

        self.check_abort()?;
        let metrics = self.read_metrics(&header, &file_information)?;

        self.check_abort()?;
        let trace_chains = self.read_trace_chains(&file_information)?;

        self.check_abort()?;
        let filenames = self.read_filenames(&file_information)?;

        // Each metrics entry names one file, so the counts should line up
        if file_information.metrics_array_offset != 0
            && filenames.len() as u32 != file_information.number_of_metrics_entries
        {
            warn!(
                "[prefetch] {} metrics entries but {} filename strings",
                file_information.number_of_metrics_entries,
                filenames.len()
            );
            warnings.push(ParseWarning::InconsistentCounts {
                section: String::from("filename strings"),
                declared: file_information.number_of_metrics_entries,
                parsed: filenames.len() as u32,
            });
        }

        self.check_abort()?;
        let volumes = self.read_volumes(&header, &file_information, &mut warnings)?;

        let prefetch = Prefetch {
            header,
            file_information,
            metrics,
            trace_chains,
            filenames,
            volumes,
            warnings,
        };

        Ok(prefetch)
    }

    fn read_file_information(
        &mut self,
        header: &FileHeader,
    ) -> Result<FileInformation, PrefetchError> {
        let info_size = FileInformation::size_for_version(header.format_version);
        let info_data = read_exact_at(&mut self.reader, HEADER_SIZE as u64, info_size)?;

        let results = FileInformation::get_file_information(&info_data, header.format_version);
        let file_information = match results {
            Ok((_, result)) => result,
            Err(err) => {
                error!("[prefetch] Failed to parse file information: {err:?}");
                return Err(PrefetchError::ShortInput);
            }
        };

        file_information.validate_offsets(header.format_version, header.file_size)?;
        Ok(file_information)
    }

    fn read_metrics(
        &mut self,
        header: &FileHeader,
        info: &FileInformation,
    ) -> Result<Vec<MetricsEntry>, PrefetchError> {
        if info.metrics_array_offset == 0 || info.number_of_metrics_entries == 0 {
            return Ok(Vec::new());
        }

        let read_size =
            info.number_of_metrics_entries as usize * metrics_entry_size(header.format_version);
        let section = read_exact_at(&mut self.reader, info.metrics_array_offset as u64, read_size)?;

        let results = parse_metrics(
            &section,
            info.number_of_metrics_entries,
            header.format_version,
        );
        match results {
            Ok((_, entries)) => Ok(entries),
            Err(err) => {
                error!("[prefetch] Failed to parse file metrics: {err:?}");
                Err(PrefetchError::ShortInput)
            }
        }
    }

    fn read_trace_chains(
        &mut self,
        info: &FileInformation,
    ) -> Result<Vec<TraceChainEntry>, PrefetchError> {
        if info.trace_chain_array_offset == 0 || info.number_of_trace_chain_entries == 0 {
            return Ok(Vec::new());
        }

        let read_size = info.number_of_trace_chain_entries as usize * TRACE_CHAIN_ENTRY_SIZE;
        let section = read_exact_at(
            &mut self.reader,
            info.trace_chain_array_offset as u64,
            read_size,
        )?;

        let results = parse_trace_chains(&section, info.number_of_trace_chain_entries);
        match results {
            Ok((_, entries)) => Ok(entries),
            Err(err) => {
                error!("[prefetch] Failed to parse trace chain array: {err:?}");
                Err(PrefetchError::ShortInput)
            }
        }
    }

    fn read_filenames(
        &mut self,
        info: &FileInformation,
    ) -> Result<Vec<FilenameString>, PrefetchError> {
        if info.filename_strings_offset == 0 || info.filename_strings_size == 0 {
            return Ok(Vec::new());
        }

        let section = read_exact_at(
            &mut self.reader,
            info.filename_strings_offset as u64,
            info.filename_strings_size as usize,
        )?;

        parse_filename_strings(&section)
    }

    fn read_volumes(
        &mut self,
        header: &FileHeader,
        info: &FileInformation,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<Vec<VolumeInfo>, PrefetchError> {
        if info.number_of_volumes == 0 || info.volumes_information_offset == 0 {
            return Ok(Vec::new());
        }

        let block = read_exact_at(
            &mut self.reader,
            info.volumes_information_offset as u64,
            info.volumes_information_size as usize,
        )?;

        let (volumes, volume_warnings) =
            parse_volumes(&block, info.number_of_volumes, header.format_version)?;
        warnings.extend(volume_warnings);
        Ok(volumes)
    }
}
