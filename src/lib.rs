//! Read-only parser for Windows Prefetch (SCCA) files.
//!
//! Prefetch files record which executable ran, when it last ran, which files
//! and directories it touched, and on which volumes those objects lived,
//! which makes them a staple of Windows forensics. This crate decodes format
//! versions 17 (WinXP/2003), 23 (Vista/7), and 26 (Win8/8.1) into an
//! immutable [`Prefetch`] model. MAM compressed Win10+ files are rejected as
//! [`PrefetchError::UnsupportedVersion`].
//!
//! ```no_run
//! use scca::parse_file;
//!
//! let prefetch = parse_file("CMD.EXE-AC113AA8.pf").unwrap();
//! println!(
//!     "{} ran {} times",
//!     prefetch.executable_filename(),
//!     prefetch.run_count()
//! );
//! for index in 0..prefetch.filenames_count() {
//!     println!("  {}", prefetch.filename(index).unwrap());
//! }
//! ```
//!
//! Any random-access byte source works through the [`ByteReader`] trait:
//!
//! ```
//! use scca::{BufferReader, parse};
//!
//! let result = parse(BufferReader::new(vec![0; 32]));
//! assert!(result.is_err());
//! ```

mod error;
mod prefetch;
mod reader;
mod utils;

pub use crate::error::PrefetchError;
pub use crate::prefetch::file::{ParseWarning, Prefetch, VolumeView};
pub use crate::prefetch::filenames::FilenameString;
pub use crate::prefetch::header::FileHeader;
pub use crate::prefetch::metrics::MetricsEntry;
pub use crate::prefetch::parser::{AbortHandle, SccaParser, parse, parse_file};
pub use crate::prefetch::trace_chain::{TERMINAL_CHAIN_INDEX, TraceChainEntry};
pub use crate::prefetch::versions::version::FileInformation;
pub use crate::prefetch::volume::{VolumeInfo, mft_entry, mft_sequence};
pub use crate::reader::{BufferReader, ByteReader, FileReader};
