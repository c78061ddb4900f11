use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PrefetchError {
    /// Empty, closed, or otherwise unusable input where one is required
    InvalidArgument,
    /// A read returned fewer bytes than the format requires
    ShortInput,
    /// Header signature is not `SCCA`
    InvalidSignature,
    /// Format version is not 17, 23, or 26
    UnsupportedVersion(u32),
    /// A decoded offset and length escape the containing region
    OffsetOutOfBounds,
    /// Filename strings section is not valid UTF-16LE table data
    MalformedStringTable,
    /// The byte source reported a lower-level failure
    ReadFailed(io::Error),
    /// Cooperative cancellation was observed
    Aborted,
    /// A section buffer could not be allocated
    OutOfMemory,
    /// Accessor index beyond the parsed data
    IndexOutOfRange,
}

impl std::error::Error for PrefetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefetchError::ReadFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for PrefetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefetchError::InvalidArgument => write!(f, "Invalid or empty input provided"),
            PrefetchError::ShortInput => write!(f, "Input ended before the requested data"),
            PrefetchError::InvalidSignature => write!(f, "File header signature is not SCCA"),
            PrefetchError::UnsupportedVersion(version) => {
                write!(f, "Unsupported prefetch format version: {version}")
            }
            PrefetchError::OffsetOutOfBounds => {
                write!(f, "Decoded offset points outside its containing region")
            }
            PrefetchError::MalformedStringTable => {
                write!(f, "Failed to parse UTF-16 string table")
            }
            PrefetchError::ReadFailed(err) => write!(f, "Failed to read from byte source: {err}"),
            PrefetchError::Aborted => write!(f, "Parsing was aborted"),
            PrefetchError::OutOfMemory => write!(f, "Failed to allocate section buffer"),
            PrefetchError::IndexOutOfRange => write!(f, "Index beyond the parsed data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PrefetchError;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_display() {
        let err = PrefetchError::UnsupportedVersion(30);
        assert_eq!(err.to_string(), "Unsupported prefetch format version: 30");
    }

    #[test]
    fn test_source_chain() {
        let inner = io::Error::new(io::ErrorKind::Other, "device gone");
        let err = PrefetchError::ReadFailed(inner);
        assert!(err.source().is_some());
        assert!(PrefetchError::InvalidSignature.source().is_none());
    }
}
