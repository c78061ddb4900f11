/**
 * Random-access byte sources feeding the parser.
 *
 * The decoders never touch the filesystem directly. They pull whole sections
 * through a `ByteReader`, so the same pipeline runs against a local file, an
 * in-memory buffer, or anything else that can satisfy the trait.
 */
use crate::error::PrefetchError;
use log::error;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access byte source contract
pub trait ByteReader {
    /// Total number of bytes available
    fn size(&mut self) -> Result<u64, PrefetchError>;
    /// Position the source at an absolute offset
    fn seek(&mut self, offset: u64) -> Result<(), PrefetchError>;
    /// Read into `buffer`, returning the number of bytes read. Zero means end of input
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, PrefetchError>;
    /// Whether the source can still serve reads
    fn is_open(&self) -> bool;
    /// Release the underlying resource. Further reads fail with `InvalidArgument`
    fn close(&mut self);
}

/// `ByteReader` backed by a file on disk
pub struct FileReader {
    file: Option<File>,
}

impl FileReader {
    /// Open a file for parsing
    pub fn open(path: &str) -> Result<FileReader, PrefetchError> {
        if !Path::new(path).is_file() {
            error!("[prefetch] Provided path is not a file: {path}");
            return Err(PrefetchError::InvalidArgument);
        }

        let open_result = File::open(path);
        let file = match open_result {
            Ok(result) => result,
            Err(err) => {
                error!("[prefetch] Failed to open file {path}: {err:?}");
                return Err(PrefetchError::ReadFailed(err));
            }
        };

        Ok(FileReader { file: Some(file) })
    }

    fn handle(&mut self) -> Result<&mut File, PrefetchError> {
        self.file.as_mut().ok_or(PrefetchError::InvalidArgument)
    }
}

impl ByteReader for FileReader {
    fn size(&mut self) -> Result<u64, PrefetchError> {
        let file = self.handle()?;
        match file.metadata() {
            Ok(meta) => Ok(meta.len()),
            Err(err) => {
                error!("[prefetch] Failed to get file size: {err:?}");
                Err(PrefetchError::ReadFailed(err))
            }
        }
    }

    fn seek(&mut self, offset: u64) -> Result<(), PrefetchError> {
        let file = self.handle()?;
        if let Err(err) = file.seek(SeekFrom::Start(offset)) {
            error!("[prefetch] Failed to seek to offset {offset}: {err:?}");
            return Err(PrefetchError::ReadFailed(err));
        }
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, PrefetchError> {
        let file = self.handle()?;
        match file.read(buffer) {
            Ok(count) => Ok(count),
            Err(err) => {
                error!("[prefetch] Failed to read file data: {err:?}");
                Err(PrefetchError::ReadFailed(err))
            }
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn close(&mut self) {
        self.file = None;
    }
}

/// `ByteReader` over an in-memory buffer
pub struct BufferReader {
    data: Vec<u8>,
    position: usize,
    open: bool,
}

impl BufferReader {
    pub fn new(data: Vec<u8>) -> BufferReader {
        BufferReader {
            data,
            position: 0,
            open: true,
        }
    }
}

impl From<Vec<u8>> for BufferReader {
    fn from(data: Vec<u8>) -> BufferReader {
        BufferReader::new(data)
    }
}

impl ByteReader for BufferReader {
    fn size(&mut self) -> Result<u64, PrefetchError> {
        if !self.open {
            return Err(PrefetchError::InvalidArgument);
        }
        Ok(self.data.len() as u64)
    }

    fn seek(&mut self, offset: u64) -> Result<(), PrefetchError> {
        if !self.open {
            return Err(PrefetchError::InvalidArgument);
        }
        self.position = offset as usize;
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, PrefetchError> {
        if !self.open {
            return Err(PrefetchError::InvalidArgument);
        }
        if self.position >= self.data.len() {
            return Ok(0);
        }
        let available = &self.data[self.position..];
        let count = available.len().min(buffer.len());
        buffer[..count].copy_from_slice(&available[..count]);
        self.position += count;
        Ok(count)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        self.data = Vec::new();
    }
}

/// Read exactly `length` bytes starting at `offset`. One buffer per section,
/// sized with `try_reserve_exact` so allocator refusal surfaces as `OutOfMemory`
pub(crate) fn read_exact_at(
    reader: &mut dyn ByteReader,
    offset: u64,
    length: usize,
) -> Result<Vec<u8>, PrefetchError> {
    reader.seek(offset)?;

    let mut buffer: Vec<u8> = Vec::new();
    if buffer.try_reserve_exact(length).is_err() {
        error!("[prefetch] Failed to allocate {length} byte section buffer");
        return Err(PrefetchError::OutOfMemory);
    }
    buffer.resize(length, 0);

    let mut filled = 0;
    while filled < length {
        let count = reader.read(&mut buffer[filled..])?;
        if count == 0 {
            error!(
                "[prefetch] Input ended after {filled} of {length} bytes at offset {offset}"
            );
            return Err(PrefetchError::ShortInput);
        }
        filled += count;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{read_exact_at, BufferReader, ByteReader};
    use crate::error::PrefetchError;

    #[test]
    fn test_buffer_reader_read() {
        let mut reader = BufferReader::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(reader.size().unwrap(), 5);

        let mut buffer = [0; 3];
        reader.seek(1).unwrap();
        assert_eq!(reader.read(&mut buffer).unwrap(), 3);
        assert_eq!(buffer, [2, 3, 4]);
    }

    #[test]
    fn test_buffer_reader_end_of_input() {
        let mut reader = BufferReader::new(vec![1, 2]);
        reader.seek(10).unwrap();

        let mut buffer = [0; 2];
        assert_eq!(reader.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_buffer_reader_close() {
        let mut reader = BufferReader::new(vec![1, 2]);
        assert!(reader.is_open());
        reader.close();
        assert!(!reader.is_open());

        let result = reader.size();
        assert!(matches!(result, Err(PrefetchError::InvalidArgument)));
    }

    #[test]
    fn test_read_exact_at() {
        let mut reader = BufferReader::new(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let section = read_exact_at(&mut reader, 2, 4).unwrap();
        assert_eq!(section, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_read_exact_at_short() {
        let mut reader = BufferReader::new(vec![0, 1, 2, 3]);
        let result = read_exact_at(&mut reader, 2, 4);
        assert!(matches!(result, Err(PrefetchError::ShortInput)));
    }
}
