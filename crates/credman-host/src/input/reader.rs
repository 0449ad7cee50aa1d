use crate::abi;
use std::cmp::min;
use std::io::{self, Read, Seek, SeekFrom};

/// Streaming reader for the registered credential catalog blob.
///
/// Uses the host's offset-based `ReadCredentialsBuffer` and tolerates short
/// reads (the host may return fewer bytes than requested).
#[derive(Debug, Clone)]
pub struct CredentialReader {
    size: u64,
    offset: u64,
}

impl CredentialReader {
    /// Creates a new reader positioned at offset 0.
    pub fn new() -> Self {
        let size = abi::get_credentials_size() as u64;
        Self { size, offset: 0 }
    }

    /// Total size of the catalog blob in bytes.
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Returns true if the catalog blob is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current position in bytes from the start.
    pub fn position(&self) -> u64 {
        self.offset
    }
}

impl Default for CredentialReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for CredentialReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.offset >= self.size || out.is_empty() {
            return Ok(0);
        }
        let remaining = (self.size - self.offset) as usize;
        let to_request = min(out.len(), remaining);
        let nread = abi::read_credentials_buffer(&mut out[..to_request], self.offset as usize);
        self.offset = self.offset.saturating_add(nread as u64);
        Ok(nread)
    }
}

impl Seek for CredentialReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let Some(new_offset) = (match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.offset.checked_add_signed(delta),
        }) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start",
            ));
        };
        self.offset = new_offset;
        Ok(self.offset)
    }
}
