// src/chunk_reader.rs
//
// Range-clamped, re-readable view over one chunk of a local file.
//
// Every part of a multipart transfer gets its own ChunkReader. A failed
// part upload rewinds with seek(0) and replays just that chunk; sibling
// chunks on the same file are untouched because each reader owns a private
// handle and cursor.

use anyhow::{Context, Result};
use bytes::Bytes;
use log::trace;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Stream-like view of the byte range `[start_byte, start_byte + size)` of
/// a file. Positions exposed by [`seek`](ChunkReader::seek) and
/// [`tell`](ChunkReader::tell) are relative to the chunk, not the file.
///
/// Also implements [`std::io::Read`] and [`std::io::Seek`] so a chunk can
/// be handed to anything expecting an ordinary byte stream.
pub struct ChunkReader {
    file: File,
    start_byte: u64,
    size: u64,
    cursor: u64,
}

impl ChunkReader {
    /// Open `path` and present `size` bytes starting at `start_byte`.
    ///
    /// The declared size is clamped against the real file length once, here,
    /// so [`len`](ChunkReader::len) always reports the actually readable
    /// span. Each call opens a fresh handle; readers never share a cursor.
    pub fn open<P: AsRef<Path>>(path: P, start_byte: u64, size: u64) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .with_context(|| format!("cannot open {} for chunked reading", path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("cannot stat {}", path.display()))?
            .len();
        let size = size.min(file_len.saturating_sub(start_byte));
        file.seek(SeekFrom::Start(start_byte))
            .with_context(|| format!("cannot seek {} to byte {start_byte}", path.display()))?;
        trace!(
            "chunk open: {} start={start_byte} len={size}",
            path.display()
        );
        Ok(Self { file, start_byte, size, cursor: 0 })
    }

    /// Read up to `amount` bytes from the current cursor, or the rest of the
    /// chunk when `None`. Returns empty bytes once the chunk end is reached;
    /// never reads past the chunk even if the file continues.
    pub fn read(&mut self, amount: Option<usize>) -> io::Result<Bytes> {
        let remaining = (self.size - self.cursor) as usize;
        let wanted = match amount {
            Some(amount) => amount.min(remaining),
            None => remaining,
        };
        if wanted == 0 {
            return Ok(Bytes::new());
        }
        // The clamp in open() guarantees these bytes exist unless the file
        // was truncated underneath us, which surfaces as UnexpectedEof.
        let mut buf = vec![0u8; wanted];
        self.file.read_exact(&mut buf)?;
        self.cursor += wanted as u64;
        Ok(Bytes::from(buf))
    }

    /// Reposition to `offset` bytes from the start of the chunk (0 = chunk
    /// start). The underlying handle moves to `start_byte + offset`.
    /// Offsets past the end of the chunk clamp to the chunk end.
    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        let offset = offset.min(self.size);
        self.file.seek(SeekFrom::Start(self.start_byte + offset))?;
        self.cursor = offset;
        Ok(())
    }

    /// Current cursor, relative to the start of the chunk.
    pub fn tell(&self) -> u64 {
        self.cursor
    }

    /// Readable span of this chunk, clamped against the real file size.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = (self.size - self.cursor) as usize;
        let wanted = buf.len().min(remaining);
        if wanted == 0 {
            return Ok(0);
        }
        let got = self.file.read(&mut buf[..wanted])?;
        self.cursor += got as u64;
        Ok(got)
    }
}

impl Seek for ChunkReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.cursor as i128 + delta as i128,
            SeekFrom::End(delta) => self.size as i128 + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of chunk",
            ));
        }
        let target = (target as u64).min(self.size);
        ChunkReader::seek(self, target)?;
        Ok(target)
    }
}
