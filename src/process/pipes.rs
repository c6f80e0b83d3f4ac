// src/process/pipes.rs

//! Chunked transfers over pipe ends.
//!
//! Both helpers move at most `chunk_size` bytes per system call. The chunk
//! size only changes how many calls are made: the bytes written or
//! collected are the same for every size.

use std::io::{self, ErrorKind, Read, Write};

/// Write all of `data` to `writer`, `chunk_size` bytes at a time.
///
/// A zero `chunk_size` is treated as one byte.
pub fn write_chunked<W: Write + ?Sized>(
    writer: &mut W,
    data: &[u8],
    chunk_size: usize,
) -> io::Result<()> {
    for chunk in data.chunks(chunk_size.max(1)) {
        // `write_all` retries short writes and EINTR.
        writer.write_all(chunk)?;
    }
    writer.flush()
}

/// Read from `reader` until end-of-stream, `chunk_size` bytes at a time,
/// and return everything read.
///
/// A zero `chunk_size` is treated as one byte.
pub fn read_chunked<R: Read + ?Sized>(reader: &mut R, chunk_size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut out = Vec::new();

    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(out),
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
