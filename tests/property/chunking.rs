use std::io::{self, Cursor, Read, Write};

use proptest::prelude::*;
use childpipe_test_utils::builders;
use childpipe::test_support::{read_chunked, write_chunked};
use childpipe::{LaunchConfig, Process};

/// Reader that hands out at most `limit` bytes per call and fails every
/// other call with `Interrupted`.
struct Stuttering<R> {
    inner: R,
    limit: usize,
    interrupt_next: bool,
}

impl<R: Read> Read for Stuttering<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = buf.len().min(self.limit);
        self.inner.read(&mut buf[..n])
    }
}

/// Writer that records the size of every write call.
#[derive(Default)]
struct Recording {
    bytes: Vec<u8>,
    calls: Vec<usize>,
}

impl Write for Recording {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls.push(buf.len());
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

proptest! {
    #[test]
    fn read_result_does_not_depend_on_chunk_size(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 0usize..600,
        limit in 1usize..300,
    ) {
        let mut reader = Stuttering { inner: Cursor::new(data.clone()), limit, interrupt_next: false };
        let read = read_chunked(&mut reader, chunk).unwrap();
        prop_assert_eq!(read, data);
    }

    #[test]
    fn writes_never_exceed_chunk_size(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 0usize..600,
    ) {
        let mut writer = Recording::default();
        write_chunked(&mut writer, &data, chunk).unwrap();

        prop_assert_eq!(&writer.bytes, &data);
        prop_assert!(writer.calls.iter().all(|&n| n >= 1 && n <= chunk.max(1)));
        prop_assert_eq!(writer.calls.len(), data.len().div_ceil(chunk.max(1)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn child_sees_identical_bytes_for_any_chunk_size(
        data in proptest::collection::vec(any::<u8>(), 0..20_000),
        chunk in 1usize..9000,
    ) {
        let config = LaunchConfig::default().with_io_chunk_size(chunk);
        let mut process = Process::create_with(&builders::cat(), config).unwrap();

        let output = process.communicate(&data).unwrap();
        prop_assert_eq!(output.stdout, data);
        prop_assert_eq!(process.wait().exit_code(), Some(0));
    }
}
