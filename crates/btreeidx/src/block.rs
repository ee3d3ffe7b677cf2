//! Endian codec and raw block I/O.
//!
//! Every multi-byte integer persisted in the index file is big-endian.
//! The file is addressed in fixed-size blocks; block `b` lives at byte
//! offset `b * BLOCK_SIZE`.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::{BTreeError, Result};
use crate::node::BLOCK_SIZE;

/// Convert a host-order `u64` to its on-disk big-endian byte representation.
pub fn to_disk(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Convert an on-disk big-endian byte representation back to host order.
pub fn from_disk(bytes: [u8; 8]) -> u64 {
    u64::from_be_bytes(bytes)
}

/// Read exactly `BLOCK_SIZE` bytes from `block_id`'s offset.
///
/// Fails with [`BTreeError::Io`] on a failed seek or a short read.
pub fn read_block<F: Read + Seek>(fp: &mut F, block_id: u64) -> Result<[u8; BLOCK_SIZE]> {
    fp.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))?;
    let mut buf = [0u8; BLOCK_SIZE];
    fp.read_exact(&mut buf)
        .map_err(|e| io_to_short_transfer(e, "read"))?;
    Ok(buf)
}

/// Write exactly `BLOCK_SIZE` bytes at `block_id`'s offset and flush.
///
/// Fails with [`BTreeError::Io`] on a failed seek or a short write.
pub fn write_block<F: Write + Seek>(fp: &mut F, block_id: u64, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
    fp.seek(SeekFrom::Start(block_id * BLOCK_SIZE as u64))?;
    fp.write_all(buf).map_err(|e| io_to_short_transfer(e, "write"))?;
    fp.flush()?;
    Ok(())
}

fn io_to_short_transfer(e: io::Error, op: &str) -> BTreeError {
    BTreeError::Io(format!("short {op}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn endian_round_trip() {
        let v = 0x0102_0304_0506_0708u64;
        assert_eq!(from_disk(to_disk(v)), v);
        assert_eq!(to_disk(v), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn write_then_read_block() {
        let mut buf = vec![0u8; BLOCK_SIZE * 3];
        let mut cursor = Cursor::new(&mut buf);

        let mut block = [0u8; BLOCK_SIZE];
        block[0] = 0xAB;
        block[BLOCK_SIZE - 1] = 0xCD;
        write_block(&mut cursor, 1, &block).unwrap();

        let read_back = read_block(&mut cursor, 1).unwrap();
        assert_eq!(read_back, block);
    }

    #[test]
    fn read_past_end_of_file_fails() {
        let mut buf = vec![0u8; BLOCK_SIZE];
        let mut cursor = Cursor::new(&mut buf);
        assert!(read_block(&mut cursor, 5).is_err());
    }
}
