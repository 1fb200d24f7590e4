//! Binary database format for solved outcomes.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "LGR1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (entry_count × 3 bytes), one entry per position in order:
//!   - Value: u8 (0 = undecided, 1 = win, 2 = lose, 3 = tie)
//!   - Remoteness: u16 LE

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use xxhash_rust::xxh64::xxh64;

use crate::solver::{Database, Outcome, Value};

const MAGIC: &[u8; 4] = b"LGR1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 3;

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

pub struct Checkpoint;

impl Checkpoint {
    /// Save a solved database. Returns the number of entries written.
    pub fn save(path: &Path, database: &Database) -> io::Result<usize> {
        let count = database.len();

        // Build data section
        let mut data = Vec::with_capacity(count * ENTRY_SIZE);
        for outcome in database.outcomes() {
            data.push(outcome.value as u8);
            data.extend_from_slice(&outcome.remoteness.to_le_bytes());
        }

        let checksum = xxh64(&data, 0);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(count as u64).to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&[0u8; 8])?; // Reserved

        writer.write_all(&data)?;
        writer.flush()?;

        Ok(count)
    }

    /// Load a database, verifying header and checksum.
    pub fn load(path: &Path) -> io::Result<Database> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid database magic"));
        }

        let version = le_u32(&header[4..8]);
        if version != VERSION {
            return Err(invalid(format!("Unsupported database version: {version}")));
        }

        let count = le_u64(&header[8..16]);
        let stored_checksum = le_u64(&header[16..24]);

        // The header's count must fit in the file before anything is allocated
        let data_len = count
            .checked_mul(ENTRY_SIZE as u64)
            .filter(|&len| len <= file_len.saturating_sub(HEADER_SIZE as u64))
            .ok_or_else(|| {
                invalid(format!(
                    "Database entry count {count} does not fit in {file_len} bytes"
                ))
            })?;
        let count = count as usize;

        let mut data = vec![0u8; data_len as usize];
        reader.read_exact(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid("Database checksum mismatch"));
        }

        let mut outcomes = Vec::with_capacity(count);
        for entry in data.chunks_exact(ENTRY_SIZE) {
            let value = Value::from_byte(entry[0])
                .ok_or_else(|| invalid(format!("Invalid value byte: {}", entry[0])))?;
            let remoteness = u16::from_le_bytes([entry[1], entry[2]]);
            outcomes.push(Outcome::new(value, remoteness));
        }

        Ok(Database::from_outcomes(outcomes))
    }

    /// File size for a given number of entries.
    pub fn estimate_size(count: usize) -> usize {
        HEADER_SIZE + count * ENTRY_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Database {
        Database::from_outcomes(vec![
            Outcome::new(Value::Lose, 0),
            Outcome::new(Value::Win, 1),
            Outcome::new(Value::Tie, 0),
            Outcome::new(Value::Lose, 300),
        ])
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let path = std::env::temp_dir().join("legrec_test_roundtrip.bin");

        let saved = Checkpoint::save(&path, &sample()).unwrap();
        assert_eq!(saved, 4);
        assert_eq!(
            std::fs::metadata(&path).unwrap().len() as usize,
            Checkpoint::estimate_size(4)
        );

        let loaded = Checkpoint::load(&path).unwrap();
        assert_eq!(loaded, sample());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checksum_mismatch() {
        let path = std::env::temp_dir().join("legrec_test_corrupt.bin");
        Checkpoint::save(&path, &sample()).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("checksum"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_magic() {
        let path = std::env::temp_dir().join("legrec_test_magic.bin");
        std::fs::write(&path, [0u8; HEADER_SIZE]).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("magic"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_entry_count() {
        let path = std::env::temp_dir().join("legrec_test_entry_count.bin");

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(MAGIC);
        header[4..8].copy_from_slice(&VERSION.to_le_bytes());
        header[8..16].copy_from_slice(&(u64::MAX / 2).to_le_bytes());
        std::fs::write(&path, header).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("entry count"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_truncated_file() {
        let path = std::env::temp_dir().join("legrec_test_truncated.bin");
        Checkpoint::save(&path, &sample()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        // Four entries no longer fit in the shortened file
        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("entry count"));

        std::fs::remove_file(&path).ok();
    }
}
