/*
    commit_log.rs - Durable append-only log

    Persists stamped operations so a replica can rehydrate after restart.
    Frame layout: [seq:8][timestamp:8][len:4][payload:len][crc32:4], all
    little-endian. A failed checksum surfaces as CorruptedData; frames are
    never rewritten in place.
*/

use super::errors::{StoreError, StoreResult};
use crate::core_store::model::Timestamp;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// One durable frame of the log
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in the log
    pub seq: u64,

    /// Wall time the frame was written
    pub timestamp: u64,

    /// Serialized payload
    pub data: Vec<u8>,

    /// CRC32 over the payload
    pub checksum: u32,
}

impl Frame {
    fn new(seq: u64, data: Vec<u8>) -> Self {
        let checksum = crc32fast::hash(&data);
        Frame { seq, timestamp: Timestamp::now().as_millis(), data, checksum }
    }

    /// Recompute the checksum and compare
    pub fn verify(&self) -> bool {
        crc32fast::hash(&self.data) == self.checksum
    }
}

/// Durable append-only commit log
#[derive(Debug)]
pub struct CommitLog {
    path: PathBuf,
    writer: BufWriter<File>,
    next_seq: u64,
    bytes: usize,
}

impl CommitLog {
    /// Create or open a commit log, recovering position from disk
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let existing = if path.exists() { Self::scan(&path)? } else { Vec::new() };
        let next_seq = existing.last().map(|f| f.seq + 1).unwrap_or(0);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let bytes = file.metadata()?.len() as usize;

        Ok(CommitLog { path, writer: BufWriter::new(file), next_seq, bytes })
    }

    /// Append a payload as the next frame, flushing to disk
    pub fn append(&mut self, data: &[u8]) -> StoreResult<u64> {
        let frame = Frame::new(self.next_seq, data.to_vec());

        self.writer.write_all(&frame.seq.to_le_bytes())?;
        self.writer.write_all(&frame.timestamp.to_le_bytes())?;
        self.writer.write_all(&(frame.data.len() as u32).to_le_bytes())?;
        self.writer.write_all(&frame.data)?;
        self.writer.write_all(&frame.checksum.to_le_bytes())?;
        self.writer.flush()?;

        self.bytes += 8 + 8 + 4 + frame.data.len() + 4;
        self.next_seq += 1;

        Ok(frame.seq)
    }

    /// Read every frame back, verifying checksums
    pub fn read_all(&self) -> StoreResult<Vec<Frame>> {
        Self::scan(&self.path)
    }

    fn scan(path: &Path) -> StoreResult<Vec<Frame>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut frames = Vec::new();

        loop {
            let mut seq_buf = [0u8; 8];
            if reader.read_exact(&mut seq_buf).is_err() {
                break; // EOF
            }
            let seq = u64::from_le_bytes(seq_buf);

            let mut ts_buf = [0u8; 8];
            reader.read_exact(&mut ts_buf)?;
            let timestamp = u64::from_le_bytes(ts_buf);

            let mut len_buf = [0u8; 4];
            reader.read_exact(&mut len_buf)?;
            let len = u32::from_le_bytes(len_buf) as usize;

            let mut data = vec![0u8; len];
            reader.read_exact(&mut data)?;

            let mut checksum_buf = [0u8; 4];
            reader.read_exact(&mut checksum_buf)?;
            let checksum = u32::from_le_bytes(checksum_buf);

            let frame = Frame { seq, timestamp, data, checksum };
            if !frame.verify() {
                return Err(StoreError::CorruptedData(format!(
                    "checksum mismatch at frame {}",
                    seq
                )));
            }

            frames.push(frame);
        }

        Ok(frames)
    }

    /// Bytes written so far
    pub fn len_bytes(&self) -> usize {
        self.bytes
    }

    /// Sequence number the next frame will get
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}
