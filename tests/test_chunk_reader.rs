// tests/test_chunk_reader.rs
//
// Integration tests for ChunkReader: range clamping, chunk-relative
// seek/tell, and independence of concurrent readers over one file.

use anyhow::Result;
use s3xfer::ChunkReader;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::thread;
use tempfile::TempDir;

const FIXTURE: &[u8] = b"onetwothreefourfivesixseveneightnineten";

fn fixture_file(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("fixture.bin");
    fs::write(&path, FIXTURE)?;
    Ok(path)
}

#[test]
fn read_entire_chunk_then_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 0, 3)?;
    assert_eq!(chunk.read(None)?.as_ref(), b"one");
    assert_eq!(chunk.read(None)?.as_ref(), b"");
    Ok(())
}

#[test]
fn read_with_amount() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 11, 4)?;
    assert_eq!(chunk.read(Some(1))?.as_ref(), b"f");
    assert_eq!(chunk.read(Some(1))?.as_ref(), b"o");
    assert_eq!(chunk.read(Some(1))?.as_ref(), b"u");
    assert_eq!(chunk.read(Some(1))?.as_ref(), b"r");
    assert_eq!(chunk.read(Some(1))?.as_ref(), b"");
    Ok(())
}

#[test]
fn seek_zero_replays_the_chunk() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    // Retry path: a failed part upload rewinds its chunk and re-reads.
    let mut chunk = ChunkReader::open(&path, 11, 4)?;
    assert_eq!(chunk.read(None)?.as_ref(), b"four");
    chunk.seek(0)?;
    assert_eq!(chunk.read(None)?.as_ref(), b"four");
    Ok(())
}

#[test]
fn oversized_chunk_clamps_to_real_file_end() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 36, 100_000)?;
    assert_eq!(chunk.len(), 3, "len() must report the readable span");
    assert_eq!(chunk.read(None)?.as_ref(), b"ten");
    assert_eq!(chunk.read(None)?.as_ref(), b"");
    Ok(())
}

#[test]
fn tell_tracks_chunk_relative_position() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 36, 100_000)?;
    assert_eq!(chunk.tell(), 0);
    assert_eq!(chunk.read(None)?.as_ref(), b"ten");
    assert_eq!(chunk.tell(), 3);
    chunk.seek(0)?;
    assert_eq!(chunk.tell(), 0);
    Ok(())
}

#[test]
fn partial_read_advances_tell_by_bytes_consumed() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 0, 11)?;
    chunk.read(Some(6))?;
    assert_eq!(chunk.tell(), 6);
    Ok(())
}

#[test]
fn std_io_read_and_seek_interop() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    let mut chunk = ChunkReader::open(&path, 3, 8)?;
    let mut buf = Vec::new();
    chunk.read_to_end(&mut buf)?;
    assert_eq!(buf, b"twothree");

    let pos = Seek::seek(&mut chunk, SeekFrom::End(-5))?;
    assert_eq!(pos, 3);
    let mut tail = String::new();
    chunk.read_to_string(&mut tail)?;
    assert_eq!(tail, "three");
    Ok(())
}

#[test]
fn missing_file_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.bin");
    assert!(ChunkReader::open(&missing, 0, 10).is_err());
}

#[test]
fn concurrent_readers_do_not_interfere() -> Result<()> {
    let dir = TempDir::new()?;
    let path = fixture_file(&dir)?;

    // One reader per part, disjoint ranges, all over the same file. Each
    // reads, rewinds, and re-reads while the others are doing the same.
    let parts: &[(u64, u64, &[u8])] = &[
        (0, 3, b"one"),
        (3, 3, b"two"),
        (6, 5, b"three"),
        (11, 4, b"four"),
        (15, 4, b"five"),
    ];

    thread::scope(|scope| {
        for &(start, size, want) in parts {
            let path = &path;
            scope.spawn(move || {
                let mut chunk = ChunkReader::open(path, start, size).expect("open chunk");
                for _ in 0..50 {
                    let got = chunk.read(None).expect("read chunk");
                    assert_eq!(got.as_ref(), want);
                    chunk.seek(0).expect("rewind chunk");
                }
            });
        }
    });
    Ok(())
}
