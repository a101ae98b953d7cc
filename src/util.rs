use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Writes `lines`, each newline-terminated, to `path` or to stdout.
pub fn write_lines(path: Option<&Path>, lines: &[String]) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                ensure_directory(parent)?;
            }
            let file = File::create(path)
                .with_context(|| format!("failed to create output file: {}", path.display()))?;
            write_lines_to(file, lines)
                .with_context(|| format!("failed to write output file: {}", path.display()))
        }
        None => {
            let stdout = std::io::stdout();
            write_lines_to(stdout.lock(), lines).context("failed to write to stdout")
        }
    }
}

fn write_lines_to<W: Write>(writer: W, lines: &[String]) -> std::io::Result<()> {
    let mut writer = std::io::BufWriter::new(writer);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_file_hashes_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.md");
        fs::write(&path, "abc").expect("write file");
        assert_eq!(
            sha256_file(&path).expect("hash"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_lines_terminates_every_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("book.tex");
        let lines = vec!["one".to_string(), String::new(), "two".to_string()];
        write_lines(Some(&path), &lines).expect("write lines");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "one\n\ntwo\n");
    }
}
