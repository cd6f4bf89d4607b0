//! SHA-256 verification of downloaded artifacts.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 8192;

/// Stream a file through SHA-256 and return the lowercase hex digest.
pub async fn file_sha256(file_path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(file_path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether the file's digest equals `expected` exactly.
///
/// No normalisation is applied to `expected`: an upper-case digest in the
/// catalog never matches.
pub async fn digest_matches(file_path: &Path, expected: &str) -> std::io::Result<bool> {
    Ok(file_sha256(file_path).await? == expected)
}
