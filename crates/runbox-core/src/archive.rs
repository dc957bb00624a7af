//! Payload packaging: one source snippet as a single-file tar archive.
//!
//! The runtime's filesystem-injection endpoint takes a tar stream, so each
//! submission is wrapped in a minimal uncompressed archive holding exactly
//! one file. Packaging never truncates; output capture is where size
//! limits apply.

use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

/// Build an uncompressed tar archive containing exactly one file with the
/// given name and content, mode 0644, mtime stamped at creation.
///
/// Deterministic for identical inputs except for the embedded timestamp.
///
/// # Errors
/// Returns an error if the archive cannot be assembled.
pub fn package(filename: &str, source: &[u8]) -> io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::with_capacity(source.len() + 1024));

    let mut header = tar::Header::new_gnu();
    header.set_size(source.len() as u64);
    header.set_mode(0o644);
    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    header.set_mtime(mtime);

    builder.append_data(&mut header, filename, source)?;
    builder.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(bytes: &[u8]) -> Vec<(String, u64, Vec<u8>)> {
        use std::io::Read;

        let mut archive = tar::Archive::new(bytes);
        archive
            .entries()
            .expect("archive entries")
            .map(|entry| {
                let mut entry = entry.expect("entry");
                let name = entry.path().expect("path").to_string_lossy().into_owned();
                let size = entry.size();
                let mut content = Vec::new();
                entry.read_to_end(&mut content).expect("read entry");
                (name, size, content)
            })
            .collect()
    }

    #[test]
    fn test_single_entry_with_exact_content() {
        let bytes = package("exec_abc.py", b"print('hi')\n").expect("package");

        let entries = entries(&bytes);
        assert_eq!(entries.len(), 1);

        let (name, size, content) = &entries[0];
        assert_eq!(name, "exec_abc.py");
        assert_eq!(*size, 12);
        assert_eq!(content, b"print('hi')\n");
    }

    #[test]
    fn test_empty_payload() {
        let bytes = package("exec_empty.rb", b"").expect("package");

        let entries = entries(&bytes);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, 0);
        assert!(entries[0].2.is_empty());
    }

    #[test]
    fn test_large_payload_not_truncated() {
        // Payloads up to the caller-enforced 100 KiB must survive intact.
        let source = vec![b'x'; 100 * 1024];
        let bytes = package("exec_big.py", &source).expect("package");

        let entries = entries(&bytes);
        assert_eq!(entries[0].1, 100 * 1024);
        assert_eq!(entries[0].2, source);
    }
}
