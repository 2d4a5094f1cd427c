#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    PlainJson,
    Unknown,
}

/// Detect the payload encoding from its first bytes.
pub fn detect_compression(header: &[u8]) -> Compression {
    // gzip: ID1 ID2 = 1f 8b
    if header.len() >= 2 && header[0..2] == [0x1F, 0x8B] {
        return Compression::Gzip;
    }

    // zstd frame magic, little-endian 0xFD2FB528
    if header.len() >= 4 && header[0..4] == [0x28, 0xB5, 0x2F, 0xFD] {
        return Compression::Zstd;
    }

    // Uncompressed chunk: a JSON array, possibly after a BOM or whitespace.
    let body = header.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(header);
    match body.iter().copied().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Compression::PlainJson,
        _ => Compression::Unknown,
    }
}
