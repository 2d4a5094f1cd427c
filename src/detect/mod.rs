// Payload sniffing for fetched chunk bytes.

pub mod compression;
