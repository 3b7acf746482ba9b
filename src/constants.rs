/// Constants used by the archive container format and its well-known fields.
pub mod archive {
    /// Leading bytes identifying a swath archive file.
    pub const MAGIC: &[u8; 4] = b"SWZA";
    /// Version tag written after the magic bytes.
    pub const FORMAT_VERSION: u8 = 1;
    /// Length of the uncompressed header (magic + version).
    pub const HEADER_LEN: usize = MAGIC.len() + 1;
    /// Default file extension (without the leading dot) for swath archives.
    pub const DEFAULT_EXTENSION: &str = "swz";
    /// Default zstd compression level applied when writing archives.
    pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
    /// Lowest accepted zstd compression level.
    pub const MIN_COMPRESSION_LEVEL: i32 = 1;
    /// Highest accepted zstd compression level.
    pub const MAX_COMPRESSION_LEVEL: i32 = 22;

    /// Field holding the ordered record sequence (required on read).
    pub const RECORDS_FIELD: &str = "swath_array";
    /// Field holding the free-form label (optional on read).
    pub const LABEL_FIELD: &str = "period";
    /// Field holding the provenance record on chunk outputs.
    pub const CHUNK_INFO_FIELD: &str = "chunk_info";
}

/// Constants used by chunk planning and output naming.
pub mod chunking {
    /// Records per output chunk when nothing else is configured.
    pub const DEFAULT_CHUNK_SIZE: usize = 500;
    /// Label copied to outputs when the source archive carries none.
    pub const DEFAULT_LABEL: &str = "Unknown period";
    /// Separator between the source stem and the part counter in output names.
    pub const PART_MARKER: &str = "_part_";
    /// Separator between part number and total parts in output names.
    pub const PART_OF: &str = "of";
}

/// Constants used by splitter configuration resolution.
pub mod config {
    /// Source directory used when no flag or environment override is present.
    pub const DEFAULT_SOURCE_DIR: &str = "/data/users/vdidur/data";
    /// Destination directory used when no flag or environment override is present.
    pub const DEFAULT_DEST_DIR: &str = "/data/users/vdidur/data/new_data_all";
    /// Environment variable overriding the source directory.
    pub const ENV_SOURCE_DIR: &str = "SWATH_SPLIT_SOURCE_DIR";
    /// Environment variable overriding the destination directory.
    pub const ENV_DEST_DIR: &str = "SWATH_SPLIT_DEST_DIR";
    /// Environment variable overriding the chunk size.
    pub const ENV_CHUNK_SIZE: &str = "SWATH_SPLIT_CHUNK_SIZE";
}

/// Constants used by run reporting.
pub mod report {
    /// Bytes per reported megabyte.
    pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
    /// Example of a source file name shown when no archives are found.
    pub const SOURCE_NAME_HINT: &str = "AMSR2_temp_only_20200101_000000_to_20210101_000000.swz";
}
