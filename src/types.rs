/// Name of a field inside an archive.
/// Examples: `swath_array`, `period`, `chunk_info`
pub type FieldName = String;
/// Bare file name (no directory) of a source or output archive.
/// Examples: `AMSR2_temp_only_20200101_000000_to_20210101_000000.swz`, `orbit_part_2of3.swz`
pub type FileName = String;
/// File stem (file name without extension) used to derive output names.
/// Example: `AMSR2_temp_only_20200101_000000_to_20210101_000000`
pub type FileStem = String;
/// Free-form label copied from a source archive to each chunk.
/// Examples: `2020-01-01 to 2021-01-01`, `Unknown period`
pub type Label = String;
