/// Local filesystem scanning for source and part archives.
pub mod fs;
