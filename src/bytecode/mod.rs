pub mod commands;
pub mod header;
pub mod json;
pub mod reader;
pub mod wait;

pub use commands::DriverCommand;
pub use header::SongHeader;
pub use json::SongListing;
pub use reader::BytecodeReader;
pub use wait::encode_wait;
