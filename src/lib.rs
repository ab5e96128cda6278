pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod tracker;

pub use compiler::sound_data::SoundData;
pub use compiler::{CompileOptions, Song};
pub use error::Error;
