//! Sound data: every song of a program plus the index the driver reads

use super::layout::CompiledSong;
use super::sample::vrom_image;
use super::{CompileOptions, Song};
use crate::error::{Error, Result};
use crate::tracker::Module;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Songs are counted by a single byte
pub const MAX_SONGS: usize = 255;

/// All songs of a program
#[derive(Debug, Clone, Default)]
pub struct SoundData {
    pub songs: Vec<Song>,
    pub options: CompileOptions,
}

impl SoundData {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            songs: Vec::new(),
            options,
        }
    }

    /// Assemble one song per module; samples of each song follow the previous song's
    pub fn from_modules(modules: &[Module], options: CompileOptions) -> Result<Self> {
        if modules.len() > MAX_SONGS {
            return Err(Error::TooManySongs(modules.len()));
        }

        let mut sound_data = Self::new(options);
        let mut vrom_offset = options.vrom_offset;

        for module in modules {
            let song = Song::from_module(module, vrom_offset)?;
            vrom_offset = song.vrom_end(vrom_offset);
            sound_data.songs.push(song);
        }

        Ok(sound_data)
    }

    /// Size of the song index (count byte + 2-byte offset per song)
    pub fn index_size(&self) -> usize {
        self.songs.len() * 2 + 1
    }

    /// Compile every song at its final address
    pub fn compile_songs(&self) -> Result<Vec<CompiledSong>> {
        if self.songs.len() > MAX_SONGS {
            return Err(Error::TooManySongs(self.songs.len()));
        }

        let mut compiled = Vec::with_capacity(self.songs.len());
        let mut head = self.index_size();

        for song in &self.songs {
            let song = song.compile_with_limit(head, self.options.max_sound_data_size)?;
            head = song.end();
            compiled.push(song);
        }

        Ok(compiled)
    }

    /// Compile the sound data image
    pub fn compile(&self) -> Result<Vec<u8>> {
        let songs = self.compile_songs()?;

        let mut data = vec![0; self.index_size()];
        data[0] = songs.len() as u8;

        for (i, song) in songs.iter().enumerate() {
            data[1 + i * 2] = (song.header_address & 0xFF) as u8;
            data[1 + i * 2 + 1] = (song.header_address >> 8) as u8;
            data.extend(&song.data);
        }

        info!("Sound data compiled: {} songs, {} bytes", songs.len(), data.len());
        Ok(data)
    }

    /// V-ROM image holding every song's samples
    pub fn vrom(&self) -> Vec<u8> {
        vrom_image(
            self.songs.iter().flat_map(|song| &song.samples),
            self.options.vrom_offset,
        )
    }

    /// Compile and write the sound data, and optionally the V-ROM image
    pub fn write(&self, path: &Path, vrom_path: Option<&Path>) -> Result<()> {
        let data = self.compile()?;
        File::create(path)?.write_all(&data)?;

        if let Some(vrom_path) = vrom_path {
            File::create(vrom_path)?.write_all(&self.vrom())?;
        }
        Ok(())
    }
}
