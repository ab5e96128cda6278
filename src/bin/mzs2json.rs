//! Compiled song listing as JSON

use clap::Parser;
use mzs::bytecode::SongListing;
use mzs::tracker::Module;
use mzs::{CompileOptions, SoundData};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mzs2json")]
#[command(version = "0.1.0")]
#[command(about = "Compile modules and list the resulting songs as JSON", long_about = None)]
struct Args {
    /// Input modules (JSON)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let modules = args
        .inputs
        .iter()
        .map(|path| Module::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    // Compile every song at its final address
    let sound_data = SoundData::from_modules(&modules, CompileOptions::default())?;
    let listings = sound_data
        .compile_songs()?
        .iter()
        .map(SongListing::new)
        .collect::<Result<Vec<_>, _>>()?;

    let json_string = if args.compact {
        serde_json::to_string(&listings)?
    } else {
        serde_json::to_string_pretty(&listings)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
