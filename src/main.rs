use clap::Parser;
use mzs::compiler::SOUND_DATA_MAX_SIZE;
use mzs::tracker::Module;
use mzs::{CompileOptions, SoundData};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mzs")]
#[command(version = "0.1.0")]
#[command(about = "Tracker module to MLM sound data compiler", long_about = None)]
struct Args {
    /// Input modules (JSON), one song each
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output sound data file
    #[arg(short, long)]
    output: PathBuf,

    /// Output ADPCM-A sample ROM
    #[arg(long)]
    vrom: Option<PathBuf>,

    /// First V-ROM address available to samples, in 256-byte units
    #[arg(long, default_value_t = 0)]
    vrom_offset: usize,

    /// Maximum size of the sound data
    #[arg(long, default_value_t = SOUND_DATA_MAX_SIZE)]
    max_size: usize,

    /// Print layout details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), mzs::Error> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let modules = args
        .inputs
        .iter()
        .map(|path| Module::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let options = CompileOptions {
        max_sound_data_size: args.max_size,
        vrom_offset: args.vrom_offset,
    };
    let sound_data = SoundData::from_modules(&modules, options)?;
    sound_data.write(&args.output, args.vrom.as_deref())?;

    Ok(())
}
