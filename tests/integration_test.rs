//! Integration tests for song compilation
//!
//! These tests compile tracker modules and verify the output using the
//! bytecode reader and listing models

use mzs::bytecode::{DriverCommand, SongHeader, SongListing};
use mzs::compiler::symbol::Symbol;
use mzs::compiler::{CompiledSong, CHANNEL_ORDER};
use mzs::tracker::{
    effect, Effect, Module, Pattern, PatternMatrix, Row, TimeInfo, SYSTEM_TOTAL_CHANNELS,
};
use mzs::{CompileOptions, Error, Song, SoundData};
use tempfile::tempdir;

const FM1: usize = 0;
const SSG1: usize = 4;

/// Module with a single used tracker channel
fn single_channel_module(channel: usize, column: Vec<u8>, patterns: Vec<Pattern>) -> Module {
    let mut matrix = vec![None; SYSTEM_TOTAL_CHANNELS];
    matrix[channel] = Some(column);
    let mut table = vec![Vec::new(); SYSTEM_TOTAL_CHANNELS];
    table[channel] = patterns;

    Module {
        time_info: TimeInfo {
            hz_value: 60.0,
            tick_time_1: 6,
            tick_time_2: 6,
            time_base: 1,
        },
        pattern_matrix: PatternMatrix { matrix },
        patterns: table,
        ..Module::default()
    }
}

fn pattern_with(rows: Vec<(usize, Row)>, len: usize) -> Pattern {
    let mut pattern = Pattern::empty(len);
    for (i, row) in rows {
        pattern.rows[i] = row;
    }
    pattern
}

/// Compile a module as the only song of the sound data
fn compile_single(module: &Module) -> CompiledSong {
    SoundData::from_modules(std::slice::from_ref(module), CompileOptions::default())
        .expect("Assembly failed")
        .compile_songs()
        .expect("Compilation failed")
        .remove(0)
}

fn decoded_list(listing: &SongListing, symbol: Symbol) -> Vec<DriverCommand> {
    listing
        .lists
        .iter()
        .find(|l| l.symbol == symbol)
        .map(|l| l.commands.clone())
        .unwrap_or_else(|| panic!("No list for {symbol}"))
}

fn count_commands<F>(commands: &[DriverCommand], predicate: F) -> usize
where
    F: Fn(&DriverCommand) -> bool,
{
    commands.iter().filter(|c| predicate(c)).count()
}

// =============================================================================
// Pattern deduplication
// =============================================================================

#[test]
fn test_repeated_pattern_compiles_once() {
    let module = single_channel_module(
        FM1,
        vec![0, 0, 1],
        vec![pattern_with(vec![(0, Row::note(1, 4))], 4), Pattern::empty(4)],
    );

    let song = Song::from_module(&module, 0).unwrap();
    let channel = song.tracker_channel(FM1).unwrap();
    assert_eq!(channel.sub_patterns.len(), 2);
    assert_eq!(channel.events.len(), 4);

    let compiled = compile_single(&module);
    let listing = SongListing::new(&compiled).unwrap();
    let driver_channel = CHANNEL_ORDER[FM1];

    let sub_0 = compiled
        .symbols
        .address(Symbol::SubPattern {
            channel: driver_channel,
            index: 0,
        })
        .unwrap() as u16;
    let sub_1 = compiled
        .symbols
        .address(Symbol::SubPattern {
            channel: driver_channel,
            index: 1,
        })
        .unwrap() as u16;
    assert_ne!(sub_0, sub_1);

    let main = decoded_list(
        &listing,
        Symbol::EventList {
            channel: driver_channel,
        },
    );
    assert_eq!(
        main,
        vec![
            DriverCommand::JumpToSubPattern { address: sub_0 },
            DriverCommand::JumpToSubPattern { address: sub_0 },
            DriverCommand::JumpToSubPattern { address: sub_1 },
            DriverCommand::EndOfEventList,
        ]
    );

    // Exactly two sub-pattern blocks exist for the channel
    let sub_patterns = listing
        .lists
        .iter()
        .filter(|l| matches!(l.symbol, Symbol::SubPattern { .. }))
        .count();
    assert_eq!(sub_patterns, 2);

    // Both jumps to pattern 0 reference the same block
    let references = &compiled
        .symbols
        .get(Symbol::SubPattern {
            channel: driver_channel,
            index: 0,
        })
        .unwrap()
        .references;
    assert_eq!(references.len(), 2);
    let bytes_at = |address: usize| {
        let offset = address - compiled.base;
        [compiled.data[offset], compiled.data[offset + 1]]
    };
    assert_eq!(bytes_at(references[0]), bytes_at(references[1]));
    assert_eq!(bytes_at(references[0]), sub_0.to_le_bytes());
}

#[test]
fn test_header_points_at_channel_lists() {
    let module = single_channel_module(FM1, vec![0], vec![Pattern::empty(2)]);
    let compiled = compile_single(&module);

    let header =
        SongHeader::parse(&compiled.data, compiled.header_address - compiled.base).unwrap();
    for (channel, address) in header.channels.iter().enumerate() {
        if channel == CHANNEL_ORDER[FM1] {
            let expected = compiled.symbols.address(Symbol::EventList { channel }).unwrap();
            assert_eq!(*address, Some(expected as u16));
        } else {
            assert_eq!(*address, None);
        }
    }
    assert_eq!(header.timer_a_counter, 98);
    assert_eq!(header.time_base, 1);
    assert_eq!(
        header.instruments as usize,
        compiled.symbols.address(Symbol::Instruments).unwrap()
    );
    assert_eq!(
        compiled.symbols.address(Symbol::Header).unwrap(),
        compiled.header_address
    );
}

// =============================================================================
// Pattern conversion
// =============================================================================

#[test]
fn test_repeated_volume_emits_one_command() {
    let row = Row {
        volume: Some(0x40),
        ..Row::default()
    };
    let module = single_channel_module(
        FM1,
        vec![0],
        vec![pattern_with(
            vec![(0, row.clone()), (1, row.clone()), (2, row.clone()), (3, row)],
            4,
        )],
    );
    let listing = SongListing::new(&compile_single(&module)).unwrap();
    let commands = decoded_list(
        &listing,
        Symbol::SubPattern {
            channel: CHANNEL_ORDER[FM1],
            index: 0,
        },
    );

    assert_eq!(
        count_commands(&commands, |c| matches!(
            c,
            DriverCommand::SetChannelVolume { .. }
        )),
        1
    );
    assert!(commands.contains(&DriverCommand::SetChannelVolume { volume: 0x80 }));
}

#[test]
fn test_ssg_note_below_range_is_clamped() {
    let module = single_channel_module(
        SSG1,
        vec![0],
        vec![pattern_with(vec![(0, Row::note(3, 0))], 1)],
    );

    let song = Song::from_module(&module, 0).unwrap();
    assert!(song.notes_below_range);

    let listing = SongListing::new(&song.compile(0).unwrap()).unwrap();
    let commands = decoded_list(
        &listing,
        Symbol::SubPattern {
            channel: CHANNEL_ORDER[SSG1],
            index: 0,
        },
    );
    assert!(commands
        .iter()
        .any(|c| matches!(c, DriverCommand::Note { note: 0, .. })));
}

#[test]
fn test_position_jump_targets_matrix_row() {
    let jump = Row {
        effects: vec![Effect::new(effect::POSITION_JUMP, 1)],
        ..Row::default()
    };
    let module = single_channel_module(
        FM1,
        vec![0, 1],
        vec![
            pattern_with(vec![(0, Row::note(1, 4))], 2),
            pattern_with(vec![(1, jump)], 4),
        ],
    );
    let compiled = compile_single(&module);
    let listing = SongListing::new(&compiled).unwrap();
    let driver_channel = CHANNEL_ORDER[FM1];

    let row_1 = compiled
        .symbols
        .address(Symbol::MatrixRow {
            channel: driver_channel,
            row: 1,
        })
        .unwrap() as u16;
    let commands = decoded_list(
        &listing,
        Symbol::SubPattern {
            channel: driver_channel,
            index: 1,
        },
    );
    assert_eq!(
        commands.last(),
        Some(&DriverCommand::PositionJump { address: row_1 })
    );
    assert!(!commands.contains(&DriverCommand::ReturnFromSubPattern));
}

#[test]
fn test_unmapped_effect_fails() {
    let row = Row {
        effects: vec![Effect::new(0x0F, 3)],
        ..Row::default()
    };
    let module = single_channel_module(FM1, vec![0], vec![pattern_with(vec![(0, row)], 1)]);
    assert!(matches!(
        Song::from_module(&module, 0),
        Err(Error::UnmappedEffect { code: 0x0F, .. })
    ));
}

// =============================================================================
// Size budget
// =============================================================================

#[test]
fn test_size_budget_boundary() {
    let module = single_channel_module(
        FM1,
        vec![0, 1, 2],
        vec![
            pattern_with(vec![(0, Row::note(1, 4))], 8),
            pattern_with(vec![(2, Row::note(5, 3))], 8),
            Pattern::empty(8),
        ],
    );
    let size = SoundData::from_modules(std::slice::from_ref(&module), CompileOptions::default())
        .unwrap()
        .compile()
        .unwrap()
        .len();

    let at_limit = CompileOptions {
        max_sound_data_size: size,
        ..CompileOptions::default()
    };
    let data = SoundData::from_modules(std::slice::from_ref(&module), at_limit)
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(data.len(), size);

    let over_limit = CompileOptions {
        max_sound_data_size: size - 1,
        ..CompileOptions::default()
    };
    assert!(matches!(
        SoundData::from_modules(std::slice::from_ref(&module), over_limit)
            .unwrap()
            .compile(),
        Err(Error::SoundDataOverflow { .. })
    ));
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_write_sound_data_and_vrom() {
    let json = r#"{
        "time_info": { "hz_value": 30.0, "tick_time_1": 6, "tick_time_2": 6, "time_base": 1 },
        "pattern_matrix": { "matrix": [null, null, null, null, null, null, null, [0]] },
        "patterns": [[], [], [], [], [], [], [], [{ "rows": [{ "note": 1, "octave": 0 }] }]],
        "instruments": [{ "kind": "fm", "algorithm": 7 }],
        "samples": [{ "name": "kick", "data": [1, 2, 3] }]
    }"#;

    let dir = tempdir().unwrap();
    let module_path = dir.path().join("song.json");
    std::fs::write(&module_path, json).unwrap();
    let module = Module::load(&module_path).unwrap();

    let sound_data = SoundData::from_modules(&[module], CompileOptions::default()).unwrap();
    assert_eq!(sound_data.songs[0].timer.time_base, 2);

    let output = dir.path().join("sdata.bin");
    let vrom = dir.path().join("vrom.bin");
    sound_data.write(&output, Some(&vrom)).unwrap();

    let data = std::fs::read(&output).unwrap();
    assert_eq!(data, sound_data.compile().unwrap());
    assert_eq!(data[0], 1);

    let vrom_data = std::fs::read(&vrom).unwrap();
    assert_eq!(vrom_data.len(), 256);
    assert_eq!(&vrom_data[..3], &[1, 2, 3]);
}

#[test]
fn test_missing_module_file() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        Module::load(&dir.path().join("missing.json")),
        Err(Error::Io(_))
    ));
}
