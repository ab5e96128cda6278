//! Tracker instruments and samples

use serde::{Deserialize, Serialize};

/// FM operator parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmOperator {
    pub am: u8,
    pub ar: u8,
    pub dr: u8,
    pub sr: u8,
    pub rr: u8,
    pub sl: u8,
    pub tl: u8,
    pub ks: u8,
    pub mul: u8,
    pub dt: u8,
    pub ssg_eg: u8,
}

/// FM instrument
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmInstrument {
    pub algorithm: u8,
    pub feedback: u8,
    pub ams: u8,
    pub fms: u8,
    pub operators: [FmOperator; 4],
}

/// Macro envelope (a table of values stepped once per tick)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroDef {
    pub values: Vec<u8>,
    pub loop_point: Option<u8>,
}

/// SSG instrument
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsgInstrument {
    pub tone: bool,
    pub noise: bool,
    pub volume_macro: Option<MacroDef>,
    pub arpeggio_macro: Option<MacroDef>,
    pub mixing_macro: Option<MacroDef>,
}

/// Instrument definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instrument {
    Fm(FmInstrument),
    Ssg(SsgInstrument),
}

/// ADPCM-A sample (already encoded)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    pub name: String,
    pub data: Vec<u8>,
}
