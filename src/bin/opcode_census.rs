use std::{fs, io, path::PathBuf};

use clap::Parser;
use thiserror::Error;

use evflow::bytecode::{opcodes, Region};
use evflow::chartable::{CharTable, TableError};
use evflow::decoder::{self, DecodeError};

#[derive(Debug, Error)]
enum MyError {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("Table Error: {0}")]
    TableError(#[from] TableError),

    #[error("Decode Error: {0}")]
    DecodeFailed(#[from] DecodeError),
}

#[derive(Parser)]
struct Args {
    /// Input event file
    input: PathBuf,

    /// Use the Japanese header layout.
    #[arg(long)]
    jp: bool,

    /// Character table resource.
    #[arg(long, default_value = "table/p1p.tbl")]
    table: PathBuf,
}

/// Walks the decode pass over one event file and prints how often each
/// opcode occurs, most frequent first. Handy for spotting which of the
/// unreverse-engineered opcodes are worth attention.
fn main() -> Result<(), MyError> {
    env_logger::init();

    let args = Args::parse();
    let region = if args.jp { Region::Jp } else { Region::Us };
    let table = CharTable::load(&args.table)?;

    let data = fs::read(args.input)?;
    let decoded = decoder::decode(&data, region, &table)?;

    let mut counts: Vec<(u8, usize)> = decoded.opcode_counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (op, count) in counts {
        let name = match opcodes::mnemonic(op) {
            Some(name) => name.to_string(),
            None if opcodes::is_labelled_unknown(op) => opcodes::labelled_unknown_name(op),
            None => "unknown".to_string(),
        };
        println!("{count:6}  0x{op:02x}  {name}");
    }

    Ok(())
}
