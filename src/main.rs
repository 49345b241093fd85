use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use thiserror::Error;

use evflow::bytecode::{Region, EMPTY_FILE_TEXT};
use evflow::chartable::{CharTable, TableError};
use evflow::decoder::{self, DecodeError};
use evflow::encoder::{self, EncodeError, ListingError};
use evflow::po;

#[derive(Debug, Error)]
enum Error {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("Table Error: {0}")]
    TableError(#[from] TableError),

    #[error("Decode Error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Encode Error: {0}")]
    EncodeError(#[from] EncodeError),

    #[error("Listing Error: {0}")]
    ListingError(#[from] ListingError),

    #[error("cannot derive a sibling file from {0}")]
    NoFileName(PathBuf),

    #[error("the original event file {0} is not beside the listing")]
    MissingOriginal(PathBuf),
}

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Use the Japanese header layout.
    #[arg(long, global = true)]
    jp: bool,

    /// Character table resource.
    #[arg(long, global = true, default_value = "table/p1p.tbl")]
    table: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Decode an event file into an editable listing beside it.
    Decode { input: PathBuf },

    /// Encode a listing back over the event file beside it.
    Encode { input: PathBuf },

    /// Print the dialogue of an event file, rendered for reading.
    Text { input: PathBuf },

    /// Export the strings of a listing as a gettext PO catalog.
    ExportPo { input: PathBuf },

    /// Merge a translated PO catalog back into its listing.
    ImportPo { input: PathBuf },
}

/// Path next to `input` with its extension swapped.
fn sibling(input: &Path, extension: &str) -> Result<PathBuf, Error> {
    if input.file_name().is_none() {
        return Err(Error::NoFileName(input.to_path_buf()));
    }
    Ok(input.with_extension(extension))
}

fn main_error() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();
    let region = if args.jp { Region::Jp } else { Region::Us };
    let table = CharTable::load(&args.table)?;

    match args.command {
        Command::Decode { input } => {
            let data = fs::read(&input)?;
            let decoded = decoder::decode(&data, region, &table)?;
            fs::write(sibling(&input, "dec")?, decoded.listing)?;
        }

        Command::Encode { input } => {
            let listing = fs::read_to_string(&input)?;
            let original_path = sibling(&input, "evs")?;
            if !original_path.exists() {
                return Err(Error::MissingOriginal(original_path));
            }
            let original = fs::read(&original_path)?;
            match encoder::encode(&listing, &original, region, &table)? {
                Some(bytes) => fs::write(&original_path, bytes)?,
                None => println!("{EMPTY_FILE_TEXT}"),
            }
        }

        Command::Text { input } => {
            let data = fs::read(&input)?;
            print!("{}", decoder::dump_text(&data, region, &table)?);
        }

        Command::ExportPo { input } => {
            let listing = fs::read_to_string(&input)?;
            fs::write(sibling(&input, "po")?, po::export(&listing, args.jp)?)?;
        }

        Command::ImportPo { input } => {
            let catalog = fs::read_to_string(&input)?;
            let listing_path = sibling(&input, "dec")?;
            let listing = fs::read_to_string(&listing_path)?;
            fs::write(&listing_path, po::import(&catalog, &listing))?;
        }
    }

    Ok(())
}

fn main() -> Result<(), ()> {
    match main_error() {
        Ok(_) => Ok(()),

        Err(err) => {
            writeln!(io::stderr(), "{0}", err).unwrap();
            Err(())
        }
    }
}
