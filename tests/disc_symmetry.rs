#[cfg(feature = "test_with_discs")]
mod tests {
    use std::path::Path;
    use std::{env, fs, io};

    use evflow::bytecode::Region;
    use evflow::chartable::{CharTable, TableError};
    use evflow::decoder::{self, DecodeError};
    use evflow::encoder::{self, EncodeError};
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestFailure {
        #[error("IO Error")]
        IoError(#[from] io::Error),

        #[error("Environment variable error")]
        EnvVarError(#[from] env::VarError),

        #[error("Glyph table error: {0}")]
        TableError(#[from] TableError),

        #[error("Decode error: {0}")]
        DecodeError(#[from] DecodeError),

        #[error("Encode error: {0}")]
        EncodeError(#[from] EncodeError),

        #[error("Not all event files survived the round trip")]
        RoundTripFailure,
    }

    /// Re-encoded files may end in a different amount of sector
    /// padding, so compare with the zero tail stripped from both sides.
    fn trim_padding(data: &[u8]) -> &[u8] {
        let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &data[..end]
    }

    /// Decodes and re-encodes every `.EVS` file in the directory the
    /// environment variable points at.
    fn round_trip_event_files(which_dir: &str, region: Region) -> Result<(), TestFailure> {
        let table = CharTable::load(Path::new("table/p1p.tbl"))?;

        let mut paths = vec![];
        for entry in fs::read_dir(env::var(which_dir)?)? {
            let path = entry?.path();
            let evs = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("evs"));
            if evs {
                paths.push(path);
            }
        }
        paths.sort();

        let mut failures = 0;
        let mut first = true;

        for path in &paths {
            let original = fs::read(path)?;
            let decoded = decoder::decode(&original, region, &table)?;

            let reencoded = match encoder::encode(&decoded.listing, &original, region, &table)? {
                Some(bytes) => bytes,
                // Headerless files decode to the EMPTY placeholder and
                // have nothing to compare.
                None => continue,
            };

            if trim_padding(&reencoded) != trim_padding(&original) {
                let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
                let dump_message = if first { " (dumped)" } else { "" };

                if first {
                    fs::write(format!("test_failed_{name}.dec"), &decoded.listing)?;
                    fs::write(format!("test_failed_{name}.evs"), &reencoded)?;
                }

                println!("{name} output mismatch{dump_message}");
                failures += 1;
                first = false;
            }
        }

        let successes = paths.len() - failures;
        println!("{successes}/{0} event files round tripped", paths.len());

        if failures > 0 {
            return Err(TestFailure::RoundTripFailure);
        }
        Ok(())
    }

    #[test]
    fn event_reencode_us() -> Result<(), TestFailure> {
        round_trip_event_files("P1_US_EVENT_DIR", Region::Us)
    }

    #[test]
    fn event_reencode_jp() -> Result<(), TestFailure> {
        round_trip_event_files("P1_JP_EVENT_DIR", Region::Jp)
    }
}
