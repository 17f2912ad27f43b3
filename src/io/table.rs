//! CSV ingestion and snapshots for polars data frames.

use crate::error::{ForecastError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;
use tracing::debug;

const SNAPSHOT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read a headered CSV stream.
///
/// Column types are inferred from the first rows; empty fields are null and
/// date-like text stays text until cleansing parses it.
pub fn read_csv_from<R: Read>(mut reader: R) -> Result<DataFrame> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ForecastError::EmptyData);
    }

    Ok(CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?)
}

/// Read a headered CSV file.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let frame = read_csv_from(File::open(path)?)?;
    debug!(path = %path.display(), rows = frame.height(), columns = frame.width(), "read csv");
    Ok(frame)
}

/// Write a frame as headered CSV to any writer. Nulls are written empty.
pub fn write_csv_to<W: Write>(frame: &DataFrame, writer: W) -> Result<()> {
    let mut frame = frame.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_datetime_format(Some(SNAPSHOT_DATETIME_FORMAT.to_string()))
        .finish(&mut frame)?;
    Ok(())
}

/// Write a frame as headered CSV, creating or truncating `path`.
pub fn write_csv(frame: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv_to(frame, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), rows = frame.height(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{datetime_series, float_series, numeric_column};
    use crate::data::parse_timestamp_column;
    use chrono::{TimeZone, Utc};

    #[test]
    fn cells_are_typed() {
        let data = "date,demand,store\n2024-01-01,12.5,A\n2024-01-02,,B\n";
        let frame = read_csv_from(data.as_bytes()).unwrap();

        assert_eq!(frame.height(), 2);
        let names: Vec<&str> = frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["date", "demand", "store"]);
        let demand = frame.column("demand").unwrap();
        assert_eq!(demand.dtype(), &DataType::Float64);
        assert_eq!(demand.null_count(), 1);
        assert_eq!(frame.column("date").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            read_csv_from("".as_bytes()),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn written_snapshot_reads_back() {
        let stamps = [
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
        ];
        let frame = DataFrame::new(vec![
            datetime_series("date", &stamps).unwrap().into(),
            float_series("demand", &[3.0, f64::NAN]).into(),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        write_csv_to(&frame, &mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("date,demand\n2024-01-01 00:00:00,3"));
        assert!(text.ends_with("2024-01-02 00:00:00,\n"));

        let back = read_csv_from(buffer.as_slice()).unwrap();
        assert_eq!(
            parse_timestamp_column(&back, "date", None).unwrap(),
            stamps.to_vec()
        );
        let demand = numeric_column(&back, "demand").unwrap();
        assert_eq!(demand[0], 3.0);
        assert!(demand[1].is_nan());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demand.csv");
        std::fs::write(&path, "date,demand\n2024-01-01,4\n").unwrap();

        let frame = read_csv(&path).unwrap();
        let copy = dir.path().join("copy.csv");
        write_csv(&frame, &copy).unwrap();
        assert!(read_csv(&copy).unwrap().equals_missing(&frame));
    }
}
