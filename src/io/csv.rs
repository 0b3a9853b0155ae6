use crate::config::{ColumnConfig, GeoPoint, ValleyLine};
use crate::io::results::SweepRecord;
use crate::meander::MeanderPath;
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

fn point_from_record(
    record: &StringRecord,
    lat_index: usize,
    lon_index: usize,
    row: usize,
) -> Result<GeoPoint> {
    let field = |idx: usize, name: &str| -> Result<f64> {
        let raw = record
            .get(idx)
            .with_context(|| format!("Row {} has no {} column", row, name))?;
        raw.trim()
            .parse::<f64>()
            .with_context(|| format!("Row {}: cannot parse {} value {:?}", row, name, raw))
    };

    let lat = field(lat_index, "latitude")?;
    let lon = field(lon_index, "longitude")?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("Row {}: coordinate ({}, {}) is outside WGS84 bounds", row, lat, lon);
    }
    Ok(GeoPoint::new(lat, lon))
}

/// Read valley points from any headered CSV source.
///
/// Columns are located by the names in `columns`; when a column name is not
/// in the header the first two columns are taken as latitude, longitude.
pub fn read_valley_points<R: Read>(reader: R, columns: &ColumnConfig) -> Result<ValleyLine> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let position = |name: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                warn!(
                    "No {:?} column in header, using column {}",
                    name, fallback
                );
                fallback
            })
    };
    let lat_index = position(&columns.lat, 0);
    let lon_index = position(&columns.lon, 1);

    let mut points = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let row = i + 2;
        let record = result.with_context(|| format!("Failed to read CSV row {}", row))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        points.push(point_from_record(&record, lat_index, lon_index, row)?);
    }

    debug!("Loaded {} valley points", points.len());
    Ok(ValleyLine::new(points))
}

pub fn read_valley_line(path: &Path, columns: &ColumnConfig) -> Result<ValleyLine> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open valley line: {:?}", path))?;
    read_valley_points(BufReader::new(file), columns)
        .with_context(|| format!("Invalid valley line file: {:?}", path))
}

// Create CSV writer with headers
pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    let wtr = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    Ok(wtr)
}

/// Write the centerline as `index,lon,lat` rows.
pub fn write_path<W: std::io::Write>(wtr: &mut Writer<W>, path: &MeanderPath) -> Result<()> {
    wtr.write_record(["index", "lon", "lat"])?;
    for (i, [lon, lat]) in path.to_lon_lat().into_iter().enumerate() {
        wtr.write_record(&[i.to_string(), lon.to_string(), lat.to_string()])?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

pub fn write_path_csv(path: &Path, meander: &MeanderPath) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    write_path(&mut wtr, meander).with_context(|| format!("Failed to write {:?}", path))
}

pub fn write_sweep_csv(path: &Path, records: &[SweepRecord]) -> Result<()> {
    let mut wtr = create_csv_writer(path)?;
    for record in records {
        wtr.serialize(record)
            .with_context(|| format!("Failed to write sweep row to {:?}", path))?;
    }
    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
