use super::schema::{normalize_header, required_columns, CarRecord};
use crate::error::PcaError;
use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::info;
use ndarray::{ArrayView1, ArrayView2};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Loads car records from a delimited file with a header row.
pub fn load_csv(path: &Path, delimiter: u8) -> anyhow::Result<Vec<CarRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open dataset {}", path.display()))?;
    let records = load_from_reader(file, delimiter)
        .with_context(|| format!("failed to load dataset {}", path.display()))?;
    info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parses car records from any reader. Headers are normalized (see
/// [`normalize_header`]) and checked against the schema before any row is read.
pub fn load_from_reader<R: Read>(reader: R, delimiter: u8) -> anyhow::Result<Vec<CarRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: StringRecord = reader
        .headers()
        .context("unable to read CSV header")?
        .iter()
        .map(normalize_header)
        .collect();

    for column in required_columns() {
        if !headers.iter().any(|h| h == column) {
            return Err(PcaError::MissingColumn {
                column: column.to_string(),
            }
            .into());
        }
    }
    reader.set_headers(headers);

    let mut records = Vec::new();
    for (row_idx, row) in reader.deserialize::<CarRecord>().enumerate() {
        // header is line 1
        let record = row.with_context(|| format!("failed to parse CSV row {}", row_idx + 2))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(PcaError::EmptyDataset.into());
    }
    Ok(records)
}

/// Writes projected coordinates next to the target as `pc1,..,pck,<target>` for
/// external plotting.
pub fn write_projection<W: Write>(
    writer: W,
    projected: ArrayView2<f64>,
    target: ArrayView1<f64>,
    target_name: &str,
) -> anyhow::Result<()> {
    if projected.nrows() != target.len() {
        return Err(PcaError::DimensionMismatch {
            expected: projected.nrows(),
            actual: target.len(),
        }
        .into());
    }

    let mut writer = WriterBuilder::new().from_writer(writer);
    let mut header: Vec<String> = (1..=projected.ncols()).map(|i| format!("pc{}", i)).collect();
    header.push(target_name.to_string());
    writer.write_record(&header)?;

    for (row, &y) in projected.rows().into_iter().zip(target.iter()) {
        let mut fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        fields.push(y.to_string());
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_projection_csv(
    path: &Path,
    projected: ArrayView2<f64>,
    target: ArrayView1<f64>,
    target_name: &str,
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create projection file {}", path.display()))?;
    write_projection(file, projected, target, target_name)
        .with_context(|| format!("failed to write projection file {}", path.display()))?;
    info!("wrote {} projected rows to {}", target.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const SAMPLE: &str = "\
mpg,cylinders,displacement,horsepower,weight,acceleration,model year,origin,car name
18.0,8,307.0,130.0,3504,12.0,70,1,chevrolet chevelle malibu
15.0,8,350.0,165.0,3693,11.5,70,1,buick skylark 320
25.0,4,98.00,?,2046,19.0,71,1,ford pinto
,4,97.0,88.0,2130,14.5,70,3,datsun pl510
";

    #[test]
    fn test_load_from_reader_maps_placeholders_to_missing() {
        let records = load_from_reader(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].mpg, Some(18.0));
        assert_eq!(records[0].model_year, Some(70.0));
        assert_eq!(records[0].car_name, "chevrolet chevelle malibu");
        assert_eq!(records[2].horsepower, None);
        assert_eq!(records[3].mpg, None);
        assert_eq!(records[3].origin, Some(3.0));
    }

    #[test]
    fn test_missing_schema_column_is_reported() {
        let data = "mpg,cylinders,displacement,weight,acceleration,model_year,origin\n1,2,3,4,5,6,7\n";
        let err = load_from_reader(data.as_bytes(), b',').unwrap_err();
        assert_eq!(
            err.downcast_ref::<PcaError>(),
            Some(&PcaError::MissingColumn {
                column: "horsepower".to_string()
            })
        );
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let data = "mpg,cylinders,displacement,horsepower,weight,acceleration,model_year,origin\n";
        let err = load_from_reader(data.as_bytes(), b',').unwrap_err();
        assert_eq!(err.downcast_ref::<PcaError>(), Some(&PcaError::EmptyDataset));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "MPG;Cylinders;Displacement;Horsepower;Weight;Acceleration;Year;Origin;Name\n\
                    31;4;71;65;1773;19;71;3;toyota corolla 1200\n";
        let records = load_from_reader(data.as_bytes(), b';').unwrap();
        assert_eq!(records[0].weight, Some(1773.0));
        assert_eq!(records[0].model_year, Some(71.0));
        assert_eq!(records[0].car_name, "toyota corolla 1200");
    }

    #[test]
    fn test_write_projection() {
        let projected = array![[1.0, -0.5], [0.25, 2.0]];
        let target = array![18.0, 31.5];
        let mut out = Vec::new();
        write_projection(&mut out, projected.view(), target.view(), "mpg").unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "pc1,pc2,mpg\n1,-0.5,18\n0.25,2,31.5\n");
    }
}
