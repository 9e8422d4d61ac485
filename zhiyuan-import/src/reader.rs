//! CSV parsing and row validation
//!
//! Expected columns: province, exam_type, year, school, major,
//! min_score, min_rank. Files must be UTF-8; a leading BOM is
//! tolerated. Integer fields also accept float spellings like
//! "3500.0", which some exports produce.

use serde::Deserialize;
use std::path::Path;

/// One validated admission record ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub province: String,
    pub exam_type: String,
    pub year: i64,
    pub school: String,
    pub major: String,
    pub min_score: i64,
    pub min_rank: i64,
}

/// Raw CSV row before validation; every field optional so one missing
/// column yields a per-line error instead of aborting the file
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    province: Option<String>,
    #[serde(default)]
    exam_type: Option<String>,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    school: Option<String>,
    #[serde(default)]
    major: Option<String>,
    #[serde(default)]
    min_score: Option<String>,
    #[serde(default)]
    min_rank: Option<String>,
}

fn required<'a>(field: &'a Option<String>, name: &str, line: usize) -> Result<&'a str, String> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("line {line}: missing required field: {name}")),
    }
}

/// Parse an integer field, accepting float spellings by truncation
fn parse_int(value: &str, name: &str, line: usize) -> Result<i64, String> {
    value
        .parse::<i64>()
        .or_else(|_| value.parse::<f64>().map(|f| f as i64))
        .map_err(|_| format!("line {line}: malformed {name}: {value}"))
}

fn validate_row(raw: &RawRow, line: usize) -> Result<CsvRow, String> {
    let province = required(&raw.province, "province", line)?;
    let exam_type = required(&raw.exam_type, "exam_type", line)?;
    let school = required(&raw.school, "school", line)?;
    let major = required(&raw.major, "major", line)?;

    let year = parse_int(required(&raw.year, "year", line)?, "year", line)?;
    if !(2000..=2030).contains(&year) {
        return Err(format!("line {line}: implausible year: {year}"));
    }

    let min_score = parse_int(required(&raw.min_score, "min_score", line)?, "min_score", line)?;
    if !(0..=750).contains(&min_score) {
        return Err(format!("line {line}: implausible score: {min_score}"));
    }

    let min_rank = parse_int(required(&raw.min_rank, "min_rank", line)?, "min_rank", line)?;
    if min_rank < 0 {
        return Err(format!("line {line}: rank must not be negative: {min_rank}"));
    }

    Ok(CsvRow {
        province: province.to_string(),
        exam_type: exam_type.to_string(),
        year,
        school: school.to_string(),
        major: major.to_string(),
        min_score,
        min_rank,
    })
}

/// Parse CSV content into validated rows plus per-line error messages
pub fn parse_csv(content: &str) -> (Vec<CsvRow>, Vec<String>) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    // Line 1 is the header
    for (i, record) in reader.deserialize::<RawRow>().enumerate() {
        let line = i + 2;
        match record {
            Ok(raw) => match validate_row(&raw, line) {
                Ok(row) => rows.push(row),
                Err(err) => errors.push(err),
            },
            Err(err) => errors.push(format!("line {line}: {err}")),
        }
    }

    (rows, errors)
}

/// Read and parse a CSV file
pub fn read_csv_file(path: &Path) -> anyhow::Result<(Vec<CsvRow>, Vec<String>)> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {} as UTF-8: {}", path.display(), e))?;
    Ok(parse_csv(&content))
}
