//! Static zip code reference table.
//!
//! The table is a small CSV with a header row. Columns are located by name, so
//! extra columns (as found in the public US zip datasets) are ignored.

use std::{fs, path::Path};

use crate::{Location, WeatherError};

const BUNDLED: &str = include_str!("../data/zip_codes.csv");

const REQUIRED: [&str; 6] = ["zip", "lat", "lng", "city", "state_id", "state_name"];

#[derive(Debug, Clone, Default)]
pub struct ZipTable {
    rows: Vec<Location>,
}

impl ZipTable {
    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self, WeatherError> {
        Self::parse(BUNDLED)
    }

    /// Read a table from a CSV file on disk.
    pub fn load(path: &Path) -> Result<Self, WeatherError> {
        let text = fs::read_to_string(path).map_err(|e| WeatherError::io(path, e))?;
        let table = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "loaded zip table");
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self, WeatherError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (header_line, header) =
            lines.next().ok_or_else(|| WeatherError::table(1, "missing header row"))?;
        let columns = Columns::from_header(&split_record(header, header_line)?, header_line)?;

        let mut rows = Vec::new();
        for (line_no, line) in lines {
            let fields = split_record(line, line_no)?;
            rows.push(columns.location(&fields, line_no)?);
        }

        Ok(Self { rows })
    }

    /// Exact-match lookup; the first matching row wins.
    pub fn lookup(&self, zip: u32) -> Option<&Location> {
        self.rows.iter().find(|row| row.zip == zip)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct Columns {
    zip: usize,
    lat: usize,
    lng: usize,
    city: usize,
    state_id: usize,
    state_name: usize,
}

impl Columns {
    fn from_header(fields: &[String], line: usize) -> Result<Self, WeatherError> {
        let mut idx = [0usize; REQUIRED.len()];
        for (slot, name) in idx.iter_mut().zip(REQUIRED) {
            *slot = fields
                .iter()
                .position(|f| f.eq_ignore_ascii_case(name))
                .ok_or_else(|| WeatherError::table(line, format!("missing column '{name}'")))?;
        }

        let [zip, lat, lng, city, state_id, state_name] = idx;
        Ok(Self { zip, lat, lng, city, state_id, state_name })
    }

    fn location(&self, fields: &[String], line: usize) -> Result<Location, WeatherError> {
        let field = |idx: usize, name: &str| {
            fields
                .get(idx)
                .map(String::as_str)
                .ok_or_else(|| WeatherError::table(line, format!("missing value for '{name}'")))
        };

        let zip = field(self.zip, "zip")?;
        let zip = zip
            .parse::<u32>()
            .map_err(|_| WeatherError::table(line, format!("invalid zip '{zip}'")))?;

        Ok(Location {
            zip,
            latitude: parse_coordinate(field(self.lat, "lat")?, line)?,
            longitude: parse_coordinate(field(self.lng, "lng")?, line)?,
            place_name: field(self.city, "city")?.to_string(),
            region_code: field(self.state_id, "state_id")?.to_string(),
            region_name: field(self.state_name, "state_name")?.to_string(),
        })
    }
}

fn parse_coordinate(value: &str, line: usize) -> Result<f64, WeatherError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WeatherError::table(line, format!("invalid coordinate '{value}'")))
}

/// Split one CSV record, honouring double quotes and `""` escapes.
fn split_record(line: &str, line_no: usize) -> Result<Vec<String>, WeatherError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(WeatherError::table(line_no, "unterminated quoted field"));
    }
    fields.push(field.trim().to_string());

    Ok(fields)
}
