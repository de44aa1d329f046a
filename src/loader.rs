use crate::error::IngestionError;
use crate::types::{
    GrievanceRecord, RecordSet, COL_CATEGORY, COL_COMPLAINT_ID, COL_SUB_CATEGORY, COL_WARD_NAME,
    REQUIRED_COLUMNS,
};
use crate::util::cell_value;
use csv::{ReaderBuilder, StringRecord};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where a feed lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
}

impl From<&str> for SourceLocation {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            SourceLocation::Url(s.to_string())
        } else {
            SourceLocation::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::File(p) => write!(f, "{}", p.display()),
            SourceLocation::Url(u) => f.write_str(u),
        }
    }
}

/// A feed together with the year its records are stamped with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub year: i32,
    pub location: SourceLocation,
}

impl Source {
    pub fn new(year: i32, location: impl AsRef<str>) -> Self {
        Self { year, location: SourceLocation::from(location.as_ref()) }
    }
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub year: i32,
    pub location: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
    pub total_rows: usize,
    pub missing_category: usize,
    pub missing_sub_category: usize,
    pub missing_ward: usize,
    pub missing_complaint_id: usize,
}

/// Load every source in order and union the rows into one record set.
///
/// Any unreachable or malformed source aborts the whole load; no partial
/// record set is ever returned.
pub fn ingest(sources: &[Source]) -> Result<(RecordSet, LoadReport), IngestionError> {
    if sources.is_empty() {
        return Err(IngestionError::NoSources);
    }
    let mut all: Vec<GrievanceRecord> = Vec::new();
    let mut report = LoadReport::default();

    for source in sources {
        let label = source.location.to_string();
        info!(year = source.year, location = %label, "loading source");
        let reader = open_source(source)?;
        let records = read_records(source.year, &label, reader)?;
        debug!(year = source.year, rows = records.len(), "source loaded");
        report.sources.push(SourceReport {
            year: source.year,
            location: label,
            rows: records.len(),
        });
        all.extend(records);
    }

    for r in &all {
        report.total_rows += 1;
        if r.category.is_none() { report.missing_category += 1; }
        if r.sub_category.is_none() { report.missing_sub_category += 1; }
        if r.ward_name.is_none() { report.missing_ward += 1; }
        if r.complaint_id.is_none() { report.missing_complaint_id += 1; }
    }

    Ok((RecordSet::new(all), report))
}

fn open_source(source: &Source) -> Result<Box<dyn Read>, IngestionError> {
    let unreachable = |reason: String| IngestionError::Unreachable {
        year: source.year,
        location: source.location.to_string(),
        reason,
    };
    match &source.location {
        SourceLocation::File(path) => {
            let f = File::open(path).map_err(|e| unreachable(e.to_string()))?;
            Ok(Box::new(f))
        }
        SourceLocation::Url(url) => match ureq::get(url).call() {
            Ok(resp) => Ok(Box::new(resp.into_reader())),
            Err(ureq::Error::Status(code, _)) => Err(unreachable(format!("HTTP status {code}"))),
            Err(err) => Err(unreachable(err.to_string())),
        },
    }
}

/// Column positions resolved from a feed's header row.
struct Columns {
    complaint_id: usize,
    category: usize,
    sub_category: usize,
    ward_name: usize,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|h| h == name).ok_or_else(|| name.to_string());
        let complaint_id = find(COL_COMPLAINT_ID)?;
        let category = find(COL_CATEGORY)?;
        let sub_category = find(COL_SUB_CATEGORY)?;
        let ward_name = find(COL_WARD_NAME)?;
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !REQUIRED_COLUMNS.contains(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();
        Ok(Self { complaint_id, category, sub_category, ward_name, extra })
    }

    fn build(&self, year: i32, row: &StringRecord) -> GrievanceRecord {
        GrievanceRecord {
            complaint_id: cell_value(row.get(self.complaint_id)),
            year,
            category: cell_value(row.get(self.category)),
            sub_category: cell_value(row.get(self.sub_category)),
            ward_name: cell_value(row.get(self.ward_name)),
            extra: self
                .extra
                .iter()
                .map(|(i, h)| (h.clone(), row.get(*i).unwrap_or_default().to_string()))
                .collect(),
        }
    }
}

/// Parse one delimited feed, stamping each row with `year`.
pub fn read_records<R: Read>(
    year: i32,
    location: &str,
    reader: R,
) -> Result<Vec<GrievanceRecord>, IngestionError> {
    let malformed = |source: csv::Error| IngestionError::Malformed {
        year,
        location: location.to_string(),
        source,
    };
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers().map_err(malformed)?.clone();
    let columns = Columns::resolve(&headers).map_err(|column| IngestionError::MissingColumn {
        year,
        location: location.to_string(),
        column,
    })?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(malformed)?;
        out.push(columns.build(year, &row));
    }
    Ok(out)
}
