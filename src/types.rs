use serde::Serialize;
use tabled::Tabled;

// Header names the feeds must carry. A rename upstream is a breaking change.
pub const COL_COMPLAINT_ID: &str = "Complaint ID";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUB_CATEGORY: &str = "Sub Category";
pub const COL_WARD_NAME: &str = "Ward Name";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_COMPLAINT_ID,
    COL_CATEGORY,
    COL_SUB_CATEGORY,
    COL_WARD_NAME,
];

/// Cell values read as null, matched exactly. Same set as the default NA
/// markers of pandas `read_csv`, so feeds prepared for it load the same way.
pub const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One complaint, stamped with the year of the feed it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrievanceRecord {
    pub complaint_id: Option<String>,
    pub year: i32,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub ward_name: Option<String>,
    /// Columns outside the contract, in header order.
    pub extra: Vec<(String, String)>,
}

/// An ordered, immutable collection of records.
///
/// Built once by the loader (or by `filter`) and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<GrievanceRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<GrievanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GrievanceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GrievanceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<GrievanceRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = GrievanceRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a GrievanceRecord;
    type IntoIter = std::slice::Iter<'a, GrievanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The user's current choice at each filter stage. `None` leaves a field
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub ward_name: Option<String>,
}

impl FilterSelection {
    pub fn matches(&self, r: &GrievanceRecord) -> bool {
        if let Some(y) = self.year {
            if r.year != y {
                return false;
            }
        }
        field_matches(self.category.as_deref(), r.category.as_deref())
            && field_matches(self.sub_category.as_deref(), r.sub_category.as_deref())
            && field_matches(self.ward_name.as_deref(), r.ward_name.as_deref())
    }

    pub fn is_complete(&self) -> bool {
        self.year.is_some()
            && self.category.is_some()
            && self.sub_category.is_some()
            && self.ward_name.is_some()
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual == Some(w),
    }
}

/// Per-ward summary derived from a filtered record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WardSummary {
    pub ward_name: String,
    pub distinct_category_subcategory_count: usize,
    pub complaint_count: usize,
}

/// Which side of the summary join a ward was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    CategoryPairs,
    Complaints,
}

/// A ward present in only one of the two aggregations. Dropped from the
/// summaries, reported here instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinMismatch {
    pub ward_name: String,
    pub missing_from: JoinSide,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryCountRow {
    #[serde(rename = "Ward Name")]
    #[tabled(rename = "Ward Name")]
    pub ward_name: String,
    #[serde(rename = "num_category_subcategory")]
    #[tabled(rename = "Categories/Sub-Categories")]
    pub num_category_subcategory: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComplaintCountRow {
    #[serde(rename = "Ward Name")]
    #[tabled(rename = "Ward Name")]
    pub ward_name: String,
    #[serde(rename = "num_complaints")]
    #[tabled(rename = "Total Complaints")]
    pub num_complaints: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct WardSummaryRow {
    #[serde(rename = "Ward Name")]
    #[tabled(rename = "Ward Name")]
    pub ward_name: String,
    #[serde(rename = "num_category_subcategory")]
    #[tabled(rename = "Categories/Sub-Categories")]
    pub num_category_subcategory: usize,
    #[serde(rename = "num_complaints")]
    #[tabled(rename = "Total Complaints")]
    pub num_complaints: usize,
}

impl From<&WardSummary> for WardSummaryRow {
    fn from(s: &WardSummary) -> Self {
        Self {
            ward_name: s.ward_name.clone(),
            num_category_subcategory: s.distinct_category_subcategory_count,
            num_complaints: s.complaint_count,
        }
    }
}

/// One heatmap cell: year on the ordinal axis, sub-category on the
/// categorical axis, distinct complaints as the colour measure.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct HeatmapCell {
    #[serde(rename = "year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "sub_category")]
    #[tabled(rename = "Sub Category")]
    pub sub_category: String,
    #[serde(rename = "count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// One shaded region. `ward_name` must match the boundary file's
/// `properties.ward_name` exactly.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct ChoroplethRow {
    #[serde(rename = "ward_name")]
    #[tabled(rename = "Ward Name")]
    pub ward_name: String,
    #[serde(rename = "num_complaints")]
    #[tabled(rename = "Total Complaints")]
    pub num_complaints: usize,
}
