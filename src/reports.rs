use crate::error::WardNotFound;
use crate::types::{
    CategoryCountRow, ChoroplethRow, ComplaintCountRow, FilterSelection, HeatmapCell, JoinMismatch,
    JoinSide, RecordSet, WardSummary,
};
use crate::filters;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Summaries for every ward that appears on both sides of the join, plus
/// the wards that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    pub summaries: Vec<WardSummary>,
    pub mismatches: Vec<JoinMismatch>,
}

/// Distinct `(category, sub_category)` pairs per ward. Nulls are kept as
/// ordinary pair values. Records without a ward belong to no group.
pub fn category_pair_counts(records: &RecordSet) -> BTreeMap<String, usize> {
    let mut map: BTreeMap<String, HashSet<(Option<&str>, Option<&str>)>> = BTreeMap::new();
    for r in records {
        let Some(ward) = r.ward_name.as_ref() else { continue };
        map.entry(ward.clone())
            .or_default()
            .insert((r.category.as_deref(), r.sub_category.as_deref()));
    }
    map.into_iter().map(|(w, pairs)| (w, pairs.len())).collect()
}

/// Distinct complaint ids per ward. Only records that carry an id
/// contribute, so a ward whose records all lack one is absent here.
pub fn complaint_counts(records: &RecordSet) -> BTreeMap<String, usize> {
    let mut map: BTreeMap<String, HashSet<&str>> = BTreeMap::new();
    for r in records {
        let (Some(ward), Some(id)) = (r.ward_name.as_ref(), r.complaint_id.as_deref()) else {
            continue;
        };
        map.entry(ward.clone()).or_default().insert(id);
    }
    map.into_iter().map(|(w, ids)| (w, ids.len())).collect()
}

/// Inner join of the two per-ward measures. Wards on only one side are
/// dropped from the summaries and listed as mismatches.
pub fn join_on_ward(
    pairs: BTreeMap<String, usize>,
    mut complaints: BTreeMap<String, usize>,
) -> SummaryReport {
    let mut report = SummaryReport::default();
    for (ward, pair_count) in pairs {
        match complaints.remove(&ward) {
            Some(complaint_count) => report.summaries.push(WardSummary {
                ward_name: ward,
                distinct_category_subcategory_count: pair_count,
                complaint_count,
            }),
            None => report.mismatches.push(JoinMismatch {
                ward_name: ward,
                missing_from: JoinSide::Complaints,
            }),
        }
    }
    for (ward, _) in complaints {
        report.mismatches.push(JoinMismatch {
            ward_name: ward,
            missing_from: JoinSide::CategoryPairs,
        });
    }
    for m in &report.mismatches {
        warn!(ward = %m.ward_name, missing_from = ?m.missing_from, "ward dropped from summary join");
    }
    report
}

/// Per-ward summary of a filtered record set.
pub fn summarize(filtered: &RecordSet) -> SummaryReport {
    join_on_ward(category_pair_counts(filtered), complaint_counts(filtered))
}

pub fn lookup_ward<'a>(
    summaries: &'a [WardSummary],
    ward_name: &str,
) -> Result<&'a WardSummary, WardNotFound> {
    summaries
        .iter()
        .find(|s| s.ward_name == ward_name)
        .ok_or_else(|| WardNotFound(ward_name.to_string()))
}

pub fn by_category_pairs(summaries: &[WardSummary]) -> Vec<CategoryCountRow> {
    let mut sorted: Vec<&WardSummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| {
        b.distinct_category_subcategory_count
            .cmp(&a.distinct_category_subcategory_count)
            .then_with(|| a.ward_name.cmp(&b.ward_name))
    });
    sorted
        .into_iter()
        .map(|s| CategoryCountRow {
            ward_name: s.ward_name.clone(),
            num_category_subcategory: s.distinct_category_subcategory_count,
        })
        .collect()
}

pub fn by_complaints(summaries: &[WardSummary]) -> Vec<ComplaintCountRow> {
    let mut sorted: Vec<&WardSummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| {
        b.complaint_count
            .cmp(&a.complaint_count)
            .then_with(|| a.ward_name.cmp(&b.ward_name))
    });
    sorted
        .into_iter()
        .map(|s| ComplaintCountRow {
            ward_name: s.ward_name.clone(),
            num_complaints: s.complaint_count,
        })
        .collect()
}

/// Distinct complaints per `(year, sub_category)`, ordered by year then
/// sub-category. Records without a sub-category produce no cell.
pub fn heatmap_cells(filtered: &RecordSet) -> Vec<HeatmapCell> {
    let mut map: BTreeMap<(i32, &str), HashSet<&str>> = BTreeMap::new();
    for r in filtered {
        let Some(sub) = r.sub_category.as_deref() else { continue };
        let ids = map.entry((r.year, sub)).or_default();
        if let Some(id) = r.complaint_id.as_deref() {
            ids.insert(id);
        }
    }
    map.into_iter()
        .map(|((year, sub), ids)| HeatmapCell {
            year,
            sub_category: sub.to_string(),
            count: ids.len(),
        })
        .collect()
}

pub fn choropleth_rows(summaries: &[WardSummary]) -> Vec<ChoroplethRow> {
    summaries
        .iter()
        .map(|s| ChoroplethRow {
            ward_name: s.ward_name.clone(),
            num_complaints: s.complaint_count,
        })
        .collect()
}

/// Everything the renderers need for one selection.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub selection: FilterSelection,
    pub filtered: RecordSet,
    pub heatmap: Vec<HeatmapCell>,
    pub choropleth: Vec<ChoroplethRow>,
    pub summary: SummaryReport,
}

#[derive(Debug, Clone)]
pub enum Dashboard {
    /// Nothing matched; show a notice and render nothing else.
    Empty { selection: FilterSelection },
    Populated(DashboardData),
}

pub fn build_dashboard(records: &RecordSet, selection: &FilterSelection) -> Dashboard {
    let filtered = filters::filter(records, selection);
    if filtered.is_empty() {
        return Dashboard::Empty { selection: selection.clone() };
    }
    let summary = summarize(&filtered);
    Dashboard::Populated(DashboardData {
        selection: selection.clone(),
        heatmap: heatmap_cells(&filtered),
        choropleth: choropleth_rows(&summary.summaries),
        filtered,
        summary,
    })
}
