use crate::reports::{self, DashboardData};
use crate::types::{FilterSelection, JoinMismatch, WardSummaryRow};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Render `rows` as a markdown table, `max_rows` at most.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
    if rows.len() > max_rows {
        println!("({} more rows not shown)\n", rows.len() - max_rows);
    }
}

/// JSON snapshot of one rendered selection.
#[derive(Debug, Serialize)]
pub struct DashboardExport<'a> {
    pub generated_at: DateTime<Utc>,
    pub selection: &'a FilterSelection,
    pub matched_records: usize,
    pub wards: usize,
    pub mismatches: &'a [JoinMismatch],
}

/// Files written for one populated dashboard.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub summary: PathBuf,
    pub heatmap: PathBuf,
    pub choropleth: PathBuf,
    pub json: PathBuf,
}

impl ExportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            summary: dir.join("ward_summary.csv"),
            heatmap: dir.join("heatmap.csv"),
            choropleth: dir.join("choropleth.csv"),
            json: dir.join("dashboard.json"),
        }
    }
}

pub fn export_dashboard(dir: &Path, data: &DashboardData) -> Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let paths = ExportPaths::in_dir(dir);

    let summary_rows: Vec<WardSummaryRow> =
        data.summary.summaries.iter().map(WardSummaryRow::from).collect();
    write_csv(&paths.summary, &summary_rows)?;
    write_csv(&paths.heatmap, &data.heatmap)?;
    write_csv(&paths.choropleth, &data.choropleth)?;

    let export = DashboardExport {
        generated_at: Utc::now(),
        selection: &data.selection,
        matched_records: data.filtered.len(),
        wards: data.summary.summaries.len(),
        mismatches: &data.summary.mismatches,
    };
    write_json(&paths.json, &export)?;
    info!(dir = %dir.display(), "dashboard exported");
    Ok(paths)
}

/// Print the three dashboard panels: heatmap cells, the two ranked ward
/// tables, and the choropleth values.
pub fn print_dashboard(data: &DashboardData, max_rows: usize) {
    println!("Heatmap (Year x Sub-Category, distinct complaints)\n");
    preview_table_rows(&data.heatmap, max_rows);

    println!("Choropleth values by ward\n");
    preview_table_rows(&data.choropleth, max_rows);

    println!("#### Unique Categories/Sub-Categories\n");
    preview_table_rows(&reports::by_category_pairs(&data.summary.summaries), max_rows);

    println!("#### Total Complaints\n");
    preview_table_rows(&reports::by_complaints(&data.summary.summaries), max_rows);

    if !data.summary.mismatches.is_empty() {
        println!(
            "Note: {} ward(s) dropped from the summary (missing from one measure).\n",
            data.summary.mismatches.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{build_dashboard, Dashboard};
    use crate::types::{GrievanceRecord, RecordSet};

    fn data() -> DashboardData {
        let records = RecordSet::new(vec![GrievanceRecord {
            complaint_id: Some("1".into()),
            year: 2024,
            category: Some("Roads".into()),
            sub_category: Some("Potholes".into()),
            ward_name: Some("Ward-1".into()),
            extra: vec![],
        }]);
        match build_dashboard(&records, &FilterSelection::default()) {
            Dashboard::Populated(d) => d,
            Dashboard::Empty { .. } => panic!("expected data"),
        }
    }

    #[test]
    fn empty_table_renders_placeholder() {
        let rows: Vec<WardSummaryRow> = vec![];
        assert_eq!(render_table(&rows, 5), "(no rows)");
    }

    #[test]
    fn table_uses_display_headers() {
        let d = data();
        let s = render_table(&d.choropleth, 5);
        assert!(s.contains("Ward Name"));
        assert!(s.contains("Ward-1"));
    }

    #[test]
    fn export_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_dashboard(dir.path(), &data()).unwrap();

        let summary = std::fs::read_to_string(&paths.summary).unwrap();
        assert_eq!(
            summary.lines().next().unwrap(),
            "Ward Name,num_category_subcategory,num_complaints"
        );
        assert!(summary.contains("Ward-1,1,1"));

        let heatmap = std::fs::read_to_string(&paths.heatmap).unwrap();
        assert!(heatmap.starts_with("year,sub_category,count"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["matched_records"], 1);
        assert_eq!(json["wards"], 1);
        assert!(json["generated_at"].is_string());
        assert!(paths.choropleth.exists());
    }
}
