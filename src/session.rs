//! Per-run dashboard state: the loaded record set plus the current filter
//! selection. The record set is fixed at construction; only the selection
//! moves, and moving one stage re-defaults every stage after it.

use crate::error::SelectionError;
use crate::filters::{self, FilterStage, OptionValue};
use crate::types::{FilterSelection, RecordSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the year selector lists its options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum YearOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone)]
pub struct Session {
    records: RecordSet,
    selection: FilterSelection,
    year_order: YearOrder,
}

impl Session {
    /// Wrap a loaded record set. Every stage starts on its first presented
    /// option, as a fresh select box would.
    pub fn new(records: RecordSet, year_order: YearOrder) -> Self {
        let mut session = Self {
            records,
            selection: FilterSelection::default(),
            year_order,
        };
        for stage in FilterStage::ALL {
            session.reset_stage(stage);
        }
        session
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Options for `stage` in the order the selector presents them.
    pub fn options(&self, stage: FilterStage) -> Vec<OptionValue> {
        let mut opts = filters::available_options(&self.records, &self.selection, stage);
        if stage == FilterStage::Year && self.year_order == YearOrder::Descending {
            opts.reverse();
        }
        opts
    }

    /// Choose `value` at `stage`. Every downstream stage falls back to its
    /// first option under the new upstream choices, or to unset if it has
    /// none.
    pub fn select(&mut self, stage: FilterStage, value: &str) -> Result<(), SelectionError> {
        let chosen = self
            .options(stage)
            .into_iter()
            .find(|o| o.to_string() == value)
            .ok_or_else(|| SelectionError::NotAnOption {
                stage: stage.label().to_string(),
                value: value.to_string(),
            })?;
        debug!(stage = %stage, value = %chosen, "selection changed");
        self.selection.set(stage, Some(chosen));
        for later in stage.downstream() {
            self.reset_stage(later);
        }
        Ok(())
    }

    /// Set `stage` to `value` even if it is not currently offered, then
    /// re-default the downstream stages. Used for selections supplied up
    /// front, where an unmatched value must still reach `filter` and
    /// produce an empty result.
    pub fn override_stage(&mut self, stage: FilterStage, value: &str) {
        if let Err(e) = self.select(stage, value) {
            warn!(error = %e, "applying selection without a matching option");
            self.selection.set(stage, Some(OptionValue::Text(value.to_string())));
            for later in stage.downstream() {
                self.reset_stage(later);
            }
        }
    }

    /// Records matching the full current selection.
    pub fn filtered(&self) -> RecordSet {
        filters::filter(&self.records, &self.selection)
    }

    fn reset_stage(&mut self, stage: FilterStage) {
        let first = self.options(stage).into_iter().next();
        self.selection.set(stage, first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrievanceRecord;

    fn rec(year: i32, cat: &str, sub: &str, ward: &str) -> GrievanceRecord {
        GrievanceRecord {
            complaint_id: Some(format!("{year}-{cat}-{sub}-{ward}")),
            year,
            category: Some(cat.to_string()),
            sub_category: Some(sub.to_string()),
            ward_name: Some(ward.to_string()),
            extra: vec![],
        }
    }

    fn records() -> RecordSet {
        RecordSet::new(vec![
            rec(2024, "Roads", "Potholes", "Ward-1"),
            rec(2024, "Garbage", "Not Collected", "Ward-2"),
            rec(2025, "Electrical", "Streetlight Out", "Ward-3"),
            rec(2025, "Roads", "Footpath", "Ward-4"),
        ])
    }

    #[test]
    fn starts_on_latest_year_and_first_options() {
        let s = Session::new(records(), YearOrder::Descending);
        let sel = s.selection();
        assert_eq!(sel.year, Some(2025));
        assert_eq!(sel.category.as_deref(), Some("Electrical"));
        assert_eq!(sel.sub_category.as_deref(), Some("Streetlight Out"));
        assert_eq!(sel.ward_name.as_deref(), Some("Ward-3"));
        assert!(sel.is_complete());
    }

    #[test]
    fn ascending_order_starts_on_earliest_year() {
        let s = Session::new(records(), YearOrder::Ascending);
        assert_eq!(s.selection().year, Some(2024));
        assert_eq!(
            s.options(FilterStage::Year),
            vec![OptionValue::Year(2024), OptionValue::Year(2025)]
        );
    }

    #[test]
    fn changing_year_invalidates_downstream() {
        let mut s = Session::new(records(), YearOrder::Descending);
        s.select(FilterStage::Year, "2024").unwrap();
        let sel = s.selection();
        assert_eq!(sel.category.as_deref(), Some("Garbage"));
        assert_eq!(sel.sub_category.as_deref(), Some("Not Collected"));
        assert_eq!(sel.ward_name.as_deref(), Some("Ward-2"));
        let cats: Vec<String> = s.options(FilterStage::Category).iter().map(|o| o.to_string()).collect();
        assert!(!cats.contains(&"Electrical".to_string()));
    }

    #[test]
    fn selecting_unavailable_value_is_rejected() {
        let mut s = Session::new(records(), YearOrder::Descending);
        let before = s.selection().clone();
        let err = s.select(FilterStage::Category, "Garbage").unwrap_err();
        assert_eq!(
            err,
            SelectionError::NotAnOption { stage: "Category".into(), value: "Garbage".into() }
        );
        assert_eq!(s.selection(), &before);
    }

    #[test]
    fn filtered_follows_selection() {
        let mut s = Session::new(records(), YearOrder::Descending);
        s.select(FilterStage::Category, "Roads").unwrap();
        let out = s.filtered();
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].ward_name.as_deref(), Some("Ward-4"));
    }

    #[test]
    fn override_keeps_unmatched_value_and_empties_result() {
        let mut s = Session::new(records(), YearOrder::Descending);
        s.override_stage(FilterStage::Category, "Garbage");
        assert_eq!(s.selection().category.as_deref(), Some("Garbage"));
        assert_eq!(s.selection().sub_category, None);
        assert_eq!(s.selection().ward_name, None);
        assert!(s.filtered().is_empty());
    }

    #[test]
    fn override_with_valid_value_behaves_like_select() {
        let mut s = Session::new(records(), YearOrder::Descending);
        s.override_stage(FilterStage::Year, "2024");
        assert_eq!(s.selection().year, Some(2024));
        assert_eq!(s.selection().ward_name.as_deref(), Some("Ward-2"));
    }

    #[test]
    fn empty_record_set_leaves_everything_unset() {
        let s = Session::new(RecordSet::default(), YearOrder::Descending);
        assert_eq!(s.selection(), &FilterSelection::default());
        assert!(s.options(FilterStage::Ward).is_empty());
        assert!(s.filtered().is_empty());
    }
}
