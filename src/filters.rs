//! The staged filter chain.
//!
//! Stages run Year → Category → SubCategory → Ward. The options offered at a
//! stage depend only on the selections made at the stages before it, so each
//! option list is a pure function of the record set and the upstream choices.

use crate::types::{FilterSelection, GrievanceRecord, RecordSet};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterStage {
    Year,
    Category,
    SubCategory,
    Ward,
}

impl FilterStage {
    pub const ALL: [FilterStage; 4] = [
        FilterStage::Year,
        FilterStage::Category,
        FilterStage::SubCategory,
        FilterStage::Ward,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterStage::Year => "Year",
            FilterStage::Category => "Category",
            FilterStage::SubCategory => "Sub-Category",
            FilterStage::Ward => "Ward",
        }
    }

    /// Stages that come after this one in the chain.
    pub fn downstream(self) -> impl Iterator<Item = FilterStage> {
        FilterStage::ALL.into_iter().filter(move |s| *s > self)
    }

    fn value_of(self, r: &GrievanceRecord) -> Option<OptionValue> {
        match self {
            FilterStage::Year => Some(OptionValue::Year(r.year)),
            FilterStage::Category => r.category.clone().map(OptionValue::Text),
            FilterStage::SubCategory => r.sub_category.clone().map(OptionValue::Text),
            FilterStage::Ward => r.ward_name.clone().map(OptionValue::Text),
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A selectable value. Within one stage every value has the same variant,
/// so the derived ordering is the field's natural ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionValue {
    Year(i32),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Year(y) => write!(f, "{y}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl FilterSelection {
    pub fn get(&self, stage: FilterStage) -> Option<OptionValue> {
        match stage {
            FilterStage::Year => self.year.map(OptionValue::Year),
            FilterStage::Category => self.category.clone().map(OptionValue::Text),
            FilterStage::SubCategory => self.sub_category.clone().map(OptionValue::Text),
            FilterStage::Ward => self.ward_name.clone().map(OptionValue::Text),
        }
    }

    pub fn set(&mut self, stage: FilterStage, value: Option<OptionValue>) {
        match stage {
            FilterStage::Year => {
                self.year = value.and_then(|v| match v {
                    OptionValue::Year(y) => Some(y),
                    OptionValue::Text(s) => s.parse().ok(),
                })
            }
            FilterStage::Category => self.category = value.map(|v| v.to_string()),
            FilterStage::SubCategory => self.sub_category = value.map(|v| v.to_string()),
            FilterStage::Ward => self.ward_name = value.map(|v| v.to_string()),
        }
    }

    /// Only the selections made strictly before `stage`.
    pub fn upstream_of(&self, stage: FilterStage) -> FilterSelection {
        let mut out = FilterSelection::default();
        for s in FilterStage::ALL.into_iter().filter(|s| *s < stage) {
            out.set(s, self.get(s));
        }
        out
    }
}

/// Sorted, distinct, non-null values of `stage`'s field among the records
/// that match every selection upstream of `stage`. Selections at or after
/// `stage` in `prior` are ignored.
pub fn available_options(
    records: &RecordSet,
    prior: &FilterSelection,
    stage: FilterStage,
) -> Vec<OptionValue> {
    let scope = prior.upstream_of(stage);
    let values: BTreeSet<OptionValue> = records
        .iter()
        .filter(|r| scope.matches(r))
        .filter_map(|r| stage.value_of(r))
        .collect();
    values.into_iter().collect()
}

/// Keep the records whose fields equal every set field of `selection`.
pub fn filter(records: &RecordSet, selection: &FilterSelection) -> RecordSet {
    records
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, year: i32, cat: Option<&str>, sub: Option<&str>, ward: Option<&str>) -> GrievanceRecord {
        GrievanceRecord {
            complaint_id: Some(id.to_string()),
            year,
            category: cat.map(String::from),
            sub_category: sub.map(String::from),
            ward_name: ward.map(String::from),
            extra: vec![],
        }
    }

    fn sample() -> RecordSet {
        RecordSet::new(vec![
            rec("1", 2024, Some("Roads"), Some("Potholes"), Some("Ward-2")),
            rec("2", 2024, Some("Roads"), Some("Footpath"), Some("Ward-1")),
            rec("3", 2024, Some("Garbage"), Some("Not Collected"), Some("Ward-1")),
            rec("4", 2024, None, Some("Potholes"), None),
            rec("5", 2025, Some("Electrical"), Some("Streetlight Out"), Some("Ward-3")),
            rec("6", 2025, Some("Roads"), Some("Potholes"), Some("Ward-3")),
        ])
    }

    fn texts(v: &[OptionValue]) -> Vec<String> {
        v.iter().map(|o| o.to_string()).collect()
    }

    #[test]
    fn year_options_ascending_and_distinct() {
        let opts = available_options(&sample(), &FilterSelection::default(), FilterStage::Year);
        assert_eq!(opts, vec![OptionValue::Year(2024), OptionValue::Year(2025)]);
    }

    #[test]
    fn category_options_drop_nulls_and_sort() {
        let sel = FilterSelection { year: Some(2024), ..Default::default() };
        let opts = available_options(&sample(), &sel, FilterStage::Category);
        assert_eq!(texts(&opts), vec!["Garbage", "Roads"]);
    }

    #[test]
    fn category_absent_in_other_year_is_not_offered() {
        let sel = FilterSelection { year: Some(2025), ..Default::default() };
        let opts = texts(&available_options(&sample(), &sel, FilterStage::Category));
        assert!(!opts.contains(&"Garbage".to_string()));
        assert_eq!(opts, vec!["Electrical", "Roads"]);
    }

    #[test]
    fn downstream_selections_do_not_constrain_options() {
        let sel = FilterSelection {
            year: Some(2024),
            category: Some("Roads".into()),
            sub_category: Some("Potholes".into()),
            ward_name: Some("Ward-2".into()),
        };
        let opts = texts(&available_options(&sample(), &sel, FilterStage::SubCategory));
        assert_eq!(opts, vec!["Footpath", "Potholes"]);
        let wards = texts(&available_options(&sample(), &sel, FilterStage::Ward));
        assert_eq!(wards, vec!["Ward-2"]);
    }

    #[test]
    fn no_matching_records_gives_no_options() {
        let sel = FilterSelection { year: Some(1999), ..Default::default() };
        assert!(available_options(&sample(), &sel, FilterStage::Category).is_empty());
    }

    #[test]
    fn filter_keeps_only_exact_matches() {
        let records = sample();
        let sel = FilterSelection {
            year: Some(2024),
            category: Some("Roads".into()),
            ..Default::default()
        };
        let out = filter(&records, &sel);
        assert!(out.len() <= records.len());
        let ids: Vec<_> = out.iter().filter_map(|r| r.complaint_id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(out.iter().all(|r| sel.matches(r)));
    }

    #[test]
    fn filter_is_idempotent() {
        let records = sample();
        let sel = FilterSelection {
            year: Some(2025),
            ward_name: Some("Ward-3".into()),
            ..Default::default()
        };
        let once = filter(&records, &sel);
        assert_eq!(filter(&once, &sel), once);
    }

    #[test]
    fn unmatched_selection_is_empty_not_error() {
        let sel = FilterSelection {
            year: Some(2025),
            category: Some("Garbage".into()),
            sub_category: Some("Not Collected".into()),
            ward_name: Some("Ward-1".into()),
        };
        assert!(filter(&sample(), &sel).is_empty());
    }

    #[test]
    fn upstream_of_drops_current_and_later_stages() {
        let sel = FilterSelection {
            year: Some(2024),
            category: Some("Roads".into()),
            sub_category: Some("Potholes".into()),
            ward_name: Some("Ward-2".into()),
        };
        let up = sel.upstream_of(FilterStage::SubCategory);
        assert_eq!(up.year, Some(2024));
        assert_eq!(up.category.as_deref(), Some("Roads"));
        assert_eq!(up.sub_category, None);
        assert_eq!(up.ward_name, None);
    }

    #[test]
    fn downstream_lists_later_stages_in_order() {
        let later: Vec<_> = FilterStage::Category.downstream().collect();
        assert_eq!(later, vec![FilterStage::SubCategory, FilterStage::Ward]);
        assert_eq!(FilterStage::Ward.downstream().count(), 0);
    }
}
