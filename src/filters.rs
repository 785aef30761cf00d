// src/filters.rs

use chrono::NaiveDate;

use crate::dates;
use crate::models::{EmployeeOption, PatientOption, VisitType};

/// Filter state for the paginated appointment list. One instance lives per
/// page session; `query_pairs` derives the request parameters, emitting only
/// the filters actually set.
#[derive(Debug, Clone)]
pub struct ListFilters {
    pub page: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub employee: Option<EmployeeOption>,
    pub patient: Option<PatientOption>,
    pub visit_type: Option<VisitType>,
    /// Status/state filter as a normalized status key.
    pub state: Option<String>,
    /// Quick filter from the status tag chips.
    pub status_tag: Option<String>,
}

impl Default for ListFilters {
    fn default() -> Self {
        Self {
            page: 1,
            start: None,
            end: None,
            employee: None,
            patient: None,
            visit_type: None,
            state: None,
            status_tag: None,
        }
    }
}

impl ListFilters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Constrain the date range to the Monday-based week around `today`.
    pub fn set_this_week(&mut self, today: NaiveDate) {
        self.start = Some(dates::start_of_week_monday(today));
        self.end = Some(dates::end_of_week_monday(today));
    }

    pub fn set_this_month(&mut self, today: NaiveDate) {
        self.start = Some(dates::start_of_month(today));
        self.end = Some(dates::end_of_month(today));
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.max(1).to_string())];
        if let Some(start) = self.start {
            pairs.push(("start", dates::to_iso_date(start)));
        }
        if let Some(end) = self.end {
            pairs.push(("end", dates::to_iso_date(end)));
        }
        if let Some(status) = &self.status_tag
            && !status.trim().is_empty()
        {
            pairs.push(("status", status.trim().to_string()));
        }
        if let Some(employee) = &self.employee {
            pairs.push(("employee", employee.id.to_string()));
        }
        if let Some(patient) = &self.patient {
            pairs.push(("patient_id", patient.id.clone()));
        }
        if let Some(visit_type) = &self.visit_type {
            pairs.push(("visit_type_id", visit_type.id.clone()));
        }
        if let Some(state) = &self.state
            && !state.trim().is_empty()
        {
            pairs.push(("state", state.trim().to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_emits_only_the_page() {
        let filters = ListFilters::default();
        assert_eq!(filters.query_pairs(), vec![("page", "1".to_string())]);
    }

    #[test]
    fn set_filters_emit_their_pairs() {
        let mut filters = ListFilters::default();
        filters.page = 3;
        filters.start = NaiveDate::from_ymd_opt(2026, 2, 1);
        filters.end = NaiveDate::from_ymd_opt(2026, 2, 28);
        filters.employee = Some(EmployeeOption {
            id: 7,
            name: "Nurse A".into(),
        });
        filters.patient = Some(PatientOption {
            id: "3".into(),
            name: "Test Patient".into(),
            ..PatientOption::default()
        });
        filters.state = Some("confirmed".into());
        filters.status_tag = Some("new".into());

        let pairs = filters.query_pairs();
        assert!(pairs.contains(&("page", "3".to_string())));
        assert!(pairs.contains(&("start", "2026-02-01".to_string())));
        assert!(pairs.contains(&("end", "2026-02-28".to_string())));
        assert!(pairs.contains(&("employee", "7".to_string())));
        assert!(pairs.contains(&("patient_id", "3".to_string())));
        assert!(pairs.contains(&("status", "new".to_string())));
        assert!(pairs.contains(&("state", "confirmed".to_string())));
    }

    #[test]
    fn blank_state_filter_is_skipped() {
        let mut filters = ListFilters::default();
        filters.state = Some("   ".into());
        assert_eq!(filters.query_pairs(), vec![("page", "1".to_string())]);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut filters = ListFilters::default();
        filters.page = 9;
        filters.state = Some("confirmed".into());
        filters.reset();
        assert_eq!(filters.page, 1);
        assert!(filters.state.is_none());
    }

    #[test]
    fn week_preset_uses_monday_bounds() {
        let mut filters = ListFilters::default();
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        filters.set_this_week(sunday);
        assert_eq!(filters.start, NaiveDate::from_ymd_opt(2026, 2, 9));
        assert_eq!(filters.end, NaiveDate::from_ymd_opt(2026, 2, 15));
    }
}
