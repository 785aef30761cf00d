// src/schedule.rs

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::dates;
use crate::models::{PatientOption, Role, VisitType};

/* ============================================================
   Weekdays (canonical Monday-first ordering; the wire format
   wants the zero-based index as a decimal string)
   ============================================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Monday = 0 .. Sunday = 6.
    pub fn index(self) -> u8 {
        Weekday::ALL.iter().position(|day| *day == self).unwrap_or(0) as u8
    }

    pub fn from_name(name: &str) -> Option<Weekday> {
        let trimmed = name.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(trimmed))
    }

    pub fn from_index(index: u8) -> Option<Weekday> {
        Weekday::ALL.get(index as usize).copied()
    }
}

/* ============================================================
   Form state
   ============================================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentMode {
    /// Use the patient's pre-assigned staff member.
    #[default]
    Primary,
    /// Pick a named staff member with explicit time slot(s).
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleShape {
    /// Follows the primary schedule's days.
    #[default]
    Same,
    /// Role declares its own recurrence rows.
    Custom,
}

impl ScheduleShape {
    fn tag(self) -> &'static str {
        match self {
            ScheduleShape::Same => "same",
            ScheduleShape::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeSlot {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeSlot {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// One weekday + time-range entry of a recurring schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRow {
    pub day: Weekday,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl RecurrenceRow {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleAssignment {
    pub mode: AssignmentMode,
    pub name: String,
    /// Custom slot for a non-recurring appointment.
    pub slot: TimeSlot,
    /// Custom rows for a recurring appointment (when `shape` is Custom).
    pub rows: Vec<RecurrenceRow>,
    pub shape: ScheduleShape,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressInput {
    pub address: String,
    pub lat: String,
    pub lng: String,
}

/// One create/edit form session. Collects operator input; `build_payload`
/// validates and derives the normalized request body.
#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    pub patient: Option<PatientOption>,
    pub visit_type: Option<VisitType>,
    pub is_recurring: bool,

    // non-recurring
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,

    // recurring
    pub recurring_start_date: Option<NaiveDate>,
    pub recurring_end_date: Option<NaiveDate>,
    pub recurrence_rows: Vec<RecurrenceRow>,

    pub nurse: RoleAssignment,
    pub doctor: RoleAssignment,
    pub social_worker: RoleAssignment,
    pub driver: RoleAssignment,

    pub address: Option<AddressInput>,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl AppointmentForm {
    pub fn assignment(&self, role: Role) -> &RoleAssignment {
        match role {
            Role::Nurse => &self.nurse,
            Role::Doctor => &self.doctor,
            Role::SocialWorker => &self.social_worker,
            Role::Driver => &self.driver,
        }
    }

    pub fn assignment_mut(&mut self, role: Role) -> &mut RoleAssignment {
        match role {
            Role::Nurse => &mut self.nurse,
            Role::Doctor => &mut self.doctor,
            Role::SocialWorker => &mut self.social_worker,
            Role::Driver => &mut self.driver,
        }
    }

    /// All currently-failing validation messages. Submission is permitted
    /// only when this is empty; every failure surfaces simultaneously.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.patient.is_none() {
            errors.push(FieldError::new("patient", "Patient is required."));
        }
        if self.visit_type.is_none() {
            errors.push(FieldError::new("visit_type", "Visit type is required."));
        }

        if self.is_recurring {
            if self.recurring_start_date.is_none() {
                errors.push(FieldError::new("start_date", "Start date is required."));
            }
            if self.recurrence_rows.iter().any(|row| !row.is_complete()) {
                errors.push(FieldError::new(
                    "recurrence_rows",
                    "Each recurring day needs a start and end time.",
                ));
            }
        } else {
            if self.date.is_none() {
                errors.push(FieldError::new("date", "Date is required."));
            }
            if self.start_time.is_none() {
                errors.push(FieldError::new("start_time", "Start time is required."));
            }
            if self.end_time.is_none() {
                errors.push(FieldError::new("end_time", "End time is required."));
            }
        }

        for role in Role::ALL {
            let assignment = self.assignment(role);
            if assignment.mode != AssignmentMode::Custom {
                continue;
            }
            let complete = if self.is_recurring {
                match assignment.shape {
                    // follows the primary days, no slots of its own
                    ScheduleShape::Same => true,
                    ScheduleShape::Custom => {
                        !assignment.rows.is_empty()
                            && assignment.rows.iter().all(RecurrenceRow::is_complete)
                    }
                }
            } else {
                assignment.slot.is_complete()
            };
            if !complete {
                errors.push(FieldError::new(
                    role.key(),
                    format!("{} start and end time are required.", role.label()),
                ));
            }
        }

        errors
    }

    /// Derive the normalized request payload. Fails with the full list of
    /// field errors when validation does not pass.
    pub fn build_payload(&self) -> Result<AppointmentPayload, Vec<FieldError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let (Some(patient), Some(visit_type)) = (&self.patient, &self.visit_type) else {
            return Err(errors);
        };

        let mut payload = AppointmentPayload {
            patient_id: patient.id.clone(),
            visit_type_id: visit_type.id.clone(),
            is_recurring: if self.is_recurring { "1" } else { "0" }.to_string(),
            instructions: self.instructions.clone(),
            new_address: self.address.as_ref().map(|input| NewAddressPayload {
                address: input.address.clone(),
                lat: input.lat.clone(),
                lng: input.lng.clone(),
            }),
            ..AppointmentPayload::default()
        };

        if self.is_recurring {
            payload.start_date = self.recurring_start_date.map(dates::to_iso_date);
            payload.end_date = self.recurring_end_date.map(dates::to_iso_date);
            payload.appointments = recurring_slots(&self.recurrence_rows);
        } else {
            payload.date = self.date.map(dates::to_iso_date);
            payload.start_time = self.start_time.map(dates::format_clock);
            payload.end_time = self.end_time.map(dates::format_clock);
        }

        let mut slots: BTreeMap<String, SlotPayload> = BTreeMap::new();
        let mut recurring: BTreeMap<String, Vec<RecurringSlotPayload>> = BTreeMap::new();

        for role in Role::ALL {
            let assignment = self.assignment(role);
            let (main, id, name, schedule_type) = payload.role_fields_mut(role);
            match assignment.mode {
                AssignmentMode::Primary => {
                    *main = "1".to_string();
                    *id = patient.primary_staff_id(role).to_string();
                    *schedule_type = ScheduleShape::Same.tag().to_string();
                }
                AssignmentMode::Custom => {
                    *main = "0".to_string();
                    *name = Some(assignment.name.trim().to_string());
                    if self.is_recurring {
                        *schedule_type = assignment.shape.tag().to_string();
                        let rows = match assignment.shape {
                            ScheduleShape::Same => &self.recurrence_rows,
                            ScheduleShape::Custom => &assignment.rows,
                        };
                        recurring.insert(role.key().to_string(), recurring_slots(rows));
                    } else {
                        *schedule_type = ScheduleShape::Same.tag().to_string();
                        if let (Some(start), Some(end)) =
                            (assignment.slot.start, assignment.slot.end)
                        {
                            slots.insert(
                                role.key().to_string(),
                                SlotPayload {
                                    start_time: dates::format_clock(start),
                                    end_time: dates::format_clock(end),
                                },
                            );
                        }
                    }
                }
            }
        }

        // Roles left at primary contribute nothing here; the keys are
        // absent entirely when no role is custom.
        if !slots.is_empty() {
            payload.employee_slots = Some(slots);
        }
        if !recurring.is_empty() {
            payload.employee_recurring_slots = Some(recurring);
        }

        Ok(payload)
    }
}

fn recurring_slots(rows: &[RecurrenceRow]) -> Vec<RecurringSlotPayload> {
    rows.iter()
        .filter_map(|row| {
            let (start, end) = (row.start?, row.end?);
            Some(RecurringSlotPayload {
                day: row.day.index().to_string(),
                start_time: dates::format_clock(start),
                end_time: dates::format_clock(end),
            })
        })
        .collect()
}

/* ============================================================
   Wire payload
   ============================================================ */

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotPayload {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecurringSlotPayload {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAddressPayload {
    pub address: String,
    pub lat: String,
    pub lng: String,
}

/// Create/update request body. String-typed throughout to match the wire
/// format; absent optional keys are omitted, not nulled.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AppointmentPayload {
    pub patient_id: String,
    pub visit_type_id: String,
    pub is_recurring: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_address: Option<NewAddressPayload>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub appointments: Vec<RecurringSlotPayload>,

    pub main_nurse: String,
    pub nurse_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse_name: Option<String>,
    pub nurse_schedule_type: String,

    pub main_doctor: String,
    pub doctor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    pub doctor_schedule_type: String,

    pub main_social_worker: String,
    pub social_worker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_worker_name: Option<String>,
    pub social_worker_schedule_type: String,

    pub main_driver: String,
    pub driver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub driver_schedule_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_slots: Option<BTreeMap<String, SlotPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_recurring_slots: Option<BTreeMap<String, Vec<RecurringSlotPayload>>>,

    pub instructions: String,
}

impl AppointmentPayload {
    #[allow(clippy::type_complexity)]
    fn role_fields_mut(
        &mut self,
        role: Role,
    ) -> (&mut String, &mut String, &mut Option<String>, &mut String) {
        match role {
            Role::Nurse => (
                &mut self.main_nurse,
                &mut self.nurse_id,
                &mut self.nurse_name,
                &mut self.nurse_schedule_type,
            ),
            Role::Doctor => (
                &mut self.main_doctor,
                &mut self.doctor_id,
                &mut self.doctor_name,
                &mut self.doctor_schedule_type,
            ),
            Role::SocialWorker => (
                &mut self.main_social_worker,
                &mut self.social_worker_id,
                &mut self.social_worker_name,
                &mut self.social_worker_schedule_type,
            ),
            Role::Driver => (
                &mut self.main_driver,
                &mut self.driver_id,
                &mut self.driver_name,
                &mut self.driver_schedule_type,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn base_form() -> AppointmentForm {
        AppointmentForm {
            patient: Some(PatientOption {
                id: "3".into(),
                name: "Test Patient".into(),
                primary_nurse_id: Some("4".into()),
                ..PatientOption::default()
            }),
            visit_type: Some(VisitType {
                id: "2".into(),
                name: "Initial Visit".into(),
                providers: vec!["nurses".into(), "doctors".into()],
            }),
            date: NaiveDate::from_ymd_opt(2026, 1, 31),
            start_time: Some(time(4, 2)),
            end_time: Some(time(6, 2)),
            ..AppointmentForm::default()
        }
    }

    #[test]
    fn weekday_index_round_trips_for_all_seven_names() {
        assert_eq!(Weekday::from_name("Monday").unwrap().index(), 0);
        assert_eq!(Weekday::from_name("Friday").unwrap().index(), 4);
        for day in Weekday::ALL {
            let index = day.index();
            assert_eq!(Weekday::from_index(index), Some(day));
            assert_eq!(Weekday::from_name(day.name()), Some(day));
        }
        assert_eq!(Weekday::from_name("Noneday"), None);
    }

    #[test]
    fn empty_form_reports_every_missing_field_at_once() {
        let errors = AppointmentForm::default().validate();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Patient is required."));
        assert!(messages.contains(&"Visit type is required."));
        assert!(messages.contains(&"Date is required."));
        assert!(messages.contains(&"Start time is required."));
        assert!(messages.contains(&"End time is required."));
    }

    #[test]
    fn primary_assignments_emit_no_employee_slots() {
        let payload = base_form().build_payload().unwrap();

        assert_eq!(payload.patient_id, "3");
        assert_eq!(payload.visit_type_id, "2");
        assert_eq!(payload.is_recurring, "0");
        assert_eq!(payload.date.as_deref(), Some("2026-01-31"));
        assert_eq!(payload.start_time.as_deref(), Some("04:02"));
        assert_eq!(payload.end_time.as_deref(), Some("06:02"));
        assert_eq!(payload.main_nurse, "1");
        assert_eq!(payload.nurse_id, "4");
        assert_eq!(payload.main_doctor, "1");
        assert_eq!(payload.doctor_id, "");
        assert_eq!(payload.main_social_worker, "1");
        assert!(payload.employee_slots.is_none());
        assert!(payload.employee_recurring_slots.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("employee_slots").is_none());
        assert!(json.get("employee_recurring_slots").is_none());
        assert!(json.get("start_date").is_none());
    }

    #[test]
    fn custom_nurse_emits_slot_for_non_recurring_schedule() {
        let mut form = base_form();
        form.nurse = RoleAssignment {
            mode: AssignmentMode::Custom,
            name: "Nurse A".into(),
            slot: TimeSlot {
                start: Some(time(4, 0)),
                end: Some(time(5, 0)),
            },
            ..RoleAssignment::default()
        };

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.main_nurse, "0");
        assert_eq!(payload.nurse_name.as_deref(), Some("Nurse A"));
        let slots = payload.employee_slots.as_ref().unwrap();
        assert_eq!(
            slots.get("nurse"),
            Some(&SlotPayload {
                start_time: "04:00".into(),
                end_time: "05:00".into(),
            })
        );
        assert!(slots.get("doctor").is_none());
    }

    #[test]
    fn custom_nurse_without_times_blocks_submission() {
        let mut form = base_form();
        form.nurse.mode = AssignmentMode::Custom;
        form.nurse.name = "Nurse A".into();

        let errors = form.build_payload().unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.message == "Nurse start and end time are required.")
        );
    }

    #[test]
    fn custom_social_worker_message_uses_sentence_case_label() {
        let mut form = base_form();
        form.is_recurring = true;
        form.recurring_start_date = NaiveDate::from_ymd_opt(2026, 1, 31);
        form.recurrence_rows = vec![RecurrenceRow {
            day: Weekday::Monday,
            start: Some(time(7, 0)),
            end: Some(time(8, 0)),
        }];
        form.social_worker = RoleAssignment {
            mode: AssignmentMode::Custom,
            name: "Social Worker A".into(),
            shape: ScheduleShape::Custom,
            rows: vec![RecurrenceRow {
                day: Weekday::Monday,
                start: Some(time(8, 0)),
                end: None,
            }],
            ..RoleAssignment::default()
        };

        let errors = form.build_payload().unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.message == "Social worker start and end time are required.")
        );
    }

    #[test]
    fn recurring_custom_doctor_emits_day_indexed_rows() {
        let mut form = base_form();
        form.is_recurring = true;
        form.recurring_start_date = NaiveDate::from_ymd_opt(2026, 1, 31);
        form.recurring_end_date = NaiveDate::from_ymd_opt(2027, 1, 31);
        form.recurrence_rows = vec![RecurrenceRow {
            day: Weekday::Monday,
            start: Some(time(7, 0)),
            end: Some(time(8, 0)),
        }];
        form.doctor = RoleAssignment {
            mode: AssignmentMode::Custom,
            name: "Doctor A".into(),
            shape: ScheduleShape::Custom,
            rows: vec![
                RecurrenceRow {
                    day: Weekday::Monday,
                    start: Some(time(8, 0)),
                    end: Some(time(9, 0)),
                },
                RecurrenceRow {
                    day: Weekday::Wednesday,
                    start: Some(time(10, 0)),
                    end: Some(time(11, 0)),
                },
            ],
            ..RoleAssignment::default()
        };

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.is_recurring, "1");
        assert_eq!(payload.start_date.as_deref(), Some("2026-01-31"));
        assert_eq!(payload.end_date.as_deref(), Some("2027-01-31"));
        assert_eq!(payload.appointments.len(), 1);
        assert_eq!(payload.appointments[0].day, "0");
        assert_eq!(payload.main_doctor, "0");
        assert_eq!(payload.doctor_schedule_type, "custom");

        let recurring = payload.employee_recurring_slots.as_ref().unwrap();
        assert_eq!(
            recurring.get("doctor"),
            Some(&vec![
                RecurringSlotPayload {
                    day: "0".into(),
                    start_time: "08:00".into(),
                    end_time: "09:00".into(),
                },
                RecurringSlotPayload {
                    day: "2".into(),
                    start_time: "10:00".into(),
                    end_time: "11:00".into(),
                },
            ])
        );
        assert!(payload.employee_slots.is_none());
    }

    #[test]
    fn recurring_custom_same_shape_mirrors_primary_days() {
        let mut form = base_form();
        form.is_recurring = true;
        form.recurring_start_date = NaiveDate::from_ymd_opt(2026, 2, 12);
        form.recurrence_rows = vec![
            RecurrenceRow {
                day: Weekday::Monday,
                start: Some(time(2, 50)),
                end: Some(time(4, 50)),
            },
            RecurrenceRow {
                day: Weekday::Friday,
                start: Some(time(2, 50)),
                end: Some(time(4, 50)),
            },
        ];
        form.nurse = RoleAssignment {
            mode: AssignmentMode::Custom,
            name: "Nurse A".into(),
            shape: ScheduleShape::Same,
            ..RoleAssignment::default()
        };

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.nurse_schedule_type, "same");
        let recurring = payload.employee_recurring_slots.as_ref().unwrap();
        let nurse_rows = recurring.get("nurse").unwrap();
        assert_eq!(nurse_rows.len(), 2);
        assert_eq!(nurse_rows[0].day, "0");
        assert_eq!(nurse_rows[1].day, "4");
    }

    #[test]
    fn recurring_row_without_times_blocks_submission() {
        let mut form = base_form();
        form.is_recurring = true;
        form.recurring_start_date = NaiveDate::from_ymd_opt(2026, 1, 31);
        form.recurrence_rows = vec![RecurrenceRow {
            day: Weekday::Tuesday,
            start: Some(time(7, 0)),
            end: None,
        }];

        let errors = form.build_payload().unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.message == "Each recurring day needs a start and end time.")
        );
    }

    #[test]
    fn address_and_instructions_pass_through() {
        let mut form = base_form();
        form.address = Some(AddressInput {
            address: "PM7G+C4F, Al Olaya, Riyadh 12251, Saudi Arabia".into(),
            lat: "24.7135517".into(),
            lng: "46.6752957".into(),
        });
        form.instructions = "Ring twice.".into();

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.instructions, "Ring twice.");
        assert_eq!(
            payload.new_address.as_ref().map(|a| a.lat.as_str()),
            Some("24.7135517")
        );
    }
}
