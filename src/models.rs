// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates;

/* ============================================================
   Staff roles
   ============================================================ */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Nurse,
    Doctor,
    SocialWorker,
    Driver,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Nurse, Role::Doctor, Role::SocialWorker, Role::Driver];

    /// Wire key, used in payload field names and the staff search filter.
    pub fn key(self) -> &'static str {
        match self {
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
            Role::SocialWorker => "social_worker",
            Role::Driver => "driver",
        }
    }

    /// Sentence-case label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Role::Nurse => "Nurse",
            Role::Doctor => "Doctor",
            Role::SocialWorker => "Social worker",
            Role::Driver => "Driver",
        }
    }
}

/* ============================================================
   Domain entities
   ============================================================ */

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRef {
    pub id: i64,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient: PatientRef,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    /// Denormalized mirror of `status` some list endpoints carry.
    pub state: Option<String>,
    pub nurse: StaffRef,
    pub doctor: StaffRef,
    pub social_worker: Option<StaffRef>,
    pub visit_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub id: i64,
    pub appointment_id: i64,
    pub employee_id: i64,
    pub confirmed_by: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub appointment: Appointment,
    pub confirmations: Vec<Confirmation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentsPage {
    pub appointments: Vec<Appointment>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub has_more_pages: bool,
}

/// Patient autocomplete candidate, carrying the pre-assigned staff ids the
/// primary assignment mode resolves against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientOption {
    pub id: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub mobile: Option<String>,
    pub primary_nurse_id: Option<String>,
    pub primary_doctor_id: Option<String>,
    pub primary_social_worker_id: Option<String>,
    pub primary_driver_id: Option<String>,
}

impl PatientOption {
    /// Pre-assigned staff id for a role, empty string when the patient has
    /// none (the wire format expects `<role>_id: ""` in that case).
    pub fn primary_staff_id(&self, role: Role) -> &str {
        let id = match role {
            Role::Nurse => &self.primary_nurse_id,
            Role::Doctor => &self.primary_doctor_id,
            Role::SocialWorker => &self.primary_social_worker_id,
            Role::Driver => &self.primary_driver_id,
        };
        id.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitType {
    pub id: String,
    pub name: String,
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub employee: String,
    pub patient: String,
    pub action: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Dashboard card counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardsSummary {
    pub total: u64,
    pub by_status: Vec<StatusCount>,
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
}

/* ============================================================
   Record parsing

   One strict parser per entity instead of optional-field
   coalescing scattered through response mappers. Malformed
   upstream data is an explicit, testable case.
   ============================================================ */

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid field `{0}`: {1}")]
    InvalidField(&'static str, String),
}

fn string_field(value: &Value, field: &'static str) -> Result<String, RecordError> {
    match value.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Null) | None => Err(RecordError::MissingField(field)),
        Some(other) => Err(RecordError::InvalidField(field, other.to_string())),
    }
}

fn optional_string(value: &Value, field: &str) -> Option<String> {
    match value.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric id, accepting a number or a numeric string.
fn id_field(value: &Value, field: &'static str) -> Result<i64, RecordError> {
    match value.get(field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .filter(|id| *id > 0)
            .ok_or_else(|| RecordError::InvalidField(field, n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| RecordError::InvalidField(field, s.clone())),
        Some(Value::Null) | None => Err(RecordError::MissingField(field)),
        Some(other) => Err(RecordError::InvalidField(field, other.to_string())),
    }
}

fn count_field(value: &Value, field: &str) -> u64 {
    match value.get(field) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn parse_staff(value: &Value, field: &'static str) -> Result<StaffRef, RecordError> {
    let nested = value.get(field).ok_or(RecordError::MissingField(field))?;
    if !nested.is_object() {
        return Err(RecordError::InvalidField(field, nested.to_string()));
    }
    Ok(StaffRef {
        id: id_field(nested, "id")?,
        name: string_field(nested, "name")?,
    })
}

pub fn parse_appointment(value: &Value) -> Result<Appointment, RecordError> {
    let patient_value = value
        .get("patient")
        .filter(|v| v.is_object())
        .ok_or(RecordError::MissingField("patient"))?;
    let patient = PatientRef {
        id: id_field(patient_value, "id")?,
        name: string_field(patient_value, "name")?,
        date_of_birth: optional_string(patient_value, "date_of_birth"),
        phone: optional_string(patient_value, "phone"),
    };

    let date = {
        let raw = string_field(value, "date")?;
        let normalized = dates::normalize_date_string(&raw);
        if normalized.is_empty() {
            return Err(RecordError::InvalidField("date", raw));
        }
        normalized
    };

    let clock = |field: &'static str| -> Result<String, RecordError> {
        let raw = string_field(value, field)?;
        dates::normalize_time_input(&raw).ok_or(RecordError::InvalidField(field, raw))
    };

    let social_worker = match value.get("social_worker") {
        Some(Value::Null) | None => None,
        Some(_) => Some(parse_staff(value, "social_worker")?),
    };

    Ok(Appointment {
        id: id_field(value, "id")?,
        patient,
        date,
        start_time: clock("start_time")?,
        end_time: clock("end_time")?,
        status: string_field(value, "status")?,
        state: optional_string(value, "state"),
        nurse: parse_staff(value, "nurse")?,
        doctor: parse_staff(value, "doctor")?,
        social_worker,
        visit_type: string_field(value, "visit_type")?,
    })
}

pub fn parse_appointment_details(value: &Value) -> Result<AppointmentDetails, RecordError> {
    let appointment = parse_appointment(value)?;
    let mut confirmations = Vec::new();
    if let Some(Value::Array(items)) = value.get("confirmation") {
        for item in items {
            confirmations.push(Confirmation {
                id: id_field(item, "id")?,
                appointment_id: id_field(item, "appointment_id")?,
                employee_id: id_field(item, "employee_id")?,
                confirmed_by: id_field(item, "confirmed_by")?,
                created_at: string_field(item, "created_at").unwrap_or_default(),
            });
        }
    }
    Ok(AppointmentDetails {
        appointment,
        confirmations,
    })
}

pub fn parse_status_option(value: &Value) -> Result<crate::status::StatusOption, RecordError> {
    let level = match value.get("level") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(1).min(u8::MAX as u64) as u8,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1),
        _ => 1,
    };
    let is_final = matches!(value.get("is_final"), Some(Value::Bool(true)));
    Ok(crate::status::StatusOption {
        key: string_field(value, "key")?,
        value: string_field(value, "value")?,
        level,
        is_final,
    })
}

/// Employees arrive with either `id`/`name` or `employee_id`/`full_name`.
pub fn parse_employee_option(value: &Value) -> Result<EmployeeOption, RecordError> {
    let id = id_field(value, "id").or_else(|_| id_field(value, "employee_id"))?;
    let name = string_field(value, "name")
        .or_else(|_| string_field(value, "full_name"))
        .map_err(|_| RecordError::MissingField("name"))?;
    Ok(EmployeeOption { id, name })
}

pub fn parse_patient_option(value: &Value) -> Result<PatientOption, RecordError> {
    // Primary staff ids come flat (`primary_nurse_id`) or nested
    // (`primary_nurse: {id}`), flat winning.
    let primary_id = |flat: &str, nested: &str| -> Option<String> {
        optional_string(value, flat)
            .or_else(|| value.get(nested).and_then(|staff| optional_string(staff, "id")))
    };

    Ok(PatientOption {
        id: optional_string(value, "id").ok_or(RecordError::MissingField("id"))?,
        name: string_field(value, "name")?,
        date_of_birth: optional_string(value, "date_of_birth"),
        mobile: optional_string(value, "mobile"),
        primary_nurse_id: primary_id("primary_nurse_id", "primary_nurse"),
        primary_doctor_id: primary_id("primary_doctor_id", "primary_doctor"),
        primary_social_worker_id: primary_id("primary_social_worker_id", "primary_social_worker"),
        primary_driver_id: primary_id("primary_driver_id", "primary_driver"),
    })
}

pub fn parse_area(value: &Value) -> Result<AreaOption, RecordError> {
    Ok(AreaOption {
        id: optional_string(value, "id").ok_or(RecordError::MissingField("id"))?,
        name: string_field(value, "name")?,
    })
}

pub fn parse_visit_type(value: &Value) -> Result<VisitType, RecordError> {
    let providers = match value.get("providers") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    Ok(VisitType {
        id: optional_string(value, "id").ok_or(RecordError::MissingField("id"))?,
        name: string_field(value, "name")?,
        providers,
    })
}

pub fn parse_log_entry(value: &Value) -> Result<LogEntry, RecordError> {
    Ok(LogEntry {
        employee: string_field(value, "employee")?,
        patient: string_field(value, "patient")?,
        action: string_field(value, "action")?,
        time: string_field(value, "time")?,
    })
}

pub fn parse_cards_summary(value: &Value) -> Result<CardsSummary, RecordError> {
    let mut by_status = Vec::new();
    if let Some(Value::Array(items)) = value.get("by_status") {
        for item in items {
            by_status.push(StatusCount {
                status: string_field(item, "status")?,
                count: count_field(item, "count"),
            });
        }
    }
    let periods = value.get("periods").cloned().unwrap_or(Value::Null);
    Ok(CardsSummary {
        total: count_field(value, "total"),
        by_status,
        today: count_field(&periods, "today"),
        this_week: count_field(&periods, "this_week"),
        this_month: count_field(&periods, "this_month"),
    })
}

/// Pagination envelope around the appointment list. The envelope itself is
/// lenient (camelCase and snake_case both appear upstream); the records are
/// parsed strictly and invalid ones reported to the caller.
pub fn parse_appointments_page(value: &Value, records: Vec<Appointment>) -> AppointmentsPage {
    let either = |a: &str, b: &str| -> u64 {
        let count = count_field(value, a);
        if count > 0 { count } else { count_field(value, b) }
    };
    let has_more = matches!(value.get("hasMorePages"), Some(Value::Bool(true)))
        || matches!(value.get("has_more_pages"), Some(Value::Bool(true)));
    AppointmentsPage {
        appointments: records,
        total: either("total", "total_count"),
        per_page: either("perPage", "per_page"),
        current_page: either("currentPage", "current_page").max(1),
        has_more_pages: has_more,
    }
}
