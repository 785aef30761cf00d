// src/client/mod.rs

pub mod response;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use crate::debounce::SuggestionFetcher;
use crate::error::ClientError;
use crate::filters::ListFilters;
use crate::models::{
    self, AppointmentDetails, AppointmentsPage, AreaOption, CardsSummary, EmployeeOption,
    LogEntry, PatientOption, RecordError, Role, VisitType,
};
use crate::schedule::AppointmentPayload;
use crate::status::StatusCatalog;

const APPOINTMENTS_PATH: &str = "/api/scheduler/appointments";

/// Only attach the bearer header when a real token is configured; "-" is
/// the unconfigured placeholder.
fn attach_token(token: &str) -> bool {
    !token.is_empty() && token != "-"
}

/// Client for the scheduling backend. The backend itself is opaque; this
/// wraps the request/response contracts the panel consumes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut builder = self.http.request(method, url);
        if attach_token(&self.token) {
            builder = builder.bearer_auth(&self.token);
        }
        builder
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::json_body(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::json_body(response).await
    }

    /// Parse a collection of records, skipping (and logging) invalid ones
    /// rather than failing the whole response.
    fn parse_collection<T>(
        value: &Value,
        what: &'static str,
        parse: fn(&Value) -> Result<T, RecordError>,
    ) -> Vec<T> {
        response::collection(value)
            .iter()
            .filter_map(|item| match parse(item) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    tracing::warn!("skipping invalid {what} record: {err}");
                    None
                }
            })
            .collect()
    }

    /* --------------------------------------------------------
       Appointment list & detail
    ---------------------------------------------------------*/

    pub async fn list_appointments(
        &self,
        filters: &ListFilters,
    ) -> Result<AppointmentsPage, ClientError> {
        let body = self
            .get_json(APPOINTMENTS_PATH, &filters.query_pairs())
            .await?;
        let records = Self::parse_collection(&body, "appointment", models::parse_appointment);
        Ok(models::parse_appointments_page(&body, records))
    }

    pub async fn fetch_appointment_details(
        &self,
        appointment_id: i64,
    ) -> Result<AppointmentDetails, ClientError> {
        let body = self
            .get_json(&format!("{APPOINTMENTS_PATH}/{appointment_id}"), &[])
            .await?;
        Ok(models::parse_appointment_details(response::record(&body))?)
    }

    pub async fn fetch_appointment_log(
        &self,
        appointment_id: i64,
    ) -> Result<Vec<LogEntry>, ClientError> {
        let body = self
            .get_json(&format!("{APPOINTMENTS_PATH}/{appointment_id}/log"), &[])
            .await?;
        Ok(Self::parse_collection(&body, "log", models::parse_log_entry))
    }

    /* --------------------------------------------------------
       Option catalogs
    ---------------------------------------------------------*/

    /// Authoritative status catalog; callers fall back to the built-in
    /// table when this is empty or inconsistent (the catalog merge in
    /// `StatusCatalog` handles the inconsistent case).
    pub async fn fetch_statuses(&self) -> Result<StatusCatalog, ClientError> {
        let body = self
            .get_json(&format!("{APPOINTMENTS_PATH}/statuses"), &[])
            .await?;
        let options = Self::parse_collection(&body, "status option", models::parse_status_option);
        Ok(StatusCatalog::new(options))
    }

    pub async fn fetch_cards(&self) -> Result<CardsSummary, ClientError> {
        let body = self
            .get_json(&format!("{APPOINTMENTS_PATH}/cards"), &[])
            .await?;
        Ok(models::parse_cards_summary(response::record(&body))?)
    }

    pub async fn fetch_areas(&self) -> Result<Vec<AreaOption>, ClientError> {
        let body = self.get_json("/areas", &[]).await?;
        Ok(Self::parse_collection(&body, "area", models::parse_area))
    }

    pub async fn fetch_visit_types(&self) -> Result<Vec<VisitType>, ClientError> {
        let body = self.get_json("/visit-types", &[]).await?;
        Ok(Self::parse_collection(&body, "visit type", models::parse_visit_type))
    }

    /* --------------------------------------------------------
       Mutations — awaited by the caller, which refetches the
       list only on success.
    ---------------------------------------------------------*/

    pub async fn create_appointment(&self, payload: &AppointmentPayload) -> Result<(), ClientError> {
        let body = serde_json::to_value(payload)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        self.post_json(APPOINTMENTS_PATH, &body).await?;
        Ok(())
    }

    /// Updates carry the operator's justification alongside the payload.
    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        payload: &AppointmentPayload,
        reason: &str,
    ) -> Result<(), ClientError> {
        let mut body = serde_json::to_value(payload)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        if let Some(map) = body.as_object_mut() {
            map.insert("reason".to_string(), Value::String(reason.to_string()));
        }
        self.post_json(&format!("{APPOINTMENTS_PATH}/{appointment_id}"), &body)
            .await?;
        Ok(())
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: i64,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        let body = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };
        self.post_json(&format!("{APPOINTMENTS_PATH}/{appointment_id}/cancel"), &body)
            .await?;
        Ok(())
    }

    pub async fn confirm_appointment(
        &self,
        appointment_id: i64,
        employee_id: Option<i64>,
    ) -> Result<(), ClientError> {
        let body = match employee_id {
            Some(id) => json!({ "employee_id": id }),
            None => json!({}),
        };
        self.post_json(&format!("{APPOINTMENTS_PATH}/{appointment_id}/confirm"), &body)
            .await?;
        Ok(())
    }

    pub async fn quick_no_show(&self, appointment_id: i64) -> Result<(), ClientError> {
        self.post_json(
            &format!("{APPOINTMENTS_PATH}/{appointment_id}/no-show"),
            &json!({}),
        )
        .await?;
        Ok(())
    }

    /* --------------------------------------------------------
       Autocomplete lookups
    ---------------------------------------------------------*/

    pub async fn search_patients(&self, query: &str) -> Result<Vec<PatientOption>, ClientError> {
        let body = self
            .get_json(
                "/api/patients/autocomplete",
                &[("q", query.trim().to_string())],
            )
            .await?;
        Ok(Self::parse_collection(&body, "patient", models::parse_patient_option))
    }

    pub async fn search_employees(
        &self,
        role: Role,
        query: &str,
    ) -> Result<Vec<EmployeeOption>, ClientError> {
        let mut pairs = vec![("title", role.key().to_string())];
        let trimmed = query.trim();
        if !trimmed.is_empty() {
            pairs.push(("q", trimmed.to_string()));
        }
        let body = self.get_json("/employees/search", &pairs).await?;
        Ok(Self::parse_collection(&body, "employee", models::parse_employee_option))
    }
}

/* ============================================================
   Fetcher adapters for AutocompleteSession
   ============================================================ */

pub struct PatientSuggestions {
    pub client: Arc<ApiClient>,
}

#[async_trait]
impl SuggestionFetcher<PatientOption> for PatientSuggestions {
    async fn fetch(&self, query: &str) -> Result<Vec<PatientOption>, ClientError> {
        self.client.search_patients(query).await
    }
}

pub struct StaffSuggestions {
    pub client: Arc<ApiClient>,
    pub role: Role,
}

#[async_trait]
impl SuggestionFetcher<EmployeeOption> for StaffSuggestions {
    async fn fetch(&self, query: &str) -> Result<Vec<EmployeeOption>, ClientError> {
        self.client.search_employees(self.role, query).await
    }
}
