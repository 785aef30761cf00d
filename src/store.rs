// src/store.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::models::Appointment;
use crate::status;

/* ============================================================
   Storage backends

   The repository owns in-memory state and persists through a
   backend. Backends only move whole snapshots; all invariants
   (transition gating, sorting) live in the repository.
   ============================================================ */

pub trait AppointmentStore: Send + Sync {
    fn load(&self) -> Result<Vec<Appointment>, StoreError>;
    fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl AppointmentStore for MemoryStore {
    fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .appointments
            .lock()
            .map_err(|_| StoreError::Corrupt("store mutex poisoned".into()))?
            .clone())
    }

    fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        *self
            .appointments
            .lock()
            .map_err(|_| StoreError::Corrupt("store mutex poisoned".into()))? =
            appointments.to_vec();
        Ok(())
    }
}

/// Snapshot persistence as a pretty-printed JSON array. A missing file is
/// an empty store; unparseable content is reported, never silently reset.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AppointmentStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(appointments)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/* ============================================================
   Repository
   ============================================================ */

/// Appointment collection loaded from a backend on open. Every mutation
/// writes back immediately, so the backend always holds the last committed
/// snapshot.
pub struct AppointmentRepository<S: AppointmentStore> {
    store: S,
    appointments: Vec<Appointment>,
}

impl<S: AppointmentStore> AppointmentRepository<S> {
    /// Load once at construction. Reopening constructs a fresh repository;
    /// there is no hidden initialized flag to reset.
    pub fn open(store: S) -> Result<Self, StoreError> {
        let appointments = store.load()?;
        Ok(Self {
            store,
            appointments,
        })
    }

    pub fn list(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Chronological view: by date, then by start time.
    pub fn sorted(&self) -> Vec<Appointment> {
        let mut sorted = self.appointments.clone();
        sorted.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        sorted
    }

    pub fn get(&self, id: i64) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Insert or replace by id, then persist.
    pub fn upsert(&mut self, appointment: Appointment) -> Result<(), StoreError> {
        match self
            .appointments
            .iter_mut()
            .find(|existing| existing.id == appointment.id)
        {
            Some(existing) => *existing = appointment,
            None => self.appointments.push(appointment),
        }
        self.store.save(&self.appointments)
    }

    /// Apply a status change, enforcing the transition rules. The `state`
    /// mirror is kept in sync with `status`.
    pub fn set_status(&mut self, id: i64, new_status: &str) -> Result<(), StoreError> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if !status::transition_allowed(&appointment.status, new_status) {
            return Err(StoreError::IllegalTransition {
                from: appointment.status.clone(),
                to: new_status.to_string(),
            });
        }
        appointment.status = new_status.to_string();
        appointment.state = Some(new_status.to_string());
        self.store.save(&self.appointments)
    }

    pub fn remove(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.appointments.len();
        self.appointments.retain(|a| a.id != id);
        if self.appointments.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.store.save(&self.appointments)
    }
}
