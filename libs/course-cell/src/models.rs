use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use shared_models::course::RecurrenceRule;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub total_sessions: u32,
    pub recurrence: RecurrenceRule,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PauseCourseRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSessionRequest {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Reschedule moves a session to a new slot in one step: the old
/// appointment is cancelled with `reason` and the replacement committed
/// only after every check passes.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleSessionRequest {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompleteSessionRequest {
    pub customer_status_notes: Option<String>,
    pub admin_notes: Option<String>,
}

/// Maintenance sweep cutoff; defaults to the current date.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExpireOverdueRequest {
    pub as_of: Option<NaiveDate>,
}
