use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::appointment::Appointment;

/// One requested appointment within a booking. A booking with several items
/// shares one booking group id across the created appointments.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingItem {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub client_id: Uuid,
    pub items: Vec<BookingItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
    pub staff_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanAssignQuery {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffConflictsQuery {
    pub staff_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmedCountQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateRangeQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Supply-and-demand picture for one slot: which staff could take it,
/// which appointments already hold it, and how far unassigned demand
/// exceeds the remaining staff.
#[derive(Debug, Clone, Serialize)]
pub struct SlotConflictReport {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available_staff: Vec<Uuid>,
    pub assigned: Vec<Appointment>,
    pub unassigned: Vec<Appointment>,
    pub deficit: u32,
}

impl SlotConflictReport {
    pub fn is_conflicted(&self) -> bool {
        self.deficit > 0
    }
}

/// Result of an assignment feasibility check against one (staff, date, time)
/// slot. Slots are compared by exact start time, never by interval overlap.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AssignmentCheck {
    Clear,
    StaffCommitted { existing: Appointment },
}

impl AssignmentCheck {
    pub fn is_clear(&self) -> bool {
        matches!(self, AssignmentCheck::Clear)
    }
}
