use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    PerWeek,
    PerMonth,
}

/// Session cadence for a treatment course, e.g. `PerWeek, 2` means two
/// sessions per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub value: u32,
}

impl RecurrenceRule {
    pub fn per_week(value: u32) -> Self {
        Self { frequency: Frequency::PerWeek, value }
    }

    /// Expiry date for a course of `total_sessions` starting at `start`.
    /// The calendar window is sized so the client can complete all sessions
    /// at the promised cadence: `ceil(total / value)` weeks or months.
    pub fn expiry_from(&self, start: NaiveDate, total_sessions: u32) -> Option<NaiveDate> {
        if self.value == 0 || total_sessions == 0 {
            return None;
        }
        let units = total_sessions.div_ceil(self.value);
        match self.frequency {
            Frequency::PerWeek => {
                start.checked_add_signed(chrono::Duration::weeks(units as i64))
            }
            Frequency::PerMonth => start.checked_add_months(Months::new(units)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Expired,
    Cancelled,
}

impl CourseStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CourseStatus::Completed | CourseStatus::Expired | CourseStatus::Cancelled
        )
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "draft"),
            CourseStatus::Active => write!(f, "active"),
            CourseStatus::Paused => write!(f, "paused"),
            CourseStatus::Completed => write!(f, "completed"),
            CourseStatus::Expired => write!(f, "expired"),
            CourseStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A prepaid package entitling a client to `total_sessions` sessions of one
/// service within `[start_date, expiry_date]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentCourse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub total_sessions: u32,
    pub recurrence: RecurrenceRule,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: CourseStatus,
    pub is_paused: bool,
    pub paused_date: Option<DateTime<Utc>>,
    pub pause_reason: Option<String>,
    pub completed_sessions: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreatmentCourse {
    pub fn is_fully_completed(&self) -> bool {
        self.completed_sessions == self.total_sessions
    }

    /// Whether a session date falls inside the entitlement window
    /// (both bounds inclusive).
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.expiry_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Scheduled => write!(f, "scheduled"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One unit of entitlement within a course. When scheduled, `scheduled_date`,
/// `scheduled_time` and `staff_id` mirror the bound appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentSession {
    pub id: Uuid,
    pub course_id: Uuid,
    pub session_number: u32,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub status: SessionStatus,
    pub staff_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub customer_status_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreatmentSession {
    pub fn fresh(course_id: Uuid, session_number: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            session_number,
            scheduled_date: None,
            scheduled_time: None,
            status: SessionStatus::Pending,
            staff_id: None,
            appointment_id: None,
            customer_status_notes: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
