use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    /// Course-created appointments are born `Scheduled`: a therapist is
    /// already bound through the same conflict check as a manual assignment.
    Scheduled,
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Get all valid next statuses for a given current status.
    pub fn valid_transitions(&self) -> Vec<AppointmentStatus> {
        match self {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Upcoming,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Upcoming,
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Upcoming => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::InProgress => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Written by the payment collaborator; the engine only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub therapist_id: Option<Uuid>,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub booking_group_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The canonical slot this appointment occupies. Slots are compared by
    /// exact start-time equality, never by interval overlap.
    pub fn slot(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time)
    }

    /// Non-cancelled appointments count toward slot occupancy.
    pub fn occupies_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn is_assigned(&self) -> bool {
        self.therapist_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert!(!AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Upcoming));
    }

    #[test]
    fn test_terminal_statuses_have_no_transitions() {
        assert!(AppointmentStatus::Completed.valid_transitions().is_empty());
        assert!(AppointmentStatus::Cancelled.valid_transitions().is_empty());
    }

    #[test]
    fn test_cancellable_from_any_non_terminal_status() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Upcoming,
            AppointmentStatus::InProgress,
        ] {
            assert!(status.can_transition_to(AppointmentStatus::Cancelled));
        }
    }
}
