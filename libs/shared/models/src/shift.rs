use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A half-open working interval within one day: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Interval containment used for availability: `start <= time < end`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Evening,
    Custom,
    Leave,
}

impl ShiftType {
    /// Default interval for the named shift blocks. `Custom` requires
    /// explicit times; `Leave` carries no interval at all.
    pub fn default_interval(&self) -> Option<ShiftInterval> {
        let interval = |sh, eh| {
            ShiftInterval::new(
                NaiveTime::from_hms_opt(sh, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(eh, 0, 0).unwrap(),
            )
        };
        match self {
            ShiftType::Morning => Some(interval(9, 13)),
            ShiftType::Afternoon => Some(interval(13, 17)),
            ShiftType::Evening => Some(interval(17, 22)),
            ShiftType::Custom | ShiftType::Leave => None,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Morning => write!(f, "morning"),
            ShiftType::Afternoon => write!(f, "afternoon"),
            ShiftType::Evening => write!(f, "evening"),
            ShiftType::Custom => write!(f, "custom"),
            ShiftType::Leave => write!(f, "leave"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Pending,
    Approved,
    Rejected,
}

impl ShiftStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftStatus::Approved | ShiftStatus::Rejected)
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftStatus::Pending => write!(f, "pending"),
            ShiftStatus::Approved => write!(f, "approved"),
            ShiftStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One registered shift for one staff member on one date. `interval` is
/// `None` exactly for `Leave` shifts, which block the whole day once
/// approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffShift {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub interval: Option<ShiftInterval>,
    pub status: ShiftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffShift {
    pub fn is_leave(&self) -> bool {
        matches!(self.shift_type, ShiftType::Leave)
    }

    /// True when this shift is approved and its interval contains `time`.
    pub fn covers(&self, time: NaiveTime) -> bool {
        self.status == ShiftStatus::Approved
            && self.interval.map(|i| i.contains(time)).unwrap_or(false)
    }
}
