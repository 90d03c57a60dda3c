use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::shift::{ShiftInterval, ShiftType, StaffShift};

/// Register a shift for a staff member. Named shift types carry default
/// working blocks; `custom` requires explicit times and `leave` forbids them.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShiftRequest {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveShiftRequest {
    pub staff_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub staff_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterQuery {
    pub date: NaiveDate,
}

/// One staff member's approved working windows on a date. An empty
/// `intervals` list means the staff member is unavailable all day.
#[derive(Debug, Clone, Serialize)]
pub struct StaffAvailability {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub on_leave: bool,
    pub intervals: Vec<ShiftInterval>,
}

impl StaffAvailability {
    /// Whether the staff member is working at `time` on this date.
    pub fn covers(&self, time: NaiveTime) -> bool {
        !self.on_leave && self.intervals.iter().any(|i| i.contains(time))
    }

    pub fn from_shifts(
        staff_id: Uuid,
        date: NaiveDate,
        on_leave: bool,
        shifts: &[StaffShift],
    ) -> Self {
        let mut intervals: Vec<ShiftInterval> =
            shifts.iter().filter_map(|s| s.interval).collect();
        intervals.sort_by_key(|i| i.start);
        Self { staff_id, date, on_leave, intervals }
    }
}
