use chrono::NaiveTime;

/// Fixed daily operating window for the studio: 09:00 (inclusive) to
/// 22:00 (exclusive). All slot times are quantized to minutes.
pub fn opening_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

pub fn closing_time() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}

/// A bookable slot time must fall inside [09:00, 22:00).
pub fn within_business_hours(time: NaiveTime) -> bool {
    time >= opening_time() && time < closing_time()
}

/// A working interval must be fully contained in [09:00, 22:00].
pub fn interval_within_business_hours(start: NaiveTime, end: NaiveTime) -> bool {
    start >= opening_time() && end <= closing_time()
}
