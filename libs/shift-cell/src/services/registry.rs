use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_clients::IdentityClient;
use shared_models::error::EngineError;
use shared_models::hours;
use shared_models::shift::{ShiftInterval, ShiftStatus, ShiftType, StaffShift};
use shared_store::EngineState;

use crate::models::{AvailabilityQuery, CreateShiftRequest, MoveShiftRequest, StaffAvailability};

/// Shift registration and approval for a single location.
pub struct ShiftRegistryService {
    state: Arc<EngineState>,
    identity: IdentityClient,
}

impl ShiftRegistryService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self {
            state: state.clone(),
            identity: IdentityClient::new(&state.config),
        }
    }

    /// Register a new shift in `pending` status.
    pub async fn create_shift(&self, request: CreateShiftRequest) -> Result<StaffShift, EngineError> {
        self.identity
            .ensure_active_user(request.staff_id, "staff")
            .await?;

        let interval = Self::resolve_interval(&request)?;

        let now = Utc::now();
        let shift = StaffShift {
            id: Uuid::new_v4(),
            staff_id: request.staff_id,
            date: request.date,
            shift_type: request.shift_type,
            interval,
            status: ShiftStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        debug!(
            "Registering {} shift for staff {} on {}",
            shift.shift_type, shift.staff_id, shift.date
        );
        Ok(self.state.store.insert_shift(shift).await)
    }

    pub async fn get_shift(&self, shift_id: Uuid) -> Result<StaffShift, EngineError> {
        self.state.store.shift(shift_id).await
    }

    pub async fn approve_shift(&self, shift_id: Uuid) -> Result<StaffShift, EngineError> {
        self.state
            .store
            .set_shift_status(shift_id, ShiftStatus::Approved)
            .await
    }

    pub async fn reject_shift(&self, shift_id: Uuid) -> Result<StaffShift, EngineError> {
        self.state
            .store
            .set_shift_status(shift_id, ShiftStatus::Rejected)
            .await
    }

    /// Reassign a shift to another staff member and/or date.
    pub async fn move_shift(
        &self,
        shift_id: Uuid,
        request: MoveShiftRequest,
    ) -> Result<StaffShift, EngineError> {
        self.identity
            .ensure_active_user(request.staff_id, "staff")
            .await?;
        self.state
            .store
            .move_shift(shift_id, request.staff_id, request.date)
            .await
    }

    /// Approved working windows for one staff member on one date. An
    /// approved leave shift empties the day regardless of other approvals.
    pub async fn availability_for(&self, query: AvailabilityQuery) -> StaffAvailability {
        let shifts = self
            .state
            .store
            .approved_shifts(query.staff_id, query.date)
            .await;

        let on_leave = shifts.is_empty()
            && self
                .state
                .store
                .shifts_on(query.date)
                .await
                .iter()
                .any(|s| {
                    s.staff_id == query.staff_id
                        && s.is_leave()
                        && s.status == ShiftStatus::Approved
                });

        StaffAvailability::from_shifts(query.staff_id, query.date, on_leave, &shifts)
    }

    /// Every shift registered for a date, any status, for roster review.
    pub async fn day_roster(&self, date: chrono::NaiveDate) -> Vec<StaffShift> {
        self.state.store.shifts_on(date).await
    }

    fn resolve_interval(request: &CreateShiftRequest) -> Result<Option<ShiftInterval>, EngineError> {
        let explicit = match (request.start_time, request.end_time) {
            (Some(start), Some(end)) => Some(ShiftInterval::new(start, end)),
            (None, None) => None,
            _ => {
                return Err(EngineError::validation(
                    "start_time and end_time must be provided together",
                ))
            }
        };

        let interval = match request.shift_type {
            ShiftType::Leave => {
                if explicit.is_some() {
                    return Err(EngineError::validation(
                        "leave shifts do not carry working times",
                    ));
                }
                return Ok(None);
            }
            ShiftType::Custom => explicit.ok_or_else(|| {
                EngineError::validation("custom shifts require start_time and end_time")
            })?,
            // Named blocks default their interval; explicit times override.
            named => match explicit {
                Some(interval) => interval,
                None => named
                    .default_interval()
                    .ok_or_else(|| EngineError::validation("shift type requires explicit times"))?,
            },
        };

        if !interval.is_well_formed() {
            return Err(EngineError::validation("shift start must be before shift end"));
        }
        if !hours::interval_within_business_hours(interval.start, interval.end) {
            return Err(EngineError::validation(
                "shift must fall within business hours 09:00-22:00",
            ));
        }
        Ok(Some(interval))
    }
}
