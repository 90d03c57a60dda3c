// libs/course-cell/src/services/session.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_clients::{IdentityClient, Notifier};
use shared_models::appointment::{Appointment, AppointmentStatus, PaymentStatus};
use shared_models::course::TreatmentSession;
use shared_models::error::EngineError;
use shared_models::event::ScheduleEvent;
use shared_store::EngineState;

use appointment_cell::models::CanAssignQuery;
use appointment_cell::services::ConflictDetectionService;
use shift_cell::services::ShiftRegistryService;
use shift_cell::AvailabilityQuery;

use crate::models::{RescheduleSessionRequest, ScheduleSessionRequest};

/// Binds course sessions to concrete slots. Course appointments are born
/// with the staff member already attached, going through the same conflict
/// predicate as a manual assignment; the store's write lock decides races.
pub struct SessionSchedulingService {
    state: Arc<EngineState>,
    identity: IdentityClient,
    notifier: Notifier,
}

impl SessionSchedulingService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self {
            state: state.clone(),
            identity: IdentityClient::new(&state.config),
            notifier: Notifier::new(&state.config),
        }
    }

    /// Schedule a pending session: creates a `scheduled` appointment bound
    /// to the session, inside the course window and on an approved shift.
    pub async fn schedule(
        &self,
        course_id: Uuid,
        session_number: u32,
        request: ScheduleSessionRequest,
    ) -> Result<(TreatmentSession, Appointment), EngineError> {
        self.identity
            .ensure_active_user(request.staff_id, "staff")
            .await?;
        self.ensure_on_shift(request.staff_id, request.date, request.time)
            .await?;

        // Advisory pre-check; the store repeats it under the write lock.
        let conflicts = ConflictDetectionService::new(&self.state);
        let check = conflicts
            .can_assign(CanAssignQuery {
                staff_id: request.staff_id,
                date: request.date,
                time: request.time,
                exclude_appointment_id: None,
            })
            .await;
        if !check.is_clear() {
            debug!(
                "Pre-check found staff {} committed at {} {}",
                request.staff_id, request.date, request.time
            );
        }

        let course = self.state.store.course(course_id).await?;
        let appointment = self.session_appointment(&course.client_id, &course.service_id, &request);

        let (session, appointment) = self
            .state
            .store
            .bind_session(course_id, session_number, appointment)
            .await?;
        self.notifier.publish(ScheduleEvent::session_scheduled(&session));
        Ok((session, appointment))
    }

    /// Move a scheduled session to a new slot. The replacement is validated
    /// in full before the old binding is released; on failure the session
    /// keeps its original slot.
    pub async fn reschedule(
        &self,
        course_id: Uuid,
        session_number: u32,
        request: RescheduleSessionRequest,
    ) -> Result<(TreatmentSession, Appointment), EngineError> {
        self.identity
            .ensure_active_user(request.staff_id, "staff")
            .await?;
        self.ensure_on_shift(request.staff_id, request.date, request.time)
            .await?;

        let course = self.state.store.course(course_id).await?;
        let replacement = self.session_appointment(
            &course.client_id,
            &course.service_id,
            &ScheduleSessionRequest {
                staff_id: request.staff_id,
                date: request.date,
                time: request.time,
            },
        );
        let reason = request
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "rescheduled".to_string());

        let (session, appointment) = self
            .state
            .store
            .rebind_session(course_id, session_number, replacement, reason)
            .await?;
        self.notifier.publish(ScheduleEvent::session_rescheduled(&session));
        Ok((session, appointment))
    }

    pub async fn get_session(
        &self,
        course_id: Uuid,
        session_number: u32,
    ) -> Result<TreatmentSession, EngineError> {
        self.state.store.session(course_id, session_number).await
    }

    fn session_appointment(
        &self,
        client_id: &Uuid,
        service_id: &Uuid,
        request: &ScheduleSessionRequest,
    ) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_id: *client_id,
            therapist_id: Some(request.staff_id),
            service_id: *service_id,
            date: request.date,
            time: request.time,
            status: AppointmentStatus::Scheduled,
            payment_status: PaymentStatus::Paid,
            booking_group_id: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn ensure_on_shift(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), EngineError> {
        let registry = ShiftRegistryService::new(&self.state);
        let availability = registry
            .availability_for(AvailabilityQuery { staff_id, date })
            .await;
        if !availability.covers(time) {
            return Err(EngineError::validation(format!(
                "staff member {} has no approved shift covering {} on {}",
                staff_id, time, date
            )));
        }
        Ok(())
    }
}
