// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use uuid::Uuid;

use shared_clients::Notifier;
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::error::EngineError;
use shared_models::event::{DomainEvent, ScheduleEvent};
use shared_store::EngineState;

/// Appointment lifecycle transitions past assignment: start, finish, cancel.
/// The transition table lives with the status type; the store enforces it
/// under its write lock.
pub struct AppointmentLifecycleService {
    state: Arc<EngineState>,
    notifier: Notifier,
}

impl AppointmentLifecycleService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self {
            state: state.clone(),
            notifier: Notifier::new(&state.config),
        }
    }

    pub async fn start(&self, appointment_id: Uuid) -> Result<Appointment, EngineError> {
        let appointment = self
            .state
            .store
            .transition_appointment(appointment_id, AppointmentStatus::InProgress)
            .await?;
        self.notifier.publish(ScheduleEvent::appointment_started(&appointment));
        Ok(appointment)
    }

    pub async fn finish(&self, appointment_id: Uuid) -> Result<Appointment, EngineError> {
        let appointment = self
            .state
            .store
            .transition_appointment(appointment_id, AppointmentStatus::Completed)
            .await?;
        self.notifier.publish(ScheduleEvent::appointment_completed(&appointment));
        Ok(appointment)
    }

    /// Cancel with a mandatory reason. The store applies the cascade in the
    /// same critical section: a bound course session reverts to pending and
    /// the slot reopens.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        reason: String,
    ) -> Result<Appointment, EngineError> {
        if reason.trim().is_empty() {
            return Err(EngineError::validation("cancellation requires a reason"));
        }

        let (cancelled, events) = self
            .state
            .store
            .cancel_appointment(appointment_id, reason)
            .await?;

        for event in events {
            let DomainEvent::AppointmentCancelled { reopened_session_id, .. } = event;
            self.notifier
                .publish(ScheduleEvent::appointment_cancelled(&cancelled, reopened_session_id));
        }
        Ok(cancelled)
    }
}
