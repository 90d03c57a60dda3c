// libs/appointment-cell/src/services/booking.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_clients::{CatalogClient, IdentityClient, Notifier};
use shared_models::appointment::{Appointment, AppointmentStatus, PaymentStatus};
use shared_models::error::EngineError;
use shared_models::event::ScheduleEvent;
use shared_models::hours;
use shared_store::EngineState;

use shift_cell::services::ShiftRegistryService;
use shift_cell::AvailabilityQuery;

use crate::models::{AssignRequest, ConfirmedCountQuery, CreateBookingRequest};

/// Booking intake and the manual assignment workflow: clients request slots,
/// an operator approves by naming a staff member, and the store's
/// compare-and-set commit decides the race.
pub struct BookingService {
    state: Arc<EngineState>,
    identity: IdentityClient,
    catalog: CatalogClient,
    notifier: Notifier,
}

impl BookingService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self {
            state: state.clone(),
            identity: IdentityClient::new(&state.config),
            catalog: CatalogClient::new(&state.config),
            notifier: Notifier::new(&state.config),
        }
    }

    /// Create one or more pending, unassigned appointments under a single
    /// booking group. Requested times are only checked against business
    /// hours here; staffing is decided at assignment time.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Vec<Appointment>, EngineError> {
        if request.items.is_empty() {
            return Err(EngineError::validation("booking requires at least one item"));
        }
        for item in &request.items {
            if !hours::within_business_hours(item.time) {
                return Err(EngineError::validation(format!(
                    "requested time {} is outside business hours 09:00-22:00",
                    item.time
                )));
            }
        }

        self.identity
            .ensure_active_user(request.client_id, "client")
            .await?;
        let service_ids: HashSet<Uuid> = request.items.iter().map(|i| i.service_id).collect();
        for service_id in service_ids {
            self.catalog.ensure_service_exists(service_id).await?;
        }

        let booking_group_id = Uuid::new_v4();
        let now = Utc::now();
        let appointments: Vec<Appointment> = request
            .items
            .iter()
            .map(|item| Appointment {
                id: Uuid::new_v4(),
                client_id: request.client_id,
                therapist_id: None,
                service_id: item.service_id,
                date: item.date,
                time: item.time,
                status: AppointmentStatus::Pending,
                payment_status: PaymentStatus::Unpaid,
                booking_group_id: Some(booking_group_id),
                rejection_reason: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let stored = self.state.store.insert_appointments(appointments).await;
        info!(
            "Booking {} created with {} appointment(s) for client {}",
            booking_group_id,
            stored.len(),
            request.client_id
        );
        for appointment in &stored {
            self.notifier.publish(ScheduleEvent::appointment_created(appointment));
        }
        Ok(stored)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, EngineError> {
        self.state.store.appointment(appointment_id).await
    }

    /// Approve a pending appointment by assigning a staff member. The staff
    /// member must hold an approved shift covering the slot; the slot itself
    /// is claimed by the store's compare-and-set commit, so two operators
    /// racing for the same staff member cannot both win.
    pub async fn approve_and_assign(
        &self,
        appointment_id: Uuid,
        request: AssignRequest,
    ) -> Result<Appointment, EngineError> {
        self.identity
            .ensure_active_user(request.staff_id, "staff")
            .await?;

        let appointment = self.state.store.appointment(appointment_id).await?;
        self.ensure_on_shift(request.staff_id, appointment.date, appointment.time)
            .await?;

        let assigned = self
            .state
            .store
            .commit_assignment(appointment_id, request.staff_id)
            .await?;

        self.notifier.publish(ScheduleEvent::appointment_confirmed(&assigned));
        Ok(assigned)
    }

    /// Confirmed demand over a date range. A booking group counts once no
    /// matter how many appointments it contains; appointments without a
    /// group (course sessions) count individually.
    pub async fn confirmed_count(&self, query: ConfirmedCountQuery) -> usize {
        let appointments = self
            .state
            .store
            .appointments_between(query.from_date, query.to_date)
            .await;

        let mut groups = HashSet::new();
        let mut ungrouped = 0usize;
        for appointment in appointments.iter().filter(|a| is_confirmed(a.status)) {
            match appointment.booking_group_id {
                Some(group_id) => {
                    groups.insert(group_id);
                }
                None => ungrouped += 1,
            }
        }
        debug!(
            "Confirmed count {} to {}: {} group(s), {} ungrouped",
            query.from_date,
            query.to_date,
            groups.len(),
            ungrouped
        );
        groups.len() + ungrouped
    }

    async fn ensure_on_shift(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        time: chrono::NaiveTime,
    ) -> Result<(), EngineError> {
        let registry = ShiftRegistryService::new(&self.state);
        let availability = registry
            .availability_for(AvailabilityQuery { staff_id, date })
            .await;

        if availability.on_leave {
            return Err(EngineError::validation(format!(
                "staff member {} is on leave on {}",
                staff_id, date
            )));
        }
        if !availability.covers(time) {
            return Err(EngineError::validation(format!(
                "staff member {} has no approved shift covering {} on {}",
                staff_id, time, date
            )));
        }
        Ok(())
    }
}

/// Statuses that count as confirmed demand.
fn is_confirmed(status: AppointmentStatus) -> bool {
    matches!(
        status,
        AppointmentStatus::Scheduled
            | AppointmentStatus::Upcoming
            | AppointmentStatus::InProgress
            | AppointmentStatus::Completed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_and_cancelled_are_not_confirmed() {
        assert!(!is_confirmed(AppointmentStatus::Pending));
        assert!(!is_confirmed(AppointmentStatus::Cancelled));
        assert!(is_confirmed(AppointmentStatus::Upcoming));
        assert!(is_confirmed(AppointmentStatus::Scheduled));
    }
}
