use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    AssignRequest, BookingItem, CanAssignQuery, ConfirmedCountQuery, CreateBookingRequest,
    DateRangeQuery,
};
use appointment_cell::services::{
    AppointmentLifecycleService, BookingService, ConflictDetectionService,
};
use shared_config::AppConfig;
use shared_models::appointment::AppointmentStatus;
use shared_models::error::EngineError;
use shared_models::shift::{ShiftInterval, ShiftStatus, ShiftType, StaffShift};
use shared_store::EngineState;

fn state() -> Arc<EngineState> {
    EngineState::new(AppConfig::default())
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

async fn approved_shift(state: &Arc<EngineState>, staff_id: Uuid, on: NaiveDate) {
    let now = Utc::now();
    state
        .store
        .insert_shift(StaffShift {
            id: Uuid::new_v4(),
            staff_id,
            date: on,
            shift_type: ShiftType::Custom,
            interval: Some(ShiftInterval::new(time(9, 0), time(22, 0))),
            status: ShiftStatus::Approved,
            created_at: now,
            updated_at: now,
        })
        .await;
}

async fn approved_leave(state: &Arc<EngineState>, staff_id: Uuid, on: NaiveDate) {
    let now = Utc::now();
    state
        .store
        .insert_shift(StaffShift {
            id: Uuid::new_v4(),
            staff_id,
            date: on,
            shift_type: ShiftType::Leave,
            interval: None,
            status: ShiftStatus::Approved,
            created_at: now,
            updated_at: now,
        })
        .await;
}

fn booking(client_id: Uuid, slots: &[(u32, u32)]) -> CreateBookingRequest {
    CreateBookingRequest {
        client_id,
        items: slots
            .iter()
            .map(|(h, m)| BookingItem {
                service_id: Uuid::new_v4(),
                date: date(),
                time: time(*h, *m),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_booking_creates_pending_unassigned_appointments() {
    let state = state();
    let service = BookingService::new(&state);

    let appointments = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0), (11, 0)]))
        .await
        .unwrap();

    assert_eq!(appointments.len(), 2);
    let group = appointments[0].booking_group_id;
    assert!(group.is_some());
    for appointment in &appointments {
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert!(appointment.therapist_id.is_none());
        assert_eq!(appointment.booking_group_id, group);
    }
}

#[tokio::test]
async fn test_booking_outside_business_hours_rejected() {
    let state = state();
    let service = BookingService::new(&state);

    let result = service.create_booking(booking(Uuid::new_v4(), &[(8, 30)])).await;
    assert_matches!(result, Err(EngineError::Validation(_)));

    // 22:00 is the closing boundary and not bookable.
    let result = service.create_booking(booking(Uuid::new_v4(), &[(22, 0)])).await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_empty_booking_rejected() {
    let state = state();
    let service = BookingService::new(&state);
    let result = service
        .create_booking(CreateBookingRequest { client_id: Uuid::new_v4(), items: vec![] })
        .await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_staff_cannot_be_double_booked_on_same_slot() {
    let state = state();
    let service = BookingService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    let first = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    let second = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();

    let assigned = service
        .approve_and_assign(first[0].id, AssignRequest { staff_id })
        .await
        .unwrap();
    assert_eq!(assigned.status, AppointmentStatus::Upcoming);
    assert_eq!(assigned.therapist_id, Some(staff_id));

    let blocked = service
        .approve_and_assign(second[0].id, AssignRequest { staff_id })
        .await;
    assert_matches!(blocked, Err(EngineError::Conflict { existing }) => {
        assert_eq!(existing.id, first[0].id);
    });
}

#[tokio::test]
async fn test_adjacent_start_times_do_not_conflict() {
    let state = state();
    let service = BookingService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    let at_ten = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    let at_ten_thirty = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 30)]))
        .await
        .unwrap();

    service
        .approve_and_assign(at_ten[0].id, AssignRequest { staff_id })
        .await
        .unwrap();
    // Slots compare by exact start time; 10:30 never collides with 10:00.
    let assigned = service
        .approve_and_assign(at_ten_thirty[0].id, AssignRequest { staff_id })
        .await
        .unwrap();
    assert_eq!(assigned.therapist_id, Some(staff_id));
}

#[tokio::test]
async fn test_assignment_requires_covering_shift() {
    let state = state();
    let service = BookingService::new(&state);
    let staff_id = Uuid::new_v4();

    let appointments = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();

    let result = service
        .approve_and_assign(appointments[0].id, AssignRequest { staff_id })
        .await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_assignment_blocked_by_approved_leave() {
    let state = state();
    let service = BookingService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;
    approved_leave(&state, staff_id, date()).await;

    let appointments = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();

    let result = service
        .approve_and_assign(appointments[0].id, AssignRequest { staff_id })
        .await;
    assert_matches!(result, Err(EngineError::Validation(_)));
}

#[tokio::test]
async fn test_cancellation_requires_reason_and_reopens_slot() {
    let state = state();
    let service = BookingService::new(&state);
    let lifecycle = AppointmentLifecycleService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    let first = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    service
        .approve_and_assign(first[0].id, AssignRequest { staff_id })
        .await
        .unwrap();

    let no_reason = lifecycle.cancel(first[0].id, "   ".to_string()).await;
    assert_matches!(no_reason, Err(EngineError::Validation(_)));

    let cancelled = lifecycle
        .cancel(first[0].id, "client request".to_string())
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.rejection_reason.as_deref(), Some("client request"));

    // The slot is free again for the same staff member.
    let second = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    let assigned = service
        .approve_and_assign(second[0].id, AssignRequest { staff_id })
        .await
        .unwrap();
    assert_eq!(assigned.status, AppointmentStatus::Upcoming);
}

#[tokio::test]
async fn test_lifecycle_start_then_finish() {
    let state = state();
    let service = BookingService::new(&state);
    let lifecycle = AppointmentLifecycleService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    let appointments = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    let id = appointments[0].id;

    // Completing before starting is an invalid transition.
    let early_finish = lifecycle.finish(id).await;
    assert_matches!(early_finish, Err(EngineError::InvalidTransition { .. }));

    service
        .approve_and_assign(id, AssignRequest { staff_id })
        .await
        .unwrap();
    let started = lifecycle.start(id).await.unwrap();
    assert_eq!(started.status, AppointmentStatus::InProgress);
    let finished = lifecycle.finish(id).await.unwrap();
    assert_eq!(finished.status, AppointmentStatus::Completed);

    // Terminal: no further transitions.
    let again = lifecycle.start(id).await;
    assert_matches!(again, Err(EngineError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_can_assign_check_reflects_commitments() {
    let state = state();
    let service = BookingService::new(&state);
    let conflicts = ConflictDetectionService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    let appointments = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();

    let before = conflicts
        .can_assign(CanAssignQuery {
            staff_id,
            date: date(),
            time: time(10, 0),
            exclude_appointment_id: None,
        })
        .await;
    assert!(before.is_clear());

    service
        .approve_and_assign(appointments[0].id, AssignRequest { staff_id })
        .await
        .unwrap();

    let after = conflicts
        .can_assign(CanAssignQuery {
            staff_id,
            date: date(),
            time: time(10, 0),
            exclude_appointment_id: None,
        })
        .await;
    assert!(!after.is_clear());
}

#[tokio::test]
async fn test_conflict_listing_reports_supply_deficit() {
    let state = state();
    let service = BookingService::new(&state);
    let conflicts = ConflictDetectionService::new(&state);
    let staff_id = Uuid::new_v4();
    approved_shift(&state, staff_id, date()).await;

    // Two unassigned requests at the same slot against one staff member.
    service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();
    service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0)]))
        .await
        .unwrap();

    let reports = conflicts
        .list_conflicts(DateRangeQuery { from_date: date(), to_date: date() })
        .await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].deficit, 1);
    assert_eq!(reports[0].unassigned.len(), 2);
    assert_eq!(reports[0].available_staff, vec![staff_id]);

    // Assigning one request consumes the staff member: one unassigned
    // appointment remains with nobody left to take it.
    let id = reports[0].unassigned[0].id;
    service
        .approve_and_assign(id, AssignRequest { staff_id })
        .await
        .unwrap();
    let slot = conflicts.slot_report(date(), time(10, 0)).await;
    assert!(slot.available_staff.is_empty());
    assert_eq!(slot.unassigned.len(), 1);
    assert_eq!(slot.deficit, 1);
}

#[tokio::test]
async fn test_confirmed_count_counts_booking_group_once() {
    let state = state();
    let service = BookingService::new(&state);
    let staff_a = Uuid::new_v4();
    let staff_b = Uuid::new_v4();
    approved_shift(&state, staff_a, date()).await;
    approved_shift(&state, staff_b, date()).await;

    // One group with two appointments, both confirmed.
    let group = service
        .create_booking(booking(Uuid::new_v4(), &[(10, 0), (11, 0)]))
        .await
        .unwrap();
    service
        .approve_and_assign(group[0].id, AssignRequest { staff_id: staff_a })
        .await
        .unwrap();
    service
        .approve_and_assign(group[1].id, AssignRequest { staff_id: staff_b })
        .await
        .unwrap();

    // A second group left pending does not count.
    service
        .create_booking(booking(Uuid::new_v4(), &[(12, 0)]))
        .await
        .unwrap();

    let count = service
        .confirmed_count(ConfirmedCountQuery { from_date: date(), to_date: date() })
        .await;
    assert_eq!(count, 1);
}
