// libs/appointment-cell/src/services/conflict.rs
//
// Read-only conflict surface over the scheduling store. Detection here is
// advisory: the store re-checks the same predicate under its write lock
// before any assignment commits.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_models::shift::{ShiftStatus, StaffShift};
use shared_store::EngineState;

use crate::models::{
    AssignmentCheck, CanAssignQuery, DateRangeQuery, SlotConflictReport, StaffConflictsQuery,
};

/// The committed appointment, if any, holding `(staff, date, time)` among
/// `candidates`. Cancelled appointments release the slot; `exclude` lets a
/// reschedule ignore the binding it is about to replace.
pub fn find_commitment(
    candidates: &[Appointment],
    staff_id: Uuid,
    exclude: Option<Uuid>,
) -> Option<Appointment> {
    candidates
        .iter()
        .find(|apt| {
            apt.occupies_slot() && apt.therapist_id == Some(staff_id) && Some(apt.id) != exclude
        })
        .cloned()
}

/// Staff with an approved shift covering `time`, from one day's roster. An
/// approved leave shift removes the staff member from the whole day.
pub fn available_staff(shifts: &[StaffShift], time: NaiveTime) -> Vec<Uuid> {
    let mut staff: Vec<Uuid> = shifts
        .iter()
        .filter(|s| s.covers(time))
        .map(|s| s.staff_id)
        .collect();
    staff.retain(|id| {
        !shifts
            .iter()
            .any(|s| s.staff_id == *id && s.is_leave() && s.status == ShiftStatus::Approved)
    });
    staff.sort();
    staff.dedup();
    staff
}

/// Split a slot's non-cancelled appointments into assigned and unassigned.
pub fn partition_demand(candidates: &[Appointment]) -> (Vec<Appointment>, Vec<Appointment>) {
    candidates
        .iter()
        .filter(|a| a.occupies_slot())
        .cloned()
        .partition(|a| a.is_assigned())
}

pub struct ConflictDetectionService {
    state: Arc<EngineState>,
}

impl ConflictDetectionService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self { state: state.clone() }
    }

    /// Every non-cancelled appointment occupying a slot. Multiple pending
    /// appointments may share a slot; at most one per staff member may.
    pub async fn slot_appointments(&self, date: NaiveDate, time: NaiveTime) -> Vec<Appointment> {
        self.state
            .store
            .appointments_at(date, time)
            .await
            .into_iter()
            .filter(|a| a.occupies_slot())
            .collect()
    }

    /// Advisory feasibility check for assigning a staff member to a slot.
    pub async fn can_assign(&self, query: CanAssignQuery) -> AssignmentCheck {
        let candidates = self.state.store.appointments_at(query.date, query.time).await;
        match find_commitment(&candidates, query.staff_id, query.exclude_appointment_id) {
            Some(existing) => {
                debug!(
                    "Staff {} already committed to appointment {} at {} {}",
                    query.staff_id, existing.id, query.date, query.time
                );
                AssignmentCheck::StaffCommitted { existing }
            }
            None => AssignmentCheck::Clear,
        }
    }

    /// Supply-and-demand report for one slot. Staff already committed at
    /// the slot are removed from the available set; the deficit is how much
    /// unassigned demand exceeds the staff left over.
    pub async fn slot_report(&self, date: NaiveDate, time: NaiveTime) -> SlotConflictReport {
        let roster = self.state.store.shifts_on(date).await;
        let mut available = available_staff(&roster, time);

        let candidates = self.state.store.appointments_at(date, time).await;
        let (assigned, unassigned) = partition_demand(&candidates);
        available.retain(|staff| {
            !assigned.iter().any(|a| a.therapist_id == Some(*staff))
        });

        let deficit = unassigned.len().saturating_sub(available.len()) as u32;
        SlotConflictReport { date, time, available_staff: available, assigned, unassigned, deficit }
    }

    /// Slots in a date range where unassigned demand exceeds remaining
    /// staff supply.
    pub async fn list_conflicts(&self, query: DateRangeQuery) -> Vec<SlotConflictReport> {
        let appointments = self
            .state
            .store
            .appointments_between(query.from_date, query.to_date)
            .await;

        let mut slots: Vec<(NaiveDate, NaiveTime)> = appointments
            .iter()
            .filter(|a| a.occupies_slot())
            .map(|a| a.slot())
            .collect();
        slots.sort();
        slots.dedup();

        let mut conflicts = Vec::new();
        for (date, time) in slots {
            let report = self.slot_report(date, time).await;
            if report.is_conflicted() {
                conflicts.push(report);
            }
        }
        conflicts
    }

    /// All slots a staff member is committed to over a date range, sorted
    /// by date and time.
    pub async fn staff_commitments(&self, query: StaffConflictsQuery) -> Vec<Appointment> {
        self.state
            .store
            .appointments_between(query.from_date, query.to_date)
            .await
            .into_iter()
            .filter(|a| a.occupies_slot() && a.therapist_id == Some(query.staff_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_models::appointment::{AppointmentStatus, PaymentStatus};
    use shared_models::shift::ShiftType;

    fn appointment(staff: Option<Uuid>, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            therapist_id: staff,
            service_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            payment_status: PaymentStatus::Unpaid,
            booking_group_id: Some(Uuid::new_v4()),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_commitment_found_for_assigned_staff() {
        let staff = Uuid::new_v4();
        let committed = appointment(Some(staff), AppointmentStatus::Upcoming);
        let found = find_commitment(&[committed.clone()], staff, None).unwrap();
        assert_eq!(found.id, committed.id);
    }

    #[test]
    fn test_cancelled_appointment_releases_slot() {
        let staff = Uuid::new_v4();
        let cancelled = appointment(Some(staff), AppointmentStatus::Cancelled);
        assert!(find_commitment(&[cancelled], staff, None).is_none());
    }

    #[test]
    fn test_other_staff_commitment_ignored() {
        let committed = appointment(Some(Uuid::new_v4()), AppointmentStatus::Upcoming);
        assert!(find_commitment(&[committed], Uuid::new_v4(), None).is_none());
    }

    #[test]
    fn test_excluded_appointment_ignored() {
        let staff = Uuid::new_v4();
        let committed = appointment(Some(staff), AppointmentStatus::Upcoming);
        let exclude = Some(committed.id);
        assert!(find_commitment(&[committed], staff, exclude).is_none());
    }

    #[test]
    fn test_unassigned_pending_appointments_do_not_block() {
        let pending = appointment(None, AppointmentStatus::Pending);
        assert!(find_commitment(&[pending], Uuid::new_v4(), None).is_none());
    }

    fn shift(staff_id: Uuid, shift_type: ShiftType, status: ShiftStatus) -> StaffShift {
        let now = Utc::now();
        StaffShift {
            id: Uuid::new_v4(),
            staff_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            shift_type,
            interval: shift_type.default_interval(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_available_staff_requires_approved_covering_shift() {
        let working = Uuid::new_v4();
        let pending = Uuid::new_v4();
        let shifts = vec![
            shift(working, ShiftType::Morning, ShiftStatus::Approved),
            shift(pending, ShiftType::Morning, ShiftStatus::Pending),
        ];
        let at_ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(available_staff(&shifts, at_ten), vec![working]);
        // 14:00 is outside the morning block.
        let at_two = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert!(available_staff(&shifts, at_two).is_empty());
    }

    #[test]
    fn test_approved_leave_removes_staff_from_supply() {
        let staff = Uuid::new_v4();
        let shifts = vec![
            shift(staff, ShiftType::Morning, ShiftStatus::Approved),
            shift(staff, ShiftType::Leave, ShiftStatus::Approved),
        ];
        let at_ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(available_staff(&shifts, at_ten).is_empty());
    }

    #[test]
    fn test_partition_demand_splits_by_assignment() {
        let assigned = appointment(Some(Uuid::new_v4()), AppointmentStatus::Upcoming);
        let unassigned = appointment(None, AppointmentStatus::Pending);
        let cancelled = appointment(None, AppointmentStatus::Cancelled);

        let (has_staff, needs_staff) =
            partition_demand(&[assigned.clone(), unassigned.clone(), cancelled]);
        assert_eq!(has_staff.len(), 1);
        assert_eq!(has_staff[0].id, assigned.id);
        assert_eq!(needs_staff.len(), 1);
        assert_eq!(needs_staff[0].id, unassigned.id);
    }
}
