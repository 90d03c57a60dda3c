// libs/shared/store/src/store.rs
//
// Single authoritative scheduling store. All four logical tables live behind
// one RwLock: read-only queries share the read lock, every mutating
// operation takes the write lock, so conflicting commits against the same
// (staff, date, time) slot or the same course counter are serialized.
// State-dependent preconditions are re-checked inside the critical section.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::course::{CourseStatus, SessionStatus, TreatmentCourse, TreatmentSession};
use shared_models::error::EngineError;
use shared_models::event::DomainEvent;
use shared_models::hours;
use shared_models::shift::{ShiftStatus, StaffShift};

/// Shared axum state: configuration plus the scheduling authority.
pub struct EngineState {
    pub config: AppConfig,
    pub store: SchedulingStore,
}

impl EngineState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            store: SchedulingStore::new(),
        })
    }
}

#[derive(Default)]
struct Tables {
    shifts: HashMap<Uuid, StaffShift>,
    shifts_by_staff_date: HashMap<(Uuid, NaiveDate), Vec<Uuid>>,
    appointments: HashMap<Uuid, Appointment>,
    appointments_by_slot: HashMap<(NaiveDate, NaiveTime), Vec<Uuid>>,
    courses: HashMap<Uuid, TreatmentCourse>,
    sessions: HashMap<Uuid, TreatmentSession>,
    // (course_id, session_number) is unique per course
    sessions_by_course: HashMap<(Uuid, u32), Uuid>,
}

impl Tables {
    fn index_shift(&mut self, shift: &StaffShift) {
        self.shifts_by_staff_date
            .entry((shift.staff_id, shift.date))
            .or_default()
            .push(shift.id);
    }

    fn unindex_shift(&mut self, shift: &StaffShift) {
        if let Some(ids) = self.shifts_by_staff_date.get_mut(&(shift.staff_id, shift.date)) {
            ids.retain(|id| *id != shift.id);
        }
    }

    fn index_appointment(&mut self, appointment: &Appointment) {
        self.appointments_by_slot
            .entry(appointment.slot())
            .or_default()
            .push(appointment.id);
    }

    fn appointments_at(&self, date: NaiveDate, time: NaiveTime) -> Vec<Appointment> {
        self.appointments_by_slot
            .get(&(date, time))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.appointments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The committed appointment, if any, holding `(staff, date, time)`.
    /// Cancelled appointments release the slot.
    fn committed_assignment(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> Option<Appointment> {
        self.appointments_at(date, time).into_iter().find(|apt| {
            apt.occupies_slot()
                && apt.therapist_id == Some(staff_id)
                && Some(apt.id) != exclude
        })
    }

    fn session_mut(
        &mut self,
        course_id: Uuid,
        session_number: u32,
    ) -> Result<&mut TreatmentSession, EngineError> {
        let id = self
            .sessions_by_course
            .get(&(course_id, session_number))
            .copied()
            .ok_or(EngineError::NotFound("session"))?;
        self.sessions
            .get_mut(&id)
            .ok_or(EngineError::NotFound("session"))
    }
}

pub struct SchedulingStore {
    tables: RwLock<Tables>,
}

impl Default for SchedulingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    // ==========================================================================
    // SHIFTS
    // ==========================================================================

    pub async fn insert_shift(&self, shift: StaffShift) -> StaffShift {
        let mut tables = self.tables.write().await;
        tables.index_shift(&shift);
        tables.shifts.insert(shift.id, shift.clone());
        debug!("Shift {} registered for staff {} on {}", shift.id, shift.staff_id, shift.date);
        shift
    }

    pub async fn shift(&self, shift_id: Uuid) -> Result<StaffShift, EngineError> {
        let tables = self.tables.read().await;
        tables
            .shifts
            .get(&shift_id)
            .cloned()
            .ok_or(EngineError::NotFound("shift"))
    }

    /// Approve or reject a shift. Idempotent once the shift is terminal:
    /// re-applying a decision to an approved/rejected shift returns the
    /// record unchanged.
    pub async fn set_shift_status(
        &self,
        shift_id: Uuid,
        new_status: ShiftStatus,
    ) -> Result<StaffShift, EngineError> {
        let mut tables = self.tables.write().await;
        let shift = tables
            .shifts
            .get_mut(&shift_id)
            .ok_or(EngineError::NotFound("shift"))?;

        if shift.status.is_terminal() {
            debug!("Shift {} already {}, leaving unchanged", shift_id, shift.status);
            return Ok(shift.clone());
        }

        shift.status = new_status;
        shift.updated_at = Utc::now();
        info!("Shift {} moved to {}", shift_id, new_status);
        Ok(shift.clone())
    }

    /// Reassign a shift to another staff member and/or date. Appointment
    /// conflicts are deliberately not checked here; callers consult the
    /// conflict surface before committing a move.
    pub async fn move_shift(
        &self,
        shift_id: Uuid,
        new_staff_id: Uuid,
        new_date: NaiveDate,
    ) -> Result<StaffShift, EngineError> {
        let mut tables = self.tables.write().await;
        let mut shift = tables
            .shifts
            .get(&shift_id)
            .cloned()
            .ok_or(EngineError::NotFound("shift"))?;

        tables.unindex_shift(&shift);
        shift.staff_id = new_staff_id;
        shift.date = new_date;
        shift.updated_at = Utc::now();
        tables.index_shift(&shift);
        tables.shifts.insert(shift.id, shift.clone());
        info!("Shift {} moved to staff {} on {}", shift_id, new_staff_id, new_date);
        Ok(shift)
    }

    /// Approved shifts for one staff member on one date. An approved leave
    /// shift overrides and empties the whole day.
    pub async fn approved_shifts(&self, staff_id: Uuid, date: NaiveDate) -> Vec<StaffShift> {
        let tables = self.tables.read().await;
        let shifts: Vec<StaffShift> = tables
            .shifts_by_staff_date
            .get(&(staff_id, date))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.shifts.get(id))
                    .filter(|s| s.status == ShiftStatus::Approved)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if shifts.iter().any(|s| s.is_leave()) {
            return vec![];
        }
        shifts
    }

    /// Full day roster: every shift registered for `date`, any status.
    pub async fn shifts_on(&self, date: NaiveDate) -> Vec<StaffShift> {
        let tables = self.tables.read().await;
        let mut shifts: Vec<StaffShift> = tables
            .shifts
            .values()
            .filter(|s| s.date == date)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| (s.staff_id, s.interval.map(|i| i.start)));
        shifts
    }

    // ==========================================================================
    // APPOINTMENTS
    // ==========================================================================

    pub async fn insert_appointments(&self, appointments: Vec<Appointment>) -> Vec<Appointment> {
        let mut tables = self.tables.write().await;
        for appointment in &appointments {
            tables.index_appointment(appointment);
            tables.appointments.insert(appointment.id, appointment.clone());
        }
        debug!("Inserted {} appointment(s)", appointments.len());
        appointments
    }

    pub async fn appointment(&self, appointment_id: Uuid) -> Result<Appointment, EngineError> {
        let tables = self.tables.read().await;
        tables
            .appointments
            .get(&appointment_id)
            .cloned()
            .ok_or(EngineError::NotFound("appointment"))
    }

    pub async fn appointments_at(&self, date: NaiveDate, time: NaiveTime) -> Vec<Appointment> {
        let tables = self.tables.read().await;
        tables.appointments_at(date, time)
    }

    pub async fn appointments_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Appointment> {
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| from <= a.date && a.date <= to)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.date, a.time));
        appointments
    }

    /// Compare-and-set assignment commit. Preconditions, re-checked under
    /// the write lock: the appointment is pending and unassigned, and no
    /// other non-cancelled appointment holds the same (staff, date, time).
    pub async fn commit_assignment(
        &self,
        appointment_id: Uuid,
        staff_id: Uuid,
    ) -> Result<Appointment, EngineError> {
        let mut tables = self.tables.write().await;
        let appointment = tables
            .appointments
            .get(&appointment_id)
            .cloned()
            .ok_or(EngineError::NotFound("appointment"))?;

        if appointment.therapist_id.is_some() {
            return Err(EngineError::validation(
                "appointment already has a therapist assigned",
            ));
        }
        if !appointment.status.can_transition_to(AppointmentStatus::Upcoming) {
            return Err(EngineError::InvalidTransition {
                from: appointment.status.to_string(),
                to: AppointmentStatus::Upcoming.to_string(),
            });
        }

        if let Some(existing) =
            tables.committed_assignment(staff_id, appointment.date, appointment.time, Some(appointment_id))
        {
            warn!(
                "Assignment of staff {} to appointment {} blocked by appointment {}",
                staff_id, appointment_id, existing.id
            );
            return Err(EngineError::Conflict { existing: Box::new(existing) });
        }

        let stored = tables.appointments.get_mut(&appointment_id).unwrap();
        stored.therapist_id = Some(staff_id);
        stored.status = AppointmentStatus::Upcoming;
        stored.updated_at = Utc::now();
        info!("Appointment {} assigned to staff {}", appointment_id, staff_id);
        Ok(stored.clone())
    }

    /// Lifecycle transition without assignment semantics (start, finish).
    pub async fn transition_appointment(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, EngineError> {
        let mut tables = self.tables.write().await;
        let appointment = tables
            .appointments
            .get_mut(&appointment_id)
            .ok_or(EngineError::NotFound("appointment"))?;

        if !appointment.status.can_transition_to(new_status) {
            return Err(EngineError::InvalidTransition {
                from: appointment.status.to_string(),
                to: new_status.to_string(),
            });
        }

        appointment.status = new_status;
        appointment.updated_at = Utc::now();
        info!("Appointment {} moved to {}", appointment_id, new_status);
        Ok(appointment.clone())
    }

    /// Cancel an appointment and apply the cross-entity cascade in the same
    /// critical section: a bound treatment session reverts to pending with
    /// its binding cleared, reopening both the session and the slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: String,
    ) -> Result<(Appointment, Vec<DomainEvent>), EngineError> {
        let mut tables = self.tables.write().await;
        let appointment = tables
            .appointments
            .get_mut(&appointment_id)
            .ok_or(EngineError::NotFound("appointment"))?;

        if !appointment.status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(EngineError::InvalidTransition {
                from: appointment.status.to_string(),
                to: AppointmentStatus::Cancelled.to_string(),
            });
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.rejection_reason = Some(reason);
        appointment.updated_at = Utc::now();
        let cancelled = appointment.clone();

        let mut reopened_session_id = None;
        let bound_session = tables
            .sessions
            .values_mut()
            .find(|s| s.appointment_id == Some(appointment_id));
        if let Some(session) = bound_session {
            if session.status == SessionStatus::Scheduled {
                session.status = SessionStatus::Pending;
                session.appointment_id = None;
                session.scheduled_date = None;
                session.scheduled_time = None;
                session.staff_id = None;
                session.updated_at = Utc::now();
                reopened_session_id = Some(session.id);
                info!(
                    "Session {} of course {} reopened by cancellation of appointment {}",
                    session.session_number, session.course_id, appointment_id
                );
            }
        }

        let events = vec![DomainEvent::AppointmentCancelled {
            appointment_id,
            reopened_session_id,
        }];
        info!("Appointment {} cancelled", appointment_id);
        Ok((cancelled, events))
    }

    // ==========================================================================
    // TREATMENT COURSES
    // ==========================================================================

    pub async fn insert_course(
        &self,
        course: TreatmentCourse,
        sessions: Vec<TreatmentSession>,
    ) -> TreatmentCourse {
        let mut tables = self.tables.write().await;
        for session in sessions {
            tables
                .sessions_by_course
                .insert((session.course_id, session.session_number), session.id);
            tables.sessions.insert(session.id, session);
        }
        tables.courses.insert(course.id, course.clone());
        info!(
            "Course {} created for client {} ({} sessions, expires {})",
            course.id, course.client_id, course.total_sessions, course.expiry_date
        );
        course
    }

    pub async fn course(&self, course_id: Uuid) -> Result<TreatmentCourse, EngineError> {
        let tables = self.tables.read().await;
        tables
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(EngineError::NotFound("course"))
    }

    pub async fn course_detail(
        &self,
        course_id: Uuid,
    ) -> Result<(TreatmentCourse, Vec<TreatmentSession>), EngineError> {
        let tables = self.tables.read().await;
        let course = tables
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(EngineError::NotFound("course"))?;
        let mut sessions: Vec<TreatmentSession> = tables
            .sessions
            .values()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.session_number);
        Ok((course, sessions))
    }

    pub async fn session(
        &self,
        course_id: Uuid,
        session_number: u32,
    ) -> Result<TreatmentSession, EngineError> {
        let tables = self.tables.read().await;
        let id = tables
            .sessions_by_course
            .get(&(course_id, session_number))
            .ok_or(EngineError::NotFound("session"))?;
        tables
            .sessions
            .get(id)
            .cloned()
            .ok_or(EngineError::NotFound("session"))
    }

    pub async fn activate_course(&self, course_id: Uuid) -> Result<TreatmentCourse, EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&course_id)
            .ok_or(EngineError::NotFound("course"))?;
        if course.status != CourseStatus::Draft {
            return Err(EngineError::course_state(format!(
                "only draft courses can be activated, course is {}",
                course.status
            )));
        }
        course.status = CourseStatus::Active;
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    pub async fn pause_course(
        &self,
        course_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<TreatmentCourse, EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&course_id)
            .ok_or(EngineError::NotFound("course"))?;

        if course.status != CourseStatus::Active || course.is_paused {
            return Err(EngineError::course_state(format!(
                "only active courses can be paused, course is {}",
                course.status
            )));
        }

        course.status = CourseStatus::Paused;
        course.is_paused = true;
        course.paused_date = Some(now);
        course.pause_reason = Some(reason);
        course.updated_at = now;
        info!("Course {} paused", course_id);
        Ok(course.clone())
    }

    /// Resume a paused course. The expiry date is extended by exactly the
    /// elapsed paused span (whole days), so the entitlement window never
    /// shrinks because of the business's own administrative pause.
    pub async fn resume_course(
        &self,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TreatmentCourse, EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&course_id)
            .ok_or(EngineError::NotFound("course"))?;

        if course.status != CourseStatus::Paused || !course.is_paused {
            return Err(EngineError::course_state(format!(
                "only paused courses can be resumed, course is {}",
                course.status
            )));
        }

        let paused_date = course
            .paused_date
            .ok_or_else(|| EngineError::course_state("paused course has no pause date"))?;
        let elapsed_days = (now.date_naive() - paused_date.date_naive()).num_days().max(0);

        course.expiry_date = course.expiry_date + Duration::days(elapsed_days);
        course.status = CourseStatus::Active;
        course.is_paused = false;
        course.paused_date = None;
        course.pause_reason = None;
        course.updated_at = now;
        info!(
            "Course {} resumed after {} day(s), expiry now {}",
            course_id, elapsed_days, course.expiry_date
        );
        Ok(course.clone())
    }

    /// Bind a pending session to a freshly created, already-assigned
    /// appointment. Every precondition is validated before any mutation:
    /// course active and not paused, session pending, date inside the
    /// entitlement window, time inside business hours, slot free for the
    /// staff member.
    pub async fn bind_session(
        &self,
        course_id: Uuid,
        session_number: u32,
        appointment: Appointment,
    ) -> Result<(TreatmentSession, Appointment), EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(EngineError::NotFound("course"))?;

        Self::check_course_schedulable(&course)?;
        Self::check_slot_in_window(&course, appointment.date, appointment.time)?;

        let staff_id = appointment
            .therapist_id
            .ok_or_else(|| EngineError::validation("session appointment requires a staff member"))?;

        {
            let session = tables.session_mut(course_id, session_number)?;
            if session.status != SessionStatus::Pending {
                return Err(EngineError::course_state(format!(
                    "session {} is {}, only pending sessions can be scheduled",
                    session_number, session.status
                )));
            }
        }

        if let Some(existing) =
            tables.committed_assignment(staff_id, appointment.date, appointment.time, None)
        {
            return Err(EngineError::Conflict { existing: Box::new(existing) });
        }

        tables.index_appointment(&appointment);
        tables.appointments.insert(appointment.id, appointment.clone());

        let session = tables.session_mut(course_id, session_number)?;
        session.status = SessionStatus::Scheduled;
        session.appointment_id = Some(appointment.id);
        session.scheduled_date = Some(appointment.date);
        session.scheduled_time = Some(appointment.time);
        session.staff_id = Some(staff_id);
        session.updated_at = Utc::now();
        let bound = session.clone();

        info!(
            "Session {}/{} of course {} scheduled at {} {} with staff {}",
            session_number, course.total_sessions, course_id, appointment.date, appointment.time, staff_id
        );
        Ok((bound, appointment))
    }

    /// Rebind a scheduled session to a new slot as one logical step: the
    /// replacement appointment is validated in full before the old binding
    /// is released, so a failure leaves the session exactly as it was.
    pub async fn rebind_session(
        &self,
        course_id: Uuid,
        session_number: u32,
        replacement: Appointment,
        cancel_reason: String,
    ) -> Result<(TreatmentSession, Appointment), EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(EngineError::NotFound("course"))?;

        Self::check_course_schedulable(&course)?;
        Self::check_slot_in_window(&course, replacement.date, replacement.time)?;

        let staff_id = replacement
            .therapist_id
            .ok_or_else(|| EngineError::validation("session appointment requires a staff member"))?;

        let old_appointment_id = {
            let session = tables.session_mut(course_id, session_number)?;
            if session.status != SessionStatus::Scheduled {
                return Err(EngineError::course_state(format!(
                    "session {} is {}, only scheduled sessions can be rescheduled",
                    session_number, session.status
                )));
            }
            session
                .appointment_id
                .ok_or_else(|| EngineError::course_state("scheduled session has no appointment"))?
        };

        let old_status = tables
            .appointments
            .get(&old_appointment_id)
            .map(|a| a.status)
            .ok_or(EngineError::NotFound("appointment"))?;
        if !old_status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(EngineError::InvalidTransition {
                from: old_status.to_string(),
                to: AppointmentStatus::Cancelled.to_string(),
            });
        }

        // The old appointment is ignored in the slot check: moving within
        // the same slot to a different staff member must not self-conflict.
        if let Some(existing) = tables.committed_assignment(
            staff_id,
            replacement.date,
            replacement.time,
            Some(old_appointment_id),
        ) {
            return Err(EngineError::Conflict { existing: Box::new(existing) });
        }

        // All checks passed: release the old binding, then commit the new one.
        if let Some(old) = tables.appointments.get_mut(&old_appointment_id) {
            old.status = AppointmentStatus::Cancelled;
            old.rejection_reason = Some(cancel_reason);
            old.updated_at = Utc::now();
        }

        tables.index_appointment(&replacement);
        tables.appointments.insert(replacement.id, replacement.clone());

        let session = tables.session_mut(course_id, session_number)?;
        session.appointment_id = Some(replacement.id);
        session.scheduled_date = Some(replacement.date);
        session.scheduled_time = Some(replacement.time);
        session.staff_id = Some(staff_id);
        session.updated_at = Utc::now();
        let rebound = session.clone();

        info!(
            "Session {} of course {} rescheduled to {} {} with staff {}",
            session_number, course_id, replacement.date, replacement.time, staff_id
        );
        Ok((rebound, replacement))
    }

    /// Mark one session completed and advance the course counter. Requires
    /// the bound appointment to have been completed by the delivery side.
    /// The counter is advanced under the write lock, so concurrent
    /// completion calls for the same session cannot double-increment.
    pub async fn complete_session(
        &self,
        course_id: Uuid,
        session_number: u32,
        customer_status_notes: Option<String>,
        admin_notes: Option<String>,
    ) -> Result<(TreatmentCourse, TreatmentSession), EngineError> {
        let mut tables = self.tables.write().await;

        if !tables.courses.contains_key(&course_id) {
            return Err(EngineError::NotFound("course"));
        }

        let appointment_id = {
            let session = tables.session_mut(course_id, session_number)?;
            if session.status != SessionStatus::Scheduled {
                return Err(EngineError::course_state(format!(
                    "session {} is {}, only scheduled sessions can be completed",
                    session_number, session.status
                )));
            }
            session
                .appointment_id
                .ok_or_else(|| EngineError::course_state("scheduled session has no appointment"))?
        };

        let appointment_status = tables
            .appointments
            .get(&appointment_id)
            .map(|a| a.status)
            .ok_or(EngineError::NotFound("appointment"))?;
        if appointment_status != AppointmentStatus::Completed {
            return Err(EngineError::course_state(format!(
                "bound appointment is {}, it must be completed before the session",
                appointment_status
            )));
        }

        let session = tables.session_mut(course_id, session_number)?;
        session.status = SessionStatus::Completed;
        if customer_status_notes.is_some() {
            session.customer_status_notes = customer_status_notes;
        }
        if admin_notes.is_some() {
            session.admin_notes = admin_notes;
        }
        session.updated_at = Utc::now();
        let completed = session.clone();

        let course = tables.courses.get_mut(&course_id).unwrap();
        course.completed_sessions += 1;
        debug_assert!(course.completed_sessions <= course.total_sessions);
        if course.is_fully_completed() {
            course.status = CourseStatus::Completed;
            // Closing the course ends any pause in the same step.
            course.is_paused = false;
            course.paused_date = None;
            course.pause_reason = None;
            info!("Course {} completed all {} sessions", course_id, course.total_sessions);
        }
        course.updated_at = Utc::now();

        Ok((course.clone(), completed))
    }

    /// Maintenance sweep: active, unpaused courses past their expiry date
    /// with sessions still owed become `Expired`.
    pub async fn expire_overdue_courses(&self, today: NaiveDate) -> Vec<TreatmentCourse> {
        let mut tables = self.tables.write().await;
        let mut expired = Vec::new();
        for course in tables.courses.values_mut() {
            if course.status == CourseStatus::Active
                && !course.is_paused
                && today > course.expiry_date
                && !course.is_fully_completed()
            {
                course.status = CourseStatus::Expired;
                course.updated_at = Utc::now();
                warn!(
                    "Course {} expired with {}/{} sessions completed",
                    course.id, course.completed_sessions, course.total_sessions
                );
                expired.push(course.clone());
            }
        }
        expired
    }

    /// Delete a course that never started: every session still pending and
    /// nothing completed.
    pub async fn delete_course(&self, course_id: Uuid) -> Result<(), EngineError> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get(&course_id)
            .ok_or(EngineError::NotFound("course"))?;

        let started = course.completed_sessions > 0
            || tables
                .sessions
                .values()
                .any(|s| s.course_id == course_id && s.status != SessionStatus::Pending);
        if started {
            return Err(EngineError::course_state(
                "course has started, only never-started courses can be deleted",
            ));
        }

        tables.courses.remove(&course_id);
        let session_ids: Vec<Uuid> = tables
            .sessions
            .values()
            .filter(|s| s.course_id == course_id)
            .map(|s| s.id)
            .collect();
        for id in session_ids {
            if let Some(session) = tables.sessions.remove(&id) {
                tables
                    .sessions_by_course
                    .remove(&(session.course_id, session.session_number));
            }
        }
        info!("Course {} deleted", course_id);
        Ok(())
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    fn check_course_schedulable(course: &TreatmentCourse) -> Result<(), EngineError> {
        if course.is_paused {
            return Err(EngineError::course_state(
                "course is paused, sessions cannot be scheduled",
            ));
        }
        if course.status != CourseStatus::Active {
            return Err(EngineError::course_state(format!(
                "course is {}, sessions can only be scheduled on active courses",
                course.status
            )));
        }
        Ok(())
    }

    fn check_slot_in_window(
        course: &TreatmentCourse,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), EngineError> {
        if !course.in_window(date) {
            return Err(EngineError::validation(format!(
                "session date {} is outside the course window {} to {}",
                date, course.start_date, course.expiry_date
            )));
        }
        if !hours::within_business_hours(time) {
            return Err(EngineError::validation(format!(
                "session time {} is outside business hours 09:00-22:00",
                time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::appointment::PaymentStatus;

    fn pending_appointment(date: NaiveDate, time: NaiveTime) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            therapist_id: None,
            service_id: Uuid::new_v4(),
            date,
            time,
            status: AppointmentStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            booking_group_id: Some(Uuid::new_v4()),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn slot() -> (NaiveDate, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_commit_rejects_already_assigned_appointment() {
        let store = SchedulingStore::new();
        let (date, time) = slot();
        let appointments = store
            .insert_appointments(vec![pending_appointment(date, time)])
            .await;
        let id = appointments[0].id;
        let staff = Uuid::new_v4();

        store.commit_assignment(id, staff).await.unwrap();
        let again = store.commit_assignment(id, Uuid::new_v4()).await;
        assert!(matches!(again, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_concurrent_commits_for_same_staff_slot_single_winner() {
        let state = EngineState::new(AppConfig::default());
        let (date, time) = slot();
        let appointments = state
            .store
            .insert_appointments(vec![
                pending_appointment(date, time),
                pending_appointment(date, time),
            ])
            .await;
        let staff = Uuid::new_v4();

        let a = {
            let state = state.clone();
            let id = appointments[0].id;
            tokio::spawn(async move { state.store.commit_assignment(id, staff).await })
        };
        let b = {
            let state = state.clone();
            let id = appointments[1].id;
            tokio::spawn(async move { state.store.commit_assignment(id, staff).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(EngineError::Conflict { .. }))));
    }

    #[tokio::test]
    async fn test_cancelled_appointment_frees_slot_for_recommit() {
        let store = SchedulingStore::new();
        let (date, time) = slot();
        let appointments = store
            .insert_appointments(vec![
                pending_appointment(date, time),
                pending_appointment(date, time),
            ])
            .await;
        let staff = Uuid::new_v4();

        store.commit_assignment(appointments[0].id, staff).await.unwrap();
        store
            .cancel_appointment(appointments[0].id, "no-show".to_string())
            .await
            .unwrap();
        let retaken = store.commit_assignment(appointments[1].id, staff).await.unwrap();
        assert_eq!(retaken.therapist_id, Some(staff));
    }

    #[tokio::test]
    async fn test_different_staff_can_share_a_slot() {
        let store = SchedulingStore::new();
        let (date, time) = slot();
        let appointments = store
            .insert_appointments(vec![
                pending_appointment(date, time),
                pending_appointment(date, time),
            ])
            .await;

        store
            .commit_assignment(appointments[0].id, Uuid::new_v4())
            .await
            .unwrap();
        store
            .commit_assignment(appointments[1].id, Uuid::new_v4())
            .await
            .unwrap();
    }
}
