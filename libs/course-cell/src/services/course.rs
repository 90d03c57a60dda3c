// libs/course-cell/src/services/course.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use shared_clients::{CatalogClient, IdentityClient, Notifier};
use shared_models::course::{
    CourseStatus, TreatmentCourse, TreatmentSession,
};
use shared_models::error::EngineError;
use shared_models::event::ScheduleEvent;
use shared_store::EngineState;

use crate::models::{CompleteSessionRequest, CreateCourseRequest, PauseCourseRequest};

/// Prepaid treatment course lifecycle: creation, activation, pause and
/// resume, completion accounting and expiry.
pub struct TreatmentCourseService {
    state: Arc<EngineState>,
    identity: IdentityClient,
    catalog: CatalogClient,
    notifier: Notifier,
}

impl TreatmentCourseService {
    pub fn new(state: &Arc<EngineState>) -> Self {
        Self {
            state: state.clone(),
            identity: IdentityClient::new(&state.config),
            catalog: CatalogClient::new(&state.config),
            notifier: Notifier::new(&state.config),
        }
    }

    /// Create a draft course with every session pending. The entitlement
    /// window is derived from the recurrence cadence, rounding partial
    /// periods up so the promised pace always fits.
    pub async fn create_course(
        &self,
        request: CreateCourseRequest,
    ) -> Result<TreatmentCourse, EngineError> {
        if request.total_sessions == 0 {
            return Err(EngineError::validation("course requires at least one session"));
        }
        if request.recurrence.value == 0 {
            return Err(EngineError::validation("recurrence cadence must be at least one"));
        }

        self.identity
            .ensure_active_user(request.client_id, "client")
            .await?;
        self.catalog.ensure_service_exists(request.service_id).await?;

        let expiry_date = request
            .recurrence
            .expiry_from(request.start_date, request.total_sessions)
            .ok_or_else(|| EngineError::validation("could not derive course expiry date"))?;

        let now = Utc::now();
        let course = TreatmentCourse {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            service_id: request.service_id,
            total_sessions: request.total_sessions,
            recurrence: request.recurrence,
            start_date: request.start_date,
            expiry_date,
            status: CourseStatus::Draft,
            is_paused: false,
            paused_date: None,
            pause_reason: None,
            completed_sessions: 0,
            created_at: now,
            updated_at: now,
        };
        let sessions: Vec<TreatmentSession> = (1..=request.total_sessions)
            .map(|n| TreatmentSession::fresh(course.id, n, now))
            .collect();

        let course = self.state.store.insert_course(course, sessions).await;
        self.notifier.publish(ScheduleEvent::course_created(&course));
        Ok(course)
    }

    pub async fn detail(
        &self,
        course_id: Uuid,
    ) -> Result<(TreatmentCourse, Vec<TreatmentSession>), EngineError> {
        self.state.store.course_detail(course_id).await
    }

    pub async fn activate(&self, course_id: Uuid) -> Result<TreatmentCourse, EngineError> {
        let course = self.state.store.activate_course(course_id).await?;
        info!("Course {} activated", course_id);
        Ok(course)
    }

    pub async fn pause(
        &self,
        course_id: Uuid,
        request: PauseCourseRequest,
    ) -> Result<TreatmentCourse, EngineError> {
        if request.reason.trim().is_empty() {
            return Err(EngineError::validation("pausing requires a reason"));
        }
        let course = self
            .state
            .store
            .pause_course(course_id, request.reason, Utc::now())
            .await?;
        self.notifier.publish(ScheduleEvent::course_paused(&course));
        Ok(course)
    }

    pub async fn resume(&self, course_id: Uuid) -> Result<TreatmentCourse, EngineError> {
        let course = self.state.store.resume_course(course_id, Utc::now()).await?;
        self.notifier.publish(ScheduleEvent::course_resumed(&course));
        Ok(course)
    }

    /// Record one delivered session. The bound appointment must already be
    /// completed; the course counter advances by exactly one and the course
    /// closes when the last session is recorded.
    pub async fn complete_session(
        &self,
        course_id: Uuid,
        session_number: u32,
        request: CompleteSessionRequest,
    ) -> Result<(TreatmentCourse, TreatmentSession), EngineError> {
        let (course, session) = self
            .state
            .store
            .complete_session(
                course_id,
                session_number,
                request.customer_status_notes,
                request.admin_notes,
            )
            .await?;

        self.notifier.publish(ScheduleEvent::session_completed(&session));
        if course.status == CourseStatus::Completed {
            self.notifier.publish(ScheduleEvent::course_completed(&course));
        }
        Ok((course, session))
    }

    pub async fn expire_overdue(&self, as_of: Option<NaiveDate>) -> Vec<TreatmentCourse> {
        let today = as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.state.store.expire_overdue_courses(today).await
    }

    pub async fn delete(&self, course_id: Uuid) -> Result<(), EngineError> {
        self.state.store.delete_course(course_id).await
    }
}
