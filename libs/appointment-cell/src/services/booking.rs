// libs/appointment-cell/src/services/booking.rs
use chrono::{NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use notification_cell::MailNotifier;
use shared_database::supabase::SupabaseClient;
use shared_models::{AppointmentId, DoctorId, PatientId};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    notifier: Arc<MailNotifier>,
}

impl BookingService {
    pub fn new(supabase: Arc<SupabaseClient>, notifier: Arc<MailNotifier>) -> Self {
        Self { supabase, notifier }
    }

    /// Books a slot with a doctor. The pre-check keeps the common double-book
    /// out of the store; the store's uniqueness constraint settles races.
    pub async fn book_appointment(
        &self,
        patient_id: &PatientId,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            patient_id, request.doctor_id
        );

        let (date, time) = parse_schedule(&request.date, &request.time)?;

        self.verify_doctor_exists(&request.doctor_id, auth_token).await?;
        let patient_email = self.fetch_patient_email(patient_id, auth_token).await?;
        self.ensure_slot_free(&request.doctor_id, date, time, None, auth_token)
            .await?;

        let appointment_data = json!({
            "patient_id": patient_id,
            "doctor_id": request.doctor_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time.format("%H:%M:%S").to_string(),
            "status": AppointmentStatus::Booked.to_string(),
            "created_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Booking returned no row".to_string(),
            ));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked", appointment.id);

        self.notify(
            patient_email,
            "Appointment confirmed",
            format!(
                "Your appointment on {} at {} is confirmed.",
                appointment.date.format("%Y-%m-%d"),
                appointment.time.format("%H:%M"),
            ),
        );

        Ok(appointment)
    }

    /// Moves an existing appointment to a new date/time. The doctor is taken
    /// from the stored row, never from the caller.
    pub async fn reschedule_appointment(
        &self,
        patient_id: &PatientId,
        appointment_id: &AppointmentId,
        request: RescheduleAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Rescheduling appointment {} for patient {}",
            appointment_id, patient_id
        );

        let (date, time) = parse_schedule(&request.date, &request.time)?;

        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.ensure_owner(&appointment, patient_id)?;

        // The slot probe must not count the appointment being moved
        self.ensure_slot_free(
            &appointment.doctor_id,
            date,
            time,
            Some(appointment_id),
            auth_token,
        )
        .await?;

        let patient_email = self.fetch_patient_email(patient_id, auth_token).await?;

        let update_data = json!({
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time.format("%H:%M:%S").to_string(),
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let updated: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!(
            "Appointment {} moved to {} {}",
            updated.id,
            updated.date.format("%Y-%m-%d"),
            updated.time.format("%H:%M"),
        );

        self.notify(
            patient_email,
            "Appointment rescheduled",
            format!(
                "Your appointment has been moved to {} at {}.",
                updated.date.format("%Y-%m-%d"),
                updated.time.format("%H:%M"),
            ),
        );

        Ok(updated)
    }

    /// Permanently removes an appointment owned by the caller.
    pub async fn cancel_appointment(
        &self,
        patient_id: &PatientId,
        appointment_id: &AppointmentId,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        info!(
            "Cancelling appointment {} for patient {}",
            appointment_id, patient_id
        );

        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.ensure_owner(&appointment, patient_id)?;

        let patient_email = self.fetch_patient_email(patient_id, auth_token).await?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, Some(auth_token), None, Some(headers))
            .await?;

        // The row can vanish between the ownership read and the delete
        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} cancelled", appointment_id);

        self.notify(
            patient_email,
            "Appointment cancelled",
            format!(
                "Your appointment on {} at {} has been cancelled.",
                appointment.date.format("%Y-%m-%d"),
                appointment.time.format("%H:%M"),
            ),
        );

        Ok(())
    }

    /// Single appointment, readable only by its owner.
    pub async fn view_appointment(
        &self,
        patient_id: &PatientId,
        appointment_id: &AppointmentId,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        self.ensure_owner(&appointment, patient_id)?;
        Ok(appointment)
    }

    /// All of the caller's appointments, earliest first.
    pub async fn list_appointments(
        &self,
        patient_id: &PatientId,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for patient {}", patient_id);

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,time.asc",
            patient_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        Ok(appointments)
    }

    async fn get_appointment(
        &self,
        appointment_id: &AppointmentId,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    fn ensure_owner(
        &self,
        appointment: &Appointment,
        patient_id: &PatientId,
    ) -> Result<(), AppointmentError> {
        if appointment.patient_id != *patient_id {
            return Err(AppointmentError::Forbidden);
        }
        Ok(())
    }

    async fn ensure_slot_free(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<&AppointmentId>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=eq.{}&select=id",
            doctor_id,
            date.format("%Y-%m-%d"),
            time.format("%H:%M:%S"),
            AppointmentStatus::Booked,
        );
        if let Some(appointment_id) = exclude {
            path.push_str(&format!("&id=neq.{}", appointment_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        if result.is_empty() {
            Ok(())
        } else {
            Err(AppointmentError::Conflict)
        }
    }

    async fn verify_doctor_exists(
        &self,
        doctor_id: &DoctorId,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=id", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        if result.is_empty() {
            return Err(AppointmentError::DoctorNotFound);
        }
        Ok(())
    }

    async fn fetch_patient_email(
        &self,
        patient_id: &PatientId,
        auth_token: &str,
    ) -> Result<String, AppointmentError> {
        let path = format!("/rest/v1/patients?id=eq.{}&select=id,email", patient_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let row = result.first().ok_or(AppointmentError::PatientNotFound)?;
        Ok(row["email"].as_str().unwrap_or_default().to_string())
    }

    /// Delivery runs detached so a slow or dead relay cannot fail the
    /// operation that triggered it.
    fn notify(&self, recipient: String, subject: &'static str, body: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if !notifier.send(&recipient, subject, &body).await {
                warn!("Notification '{}' to {} was not delivered", subject, recipient);
            }
        });
    }
}

fn parse_schedule(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), AppointmentError> {
    let mut errors = Vec::new();

    let parsed_date = NaiveDate::parse_from_str(date, "%Y-%m-%d");
    if parsed_date.is_err() {
        errors.push(format!("'{}' is not a valid YYYY-MM-DD date", date));
    }

    let parsed_time = NaiveTime::parse_from_str(time, "%H:%M");
    if parsed_time.is_err() {
        errors.push(format!("'{}' is not a valid HH:MM time", time));
    }

    match (parsed_date, parsed_time) {
        (Ok(date), Ok(time)) => Ok((date, time)),
        _ => Err(AppointmentError::Validation(errors)),
    }
}
