//! Translation of database errors into domain errors.

use domain::DomainError;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Maps a sqlx error onto the domain error taxonomy.
pub fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return DomainError::Conflict(unique_message(db_err.constraint()));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return DomainError::NotFound("Referenced record not found".to_string());
            }
            Some(CHECK_VIOLATION) => {
                return DomainError::Validation(format!(
                    "Value violates constraint {}",
                    db_err.constraint().unwrap_or("unknown")
                ));
            }
            _ => {}
        }
    }
    error!(error = %err, "Database error");
    DomainError::Storage(err.to_string())
}

fn unique_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_phone_number_key") => "A user with this phone number already exists",
        Some("idx_registrations_active") => "User is already registered for this event",
        Some("host_assignments_event_id_host_user_id_key") => {
            "Host is already assigned to this event"
        }
        Some("vehicle_shares_event_id_driver_user_id_key") => {
            "Driver already drives a vehicle for this event"
        }
        Some("vehicle_share_passengers_event_id_passenger_user_id_key") => {
            "User already rides in a vehicle for this event"
        }
        _ => "Record already exists",
    }
    .to_string()
}
