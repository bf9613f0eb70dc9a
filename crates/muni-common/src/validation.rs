use crate::models::auth::{EmployeeRequest, RegisterRequest};
use crate::models::reservation::ReservationSlot;
use crate::rut::is_valid_rut;
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};

pub const MIN_PASSWORD_LEN: usize = 6;

const CONTRACT_TYPES: &[&str] = &["planta", "contrata", "honorarios"];

/// Parse an ISO date as typed in the reservation form (`2025-11-10`)
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

/// Parse a time as typed in the reservation form; seconds are optional
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("Invalid time '{}', expected HH:MM", value))
}

/// Validate a complete slot and return its typed date and time
pub fn parse_slot(slot: &ReservationSlot) -> Result<(NaiveDate, NaiveTime)> {
    if !slot.is_complete() {
        bail!("Date, time and service type are required");
    }
    let date = parse_date(&slot.date)?;
    let time = parse_time(&slot.time)?;
    Ok((date, time))
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => bail!("Invalid email address '{}'", email),
    }
}

/// Validates a registration form and returns a list of warnings.
/// Errors are returned as Err.
pub fn validate_registration(req: &RegisterRequest) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    validate_email(&req.email)?;
    if req.nombre.trim().is_empty() {
        bail!("Name is required");
    }
    if !is_valid_rut(&req.rut) {
        bail!("Invalid RUT '{}'", req.rut);
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        );
    }

    if req.telefono.is_none() {
        warnings.push("No phone number given; reservation forms will not autofill it".to_string());
    }
    if req.direccion.is_none() {
        warnings.push("No address given; reservation forms will not autofill it".to_string());
    }

    Ok(warnings)
}

/// Validates a staff registration form
pub fn validate_employee(req: &EmployeeRequest) -> Result<()> {
    validate_email(&req.email)?;
    if !is_valid_rut(&req.rut) {
        bail!("Invalid RUT '{}'", req.rut);
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        );
    }
    if req.cargo.trim().is_empty() || req.departamento.trim().is_empty() {
        bail!("Position and department are required");
    }
    parse_date(&req.fecha_ingreso).context("Invalid start date")?;
    if !CONTRACT_TYPES.contains(&req.tipo_contrato.as_str()) {
        bail!(
            "Unknown contract type '{}', expected one of: {}",
            req.tipo_contrato,
            CONTRACT_TYPES.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            email: "vecino@muni.cl".to_string(),
            nombre: "Ana Pérez".to_string(),
            rut: "12.345.678-5".to_string(),
            password: "secreto1".to_string(),
            telefono: Some("+56911111111".to_string()),
            direccion: Some("Av. Central 123".to_string()),
        }
    }

    fn employee() -> EmployeeRequest {
        EmployeeRequest {
            email: "func@muni.cl".to_string(),
            nombre: "Juan Soto".to_string(),
            rut: "11111111-1".to_string(),
            password: "secreto1".to_string(),
            cargo: "Inspector".to_string(),
            departamento: "Tránsito".to_string(),
            fecha_ingreso: "2024-03-01".to_string(),
            tipo_contrato: "planta".to_string(),
        }
    }

    #[test]
    fn test_parse_slot_accepts_both_time_shapes() {
        let (date, time) =
            parse_slot(&ReservationSlot::new("2025-11-10", "14:30", "tipoA")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());

        let (_, time) =
            parse_slot(&ReservationSlot::new("2025-11-10", "09:05:00", "tipoA")).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    }

    #[test]
    fn test_parse_slot_rejects_incomplete_or_malformed() {
        assert!(parse_slot(&ReservationSlot::new("", "14:30", "tipoA")).is_err());
        let err = parse_slot(&ReservationSlot::new("10/11/2025", "14:30", "tipoA")).unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
        let err = parse_slot(&ReservationSlot::new("2025-11-10", "25:00", "tipoA")).unwrap_err();
        assert!(err.to_string().contains("Invalid time"));
    }

    #[test]
    fn test_valid_registration_has_no_warnings() {
        let warnings = validate_registration(&registration()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_registration_missing_contact_warns() {
        let mut req = registration();
        req.telefono = None;
        req.direccion = None;
        let warnings = validate_registration(&req).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_registration_errors() {
        let mut req = registration();
        req.rut = "12.345.678-4".to_string();
        assert!(validate_registration(&req)
            .unwrap_err()
            .to_string()
            .contains("Invalid RUT"));

        let mut req = registration();
        req.email = "sin-arroba".to_string();
        assert!(validate_registration(&req).is_err());

        let mut req = registration();
        req.password = "corta".to_string();
        assert!(validate_registration(&req)
            .unwrap_err()
            .to_string()
            .contains("at least 6"));
    }

    #[test]
    fn test_employee_validation() {
        assert!(validate_employee(&employee()).is_ok());

        let mut req = employee();
        req.tipo_contrato = "freelance".to_string();
        assert!(validate_employee(&req)
            .unwrap_err()
            .to_string()
            .contains("Unknown contract type"));

        let mut req = employee();
        req.fecha_ingreso = "ayer".to_string();
        assert!(validate_employee(&req).is_err());
    }
}
