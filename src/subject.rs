//! The subject entity: one course record with validated fields.
//!
//! A subject never holds a reference to the list that owns it. Mutators
//! return a [`SubjectEvent`] instead; the owning list consumes it, persists
//! and notifies its observer.

use crate::ids::IdAllocator;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Estimated study hours per credit point
pub const HOURS_PER_CREDIT: f64 = 30.0;

/// Validation failures for subject fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("a subject name must contain at least one character")]
    InvalidName,

    #[error("credit points must be a number of at least 1")]
    InvalidCreditPoints,

    #[error("logged hours must be a number of at least 0")]
    InvalidLoggedHours,
}

/// Persisted shape of a subject.
///
/// Field names are fixed so previously stored lists keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: u64,
    #[serde(rename = "naam")]
    pub name: String,
    #[serde(rename = "studiepunten", deserialize_with = "number_or_text")]
    pub credit_points: f64,
    #[serde(rename = "aantalUren", deserialize_with = "number_or_text")]
    pub logged_hours: f64,
}

/// Stored numbers may be JSON numbers or the raw text of a form field
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredNumber {
    Number(f64),
    Text(String),
}

fn number_or_text<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StoredNumber::deserialize(deserializer)? {
        StoredNumber::Number(value) => value,
        StoredNumber::Text(text) => parse_number(&text),
    })
}

/// Emitted by a subject after a successful field change
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectEvent {
    Renamed { id: u64, name: String },
    CreditPointsChanged { id: u64, credit_points: f64 },
    LoggedHoursChanged { id: u64, logged_hours: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    id: u64,
    name: String,
    credit_points: f64,
    logged_hours: f64,
}

fn validate_name(name: &str) -> Result<(), SubjectError> {
    if name.is_empty() {
        return Err(SubjectError::InvalidName);
    }
    Ok(())
}

fn validate_credit_points(value: f64) -> Result<(), SubjectError> {
    if !value.is_finite() || value < 1.0 {
        return Err(SubjectError::InvalidCreditPoints);
    }
    Ok(())
}

fn validate_logged_hours(value: f64) -> Result<(), SubjectError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SubjectError::InvalidLoggedHours);
    }
    Ok(())
}

/// Parse user input as a number.
///
/// Unparsable text becomes NaN so it is rejected by the field's own
/// validation, with that field's error.
pub fn parse_number(input: &str) -> f64 {
    input.trim().parse::<f64>().unwrap_or(f64::NAN)
}

impl Subject {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        credit_points: f64,
        logged_hours: f64,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        validate_name(&name)?;
        validate_credit_points(credit_points)?;
        validate_logged_hours(logged_hours)?;
        Ok(Self {
            id,
            name,
            credit_points,
            logged_hours,
        })
    }

    /// Rebuild a subject from its persisted record, keeping its id
    pub fn restore(ids: &mut IdAllocator, record: SubjectRecord) -> Result<Self, SubjectError> {
        ids.observe(record.id);
        Self::new(
            record.id,
            record.name,
            record.credit_points,
            record.logged_hours,
        )
    }

    pub fn to_record(&self) -> SubjectRecord {
        SubjectRecord {
            id: self.id,
            name: self.name.clone(),
            credit_points: self.credit_points,
            logged_hours: self.logged_hours,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credit_points(&self) -> f64 {
        self.credit_points
    }

    pub fn logged_hours(&self) -> f64 {
        self.logged_hours
    }

    pub fn estimated_hours(&self) -> f64 {
        self.credit_points * HOURS_PER_CREDIT
    }

    /// More hours logged than the credit points account for
    pub fn is_over_estimate(&self) -> bool {
        self.logged_hours > self.estimated_hours()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<SubjectEvent, SubjectError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name.clone();
        Ok(SubjectEvent::Renamed { id: self.id, name })
    }

    pub fn set_credit_points(&mut self, value: f64) -> Result<SubjectEvent, SubjectError> {
        validate_credit_points(value)?;
        self.credit_points = value;
        Ok(SubjectEvent::CreditPointsChanged {
            id: self.id,
            credit_points: value,
        })
    }

    pub fn set_logged_hours(&mut self, value: f64) -> Result<SubjectEvent, SubjectError> {
        validate_logged_hours(value)?;
        self.logged_hours = value;
        Ok(SubjectEvent::LoggedHoursChanged {
            id: self.id,
            logged_hours: value,
        })
    }

    /// Add a single hour to the logged hours
    pub fn log_hour(&mut self) -> Result<SubjectEvent, SubjectError> {
        self.set_logged_hours(self.logged_hours + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Subject {
        Subject::new(4, "Programmeren basis", 9.0, 12.0).unwrap()
    }

    #[test]
    fn test_estimated_hours_follows_credit_points() {
        let mut subject = sample();
        assert_eq!(subject.estimated_hours(), 270.0);

        subject.set_credit_points(4.0).unwrap();
        assert_eq!(subject.estimated_hours(), 120.0);

        subject.set_credit_points(1.5).unwrap();
        assert_eq!(subject.estimated_hours(), 45.0);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut subject = sample();
        assert_eq!(subject.set_name(""), Err(SubjectError::InvalidName));
        assert_eq!(subject.name(), "Programmeren basis");
    }

    #[test]
    fn test_rename() {
        let mut subject = sample();
        let event = subject.set_name("Programmeren 1").unwrap();
        assert_eq!(subject.name(), "Programmeren 1");
        assert_eq!(
            event,
            SubjectEvent::Renamed {
                id: 4,
                name: "Programmeren 1".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_credit_points() {
        let mut subject = sample();
        assert_eq!(
            subject.set_credit_points(0.0),
            Err(SubjectError::InvalidCreditPoints)
        );
        assert_eq!(
            subject.set_credit_points(parse_number("veel")),
            Err(SubjectError::InvalidCreditPoints)
        );
        assert_eq!(
            subject.set_credit_points(f64::INFINITY),
            Err(SubjectError::InvalidCreditPoints)
        );
        assert_eq!(subject.credit_points(), 9.0);
    }

    #[test]
    fn test_negative_logged_hours_rejected() {
        let mut subject = sample();
        assert_eq!(
            subject.set_logged_hours(-1.0),
            Err(SubjectError::InvalidLoggedHours)
        );
        assert_eq!(subject.logged_hours(), 12.0);
    }

    #[test]
    fn test_logged_hours_event() {
        let mut subject = sample();
        let event = subject.set_logged_hours(0.0).unwrap();
        assert_eq!(
            event,
            SubjectEvent::LoggedHoursChanged {
                id: 4,
                logged_hours: 0.0
            }
        );
    }

    #[test]
    fn test_log_hour() {
        let mut subject = sample();
        subject.log_hour().unwrap();
        subject.log_hour().unwrap();
        assert_eq!(subject.logged_hours(), 14.0);
    }

    #[test]
    fn test_over_estimate() {
        let mut subject = Subject::new(0, "Backend 1", 1.0, 30.0).unwrap();
        assert!(!subject.is_over_estimate());
        subject.log_hour().unwrap();
        assert!(subject.is_over_estimate());
    }

    #[test]
    fn test_new_validates_fields() {
        assert_eq!(
            Subject::new(0, "", 3.0, 0.0),
            Err(SubjectError::InvalidName)
        );
        assert_eq!(
            Subject::new(0, "X", 0.5, 0.0),
            Err(SubjectError::InvalidCreditPoints)
        );
        assert_eq!(
            Subject::new(0, "X", 3.0, -0.5),
            Err(SubjectError::InvalidLoggedHours)
        );
    }

    #[test]
    fn test_record_uses_persisted_field_names() {
        let json = serde_json::to_value(sample().to_record()).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["naam"], "Programmeren basis");
        assert_eq!(json["studiepunten"], 9.0);
        assert_eq!(json["aantalUren"], 12.0);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_restore_keeps_id_and_fields() {
        let original = sample();
        let text = serde_json::to_string(&original.to_record()).unwrap();
        let record: SubjectRecord = serde_json::from_str(&text).unwrap();

        let mut ids = IdAllocator::new();
        let restored = Subject::restore(&mut ids, record).unwrap();
        assert_eq!(restored, original);
        assert_eq!(ids.next(), Some(5));
    }

    #[test]
    fn test_restore_accepts_integer_numbers() {
        let record: SubjectRecord =
            serde_json::from_str(r#"{"id":0,"naam":"X","studiepunten":2,"aantalUren":5}"#)
                .unwrap();
        let mut ids = IdAllocator::new();
        let subject = Subject::restore(&mut ids, record).unwrap();
        assert_eq!(subject.credit_points(), 2.0);
        assert_eq!(subject.logged_hours(), 5.0);
        assert_eq!(subject.estimated_hours(), 60.0);
    }

    #[test]
    fn test_restore_accepts_numbers_stored_as_text() {
        let record: SubjectRecord = serde_json::from_str(
            r#"{"id":3,"naam":"X","studiepunten":"6","aantalUren":" 5.5"}"#,
        )
        .unwrap();
        assert_eq!(record.credit_points, 6.0);
        assert_eq!(record.logged_hours, 5.5);

        // written back as numbers
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["studiepunten"], 6.0);
        assert_eq!(json["aantalUren"], 5.5);
    }

    #[test]
    fn test_restore_rejects_non_numeric_text() {
        let record: SubjectRecord = serde_json::from_str(
            r#"{"id":3,"naam":"X","studiepunten":"veel","aantalUren":"0"}"#,
        )
        .unwrap();
        let mut ids = IdAllocator::new();
        assert_eq!(
            Subject::restore(&mut ids, record),
            Err(SubjectError::InvalidCreditPoints)
        );
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 3 "), 3.0);
        assert_eq!(parse_number("2.5"), 2.5);
        assert!(parse_number("").is_nan());
        assert!(parse_number("abc").is_nan());
    }
}
