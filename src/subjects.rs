//! The subject list: an ordered collection kept in sync with one storage slot.
//!
//! Every successful mutation rewrites the whole slot and notifies the change
//! observer so the front end can re-render.

use crate::ids::IdAllocator;
use crate::store::{KeyValueStore, StoreError};
use crate::subject::{Subject, SubjectError, SubjectEvent, SubjectRecord};
use thiserror::Error;

/// Storage key used when nothing else is configured
pub const DEFAULT_STORAGE_KEY: &str = "vakkenLijst";

/// Name and credit points of the subjects seeded into an empty store
pub const DEFAULT_SUBJECTS: &[(&str, f64)] = &[
    ("IT essentials", 3.0),
    ("IT landscape", 3.0),
    ("Databases basis", 4.0),
    ("Databases gevorderd", 4.0),
    ("Programmeren basis", 9.0),
    ("Programmeren gevorderd", 6.0),
    ("Frontend basis", 7.0),
    ("Frontend gevorderd", 5.0),
    ("Backend 1", 4.0),
    ("Verkenning van de werkplek", 4.0),
    ("Communicatievaardigheden", 3.0),
    ("Participatie op de werkplek 1", 6.0),
    ("Teamvaardigheden", 3.0),
];

#[derive(Debug, Error)]
pub enum ListError {
    #[error("a subject named '{0}' already exists")]
    DuplicateName(String),

    #[error("no subject with id {0}")]
    UnknownSubject(u64),

    #[error("stored list contains id {0} more than once")]
    DuplicateId(u64),

    #[error("no subject ids left to hand out")]
    IdsExhausted,

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored list could not be parsed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A single field change requested by the front end
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectEdit {
    Name(String),
    CreditPoints(f64),
    LoggedHours(f64),
    LogHour,
}

/// Column sums shown under the table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub credit_points: f64,
    pub estimated_hours: f64,
    pub logged_hours: f64,
}

impl Totals {
    pub fn of(subjects: &[Subject]) -> Self {
        subjects.iter().fold(Self::default(), |acc, s| Self {
            credit_points: acc.credit_points + s.credit_points(),
            estimated_hours: acc.estimated_hours + s.estimated_hours(),
            logged_hours: acc.logged_hours + s.logged_hours(),
        })
    }
}

type ChangeObserver = Box<dyn FnMut(&[Subject])>;

pub struct SubjectList<S: KeyValueStore> {
    store: S,
    key: String,
    ids: IdAllocator,
    subjects: Vec<Subject>,
    on_change: Option<ChangeObserver>,
}

impl<S: KeyValueStore> std::fmt::Debug for SubjectList<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectList")
            .field("key", &self.key)
            .field("subjects", &self.subjects)
            .finish()
    }
}

impl<S: KeyValueStore> SubjectList<S> {
    /// Load the list stored under `key`, seeding the defaults when the slot is empty
    pub fn load(store: S, key: impl Into<String>) -> Result<Self, ListError> {
        let mut list = Self {
            store,
            key: key.into(),
            ids: IdAllocator::new(),
            subjects: Vec::new(),
            on_change: None,
        };
        list.fill_from_store()?;
        Ok(list)
    }

    fn fill_from_store(&mut self) -> Result<(), ListError> {
        match self.store.get(&self.key)? {
            Some(stored) => {
                let records: Vec<SubjectRecord> = serde_json::from_str(&stored)?;
                let mut ids = IdAllocator::new();
                let mut subjects: Vec<Subject> = Vec::with_capacity(records.len());
                for record in records {
                    if subjects.iter().any(|s| s.id() == record.id) {
                        return Err(ListError::DuplicateId(record.id));
                    }
                    subjects.push(Subject::restore(&mut ids, record)?);
                }
                tracing::debug!(key = %self.key, count = subjects.len(), "subjects loaded");
                self.ids = ids;
                self.subjects = subjects;
            }
            None => {
                let mut ids = IdAllocator::new();
                let mut subjects = Vec::with_capacity(DEFAULT_SUBJECTS.len());
                for (name, credit_points) in DEFAULT_SUBJECTS {
                    let id = ids.next().ok_or(ListError::IdsExhausted)?;
                    subjects.push(Subject::new(id, *name, *credit_points, 0.0)?);
                }
                self.ids = ids;
                self.subjects = subjects;
                tracing::info!(key = %self.key, count = self.subjects.len(), "seeded default subjects");
                self.save()?;
            }
        }
        Ok(())
    }

    /// Drop the in-memory list and read it back from storage
    pub fn reload(&mut self) -> Result<(), ListError> {
        self.fill_from_store()?;
        self.notify();
        Ok(())
    }

    /// Write the whole list to the storage slot
    pub fn save(&mut self) -> Result<(), ListError> {
        let records: Vec<SubjectRecord> = self.subjects.iter().map(Subject::to_record).collect();
        let json = serde_json::to_string(&records)?;
        self.store.set(&self.key, json)?;
        tracing::debug!(key = %self.key, count = records.len(), "subjects saved");
        Ok(())
    }

    /// Register the callback invoked with the current subjects after each change
    pub fn set_on_change(&mut self, observer: impl FnMut(&[Subject]) + 'static) {
        self.on_change = Some(Box::new(observer));
    }

    fn notify(&mut self) {
        if let Some(observer) = self.on_change.as_mut() {
            observer(&self.subjects);
        }
    }

    /// Add a subject with zero logged hours and return its id
    pub fn add(&mut self, name: &str, credit_points: f64) -> Result<u64, ListError> {
        if self.find_by_name(name).is_some() {
            return Err(ListError::DuplicateName(name.to_string()));
        }
        let id = self.ids.peek().ok_or(ListError::IdsExhausted)?;
        let subject = Subject::new(id, name, credit_points, 0.0)?;
        self.subjects.push(subject);
        if let Err(e) = self.save() {
            self.subjects.pop();
            return Err(e);
        }
        self.ids.next();
        tracing::info!(id, name, credit_points, "subject added");
        self.notify();
        Ok(id)
    }

    /// Remove the subject with `id`; returns false when there was none
    pub fn delete(&mut self, id: u64) -> Result<bool, ListError> {
        let Some(index) = self.subjects.iter().position(|s| s.id() == id) else {
            tracing::debug!(id, "delete of unknown subject ignored");
            return Ok(false);
        };
        let removed = self.subjects.remove(index);
        if let Err(e) = self.save() {
            self.subjects.insert(index, removed);
            return Err(e);
        }
        tracing::info!(id, name = removed.name(), "subject deleted");
        self.notify();
        Ok(true)
    }

    /// Apply one field change to the subject with `id` and persist it.
    ///
    /// The change is undone when it cannot be written to storage.
    pub fn edit(&mut self, id: u64, edit: SubjectEdit) -> Result<SubjectEvent, ListError> {
        let index = self
            .subjects
            .iter()
            .position(|s| s.id() == id)
            .ok_or(ListError::UnknownSubject(id))?;

        if let SubjectEdit::Name(name) = &edit {
            if let Some(other) = self.find_by_name(name) {
                if other.id() != id {
                    return Err(ListError::DuplicateName(name.clone()));
                }
            }
        }

        let previous = self.subjects[index].clone();
        let subject = &mut self.subjects[index];
        let event = match edit {
            SubjectEdit::Name(name) => subject.set_name(name)?,
            SubjectEdit::CreditPoints(value) => subject.set_credit_points(value)?,
            SubjectEdit::LoggedHours(value) => subject.set_logged_hours(value)?,
            SubjectEdit::LogHour => subject.log_hour()?,
        };
        if let Err(e) = self.handle_event(&event) {
            self.subjects[index] = previous;
            return Err(e);
        }
        Ok(event)
    }

    fn handle_event(&mut self, event: &SubjectEvent) -> Result<(), ListError> {
        self.save()?;
        match event {
            SubjectEvent::Renamed { id, name } => {
                tracing::info!(id, name = name.as_str(), "subject renamed")
            }
            SubjectEvent::CreditPointsChanged { id, credit_points } => {
                tracing::info!(id, credit_points, "credit points changed")
            }
            SubjectEvent::LoggedHoursChanged { id, logged_hours } => {
                tracing::debug!(id, logged_hours, "logged hours changed")
            }
        }
        self.notify();
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name() == name)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.subjects)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
