//! Multi-step booking forms.
//!
//! The test-drive and loan-enquiry forms walk through a fixed sequence of
//! steps. Moving forward requires every required field of the current step
//! to be filled in; moving back is allowed to any earlier step. Nothing is
//! persisted until [`Wizard::finish`] hands the collected fields over.

use serde_json::Value;

use crate::format::is_blank;
use crate::listview::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardStep {
    pub title: &'static str,
    pub required_fields: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The current step still has blank required fields
    Incomplete {
        step: usize,
        missing: Vec<&'static str>,
    },
    /// Target step is not an earlier step
    InvalidStep(usize),
    /// Already on the last step; use `finish`
    NoNextStep,
    /// `finish` called before reaching the last step
    NotOnLastStep(usize),
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::Incomplete { step, missing } => {
                write!(f, "step {} is missing: {}", step + 1, missing.join(", "))
            }
            WizardError::InvalidStep(step) => write!(f, "cannot go back to step {}", step + 1),
            WizardError::NoNextStep => write!(f, "already on the last step"),
            WizardError::NotOnLastStep(step) => {
                write!(f, "cannot submit from step {}", step + 1)
            }
        }
    }
}

impl std::error::Error for WizardError {}

/// A linear form flow S0 → S1 → … → Sn.
#[derive(Debug, Clone)]
pub struct Wizard {
    steps: Vec<WizardStep>,
    current: usize,
    fields: Record,
}

impl Wizard {
    pub fn new(steps: Vec<WizardStep>) -> Self {
        Self {
            steps,
            current: 0,
            fields: Record::new(),
        }
    }

    /// Car, contact details, schedule.
    pub fn test_drive() -> Self {
        Self::new(vec![
            WizardStep {
                title: "Choose your car",
                required_fields: &["car_name", "location"],
            },
            WizardStep {
                title: "Your details",
                required_fields: &["name", "phone", "email"],
            },
            WizardStep {
                title: "Pick a slot",
                required_fields: &["preferred_date", "preferred_time"],
            },
        ])
    }

    /// Vehicle and amount, applicant, income.
    pub fn loan_enquiry() -> Self {
        Self::new(vec![
            WizardStep {
                title: "Vehicle",
                required_fields: &["car_name", "loan_amount"],
            },
            WizardStep {
                title: "Applicant",
                required_fields: &["name", "phone", "employment_type"],
            },
            WizardStep {
                title: "Income",
                required_fields: &["monthly_income", "tenure_months"],
            },
        ])
    }

    /// Zero-based index of the current step.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step(&self) -> Option<&WizardStep> {
        self.steps.get(self.current)
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Required fields of the current step that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.missing_in(self.current)
    }

    fn missing_in(&self, step: usize) -> Vec<&'static str> {
        self.steps
            .get(step)
            .map(|s| {
                s.required_fields
                    .iter()
                    .copied()
                    .filter(|field| is_blank(self.fields.get(*field)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_step(&self, step: usize) -> Result<(), WizardError> {
        let missing = self.missing_in(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Incomplete { step, missing })
        }
    }

    /// Move to the next step if the current one is complete.
    pub fn advance(&mut self) -> Result<usize, WizardError> {
        if self.is_last_step() {
            return Err(WizardError::NoNextStep);
        }
        self.check_step(self.current)?;
        self.current += 1;
        Ok(self.current)
    }

    /// Return to an earlier step. Entered values are kept.
    pub fn back_to(&mut self, step: usize) -> Result<(), WizardError> {
        if step >= self.current {
            return Err(WizardError::InvalidStep(step));
        }
        self.current = step;
        Ok(())
    }

    /// Collected fields, once the last step is reached and every step is complete.
    pub fn finish(&self) -> Result<Record, WizardError> {
        if !self.is_last_step() {
            return Err(WizardError::NotOnLastStep(self.current));
        }
        for step in 0..self.steps.len() {
            self.check_step(step)?;
        }
        Ok(self.fields.clone())
    }

    /// Start over with an empty form.
    pub fn reset(&mut self) {
        self.current = 0;
        self.fields.clear();
    }
}
