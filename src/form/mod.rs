//! The two-step application wizard.
//!
//! [`ApplicationForm`] holds entered values and the current [`Step`]. Moving forward
//! from [`Step::Details`] and submitting from [`Step::Motivation`] are both guarded by
//! presence validation of that step's fields; going back never loses input.

pub mod client;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::submission::ApplicationPayload;

pub const REQUIRED_MESSAGE: &str = "This is required";
pub const WHY_REQUIRED_MESSAGE: &str = "Please share why you want to join Eyrie School.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Details,
    Motivation,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Details => 1,
            Step::Motivation => 2,
        }
    }

    pub fn fields(self) -> &'static [Field] {
        match self {
            Step::Details => &[
                Field::FullName,
                Field::Phone,
                Field::Email,
                Field::University,
                Field::Department,
                Field::Level,
            ],
            Step::Motivation => &[Field::Why, Field::Discord],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Phone,
    Email,
    University,
    Department,
    Level,
    Why,
    Discord,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full Name",
            Field::Phone => "Phone Number (WhatsApp preferred)",
            Field::Email => "Email",
            Field::University => "University Name",
            Field::Department => "Department",
            Field::Level => "Level",
            Field::Why => "Why do you want to join Eyrie School? (50-100 words)",
            Field::Discord => "Have you joined our Discord community?",
        }
    }

    /// Allowed answers for single-choice fields.
    pub fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            Field::Level => Some(&["100 Level", "200 Level"]),
            Field::Discord => Some(&["Yes", "No"]),
            _ => None,
        }
    }

    pub fn required_message(self) -> &'static str {
        match self {
            Field::Why => WHY_REQUIRED_MESSAGE,
            _ => REQUIRED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Hundred,
    TwoHundred,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Hundred => "100 Level",
            Level::TwoHundred => "200 Level",
        }
    }
}

impl FromStr for Level {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "100 Level" | "100" => Ok(Level::Hundred),
            "200 Level" | "200" => Ok(Level::TwoHundred),
            other => Err(FormError::InvalidChoice {
                field: Field::Level,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discord {
    Yes,
    No,
}

impl Discord {
    pub const fn as_str(self) -> &'static str {
        match self {
            Discord::Yes => "Yes",
            Discord::No => "No",
        }
    }
}

impl FromStr for Discord {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Discord::Yes),
            "no" | "n" => Ok(Discord::No),
            _ => Err(FormError::InvalidChoice {
                field: Field::Discord,
                value: s.trim().to_string(),
            }),
        }
    }
}

/// One validation failure, rendered next to its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),

    #[error("'{value}' is not a valid choice for {}", .field.label())]
    InvalidChoice { field: Field, value: String },

    #[error("{} is not on step {}", .field.label(), .step.number())]
    WrongStep { field: Field, step: Step },

    #[error("the application can only be submitted from step 2")]
    NotOnFinalStep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Values {
    full_name: String,
    phone: String,
    email: String,
    university: String,
    department: String,
    level: Option<Level>,
    why: String,
    discord: Option<Discord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationForm {
    step: Step,
    values: Values,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationForm {
    pub fn new() -> Self {
        Self {
            step: Step::Details,
            values: Values::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Set a field on the current step. Choice fields accept their listed answers only.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        if !self.step.fields().contains(&field) {
            return Err(FormError::WrongStep {
                field,
                step: self.step,
            });
        }

        let v = &mut self.values;
        match field {
            Field::FullName => v.full_name = value.to_string(),
            Field::Phone => v.phone = value.to_string(),
            Field::Email => v.email = value.to_string(),
            Field::University => v.university = value.to_string(),
            Field::Department => v.department = value.to_string(),
            Field::Why => v.why = value.to_string(),
            Field::Level => v.level = Some(value.parse()?),
            Field::Discord => v.discord = Some(value.parse()?),
        }
        Ok(())
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        let v = &self.values;
        let s = match field {
            Field::FullName => v.full_name.as_str(),
            Field::Phone => v.phone.as_str(),
            Field::Email => v.email.as_str(),
            Field::University => v.university.as_str(),
            Field::Department => v.department.as_str(),
            Field::Why => v.why.as_str(),
            Field::Level => return v.level.map(Level::as_str),
            Field::Discord => return v.discord.map(Discord::as_str),
        };
        if s.trim().is_empty() { None } else { Some(s) }
    }

    /// Presence check for every field of `step`.
    pub fn validate(&self, step: Step) -> Vec<FieldError> {
        step.fields()
            .iter()
            .filter(|f| self.value(**f).is_none())
            .map(|f| FieldError {
                field: *f,
                message: f.required_message(),
            })
            .collect()
    }

    /// Advance to step 2 once every step-1 field is present. Stays put otherwise.
    pub fn advance(&mut self) -> Result<Step, FormError> {
        if self.step == Step::Details {
            let errors = self.validate(Step::Details);
            if !errors.is_empty() {
                return Err(FormError::Invalid(errors));
            }
            self.step = Step::Motivation;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.step = Step::Details;
        self.step
    }

    /// Produce the payload to send. Requires step 2 with both of its fields present.
    pub fn submit(&self) -> Result<ApplicationPayload, FormError> {
        if self.step != Step::Motivation {
            return Err(FormError::NotOnFinalStep);
        }
        let errors = self.validate(Step::Motivation);
        if !errors.is_empty() {
            return Err(FormError::Invalid(errors));
        }

        let v = &self.values;
        Ok(ApplicationPayload {
            full_name: v.full_name.clone(),
            phone: v.phone.clone(),
            email: v.email.clone(),
            university: v.university.clone(),
            department: v.department.clone(),
            level: v.level.map(Level::as_str).unwrap_or_default().to_string(),
            why: v.why.clone(),
            discord: v.discord.map(Discord::as_str).unwrap_or_default().to_string(),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of 2", self.number())
    }
}
