use comfy_table::{Cell, Table};

use crate::config::{AppConfig, DEFAULT_BIND, SheetsConfig, parse_bind};
use crate::form::{ApplicationForm, Field, FormError};
use crate::submission::{ApplicationPayload, ApplicationRecord, SubmissionHandler};

/// Raw answers as given on the command line, in form order.
pub struct Answers<'a> {
    pub details: [(Field, &'a str); 6],
    pub motivation: [(Field, &'a str); 2],
}

/// Run the answers through the same two-step checks the wizard applies.
pub fn build_payload(answers: &Answers<'_>) -> Result<ApplicationPayload, FormError> {
    let mut form = ApplicationForm::new();
    for (field, value) in answers.details {
        form.set(field, value)?;
    }
    form.advance()?;
    for (field, value) in answers.motivation {
        form.set(field, value)?;
    }
    form.submit()
}

pub async fn submit(answers: &Answers<'_>, sheet: &str) -> anyhow::Result<()> {
    let payload = build_payload(answers).map_err(|e| match e {
        FormError::Invalid(errors) => {
            let detail: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field.label(), e.message))
                .collect();
            anyhow::anyhow!("Application is incomplete ({})", detail.join("; "))
        }
        other => anyhow::anyhow!(other),
    })?;

    let config = AppConfig::new(Some(SheetsConfig::from_env()?), parse_bind(DEFAULT_BIND)?)
        .with_sheet_name(sheet);
    let handler = SubmissionHandler::from_config(&config)?;

    let record = handler.submit(payload).await?;
    println!("{}", render_record(&record));
    Ok(())
}

pub fn render_record(record: &ApplicationRecord) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Application ID"), Cell::new(record.application_id)]);
    table.add_row(vec![
        Cell::new("Submitted At"),
        Cell::new(record.submitted_at.to_rfc3339()),
    ]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&record.payload.full_name)]);
    table.add_row(vec![Cell::new("Email"), Cell::new(&record.payload.email)]);
    table
}

pub fn details<'a>(
    full_name: &'a str,
    phone: &'a str,
    email: &'a str,
    university: &'a str,
    department: &'a str,
    level: &'a str,
) -> [(Field, &'a str); 6] {
    [
        (Field::FullName, full_name),
        (Field::Phone, phone),
        (Field::Email, email),
        (Field::University, university),
        (Field::Department, department),
        (Field::Level, level),
    ]
}

pub fn motivation<'a>(why: &'a str, discord: &'a str) -> [(Field, &'a str); 2] {
    [(Field::Why, why), (Field::Discord, discord)]
}
