use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column headings of the intake sheet, in row order.
pub const COLUMNS: [&str; 11] = [
    "Submitted At",
    "Application ID",
    "Secondary ID",
    "Full Name",
    "Phone",
    "Email",
    "University",
    "Department",
    "Level",
    "Why",
    "Discord",
];

/// Zero-based index of the email column (`F`).
pub const EMAIL_COLUMN: usize = 5;

/// The eight fields an applicant supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub university: String,
    pub department: String,
    pub level: String,
    pub why: String,
    pub discord: String,
}

impl ApplicationPayload {
    pub fn fields(&self) -> [&str; 8] {
        [
            self.full_name.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
            self.university.as_str(),
            self.department.as_str(),
            self.level.as_str(),
            self.why.as_str(),
            self.discord.as_str(),
        ]
    }
}

/// One stored application, as written to the sheet.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub submitted_at: DateTime<Utc>,
    pub application_id: Uuid,
    // Written alongside `application_id`; nothing in this system reads either back.
    pub secondary_id: Uuid,
    pub payload: ApplicationPayload,
}

impl ApplicationRecord {
    pub fn new(payload: ApplicationPayload) -> Self {
        Self {
            submitted_at: Utc::now(),
            application_id: Uuid::new_v4(),
            secondary_id: Uuid::new_v4(),
            payload,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(COLUMNS.len());
        row.push(self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true));
        row.push(self.application_id.to_string());
        row.push(self.secondary_id.to_string());
        row.extend(self.payload.fields().iter().map(|f| f.to_string()));
        row
    }
}
