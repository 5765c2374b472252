//! Optional profile attributes attached to an account.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-form profile attributes shown on an account's profile page.
///
/// Every field is optional; an empty profile is valid. None of these fields
/// participate in linking or task workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    job: Option<String>,
    height_cm: Option<u16>,
    weight_kg: Option<u16>,
    birthday: Option<NaiveDate>,
    location: Option<String>,
    language: Option<String>,
}

impl AccountProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the job title.
    #[must_use]
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Sets the height in centimetres.
    #[must_use]
    pub const fn with_height_cm(mut self, height_cm: u16) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    /// Sets the weight in kilograms.
    #[must_use]
    pub const fn with_weight_kg(mut self, weight_kg: u16) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Sets the birthday.
    #[must_use]
    pub const fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the preferred language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Returns the job title, if set.
    #[must_use]
    pub fn job(&self) -> Option<&str> {
        self.job.as_deref()
    }

    /// Returns the height in centimetres, if set.
    #[must_use]
    pub const fn height_cm(&self) -> Option<u16> {
        self.height_cm
    }

    /// Returns the weight in kilograms, if set.
    #[must_use]
    pub const fn weight_kg(&self) -> Option<u16> {
        self.weight_kg
    }

    /// Returns the birthday, if set.
    #[must_use]
    pub const fn birthday(&self) -> Option<NaiveDate> {
        self.birthday
    }

    /// Returns the location, if set.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the preferred language, if set.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}
