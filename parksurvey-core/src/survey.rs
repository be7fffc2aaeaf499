//! Survey domain types with validation at the boundary
//!
//! `SurveyPayload` is the loose wire contract. It is validated into a
//! `SurveyResponse`, the only type the store accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::geo::{resolve_cell, CellId, ReferenceCell};

/// Upper bound accepted for annual income
pub const MAX_INCOME: i64 = 100_000_000_000_000;

/// Hours in a week
pub const MAX_HOURS_PER_WEEK: i32 = 168;

/// Declares a closed set of survey answers stored as their display label.
macro_rules! answer_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every answer in questionnaire order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label as shown to respondents and stored in the table
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Parse a stored label
            pub fn parse(value: &str) -> Result<Self> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(SurveyError::validation(
                        $field,
                        format!("unknown answer '{other}'"),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

answer_enum! {
    /// Marital status
    MaritalStatus, "married" {
        Yes => "Yes",
        No => "No",
    }
}

answer_enum! {
    /// Highest completed level of education, lowest first
    #[derive(PartialOrd, Ord)]
    Education, "education" {
        NoFormal => "No formal education",
        HighSchool => "High School",
        Bachelor => "Bachelor's Degree",
        Master => "Master's Degree",
        Phd => "PhD",
    }
}

answer_enum! {
    /// Employment status
    Employment, "employment" {
        Employed => "Employed",
        Unemployed => "Unemployed",
        Student => "Student",
        Retired => "Retired",
    }
}

answer_enum! {
    /// Number of children, capped at "5 or more"
    #[derive(PartialOrd, Ord)]
    NumKids, "numKids" {
        Zero => "0",
        One => "1",
        Two => "2",
        Three => "3",
        Four => "4",
        FiveOrMore => "5 or more",
    }
}

/// Questionnaire answers shared by the payload and the submission form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswers {
    #[serde(default)]
    pub married: Option<MaritalStatus>,
    #[serde(default)]
    pub education: Option<Education>,
    #[serde(default)]
    pub employment: Option<Employment>,
    #[serde(default)]
    pub num_kids: Option<NumKids>,
    #[serde(default)]
    pub income: Option<i64>,
    #[serde(default)]
    pub hours_worked_per_week: Option<i32>,
}

impl SurveyAnswers {
    /// Number of questions with an answer
    pub fn answered(&self) -> usize {
        [
            self.married.is_some(),
            self.education.is_some(),
            self.employment.is_some(),
            self.num_kids.is_some(),
            self.income.is_some(),
            self.hours_worked_per_week.is_some(),
        ]
        .into_iter()
        .filter(|answered| *answered)
        .count()
    }

    fn validate(&self) -> Result<()> {
        if let Some(income) = self.income {
            if !(0..=MAX_INCOME).contains(&income) {
                return Err(SurveyError::validation(
                    "income",
                    format!("must be between 0 and {MAX_INCOME}"),
                ));
            }
        }
        if let Some(hours) = self.hours_worked_per_week {
            if !(0..=MAX_HOURS_PER_WEEK).contains(&hours) {
                return Err(SurveyError::validation(
                    "hoursWorkedPerWeek",
                    format!("must be between 0 and {MAX_HOURS_PER_WEEK}"),
                ));
            }
        }
        Ok(())
    }
}

/// Wire payload handed to the store by the form layer.
///
/// `municipality`, `postal_code` and `hours_worked_per_week` are accepted
/// and validated but the `people_info` table has no columns for them, so
/// they are dropped on conversion to [`SurveyResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPayload {
    pub h3_index: String,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub hex_distance_to_park: i64,
    #[serde(flatten)]
    pub answers: SurveyAnswers,
}

impl SurveyPayload {
    /// Validate the payload into the storable row.
    pub fn validate(self) -> Result<SurveyResponse> {
        let h3index = CellId::parse_at_resolution(&self.h3_index)?;

        let hex_distance_to_park = u32::try_from(self.hex_distance_to_park)
            .ok()
            .filter(|d| i32::try_from(*d).is_ok())
            .ok_or_else(|| {
                SurveyError::validation(
                    "hexDistanceToPark",
                    format!("must be a non-negative grid distance, got {}", self.hex_distance_to_park),
                )
            })?;

        self.answers.validate()?;

        if self.municipality.is_some()
            || self.postal_code.is_some()
            || self.answers.hours_worked_per_week.is_some()
        {
            tracing::debug!(
                h3index = %h3index,
                "municipality, postalCode and hoursWorkedPerWeek are not persisted"
            );
        }

        Ok(SurveyResponse {
            h3index,
            hex_distance_to_park,
            married: self.answers.married,
            education: self.answers.education,
            employment: self.answers.employment,
            num_kids: self.answers.num_kids,
            income: self.answers.income,
        })
    }
}

/// A validated `people_info` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub h3index: CellId,
    pub hex_distance_to_park: u32,
    pub married: Option<MaritalStatus>,
    pub education: Option<Education>,
    pub employment: Option<Employment>,
    pub num_kids: Option<NumKids>,
    pub income: Option<i64>,
}

/// Raw form submission: a home location plus answers.
///
/// Mirrors what the map form collects before the cell id and park distance
/// are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(flatten)]
    pub answers: SurveyAnswers,
}

impl SurveySubmission {
    /// Derive the cell id and park distance, producing the store payload.
    ///
    /// Requires at least one answered question.
    pub fn into_payload(self, reference: &ReferenceCell) -> Result<SurveyPayload> {
        if self.answers.answered() == 0 {
            return Err(SurveyError::validation(
                "answers",
                "please answer at least 1 question in the survey",
            ));
        }

        let cell = resolve_cell(self.lat, self.lng)?;
        let distance = reference.distance_from(cell)?;

        Ok(SurveyPayload {
            h3_index: cell.to_string(),
            municipality: non_blank(self.municipality),
            postal_code: non_blank(self.postal_code),
            hex_distance_to_park: i64::from(distance),
            answers: self.answers,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
