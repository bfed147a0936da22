use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Record, ValidationError};

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").ok());

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().map_or(false, |re| re.is_match(email))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBasicProfile {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Record for UserBasicProfile {
    const NAME: &'static str = "UserBasicProfile";

    fn validate(&self) -> Result<(), ValidationError> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(ValidationError::InvalidEmail(self.email.clone()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBodyMeasurement {
    pub height_meter: f64,
    pub weight_kilogram: f64,
    /// Frequência cardíaca máxima calculada pela WHOOP
    pub max_heart_rate: i64,
}

impl Record for UserBodyMeasurement {
    const NAME: &'static str = "UserBodyMeasurement";
}
