use chrono::{DateTime, Months, NaiveDate};

use crate::auth::Principal;

/// Outcome of the minimum-age check.
///
/// A missing or unreadable `date_of_birth` claim is not an error: the requirement is
/// simply not met, but the reason is kept distinct so callers and logs can tell a
/// malformed token apart from an underage caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeCheck {
    Satisfied,
    Underage,
    MissingClaim,
    MalformedClaim,
}

impl AgeCheck {
    pub fn succeeded(self) -> bool {
        self == AgeCheck::Satisfied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumAgeRequirement {
    pub minimum_age: u32,
}

impl MinimumAgeRequirement {
    pub fn new(minimum_age: u32) -> Self {
        Self { minimum_age }
    }

    /// evaluate
    ///
    /// Satisfied when `date_of_birth + minimum_age years` falls strictly before `today`.
    /// A 29 February birthday lands on 28 February in non-leap years.
    pub fn evaluate(&self, principal: &Principal, today: NaiveDate) -> AgeCheck {
        let user = principal.name.as_deref().unwrap_or("unknown");

        let Some(raw) = principal.date_of_birth.as_deref() else {
            tracing::info!(user_id = principal.id, user, "no date of birth claim, age requirement not met");
            return AgeCheck::MissingClaim;
        };

        let Some(date_of_birth) = parse_date_of_birth(raw) else {
            tracing::warn!(user_id = principal.id, user, claim = raw, "unparsable date of birth claim");
            return AgeCheck::MalformedClaim;
        };

        let outcome = match date_of_birth.checked_add_months(Months::new(self.minimum_age.saturating_mul(12))) {
            Some(threshold) if threshold < today => AgeCheck::Satisfied,
            _ => AgeCheck::Underage,
        };

        tracing::info!(
            user_id = principal.id,
            user,
            %date_of_birth,
            minimum_age = self.minimum_age,
            ?outcome,
            "age requirement evaluated"
        );
        outcome
    }
}

/// Accepts a plain calendar date (`1990-05-17`) or an RFC 3339 timestamp, whose date
/// part is used.
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
