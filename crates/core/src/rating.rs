//! Post-trip driver rating: input validation and the update payload.

use serde::{Deserialize, Serialize};

use crate::booking::BookingStatus;
use crate::error::{DomainError, DomainResult};

/// Longest review accepted, in whitespace-delimited words.
pub const MAX_REVIEW_WORDS: usize = 100;

pub const MIN_SUB_RATING: i64 = 1;
pub const MAX_SUB_RATING: i64 = 5;

/// Raw rating form input, as typed or selected by the passenger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingForm {
    pub legroom: String,
    pub cleanliness: String,
    pub driving_smoothness: String,
    pub temperature_comfort: String,
    pub description: String,
}

/// Body of `PATCH /bookings/{id}/` that closes out a booking with a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSubmission {
    pub legroom_rating: i64,
    pub cleanliness_rating: i64,
    pub driving_smoothness_rating: i64,
    pub temperature_comfort_rating: i64,
    pub description: String,
    pub status: BookingStatus,
}

impl RatingSubmission {
    pub fn average(&self) -> f64 {
        (self.legroom_rating
            + self.cleanliness_rating
            + self.driving_smoothness_rating
            + self.temperature_comfort_rating) as f64
            / 4.0
    }
}

/// Number of whitespace-delimited words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn parse_sub_rating(raw: &str) -> DomainResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|r| (MIN_SUB_RATING..=MAX_SUB_RATING).contains(r))
        .ok_or_else(|| {
            DomainError::validation(
                "Invalid rating. Please select a number between 1 and 5 for all fields.",
            )
        })
}

impl RatingForm {
    /// Validate every field; nothing is sent unless all four sub-ratings are
    /// integers in 1..=5 and the trimmed review fits in [`MAX_REVIEW_WORDS`].
    pub fn validate(&self) -> DomainResult<RatingSubmission> {
        let legroom_rating = parse_sub_rating(&self.legroom)?;
        let cleanliness_rating = parse_sub_rating(&self.cleanliness)?;
        let driving_smoothness_rating = parse_sub_rating(&self.driving_smoothness)?;
        let temperature_comfort_rating = parse_sub_rating(&self.temperature_comfort)?;

        let description = self.description.trim().to_string();
        let words = word_count(&description);
        if words > MAX_REVIEW_WORDS {
            return Err(DomainError::validation(format!(
                "Description is too long. Please limit it to {MAX_REVIEW_WORDS} words (Current count: {words})."
            )));
        }

        Ok(RatingSubmission {
            legroom_rating,
            cleanliness_rating,
            driving_smoothness_rating,
            temperature_comfort_rating,
            description,
            status: BookingStatus::Rated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form(ratings: [&str; 4], description: &str) -> RatingForm {
        RatingForm {
            legroom: ratings[0].into(),
            cleanliness: ratings[1].into(),
            driving_smoothness: ratings[2].into(),
            temperature_comfort: ratings[3].into(),
            description: description.into(),
        }
    }

    #[test]
    fn valid_form_becomes_rated_submission() {
        let submission = form(["5", "4", "3", "4"], "  Great driver  ").validate().unwrap();
        assert_eq!(submission.status, BookingStatus::Rated);
        assert_eq!(submission.description, "Great driver");
        assert_eq!(submission.average(), 4.0);
    }

    #[test]
    fn out_of_range_sub_rating_is_rejected() {
        for bad in ["0", "6", "", "x", "2.5"] {
            let err = form(["5", bad, "5", "5"], "").validate().unwrap_err();
            assert!(matches!(err, DomainError::Validation(msg) if msg.starts_with("Invalid rating")));
        }
    }

    #[test]
    fn hundred_words_pass_and_hundred_and_one_fail() {
        let ok = vec!["word"; 100].join(" ");
        assert!(form(["1", "1", "1", "1"], &ok).validate().is_ok());

        let long = vec!["word"; 101].join("\n ");
        let err = form(["1", "1", "1", "1"], &long).validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation(
                "Description is too long. Please limit it to 100 words (Current count: 101)."
            )
        );
    }

    #[test]
    fn submission_serializes_with_rated_status() {
        let body = serde_json::to_value(form(["5", "5", "5", "5"], "").validate().unwrap()).unwrap();
        assert_eq!(body["status"], "rated");
        assert_eq!(body["temperature_comfort_rating"], 5);
    }

    proptest! {
        #[test]
        fn any_in_range_ratings_validate(a in 1i64..=5, b in 1i64..=5, c in 1i64..=5, d in 1i64..=5) {
            let f = RatingForm {
                legroom: a.to_string(),
                cleanliness: b.to_string(),
                driving_smoothness: c.to_string(),
                temperature_comfort: d.to_string(),
                description: String::new(),
            };
            let s = f.validate().unwrap();
            prop_assert!(s.average() >= 1.0 && s.average() <= 5.0);
        }

        #[test]
        fn any_out_of_range_rating_is_rejected(bad in prop_oneof![i64::MIN..1i64, 6i64..i64::MAX]) {
            let f = RatingForm {
                legroom: "3".into(),
                cleanliness: "3".into(),
                driving_smoothness: bad.to_string(),
                temperature_comfort: "3".into(),
                description: String::new(),
            };
            prop_assert!(f.validate().is_err());
        }

        #[test]
        fn word_count_ignores_extra_whitespace(words in 0usize..150, pad in "[ \t\n]{1,3}") {
            let text = vec!["w"; words].join(pad.as_str());
            prop_assert_eq!(word_count(&format!("{pad}{text}{pad}")), words);
        }
    }
}
