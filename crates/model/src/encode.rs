//! Feature encoding
//!
//! Implements the one contract this system actually has: a raw record must
//! encode to the identical vector at training time and at request time.
//! Quality grades map through a closed five-symbol alphabet; neighborhoods
//! map through the vocabulary learned from the training data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::{FeatureKind, FEATURE_SLOTS};

/// Errors raised while validating and encoding a single record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// One or more required keys are absent from the record
    #[error("Missing key: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A quality field carried a symbol outside the Ex/Gd/TA/Fa/Po alphabet
    #[error("Invalid quality value for {field}: {value}")]
    InvalidCategory { field: String, value: String },

    /// A numeric field carried a non-numeric JSON value
    #[error("Field {field} must be a number")]
    NotNumeric { field: String },
}

/// Sentinel code for neighborhoods absent from the trained vocabulary
pub const UNKNOWN_NEIGHBORHOOD: i64 = -1;

/// Map an ordinal quality symbol to its rank.
///
/// The alphabet is closed: anything outside it is a hard input error naming
/// the offending field, never a fallback.
pub fn encode_ordinal(field: &str, value: &str) -> Result<f64, EncodeError> {
    match value {
        "Ex" => Ok(5.0),
        "Gd" => Ok(4.0),
        "TA" => Ok(3.0),
        "Fa" => Ok(2.0),
        "Po" => Ok(1.0),
        other => Err(EncodeError::InvalidCategory {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Neighborhood label-to-code table learned at training time.
///
/// Codes are assigned by sorting the distinct labels observed in the
/// training data and numbering them 0..n-1, so the table is reproducible
/// for a given dataset. The full table travels inside the artifact; the
/// server never carries its own copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodVocab {
    codes: BTreeMap<String, i64>,
}

impl NeighborhoodVocab {
    /// Build the vocabulary from observed labels (duplicates are fine).
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: std::collections::BTreeSet<String> =
            labels.into_iter().map(Into::into).collect();

        let codes = distinct
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code as i64))
            .collect();

        Self { codes }
    }

    /// Look up a label; unknown labels degrade to the sentinel code.
    ///
    /// This never fails: inputs outside the training vocabulary all land in
    /// a single "unknown" bucket, which can bias the prediction for such
    /// records. That behavior is intentional and load-bearing for clients.
    pub fn encode(&self, label: &str) -> i64 {
        self.codes
            .get(label)
            .copied()
            .unwrap_or(UNKNOWN_NEIGHBORHOOD)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Encodes a request record into the canonical 14-slot vector.
pub struct RecordEncoder<'a> {
    vocab: &'a NeighborhoodVocab,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(vocab: &'a NeighborhoodVocab) -> Self {
        Self { vocab }
    }

    /// Validate a raw record and produce the model input vector.
    ///
    /// All required keys are checked up front and every missing key is
    /// reported, not just the first. Values are then reordered into the
    /// canonical slot order and encoded per slot kind. Numeric slots accept
    /// any JSON number; no range validation is performed, so out-of-range
    /// values propagate into the model.
    pub fn build_vector(&self, record: &Map<String, Value>) -> Result<Vec<f64>, EncodeError> {
        let missing: Vec<String> = FEATURE_SLOTS
            .iter()
            .filter(|slot| !record.contains_key(slot.request_key))
            .map(|slot| slot.request_key.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(EncodeError::MissingKeys(missing));
        }

        let mut vector = Vec::with_capacity(FEATURE_SLOTS.len());

        for slot in &FEATURE_SLOTS {
            let value = &record[slot.request_key];

            let encoded = match slot.kind {
                FeatureKind::Quality => match value.as_str() {
                    Some(symbol) => encode_ordinal(slot.request_key, symbol)?,
                    None => {
                        return Err(EncodeError::InvalidCategory {
                            field: slot.request_key.to_string(),
                            value: value.to_string(),
                        })
                    }
                },
                FeatureKind::Neighborhood => match value.as_str() {
                    Some(label) => self.vocab.encode(label) as f64,
                    // Non-string labels cannot be in the vocabulary; they
                    // degrade to the sentinel like any unknown label.
                    None => UNKNOWN_NEIGHBORHOOD as f64,
                },
                FeatureKind::Numeric => match value.as_f64() {
                    Some(number) => number,
                    None => {
                        return Err(EncodeError::NotNumeric {
                            field: slot.request_key.to_string(),
                        })
                    }
                },
            };

            vector.push(encoded);
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_vocab() -> NeighborhoodVocab {
        NeighborhoodVocab::from_labels(["NAmes", "CollgCr", "OldTown", "Edwards"])
    }

    fn complete_record() -> Map<String, Value> {
        let body = json!({
            "overallQual": 7,
            "grLivArea": 1500,
            "garageCars": 2,
            "totalBsmtSF": 900,
            "fullBath": 2,
            "yearBuilt": 2005,
            "yearRemodAdd": 2006,
            "lotArea": 8500,
            "neighborhood": "CollgCr",
            "exterQual": "Gd",
            "bsmtQual": "TA",
            "kitchenQual": "Gd",
            "fireplaces": 1,
            "garageArea": 400
        });
        body.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ordinal_alphabet() {
        assert_eq!(encode_ordinal("exterQual", "Ex").unwrap(), 5.0);
        assert_eq!(encode_ordinal("exterQual", "Gd").unwrap(), 4.0);
        assert_eq!(encode_ordinal("exterQual", "TA").unwrap(), 3.0);
        assert_eq!(encode_ordinal("exterQual", "Fa").unwrap(), 2.0);
        assert_eq!(encode_ordinal("exterQual", "Po").unwrap(), 1.0);
    }

    #[test]
    fn test_ordinal_rejects_unknown_symbol() {
        let err = encode_ordinal("exterQual", "Excellent").unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidCategory {
                field: "exterQual".to_string(),
                value: "Excellent".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid quality value for exterQual: Excellent"
        );
    }

    #[test]
    fn test_vocab_codes_follow_sorted_label_order() {
        let vocab = sample_vocab();
        assert_eq!(vocab.encode("CollgCr"), 0);
        assert_eq!(vocab.encode("Edwards"), 1);
        assert_eq!(vocab.encode("NAmes"), 2);
        assert_eq!(vocab.encode("OldTown"), 3);
    }

    #[test]
    fn test_vocab_unknown_label_is_sentinel() {
        let vocab = sample_vocab();
        assert_eq!(vocab.encode("Atlantis"), UNKNOWN_NEIGHBORHOOD);
        assert_eq!(vocab.encode(""), UNKNOWN_NEIGHBORHOOD);
    }

    #[test]
    fn test_build_vector_slot_order() {
        let vocab = sample_vocab();
        let encoder = RecordEncoder::new(&vocab);

        let vector = encoder.build_vector(&complete_record()).unwrap();

        assert_eq!(
            vector,
            vec![
                7.0, 1500.0, 2.0, 900.0, 2.0, 2005.0, 2006.0, 8500.0,
                0.0, // CollgCr
                4.0, // Gd
                3.0, // TA
                4.0, // Gd
                1.0, 400.0,
            ]
        );
    }

    #[test]
    fn test_build_vector_reports_every_missing_key() {
        let vocab = sample_vocab();
        let encoder = RecordEncoder::new(&vocab);

        let mut record = complete_record();
        record.remove("garageArea");
        record.remove("fullBath");

        let err = encoder.build_vector(&record).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MissingKeys(vec!["fullBath".to_string(), "garageArea".to_string()])
        );
        assert_eq!(err.to_string(), "Missing key: fullBath, garageArea");
    }

    #[test]
    fn test_build_vector_invalid_quality() {
        let vocab = sample_vocab();
        let encoder = RecordEncoder::new(&vocab);

        let mut record = complete_record();
        record.insert("kitchenQual".to_string(), json!("Superb"));

        let err = encoder.build_vector(&record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid quality value for kitchenQual: Superb"
        );
    }

    #[test]
    fn test_build_vector_unknown_neighborhood_does_not_fail() {
        let vocab = sample_vocab();
        let encoder = RecordEncoder::new(&vocab);

        let mut record = complete_record();
        record.insert("neighborhood".to_string(), json!("Nowhere"));

        let vector = encoder.build_vector(&record).unwrap();
        assert_eq!(vector[8], UNKNOWN_NEIGHBORHOOD as f64);
    }

    #[test]
    fn test_build_vector_non_numeric_field() {
        let vocab = sample_vocab();
        let encoder = RecordEncoder::new(&vocab);

        let mut record = complete_record();
        record.insert("lotArea".to_string(), json!("big"));

        let err = encoder.build_vector(&record).unwrap_err();
        assert_eq!(err.to_string(), "Field lotArea must be a number");
    }
}
