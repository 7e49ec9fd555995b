//! Feature vector assembly from submitted form fields.
//!
//! The column order is the order the classifier was trained on and must never
//! change without retraining the model.

use crate::error::FormError;

/// Number of measurements per sample.
pub const FEATURE_COUNT: usize = 11;

/// Form field names, in model column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "fixed_acidity",
    "volatile_acidity",
    "citric_acid",
    "residual_sugar",
    "chlorides",
    "free_sulfur_dioxide",
    "total_sulfur_dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

/// One wine sample, ready to be scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Build a vector from raw `(name, value)` form pairs.
    ///
    /// Fields may arrive in any order and unknown fields are ignored. If a
    /// field is repeated the first occurrence wins.
    pub fn from_form<K, V>(pairs: &[(K, V)]) -> Result<Self, FormError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut values = [0.0_f64; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(FEATURE_NAMES) {
            let raw = pairs
                .iter()
                .find(|(k, _)| k.as_ref() == field)
                .map(|(_, v)| v.as_ref())
                .ok_or(FormError::Missing { field })?;
            *slot = parse_number(field, raw)?;
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, FormError> {
    let not_numeric = || FormError::NotNumeric {
        field,
        value: raw.to_string(),
    };
    strip_digit_separators(raw.trim())
        .ok_or_else(not_numeric)?
        .parse::<f64>()
        .map_err(|_| not_numeric())
}

/// Drop `_` separators, which are only allowed singly between two digits
/// (`1_000.5`, not `_1`, `1__0` or `1_.5`).
fn strip_digit_separators(s: &str) -> Option<String> {
    if !s.contains('_') {
        return Some(s.to_string());
    }
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            match (before, after) {
                (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => continue,
                _ => return None,
            }
        }
        out.push(c);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_form() -> Vec<(String, String)> {
        [
            ("fixed_acidity", "7.4"),
            ("volatile_acidity", "0.7"),
            ("citric_acid", "0"),
            ("residual_sugar", "1.9"),
            ("chlorides", "0.076"),
            ("free_sulfur_dioxide", "11"),
            ("total_sulfur_dioxide", "34"),
            ("density", "0.9978"),
            ("pH", "3.51"),
            ("sulphates", "0.56"),
            ("alcohol", "9.4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn assembles_in_training_order() {
        let mut form = reference_form();
        form.reverse();
        let fv = FeatureVector::from_form(&form).unwrap();
        assert_eq!(
            fv.values(),
            [7.4, 0.7, 0.0, 1.9, 0.076, 11.0, 34.0, 0.9978, 3.51, 0.56, 9.4]
        );
    }

    #[test]
    fn missing_field_is_reported() {
        let form: Vec<_> = reference_form()
            .into_iter()
            .filter(|(k, _)| k != "pH")
            .collect();
        assert_eq!(
            FeatureVector::from_form(&form),
            Err(FormError::Missing { field: "pH" })
        );
    }

    #[test]
    fn non_numeric_field_is_reported() {
        let mut form = reference_form();
        form.last_mut().unwrap().1 = "abc".to_string();
        assert_eq!(
            FeatureVector::from_form(&form),
            Err(FormError::NotNumeric {
                field: "alcohol",
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn empty_value_is_not_numeric() {
        let mut form = reference_form();
        form[0].1 = String::new();
        assert!(matches!(
            FeatureVector::from_form(&form),
            Err(FormError::NotNumeric { field: "fixed_acidity", .. })
        ));
    }

    #[test]
    fn coercion_is_lenient_like_float() {
        let mut form = reference_form();
        form[0].1 = "  7.4 ".to_string();
        form[6].1 = "3.4e1".to_string();
        form[7].1 = "-0.9978".to_string();
        let fv = FeatureVector::from_form(&form).unwrap();
        assert_eq!(fv.as_slice()[0], 7.4);
        assert_eq!(fv.as_slice()[6], 34.0);
        assert_eq!(fv.as_slice()[7], -0.9978);
        assert!(fv.is_finite());

        form[10].1 = "nan".to_string();
        let fv = FeatureVector::from_form(&form).unwrap();
        assert!(!fv.is_finite());
    }

    #[test]
    fn underscore_separators_between_digits() {
        let mut form = reference_form();
        form[0].1 = "1_0".to_string();
        form[6].1 = "1_000.2_5".to_string();
        let fv = FeatureVector::from_form(&form).unwrap();
        assert_eq!(fv.as_slice()[0], 10.0);
        assert_eq!(fv.as_slice()[6], 1000.25);

        for bad in ["_1", "1_", "1__0", "1_.5", "nan_"] {
            form[0].1 = bad.to_string();
            assert!(
                matches!(
                    FeatureVector::from_form(&form),
                    Err(FormError::NotNumeric { field: "fixed_acidity", .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn first_duplicate_wins_and_extras_ignored() {
        let mut form = vec![
            ("alcohol".to_string(), "12.5".to_string()),
            ("submit".to_string(), "Predict".to_string()),
        ];
        form.extend(reference_form());
        let fv = FeatureVector::from_form(&form).unwrap();
        assert_eq!(fv.as_slice()[10], 12.5);
    }
}
