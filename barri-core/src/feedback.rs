//! Neighbourhood rating submissions and newsletter subscriptions.
//!
//! Both payloads are validated before they reach the backend. Validation
//! collects every failing field rather than stopping at the first one so a
//! form can flag all problems at once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest neighbourhood name accepted on the rating form, in characters.
pub const NEIGHBOURHOOD_NAME_MAX_CHARS: usize = 80;

const RATING_FIELDS: [&str; 7] = [
    "cleaning",
    "noise",
    "lighting",
    "security",
    "peopleCuantity",
    "accessibility",
    "comercialActivity",
];

/// What was wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldProblem {
    /// The payload itself was not a JSON object.
    #[error("must be a JSON object")]
    NotAnObject,
    /// A required field was absent or `null`.
    #[error("is required")]
    Missing,
    /// A rating was not an integer.
    #[error("must be an integer between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
    NotAnInteger,
    /// A rating was an integer outside `1..=5`.
    #[error("must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
    /// A flag was not a boolean.
    #[error("must be true or false")]
    NotABoolean,
    /// A text field held another JSON type.
    #[error("must be text")]
    NotText,
    /// A text field exceeded its length limit.
    #[error("must be at most {NEIGHBOURHOOD_NAME_MAX_CHARS} characters, got {chars}")]
    TooLong {
        /// Length of the rejected text in characters.
        chars: usize,
    },
    /// An email address was syntactically invalid.
    #[error("is not a valid email address")]
    InvalidEmail,
}

/// A field name paired with its problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {problem}")]
pub struct FieldError {
    /// JSON name of the field.
    pub field: &'static str,
    /// What was wrong with it.
    pub problem: FieldProblem,
}

/// Validation failure listing every rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("submission failed validation: {}", join_fields(.fields))]
pub struct FeedbackError {
    /// Rejected fields in form order.
    pub fields: Vec<FieldError>,
}

impl FeedbackError {
    fn single(field: &'static str, problem: FieldProblem) -> Self {
        Self {
            fields: vec![FieldError { field, problem }],
        }
    }

    /// Whether `field` is among the rejected fields.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A score on the form's one-to-five scale.
///
/// # Examples
///
/// ```
/// use barri_core::Rating;
///
/// assert_eq!(Rating::new(4).map(Rating::get), Ok(4));
/// assert!(Rating::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validate and wrap a rating.
    ///
    /// # Errors
    /// Returns [`FieldProblem::OutOfRange`] outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, FieldProblem> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FieldProblem::OutOfRange {
                value: i64::from(value),
            })
        }
    }

    /// The wrapped value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    fn from_json(value: Option<&Value>) -> Result<Self, FieldProblem> {
        let number = match value {
            None | Some(Value::Null) => return Err(FieldProblem::Missing),
            Some(Value::Number(number)) => number,
            Some(_) => return Err(FieldProblem::NotAnInteger),
        };
        let Some(integer) = number.as_i64() else {
            return number
                .as_f64()
                .and_then(Self::from_whole_float)
                .ok_or(FieldProblem::NotAnInteger);
        };
        u8::try_from(integer)
            .map_err(|_| FieldProblem::OutOfRange { value: integer })
            .and_then(Self::new)
    }

    /// Accept whole floats such as `3.0` that fall inside the rating range.
    fn from_whole_float(value: f64) -> Option<Self> {
        let bounded = value >= f64::from(Self::MIN) && value <= f64::from(Self::MAX);
        if !bounded || value.fract() != 0.0 {
            return None;
        }
        (Self::MIN..=Self::MAX)
            .find(|candidate| f64::from(*candidate) == value)
            .map(Self)
    }
}

impl TryFrom<u8> for Rating {
    type Error = FieldProblem;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A resident's or visitor's rating of a neighbourhood.
///
/// Field names on the wire follow the backend's `/formularios` contract.
///
/// # Examples
///
/// ```
/// use barri_core::NeighbourhoodFeedback;
/// use serde_json::json;
///
/// let feedback = NeighbourhoodFeedback::from_json(&json!({
///     "cleaning": 4, "noise": 2, "lighting": 3, "security": 4,
///     "peopleCuantity": 5, "accessibility": 3, "comercialActivity": 4,
///     "resident": true, "neiborhood": " Gràcia ",
/// }))?;
/// assert_eq!(feedback.neighbourhood.as_deref(), Some("Gràcia"));
/// # Ok::<(), barri_core::FeedbackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct NeighbourhoodFeedback {
    /// Street cleanliness.
    pub cleaning: Rating,
    /// Noise (higher is quieter).
    pub noise: Rating,
    /// Street lighting.
    pub lighting: Rating,
    /// Perceived safety.
    pub security: Rating,
    /// Crowding.
    #[serde(rename = "peopleCuantity")]
    pub crowding: Rating,
    /// Accessibility.
    pub accessibility: Rating,
    /// Commercial activity.
    #[serde(rename = "comercialActivity")]
    pub commercial_activity: Rating,
    /// Whether the respondent lives in the neighbourhood.
    pub resident: bool,
    /// Free-text neighbourhood name; blank input is stored as `None`.
    #[serde(rename = "neiborhood", skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
}

impl NeighbourhoodFeedback {
    /// Validate a raw form payload.
    ///
    /// # Errors
    /// Returns [`FeedbackError`] naming every field that failed.
    pub fn from_json(value: &Value) -> Result<Self, FeedbackError> {
        let Some(object) = value.as_object() else {
            return Err(FeedbackError::single("body", FieldProblem::NotAnObject));
        };
        let mut errors = Vec::new();
        let ratings: Vec<Option<Rating>> = RATING_FIELDS
            .iter()
            .map(|&field| record(&mut errors, field, Rating::from_json(object.get(field))))
            .collect();
        let resident = record(&mut errors, "resident", read_flag(object, "resident"));
        let neighbourhood = record(
            &mut errors,
            "neiborhood",
            read_neighbourhood(object.get("neiborhood")),
        );

        match (ratings.as_slice(), resident, neighbourhood) {
            (
                &[
                    Some(cleaning),
                    Some(noise),
                    Some(lighting),
                    Some(security),
                    Some(crowding),
                    Some(accessibility),
                    Some(commercial_activity),
                ],
                Some(resident),
                Some(neighbourhood),
            ) if errors.is_empty() => Ok(Self {
                cleaning,
                noise,
                lighting,
                security,
                crowding,
                accessibility,
                commercial_activity,
                resident,
                neighbourhood,
            }),
            _ => Err(FeedbackError { fields: errors }),
        }
    }

    /// Re-check invariants that public field access can break.
    ///
    /// # Errors
    /// Returns [`FeedbackError`] when the neighbourhood name is too long.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        match self.neighbourhood.as_deref() {
            Some(name) => {
                let value = Value::String(name.to_owned());
                read_neighbourhood(Some(&value))
                    .map(|_| ())
                    .map_err(|problem| FeedbackError::single("neiborhood", problem))
            }
            None => Ok(()),
        }
    }
}

impl TryFrom<Value> for NeighbourhoodFeedback {
    type Error = FeedbackError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

fn record<T>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    result: Result<T, FieldProblem>,
) -> Option<T> {
    result
        .map_err(|problem| errors.push(FieldError { field, problem }))
        .ok()
}

fn read_flag(object: &Map<String, Value>, field: &str) -> Result<bool, FieldProblem> {
    match object.get(field) {
        None | Some(Value::Null) => Err(FieldProblem::Missing),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(FieldProblem::NotABoolean),
    }
}

fn read_neighbourhood(value: Option<&Value>) -> Result<Option<String>, FieldProblem> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            let chars = trimmed.chars().count();
            if chars > NEIGHBOURHOOD_NAME_MAX_CHARS {
                Err(FieldProblem::TooLong { chars })
            } else {
                Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
            }
        }
        Some(_) => Err(FieldProblem::NotText),
    }
}

/// A validated newsletter sign-up.
///
/// # Examples
///
/// ```
/// use barri_core::NewsletterSubscription;
///
/// let subscription = NewsletterSubscription::new(" veina@example.cat ")?;
/// assert_eq!(subscription.email(), "veina@example.cat");
/// assert!(NewsletterSubscription::new("not-an-email").is_err());
/// # Ok::<(), barri_core::FeedbackError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NewsletterDraft")]
pub struct NewsletterSubscription {
    email: String,
}

#[derive(Deserialize)]
struct NewsletterDraft {
    email: String,
}

impl NewsletterSubscription {
    /// Validate an email address.
    ///
    /// # Errors
    /// Returns [`FeedbackError`] for a malformed address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, FeedbackError> {
        let trimmed = email.as_ref().trim();
        if is_valid_email(trimmed) {
            Ok(Self {
                email: trimmed.to_owned(),
            })
        } else {
            Err(FeedbackError::single("email", FieldProblem::InvalidEmail))
        }
    }

    /// The subscribed address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl TryFrom<NewsletterDraft> for NewsletterSubscription {
    type Error = FeedbackError;

    fn try_from(draft: NewsletterDraft) -> Result<Self, Self::Error> {
        Self::new(draft.email)
    }
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain of non-empty alphanumeric or hyphenated labels.
///
/// # Examples
///
/// ```
/// use barri_core::is_valid_email;
///
/// assert!(is_valid_email("info@barri.cat"));
/// assert!(!is_valid_email("info@barri"));
/// assert!(!is_valid_email("in fo@barri.cat"));
/// ```
#[must_use]
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| valid_label(label))
}

fn valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn valid_form() -> Value {
        json!({
            "cleaning": 4,
            "noise": 2,
            "lighting": 3,
            "security": 4,
            "peopleCuantity": 5,
            "accessibility": 3,
            "comercialActivity": 1,
            "resident": false,
        })
    }

    #[rstest]
    fn accepts_a_complete_form(valid_form: Value) {
        let feedback = NeighbourhoodFeedback::from_json(&valid_form).expect("valid form");
        assert_eq!(feedback.crowding.get(), 5);
        assert_eq!(feedback.commercial_activity.get(), 1);
        assert!(feedback.neighbourhood.is_none());
    }

    #[rstest]
    fn reports_every_failing_field(mut valid_form: Value) {
        valid_form["cleaning"] = json!(0);
        valid_form["lighting"] = json!(2.5);
        valid_form["resident"] = json!("yes");
        valid_form
            .as_object_mut()
            .expect("form object")
            .remove("security");

        let err = NeighbourhoodFeedback::from_json(&valid_form).expect_err("invalid form");

        let fields: Vec<&str> = err.fields.iter().map(|error| error.field).collect();
        assert_eq!(fields, ["cleaning", "lighting", "security", "resident"]);
        assert_eq!(
            err.fields[0].problem,
            FieldProblem::OutOfRange { value: 0 }
        );
        assert_eq!(err.fields[1].problem, FieldProblem::NotAnInteger);
        assert_eq!(err.fields[2].problem, FieldProblem::Missing);
        assert_eq!(err.fields[3].problem, FieldProblem::NotABoolean);
    }

    #[rstest]
    fn integral_floats_are_ratings(mut valid_form: Value) {
        valid_form["noise"] = json!(3.0);
        let feedback = NeighbourhoodFeedback::from_json(&valid_form).expect("valid form");
        assert_eq!(feedback.noise.get(), 3);
    }

    #[rstest]
    #[case(json!(2.5))]
    #[case(json!(7.0))]
    #[case(json!(0.0))]
    #[case(json!(1e300))]
    fn fractional_or_out_of_range_floats_are_not_ratings(
        mut valid_form: Value,
        #[case] noise: Value,
    ) {
        valid_form["noise"] = noise;
        let err = NeighbourhoodFeedback::from_json(&valid_form).expect_err("invalid rating");
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].problem, FieldProblem::NotAnInteger);
    }

    #[rstest]
    #[case(json!(""), None)]
    #[case(json!("   "), None)]
    #[case(json!("  Sant Antoni "), Some("Sant Antoni"))]
    fn neighbourhood_text_is_trimmed(
        mut valid_form: Value,
        #[case] input: Value,
        #[case] expected: Option<&str>,
    ) {
        valid_form["neiborhood"] = input;
        let feedback = NeighbourhoodFeedback::from_json(&valid_form).expect("valid form");
        assert_eq!(feedback.neighbourhood.as_deref(), expected);
    }

    #[rstest]
    fn long_neighbourhood_names_are_rejected(mut valid_form: Value) {
        valid_form["neiborhood"] = json!("x".repeat(NEIGHBOURHOOD_NAME_MAX_CHARS + 1));
        let err = NeighbourhoodFeedback::from_json(&valid_form).expect_err("too long");
        assert!(err.mentions("neiborhood"));
    }

    #[rstest]
    fn serde_uses_the_same_validation(valid_form: Value) {
        let feedback: NeighbourhoodFeedback =
            serde_json::from_value(valid_form.clone()).expect("deserialise form");
        assert_eq!(serde_json::to_value(&feedback).expect("serialise form"), valid_form);

        let rejected = serde_json::from_value::<NeighbourhoodFeedback>(json!({ "cleaning": 9 }));
        assert!(rejected.is_err());
    }

    #[rstest]
    fn non_objects_are_rejected() {
        let err = NeighbourhoodFeedback::from_json(&json!([1, 2])).expect_err("array body");
        assert_eq!(err.fields[0].problem, FieldProblem::NotAnObject);
    }

    #[rstest]
    #[case("a@b.co", true)]
    #[case("nom.cognom+barri@ajuntament.barcelona.cat", true)]
    #[case("@barri.cat", false)]
    #[case("info@", false)]
    #[case("info@@barri.cat", false)]
    #[case("info@barri..cat", false)]
    #[case("info@-barri.cat", false)]
    #[case("info@barri.cat ", false)]
    fn email_shapes(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(candidate), expected);
    }

    #[rstest]
    fn subscription_deserialisation_validates() {
        let ok: NewsletterSubscription =
            serde_json::from_value(json!({ "email": "hola@barri.cat" })).expect("valid email");
        assert_eq!(ok.email(), "hola@barri.cat");
        assert!(serde_json::from_value::<NewsletterSubscription>(json!({ "email": "hola" })).is_err());
    }
}
