//! Behavioural coverage for rating form validation.

use std::cell::RefCell;

use barri_core::{FeedbackError, NeighbourhoodFeedback};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

fn complete_form() -> Value {
    json!({
        "cleaning": 3,
        "noise": 2,
        "lighting": 4,
        "security": 4,
        "peopleCuantity": 5,
        "accessibility": 3,
        "comercialActivity": 4,
        "resident": true,
        "neiborhood": "la Barceloneta",
    })
}

/// Form payload under test.
#[fixture]
pub fn form() -> RefCell<Value> {
    RefCell::new(complete_form())
}

/// Validation outcome.
#[fixture]
pub fn outcome() -> RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>> {
    RefCell::new(None)
}

#[given("a rating form with every field filled in")]
fn filled_in(form: &RefCell<Value>) {
    *form.borrow_mut() = complete_form();
}

#[given("a rating form with an out-of-range cleaning score and no resident flag")]
fn invalid_fields(form: &RefCell<Value>) {
    let mut payload = complete_form();
    payload["cleaning"] = json!(6);
    payload["resident"] = Value::Null;
    *form.borrow_mut() = payload;
}

#[given("a rating form with a blank neighbourhood name")]
fn blank_neighbourhood(form: &RefCell<Value>) {
    let mut payload = complete_form();
    payload["neiborhood"] = json!("   ");
    *form.borrow_mut() = payload;
}

#[when("the form is validated")]
fn validate(
    form: &RefCell<Value>,
    outcome: &RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>,
) {
    *outcome.borrow_mut() = Some(NeighbourhoodFeedback::from_json(&form.borrow()));
}

fn accepted(
    outcome: &RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>,
) -> NeighbourhoodFeedback {
    match outcome.borrow().as_ref() {
        Some(Ok(feedback)) => feedback.clone(),
        other => panic!("expected an accepted form, found {other:?}"),
    }
}

#[then("the form is accepted")]
fn form_accepted(outcome: &RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>) {
    let feedback = accepted(outcome);
    assert!(feedback.resident);
    assert_eq!(feedback.neighbourhood.as_deref(), Some("la Barceloneta"));
}

#[then("the errors name cleaning and resident")]
fn errors_named(outcome: &RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>) {
    match outcome.borrow().as_ref() {
        Some(Err(err)) => {
            let fields: Vec<&str> = err.fields.iter().map(|error| error.field).collect();
            assert_eq!(fields, ["cleaning", "resident"]);
        }
        other => panic!("expected validation errors, found {other:?}"),
    }
}

#[then("the form is accepted without a neighbourhood name")]
fn accepted_without_name(outcome: &RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>) {
    assert!(accepted(outcome).neighbourhood.is_none());
}

#[scenario(path = "tests/features/feedback.feature", index = 0)]
fn complete_form_is_accepted(
    form: RefCell<Value>,
    outcome: RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>,
) {
    let _ = (form, outcome);
}

#[scenario(path = "tests/features/feedback.feature", index = 1)]
fn invalid_fields_are_reported_together(
    form: RefCell<Value>,
    outcome: RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>,
) {
    let _ = (form, outcome);
}

#[scenario(path = "tests/features/feedback.feature", index = 2)]
fn blank_neighbourhood_is_absent(
    form: RefCell<Value>,
    outcome: RefCell<Option<Result<NeighbourhoodFeedback, FeedbackError>>>,
) {
    let _ = (form, outcome);
}
