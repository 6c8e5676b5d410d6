use crate::error::{CoachError, Result};
use crate::types::{CurrentState, DesiredState, Domain, StateKind, UserInfo};

/// Check that plan/song inputs are complete before any request is built.
///
/// Every domain of the current state is checked first, then every domain of
/// the desired state, in [`Domain::all`] order; the first blank field is
/// reported. `needs_to_solve` and `timeframe` are optional. Returns the
/// profile so callers can keep using it without re-matching the `Option`.
pub fn validate_inputs<'a>(
    current: &CurrentState,
    desired: &DesiredState,
    user: Option<&'a UserInfo>,
) -> Result<&'a UserInfo> {
    for &field in Domain::all() {
        if current.domain(field).trim().is_empty() {
            return Err(CoachError::MissingField {
                state: StateKind::Current,
                field,
            });
        }
    }
    for &field in Domain::all() {
        if desired.domain(field).trim().is_empty() {
            return Err(CoachError::MissingField {
                state: StateKind::Desired,
                field,
            });
        }
    }
    user.ok_or(CoachError::MissingProfile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> (CurrentState, DesiredState, UserInfo) {
        let mut current = CurrentState::default();
        let mut desired = DesiredState::default();
        for d in Domain::all() {
            *current.domain_mut(*d) = format!("now {d}");
            *desired.domain_mut(*d) = format!("later {d}");
        }
        (current, desired, UserInfo::new("Оля", "29", "жіноча"))
    }

    #[test]
    fn complete_inputs_pass() {
        let (current, desired, user) = filled();
        let got = validate_inputs(&current, &desired, Some(&user)).unwrap();
        assert_eq!(got.name, "Оля");
    }

    #[test]
    fn each_blank_field_is_named() {
        for &d in Domain::all() {
            let (mut current, desired, user) = filled();
            *current.domain_mut(d) = "   ".into();
            let err = validate_inputs(&current, &desired, Some(&user)).unwrap_err();
            match err {
                CoachError::MissingField { state, field } => {
                    assert_eq!(state, StateKind::Current);
                    assert_eq!(field, d);
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(err_text(&current, &desired, &user).contains(d.as_str()));
        }
    }

    fn err_text(c: &CurrentState, d: &DesiredState, u: &UserInfo) -> String {
        validate_inputs(c, d, Some(u)).unwrap_err().to_string()
    }

    #[test]
    fn desired_fields_checked_after_current() {
        let (current, mut desired, user) = filled();
        desired.relationships.clear();
        let err = validate_inputs(&current, &desired, Some(&user)).unwrap_err();
        assert!(matches!(
            err,
            CoachError::MissingField {
                state: StateKind::Desired,
                field: Domain::Relationships
            }
        ));
    }

    #[test]
    fn optional_fields_are_not_required() {
        let (mut current, mut desired, user) = filled();
        current.needs_to_solve.clear();
        desired.timeframe.clear();
        assert!(validate_inputs(&current, &desired, Some(&user)).is_ok());
    }

    #[test]
    fn missing_profile_is_rejected() {
        let (current, desired, _) = filled();
        assert!(matches!(
            validate_inputs(&current, &desired, None),
            Err(CoachError::MissingProfile)
        ));
    }
}
