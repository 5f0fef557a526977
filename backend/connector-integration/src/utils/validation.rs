use std::sync::LazyLock;

use domain_types::{
    router_request_types::{FieldName, ParamValue, ParameterSet},
    validation::{ErrorKind, ValidationError},
};
use regex::Regex;

// Optional sign, ASCII digits, and at most one trailing newline.
static INTEGER_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\A[+-]?[0-9]+\n?\z"));

// Decimal (with optional exponent) or hexadecimal, `_` only between two digits,
// surrounding ASCII whitespace allowed. `1.` and `1e` are incomplete.
static FLOAT_REGEX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\A[ \t\n\x0B\f\r]*[+-]?",
        r"(?:0[xX][0-9a-fA-F]+(?:_[0-9a-fA-F]+)*",
        r"|(?:[0-9]+(?:_[0-9]+)*(?:\.[0-9]+(?:_[0-9]+)*)?|\.[0-9]+(?:_[0-9]+)*)",
        r"(?:[eE][+-]?[0-9]+(?:_[0-9]+)*)?)",
        r"[ \t\n\x0B\f\r]*\z",
    ))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    Is(usize),
    Minimum(usize),
    Maximum(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Presence,
    Length(LengthBound),
    Numericality { only_integer: bool },
    Inclusion(&'static [&'static str]),
}

/// One declarative check against one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FieldName,
    pub rule: Rule,
}

impl FieldRule {
    pub const fn presence(field: FieldName) -> Self {
        Self {
            field,
            rule: Rule::Presence,
        }
    }

    pub const fn length(field: FieldName, bound: LengthBound) -> Self {
        Self {
            field,
            rule: Rule::Length(bound),
        }
    }

    pub const fn numericality(field: FieldName, only_integer: bool) -> Self {
        Self {
            field,
            rule: Rule::Numericality { only_integer },
        }
    }

    pub const fn inclusion(field: FieldName, allowed: &'static [&'static str]) -> Self {
        Self {
            field,
            rule: Rule::Inclusion(allowed),
        }
    }

    /// Evaluates the rule. Every rule except presence passes on an absent field.
    pub fn check(&self, params: &ParameterSet) -> Option<ValidationError> {
        let value = params.get(self.field);
        let kind = match (self.rule, value) {
            (Rule::Presence, None) => Some(ErrorKind::Blank),
            (Rule::Presence, Some(_)) | (_, None) => None,
            (Rule::Length(bound), Some(value)) => check_length(bound, value),
            (Rule::Numericality { only_integer }, Some(value)) => {
                (!is_numeric(value, only_integer)).then_some(ErrorKind::NotANumber)
            }
            (Rule::Inclusion(allowed), Some(value)) => {
                let text = value.to_text();
                (!allowed.contains(&&*text)).then_some(ErrorKind::NotInSet)
            }
        };
        kind.map(|kind| ValidationError::new(self.field, kind))
    }
}

/// Runs every rule in declaration order and collects all failures.
pub fn validate(params: &ParameterSet, rules: &[FieldRule]) -> Vec<ValidationError> {
    rules.iter().filter_map(|rule| rule.check(params)).collect()
}

fn check_length(bound: LengthBound, value: &ParamValue) -> Option<ErrorKind> {
    let length = value.to_text().chars().count();
    match bound {
        LengthBound::Is(expected) if length != expected => Some(ErrorKind::WrongLength),
        LengthBound::Minimum(minimum) if length < minimum => Some(ErrorKind::TooShort),
        LengthBound::Maximum(maximum) if length > maximum => Some(ErrorKind::TooLong),
        _ => None,
    }
}

fn is_numeric(value: &ParamValue, only_integer: bool) -> bool {
    if only_integer {
        let text = value.to_text();
        return INTEGER_REGEX
            .as_ref()
            .is_ok_and(|regex| regex.is_match(&text));
    }
    match value {
        ParamValue::Integer(_) | ParamValue::Decimal(_) => true,
        ParamValue::Text(text) => FLOAT_REGEX
            .as_ref()
            .is_ok_and(|regex| regex.is_match(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANDS: &[&str] = &["VISA", "MASTERCARD"];

    fn errors_for(rule: FieldRule, value: impl Into<ParamValue>) -> Vec<ValidationError> {
        validate(&ParameterSet::new().with(rule.field, value), &[rule])
    }

    #[test]
    fn presence_only_fails_on_absent_fields() {
        let rule = FieldRule::presence(FieldName::ValueAmount);
        assert_eq!(
            validate(&ParameterSet::new(), &[rule]),
            vec![ValidationError::new(FieldName::ValueAmount, ErrorKind::Blank)]
        );
        assert!(errors_for(rule, "").is_empty());
        assert!(errors_for(rule, 0).is_empty());
    }

    #[test]
    fn other_rules_skip_absent_fields() {
        let rules = [
            FieldRule::length(FieldName::DocumentNumber, LengthBound::Maximum(50)),
            FieldRule::numericality(FieldName::InstallmentCount, true),
            FieldRule::inclusion(FieldName::CardBrand, BRANDS),
        ];
        assert!(validate(&ParameterSet::new(), &rules).is_empty());
    }

    #[test]
    fn length_bounds() {
        let fifty_one = "aaaaaaaaaabbbbbbbbbbccccccccccddddddddddeeeeeeeeeef";
        let maximum = FieldRule::length(FieldName::DocumentNumber, LengthBound::Maximum(50));
        assert_eq!(
            errors_for(maximum, fifty_one),
            vec![ValidationError::new(FieldName::DocumentNumber, ErrorKind::TooLong)]
        );
        assert!(errors_for(maximum, &fifty_one[..50]).is_empty());

        let minimum = FieldRule::length(FieldName::SecurityCode, LengthBound::Minimum(3));
        assert_eq!(
            errors_for(minimum, 99),
            vec![ValidationError::new(FieldName::SecurityCode, ErrorKind::TooShort)]
        );
        assert!(errors_for(minimum, 999).is_empty());

        let exact = FieldRule::length(FieldName::ExpiryMonth, LengthBound::Is(2));
        assert_eq!(
            errors_for(exact, "1"),
            vec![ValidationError::new(FieldName::ExpiryMonth, ErrorKind::WrongLength)]
        );
        assert!(errors_for(exact, 12).is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let rule = FieldRule::length(FieldName::CardholderName, LengthBound::Maximum(4));
        assert!(errors_for(rule, "João").is_empty());
    }

    #[test]
    fn integer_numericality() {
        let rule = FieldRule::numericality(FieldName::InstallmentCount, true);
        assert!(errors_for(rule, "-42").is_empty());
        assert!(errors_for(rule, "+7").is_empty());
        assert!(errors_for(rule, "12\n").is_empty());
        assert!(errors_for(rule, 3).is_empty());

        for rejected in ["1.1", "texto", "", " 1", "1 ", "1\n\n"] {
            assert_eq!(
                errors_for(rule, rejected),
                vec![ValidationError::new(
                    FieldName::InstallmentCount,
                    ErrorKind::NotANumber
                )],
                "{rejected:?} should be rejected"
            );
        }
        assert!(!errors_for(rule, 1.1).is_empty());
        assert!(!errors_for(rule, 2.0).is_empty());
    }

    #[test]
    fn general_numericality() {
        let rule = FieldRule::numericality(FieldName::ValueAmount, false);
        assert!(errors_for(rule, "1.1").is_empty());
        assert!(errors_for(rule, " 1.99 ").is_empty());
        assert!(errors_for(rule, "1e3").is_empty());
        assert!(errors_for(rule, 1.99).is_empty());
        assert!(errors_for(rule, 10).is_empty());
        for accepted in ["1_000", "0x1A", "-0x1a", ".5", "1.5e-3", "\t42\n", "1e400"] {
            assert!(errors_for(rule, accepted).is_empty(), "{accepted:?} should pass");
        }

        for rejected in [
            "texto", "", "inf", "NaN", "1,99", "1.", "1e", "1__000", "_1", "1_", "0x", "1 2",
        ] {
            assert_eq!(
                errors_for(rule, rejected),
                vec![ValidationError::new(FieldName::ValueAmount, ErrorKind::NotANumber)],
                "{rejected:?} should be rejected"
            );
        }
    }

    #[test]
    fn inclusion_compares_text() {
        let rule = FieldRule::inclusion(FieldName::CardBrand, BRANDS);
        assert!(errors_for(rule, "VISA").is_empty());
        assert_eq!(
            errors_for(rule, "visa"),
            vec![ValidationError::new(FieldName::CardBrand, ErrorKind::NotInSet)]
        );
    }

    #[test]
    fn errors_follow_rule_order_and_accumulate() {
        let rules = [
            FieldRule::presence(FieldName::ValueAmount),
            FieldRule::presence(FieldName::InstallmentCount),
            FieldRule::length(FieldName::CardNumber, LengthBound::Maximum(19)),
            FieldRule::numericality(FieldName::CardNumber, true),
        ];
        let params = ParameterSet::new().with(FieldName::CardNumber, "aaaaaaaaaabbbbbbbbbb");

        assert_eq!(
            validate(&params, &rules),
            vec![
                ValidationError::new(FieldName::ValueAmount, ErrorKind::Blank),
                ValidationError::new(FieldName::InstallmentCount, ErrorKind::Blank),
                ValidationError::new(FieldName::CardNumber, ErrorKind::TooLong),
                ValidationError::new(FieldName::CardNumber, ErrorKind::NotANumber),
            ]
        );
    }
}
