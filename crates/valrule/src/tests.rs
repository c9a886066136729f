//! Property-based tests for the rule set.

#[cfg(test)]
mod property_tests {
    use crate::prelude::*;
    use proptest::prelude::*;

    // Values that normalize to nil or empty, at any nesting depth.
    fn absent_value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Nil),
            Just(Value::Ref(None)),
            Just(Value::I64(0)),
            Just(Value::U8(0)),
            Just(Value::F64(0.0)),
            Just(Value::Bool(false)),
            Just(Value::String(String::new())),
            Just(Value::List(Vec::new())),
            Just(Value::Number(Number::default())),
            Just(crate::value::zero_time().to_value()),
        ];
        leaf.prop_recursive(3, 8, 1, |inner| {
            inner.prop_map(|v| Value::Ref(Some(Box::new(v))))
        })
    }

    fn threshold_rule_strategy() -> impl Strategy<Value = ThresholdRule> {
        (any::<i64>(), any::<bool>(), any::<bool>()).prop_map(|(t, is_min, exclusive)| {
            let rule = if is_min {
                ThresholdRule::min(t)
            } else {
                ThresholdRule::max(t)
            };
            if exclusive {
                rule.exclusive()
            } else {
                rule
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Absent values pass every rule that allows omission.
        #[test]
        fn absent_values_are_valid(
            value in absent_value_strategy(),
            rule in threshold_rule_strategy(),
            members in proptest::collection::vec(any::<i32>(), 0..5),
        ) {
            prop_assert!(rule.validate(&value).is_ok());
            prop_assert!(InRule::new(members.clone()).validate(&value).is_ok());
            prop_assert!(NotInRule::new(members).validate(&value).is_ok());
            prop_assert!(MatchRule::new(r"^x$").validate(&value).is_ok());
        }

        // Absent values always fail the required rule.
        #[test]
        fn absent_values_are_not_present(value in absent_value_strategy()) {
            prop_assert!(RequiredRule::new().validate(&value).unwrap_err().is_invalid());
        }

        // Exclusive applied twice equals exclusive applied once.
        #[test]
        fn exclusive_is_idempotent(rule in threshold_rule_strategy()) {
            let once = rule.clone().exclusive();
            let twice = once.clone().exclusive();
            prop_assert_eq!(once, twice);
        }

        // Integer thresholds agree with native ordering for non-zero values.
        #[test]
        fn min_agrees_with_native_ordering(t in any::<i64>(), v in any::<i64>()) {
            prop_assume!(v != 0);
            let inclusive = ThresholdRule::min(t).validate_any(&v);
            prop_assert_eq!(inclusive.is_ok(), v >= t);
            let exclusive = ThresholdRule::min(t).exclusive().validate_any(&v);
            prop_assert_eq!(exclusive.is_ok(), v > t);
        }

        #[test]
        fn max_agrees_with_native_ordering(t in any::<u32>(), v in 1u32..=u32::MAX) {
            let inclusive = ThresholdRule::max(t).validate_any(&v);
            prop_assert_eq!(inclusive.is_ok(), v <= t);
            let exclusive = ThresholdRule::max(t).exclusive().validate_any(&v);
            prop_assert_eq!(exclusive.is_ok(), v < t);
        }

        // Failures are always the rule's own error value, with the threshold param set.
        #[test]
        fn threshold_failures_carry_threshold(t in 1i64..1000, v in -1000i64..0) {
            let err = ThresholdRule::min(t).validate_any(&v).unwrap_err();
            let rule_err = err.rule_error().unwrap();
            prop_assert_eq!(rule_err.code(), "validation_min_greater_equal_than_required");
            prop_assert_eq!(rule_err.params().get("threshold"), Some(&serde_json::json!(t)));
            prop_assert_eq!(err.to_string(), format!("must be no less than {t}"));
        }

        // A deferred literal behaves like the integer it spells.
        #[test]
        fn literals_match_native_integers(t in any::<i64>(), v in any::<i64>()) {
            let rule = ThresholdRule::min(t);
            let literal = Number::new(v.to_string());
            prop_assert_eq!(
                rule.validate_any(&literal).is_ok(),
                rule.validate_any(&v).is_ok()
            );
        }

        // Membership holds exactly when the value is among the candidates.
        #[test]
        fn membership_matches_contains(
            members in proptest::collection::vec(1i32..50, 1..8),
            v in 1i32..50,
        ) {
            let result = InRule::new(members.clone()).validate_any(&v);
            prop_assert_eq!(result.is_ok(), members.contains(&v));
        }
    }
}
