// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Comparison operators: gt, lt, ge, le, eq
//!
//! Comparisons run on the unwrapped, identity-substituted payloads. Absence
//! on either side makes every comparison false; absence is never equal to
//! absence.

use std::cmp::Ordering;

use crate::model::{MagmaValue, Value};

impl MagmaValue {
    /// Strictly greater than
    pub fn gt(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        ordered(self, &other.into(), Ordering::is_gt)
    }

    /// Strictly less than
    pub fn lt(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        ordered(self, &other.into(), Ordering::is_lt)
    }

    /// Greater than or equal
    pub fn ge(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        ordered(self, &other.into(), Ordering::is_ge)
    }

    /// Less than or equal
    pub fn le(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        ordered(self, &other.into(), Ordering::is_le)
    }

    /// Equality with entity identities substituted first
    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        let other = other.into();
        if self.is_absent() || other.is_absent() {
            return MagmaValue::from(false);
        }
        MagmaValue::from(self.value() == other.value())
    }
}

fn ordered(left: &MagmaValue, right: &MagmaValue, test: fn(Ordering) -> bool) -> MagmaValue {
    if left.is_absent() || right.is_absent() {
        return MagmaValue::from(false);
    }
    let result = compare_values(&left.value(), &right.value()).is_some_and(test);
    MagmaValue::from(result)
}

/// Order two raw values of the same kind
///
/// Values of different kinds, entities, lists and NaN are unordered.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Raw strict equality used by the `===` infix form
///
/// Unlike [`MagmaValue::eq`], two nulls are equal here.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use rstest::rstest;

    fn truth(value: MagmaValue) -> bool {
        value.value().as_bool().unwrap()
    }

    #[rstest]
    #[case(5, 4, true, false, true, false)]
    #[case(2, 9, false, true, false, true)]
    #[case(2, 2, false, false, true, true)]
    fn test_numeric_ordering(
        #[case] left: i32,
        #[case] right: i32,
        #[case] gt: bool,
        #[case] lt: bool,
        #[case] ge: bool,
        #[case] le: bool,
    ) {
        let value = MagmaValue::wrap(left);
        assert_eq!(truth(value.gt(right)), gt);
        assert_eq!(truth(value.lt(right)), lt);
        assert_eq!(truth(value.ge(right)), ge);
        assert_eq!(truth(value.le(right)), le);
    }

    #[test]
    fn test_absent_left_is_false() {
        let absent = MagmaValue::Absent;
        assert!(!truth(absent.gt(9)));
        assert!(!truth(absent.lt(9)));
        assert!(!truth(absent.ge(9)));
        assert!(!truth(absent.le(9)));
        assert!(!truth(absent.eq(3)));
    }

    #[test]
    fn test_absence_never_equals_absence() {
        assert!(!truth(MagmaValue::Absent.eq(MagmaValue::Absent)));
    }

    #[test]
    fn test_eq_on_strings() {
        assert!(!truth(MagmaValue::wrap("a").eq("b")));
        assert!(truth(MagmaValue::wrap("c").eq("c")));
    }

    #[test]
    fn test_eq_uses_entity_identity() {
        let gender = Entity::new().with_identity("m").with_attribute("label", "Male");
        assert!(truth(MagmaValue::wrap(gender.clone()).eq("m")));
        assert!(truth(MagmaValue::wrap(gender.clone()).eq(gender)));
    }

    #[test]
    fn test_mixed_kinds_are_unordered() {
        assert!(!truth(MagmaValue::wrap("10").gt(2)));
        assert_eq!(compare_values(&Value::Null, &Value::Null), None);
    }

    #[test]
    fn test_strict_equals() {
        assert!(strict_equals(&Value::from("test"), &Value::from("test")));
        assert!(!strict_equals(&Value::from(1), &Value::from("1")));
        assert!(strict_equals(&Value::Null, &Value::Null));
    }
}
