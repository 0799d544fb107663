//! Test helper for checking which attribute values a class accepts.
//!
//! Every candidate attribute is tried twice: merged into the valid attributes
//! and constructed, and applied with `with` to an instance built from the
//! valid attributes. A value is accepted when construction succeeds and
//! rejected when it fails with [`ValueError::InvalidValue`].

use std::sync::Arc;

use crate::class::ValueClass;
use crate::error::{ValueError, ValueResult};
use crate::instance::Instance;
use crate::value::{ToMapping, Value, ValueMap};
use crate::value_object::ValueObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expectation {
    Accept,
    Reject,
}

impl Expectation {
    fn describe(self) -> &'static str {
        match self {
            Expectation::Accept => "should accept",
            Expectation::Reject => "should REJECT",
        }
    }

    fn is_met(self, outcome: &ValueResult<Instance>) -> bool {
        match self {
            Expectation::Accept => outcome.is_ok(),
            Expectation::Reject => matches!(outcome, Err(ValueError::InvalidValue { .. })),
        }
    }
}

/// A class plus a set of attributes known to construct successfully.
#[derive(Debug, Clone)]
pub struct Fixture {
    class: Arc<ValueClass>,
    valid: ValueMap,
}

impl Fixture {
    /// Panics if `valid` is not map-like.
    pub fn new<M>(class: Arc<ValueClass>, valid: &M) -> Self
    where
        M: ToMapping + ?Sized,
    {
        let Some(valid) = valid.to_mapping() else {
            panic!("fixture attributes for `{}` must be map-like", class.name());
        };
        Self { class, valid }
    }

    pub fn for_type<T: ValueObject, M>(valid: &M) -> Self
    where
        M: ToMapping + ?Sized,
    {
        Self::new(Arc::clone(T::value_class()), valid)
    }

    pub fn class(&self) -> &Arc<ValueClass> {
        &self.class
    }

    /// Descriptions of every candidate attribute that was not accepted.
    pub fn check_accepts<I>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: ToMapping,
    {
        self.check(candidates, Expectation::Accept)
    }

    /// Descriptions of every candidate attribute that was not rejected.
    pub fn check_rejects<I>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: ToMapping,
    {
        self.check(candidates, Expectation::Reject)
    }

    #[track_caller]
    pub fn assert_accepts<I>(&self, candidates: I)
    where
        I: IntoIterator,
        I::Item: ToMapping,
    {
        let failures = self.check_accepts(candidates);
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }

    #[track_caller]
    pub fn assert_rejects<I>(&self, candidates: I)
    where
        I: IntoIterator,
        I::Item: ToMapping,
    {
        let failures = self.check_rejects(candidates);
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }

    fn check<I>(&self, candidates: I, expectation: Expectation) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: ToMapping,
    {
        let mut failures = Vec::new();
        for candidate in candidates {
            let Some(pairs) = candidate.to_mapping() else {
                failures.push(format!(
                    "{} candidate attributes must be map-like, got {}",
                    self.class.name(),
                    candidate.type_name()
                ));
                continue;
            };
            for (key, value) in pairs {
                let attr: ValueMap = [(key, value)].into_iter().collect();

                let mut merged = self.valid.clone();
                merged.extend(attr.clone());
                let built = self.class.construct(&merged);
                if !expectation.is_met(&built) {
                    failures.push(self.describe(".new", expectation, &attr, &built));
                }

                let changed = self.class.construct(&self.valid).and_then(|i| i.with(&attr));
                if !expectation.is_met(&changed) {
                    failures.push(self.describe("#with", expectation, &attr, &changed));
                }
            }
        }
        failures
    }

    fn describe(
        &self,
        method: &str,
        expectation: Expectation,
        attr: &ValueMap,
        outcome: &ValueResult<Instance>,
    ) -> String {
        let got = match outcome {
            Ok(instance) => format!("{instance:?}"),
            Err(err) => err.to_string(),
        };
        format!(
            "{}{method} {}: {:?} (got {got})",
            self.class.name(),
            expectation.describe(),
            Value::Map(attr.clone()),
        )
    }
}
