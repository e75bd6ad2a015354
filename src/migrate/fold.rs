use crate::error::MigrationError;
use crate::graph::{Condition, ParameterConversion};

use super::rules::{Rebind, RuleTable};

/// The condition-list variants replacing one transition's guard. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub first: Vec<Condition>,
    pub rest: Vec<Vec<Condition>>,
    pub rebinds: Vec<Rebind>,
}

impl Expansion {
    pub fn variant_count(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn is_split(&self) -> bool {
        !self.rest.is_empty()
    }

    pub fn variants(&self) -> impl Iterator<Item = &Vec<Condition>> {
        std::iter::once(&self.first).chain(&self.rest)
    }
}

/// Threads `conditions` through every conversion in order.
///
/// Each conversion replaces every current variant by the variants its rule
/// produces for it, so the count multiplies only where a rule splits.
pub fn fold(
    rules: &RuleTable,
    conditions: &[Condition],
    conversions: &[ParameterConversion],
) -> Result<Expansion, MigrationError> {
    let mut variants = vec![conditions.to_vec()];
    let mut rebinds = Vec::new();

    for conversion in conversions {
        let mut next = Vec::with_capacity(variants.len());
        for variant in &variants {
            let rewrite = rules.apply(conversion, variant);
            if rewrite.variants.is_empty() {
                return Err(MigrationError::RuleProducedNoVariant {
                    parameter: conversion.name.clone(),
                });
            }
            next.extend(rewrite.variants);
            rebinds.extend(rewrite.rebinds);
        }
        variants = next;
    }

    let mut variants = variants.into_iter();
    let first = variants
        .next()
        .ok_or_else(|| MigrationError::RuleProducedNoVariant {
            parameter: String::new(),
        })?;

    Ok(Expansion {
        first,
        rest: variants.collect(),
        rebinds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Parameter, ParameterType};

    fn conversion(name: &str, old: ParameterType, new: ParameterType) -> ParameterConversion {
        ParameterConversion::new(&Parameter::new(name, old), new)
    }

    #[test]
    fn no_conversions_is_identity() {
        let conditions = vec![Condition::equals("Gesture", 1.0)];
        let expansion = fold(&RuleTable::default(), &conditions, &[]).unwrap();
        assert_eq!(expansion.first, conditions);
        assert!(!expansion.is_split());
    }

    #[test]
    fn same_type_conversions_are_identity() {
        let conditions = vec![
            Condition::equals("Gesture", 1.0),
            Condition::greater("Speed", 0.5),
            Condition::if_true("Seated"),
        ];
        let conversions = [
            conversion("Gesture", ParameterType::Int, ParameterType::Int),
            conversion("Speed", ParameterType::Float, ParameterType::Float),
            conversion("Seated", ParameterType::Bool, ParameterType::Bool),
        ];
        let expansion = fold(&RuleTable::default(), &conditions, &conversions).unwrap();
        assert_eq!(expansion.variant_count(), 1);
        assert_eq!(expansion.first, conditions);
    }

    #[test]
    fn splits_multiply_in_conversion_order() {
        let rules = RuleTable::default().without_index_mapping();
        let conditions = vec![Condition::not_equal("A", 1.0), Condition::not_equal("B", 5.0)];
        let conversions = [
            conversion("A", ParameterType::Int, ParameterType::Float),
            conversion("B", ParameterType::Int, ParameterType::Float),
        ];
        let expansion = fold(&rules, &conditions, &conversions).unwrap();
        assert_eq!(expansion.variant_count(), 4);

        let sides: Vec<Vec<String>> = expansion
            .variants()
            .map(|v| v.iter().map(|c| format!("{} {}", c.parameter, c.mode)).collect())
            .collect();
        assert_eq!(
            sides,
            vec![
                vec!["A <", "B <"],
                vec!["A <", "B >"],
                vec!["A >", "B <"],
                vec!["A >", "B >"],
            ]
        );
    }

    #[test]
    fn later_conversions_see_earlier_rewrites() {
        let rules = RuleTable::default();
        let conditions = vec![Condition::if_true("Jump"), Condition::if_true("Seated")];
        let conversions = [
            conversion("Jump", ParameterType::Trigger, ParameterType::Bool),
            conversion("Seated", ParameterType::Bool, ParameterType::Int),
        ];
        let expansion = fold(&rules, &conditions, &conversions).unwrap();
        assert_eq!(
            expansion.first,
            vec![Condition::if_true("Jump"), Condition::greater("Seated", 0.0)]
        );
    }

    #[test]
    fn float_to_int_then_int_to_float_contains_rounded_value() {
        let rules = RuleTable::default().without_index_mapping();
        let conditions = vec![Condition::greater("Speed", 1.6), Condition::less("Speed", 2.4)];

        let to_int = fold(
            &rules,
            &conditions,
            &[conversion("Speed", ParameterType::Float, ParameterType::Int)],
        )
        .unwrap();
        assert_eq!(to_int.first, vec![Condition::equals("Speed", 2.0)]);

        let back = fold(
            &rules,
            &to_int.first,
            &[conversion("Speed", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();
        let (low, high) = (back.first[0].threshold, back.first[1].threshold);
        assert!(low < 2.0 && 2.0 < high);
        assert!(low > 1.0 && high < 3.0);
    }

    #[test]
    fn gesture_rebinds_are_collected() {
        let rules = RuleTable::default();
        let conditions = vec![Condition::equals("GestureLeft", 1.0)];
        let expansion = fold(
            &rules,
            &conditions,
            &[conversion("GestureLeft", ParameterType::Int, ParameterType::Float)],
        )
        .unwrap();
        assert_eq!(expansion.rebinds.len(), 1);
        assert!(expansion.rebinds[0].drive_time);
    }
}
