use std::collections::HashSet;

use serde::Serialize;

use crate::error::MigrationError;
use crate::graph::{Parameter, ParameterConversion};

use super::rules::{RuleKind, RuleTable};

/// Conversions derived from two parameter schemas and the merged parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub conversions: Vec<ParameterConversion>,
    pub parameters: Vec<Parameter>,
}

impl Reconciliation {
    /// Conversions whose original parameter survives under a shadow name.
    pub fn renamed(&self) -> impl Iterator<Item = &ParameterConversion> {
        self.conversions.iter().filter(|c| c.rename.is_some())
    }
}

/// Matches `source` against `target` by name.
///
/// Every same-named pair of different types becomes a conversion, in source
/// order. The merged set lists converted parameters first, then target-only
/// parameters, then source parameters that need no conversion. A conversion
/// with no rule keeps the source parameter under a shadow name, next to the
/// newly typed one.
pub fn reconcile(
    source: &[Parameter],
    target: &[Parameter],
    rules: &RuleTable,
) -> Result<Reconciliation, MigrationError> {
    ensure_unique(source)?;
    ensure_unique(target)?;

    let taken: HashSet<&str> = source
        .iter()
        .chain(target)
        .map(|p| p.name.as_str())
        .collect();
    let mut shadows: Vec<String> = Vec::new();

    let mut conversions = Vec::new();
    for parameter in source {
        let Some(wanted) = target.iter().find(|t| t.is_named(&parameter.name)) else {
            continue;
        };
        if wanted.kind == parameter.kind {
            continue;
        }

        let mut conversion = ParameterConversion::new(parameter, wanted.kind);
        if RuleKind::for_pair(conversion.old_type, conversion.new_type).renames() {
            let mut shadow = format!("{}{}", rules.rename_prefix(), parameter.name);
            while taken.contains(shadow.as_str()) || shadows.contains(&shadow) {
                shadow = format!("{}{shadow}", rules.rename_prefix());
            }
            shadows.push(shadow.clone());
            conversion.rename = Some(shadow);
        }
        conversions.push(conversion);
    }

    let is_converted = |name: &str| conversions.iter().any(|c| c.name == name);

    let mut parameters = Vec::with_capacity(source.len() + target.len() + shadows.len());
    for conversion in &conversions {
        if let Some(shadow) = &conversion.rename {
            parameters.push(Parameter::new(shadow.clone(), conversion.old_type));
        }
        parameters.push(Parameter::new(conversion.name.clone(), conversion.new_type));
    }
    parameters.extend(
        target
            .iter()
            .filter(|t| !source.iter().any(|s| s.is_named(&t.name)))
            .cloned(),
    );
    parameters.extend(source.iter().filter(|s| !is_converted(&s.name)).cloned());

    Ok(Reconciliation {
        conversions,
        parameters,
    })
}

fn ensure_unique(parameters: &[Parameter]) -> Result<(), MigrationError> {
    let mut seen = HashSet::new();
    for parameter in parameters {
        if !seen.insert(parameter.name.as_str()) {
            return Err(MigrationError::DuplicateParameter(parameter.name.clone()));
        }
    }
    Ok(())
}
