use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type of an animator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    Bool,
    Int,
    Float,
    Trigger,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::Bool => write!(f, "Bool"),
            ParameterType::Int => write!(f, "Int"),
            ParameterType::Float => write!(f, "Float"),
            ParameterType::Trigger => write!(f, "Trigger"),
        }
    }
}

/// A named, typed input driving graph evaluation.
///
/// Two parameters are "the same parameter" across schemas when their names
/// match exactly, whatever their types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

/// A declared change of one parameter's type between the source and target schemas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterConversion {
    /// The parameter as declared in the source graph.
    pub parameter: Parameter,
    pub name: String,
    pub old_type: ParameterType,
    pub new_type: ParameterType,
    /// Shadow name the original parameter is kept under when no rule can
    /// rewrite its conditions. Decided by the reconciler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

impl ParameterConversion {
    pub fn new(parameter: &Parameter, new_type: ParameterType) -> Self {
        Self {
            parameter: parameter.clone(),
            name: parameter.name.clone(),
            old_type: parameter.kind,
            new_type,
            rename: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.old_type == self.new_type
    }
}

impl fmt::Display for ParameterConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.old_type, self.new_type)?;
        if let Some(rename) = &self.rename {
            write!(f, " (kept as {rename})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_type_serializes_by_name() {
        let p = Parameter::new("GestureLeft", ParameterType::Int);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"name":"GestureLeft","type":"Int"}"#);
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let p = Parameter::new("Gesture", ParameterType::Int);
        assert!(p.is_named("Gesture"));
        assert!(!p.is_named("gesture"));
    }

    #[test]
    fn conversion_display() {
        let mut c = ParameterConversion::new(
            &Parameter::new("Crouch", ParameterType::Float),
            ParameterType::Trigger,
        );
        assert_eq!(c.to_string(), "Crouch: Float -> Trigger");
        c.rename = Some("_Crouch".into());
        assert_eq!(c.to_string(), "Crouch: Float -> Trigger (kept as _Crouch)");
    }
}
