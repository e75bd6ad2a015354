use serde::Serialize;
use thiserror::Error;

use crate::graph::ParameterType;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Unable to resolve animator controller: {0}")]
    UnresolvedController(String),

    #[error("Conversion rule for parameter `{parameter}` produced no condition variants")]
    RuleProducedNoVariant { parameter: String },

    #[error("Parameter `{0}` is declared more than once")]
    DuplicateParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal findings recorded while migrating a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Source and target share no same-named parameter of a different type.
    NoConvertibleParameters,
    /// No rule covers the type pair; the original parameter survives under a new name.
    UnhandledTypePair {
        parameter: String,
        old_type: ParameterType,
        new_type: ParameterType,
        renamed_to: String,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoConvertibleParameters => {
                write!(f, "No convertible parameters, graph copied unchanged")
            }
            Notice::UnhandledTypePair {
                parameter,
                old_type,
                new_type,
                renamed_to,
            } => write!(
                f,
                "No rule for {old_type} -> {new_type} on `{parameter}`, kept as `{renamed_to}`"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_controller_display() {
        let err = MigrationError::UnresolvedController("override has no controller".into());
        assert_eq!(
            err.to_string(),
            "Unable to resolve animator controller: override has no controller"
        );
    }

    #[test]
    fn notice_display() {
        let notice = Notice::UnhandledTypePair {
            parameter: "Crouch".into(),
            old_type: ParameterType::Float,
            new_type: ParameterType::Bool,
            renamed_to: "_Crouch".into(),
        };
        assert_eq!(
            notice.to_string(),
            "No rule for Float -> Bool on `Crouch`, kept as `_Crouch`"
        );
    }

    #[test]
    fn notice_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Notice::NoConvertibleParameters).unwrap();
        assert_eq!(json, r#"{"kind":"no_convertible_parameters"}"#);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MigrationError>();
    }
}
