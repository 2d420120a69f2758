use thiserror::Error;

/// Result type alias using TrackError
pub type Result<T> = std::result::Result<T, TrackError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Registration
    UnknownAssociation,
    TypeNotRegistered,
    TypeNotDeclared,
    AlreadyRegistered,

    // Resolution
    AssociationResolutionFailed,

    // Mutation
    RecordFrozen,

    // Internal
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownAssociation => "ERR_UNKNOWN_ASSOCIATION",
            ExErrorKind::TypeNotRegistered => "ERR_TYPE_NOT_REGISTERED",
            ExErrorKind::TypeNotDeclared => "ERR_TYPE_NOT_DECLARED",
            ExErrorKind::AlreadyRegistered => "ERR_ALREADY_REGISTERED",
            ExErrorKind::AssociationResolutionFailed => "ERR_ASSOCIATION_RESOLUTION_FAILED",
            ExErrorKind::RecordFrozen => "ERR_RECORD_FROZEN",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification kind plus whatever context the failing
/// operation knew about (entity type, association, record id).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_type: Option<String>,
    association: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_type: None,
            association: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Add association context
    pub fn with_association(mut self, association: impl Into<String>) -> Self {
        self.association = Some(association.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn association(&self) -> Option<&str> {
        self.association.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_type) = &self.entity_type {
            write!(f, " (entity_type: {})", entity_type)?;
        }
        if let Some(association) = &self.association {
            write!(f, " (association: {})", association)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for change tracking operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// Association is not declared (or not watched) on the entity type
    #[error("Unknown association '{association}' on entity type {entity_type}")]
    UnknownAssociation {
        entity_type: String,
        association: String,
    },

    /// Watched associations were queried before `register` was called
    #[error("Entity type not registered: {entity_type}")]
    TypeNotRegistered { entity_type: String },

    /// Relationship metadata knows nothing about the entity type
    #[error("Entity type has no declared relationships: {entity_type}")]
    TypeNotDeclared { entity_type: String },

    /// Entity type was already registered with a different watch set
    #[error("Entity type {entity_type} is already registered with watched associations {existing:?}")]
    AlreadyRegistered {
        entity_type: String,
        existing: Vec<String>,
    },

    /// The persistence collaborator failed to load the related records
    #[error("Failed to resolve association '{association}' on entity type {entity_type}: {reason}")]
    AssociationResolutionFailed {
        entity_type: String,
        association: String,
        reason: String,
    },

    /// Attempted to mutate a record that was deleted (frozen)
    #[error("Record {entity_id} of type {entity_type} is deleted and frozen")]
    RecordFrozen {
        entity_type: String,
        entity_id: String,
    },

    /// Serialization error (JSON encoding while digesting a snapshot)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<TrackError> for ExError {
    fn from(err: TrackError) -> Self {
        match err {
            TrackError::UnknownAssociation {
                entity_type,
                association,
            } => ExError::new(ExErrorKind::UnknownAssociation)
                .with_entity_type(entity_type)
                .with_association(association)
                .with_message("Association is not declared on the entity type"),

            TrackError::TypeNotRegistered { entity_type } => {
                ExError::new(ExErrorKind::TypeNotRegistered)
                    .with_entity_type(entity_type)
                    .with_op("watched_associations")
                    .with_message("Entity type has not been registered")
            }

            TrackError::TypeNotDeclared { entity_type } => {
                ExError::new(ExErrorKind::TypeNotDeclared)
                    .with_entity_type(entity_type)
                    .with_op("register")
                    .with_message("Relationship metadata has no entry for the entity type")
            }

            TrackError::AlreadyRegistered {
                entity_type,
                existing,
            } => ExError::new(ExErrorKind::AlreadyRegistered)
                .with_entity_type(entity_type)
                .with_op("register")
                .with_message(format!("Already watching {:?}", existing)),

            TrackError::AssociationResolutionFailed {
                entity_type,
                association,
                reason,
            } => ExError::new(ExErrorKind::AssociationResolutionFailed)
                .with_entity_type(entity_type)
                .with_association(association)
                .with_message(reason),

            TrackError::RecordFrozen {
                entity_type,
                entity_id,
            } => ExError::new(ExErrorKind::RecordFrozen)
                .with_entity_type(entity_type)
                .with_entity_id(entity_id)
                .with_message("Deleted records cannot be mutated"),

            TrackError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to TrackError
impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::UnknownAssociation, "ERR_UNKNOWN_ASSOCIATION"),
            (ExErrorKind::TypeNotRegistered, "ERR_TYPE_NOT_REGISTERED"),
            (ExErrorKind::TypeNotDeclared, "ERR_TYPE_NOT_DECLARED"),
            (ExErrorKind::AlreadyRegistered, "ERR_ALREADY_REGISTERED"),
            (
                ExErrorKind::AssociationResolutionFailed,
                "ERR_ASSOCIATION_RESOLUTION_FAILED",
            ),
            (ExErrorKind::RecordFrozen, "ERR_RECORD_FROZEN"),
            (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let err = ExError::new(ExErrorKind::UnknownAssociation)
            .with_op("register")
            .with_entity_type("Order")
            .with_association("lines")
            .with_message("not declared");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_UNKNOWN_ASSOCIATION]"));
        assert!(rendered.contains("in operation 'register'"));
        assert!(rendered.contains("(entity_type: Order)"));
        assert!(rendered.contains("(association: lines)"));
    }

    #[test]
    fn test_resolution_failure_keeps_reason() {
        let err = TrackError::AssociationResolutionFailed {
            entity_type: "Order".to_string(),
            association: "items".to_string(),
            reason: "connection reset".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::AssociationResolutionFailed);
        assert_eq!(ex.message(), "connection reset");
        assert_eq!(ex.association(), Some("items"));
    }
}
