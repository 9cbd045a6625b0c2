//! Error taxonomy for tag derivation and prototype registration.

use thiserror::Error;

/// Errors produced by expression parsing and the prototype registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The input contributed no valid term to the expression.
    #[error("invalid tag segment: {expr:?} contains no term")]
    InvalidSegment { expr: String },

    /// A prototype path is already claimed by a different registration.
    #[error("duplicate registration for {canonic:?}: held by {existing}, rejected {incoming}")]
    DuplicateRegistration {
        canonic: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// Two distinct canonical paths derived the same identifier.
    #[error("tag ID collision: {a:?} and {b:?} derive the same identifier")]
    IdCollision { a: String, b: String },

    /// Registration was attempted after the registry was sealed.
    #[error("registry is sealed; cannot register {canonic:?}")]
    RegistryClosed { canonic: String },

    /// The derived identifier is reserved (nil, wildcard, or a builtin
    /// sentinel) and cannot name a prototype.
    #[error("tag expression {canonic:?} derives a reserved identifier")]
    ReservedId { canonic: String },
}

impl TagError {
    /// True for conflicts that indicate a programming error at the
    /// declaration site rather than an environmental condition.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TagError::DuplicateRegistration { .. } | TagError::IdCollision { .. }
        )
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, TagError::IdCollision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offender() {
        let err = TagError::DuplicateRegistration {
            canonic: "session.login".into(),
            existing: "Login",
            incoming: "LoginV2",
        };
        let msg = err.to_string();
        assert!(msg.contains("session.login"));
        assert!(msg.contains("Login"));
        assert!(msg.contains("LoginV2"));
        assert!(err.is_conflict());
    }

    #[test]
    fn conflict_classification() {
        let closed = TagError::RegistryClosed {
            canonic: "session.err".into(),
        };
        assert!(!closed.is_conflict());

        let collision = TagError::IdCollision {
            a: "x.y".into(),
            b: "p.q".into(),
        };
        assert!(collision.is_collision());
        assert!(collision.is_conflict());
    }
}
