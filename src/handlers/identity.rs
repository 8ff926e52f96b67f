//! Handler identity generation.

use thiserror::Error;
use uuid::Uuid;

/// Failure to produce a handler identity.
#[derive(Debug, Error)]
#[error("identity generation failed: {0}")]
pub struct IdError(pub String);

/// Source of handler identities.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, IdError>;
}

/// Random (v4) UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String, IdError> {
        Ok(Uuid::new_v4().to_string())
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> Result<String, IdError> + Send + Sync,
{
    fn generate(&self) -> Result<String, IdError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator() {
        let a = UuidGenerator.generate().unwrap();
        let b = UuidGenerator.generate().unwrap();
        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn test_closure_generator() {
        let failing = || -> Result<String, IdError> { Err(IdError("clock ran out".into())) };
        let err = failing.generate().unwrap_err();
        assert_eq!(err.to_string(), "identity generation failed: clock ran out");
    }
}
