//! Error handling and result types for index operations.
//!
//! Every fallible operation on the index reports one of four conditions:
//! a rejected configuration, a duplicate key, an allocation that could not be
//! satisfied, or a structural inconsistency detected while walking the tree.

/// Error type for index operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The requested branching factor or node limit cannot build a valid tree.
    InvalidConfiguration(String),
    /// The key is already present; the existing entry was left untouched.
    DuplicateKey,
    /// A node, arena slot, or node buffer could not be allocated.
    AllocationFailure(String),
    /// An invariant violation was detected mid-traversal.
    StructuralCorruption(String),
}

impl IndexError {
    /// Create an InvalidConfiguration error for a rejected branching factor
    pub fn invalid_branching_factor(branching_factor: usize, min_required: usize) -> Self {
        Self::InvalidConfiguration(format!(
            "Branching factor {} is invalid (minimum required: {})",
            branching_factor, min_required
        ))
    }

    /// Create an InvalidConfiguration error with context
    pub fn invalid_configuration(setting: &str, details: &str) -> Self {
        Self::InvalidConfiguration(format!("{}: {}", setting, details))
    }

    /// Create an AllocationFailure with context
    pub fn allocation_failure(resource: &str, reason: &str) -> Self {
        Self::AllocationFailure(format!("Failed to allocate {}: {}", resource, reason))
    }

    /// Create a StructuralCorruption error with context
    pub fn structural_corruption(component: &str, details: &str) -> Self {
        Self::StructuralCorruption(format!("{} corruption: {}", component, details))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey)
    }

    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure(_))
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::StructuralCorruption(_))
    }
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            IndexError::DuplicateKey => write!(f, "Key already present in index"),
            IndexError::AllocationFailure(msg) => write!(f, "Allocation failure: {}", msg),
            IndexError::StructuralCorruption(msg) => write!(f, "Structural corruption: {}", msg),
        }
    }
}

impl std::error::Error for IndexError {}

/// Internal result type for tree walks
pub(crate) type TreeResult<T> = Result<T, IndexError>;

/// Public result type for index operations that may fail
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type for key lookup operations
pub type KeyResult<T> = Result<T, IndexError>;

/// Result type for index modification operations
pub type ModifyResult<T> = Result<T, IndexError>;

/// Result type for index construction and validation
pub type InitResult<T> = Result<T, IndexError>;

/// Result extension trait for attaching context to index errors
pub trait IndexResultExt<T> {
    /// Prefix the error message with additional context
    fn with_context(self, context: &str) -> IndexResult<T>;

    /// Prefix the error message with the name of the failing operation
    fn with_operation(self, operation: &str) -> IndexResult<T>;
}

impl<T> IndexResultExt<T> for Result<T, IndexError> {
    fn with_context(self, context: &str) -> IndexResult<T> {
        self.map_err(|e| match e {
            IndexError::InvalidConfiguration(msg) => {
                IndexError::InvalidConfiguration(format!("{}: {}", context, msg))
            }
            IndexError::DuplicateKey => IndexError::DuplicateKey,
            IndexError::AllocationFailure(msg) => {
                IndexError::AllocationFailure(format!("{}: {}", context, msg))
            }
            IndexError::StructuralCorruption(msg) => {
                IndexError::StructuralCorruption(format!("{}: {}", context, msg))
            }
        })
    }

    fn with_operation(self, operation: &str) -> IndexResult<T> {
        self.with_context(&format!("Operation '{}'", operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_classify() {
        assert!(IndexError::invalid_branching_factor(1, 2).is_configuration_error());
        assert!(IndexError::DuplicateKey.is_duplicate_key());
        assert!(IndexError::allocation_failure("leaf node", "limit reached").is_allocation_failure());
        assert!(IndexError::structural_corruption("Branch 3", "missing child").is_corruption());
    }

    #[test]
    fn test_display_includes_details() {
        let err = IndexError::invalid_branching_factor(1, 2);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Branching factor 1 is invalid (minimum required: 2)"
        );
        assert_eq!(IndexError::DuplicateKey.to_string(), "Key already present in index");
    }

    #[test]
    fn test_with_operation_keeps_variant() {
        let result: IndexResult<()> =
            Err(IndexError::structural_corruption("Descent", "leaf 4 missing"));
        let err = result.with_operation("insert").unwrap_err();
        assert!(err.is_corruption());
        assert!(err.to_string().contains("Operation 'insert'"));
        assert!(err.to_string().contains("leaf 4 missing"));

        let dup: IndexResult<()> = Err(IndexError::DuplicateKey);
        assert_eq!(dup.with_context("vehicles").unwrap_err(), IndexError::DuplicateKey);
    }
}
