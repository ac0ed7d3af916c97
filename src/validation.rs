//! Input validation for simulation runs.
//!
//! Checks the process descriptors against the partition layout before the
//! first tick. Detects:
//! - Empty input
//! - Duplicate process IDs
//! - Zero process IDs and zero memory requirements
//! - Memory requirements no partition can ever satisfy
//!
//! The last check is what keeps the engine from spinning forever on a
//! process that can never be admitted.

use std::collections::HashSet;
use std::fmt;

use crate::models::{PartitionTable, Pid, ProcessDescriptor};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending process, if any.
    pub pid: Option<Pid>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No processes to simulate.
    EmptyInput,
    /// Two processes share the same ID.
    DuplicateId,
    /// Process ID is zero.
    InvalidId,
    /// Memory requirement is zero.
    InvalidMemory,
    /// Memory requirement exceeds every partition.
    Unadmittable,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, pid: Option<Pid>, message: impl Into<String>) -> Self {
        Self {
            kind,
            pid,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates descriptors against a partition layout.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_input(
    descriptors: &[ProcessDescriptor],
    partitions: &PartitionTable,
) -> ValidationResult {
    if descriptors.is_empty() {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::EmptyInput,
            None,
            "No processes to simulate",
        )]);
    }

    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let largest = partitions.largest_capacity();

    for desc in descriptors {
        if !seen.insert(desc.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                Some(desc.id),
                format!("Duplicate process ID: {}", desc.id),
            ));
        }

        if desc.id == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidId,
                Some(desc.id),
                "Process ID must be positive",
            ));
        }

        if desc.memory_required == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMemory,
                Some(desc.id),
                format!("Process {} requires no memory", desc.id),
            ));
        } else if !partitions.can_ever_fit(desc.memory_required) {
            errors.push(ValidationError::new(
                ValidationErrorKind::Unadmittable,
                Some(desc.id),
                format!(
                    "Process {} needs {} memory units but the largest partition holds {}",
                    desc.id, desc.memory_required, largest
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
