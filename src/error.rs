//! Simulation errors.

use std::fmt;

use crate::models::{Pid, Tick};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Why a run could not start or could not finish.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// No valid process descriptors.
    EmptyInput,
    /// A process needs more memory than any partition provides.
    Unadmittable {
        pid: Pid,
        memory_required: u64,
        largest_partition: u64,
    },
    /// Other structural input problems.
    InvalidInput(Vec<ValidationError>),
    /// No process can make progress any more.
    Stalled { time: Tick, pending: Vec<Pid> },
    /// The configured tick limit was reached before all processes finished.
    TickLimitExceeded { limit: Tick },
}

/// Result alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;

impl SimulationError {
    /// Maps validation failures to the most specific error.
    ///
    /// Empty input and unadmittable processes get their own variants;
    /// anything else is reported as a list.
    pub fn from_validation(
        errors: Vec<ValidationError>,
        memory_of: impl Fn(Pid) -> u64,
        largest_partition: u64,
    ) -> Self {
        if errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyInput)
        {
            return Self::EmptyInput;
        }

        let unadmittable = errors
            .iter()
            .find(|e| e.kind == ValidationErrorKind::Unadmittable)
            .and_then(|e| e.pid);

        match unadmittable {
            Some(pid) => Self::Unadmittable {
                pid,
                memory_required: memory_of(pid),
                largest_partition,
            },
            None => Self::InvalidInput(errors),
        }
    }

    /// Whether the run was rejected because it could never finish.
    pub fn is_deadlock(&self) -> bool {
        matches!(self, Self::Unadmittable { .. } | Self::Stalled { .. })
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("no valid processes to simulate"),
            Self::Unadmittable {
                pid,
                memory_required,
                largest_partition,
            } => write!(
                f,
                "process {pid} can never be admitted: needs {memory_required} memory units, largest partition is {largest_partition}"
            ),
            Self::InvalidInput(errors) => {
                write!(f, "invalid input: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            Self::Stalled { time, pending } => {
                write!(f, "simulation stalled at t={time}; pending processes {pending:?}")
            }
            Self::TickLimitExceeded { limit } => {
                write!(f, "simulation did not finish within {limit} ticks")
            }
        }
    }
}

impl std::error::Error for SimulationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PartitionTable, ProcessDescriptor};
    use crate::validation::validate_input;

    #[test]
    fn test_from_validation_unadmittable() {
        let descs = vec![ProcessDescriptor::new(4, 64, 0, 1)];
        let table = PartitionTable::canonical();
        let errors = validate_input(&descs, &table).unwrap_err();

        let err = SimulationError::from_validation(errors, |_| 64, table.largest_capacity());
        assert_eq!(
            err,
            SimulationError::Unadmittable {
                pid: 4,
                memory_required: 64,
                largest_partition: 40,
            }
        );
        assert!(err.is_deadlock());
    }

    #[test]
    fn test_from_validation_empty() {
        let errors = validate_input(&[], &PartitionTable::canonical()).unwrap_err();
        let err = SimulationError::from_validation(errors, |_| 0, 40);
        assert_eq!(err, SimulationError::EmptyInput);
        assert!(!err.is_deadlock());
    }

    #[test]
    fn test_display() {
        let err = SimulationError::TickLimitExceeded { limit: 10 };
        assert_eq!(err.to_string(), "simulation did not finish within 10 ticks");

        let err = SimulationError::Stalled {
            time: 3,
            pending: vec![1, 2],
        };
        assert!(err.to_string().contains("t=3"));
    }
}
