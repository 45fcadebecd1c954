// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Graph and Declaration Invariants
//!
//! Every rule the deployment graph enforces at construction time lives here
//! as a pure function returning a detailed [`ValidationError`].
//!
//! # Invariant Categories
//!
//! 1. **Ordering Invariants**: units appear once, in the fixed order
//! 2. **Handle Invariants**: handles flow only from earlier units to their
//!    declared consumers
//! 3. **Declaration Invariants**: rule priorities, capacity bounds, ids

use super::unit::{HandleKind, UnitKind};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A unit consumed a handle whose producer is not part of this graph
    #[error("{consumer} consumes a {handle} from {producer}, which has not been constructed earlier in this graph")]
    DependencyOrder {
        consumer: UnitKind,
        producer: String,
        handle: HandleKind,
    },

    /// A unit consumed a handle it is not declared to consume
    #[error("{consumer} is not a declared consumer of the {handle}")]
    UndeclaredConsumer { consumer: UnitKind, handle: HandleKind },

    /// A template imports a value that no consumed handle publishes
    #[error("{consumer} imports {export}, which no handle it consumed publishes")]
    UnconsumedImport { consumer: UnitKind, export: String },

    /// The same unit was constructed twice
    #[error("{0} has already been constructed")]
    DuplicateUnit(UnitKind),

    /// A unit was constructed before one that precedes it
    #[error("{unit} must be constructed before {previous}")]
    OutOfOrder { unit: UnitKind, previous: UnitKind },

    /// Two resources of one stack resolved to the same logical id
    #[error("Duplicate logical id {logical_id} in stack {stack}")]
    DuplicateLogicalId { stack: String, logical_id: String },

    /// Rule priorities must be unique and strictly increasing
    #[error("Rule priorities must be strictly increasing, got {0:?}")]
    PriorityOrder(Vec<u32>),

    /// Autoscaling bounds are inconsistent
    #[error("Invalid capacity bounds: min {min}, max {max}")]
    CapacityBounds { min: u32, max: u32 },

    /// Business rule violation
    #[error("Business rule violated: {0}")]
    BusinessRule(String),
}

/// Validate that `next` may follow the last constructed unit
///
/// # Rules
/// - Each unit appears at most once
/// - Units appear in strictly increasing order (skipping is allowed)
pub fn validate_unit_order(constructed: &[UnitKind], next: UnitKind) -> ValidationResult {
    if constructed.contains(&next) {
        return Err(ValidationError::DuplicateUnit(next));
    }

    if let Some(previous) = constructed.last() {
        if previous.ordinal() > next.ordinal() {
            return Err(ValidationError::OutOfOrder {
                unit: next,
                previous: *previous,
            });
        }
    }

    Ok(())
}

/// Validate that `consumer` is declared to consume handles of `handle`
pub fn validate_consumer(handle: HandleKind, consumer: UnitKind) -> ValidationResult {
    if !handle.consumers().contains(&consumer) {
        return Err(ValidationError::UndeclaredConsumer { consumer, handle });
    }
    Ok(())
}

/// Validate that a consumed handle comes from a strictly earlier unit
///
/// # Parameters
/// - `producer_unit`: the unit of the stack that published the handle, if
///   that stack exists in the graph
pub fn validate_producer(
    handle: HandleKind,
    producer_stack: &str,
    producer_unit: Option<UnitKind>,
    consumer: UnitKind,
) -> ValidationResult {
    let dependency_error = || ValidationError::DependencyOrder {
        consumer,
        producer: producer_stack.to_string(),
        handle,
    };

    match producer_unit {
        Some(unit) if unit == handle.producer() && unit.ordinal() < consumer.ordinal() => Ok(()),
        _ => Err(dependency_error()),
    }
}

/// Validate rule priorities are unique and strictly increasing
pub fn validate_priorities(priorities: &[u32]) -> ValidationResult {
    if priorities.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ValidationError::PriorityOrder(priorities.to_vec()));
    }
    Ok(())
}

/// Validate autoscaling capacity bounds
///
/// # Rules
/// - Minimum at least 1
/// - Minimum not above maximum
pub fn validate_capacity(min: u32, max: u32) -> ValidationResult {
    if min == 0 || min > max {
        return Err(ValidationError::CapacityBounds { min, max });
    }
    Ok(())
}

/// Validate a logical id is usable in a template
pub fn validate_logical_id(logical_id: &str) -> ValidationResult {
    if logical_id.is_empty()
        || logical_id.len() > 255
        || !logical_id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ValidationError::BusinessRule(format!(
            "Logical id {:?} must be 1-255 alphanumeric characters",
            logical_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_unit_order() {
        assert!(validate_unit_order(&[], UnitKind::Network).is_ok());
        assert!(validate_unit_order(&[UnitKind::Network], UnitKind::Compute).is_ok());

        // Skipping is allowed
        assert!(validate_unit_order(&[UnitKind::Network], UnitKind::Edge).is_ok());

        assert_eq!(
            validate_unit_order(&[UnitKind::Network], UnitKind::Network),
            Err(ValidationError::DuplicateUnit(UnitKind::Network))
        );
        assert!(matches!(
            validate_unit_order(&[UnitKind::Monitoring], UnitKind::Compute),
            Err(ValidationError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_validate_consumer() {
        assert!(validate_consumer(HandleKind::Network, UnitKind::Bastion).is_ok());
        assert!(validate_consumer(HandleKind::Bucket, UnitKind::Backup).is_ok());
        assert!(matches!(
            validate_consumer(HandleKind::BastionSecurityGroup, UnitKind::Compute),
            Err(ValidationError::UndeclaredConsumer { .. })
        ));
    }

    #[test]
    fn test_validate_producer() {
        assert!(validate_producer(
            HandleKind::Host,
            "AliceRimBastionStack",
            Some(UnitKind::Bastion),
            UnitKind::Backup
        )
        .is_ok());

        // Producer missing from the graph
        assert!(matches!(
            validate_producer(HandleKind::Host, "AliceRimBastionStack", None, UnitKind::Backup),
            Err(ValidationError::DependencyOrder { .. })
        ));

        // Stack exists but is not the producing unit
        assert!(validate_producer(
            HandleKind::Host,
            "AliceRimVpcStack",
            Some(UnitKind::Network),
            UnitKind::Backup
        )
        .is_err());
    }

    #[test]
    fn test_validate_priorities() {
        assert!(validate_priorities(&[0, 1, 2]).is_ok());
        assert!(validate_priorities(&[]).is_ok());
        assert!(validate_priorities(&[0, 0, 1]).is_err());
        assert!(validate_priorities(&[1, 0]).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(1, 4).is_ok());
        assert!(validate_capacity(0, 4).is_err());
        assert!(validate_capacity(5, 4).is_err());
    }

    #[test]
    fn test_validate_logical_id() {
        assert!(validate_logical_id("AliceVpc12AB34CD").is_ok());
        assert!(validate_logical_id("").is_err());
        assert!(validate_logical_id("alice-vpc").is_err());
    }
}
