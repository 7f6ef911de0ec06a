//! Renewable resource model.
//!
//! A renewable resource offers a fixed number of units at every time
//! instant; units are released when a task finishes.
//!
//! # Reference
//! Brucker et al. (1999), "Resource-constrained project scheduling:
//! Notation, classification, models, and methods"

use serde::{Deserialize, Serialize};

/// A renewable resource with constant capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier (e.g. `R1`).
    pub id: String,
    /// Units available concurrently at any instant.
    pub capacity: i64,
}

impl Resource {
    /// Creates a resource.
    pub fn new(id: impl Into<String>, capacity: i64) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }

    /// Whether the resource can host any demand at all.
    ///
    /// Zero-capacity resources are skipped by the model builder.
    pub fn is_active(&self) -> bool {
        self.capacity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource() {
        let r = Resource::new("R1", 12);
        assert_eq!(r.id, "R1");
        assert_eq!(r.capacity, 12);
        assert!(r.is_active());
        assert!(!Resource::new("R2", 0).is_active());
    }
}
