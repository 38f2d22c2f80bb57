//! Observation representations

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for observations from an environment
pub trait Observation: Clone + Debug + Send {
    /// Get the shape of the observation
    fn shape(&self) -> Vec<usize>;
}

/// Vector observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    /// The observation data
    pub data: Vec<f64>,
}

impl From<Vec<f64>> for VectorObservation {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl Observation for VectorObservation {
    fn shape(&self) -> Vec<usize> {
        vec![self.data.len()]
    }
}
