//! Hyperparameter values, sets and grids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};

/// A single hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// One point of a grid: ordered `(name, value)` assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    values: Vec<(String, ParamValue)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Set `name`, replacing an earlier value.
    pub fn insert(&mut self, name: &str, value: ParamValue) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric parameter, or `default` when absent.
    pub fn float_or(&self, name: &str, default: f64) -> Result<f64> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Float(value)) => Ok(*value),
            Some(other) => Err(VerdictError::invalid_config(format!(
                "parameter {name} must be numeric, got {other}"
            ))),
        }
    }

    /// Text parameter, or `default` when absent.
    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Text(value)) => Ok(value),
            Some(other) => Err(VerdictError::invalid_config(format!(
                "parameter {name} must be text, got {other}"
            ))),
        }
    }

    /// Fail on any parameter name outside `known`.
    pub fn check_known(&self, family: &str, known: &[&str]) -> Result<()> {
        for (name, _) in self.iter() {
            if !known.contains(&name) {
                return Err(VerdictError::invalid_config(format!(
                    "unknown parameter {name} for {family}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Ordered axes whose cartesian product gives the grid points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    axes: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis<V: Into<ParamValue>>(mut self, name: &str, values: Vec<V>) -> Self {
        self.axes
            .push((name.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|(_, values)| values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All grid points, first axis varying slowest. A grid without axes has
    /// a single empty point.
    pub fn points(&self) -> Vec<ParamSet> {
        let mut points = vec![ParamSet::new()];
        for (name, values) in &self.axes {
            let mut next = Vec::with_capacity(points.len() * values.len());
            for point in &points {
                for value in values {
                    let mut extended = point.clone();
                    extended.insert(name, value.clone());
                    next.push(extended);
                }
            }
            points = next;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_points_first_axis_slowest() {
        let grid = ParamGrid::new()
            .axis("c", vec![0.1, 1.0, 10.0])
            .axis("penalty", vec!["l1", "l2"]);
        let points = grid.points();
        assert_eq!(grid.len(), 6);
        assert_eq!(points.len(), 6);
        assert_eq!(points[0].to_string(), "{c=0.1, penalty=l1}");
        assert_eq!(points[1].to_string(), "{c=0.1, penalty=l2}");
        assert_eq!(points[5].to_string(), "{c=10, penalty=l2}");
    }

    #[test]
    fn test_empty_grid_has_one_point() {
        let grid = ParamGrid::new();
        assert_eq!(grid.points(), vec![ParamSet::new()]);
    }

    #[test]
    fn test_typed_access() {
        let params = ParamSet::new().with("alpha", 0.5).with("loss", "hinge");
        assert_eq!(params.float_or("alpha", 1.0).unwrap(), 0.5);
        assert_eq!(params.float_or("missing", 1.0).unwrap(), 1.0);
        assert_eq!(params.text_or("loss", "x").unwrap(), "hinge");
        assert!(params.float_or("loss", 1.0).is_err());
        assert!(params.check_known("svm", &["alpha", "loss"]).is_ok());
        assert!(params.check_known("svm", &["alpha"]).is_err());
    }

    #[test]
    fn test_serde_untagged_values() {
        let params = ParamSet::new().with("c", 1.0).with("penalty", "l2");
        let json = serde_json::to_string(&params).unwrap();
        let restored: ParamSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, params);
    }
}
