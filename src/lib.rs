//! Chart Resolution - scale and axis resolution for composed chart views
//!
//! This library builds a tree of views from a JSON specification, decides
//! which views share scales and axes, merges their domains and synthesizes
//! combined axis titles.
//!
//! # Example
//!
//! ```rust
//! use chart_resolution::{build, Channel};
//!
//! let tree = build(r#"{
//!     "data": {"values": [{"a": 2, "b": 3}]},
//!     "layer": [
//!         {"name": "first", "mark": "point", "encoding": {"y": {"field": "a", "type": "quantitative"}}},
//!         {"name": "second", "mark": "point", "encoding": {"y": {"field": "b", "type": "quantitative"}}}
//!     ]
//! }"#).unwrap();
//!
//! let first = tree.find_view("first").unwrap();
//! let axis = tree.get_axis_resolution(first, Channel::Y).unwrap();
//! assert_eq!(axis.get_title(), Some("a, b"));
//! ```

pub mod channel;
pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod expr;
pub mod genome;
pub mod report;
pub mod resolution;
pub mod spec;
pub mod view;

pub use channel::Channel;
pub use config::{ConfigError, EngineConfig};
pub use data::{Datum, Value};
pub use error::ExprError;
pub use resolution::{
    AxisResolution, Domain, Resolution, ResolutionBehavior, ResolutionError, ScaleResolution,
};
pub use spec::ViewSpec;
pub use view::{ViewId, ViewTree};

use log::debug;
use thiserror::Error;

/// Errors that can occur while building a view tree
#[derive(Debug, Error)]
pub enum BuildError {
    /// The specification is not valid JSON or does not match the schema
    #[error("invalid specification: {0}")]
    Spec(#[from] serde_json::Error),

    /// Error loading the engine configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error during resolution
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Build and resolve a view tree with default configuration
///
/// Inline data is loaded, so domains reflect it on return.
pub fn build(source: &str) -> Result<ViewTree, BuildError> {
    build_with_config(source, &EngineConfig::default())
}

/// Build and resolve a view tree with custom configuration
///
/// # Example
///
/// ```rust
/// use chart_resolution::{build_with_config, EngineConfig};
///
/// let config = EngineConfig::new().with_validate_names(false);
/// let tree = build_with_config(r#"{"mark": "point"}"#, &config).unwrap();
/// assert!(tree.root().is_some());
/// ```
pub fn build_with_config(source: &str, config: &EngineConfig) -> Result<ViewTree, BuildError> {
    let spec: ViewSpec = serde_json::from_str(source)?;

    let mut tree = ViewTree::with_config(config);
    tree.add_root(&spec)?;
    tree.load_inline_data()?;
    debug!(
        "Resolved {} scales and {} axes",
        tree.scale_resolutions().count(),
        tree.axis_resolutions().count()
    );

    if config.debug {
        eprintln!("=== Resolution Debug ===");
        eprint!("{}", report::describe(&tree));
        eprintln!("========================");
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple_unit() {
        let tree = build(
            r#"{"mark": "point", "encoding": {"x": {"field": "a", "type": "quantitative"}}}"#,
        )
        .unwrap();
        let root = tree.root().unwrap();
        assert!(tree.get_scale_resolution(root, Channel::X).is_some());
        assert!(tree.get_axis_resolution(root, Channel::X).is_some());
    }

    #[test]
    fn test_build_invalid_json() {
        let err = build("{ not json").unwrap_err();
        assert!(matches!(err, BuildError::Spec(_)));
    }

    #[test]
    fn test_build_unknown_field() {
        let err = build(r#"{"mark": "point", "bogus": 1}"#).unwrap_err();
        assert!(matches!(err, BuildError::Spec(_)));
    }

    #[test]
    fn test_build_resolution_error() {
        let err = build(
            r#"{"layer": [
                {"mark": "point", "encoding": {"y": {"field": "a", "type": "quantitative", "scale": {"name": "scale_1"}}}},
                {"mark": "point", "encoding": {"y": {"field": "b", "type": "quantitative", "scale": {"name": "scale_2"}}}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Resolution(ResolutionError::ConflictingScaleName { .. })
        ));
    }

    #[test]
    fn test_build_loads_inline_data() {
        let tree = build(
            r#"{
                "mark": "point",
                "data": {"values": [{"a": 2}, {"a": 3}]},
                "encoding": {"x": {"field": "a", "type": "quantitative"}}
            }"#,
        )
        .unwrap();
        let root = tree.root().unwrap();
        let x = tree.get_scale_resolution(root, Channel::X).unwrap();
        assert_eq!(x.get_scale().domain(), Some(&Domain::continuous(0.0, 3.0)));
    }
}
