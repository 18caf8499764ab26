//! Error types for scale and axis resolution

use thiserror::Error;

use crate::channel::Channel;

/// Errors raised while building, resolving or mutating a view tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    /// Two members of one shared scale declare different names
    #[error("shared scale for channel '{channel}' has conflicting names: \"{existing}\" vs. \"{incoming}\"")]
    ConflictingScaleName {
        channel: Channel,
        existing: String,
        incoming: String,
    },

    /// One name claimed by two scales that do not share a resolution
    #[error("scale name \"{name}\" is used by independent scales owned by '{first}' and '{second}'")]
    DuplicateScaleName {
        name: String,
        first: String,
        second: String,
    },

    /// A channel needs a scale but none was resolved for it
    #[error("missing scale for channel '{channel}' in view '{view}'")]
    MissingScale { view: String, channel: Channel },

    /// No free orientation slot left for an axis
    #[error("no free orient for the {channel} axis in view '{view}' (taken: {taken})")]
    AmbiguousAxisOrient {
        view: String,
        channel: Channel,
        taken: String,
    },

    /// Members of one scale encode different data types
    #[error("can not share the {channel} scale between {existing} and {incoming} data; use an independent resolution")]
    IncompatibleTypes {
        channel: Channel,
        existing: String,
        incoming: String,
    },

    /// A data-referencing definition without a data type
    #[error("channel '{channel}' in view '{view}' has no data type")]
    MissingType { view: String, channel: Channel },

    /// Genomic coordinates without a configured genome
    #[error("channel '{channel}' uses genomic coordinates but no genome is configured")]
    MissingGenome { channel: Channel },

    /// Locus domain referring to a chromosome the genome does not have
    #[error("unknown chromosome '{chrom}'")]
    UnknownChromosome { chrom: String },

    /// Channel expression failed to parse
    #[error("invalid expression for channel '{channel}': {source_text}\n{message}")]
    InvalidExpression {
        channel: Channel,
        source_text: String,
        message: String,
    },

    /// Zoom requested on a scale that does not zoom
    #[error("the {channel} scale is not zoomable")]
    NotZoomable { channel: Channel },

    /// Structurally invalid view specification
    #[error("invalid view '{view}': {reason}")]
    InvalidView { view: String, reason: String },

    /// A view id that is not (or no longer) part of the tree
    #[error("unknown view {id}")]
    UnknownView { id: usize },
}

impl ResolutionError {
    /// Create a conflicting name error
    pub fn conflicting_name(
        channel: Channel,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Self::ConflictingScaleName {
            channel,
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate_name(
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateScaleName {
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn missing_scale(view: impl Into<String>, channel: Channel) -> Self {
        Self::MissingScale {
            view: view.into(),
            channel,
        }
    }

    pub fn invalid_expression(
        channel: Channel,
        source_text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidExpression {
            channel,
            source_text: source_text.into(),
            message: message.into(),
        }
    }

    pub fn invalid_view(view: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidView {
            view: view.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_name_display() {
        let err = ResolutionError::conflicting_name(Channel::Y, "scale_1", "scale_2");
        let message = err.to_string();
        assert!(message.contains("\"scale_1\""));
        assert!(message.contains("\"scale_2\""));
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = ResolutionError::duplicate_name("scale_1", "root/a", "root/b");
        assert!(err.to_string().contains("root/a"));
        assert!(err.to_string().contains("root/b"));
    }

    #[test]
    fn test_missing_scale_display() {
        let err = ResolutionError::missing_scale("points", Channel::Color);
        assert_eq!(
            err.to_string(),
            "missing scale for channel 'color' in view 'points'"
        );
    }
}
