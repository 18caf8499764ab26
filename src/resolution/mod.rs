//! Scale and axis resolution
//!
//! Decides, for every resolvable channel of every unit view, which view owns
//! the scale and axis that channel contributes to. Ownership is found by
//! climbing the data-parent chain ([`climb`]), resolutions are stored in
//! per-view registries and merged state lives in [`ScaleResolution`] and
//! [`AxisResolution`].

pub mod axis;
mod climb;
pub mod domain;
pub mod error;
pub mod scale;
mod validate;

pub use axis::{AxisOrient, AxisProps, AxisResolution};
pub use domain::{CategoryIndexer, Domain, DomainArray};
pub use error::ResolutionError;
pub use scale::{ListenerId, Scale, ScaleEvent, ScaleEventKind, ScaleProps, ScaleResolution, ScaleType};

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::channel::Channel;
use crate::spec::ChannelDef;
use crate::view::{ContainerKind, ViewId, ViewKind};

/// Policy deciding whether a branch shares its resolution upwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionBehavior {
    /// Merge with the parent when the parent also shares
    Shared,
    /// Keep the resolution local unless the parent pulls it up
    Independent,
    /// Collect locally and never climb further
    Excluded,
    /// Always climb one more level
    Forced,
}

impl ResolutionBehavior {
    /// Whether a parent with this behavior accepts resolutions from its children
    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            ResolutionBehavior::Shared | ResolutionBehavior::Excluded | ResolutionBehavior::Forced
        )
    }
}

/// What is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionTarget {
    Scale,
    Axis,
}

impl fmt::Display for ResolutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionTarget::Scale => f.write_str("scale"),
            ResolutionTarget::Axis => f.write_str("axis"),
        }
    }
}

/// Behavior of a view that has no explicit configuration for a channel
///
/// Scales and axes use the same table.
pub fn default_resolution(
    kind: &ViewKind,
    channel: Channel,
    _target: ResolutionTarget,
) -> ResolutionBehavior {
    use ResolutionBehavior::*;

    match kind {
        ViewKind::Unit { .. } => match channel {
            Channel::X => Shared,
            _ => Independent,
        },
        ViewKind::Container(container) => match container {
            ContainerKind::Layer => Shared,
            ContainerKind::Grid => Independent,
            ContainerKind::VConcat => match channel {
                Channel::X => Shared,
                _ => Independent,
            },
            ContainerKind::HConcat => match channel {
                Channel::Y => Shared,
                _ => Independent,
            },
            ContainerKind::Concat { .. } => Independent,
        },
    }
}

/// One unit view's contribution to a resolution
///
/// The definition is captured at registration time, after encoding
/// inheritance, so merged properties never need to look back into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionMember {
    pub view: ViewId,
    pub channel: Channel,
    pub def: ChannelDef,
}

impl ResolutionMember {
    pub fn new(view: ViewId, channel: Channel, def: ChannelDef) -> Self {
        Self { view, channel, def }
    }
}

/// Index of a [`ScaleResolution`] in the tree's scale arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleResolutionId(pub(crate) usize);

/// Index of an [`AxisResolution`] in the tree's axis arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisResolutionId(pub(crate) usize);

/// Per-view storage of the resolutions the view owns
#[derive(Debug, Clone, Default)]
pub struct ResolutionRegistry {
    pub scale: HashMap<Channel, ScaleResolutionId>,
    pub axis: HashMap<Channel, AxisResolutionId>,
}

impl ResolutionRegistry {
    pub fn is_empty(&self) -> bool {
        self.scale.is_empty() && self.axis.is_empty()
    }
}

/// A resolution a unit view has joined, kept on the unit for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Scale(ScaleResolutionId),
    Axis(AxisResolutionId),
}

/// Shared state that unit views contribute to
pub trait Resolution {
    /// The primary channel the resolution was registered for
    fn channel(&self) -> Channel;

    /// Members in insertion order
    fn members(&self) -> &[ResolutionMember];

    /// Add a member, validating it against the existing ones
    fn add_member(&mut self, member: ResolutionMember) -> Result<(), ResolutionError>;

    /// Remove every member contributed by `view`, returning how many were removed
    fn remove_members_of(&mut self, view: ViewId) -> usize;

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}
