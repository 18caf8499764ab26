//! Core types for the view tree

use std::collections::BTreeMap;
use std::fmt;

use crate::channel::Channel;
use crate::data::{Accessor, Collector, Datum};
use crate::encoder::Encoder;
use crate::resolution::{Membership, ResolutionRegistry};
use crate::spec::{Encoding, ResolveSpec, SpecKind};

/// Index of a view in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) usize);

impl ViewId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Container variants, each with its own default resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Overlaid children sharing one coordinate system
    Layer,
    /// Generic grid of independent panels
    Grid,
    /// Children stacked top to bottom
    VConcat,
    /// Children placed left to right
    HConcat,
    /// Children wrapped into rows without a forced direction
    Concat { columns: Option<usize> },
}

/// Type of view in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    Unit { mark: String },
    Container(ContainerKind),
}

impl ViewKind {
    pub fn from_spec(kind: SpecKind, mark: Option<&str>, columns: Option<usize>) -> Self {
        match kind {
            SpecKind::Unit => ViewKind::Unit {
                mark: mark.unwrap_or_default().to_string(),
            },
            SpecKind::Layer => ViewKind::Container(ContainerKind::Layer),
            SpecKind::Grid => ViewKind::Container(ContainerKind::Grid),
            SpecKind::VConcat => ViewKind::Container(ContainerKind::VConcat),
            SpecKind::HConcat => ViewKind::Container(ContainerKind::HConcat),
            SpecKind::Concat => ViewKind::Container(ContainerKind::Concat { columns }),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, ViewKind::Unit { .. })
    }

    /// Prefix for generated view names
    pub fn name_prefix(&self) -> &'static str {
        match self {
            ViewKind::Unit { .. } => "unit",
            ViewKind::Container(ContainerKind::Layer) => "layer",
            ViewKind::Container(ContainerKind::Grid) => "grid",
            ViewKind::Container(ContainerKind::VConcat) => "vconcat",
            ViewKind::Container(ContainerKind::HConcat) => "hconcat",
            ViewKind::Container(ContainerKind::Concat { .. }) => "concat",
        }
    }
}

/// A node of the view arena
///
/// `layout_parent` and `children` form the composition tree; `data_parent`
/// forms the independent forest used for encoding inheritance, data
/// inheritance and resolution ownership.
#[derive(Debug)]
pub struct ViewNode {
    pub(crate) name: String,
    pub(crate) kind: ViewKind,
    pub(crate) layout_parent: Option<ViewId>,
    pub(crate) data_parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    pub(crate) resolve: ResolveSpec,
    /// Rows loaded with this view as their source
    pub(crate) source: Option<Vec<Datum>>,
    pub(crate) registry: ResolutionRegistry,
    /// Effective encoding after inheritance along the data parent
    pub(crate) encoding: Encoding,

    // Unit views only
    pub(crate) accessors: BTreeMap<Channel, Accessor>,
    pub(crate) collector: Collector,
    pub(crate) memberships: Vec<Membership>,
    pub(crate) encoders: Vec<Encoder>,
}

impl ViewNode {
    pub(crate) fn new(name: String, kind: ViewKind) -> Self {
        Self {
            name,
            kind,
            layout_parent: None,
            data_parent: None,
            children: vec![],
            resolve: ResolveSpec::default(),
            source: None,
            registry: ResolutionRegistry::default(),
            encoding: Encoding::new(),
            accessors: BTreeMap::new(),
            collector: Collector::new(),
            memberships: vec![],
            encoders: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn is_unit(&self) -> bool {
        self.kind.is_unit()
    }

    pub fn layout_parent(&self) -> Option<ViewId> {
        self.layout_parent
    }

    pub fn data_parent(&self) -> Option<ViewId> {
        self.data_parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    /// Effective encoding after inheritance
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Encoders created when the view was attached; empty for containers
    pub fn encoders(&self) -> &[Encoder] {
        &self.encoders
    }

    pub fn resolve_config(&self) -> &ResolveSpec {
        &self.resolve
    }

    pub fn registry(&self) -> &ResolutionRegistry {
        &self.registry
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn accessor(&self, channel: Channel) -> Option<&Accessor> {
        self.accessors.get(&channel)
    }
}
