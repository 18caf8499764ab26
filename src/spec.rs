//! View specification (JSON)
//!
//! A specification is a tree of views. Leaves are unit views with a mark and
//! an encoding; containers are layers, concatenations and grids. Any view
//! may carry `data`, an `encoding` inherited by its data children, and a
//! `resolve` block controlling scale and axis sharing.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer};

use crate::channel::Channel;
use crate::data::{Datum, Value};
use crate::resolution::axis::AxisOrient;
use crate::resolution::scale::ScaleType;
use crate::resolution::{ResolutionBehavior, ResolutionTarget};

/// Channel definitions keyed by channel, iterated in channel order
pub type Encoding = BTreeMap<Channel, ChannelDef>;

/// Encoding as written in a view: `null` drops a channel inherited from
/// the data parent
pub type EncodingSpec = BTreeMap<Channel, Option<ChannelDef>>;

/// Deserialize a present field as `Some`, keeping an explicit `null` distinct
/// from an absent field (which falls back to `None` through `#[serde(default)]`)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A view in the specification tree
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ViewSpec {
    pub name: Option<String>,
    pub data: Option<DataSpec>,
    #[serde(default)]
    pub encoding: EncodingSpec,
    #[serde(default)]
    pub resolve: ResolveSpec,

    /// Mark type; present only on unit views
    pub mark: Option<String>,
    pub layer: Option<Vec<ViewSpec>>,
    pub vconcat: Option<Vec<ViewSpec>>,
    pub hconcat: Option<Vec<ViewSpec>>,
    /// Wrapping concatenation
    pub concat: Option<Vec<ViewSpec>>,
    pub columns: Option<usize>,
    pub grid: Option<Vec<ViewSpec>>,
}

/// Structural variant of a [`ViewSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Unit,
    Layer,
    VConcat,
    HConcat,
    Concat,
    Grid,
}

impl ViewSpec {
    /// Create a unit view spec with the given mark
    pub fn unit(mark: impl Into<String>) -> Self {
        Self {
            mark: Some(mark.into()),
            ..Default::default()
        }
    }

    /// Determine the variant; exactly one of the variant keys must be present
    pub fn kind(&self) -> Result<SpecKind, String> {
        let present: Vec<SpecKind> = [
            (self.mark.is_some(), SpecKind::Unit),
            (self.layer.is_some(), SpecKind::Layer),
            (self.vconcat.is_some(), SpecKind::VConcat),
            (self.hconcat.is_some(), SpecKind::HConcat),
            (self.concat.is_some(), SpecKind::Concat),
            (self.grid.is_some(), SpecKind::Grid),
        ]
        .into_iter()
        .filter_map(|(set, kind)| set.then_some(kind))
        .collect();

        match present.as_slice() {
            [kind] => Ok(*kind),
            [] => Err("view has none of mark, layer, vconcat, hconcat, concat, grid".to_string()),
            _ => Err(format!("view mixes several view types: {:?}", present)),
        }
    }

    /// Child specs of a container, empty for unit views
    pub fn children(&self) -> &[ViewSpec] {
        self.layer
            .as_deref()
            .or(self.vconcat.as_deref())
            .or(self.hconcat.as_deref())
            .or(self.concat.as_deref())
            .or(self.grid.as_deref())
            .unwrap_or(&[])
    }
}

/// Inline data attached to a view
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSpec {
    #[serde(default)]
    pub values: Vec<Datum>,
}

/// Per-target resolution configuration, keyed by channel name or `default`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveSpec {
    #[serde(default)]
    pub scale: HashMap<String, ResolutionBehavior>,
    #[serde(default)]
    pub axis: HashMap<String, ResolutionBehavior>,
}

impl ResolveSpec {
    /// The configured behavior for a channel, falling back to the `default` key
    pub fn get(&self, channel: Channel, target: ResolutionTarget) -> Option<ResolutionBehavior> {
        let table = match target {
            ResolutionTarget::Scale => &self.scale,
            ResolutionTarget::Axis => &self.axis,
        };
        table
            .get(channel.as_str())
            .or_else(|| table.get("default"))
            .copied()
    }

    /// Set a behavior; `None` as channel sets the `default` key
    pub fn set(
        &mut self,
        target: ResolutionTarget,
        channel: Option<Channel>,
        behavior: ResolutionBehavior,
    ) {
        let table = match target {
            ResolutionTarget::Scale => &mut self.scale,
            ResolutionTarget::Axis => &mut self.axis,
        };
        let key = channel.map(Channel::as_str).unwrap_or("default");
        table.insert(key.to_string(), behavior);
    }
}

/// Measurement level of the encoded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Quantitative,
    Nominal,
    Ordinal,
    Index,
    Locus,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Quantitative => "quantitative",
            DataType::Nominal => "nominal",
            DataType::Ordinal => "ordinal",
            DataType::Index => "index",
            DataType::Locus => "locus",
        }
    }

    pub fn is_discrete(self) -> bool {
        matches!(self, DataType::Nominal | DataType::Ordinal)
    }
}

/// Definition of one encoded channel
///
/// Exactly one source should be given: `field`, `datum`, `expr`, `value`,
/// or the `chrom`/`pos` pair of a genomic position.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChannelDef {
    pub field: Option<String>,
    pub datum: Option<Value>,
    pub expr: Option<String>,
    pub value: Option<Value>,
    pub chrom: Option<String>,
    pub pos: Option<String>,

    #[serde(rename = "type")]
    pub data_type: Option<DataType>,

    /// `None` when absent, `Some(Value::Null)` when explicitly suppressed
    #[serde(default, deserialize_with = "deserialize_some")]
    pub title: Option<Value>,

    pub scale: Option<ScaleSpec>,

    /// `None` when absent, `Some(None)` for `axis: null`
    #[serde(default, deserialize_with = "deserialize_some")]
    pub axis: Option<Option<AxisSpec>>,

    /// Resolve this channel's scale and axis as if it were another channel
    pub resolution_channel: Option<Channel>,
}

impl ChannelDef {
    /// Field-based definition with a data type
    pub fn field(field: impl Into<String>, data_type: DataType) -> Self {
        Self {
            field: Some(field.into()),
            data_type: Some(data_type),
            ..Default::default()
        }
    }

    /// Whether the definition references data (and thus takes part in resolution)
    pub fn is_resolvable(&self) -> bool {
        self.field.is_some()
            || self.datum.is_some()
            || self.expr.is_some()
            || (self.chrom.is_some() && self.pos.is_some())
    }

    /// Axis properties, unless absent or explicitly `null`
    pub fn axis_spec(&self) -> Option<&AxisSpec> {
        self.axis.as_ref().and_then(Option::as_ref)
    }

    pub fn is_axis_suppressed(&self) -> bool {
        matches!(self.axis, Some(None))
    }

    pub fn scale_name(&self) -> Option<&str> {
        self.scale.as_ref().and_then(|s| s.name.as_deref())
    }
}

/// A value in an explicit domain: a scalar or a genomic locus
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Locus { chrom: String, pos: f64 },
    Scalar(Value),
}

/// Zoom configuration: a flag or parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ZoomSpec {
    Enabled(bool),
    Params {
        #[serde(default)]
        extent: Option<Vec<DomainValue>>,
    },
}

impl ZoomSpec {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ZoomSpec::Enabled(false))
    }

    pub fn extent(&self) -> Option<&[DomainValue]> {
        match self {
            ZoomSpec::Params { extent } => extent.as_deref(),
            ZoomSpec::Enabled(_) => None,
        }
    }
}

/// Explicit scale properties of a channel definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScaleSpec {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub scale_type: Option<ScaleType>,
    pub domain: Option<Vec<DomainValue>>,
    pub zero: Option<bool>,
    pub reverse: Option<bool>,
    pub zoom: Option<ZoomSpec>,
}

/// Explicit axis properties of a channel definition
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AxisSpec {
    /// `None` when absent, `Some(Value::Null)` when explicitly suppressed
    #[serde(default, deserialize_with = "deserialize_some")]
    pub title: Option<Value>,
    pub orient: Option<AxisOrient>,
    pub grid: Option<bool>,
    pub labels: Option<bool>,
    pub ticks: Option<bool>,
    pub tick_count: Option<u32>,
    pub format: Option<String>,
    pub label_angle: Option<f64>,
}
