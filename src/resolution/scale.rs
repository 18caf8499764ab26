//! Scale resolutions
//!
//! A [`ScaleResolution`] collects the members sharing one scale, merges
//! their explicit scale properties, extracts and merges their domains and
//! keeps the zoom state of positional scales. Domain changes are announced
//! to registered listeners.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::channel::Channel;
use crate::data::Value;
use crate::genome::Genome;
use crate::spec::{ChannelDef, DataType, DomainValue};
use crate::view::ViewId;

use super::domain::{CategoryIndexer, Domain, DomainArray};
use super::{Resolution, ResolutionError, ResolutionMember};

/// Kind of mapping a scale performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Log,
    Sqrt,
    /// Integer positions, e.g. sequence indices
    Index,
    /// Linearized genomic coordinates
    Locus,
    Ordinal,
    Band,
    Point,
}

impl ScaleType {
    /// Default scale type for a channel encoding the given data type
    pub fn infer(channel: Channel, data_type: DataType) -> ScaleType {
        match data_type {
            DataType::Quantitative => ScaleType::Linear,
            DataType::Nominal | DataType::Ordinal if channel.is_positional() => ScaleType::Band,
            DataType::Nominal | DataType::Ordinal => ScaleType::Ordinal,
            DataType::Index => ScaleType::Index,
            DataType::Locus => ScaleType::Locus,
        }
    }

    pub fn is_continuous(self) -> bool {
        matches!(
            self,
            ScaleType::Linear | ScaleType::Log | ScaleType::Sqrt | ScaleType::Index | ScaleType::Locus
        )
    }

    pub fn is_discrete(self) -> bool {
        !self.is_continuous()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Linear => "linear",
            ScaleType::Log => "log",
            ScaleType::Sqrt => "sqrt",
            ScaleType::Index => "index",
            ScaleType::Locus => "locus",
            ScaleType::Ordinal => "ordinal",
            ScaleType::Band => "band",
            ScaleType::Point => "point",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data type a member contributes; genomic positions imply `locus`
pub(crate) fn member_data_type(def: &ChannelDef) -> Option<DataType> {
    def.data_type.or_else(|| {
        (def.chrom.is_some() && def.pos.is_some()).then_some(DataType::Locus)
    })
}

/// The scale object handed to renderers and axes
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub scale_type: ScaleType,
    pub reverse: bool,
    pub zero: bool,
    domain: Option<Domain>,
}

impl Scale {
    fn new(scale_type: ScaleType) -> Self {
        Self {
            scale_type,
            reverse: false,
            zero: false,
            domain: None,
        }
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    /// Replace the domain without notifying anyone
    pub fn set_domain(&mut self, domain: Domain) {
        self.domain = Some(domain);
    }

    /// Map a value into `[0, 1]`, `None` if it falls outside a discrete
    /// domain or cannot be interpreted
    pub fn normalize(&self, value: &Value) -> Option<f64> {
        let t = match self.domain.as_ref()? {
            Domain::Continuous { min, max } => {
                let v = value.as_number()?;
                let (v, min, max) = match self.scale_type {
                    ScaleType::Log if v <= 0.0 || *min <= 0.0 || *max <= 0.0 => return None,
                    ScaleType::Log => (v.ln(), min.ln(), max.ln()),
                    ScaleType::Sqrt => (signed_sqrt(v), signed_sqrt(*min), signed_sqrt(*max)),
                    _ => (v, *min, *max),
                };
                if max == min {
                    0.5
                } else {
                    (v - min) / (max - min)
                }
            }
            Domain::Discrete(values) => {
                let key = value.key();
                let i = values.iter().position(|v| v.key() == key)? as f64;
                let n = values.len() as f64;
                match self.scale_type {
                    ScaleType::Band => (i + 0.5) / n,
                    _ if n > 1.0 => i / (n - 1.0),
                    _ => 0.5,
                }
            }
        };
        Some(if self.reverse { 1.0 - t } else { t })
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

/// Scale properties merged over all members
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleProps {
    pub scale_type: ScaleType,
    pub zero: bool,
    pub reverse: bool,
    pub zoom: bool,
    pub zoom_extent: Option<Vec<DomainValue>>,
}

/// Keep the first defined value, warning about later ones that disagree
fn merge_prop<T: PartialEq + fmt::Debug>(
    slot: &mut Option<T>,
    incoming: Option<T>,
    property: &str,
    channel: Channel,
) {
    let Some(incoming) = incoming else {
        return;
    };
    match slot {
        Some(existing) if *existing != incoming => warn!(
            "Conflicting {} for the {} scale: keeping {:?}, ignoring {:?}",
            property, channel, existing, incoming
        ),
        Some(_) => {}
        None => *slot = Some(incoming),
    }
}

/// Kinds of events a scale resolution emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleEventKind {
    Domain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScaleEvent {
    /// The visible domain changed
    Domain(Domain),
    /// All data is gone and the scale has no domain anymore
    DomainCleared,
}

impl ScaleEvent {
    pub fn kind(&self) -> ScaleEventKind {
        match self {
            ScaleEvent::Domain(_) | ScaleEvent::DomainCleared => ScaleEventKind::Domain,
        }
    }
}

/// Handle for removing a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener = Box<dyn FnMut(&ScaleEvent)>;

/// Supplies the realized values of a member's channel
pub trait DomainSource {
    fn visit_values(&self, member: &ResolutionMember, visitor: &mut dyn FnMut(&Value));
}

/// Shared scale of one channel
pub struct ScaleResolution {
    channel: Channel,
    owner: ViewId,
    members: Vec<ResolutionMember>,
    name: Option<String>,
    data_type: Option<DataType>,
    scale: Scale,
    indexer: CategoryIndexer,
    /// Merged domain before zooming
    full_domain: Option<Domain>,
    genome: Option<Rc<Genome>>,
    props: OnceCell<ScaleProps>,
    listeners: Vec<(ListenerId, ScaleEventKind, Listener)>,
    next_listener: usize,
}

impl fmt::Debug for ScaleResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleResolution")
            .field("channel", &self.channel)
            .field("owner", &self.owner)
            .field("members", &self.members)
            .field("name", &self.name)
            .field("scale", &self.scale)
            .field("full_domain", &self.full_domain)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ScaleResolution {
    pub(crate) fn new(channel: Channel, owner: ViewId, genome: Option<Rc<Genome>>) -> Self {
        Self {
            channel,
            owner,
            members: vec![],
            name: None,
            data_type: None,
            scale: Scale::new(ScaleType::Linear),
            indexer: CategoryIndexer::new(),
            full_domain: None,
            genome,
            props: OnceCell::new(),
            listeners: vec![],
            next_listener: 0,
        }
    }

    /// View whose registry holds this resolution
    pub fn owner(&self) -> ViewId {
        self.owner
    }

    /// Explicit name declared by the members, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn get_scale(&self) -> &Scale {
        &self.scale
    }

    /// Mutable access to the scale object; changes bypass the event listeners
    pub fn get_scale_mut(&mut self) -> &mut Scale {
        &mut self.scale
    }

    /// Merged domain of the members, ignoring zoom
    pub fn get_domain(&self) -> Option<&Domain> {
        self.full_domain.as_ref()
    }

    pub fn indexer(&self) -> &CategoryIndexer {
        &self.indexer
    }

    /// Scale properties merged over all members
    pub fn props(&self) -> &ScaleProps {
        self.props.get_or_init(|| self.merge_props())
    }

    fn merge_props(&self) -> ScaleProps {
        let mut scale_type = None;
        let mut zero = None;
        let mut reverse = None;
        let mut zoom = None;
        for spec in self.members.iter().filter_map(|m| m.def.scale.as_ref()) {
            merge_prop(&mut scale_type, spec.scale_type, "type", self.channel);
            merge_prop(&mut zero, spec.zero, "zero", self.channel);
            merge_prop(&mut reverse, spec.reverse, "reverse", self.channel);
            merge_prop(&mut zoom, spec.zoom.clone(), "zoom", self.channel);
        }

        let scale_type = scale_type.unwrap_or_else(|| {
            self.data_type
                .map(|t| ScaleType::infer(self.channel, t))
                .unwrap_or(ScaleType::Linear)
        });
        ScaleProps {
            scale_type,
            zero: zero.unwrap_or(matches!(scale_type, ScaleType::Linear | ScaleType::Sqrt)),
            reverse: reverse.unwrap_or(false),
            zoom: zoom
                .as_ref()
                .map(|z| z.is_enabled())
                .unwrap_or(matches!(scale_type, ScaleType::Index | ScaleType::Locus)),
            zoom_extent: zoom.as_ref().and_then(|z| z.extent()).map(<[_]>::to_vec),
        }
    }

    /// Whether interactive zooming applies to this scale
    pub fn is_zoomable(&self) -> bool {
        let props = self.props();
        self.channel.is_primary_positional() && props.scale_type.is_continuous() && props.zoom
    }

    /// Whether the visible domain differs from the merged domain
    pub fn is_zoomed(&self) -> bool {
        self.is_zoomable()
            && self.scale.domain.is_some()
            && self.scale.domain.as_ref() != self.full_domain.as_ref()
    }

    /// Recompute the merged domain from explicit domains and member data
    ///
    /// A zoomed scale keeps its visible domain; only the merged domain is
    /// updated. Otherwise a changed domain is applied to the scale object and
    /// announced to listeners.
    pub fn reconfigure_domain(&mut self, source: &dyn DomainSource) -> Result<(), ResolutionError> {
        let props = self.props().clone();
        self.scale.scale_type = props.scale_type;
        self.scale.reverse = props.reverse;
        self.scale.zero = props.zero;

        let discrete = props.scale_type.is_discrete();
        let mut array = if discrete {
            DomainArray::categorical()
        } else {
            DomainArray::quantitative()
        };

        let mut explicit_values = Vec::new();
        let mut explicit = false;
        for member in &self.members {
            let Some(values) = member.def.scale.as_ref().and_then(|s| s.domain.as_ref()) else {
                continue;
            };
            explicit = true;
            for value in values {
                explicit_values.push(linearize(value, self.genome.as_deref(), self.channel)?);
            }
        }
        // Explicit categories own the leading indices even when data was
        // indexed before the explicit member joined
        if discrete && explicit {
            self.indexer.rebase(&explicit_values);
        }
        array.extend_all(&explicit_values);

        for member in &self.members {
            if member.def.scale.as_ref().is_some_and(|s| s.domain.is_some()) {
                continue;
            }
            source.visit_values(member, &mut |value: &Value| array.extend(value));
            trace!(
                "Extracted {} domain of {}:{}: {:?}",
                self.channel,
                member.view,
                member.channel,
                array.to_domain()
            );
        }

        if !discrete && props.zero && !explicit {
            array.include_zero();
        }

        let domain = match array.to_domain() {
            Some(Domain::Discrete(values)) => Some(Domain::Discrete(self.indexer.order(&values))),
            other => other,
        };

        let zoomed = self.is_zoomed();
        self.full_domain = domain.clone();
        if zoomed {
            debug!("Keeping the zoomed {} domain", self.channel);
            return Ok(());
        }

        if self.scale.domain != domain {
            debug!("New {} domain: {:?}", self.channel, domain);
            self.scale.domain = domain.clone();
            self.emit(match domain {
                Some(domain) => ScaleEvent::Domain(domain),
                None => ScaleEvent::DomainCleared,
            });
        }
        Ok(())
    }

    /// Range the domain may be zoomed and panned within
    pub fn zoom_extent(&self) -> Option<Domain> {
        let explicit = self.props().zoom_extent.as_ref().and_then(|values| {
            let numbers: Vec<f64> = values
                .iter()
                .filter_map(|v| linearize(v, self.genome.as_deref(), self.channel).ok())
                .filter_map(|v| v.as_number())
                .collect();
            match numbers.as_slice() {
                [min, max] => Some(Domain::continuous(*min, *max)),
                _ => None,
            }
        });
        explicit.or_else(|| self.full_domain.clone())
    }

    /// Set the visible domain of a zoomable scale
    pub fn zoom_to(&mut self, domain: Domain) -> Result<(), ResolutionError> {
        if !self.is_zoomable() || domain.extent().is_none() {
            return Err(ResolutionError::NotZoomable {
                channel: self.channel,
            });
        }
        self.apply_zoom(domain);
        Ok(())
    }

    /// [`zoom_to`](Self::zoom_to) with a domain given as scalars or loci
    pub fn zoom_to_complex(&mut self, values: &[DomainValue]) -> Result<(), ResolutionError> {
        let numbers = values
            .iter()
            .map(|v| linearize(v, self.genome.as_deref(), self.channel))
            .collect::<Result<Vec<_>, _>>()?;
        match numbers.iter().map(Value::as_number).collect::<Option<Vec<_>>>() {
            Some(bounds) if bounds.len() == 2 => {
                self.zoom_to(Domain::continuous(bounds[0], bounds[1]))
            }
            _ => Err(ResolutionError::NotZoomable {
                channel: self.channel,
            }),
        }
    }

    /// Scale the visible domain by `factor` around `anchor`, then pan it
    ///
    /// The result is clamped into the zoom extent. Returns whether the
    /// visible domain changed.
    pub fn zoom(&mut self, factor: f64, anchor: f64, pan: f64) -> bool {
        if !self.is_zoomable() {
            return false;
        }
        let Some((min, max)) = self.scale.domain().and_then(Domain::extent) else {
            return false;
        };

        let mut new_min = anchor + (min - anchor) * factor + pan;
        let mut new_max = anchor + (max - anchor) * factor + pan;
        if let Some((lo, hi)) = self.zoom_extent().as_ref().and_then(Domain::extent) {
            let span = (new_max - new_min).min(hi - lo);
            new_min = new_min.max(lo).min(hi - span);
            new_max = new_min + span;
        }

        let domain = Domain::continuous(new_min, new_max);
        if self.scale.domain.as_ref() == Some(&domain) {
            return false;
        }
        self.apply_zoom(domain);
        true
    }

    /// Restore the merged domain, returning whether anything changed
    pub fn reset_zoom(&mut self) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        match self.full_domain.clone() {
            Some(domain) => {
                self.apply_zoom(domain);
                true
            }
            None => false,
        }
    }

    fn apply_zoom(&mut self, domain: Domain) {
        if self.scale.domain.as_ref() != Some(&domain) {
            self.scale.domain = Some(domain.clone());
            self.emit(ScaleEvent::Domain(domain));
        }
    }

    /// Ratio of the zoom extent to the visible domain, 1 when not zoomable
    pub fn get_zoom_level(&self) -> f64 {
        if !self.is_zoomable() {
            return 1.0;
        }
        let extent = self.zoom_extent().as_ref().and_then(Domain::span);
        let visible = self.scale.domain().and_then(Domain::span);
        match (extent, visible) {
            (Some(extent), Some(visible)) if visible > 0.0 => extent / visible,
            _ => 1.0,
        }
    }

    /// Visible domain in a form suitable for bookmarking; locus scales
    /// report chromosomal positions
    pub fn get_complex_domain(&self) -> Option<Vec<DomainValue>> {
        let domain = self.scale.domain()?;
        let values = match (domain, self.props().scale_type, self.genome.as_deref()) {
            (Domain::Continuous { min, max }, ScaleType::Locus, Some(genome)) => [*min, *max]
                .iter()
                .map(|linear| match genome.to_chromosomal(*linear) {
                    Some(locus) => DomainValue::Locus {
                        chrom: locus.chrom,
                        pos: locus.pos,
                    },
                    None => DomainValue::Scalar(Value::Number(*linear)),
                })
                .collect(),
            (Domain::Continuous { min, max }, _, _) => vec![
                DomainValue::Scalar(Value::Number(*min)),
                DomainValue::Scalar(Value::Number(*max)),
            ],
            (Domain::Discrete(values), _, _) => {
                values.iter().cloned().map(DomainValue::Scalar).collect()
            }
        };
        Some(values)
    }

    /// Register a listener, returning a handle for removal
    pub fn add_event_listener(
        &mut self,
        kind: ScaleEventKind,
        listener: impl FnMut(&ScaleEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: ScaleEvent) {
        let kind = event.kind();
        for (_, listener_kind, listener) in &mut self.listeners {
            if *listener_kind == kind {
                listener(&event);
            }
        }
    }
}

impl Resolution for ScaleResolution {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn members(&self) -> &[ResolutionMember] {
        &self.members
    }

    fn add_member(&mut self, member: ResolutionMember) -> Result<(), ResolutionError> {
        let name = match (member.def.scale_name(), &self.name) {
            (Some(incoming), Some(existing)) if incoming != existing => {
                return Err(ResolutionError::conflicting_name(
                    self.channel,
                    existing.as_str(),
                    incoming,
                ));
            }
            (incoming, existing) => existing.clone().or(incoming.map(String::from)),
        };

        let data_type = match (member_data_type(&member.def), self.data_type) {
            // Secondary channels follow their primary's type
            (_, existing) if member.channel.is_secondary() => existing,
            (Some(incoming), Some(existing)) if incoming != existing => {
                return Err(ResolutionError::IncompatibleTypes {
                    channel: self.channel,
                    existing: existing.as_str().to_string(),
                    incoming: incoming.as_str().to_string(),
                });
            }
            (incoming, existing) => existing.or(incoming),
        };

        debug!(
            "{} joins the {} scale owned by {}",
            member.view, self.channel, self.owner
        );
        self.name = name;
        self.data_type = data_type;
        self.members.push(member);
        self.props.take();
        Ok(())
    }

    fn remove_members_of(&mut self, view: ViewId) -> usize {
        let before = self.members.len();
        self.members.retain(|m| m.view != view);
        let removed = before - self.members.len();
        if removed > 0 {
            self.name = self
                .members
                .iter()
                .find_map(|m| m.def.scale_name())
                .map(String::from);
            self.data_type = self
                .members
                .iter()
                .filter(|m| !m.channel.is_secondary())
                .find_map(|m| member_data_type(&m.def));
            self.props.take();
        }
        removed
    }
}

/// Convert an explicit domain value into scale coordinates
fn linearize(
    value: &DomainValue,
    genome: Option<&Genome>,
    channel: Channel,
) -> Result<Value, ResolutionError> {
    match value {
        DomainValue::Scalar(value) => Ok(value.clone()),
        DomainValue::Locus { chrom, pos } => {
            let genome = genome.ok_or(ResolutionError::MissingGenome { channel })?;
            genome
                .to_linear(chrom, *pos)
                .map(Value::Number)
                .ok_or_else(|| ResolutionError::UnknownChromosome {
                    chrom: chrom.clone(),
                })
        }
    }
}
