//! The view tree
//!
//! Views live in an arena and refer to each other by [`ViewId`]. Each node
//! has a layout parent (composition) and a data parent (encoding and data
//! inheritance, resolution ownership); usually they coincide but inserted
//! views may pick a different data parent.
//!
//! Construction and mutation run the resolution pass for the affected
//! subtree only, so a tree is always fully resolved between calls.

mod types;

pub use types::{ContainerKind, ViewId, ViewKind, ViewNode};

use std::collections::BTreeSet;
use std::rc::Rc;

use log::{info, warn};

use crate::channel::Channel;
use crate::config::EngineConfig;
use crate::data::{Accessor, Datum, Value};
use crate::genome::Genome;
use crate::resolution::scale::DomainSource;
use crate::resolution::{
    AxisResolution, AxisResolutionId, Membership, Resolution, ResolutionError, ResolutionMember,
    ScaleResolution, ScaleResolutionId,
};
use crate::spec::{Encoding, EncodingSpec, ViewSpec};

/// Arena of views plus the resolutions they own
#[derive(Debug, Default)]
pub struct ViewTree {
    pub(crate) nodes: Vec<Option<ViewNode>>,
    pub(crate) scales: Vec<Option<ScaleResolution>>,
    pub(crate) axes: Vec<Option<AxisResolution>>,
    root: Option<ViewId>,
    genome: Option<Rc<Genome>>,
    validate_names: bool,
    name_counter: usize,
}

impl ViewTree {
    pub fn new() -> Self {
        Self {
            validate_names: true,
            ..Default::default()
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            genome: config.genome.clone().map(Rc::new),
            validate_names: config.validate_names,
            ..Self::new()
        }
    }

    pub fn genome(&self) -> Option<&Genome> {
        self.genome.as_deref()
    }

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    /// A live view, `None` for unknown or removed ids
    pub fn view(&self, id: ViewId) -> Option<&ViewNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node(&self, id: ViewId) -> Result<&ViewNode, ResolutionError> {
        self.view(id)
            .ok_or(ResolutionError::UnknownView { id: id.0 })
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Result<&mut ViewNode, ResolutionError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ResolutionError::UnknownView { id: id.0 })
    }

    /// First live view with the given name, in arena order
    pub fn find_view(&self, name: &str) -> Option<ViewId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, node)| node.as_ref().is_some_and(|n| n.name == name))
            .map(|(i, _)| ViewId(i))
    }

    /// Slash-separated names from the root down to `id`
    pub fn view_path(&self, id: ViewId) -> String {
        let mut names = vec![];
        let mut current = Some(id);
        while let Some(view) = current.and_then(|id| self.view(id)) {
            names.push(view.name.as_str());
            current = view.layout_parent;
        }
        names.reverse();
        names.join("/")
    }

    /// All live views below and including `id` in layout preorder
    pub fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut order = vec![];
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(view) = self.view(id) else {
                continue;
            };
            order.push(id);
            stack.extend(view.children.iter().rev());
        }
        order
    }

    /// All live views in layout preorder
    pub fn views(&self) -> Vec<ViewId> {
        self.root.map(|root| self.subtree(root)).unwrap_or_default()
    }

    /// Unit views below and including `id`
    pub fn units(&self, id: ViewId) -> Vec<ViewId> {
        self.subtree(id)
            .into_iter()
            .filter(|id| self.view(*id).is_some_and(ViewNode::is_unit))
            .collect()
    }

    // ============================================
    // Construction
    // ============================================

    /// Build the tree from a root specification and resolve it
    pub fn add_root(&mut self, spec: &ViewSpec) -> Result<ViewId, ResolutionError> {
        if let Some(root) = self.root {
            return Err(ResolutionError::invalid_view(
                self.view_path(root),
                "the tree already has a root",
            ));
        }
        let id = match self.instantiate(spec, None, None) {
            Ok(id) => id,
            Err(err) => {
                self.clear();
                return Err(err);
            }
        };
        if spec.name.is_none() {
            self.node_mut(id)?.name = "root".to_string();
        }
        self.root = Some(id);
        info!("Created {} views", self.nodes.len());
        if let Err(err) = self.attach(id) {
            self.clear();
            return Err(err);
        }
        Ok(id)
    }

    /// Drop every view and resolution
    fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.scales.clear();
        self.axes.clear();
        self.name_counter = 0;
    }

    /// Insert a child under `parent`, sharing its data parent
    ///
    /// `index` defaults to the end of the child list.
    pub fn insert_child(
        &mut self,
        parent: ViewId,
        spec: &ViewSpec,
        index: Option<usize>,
    ) -> Result<ViewId, ResolutionError> {
        self.insert_child_with_data_parent(parent, Some(parent), spec, index)
    }

    /// Insert a child whose data parent differs from its layout parent
    ///
    /// Only the new subtree is resolved. If resolution fails the subtree is
    /// removed again and the tree is left as it was.
    pub fn insert_child_with_data_parent(
        &mut self,
        layout_parent: ViewId,
        data_parent: Option<ViewId>,
        spec: &ViewSpec,
        index: Option<usize>,
    ) -> Result<ViewId, ResolutionError> {
        let parent = self.node(layout_parent)?;
        if parent.is_unit() {
            return Err(ResolutionError::invalid_view(
                self.view_path(layout_parent),
                "unit views can not have children",
            ));
        }
        if let Some(data_parent) = data_parent {
            self.node(data_parent)?;
        }

        let start = self.nodes.len();
        let id = match self.instantiate(spec, Some(layout_parent), data_parent) {
            Ok(id) => id,
            Err(err) => {
                self.nodes.truncate(start);
                return Err(err);
            }
        };

        let children = &mut self.node_mut(layout_parent)?.children;
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, id);
        info!(
            "Inserted {} under {}",
            self.view_path(id),
            self.view_path(layout_parent)
        );

        if let Err(err) = self.attach(id) {
            if let Err(cleanup) = self.remove_child(id) {
                warn!("Could not roll back {}: {}", id, cleanup);
            }
            return Err(err);
        }
        Ok(id)
    }

    /// Create nodes for a spec subtree without resolving them
    fn instantiate(
        &mut self,
        spec: &ViewSpec,
        layout_parent: Option<ViewId>,
        data_parent: Option<ViewId>,
    ) -> Result<ViewId, ResolutionError> {
        let spec_kind = spec.kind().map_err(|reason| {
            ResolutionError::invalid_view(spec.name.as_deref().unwrap_or("(unnamed)"), reason)
        })?;
        let kind = ViewKind::from_spec(spec_kind, spec.mark.as_deref(), spec.columns);
        let name = match &spec.name {
            Some(name) => name.clone(),
            None => self.next_name(kind.name_prefix()),
        };

        let mut node = ViewNode::new(name, kind);
        node.layout_parent = layout_parent;
        node.data_parent = data_parent;
        node.resolve = spec.resolve.clone();
        node.source = spec.data.as_ref().map(|data| data.values.clone());
        node.encoding = self.inherit_encoding(data_parent, &spec.encoding)?;
        if node.is_unit() {
            for (channel, def) in &node.encoding {
                if let Some(accessor) = Accessor::for_channel_def(*channel, def, self.genome.as_ref())? {
                    node.accessors.insert(*channel, accessor);
                }
            }
        }

        let id = ViewId(self.nodes.len());
        self.nodes.push(Some(node));
        for child in spec.children() {
            let child = self.instantiate(child, Some(id), Some(id))?;
            self.node_mut(id)?.children.push(child);
        }
        Ok(id)
    }

    fn next_name(&mut self, prefix: &str) -> String {
        let name = format!("{}{}", prefix, self.name_counter);
        self.name_counter += 1;
        name
    }

    /// Effective encoding: the data parent's, with each channel the view
    /// defines replaced by its own definition and `null` channels dropped
    fn inherit_encoding(
        &self,
        data_parent: Option<ViewId>,
        own: &EncodingSpec,
    ) -> Result<Encoding, ResolutionError> {
        let mut encoding = match data_parent {
            Some(parent) => self.node(parent)?.encoding.clone(),
            None => Encoding::new(),
        };
        for (channel, def) in own {
            match def {
                Some(def) => encoding.insert(*channel, def.clone()),
                None => encoding.remove(channel),
            };
        }
        Ok(encoding)
    }

    /// Resolve a freshly created subtree, validate it and feed it data
    fn attach(&mut self, id: ViewId) -> Result<(), ResolutionError> {
        let touched = self.resolve_subtree(id)?;
        if self.validate_names {
            self.validate_scale_names()?;
        }
        self.check_axis_orients(id)?;
        for unit in self.units(id) {
            let encoders = self.create_encoders(unit)?;
            let rows = self.inherited_rows(unit);
            let node = self.node_mut(unit)?;
            node.encoders = encoders;
            if let Some(rows) = rows {
                node.collector.complete(rows);
            }
        }
        for scale in touched {
            self.reconfigure_domain(scale)?;
        }
        Ok(())
    }

    // ============================================
    // Removal
    // ============================================

    /// Remove a view and its layout subtree
    ///
    /// Memberships of the removed units are withdrawn, resolutions left
    /// empty are pruned from their owners and the surviving ones recompute
    /// their domains.
    pub fn remove_child(&mut self, id: ViewId) -> Result<(), ResolutionError> {
        let path = self.view_path(id);
        let removed: BTreeSet<ViewId> = self.subtree(id).into_iter().collect();
        if removed.is_empty() {
            return Err(ResolutionError::UnknownView { id: id.0 });
        }

        let mut scales = BTreeSet::new();
        let mut axes = BTreeSet::new();
        for view in &removed {
            let node = self.node_mut(*view)?;
            for membership in std::mem::take(&mut node.memberships) {
                match membership {
                    Membership::Scale(scale) => {
                        scales.insert(scale);
                    }
                    Membership::Axis(axis) => {
                        axes.insert(axis);
                    }
                }
            }
            scales.extend(node.registry.scale.values().copied());
            axes.extend(node.registry.axis.values().copied());
        }

        for scale in &scales {
            if let Some(resolution) = self.scales.get_mut(scale.0).and_then(Option::as_mut) {
                for view in &removed {
                    resolution.remove_members_of(*view);
                }
            }
        }
        for axis in &axes {
            if let Some(resolution) = self.axes.get_mut(axis.0).and_then(Option::as_mut) {
                for view in &removed {
                    resolution.remove_members_of(*view);
                }
            }
        }

        let mut survivors = vec![];
        for scale in scales {
            let Some(resolution) = self.scales.get(scale.0).and_then(Option::as_ref) else {
                continue;
            };
            let owner = resolution.owner();
            if resolution.is_empty() || removed.contains(&owner) {
                let channel = resolution.channel();
                let dangling: Vec<ViewId> = resolution.members().iter().map(|m| m.view).collect();
                self.drop_dangling(Membership::Scale(scale), channel, &dangling);
                if let Some(node) = self.nodes.get_mut(owner.0).and_then(Option::as_mut) {
                    node.registry.scale.retain(|_, id| *id != scale);
                }
                self.scales[scale.0] = None;
            } else {
                survivors.push(scale);
            }
        }
        for axis in axes {
            let Some(resolution) = self.axes.get(axis.0).and_then(Option::as_ref) else {
                continue;
            };
            let owner = resolution.owner();
            if resolution.is_empty() || removed.contains(&owner) {
                let channel = resolution.channel();
                let dangling: Vec<ViewId> = resolution.members().iter().map(|m| m.view).collect();
                self.drop_dangling(Membership::Axis(axis), channel, &dangling);
                if let Some(node) = self.nodes.get_mut(owner.0).and_then(Option::as_mut) {
                    node.registry.axis.retain(|_, id| *id != axis);
                }
                self.axes[axis.0] = None;
            }
        }

        // Views outside the subtree that took their data from inside it
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot else {
                continue;
            };
            if !removed.contains(&ViewId(i))
                && node.data_parent.is_some_and(|parent| removed.contains(&parent))
            {
                warn!("Data parent of '{}' was removed", node.name);
                node.data_parent = None;
            }
        }

        let layout_parent = self.node(id)?.layout_parent;
        if let Some(parent) = layout_parent.and_then(|p| self.nodes.get_mut(p.0)).and_then(Option::as_mut) {
            parent.children.retain(|child| *child != id);
        }
        for view in &removed {
            self.nodes[view.0] = None;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        info!("Removed {} ({} views)", path, removed.len());

        for scale in survivors {
            self.reconfigure_domain(scale)?;
        }
        Ok(())
    }

    /// Withdraw memberships of units that outlive a resolution's owner
    fn drop_dangling(&mut self, membership: Membership, channel: Channel, units: &[ViewId]) {
        for unit in units {
            if let Some(node) = self.nodes.get_mut(unit.0).and_then(Option::as_mut) {
                warn!(
                    "Dropping the {} membership of '{}': its resolution owner was removed",
                    channel, node.name
                );
                node.memberships.retain(|m| *m != membership);
                if let Membership::Scale(scale) = membership {
                    node.encoders.retain(|encoder| encoder.scale != Some(scale));
                }
            }
        }
    }

    // ============================================
    // Data
    // ============================================

    /// Nearest view along the data-parent chain that has a data source
    pub fn data_source(&self, id: ViewId) -> Option<ViewId> {
        let mut current = Some(id);
        while let Some(view) = current {
            let node = self.view(view)?;
            if node.source.is_some() {
                return Some(view);
            }
            current = node.data_parent;
        }
        None
    }

    fn inherited_rows(&self, unit: ViewId) -> Option<Vec<Datum>> {
        let source = self.data_source(unit)?;
        self.view(source)?.source.clone()
    }

    /// Load rows into a view and recompute the domains that depend on them
    ///
    /// Every unit whose nearest data source is `view` receives the rows.
    pub fn load_data(&mut self, view: ViewId, rows: Vec<Datum>) -> Result<(), ResolutionError> {
        self.node_mut(view)?.source = Some(rows.clone());

        let units: Vec<ViewId> = self
            .views()
            .into_iter()
            .filter(|id| self.view(*id).is_some_and(ViewNode::is_unit))
            .filter(|id| self.data_source(*id) == Some(view))
            .collect();

        let mut scales = BTreeSet::new();
        for unit in &units {
            let node = self.node_mut(*unit)?;
            node.collector.complete(rows.clone());
            scales.extend(node.memberships.iter().filter_map(|m| match m {
                Membership::Scale(id) => Some(*id),
                Membership::Axis(_) => None,
            }));
        }
        info!(
            "Loaded {} rows into '{}' ({} units, {} scales)",
            rows.len(),
            self.view_path(view),
            units.len(),
            scales.len()
        );

        for scale in scales {
            self.reconfigure_domain(scale)?;
        }
        Ok(())
    }

    /// Load the inline `data` of every view
    pub fn load_inline_data(&mut self) -> Result<(), ResolutionError> {
        let sources: Vec<(ViewId, Vec<Datum>)> = self
            .views()
            .into_iter()
            .filter_map(|id| Some((id, self.view(id)?.source.clone()?)))
            .collect();
        for (view, rows) in sources {
            self.load_data(view, rows)?;
        }
        Ok(())
    }

    // ============================================
    // Resolution lookup
    // ============================================

    /// Id of the scale resolution `view` sees for `channel`
    pub fn scale_resolution_id(&self, view: ViewId, channel: Channel) -> Option<ScaleResolutionId> {
        let channel = channel.primary();
        let mut current = Some(view);
        while let Some(node) = current.and_then(|id| self.view(id)) {
            if let Some(id) = node.registry.scale.get(&channel) {
                return Some(*id);
            }
            current = node.data_parent;
        }
        None
    }

    pub fn axis_resolution_id(&self, view: ViewId, channel: Channel) -> Option<AxisResolutionId> {
        let channel = channel.primary();
        let mut current = Some(view);
        while let Some(node) = current.and_then(|id| self.view(id)) {
            if let Some(id) = node.registry.axis.get(&channel) {
                return Some(*id);
            }
            current = node.data_parent;
        }
        None
    }

    /// The scale resolution `view` sees for `channel`, searching data ancestors
    pub fn get_scale_resolution(&self, view: ViewId, channel: Channel) -> Option<&ScaleResolution> {
        self.scale_resolution_id(view, channel)
            .and_then(|id| self.scale(id))
    }

    pub fn get_scale_resolution_mut(
        &mut self,
        view: ViewId,
        channel: Channel,
    ) -> Option<&mut ScaleResolution> {
        let id = self.scale_resolution_id(view, channel)?;
        self.scale_mut(id)
    }

    /// The axis resolution `view` sees for `channel`, searching data ancestors
    pub fn get_axis_resolution(&self, view: ViewId, channel: Channel) -> Option<&AxisResolution> {
        self.axis_resolution_id(view, channel)
            .and_then(|id| self.axis(id))
    }

    pub fn scale(&self, id: ScaleResolutionId) -> Option<&ScaleResolution> {
        self.scales.get(id.0).and_then(Option::as_ref)
    }

    pub fn scale_mut(&mut self, id: ScaleResolutionId) -> Option<&mut ScaleResolution> {
        self.scales.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn axis(&self, id: AxisResolutionId) -> Option<&AxisResolution> {
        self.axes.get(id.0).and_then(Option::as_ref)
    }

    /// Live scale resolutions in creation order
    pub fn scale_resolutions(&self) -> impl Iterator<Item = (ScaleResolutionId, &ScaleResolution)> {
        self.scales
            .iter()
            .enumerate()
            .filter_map(|(i, res)| Some((ScaleResolutionId(i), res.as_ref()?)))
    }

    /// Live axis resolutions in creation order
    pub fn axis_resolutions(&self) -> impl Iterator<Item = (AxisResolutionId, &AxisResolution)> {
        self.axes
            .iter()
            .enumerate()
            .filter_map(|(i, res)| Some((AxisResolutionId(i), res.as_ref()?)))
    }

    /// Recompute the domain of one scale resolution from the current data
    pub fn reconfigure_domain(&mut self, id: ScaleResolutionId) -> Result<(), ResolutionError> {
        let Self { nodes, scales, .. } = self;
        match scales.get_mut(id.0).and_then(Option::as_mut) {
            Some(resolution) => resolution.reconfigure_domain(&NodeData(nodes)),
            None => Ok(()),
        }
    }

    pub(crate) fn push_scale(&mut self, resolution: ScaleResolution) -> ScaleResolutionId {
        self.scales.push(Some(resolution));
        ScaleResolutionId(self.scales.len() - 1)
    }

    pub(crate) fn push_axis(&mut self, resolution: AxisResolution) -> AxisResolutionId {
        self.axes.push(Some(resolution));
        AxisResolutionId(self.axes.len() - 1)
    }

    pub(crate) fn genome_rc(&self) -> Option<Rc<Genome>> {
        self.genome.clone()
    }
}

/// Member values read from the units' collectors
struct NodeData<'a>(&'a [Option<ViewNode>]);

impl DomainSource for NodeData<'_> {
    fn visit_values(&self, member: &ResolutionMember, visitor: &mut dyn FnMut(&Value)) {
        let Some(node) = self.0.get(member.view.0).and_then(Option::as_ref) else {
            return;
        };
        let Some(accessor) = node.accessors.get(&member.channel) else {
            return;
        };
        if accessor.is_constant() {
            visitor(&accessor.get(&Datum::new()));
            return;
        }
        node.collector.visit_data(|datum| visitor(&accessor.get(datum)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Domain;
    use crate::spec::DataType;

    fn tree(json: &str) -> ViewTree {
        let spec: ViewSpec = serde_json::from_str(json).unwrap();
        let mut tree = ViewTree::new();
        tree.add_root(&spec).unwrap();
        tree
    }

    fn rows(field: &str, values: &[f64]) -> Vec<Datum> {
        values
            .iter()
            .map(|v| Datum::from([(field.to_string(), Value::Number(*v))]))
            .collect()
    }

    #[test]
    fn test_generated_names_and_paths() {
        let tree = tree(
            r#"{"hconcat": [
                {"mark": "point"},
                {"name": "right", "layer": [{"name": "bars", "mark": "rect"}]}
            ]}"#,
        );
        let bars = tree.find_view("bars").unwrap();
        assert_eq!(tree.view_path(bars), "root/right/bars");
        assert!(tree.find_view("unit1").is_some());
    }

    #[test]
    fn test_encoding_inherits_along_data_parent() {
        let tree = tree(
            r#"{
                "encoding": {
                    "x": {"field": "a", "type": "quantitative", "title": "A"},
                    "y": {"field": "c", "type": "quantitative"}
                },
                "layer": [
                    {"name": "child", "mark": "point", "encoding": {"x": {"field": "b", "type": "quantitative"}}},
                    {"name": "bare", "mark": "point", "encoding": {"y": null}}
                ]
            }"#,
        );
        let child = tree.view(tree.find_view("child").unwrap()).unwrap();
        let x = &child.encoding()[&Channel::X];
        assert_eq!(x.field.as_deref(), Some("b"));
        assert_eq!(x.title, None);
        assert_eq!(x.data_type, Some(DataType::Quantitative));
        assert_eq!(child.encoding()[&Channel::Y].field.as_deref(), Some("c"));

        let bare = tree.view(tree.find_view("bare").unwrap()).unwrap();
        assert_eq!(bare.encoding()[&Channel::X].field.as_deref(), Some("a"));
        assert!(!bare.encoding().contains_key(&Channel::Y));
    }

    #[test]
    fn test_invalid_spec_is_rejected() {
        let spec: ViewSpec = serde_json::from_str(r#"{"layer": [{"name": "empty"}]}"#).unwrap();
        let err = ViewTree::new().add_root(&spec).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidView { .. }));
    }

    #[test]
    fn test_failed_root_can_be_retried() {
        let mut tree = ViewTree::new();
        let bad: ViewSpec = serde_json::from_str(
            r#"{"layer": [
                {"mark": "point", "encoding": {"y": {"field": "a", "type": "quantitative"}}},
                {"mark": "point", "encoding": {"y": {"field": "b", "type": "nominal"}}}
            ]}"#,
        )
        .unwrap();
        let err = tree.add_root(&bad).unwrap_err();
        assert!(matches!(err, ResolutionError::IncompatibleTypes { .. }));
        assert!(tree.root().is_none());
        assert!(tree.views().is_empty());
        assert_eq!(tree.scale_resolutions().count(), 0);
        assert_eq!(tree.axis_resolutions().count(), 0);

        let good: ViewSpec = serde_json::from_str(
            r#"{"layer": [{"mark": "point", "encoding": {"y": {"field": "a", "type": "quantitative"}}}]}"#,
        )
        .unwrap();
        let root = tree.add_root(&good).unwrap();
        assert_eq!(tree.view_path(tree.view(root).unwrap().children()[0]), "root/unit1");
        assert_eq!(tree.scale_resolutions().count(), 1);
    }

    #[test]
    fn test_load_data_reaches_units_below_source() {
        let mut tree = tree(
            r#"{
                "name": "top",
                "layer": [
                    {"name": "a", "mark": "point", "encoding": {"y": {"field": "v", "type": "quantitative"}}},
                    {"name": "b", "mark": "point", "encoding": {"y": {"field": "v", "type": "quantitative"}}}
                ]
            }"#,
        );
        let top = tree.find_view("top").unwrap();
        tree.load_data(top, rows("v", &[2.0, 5.0])).unwrap();

        let a = tree.find_view("a").unwrap();
        assert_eq!(tree.view(a).unwrap().collector().len(), 2);
        let y = tree.get_scale_resolution(a, Channel::Y).unwrap();
        assert_eq!(y.get_scale().domain(), Some(&Domain::continuous(0.0, 5.0)));
    }

    #[test]
    fn test_nearest_source_wins() {
        let mut tree = tree(
            r#"{
                "name": "top",
                "data": {"values": [{"v": 1}]},
                "layer": [
                    {"name": "a", "mark": "point"},
                    {"name": "b", "mark": "point", "data": {"values": [{"v": 2}, {"v": 3}]}}
                ]
            }"#,
        );
        tree.load_inline_data().unwrap();
        let a = tree.find_view("a").unwrap();
        let b = tree.find_view("b").unwrap();
        assert_eq!(tree.view(a).unwrap().collector().len(), 1);
        assert_eq!(tree.view(b).unwrap().collector().len(), 2);
        assert_eq!(tree.data_source(a), tree.find_view("top"));
    }

    #[test]
    fn test_unit_can_not_take_children() {
        let mut tree = tree(r#"{"name": "only", "mark": "point"}"#);
        let root = tree.root().unwrap();
        let err = tree
            .insert_child(root, &ViewSpec::unit("point"), None)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidView { .. }));
    }

    #[test]
    fn test_second_root_is_rejected() {
        let mut tree = tree(r#"{"mark": "point"}"#);
        assert!(tree.add_root(&ViewSpec::unit("rect")).is_err());
    }
}
