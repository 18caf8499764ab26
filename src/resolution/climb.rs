//! Resolution climbing
//!
//! For each resolvable channel of a unit view, walk up the data-parent
//! chain while the behaviors allow it. The view where the walk stops owns
//! the resolution and the unit registers itself there as a member.

use log::debug;

use crate::channel::Channel;
use crate::view::{ViewId, ViewTree};

use super::scale::member_data_type;
use super::{
    default_resolution, AxisResolution, AxisResolutionId, Membership, Resolution,
    ResolutionBehavior, ResolutionError, ResolutionMember, ResolutionTarget, ScaleResolution,
    ScaleResolutionId,
};

impl ViewTree {
    /// Configured behavior of a view, else the default of its kind
    pub fn effective_behavior(
        &self,
        view: ViewId,
        channel: Channel,
        target: ResolutionTarget,
    ) -> Result<ResolutionBehavior, ResolutionError> {
        let node = self.node(view)?;
        Ok(node
            .resolve
            .get(channel, target)
            .unwrap_or_else(|| default_resolution(&node.kind, channel, target)))
    }

    /// The view that owns the resolution of `channel` for `leaf`
    pub fn resolution_owner(
        &self,
        leaf: ViewId,
        channel: Channel,
        target: ResolutionTarget,
    ) -> Result<ViewId, ResolutionError> {
        let mut view = leaf;
        loop {
            let own = self.effective_behavior(view, channel, target)?;
            if own == ResolutionBehavior::Excluded {
                break;
            }
            let Some(parent) = self.node(view)?.data_parent else {
                // Forced without a parent has nowhere to go
                break;
            };
            let climbs = own == ResolutionBehavior::Forced
                || self
                    .effective_behavior(parent, channel, target)?
                    .accepts_children();
            if !climbs {
                break;
            }
            view = parent;
        }
        debug!(
            "{} {} of {} resolves on '{}'",
            channel,
            target,
            leaf,
            self.view_path(view)
        );
        Ok(view)
    }

    /// Register every unit below `root`, returning the touched scales
    pub(crate) fn resolve_subtree(
        &mut self,
        root: ViewId,
    ) -> Result<Vec<ScaleResolutionId>, ResolutionError> {
        let mut touched = vec![];
        for unit in self.units(root) {
            for scale in self.resolve_unit(unit)? {
                if !touched.contains(&scale) {
                    touched.push(scale);
                }
            }
        }
        Ok(touched)
    }

    fn resolve_unit(&mut self, unit: ViewId) -> Result<Vec<ScaleResolutionId>, ResolutionError> {
        let node = self.node(unit)?;
        let encoding = node.encoding.clone();
        let name = node.name.clone();

        let mut touched = vec![];
        for (channel, def) in encoding {
            if !def.is_resolvable() {
                continue;
            }
            let target_channel = def.resolution_channel.unwrap_or(channel).primary();
            if !target_channel.has_scale() {
                continue;
            }
            if !channel.is_secondary() && member_data_type(&def).is_none() {
                return Err(ResolutionError::MissingType {
                    view: name,
                    channel,
                });
            }

            let owner = self.resolution_owner(unit, target_channel, ResolutionTarget::Scale)?;
            let member = ResolutionMember::new(unit, channel, def.clone());
            touched.push(self.register_scale(owner, target_channel, member)?);

            if target_channel.is_primary_positional() {
                let owner = self.resolution_owner(unit, target_channel, ResolutionTarget::Axis)?;
                self.register_axis(owner, target_channel, ResolutionMember::new(unit, channel, def))?;
            }
        }
        Ok(touched)
    }

    fn register_scale(
        &mut self,
        owner: ViewId,
        channel: Channel,
        member: ResolutionMember,
    ) -> Result<ScaleResolutionId, ResolutionError> {
        let unit = member.view;
        let existing = self.node(owner)?.registry.scale.get(&channel).copied();
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.push_scale(ScaleResolution::new(channel, owner, self.genome_rc()));
                self.node_mut(owner)?.registry.scale.insert(channel, id);
                debug!("New {} scale resolution on '{}'", channel, self.view_path(owner));
                id
            }
        };

        if let Some(resolution) = self.scale_mut(id) {
            if let Err(err) = resolution.add_member(member) {
                if existing.is_none() {
                    self.node_mut(owner)?.registry.scale.remove(&channel);
                    self.scales[id.0] = None;
                }
                return Err(err);
            }
        }

        let memberships = &mut self.node_mut(unit)?.memberships;
        if !memberships.contains(&Membership::Scale(id)) {
            memberships.push(Membership::Scale(id));
        }
        Ok(id)
    }

    fn register_axis(
        &mut self,
        owner: ViewId,
        channel: Channel,
        member: ResolutionMember,
    ) -> Result<AxisResolutionId, ResolutionError> {
        let unit = member.view;
        let id = match self.node(owner)?.registry.axis.get(&channel).copied() {
            Some(id) => id,
            None => {
                let id = self.push_axis(AxisResolution::new(channel, owner));
                self.node_mut(owner)?.registry.axis.insert(channel, id);
                id
            }
        };
        if let Some(resolution) = self.axes.get_mut(id.0).and_then(Option::as_mut) {
            resolution.add_member(member)?;
        }

        let memberships = &mut self.node_mut(unit)?.memberships;
        if !memberships.contains(&Membership::Axis(id)) {
            memberships.push(Membership::Axis(id));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::ViewSpec;

    use super::*;

    fn build(json: &str) -> ViewTree {
        let spec: ViewSpec = serde_json::from_str(json).unwrap();
        let mut tree = ViewTree::new();
        tree.add_root(&spec).unwrap();
        tree
    }

    fn owner(tree: &ViewTree, view: &str, channel: Channel, target: ResolutionTarget) -> String {
        let id = tree.find_view(view).unwrap();
        tree.view_path(tree.resolution_owner(id, channel, target).unwrap())
    }

    const Y: &str = r#"{"y": {"field": "v", "type": "quantitative"}}"#;

    #[test]
    fn test_independent_chain_stays_local() {
        let tree = build(&format!(
            r#"{{"grid": [{{"name": "a", "mark": "point", "encoding": {Y}}}]}}"#
        ));
        assert_eq!(owner(&tree, "a", Channel::Y, ResolutionTarget::Scale), "root/a");
    }

    #[test]
    fn test_excluded_collects_locally() {
        let tree = build(&format!(
            r#"{{
                "layer": [
                    {{"name": "inner", "resolve": {{"scale": {{"y": "excluded"}}}},
                      "layer": [{{"name": "a", "mark": "point", "encoding": {Y}}}]}},
                    {{"name": "b", "mark": "point", "encoding": {Y}}}
                ]
            }}"#
        ));
        assert_eq!(owner(&tree, "a", Channel::Y, ResolutionTarget::Scale), "root/inner");
        assert_eq!(owner(&tree, "b", Channel::Y, ResolutionTarget::Scale), "root");
        // Axes follow their own configuration
        assert_eq!(owner(&tree, "a", Channel::Y, ResolutionTarget::Axis), "root");
    }

    #[test]
    fn test_forced_climbs_past_independent_parent() {
        let tree = build(&format!(
            r#"{{
                "grid": [
                    {{"name": "a", "mark": "point", "encoding": {Y},
                      "resolve": {{"scale": {{"y": "forced"}}}}}},
                    {{"name": "b", "mark": "point", "encoding": {Y}}}
                ]
            }}"#
        ));
        assert_eq!(owner(&tree, "a", Channel::Y, ResolutionTarget::Scale), "root");
        assert_eq!(owner(&tree, "b", Channel::Y, ResolutionTarget::Scale), "root/b");
    }

    #[test]
    fn test_forced_root_stops() {
        let tree = build(&format!(
            r#"{{"name": "solo", "mark": "point", "encoding": {Y},
                 "resolve": {{"scale": {{"default": "forced"}}}}}}"#
        ));
        assert_eq!(owner(&tree, "solo", Channel::Y, ResolutionTarget::Scale), "solo");
    }

    #[test]
    fn test_resolution_channel_alias() {
        let tree = build(
            r#"{
                "layer": [
                    {"name": "a", "mark": "point",
                     "encoding": {"y": {"field": "v", "type": "quantitative"}}},
                    {"name": "b", "mark": "point",
                     "encoding": {"x": {"field": "w", "type": "quantitative", "resolutionChannel": "y"}}}
                ]
            }"#,
        );
        let a = tree.find_view("a").unwrap();
        let b = tree.find_view("b").unwrap();
        let y = tree.scale_resolution_id(a, Channel::Y).unwrap();
        let members = tree.scale(y).unwrap().members();
        assert_eq!(members.len(), 2);
        assert_eq!((members[1].view, members[1].channel), (b, Channel::X));
    }

    #[test]
    fn test_value_and_text_channels_do_not_resolve() {
        let tree = build(
            r#"{"name": "u", "mark": "text", "encoding": {
                "size": {"value": 3},
                "text": {"field": "label", "type": "nominal"}
            }}"#,
        );
        assert_eq!(tree.scale_resolutions().count(), 0);
        assert_eq!(tree.axis_resolutions().count(), 0);
    }

    #[test]
    fn test_missing_type() {
        let spec: ViewSpec = serde_json::from_str(
            r#"{"name": "u", "mark": "point", "encoding": {"color": {"field": "c"}}}"#,
        )
        .unwrap();
        let err = ViewTree::new().add_root(&spec).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingType {
                view: "u".into(),
                channel: Channel::Color
            }
        );
    }

    #[test]
    fn test_axis_only_for_primary_positional() {
        let tree = build(
            r#"{"name": "u", "mark": "rect", "encoding": {
                "x": {"field": "a", "type": "quantitative"},
                "x2": {"field": "b"},
                "color": {"field": "c", "type": "nominal"}
            }}"#,
        );
        assert_eq!(tree.axis_resolutions().count(), 1);
        assert_eq!(tree.scale_resolutions().count(), 2);
        let u = tree.find_view("u").unwrap();
        let x = tree.get_scale_resolution(u, Channel::X2).unwrap();
        assert_eq!(x.members().len(), 2);
    }
}
