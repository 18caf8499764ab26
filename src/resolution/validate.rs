//! Whole-tree checks that run after resolution

use std::collections::HashMap;

use crate::view::{ContainerKind, ViewId, ViewKind, ViewTree};

use super::axis::assign_orients;
use super::{AxisOrient, AxisResolutionId, Resolution, ResolutionError, ScaleResolutionId};

impl ViewTree {
    /// Fail if one scale name is claimed by two distinct resolutions
    pub fn validate_scale_names(&self) -> Result<(), ResolutionError> {
        let mut claimed: HashMap<&str, ScaleResolutionId> = HashMap::new();
        for (id, resolution) in self.scale_resolutions() {
            let Some(name) = resolution.name() else {
                continue;
            };
            match claimed.get(name) {
                Some(first) if *first != id => {
                    let first_owner = self.scale(*first).map(|r| r.owner());
                    return Err(ResolutionError::duplicate_name(
                        name,
                        first_owner.map(|o| self.view_path(o)).unwrap_or_default(),
                        self.view_path(resolution.owner()),
                    ));
                }
                Some(_) => {}
                None => {
                    claimed.insert(name, id);
                }
            }
        }
        Ok(())
    }

    /// Top of the layer stack `view` belongs to; axes of a layer stack
    /// share the orientation slots
    fn orient_group(&self, view: ViewId) -> ViewId {
        let mut current = view;
        while let Some(parent) = self.view(current).and_then(|v| v.layout_parent) {
            match self.view(parent).map(|p| &p.kind) {
                Some(ViewKind::Container(ContainerKind::Layer)) => current = parent,
                _ => break,
            }
        }
        current
    }

    /// Visible axes owned by a view and its layer descendants
    fn group_axes(&self, view: ViewId, axes: &mut Vec<AxisResolutionId>) {
        let Some(node) = self.view(view) else {
            return;
        };
        let mut owned: Vec<_> = node.registry.axis.iter().map(|(c, id)| (*c, *id)).collect();
        owned.sort();
        axes.extend(
            owned
                .into_iter()
                .map(|(_, id)| id)
                .filter(|id| self.axis(*id).is_some_and(|a| a.get_axis_props().is_some())),
        );
        if matches!(node.kind, ViewKind::Container(ContainerKind::Layer)) {
            for child in &node.children {
                self.group_axes(*child, axes);
            }
        }
    }

    /// Orientation of every visible axis of one layer stack
    pub fn axis_orients(
        &self,
        view: ViewId,
    ) -> Result<Vec<(AxisResolutionId, AxisOrient)>, ResolutionError> {
        let group = self.orient_group(view);
        let mut axes = vec![];
        self.group_axes(group, &mut axes);

        let requests: Vec<_> = axes
            .iter()
            .filter_map(|id| {
                let axis = self.axis(*id)?;
                Some((axis.channel(), axis.get_axis_props()?.orient))
            })
            .collect();
        let orients = assign_orients(&self.view_path(group), &requests)?;
        Ok(axes.into_iter().zip(orients).collect())
    }

    /// Check orientation slots of every layer stack touching the subtree
    pub(crate) fn check_axis_orients(&self, root: ViewId) -> Result<(), ResolutionError> {
        let mut groups: Vec<ViewId> = self.subtree(root).into_iter().map(|v| self.orient_group(v)).collect();
        groups.sort();
        groups.dedup();
        for group in groups {
            self.axis_orients(group)?;
        }
        Ok(())
    }
}
