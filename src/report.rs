//! Plain-text description of a resolved view tree

use std::collections::HashMap;

use crate::resolution::{AxisOrient, Resolution, ResolutionMember};
use crate::view::ViewTree;

/// Describe every resolution of the tree, grouped by owner in layout order
///
/// The output is deterministic: owners appear in preorder, and within one
/// owner scales precede axes, each sorted by channel.
pub fn describe(tree: &ViewTree) -> String {
    let mut orients: HashMap<_, AxisOrient> = HashMap::new();
    for view in tree.views() {
        if let Ok(assigned) = tree.axis_orients(view) {
            orients.extend(assigned);
        }
    }

    let mut out = String::new();
    for view in tree.views() {
        let Some(node) = tree.view(view) else {
            continue;
        };
        let owner = tree.view_path(view);

        let mut scales: Vec<_> = node.registry().scale.iter().collect();
        scales.sort();
        for (channel, id) in scales {
            let Some(scale) = tree.scale(*id) else {
                continue;
            };
            let name = scale
                .name()
                .map(|n| format!(" \"{}\"", n))
                .unwrap_or_default();
            out.push_str(&format!(
                "scale {}{} ({}) owned by {}\n",
                channel,
                name,
                scale.props().scale_type,
                owner
            ));
            out.push_str(&format!("  members: {}\n", members(tree, scale.members())));
            let domain = match (scale.get_scale().domain(), scale.is_zoomed()) {
                (None, _) => "(empty)".to_string(),
                (Some(domain), true) => match scale.get_domain() {
                    Some(full) => format!("{} (zoomed from {})", domain, full),
                    None => format!("{} (zoomed)", domain),
                },
                (Some(domain), false) => domain.to_string(),
            };
            out.push_str(&format!("  domain: {}\n", domain));
        }

        let mut axes: Vec<_> = node.registry().axis.iter().collect();
        axes.sort();
        for (channel, id) in axes {
            let Some(axis) = tree.axis(*id) else {
                continue;
            };
            let orient = match (axis.get_axis_props(), orients.get(id)) {
                (None, _) => "hidden".to_string(),
                (Some(_), Some(orient)) => orient.to_string(),
                (Some(_), None) => "?".to_string(),
            };
            out.push_str(&format!("axis {} ({}) owned by {}\n", channel, orient, owner));
            out.push_str(&format!("  members: {}\n", members(tree, axis.members())));
            out.push_str(&format!("  title: {}\n", axis.get_title().unwrap_or("(none)")));
        }
    }
    out
}

fn members(tree: &ViewTree, members: &[ResolutionMember]) -> String {
    members
        .iter()
        .map(|m| format!("{}:{}", tree.view_path(m.view), m.channel))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ViewSpec;

    #[test]
    fn test_describe_unit() {
        let spec: ViewSpec = serde_json::from_str(
            r#"{
                "name": "u", "mark": "point",
                "encoding": {"x": {"field": "a", "type": "quantitative", "axis": null}}
            }"#,
        )
        .unwrap();
        let mut tree = ViewTree::new();
        tree.add_root(&spec).unwrap();
        assert_eq!(
            describe(&tree),
            "scale x (linear) owned by u\n  members: u:x\n  domain: (empty)\n\
             axis x (hidden) owned by u\n  members: u:x\n  title: a\n"
        );
    }
}
