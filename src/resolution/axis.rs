//! Axis resolutions
//!
//! An axis resolution persists nothing but its members. Properties and the
//! combined title are derived from the members on demand and memoized until
//! the membership changes.

use std::cell::OnceCell;
use std::fmt;

use log::debug;
use serde::Deserialize;

use crate::channel::Channel;
use crate::data::Value;
use crate::spec::AxisSpec;
use crate::view::ViewId;

use super::{Resolution, ResolutionError, ResolutionMember};

/// Side of the plot an axis is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    Top,
    Bottom,
    Left,
    Right,
}

impl AxisOrient {
    /// Orientation slots of a channel in order of preference
    pub fn slots(channel: Channel) -> &'static [AxisOrient] {
        match channel {
            Channel::X => &[AxisOrient::Bottom, AxisOrient::Top],
            Channel::Y => &[AxisOrient::Left, AxisOrient::Right],
            _ => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AxisOrient::Top => "top",
            AxisOrient::Bottom => "bottom",
            AxisOrient::Left => "left",
            AxisOrient::Right => "right",
        }
    }
}

impl fmt::Display for AxisOrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis properties merged over all members
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisProps {
    pub title: Option<String>,
    pub orient: Option<AxisOrient>,
    pub grid: Option<bool>,
    pub labels: Option<bool>,
    pub ticks: Option<bool>,
    pub tick_count: Option<u32>,
    pub format: Option<String>,
    pub label_angle: Option<f64>,
}

impl AxisProps {
    /// Override with every property `spec` defines
    fn apply(&mut self, spec: &AxisSpec) {
        self.orient = spec.orient.or(self.orient);
        self.grid = spec.grid.or(self.grid);
        self.labels = spec.labels.or(self.labels);
        self.ticks = spec.ticks.or(self.ticks);
        self.tick_count = spec.tick_count.or(self.tick_count);
        self.format = spec.format.clone().or(self.format.take());
        self.label_angle = spec.label_angle.or(self.label_angle);
    }
}

/// Shared axis of one positional channel
#[derive(Debug)]
pub struct AxisResolution {
    channel: Channel,
    owner: ViewId,
    members: Vec<ResolutionMember>,
    props: OnceCell<Option<AxisProps>>,
    title: OnceCell<Option<String>>,
}

impl AxisResolution {
    pub(crate) fn new(channel: Channel, owner: ViewId) -> Self {
        Self {
            channel,
            owner,
            members: vec![],
            props: OnceCell::new(),
            title: OnceCell::new(),
        }
    }

    pub fn owner(&self) -> ViewId {
        self.owner
    }

    /// Merged properties, `None` when any member suppresses the axis
    pub fn get_axis_props(&self) -> Option<&AxisProps> {
        self.props.get_or_init(|| self.merge_props()).as_ref()
    }

    fn merge_props(&self) -> Option<AxisProps> {
        if self.members.iter().any(|m| m.def.is_axis_suppressed()) {
            return None;
        }
        let mut props = AxisProps::default();
        for spec in self.members.iter().filter_map(|m| m.def.axis_spec()) {
            props.apply(spec);
        }
        props.title = self.get_title().map(String::from);
        Some(props)
    }

    /// Combined title of all members, `None` meaning "draw no title"
    pub fn get_title(&self) -> Option<&str> {
        self.title.get_or_init(|| self.merge_title()).as_deref()
    }

    fn merge_title(&self) -> Option<String> {
        struct Candidate<'a> {
            member: &'a ResolutionMember,
            /// `Some(Value::Null)` is an explicit suppression
            explicit: Option<&'a Value>,
            implicit: Option<&'a str>,
        }

        let candidates: Vec<Candidate> = self
            .members
            .iter()
            .map(|member| Candidate {
                member,
                explicit: member
                    .def
                    .axis_spec()
                    .and_then(|axis| axis.title.as_ref())
                    .or(member.def.title.as_ref()),
                implicit: member.def.field.as_deref().or(member.def.expr.as_deref()),
            })
            .collect();

        let primary_has_explicit = |view: ViewId, channel: Channel| {
            candidates
                .iter()
                .any(|c| c.member.view == view && c.member.channel == channel && c.explicit.is_some())
        };

        let mut titles: Vec<&str> = vec![];
        for candidate in &candidates {
            let channel = candidate.member.channel;
            if channel.is_secondary()
                && candidate.explicit.is_none()
                && primary_has_explicit(candidate.member.view, channel.primary())
            {
                continue;
            }
            let title = match candidate.explicit {
                Some(value) => value.as_str(),
                None => candidate.implicit,
            };
            if let Some(title) = title {
                if !titles.contains(&title) {
                    titles.push(title);
                }
            }
        }

        (!titles.is_empty()).then(|| titles.join(", "))
    }
}

impl Resolution for AxisResolution {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn members(&self) -> &[ResolutionMember] {
        &self.members
    }

    fn add_member(&mut self, member: ResolutionMember) -> Result<(), ResolutionError> {
        debug!(
            "{} joins the {} axis owned by {}",
            member.view, self.channel, self.owner
        );
        self.members.push(member);
        self.props.take();
        self.title.take();
        Ok(())
    }

    fn remove_members_of(&mut self, view: ViewId) -> usize {
        let before = self.members.len();
        self.members.retain(|m| m.view != view);
        self.props.take();
        self.title.take();
        before - self.members.len()
    }
}

/// Assign an orientation to each requested axis of one view
///
/// Explicit orients claim their slot first; the rest take the first free
/// slot of their channel.
pub fn assign_orients(
    view: &str,
    requests: &[(Channel, Option<AxisOrient>)],
) -> Result<Vec<AxisOrient>, ResolutionError> {
    let mut taken: Vec<AxisOrient> = requests.iter().filter_map(|(_, orient)| *orient).collect();
    let mut assigned = Vec::with_capacity(requests.len());
    for (channel, orient) in requests {
        let orient = match orient {
            Some(orient) => *orient,
            None => {
                let free = AxisOrient::slots(*channel)
                    .iter()
                    .find(|slot| !taken.contains(*slot))
                    .copied();
                let Some(slot) = free else {
                    return Err(ResolutionError::AmbiguousAxisOrient {
                        view: view.to_string(),
                        channel: *channel,
                        taken: taken
                            .iter()
                            .map(|o| o.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                };
                taken.push(slot);
                slot
            }
        };
        assigned.push(orient);
    }
    Ok(assigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ChannelDef, DataType};

    fn axis(members: Vec<(usize, Channel, ChannelDef)>) -> AxisResolution {
        let mut resolution = AxisResolution::new(Channel::Y, ViewId(0));
        for (view, channel, def) in members {
            resolution
                .add_member(ResolutionMember::new(ViewId(view), channel, def))
                .unwrap();
        }
        resolution
    }

    fn field(name: &str) -> ChannelDef {
        ChannelDef::field(name, DataType::Quantitative)
    }

    fn titled(name: &str, title: Value) -> ChannelDef {
        ChannelDef {
            title: Some(title),
            ..field(name)
        }
    }

    #[test]
    fn test_title_merge() {
        let res = axis(vec![(1, Channel::Y, field("a")), (2, Channel::Y, field("b"))]);
        assert_eq!(res.get_title(), Some("a, b"));
    }

    #[test]
    fn test_title_values_are_unique() {
        let res = axis(vec![
            (1, Channel::Y, field("a")),
            (2, Channel::Y, field("b")),
            (3, Channel::Y, field("a")),
        ]);
        assert_eq!(res.get_title(), Some("a, b"));
    }

    #[test]
    fn test_null_title_suppresses_secondary_field() {
        let res = axis(vec![
            (1, Channel::Y, titled("start", Value::Null)),
            (1, Channel::Y2, field("end")),
        ]);
        assert_eq!(res.get_title(), None);
    }

    #[test]
    fn test_secondary_field_kept_without_explicit_primary() {
        let res = axis(vec![
            (1, Channel::Y, field("start")),
            (1, Channel::Y2, field("end")),
        ]);
        assert_eq!(res.get_title(), Some("start, end"));
    }

    #[test]
    fn test_secondary_of_other_view_is_kept() {
        let res = axis(vec![
            (1, Channel::Y, titled("start", "Range".into())),
            (2, Channel::Y2, field("end")),
        ]);
        assert_eq!(res.get_title(), Some("Range, end"));
    }

    #[test]
    fn test_axis_title_precedes_channel_title() {
        let def = ChannelDef {
            axis: Some(Some(AxisSpec {
                title: Some("From axis".into()),
                ..Default::default()
            })),
            ..titled("a", "From channel".into())
        };
        let res = axis(vec![(1, Channel::Y, def)]);
        assert_eq!(res.get_title(), Some("From axis"));
    }

    #[test]
    fn test_non_string_title_is_dropped() {
        let res = axis(vec![
            (1, Channel::Y, titled("a", Value::Number(3.0))),
            (2, Channel::Y, field("b")),
        ]);
        assert_eq!(res.get_title(), Some("b"));
    }

    #[test]
    fn test_axis_null_suppresses_props() {
        let suppressed = ChannelDef {
            axis: Some(None),
            ..field("b")
        };
        let res = axis(vec![(1, Channel::Y, field("a")), (2, Channel::Y, suppressed)]);
        assert_eq!(res.get_axis_props(), None);
    }

    #[test]
    fn test_later_axis_props_override() {
        let with_axis = |grid: Option<bool>, format: Option<&str>| ChannelDef {
            axis: Some(Some(AxisSpec {
                grid,
                format: format.map(String::from),
                ..Default::default()
            })),
            ..field("a")
        };
        let res = axis(vec![
            (1, Channel::Y, with_axis(Some(true), Some(".2f"))),
            (2, Channel::Y, with_axis(Some(false), None)),
        ]);
        let props = res.get_axis_props().unwrap();
        assert_eq!(props.grid, Some(false));
        assert_eq!(props.format.as_deref(), Some(".2f"));
        assert_eq!(props.title.as_deref(), Some("a"));
    }

    #[test]
    fn test_title_cache_invalidated_on_change() {
        let mut res = axis(vec![(1, Channel::Y, field("a"))]);
        assert_eq!(res.get_title(), Some("a"));
        res.add_member(ResolutionMember::new(ViewId(2), Channel::Y, field("b")))
            .unwrap();
        assert_eq!(res.get_title(), Some("a, b"));
        res.remove_members_of(ViewId(1));
        assert_eq!(res.get_title(), Some("b"));
    }

    #[test]
    fn test_assign_orients() {
        let orients = assign_orients(
            "layer",
            &[(Channel::X, None), (Channel::X, None), (Channel::Y, Some(AxisOrient::Right))],
        )
        .unwrap();
        assert_eq!(orients, vec![AxisOrient::Bottom, AxisOrient::Top, AxisOrient::Right]);

        let err = assign_orients("layer", &[(Channel::Y, None), (Channel::Y, None), (Channel::Y, None)])
            .unwrap_err();
        assert!(matches!(err, ResolutionError::AmbiguousAxisOrient { .. }));
    }

    #[test]
    fn test_explicit_orient_claims_slot() {
        let orients = assign_orients(
            "layer",
            &[(Channel::Y, None), (Channel::Y, Some(AxisOrient::Left))],
        )
        .unwrap();
        assert_eq!(orients, vec![AxisOrient::Right, AxisOrient::Left]);
    }
}
