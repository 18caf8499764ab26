//! Encoders bind a unit view's accessors to its resolved scales

use crate::channel::Channel;
use crate::data::{Accessor, Datum, Value};
use crate::resolution::{ResolutionError, ScaleResolutionId};
use crate::view::{ViewId, ViewTree};

/// Where an encoder takes its values from
#[derive(Debug, Clone)]
pub enum EncoderSource {
    /// Data-driven (or constant-folded) accessor
    Accessor(Accessor),
    /// A literal `value`, passed through without a scale
    Value(Value),
}

/// Maps a data row to a channel value
#[derive(Debug, Clone)]
pub struct Encoder {
    pub channel: Channel,
    pub source: EncoderSource,
    pub scale: Option<ScaleResolutionId>,
}

impl Encoder {
    /// Raw value of the row before scaling
    pub fn value(&self, datum: &Datum) -> Value {
        match &self.source {
            EncoderSource::Accessor(accessor) => accessor.get(datum),
            EncoderSource::Value(value) => value.clone(),
        }
    }

    /// Value normalized through the scale, or the raw value when the
    /// channel is unscaled or the scale can not map it
    pub fn encode(&self, tree: &ViewTree, datum: &Datum) -> Value {
        let value = self.value(datum);
        let normalized = self
            .scale
            .and_then(|id| tree.scale(id))
            .and_then(|resolution| resolution.get_scale().normalize(&value));
        match normalized {
            Some(n) => Value::Number(n),
            None => value,
        }
    }
}

impl ViewTree {
    /// Create the encoders of a unit view
    ///
    /// Fails with `MissingScale` when a data-driven channel that needs a
    /// scale has none resolved.
    pub fn create_encoders(&self, unit: ViewId) -> Result<Vec<Encoder>, ResolutionError> {
        let node = self.node(unit)?;
        let mut encoders = vec![];
        for (channel, def) in node.encoding() {
            if let Some(value) = &def.value {
                if !def.is_resolvable() {
                    encoders.push(Encoder {
                        channel: *channel,
                        source: EncoderSource::Value(value.clone()),
                        scale: None,
                    });
                    continue;
                }
            }
            let Some(accessor) = node.accessor(*channel) else {
                continue;
            };
            let target = def.resolution_channel.unwrap_or(*channel);
            let scale = if target.has_scale() {
                let id = self
                    .scale_resolution_id(unit, target)
                    .ok_or_else(|| ResolutionError::missing_scale(node.name(), *channel))?;
                Some(id)
            } else {
                None
            };
            encoders.push(Encoder {
                channel: *channel,
                source: EncoderSource::Accessor(accessor.clone()),
                scale,
            });
        }
        Ok(encoders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ViewSpec;

    fn tree(json: &str) -> ViewTree {
        let spec: ViewSpec = serde_json::from_str(json).unwrap();
        let mut tree = ViewTree::new();
        tree.add_root(&spec).unwrap();
        tree.load_inline_data().unwrap();
        tree
    }

    #[test]
    fn test_encoders_normalize_through_scale() {
        let tree = tree(
            r#"{
                "name": "u", "mark": "point",
                "data": {"values": [{"v": 1}, {"v": 4}]},
                "encoding": {
                    "y": {"field": "v", "type": "quantitative"},
                    "size": {"value": 5},
                    "text": {"field": "v", "type": "quantitative"}
                }
            }"#,
        );
        let u = tree.root().unwrap();
        let encoders = tree.create_encoders(u).unwrap();
        assert_eq!(encoders.len(), 3);

        let datum = Datum::from([("v".to_string(), Value::Number(2.0))]);
        let y = encoders.iter().find(|e| e.channel == Channel::Y).unwrap();
        assert_eq!(y.encode(&tree, &datum), Value::Number(0.5));

        let size = encoders.iter().find(|e| e.channel == Channel::Size).unwrap();
        assert_eq!(size.encode(&tree, &datum), Value::Number(5.0));
        assert!(size.scale.is_none());

        let text = encoders.iter().find(|e| e.channel == Channel::Text).unwrap();
        assert!(text.scale.is_none());
        assert_eq!(text.encode(&tree, &datum), Value::Number(2.0));
    }

    #[test]
    fn test_attached_units_keep_their_encoders() {
        let tree = tree(
            r#"{
                "layer": [
                    {"name": "u", "mark": "point", "encoding": {
                        "x": {"field": "a", "type": "quantitative"},
                        "color": {"value": "red"}}}
                ]
            }"#,
        );
        let u = tree.find_view("u").unwrap();
        let stored = tree.view(u).unwrap().encoders();
        assert_eq!(stored.len(), 2);
        let x = stored.iter().find(|e| e.channel == Channel::X).unwrap();
        assert_eq!(x.scale, tree.scale_resolution_id(u, Channel::X));
        assert!(tree.view(tree.root().unwrap()).unwrap().encoders().is_empty());
    }
}
