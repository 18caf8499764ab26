//! Realized data rows and the accessors that read them
//!
//! The data pipeline itself lives outside this crate. What arrives here is
//! a completed collection of rows per unit view ([`Collector`]) and, per
//! encoded channel, an [`Accessor`] that pulls a single value out of a row.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::expr::{self, Expr};
use crate::genome::Genome;
use crate::resolution::ResolutionError;
use crate::spec::ChannelDef;

/// A scalar data value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// A single data row
pub type Datum = HashMap<String, Value>;

impl Value {
    /// Numeric interpretation, following the usual loose coercions
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Hashable identity used for categorical bookkeeping
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            // -0.0 and 0.0 are the same category
            Value::Number(n) => ValueKey::Number(if *n == 0.0 { 0u64 } else { n.to_bits() }),
            Value::String(s) => ValueKey::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Hashable projection of [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Bool(bool),
    Number(u64),
    String(String),
}

/// Completed data collection of one unit view
#[derive(Debug, Clone, Default)]
pub struct Collector {
    rows: Vec<Datum>,
    ready: bool,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows and mark the collection as complete
    pub fn complete(&mut self, rows: Vec<Datum>) {
        self.rows = rows;
        self.ready = true;
    }

    /// Drop the rows, e.g. while a reload is in flight
    pub fn reset(&mut self) {
        self.rows.clear();
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Synchronously iterate over the realized rows
    pub fn visit_data(&self, mut visitor: impl FnMut(&Datum)) {
        for row in &self.rows {
            visitor(row);
        }
    }
}

/// Reads one channel's value out of a data row
#[derive(Debug, Clone)]
pub enum Accessor {
    /// Plain field lookup
    Field(String),
    /// Row-independent value (`datum` definitions and folded expressions)
    Constant(Value),
    /// Expression evaluated per row
    Expression(Expr),
    /// Chromosome and position fields linearized through the genome
    Locus {
        chrom: String,
        pos: String,
        genome: Rc<Genome>,
    },
}

impl Accessor {
    /// Build the accessor for a channel definition
    ///
    /// Returns `Ok(None)` for constant `value` definitions, which never read data.
    pub fn for_channel_def(
        channel: Channel,
        def: &ChannelDef,
        genome: Option<&Rc<Genome>>,
    ) -> Result<Option<Accessor>, ResolutionError> {
        if let Some(field) = &def.field {
            return Ok(Some(Accessor::Field(field.clone())));
        }
        if let Some(datum) = &def.datum {
            return Ok(Some(Accessor::Constant(datum.clone())));
        }
        if let Some(source) = &def.expr {
            let parsed = expr::parse(source).map_err(|errors| {
                let message = errors
                    .iter()
                    .map(|e| e.format(source, channel.as_str()))
                    .collect::<Vec<_>>()
                    .join("\n");
                ResolutionError::invalid_expression(channel, source.clone(), message)
            })?;
            if parsed.is_constant() {
                return Ok(Some(Accessor::Constant(parsed.eval(&Datum::new()))));
            }
            return Ok(Some(Accessor::Expression(parsed)));
        }
        if let (Some(chrom), Some(pos)) = (&def.chrom, &def.pos) {
            let genome = genome.ok_or(ResolutionError::MissingGenome { channel })?;
            return Ok(Some(Accessor::Locus {
                chrom: chrom.clone(),
                pos: pos.clone(),
                genome: Rc::clone(genome),
            }));
        }
        Ok(None)
    }

    /// Whether the accessor yields the same value for every row
    pub fn is_constant(&self) -> bool {
        matches!(self, Accessor::Constant(_))
    }

    pub fn get(&self, datum: &Datum) -> Value {
        match self {
            Accessor::Field(field) => datum.get(field).cloned().unwrap_or_default(),
            Accessor::Constant(value) => value.clone(),
            Accessor::Expression(expr) => expr.eval(datum),
            Accessor::Locus { chrom, pos, genome } => {
                let chrom = datum.get(chrom).and_then(Value::as_str);
                let pos = datum.get(pos).and_then(Value::as_number);
                match (chrom, pos) {
                    (Some(chrom), Some(pos)) => genome
                        .to_linear(chrom, pos)
                        .map(Value::Number)
                        .unwrap_or_default(),
                    _ => Value::Null,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Datum {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_value_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 2, "a"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Number(2.0),
                Value::String("a".to_string())
            ]
        );
    }

    #[test]
    fn test_value_key_merges_signed_zero() {
        assert_eq!(Value::Number(-0.0).key(), Value::Number(0.0).key());
        assert_ne!(Value::Number(1.0).key(), Value::String("1".into()).key());
    }

    #[test]
    fn test_collector_visit() {
        let mut collector = Collector::new();
        assert!(!collector.is_ready());
        collector.complete(vec![row(&[("a", 1.0.into())]), row(&[("a", 2.0.into())])]);
        let mut sum = 0.0;
        collector.visit_data(|d| sum += d["a"].as_number().unwrap());
        assert!(collector.is_ready());
        assert_eq!(sum, 3.0);
    }

    #[test]
    fn test_field_accessor_missing_is_null() {
        let accessor = Accessor::Field("b".into());
        assert_eq!(accessor.get(&row(&[("a", 1.0.into())])), Value::Null);
    }

    #[test]
    fn test_constant_expression_is_folded() {
        let def = ChannelDef {
            expr: Some("1 + 2".into()),
            ..Default::default()
        };
        let accessor = Accessor::for_channel_def(Channel::X, &def, None)
            .unwrap()
            .unwrap();
        assert!(accessor.is_constant());
        assert_eq!(accessor.get(&Datum::new()), Value::Number(3.0));
    }

    #[test]
    fn test_value_definition_has_no_accessor() {
        let def = ChannelDef {
            value: Some(Value::Number(5.0)),
            ..Default::default()
        };
        assert!(Accessor::for_channel_def(Channel::Size, &def, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_locus_without_genome_fails() {
        let def = ChannelDef {
            chrom: Some("chrom".into()),
            pos: Some("pos".into()),
            ..Default::default()
        };
        let err = Accessor::for_channel_def(Channel::X, &def, None).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingGenome { .. }));
    }
}
