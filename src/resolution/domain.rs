//! Scale domains and the accumulator used to merge them

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::data::{Value, ValueKey};

/// The set or range of input values a scale maps from
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Continuous { min: f64, max: f64 },
    Discrete(Vec<Value>),
}

impl Domain {
    pub fn continuous(min: f64, max: f64) -> Self {
        Domain::Continuous { min, max }
    }

    pub fn discrete<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Domain::Discrete(values.into_iter().map(Into::into).collect())
    }

    /// `(min, max)` of a continuous domain
    pub fn extent(&self) -> Option<(f64, f64)> {
        match self {
            Domain::Continuous { min, max } => Some((*min, *max)),
            Domain::Discrete(_) => None,
        }
    }

    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Domain::Discrete(values) => Some(values),
            Domain::Continuous { .. } => None,
        }
    }

    /// Width of a continuous domain
    pub fn span(&self) -> Option<f64> {
        self.extent().map(|(min, max)| max - min)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Continuous { min, max } => write!(f, "[{}, {}]", min, max),
            Domain::Discrete(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

/// Growable accumulator for domain values
#[derive(Debug, Clone, PartialEq)]
pub enum DomainArray {
    /// Running `(min, max)`
    Quantitative { extent: Option<(f64, f64)> },
    /// First-seen distinct values
    Categorical {
        values: Vec<Value>,
        seen: HashSet<ValueKey>,
    },
}

impl DomainArray {
    pub fn quantitative() -> Self {
        DomainArray::Quantitative { extent: None }
    }

    pub fn categorical() -> Self {
        DomainArray::Categorical {
            values: vec![],
            seen: HashSet::new(),
        }
    }

    /// Add a value; quantitative arrays ignore null and non-numeric values
    pub fn extend(&mut self, value: &Value) {
        match self {
            DomainArray::Quantitative { extent } => {
                let Some(n) = value.as_number().filter(|n| n.is_finite()) else {
                    return;
                };
                if value.is_null() {
                    return;
                }
                *extent = Some(match extent {
                    Some((min, max)) => (min.min(n), max.max(n)),
                    None => (n, n),
                });
            }
            DomainArray::Categorical { values, seen } => {
                if value.is_null() {
                    return;
                }
                if seen.insert(value.key()) {
                    values.push(value.clone());
                }
            }
        }
    }

    pub fn extend_all<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) {
        for value in values {
            self.extend(value);
        }
    }

    /// Merge another accumulator of the same kind into this one
    pub fn union(&mut self, other: &DomainArray) {
        match other {
            DomainArray::Quantitative {
                extent: Some((min, max)),
            } => {
                self.extend(&Value::Number(*min));
                self.extend(&Value::Number(*max));
            }
            DomainArray::Quantitative { extent: None } => {}
            DomainArray::Categorical { values, .. } => self.extend_all(values),
        }
    }

    /// Stretch a quantitative range so that it contains zero
    pub fn include_zero(&mut self) {
        if let DomainArray::Quantitative {
            extent: Some((min, max)),
        } = self
        {
            *min = min.min(0.0);
            *max = max.max(0.0);
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DomainArray::Quantitative { extent } => extent.is_none(),
            DomainArray::Categorical { values, .. } => values.is_empty(),
        }
    }

    /// Snapshot as a [`Domain`], `None` while nothing has been accumulated
    pub fn to_domain(&self) -> Option<Domain> {
        match self {
            DomainArray::Quantitative { extent } => {
                extent.map(|(min, max)| Domain::Continuous { min, max })
            }
            DomainArray::Categorical { values, .. } if values.is_empty() => None,
            DomainArray::Categorical { values, .. } => Some(Domain::Discrete(values.clone())),
        }
    }
}

/// Stable integer indices for categories
///
/// Once a category has an index it keeps it for the lifetime of the
/// indexer, regardless of the order in which later data arrives. Only
/// [`rebase`](Self::rebase) moves categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndexer {
    index: HashMap<ValueKey, usize>,
    /// Categories in index order
    values: Vec<Value>,
}

impl CategoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of a category, assigning the next unused index to new ones
    pub fn index_of(&mut self, value: &Value) -> usize {
        if let Some(i) = self.get(value) {
            return i;
        }
        let i = self.values.len();
        self.index.insert(value.key(), i);
        self.values.push(value.clone());
        i
    }

    /// Give `leading` the first indices in the order listed
    ///
    /// Categories seen earlier follow in their previous relative order.
    pub fn rebase(&mut self, leading: &[Value]) {
        let previous = std::mem::take(self);
        for value in leading.iter().chain(&previous.values) {
            self.index_of(value);
        }
    }

    /// Index of an already seen category
    pub fn get(&self, value: &Value) -> Option<usize> {
        self.index.get(&value.key()).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Register all values and return them ordered by index
    pub fn order(&mut self, values: &[Value]) -> Vec<Value> {
        let mut indexed: Vec<(usize, &Value)> =
            values.iter().map(|v| (self.index_of(v), v)).collect();
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, v)| v.clone()).collect()
    }
}
