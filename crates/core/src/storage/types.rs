use serde_json::{Map, Value};

/// Address of an item: partition key plus sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.pk, self.sk)
    }
}

/// Attribute map of an item, keys excluded. Nested maps and lists are stored natively.
pub type Attributes = Map<String, Value>;

/// A stored item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub attributes: Attributes,
}

impl Item {
    pub fn new(key: ItemKey) -> Self {
        Self {
            key,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// Read consistency, chosen per call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Consistency {
    #[default]
    Eventual,
    Strong,
}

impl Consistency {
    pub fn is_strong(self) -> bool {
        matches!(self, Consistency::Strong)
    }
}

/// Precondition on the current existence of the addressed item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Condition {
    #[default]
    None,
    NotExists,
    Exists,
}

/// Path to a (possibly nested) attribute, e.g. `["user", "ips"]`.
pub type AttributePath = Vec<String>;

/// Attribute changes applied by a single update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Attributes replaced wholesale.
    pub set: Vec<(AttributePath, Value)>,
    /// List attributes extended at their end.
    pub append: Vec<(AttributePath, Vec<Value>)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<P: Into<String>>(
        mut self,
        path: impl IntoIterator<Item = P>,
        value: Value,
    ) -> Self {
        self.set
            .push((path.into_iter().map(Into::into).collect(), value));
        self
    }

    pub fn append<P: Into<String>>(
        mut self,
        path: impl IntoIterator<Item = P>,
        values: Vec<Value>,
    ) -> Self {
        self.append
            .push((path.into_iter().map(Into::into).collect(), values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.append.is_empty()
    }
}

/// One write inside a non-atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    Put(Item),
    Delete(ItemKey),
}

/// One write inside an all-or-nothing transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactWrite {
    Put { item: Item, condition: Condition },
    Delete { key: ItemKey, condition: Condition },
}

impl TransactWrite {
    pub fn key(&self) -> &ItemKey {
        match self {
            TransactWrite::Put { item, .. } => &item.key,
            TransactWrite::Delete { key, .. } => key,
        }
    }

    pub fn condition(&self) -> Condition {
        match self {
            TransactWrite::Put { condition, .. } | TransactWrite::Delete { condition, .. } => {
                *condition
            }
        }
    }
}

/// Sort key restriction of a range query. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyCondition {
    Between { start: String, end: String },
    BeginsWith(String),
}

impl SortKeyCondition {
    /// Whether a sort key satisfies the condition (byte-wise ordering).
    pub fn matches(&self, sk: &str) -> bool {
        match self {
            SortKeyCondition::Between { start, end } => start.as_str() <= sk && sk <= end.as_str(),
            SortKeyCondition::BeginsWith(prefix) => sk.starts_with(prefix.as_str()),
        }
    }
}

/// Query over one partition, returning items in ascending sort key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub pk: String,
    pub sk: SortKeyCondition,
    pub consistency: Consistency,
}

impl RangeQuery {
    pub fn between(pk: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: SortKeyCondition::Between {
                start: start.into(),
                end: end.into(),
            },
            consistency: Consistency::default(),
        }
    }

    pub fn begins_with(pk: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: SortKeyCondition::BeginsWith(prefix.into()),
            consistency: Consistency::default(),
        }
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }
}
