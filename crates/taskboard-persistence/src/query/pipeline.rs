//! Aggregation pipelines.
//!
//! A leading `Match` is handed to the backend's `find`; every later stage runs
//! over the matched documents in memory. `Lookup` issues one `find` against the
//! foreign collection per stage, not per document.

use std::cmp::Ordering;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use taskboard_core::TaskboardResult;

use super::collation::Collation;
use super::document::{as_document_mut, get_field};
use super::filter::Filter;
use crate::backend::StorageBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Left outer join: attaches to each document an array (`as_field`) of the
/// `from` documents whose `foreign_field` equals the document's `local_field`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
    /// Extra condition on joined documents.
    pub filter: Filter,
}

impl Lookup {
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
            filter: Filter::All,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    async fn join(
        &self,
        backend: &dyn StorageBackend,
        docs: Vec<Value>,
    ) -> TaskboardResult<Vec<Value>> {
        if docs.is_empty() {
            return Ok(docs);
        }

        let mut keys: Vec<Value> = Vec::new();
        for doc in &docs {
            for key in local_keys(doc, &self.local_field) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let filter = Filter::In(self.foreign_field.clone(), keys).and(self.filter.clone());
        let foreign = backend.find(&self.from, &filter).await?;

        docs.into_iter()
            .map(|mut doc| {
                let local = local_keys(&doc, &self.local_field);
                let joined: Vec<Value> = foreign
                    .iter()
                    .filter(|f| {
                        let key = get_field(f, &self.foreign_field).unwrap_or(&Value::Null);
                        local.contains(key)
                    })
                    .cloned()
                    .collect();
                as_document_mut(&mut doc)?.insert(self.as_field.clone(), Value::Array(joined));
                Ok(doc)
            })
            .collect()
    }
}

/// Join keys of a document: each element when the field is an array.
fn local_keys(doc: &Value, field: &str) -> Vec<Value> {
    match get_field(doc, field) {
        Some(Value::Array(items)) => items.clone(),
        Some(value) => vec![value.clone()],
        None => vec![Value::Null],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Lookup(Lookup),
    Sort {
        field: String,
        direction: SortDirection,
    },
    Skip(u64),
    Limit(u64),
    /// Replace the stream with `{ <name>: <count> }`, or nothing when empty.
    Count(String),
    /// Run each named sub-pipeline over the same input and emit a single
    /// document holding every result array.
    Facet(Vec<(String, Vec<Stage>)>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
    collation: Collation,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(self, filter: Filter) -> Self {
        self.stage(Stage::Match(filter))
    }

    pub fn lookup(self, lookup: Lookup) -> Self {
        self.stage(Stage::Lookup(lookup))
    }

    pub fn sort(self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.stage(Stage::Sort {
            field: field.into(),
            direction,
        })
    }

    pub fn facet(self, branches: Vec<(String, Vec<Stage>)>) -> Self {
        self.stage(Stage::Facet(branches))
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Collation used by every `Sort` stage of this pipeline.
    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn collation(&self) -> &Collation {
        &self.collation
    }
}

pub(crate) async fn execute(
    backend: &dyn StorageBackend,
    collection: &str,
    pipeline: &Pipeline,
) -> TaskboardResult<Vec<Value>> {
    let (seed, rest) = match pipeline.stages.split_first() {
        Some((Stage::Match(filter), rest)) => (filter.clone(), rest),
        _ => (Filter::All, pipeline.stages.as_slice()),
    };
    let docs = backend.find(collection, &seed).await?;
    run_stages(backend, rest, docs, &pipeline.collation).await
}

fn run_stages<'a>(
    backend: &'a dyn StorageBackend,
    stages: &'a [Stage],
    mut docs: Vec<Value>,
    collation: &'a Collation,
) -> BoxFuture<'a, TaskboardResult<Vec<Value>>> {
    async move {
        for stage in stages {
            docs = match stage {
                Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
                Stage::Lookup(lookup) => lookup.join(backend, docs).await?,
                Stage::Sort { field, direction } => {
                    docs.sort_by(|a, b| {
                        direction
                            .apply(collation.compare_values(get_field(a, field), get_field(b, field)))
                    });
                    docs
                }
                Stage::Skip(n) => docs.into_iter().skip(to_usize(*n)).collect(),
                Stage::Limit(n) => docs.into_iter().take(to_usize(*n)).collect(),
                Stage::Count(name) => {
                    if docs.is_empty() {
                        Vec::new()
                    } else {
                        let mut out = Map::new();
                        out.insert(name.clone(), Value::from(docs.len() as u64));
                        vec![Value::Object(out)]
                    }
                }
                Stage::Facet(branches) => {
                    let mut out = Map::new();
                    for (name, sub) in branches {
                        let result = run_stages(backend, sub, docs.clone(), collation).await?;
                        out.insert(name.clone(), Value::Array(result));
                    }
                    vec![Value::Object(out)]
                }
            };
        }
        Ok(docs)
    }
    .boxed()
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
