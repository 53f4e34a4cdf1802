//! Embedded document store backed by an in-RAM tantivy index

use super::{DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value as _, STORED,
};
use tantivy::tokenizer::{AsciiFoldingFilter, LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Name under which the folding analyzer is registered
const TOKENIZER: &str = "folded";

/// Writer heap for the single indexing thread
const WRITER_HEAP_BYTES: usize = 50_000_000;

impl From<tantivy::TantivyError> for StoreError {
    fn from(err: tantivy::TantivyError) -> Self {
        StoreError::OperationFailed(format!("text index: {err}"))
    }
}

/// A search result: the document and its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document: Value,
    pub score: f64,
}

impl SearchHit {
    /// The document with `score` merged in as a top-level field
    pub fn into_scored_document(self) -> Value {
        match self.document {
            Value::Object(mut fields) => {
                fields.insert("score".to_string(), Value::from(self.score));
                Value::Object(fields)
            }
            other => other,
        }
    }
}

/// Split on non-alphanumerics, lower-case, fold accents to ASCII
fn analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build()
}

/// Terms produced by the index analyzer for `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let mut analyzer = analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(token.text.clone());
    }
    tokens
}

/// An indexed text field and its query boost
#[derive(Debug, Clone)]
struct TextField {
    name: String,
    field: Field,
    weight: f32,
}

/// In-memory collection of JSON documents with BM25 search over chosen fields.
///
/// Documents are kept in insertion order; the index stores each document's
/// position, which also breaks score ties.
pub struct MemoryDocumentStore {
    name_field: String,
    text_fields: Vec<TextField>,
    position: Field,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    documents: RwLock<Vec<Value>>,
}

impl MemoryDocumentStore {
    /// `name_field` is matched by [`DocumentStore::find_by_name`]; `text_fields`
    /// are indexed with weight 1.
    pub fn new(name_field: impl Into<String>, text_fields: &[&str]) -> StoreResult<Self> {
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let options = TextOptions::default().set_indexing_options(indexing);

        let mut builder = Schema::builder();
        let position = builder.add_u64_field("position", STORED);
        let text_fields = text_fields
            .iter()
            .map(|name| TextField {
                name: name.to_string(),
                field: builder.add_text_field(name, options.clone()),
                weight: 1.0,
            })
            .collect();

        let index = Index::create_in_ram(builder.build());
        index.tokenizers().register(TOKENIZER, analyzer());
        let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            name_field: name_field.into(),
            text_fields,
            position,
            reader,
            writer: Mutex::new(writer),
            documents: RwLock::new(Vec::new()),
        })
    }

    /// Boost matches in an indexed field. Fields outside the index are ignored.
    pub fn with_field_weight(mut self, field: &str, weight: f64) -> Self {
        match self.text_fields.iter_mut().find(|f| f.name == field) {
            Some(entry) => entry.weight = weight as f32,
            None => warn!(field, "ignoring weight for a field that is not indexed"),
        }
        self
    }

    /// Index and store `documents`, returning how many were added
    pub async fn insert_many(&self, documents: impl IntoIterator<Item = Value>) -> StoreResult<usize> {
        let mut stored = self.documents.write().await;
        let mut writer = self.writer.lock().await;

        let batch: Vec<Value> = documents.into_iter().collect();
        for (offset, document) in batch.iter().enumerate() {
            let mut indexed = TantivyDocument::default();
            indexed.add_u64(self.position, (stored.len() + offset) as u64);
            for text_field in &self.text_fields {
                for text in field_text(document.get(&text_field.name)) {
                    indexed.add_text(text_field.field, text);
                }
            }
            writer.add_document(indexed)?;
        }
        writer.commit()?;
        self.reader.reload()?;

        let inserted = batch.len();
        stored.extend(batch);
        debug!(inserted, total = stored.len(), "documents indexed");
        Ok(inserted)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    fn query(&self, terms: &[String]) -> BooleanQuery {
        let clauses: Vec<(Occur, Box<dyn Query>)> = self
            .text_fields
            .iter()
            .flat_map(|text_field| {
                terms.iter().map(move |term| {
                    let term = TermQuery::new(
                        Term::from_field_text(text_field.field, term),
                        IndexRecordOption::WithFreqs,
                    );
                    let boosted: Box<dyn Query> = Box::new(BoostQuery::new(Box::new(term), text_field.weight));
                    (Occur::Should, boosted)
                })
            })
            .collect();
        BooleanQuery::new(clauses)
    }
}

/// Strings held by a field: the string itself or every string in an array
fn field_text(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Value>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|d| d.get(&self.name_field).and_then(Value::as_str) == Some(name))
            .cloned())
    }

    async fn text_search(&self, query: &str) -> StoreResult<Vec<SearchHit>> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        debug!(?terms, "text search");
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let searcher = self.reader.searcher();
        let limit = (searcher.num_docs() as usize).max(1);
        let top_docs = searcher.search(&self.query(&terms), &TopDocs::with_limit(limit))?;

        let mut ranked = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let Some(position) = doc.get_first(self.position).and_then(|v| v.as_u64()) else {
                continue;
            };
            if let Some(document) = documents.get(position as usize) {
                ranked.push((position, f64::from(score), document.clone()));
            }
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked
            .into_iter()
            .map(|(_, score, document)| SearchHit { document, score })
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
