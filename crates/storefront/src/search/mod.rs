//! Full-text search using Tantivy.
//!
//! The index covers catalog listings: name, description, and category. It is
//! built in a background task at startup and rebuilt after each new listing.
//!
//! The app starts immediately with an empty index. A background task builds
//! the real index and swaps it in atomically when ready.

mod indexer;

use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, FuzzyTermQuery, Occur, Query, QueryClone, RangeQuery, TermQuery,
};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, ReloadPolicy, Term};
use tracing::instrument;

use bazaar_core::ItemId;

pub use indexer::{build_index, build_index_async};

/// A search hit. Handlers resolve the full listing from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item_id: ItemId,
    pub name: String,
    pub price_cents: u64,
    pub available: bool,
    pub score: f32,
}

/// Schema field handles for the search index.
#[derive(Clone)]
pub struct SearchFields {
    // Stored fields (returned in results)
    pub item_id: Field,
    pub name: Field,
    pub category: Field,
    pub price_cents: Field,
    pub available: Field,
    // Text fields for full-text search (not stored, just indexed)
    pub name_text: Field,
    pub description_text: Field,
    pub category_text: Field,
}

/// Inner index state (once built).
struct ReadyIndex {
    index: Index,
    reader: IndexReader,
    fields: SearchFields,
    generation: u64,
}

/// The search index.
///
/// Starts empty and is populated asynchronously by a background task.
#[derive(Clone)]
pub struct SearchIndex {
    inner: Arc<RwLock<Option<ReadyIndex>>>,
    generations: Arc<AtomicU64>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    /// Create a new empty search index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Check if the index is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Reserve a build generation. Later generations win when builds race.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Swap in a built index unless a newer build is already serving.
    ///
    /// Returns `true` if the index was installed.
    pub(crate) fn set_ready(
        &self,
        index: Index,
        fields: SearchFields,
        generation: u64,
    ) -> Result<bool, SearchError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        let mut guard = self
            .inner
            .write()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        if guard.as_ref().is_some_and(|ready| ready.generation > generation) {
            return Ok(false);
        }

        *guard = Some(ReadyIndex {
            index,
            reader,
            fields,
            generation,
        });

        Ok(true)
    }

    /// Build the schema for the search index.
    pub(crate) fn build_schema() -> (Schema, SearchFields) {
        use tantivy::schema::NumericOptions;

        let mut schema_builder = Schema::builder();

        let numeric = NumericOptions::default()
            .set_stored()
            .set_indexed()
            .set_fast();

        let item_id = schema_builder.add_u64_field("item_id", numeric.clone());
        let name = schema_builder.add_text_field("name", STORED);
        // STRING means indexed but not tokenized (exact match on lowercased category)
        let category = schema_builder.add_text_field("category", STRING | STORED);
        let price_cents = schema_builder.add_u64_field("price_cents", numeric.clone());
        let available = schema_builder.add_u64_field("available", numeric);

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(indexer::TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        let name_text = schema_builder.add_text_field("name_text", text_options.clone());
        let description_text =
            schema_builder.add_text_field("description_text", text_options.clone());
        let category_text = schema_builder.add_text_field("category_text", text_options);

        let schema = schema_builder.build();
        let fields = SearchFields {
            item_id,
            name,
            category,
            price_cents,
            available,
            name_text,
            description_text,
            category_text,
        };

        (schema, fields)
    }

    /// Search the index with the given query string and filters.
    ///
    /// An empty query matches every listing. Returns empty results if the
    /// index isn't ready yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned or the search query fails.
    #[instrument(skip(self))]
    // The read guard must outlive `ready`, which borrows from it.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search_filtered(
        &self,
        query_str: &str,
        filters: &SearchFilters,
        sort: SearchSort,
        limit: usize,
    ) -> Result<SearchResults, SearchError> {
        let query_str = query_str.trim().to_lowercase();

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        let Some(ready) = guard.as_ref() else {
            return Ok(SearchResults {
                query: query_str,
                ..Default::default()
            });
        };

        let searcher = ready.reader.searcher();
        let text_query = Self::text_query(ready, &query_str)?;

        // Facets describe the text matches before filtering
        let facets = Self::compute_facets(&searcher, &ready.fields, text_query.box_clone())?;

        let query = Self::apply_filters(text_query, &ready.fields, filters);
        let limit = limit.max(1);

        let hits = match sort {
            SearchSort::Relevance => {
                let top_docs = searcher
                    .search(&query, &TopDocs::with_limit(limit))
                    .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;
                Self::collect_results(&searcher, &ready.fields, top_docs)?
            }
            SearchSort::PriceAsc | SearchSort::PriceDesc => {
                // Price order needs every match, not just the top scored ones
                let all = searcher
                    .search(&query, &TopDocs::with_limit(facets.total_count.max(1)))
                    .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;
                let mut hits = Self::collect_results(&searcher, &ready.fields, all)?;

                hits.sort_by(|a, b| {
                    let by_price = if sort == SearchSort::PriceAsc {
                        a.price_cents.cmp(&b.price_cents)
                    } else {
                        b.price_cents.cmp(&a.price_cents)
                    };
                    by_price.then(a.item_id.cmp(&b.item_id))
                });

                hits.truncate(limit);
                hits
            }
        };

        Ok(SearchResults {
            hits,
            query: query_str,
            ..facets
        })
    }

    /// Build the free-text part of a query.
    ///
    /// Query words go through the same analyzer as indexed text, so "lamps"
    /// finds "lamp".
    fn text_query(ready: &ReadyIndex, query_str: &str) -> Result<Box<dyn Query>, SearchError> {
        if query_str.is_empty() {
            return Ok(Box::new(AllQuery));
        }

        let mut analyzer = ready
            .index
            .tokenizer_for_field(ready.fields.name_text)
            .map_err(|e| SearchError::Query(format!("No analyzer: {e}")))?;

        let mut terms = Vec::new();
        let mut stream = analyzer.token_stream(query_str);
        stream.process(&mut |token| terms.push(token.text.clone()));

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in &terms {
            for field in [
                ready.fields.name_text,
                ready.fields.description_text,
                ready.fields.category_text,
            ] {
                subqueries.push((
                    Occur::Should,
                    Box::new(TermQuery::new(
                        Term::from_field_text(field, term),
                        IndexRecordOption::WithFreqs,
                    )),
                ));
            }

            if term.len() >= 4 {
                let name_term = Term::from_field_text(ready.fields.name_text, term);
                subqueries.push((
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(name_term, 1, true)),
                ));
            }
        }

        Ok(Box::new(BooleanQuery::new(subqueries)))
    }

    /// Apply filters to a query.
    fn apply_filters(
        base_query: Box<dyn Query>,
        fields: &SearchFields,
        filters: &SearchFilters,
    ) -> Box<dyn Query> {
        let mut must_clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, base_query)];

        if let Some(available) = filters.available {
            let term = Term::from_field_u64(fields.available, u64::from(available));
            must_clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        if filters.min_price_cents.is_some() || filters.max_price_cents.is_some() {
            let min = filters.min_price_cents.unwrap_or(0);
            let max = filters.max_price_cents.unwrap_or(u64::MAX);
            let range_query = RangeQuery::new(
                Bound::Included(Term::from_field_u64(fields.price_cents, min)),
                Bound::Included(Term::from_field_u64(fields.price_cents, max)),
            );
            must_clauses.push((Occur::Must, Box::new(range_query)));
        }

        if let Some(category) = filters.category.as_deref().map(str::trim)
            && !category.is_empty()
        {
            let term = Term::from_field_text(fields.category, &category.to_lowercase());
            must_clauses.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        Box::new(BooleanQuery::new(must_clauses))
    }

    /// Collect search hits from top docs.
    fn collect_results(
        searcher: &tantivy::Searcher,
        fields: &SearchFields,
        top_docs: Vec<(f32, tantivy::DocAddress)>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            results.push(Self::doc_to_hit(fields, &doc, score)?);
        }
        Ok(results)
    }

    /// Count matches, stock, and the price span for `query`.
    fn compute_facets(
        searcher: &tantivy::Searcher,
        fields: &SearchFields,
        query: Box<dyn Query>,
    ) -> Result<SearchResults, SearchError> {
        let matches = searcher
            .search(&query, &DocSetCollector)
            .map_err(|e| SearchError::Query(format!("Facet query failed: {e}")))?;

        let mut facets = SearchResults::default();
        let mut min_price = u64::MAX;

        for doc_address in matches {
            let Ok(doc) = searcher.doc::<tantivy::TantivyDocument>(doc_address) else {
                continue;
            };
            facets.total_count += 1;

            let available = doc.get_first(fields.available).and_then(|v| v.as_u64());
            if available == Some(1) {
                facets.in_stock_count += 1;
            } else {
                facets.out_of_stock_count += 1;
            }

            let price = doc
                .get_first(fields.price_cents)
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            min_price = min_price.min(price);
            facets.max_price_cents = facets.max_price_cents.max(price);
        }

        facets.min_price_cents = if min_price == u64::MAX { 0 } else { min_price };
        Ok(facets)
    }

    /// Convert a Tantivy document to a search hit.
    fn doc_to_hit(
        fields: &SearchFields,
        doc: &tantivy::TantivyDocument,
        score: f32,
    ) -> Result<SearchHit, SearchError> {
        let get_u64 =
            |field: Field| -> Option<u64> { doc.get_first(field).and_then(|v| v.as_u64()) };

        let item_id = get_u64(fields.item_id)
            .and_then(|id| i32::try_from(id).ok())
            .map(ItemId::new)
            .ok_or_else(|| SearchError::Query("Document without item_id".to_string()))?;

        Ok(SearchHit {
            item_id,
            name: doc
                .get_first(fields.name)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            price_cents: get_u64(fields.price_cents).unwrap_or(0),
            available: get_u64(fields.available) == Some(1),
            score,
        })
    }

    /// Get the number of documents in the index, or 0 if not ready.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|r| r.reader.searcher().num_docs()))
            .unwrap_or(0)
    }
}

/// Search filters.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    /// Filter by availability (Some(true) = in stock only, Some(false) = out of stock only)
    pub available: Option<bool>,
    /// Minimum price in cents (inclusive)
    pub min_price_cents: Option<u64>,
    /// Maximum price in cents (inclusive)
    pub max_price_cents: Option<u64>,
    /// Exact category (case-insensitive)
    pub category: Option<String>,
}

/// Search sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SearchSort {
    /// Parse from URL parameter value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-ascending" | "price_asc" => Self::PriceAsc,
            "price-descending" | "price_desc" => Self::PriceDesc,
            _ => Self::Relevance,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-ascending",
            Self::PriceDesc => "price-descending",
        }
    }
}

/// Search hits plus facet counts over all text matches.
#[derive(Debug, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub query: String,
    /// Listings matching the text query (before filters and limit)
    pub total_count: usize,
    pub in_stock_count: usize,
    pub out_of_stock_count: usize,
    pub min_price_cents: u64,
    pub max_price_cents: u64,
}

impl SearchResults {
    /// Check if there are any hits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Build error: {0}")]
    Build(String),
}
