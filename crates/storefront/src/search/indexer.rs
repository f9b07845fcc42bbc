//! Search index builder.
//!
//! Builds the search index from catalog listings, in the background when
//! called through [`build_index_async`].

use tantivy::Index;
use tracing::{error, info, instrument, warn};

use bazaar_core::{Price, Product};

use super::{SearchError, SearchFields, SearchIndex};
use crate::catalog::Catalog;

/// Name of the English stemming analyzer used by text fields.
pub(super) const TOKENIZER: &str = "en_stem";

/// Spawn a background task to (re)build the search index from the catalog.
///
/// Until the first build completes, searches return empty results. A build
/// that finishes after a newer one is discarded.
pub fn build_index_async(search_index: SearchIndex, catalog: Catalog) {
    let generation = search_index.next_generation();
    info!(generation, "Spawning background search index build task");

    tokio::task::spawn_blocking(move || {
        let products = catalog.list();
        match build_index(&products) {
            Ok((index, fields)) => match search_index.set_ready(index, fields, generation) {
                Ok(true) => {
                    let docs = search_index.num_docs();
                    info!(docs, generation, "Search index is now ready and serving requests");
                }
                Ok(false) => info!(generation, "Discarded stale search index build"),
                Err(e) => error!(error = %e, "Failed to set search index as ready"),
            },
            Err(e) => {
                error!(error = %e, "Failed to build search index");
            }
        }
    });
}

/// Build an in-memory index over `products`.
///
/// # Errors
///
/// Returns `SearchError::Build` if the index writer fails.
#[instrument(skip_all, fields(count = products.len()))]
pub fn build_index(products: &[Product]) -> Result<(Index, SearchFields), SearchError> {
    let (schema, fields) = SearchIndex::build_schema();
    let index = Index::create_in_ram(schema);

    index.tokenizers().register(
        TOKENIZER,
        tantivy::tokenizer::TextAnalyzer::builder(tantivy::tokenizer::SimpleTokenizer::default())
            .filter(tantivy::tokenizer::RemoveLongFilter::limit(40))
            .filter(tantivy::tokenizer::LowerCaser)
            .filter(tantivy::tokenizer::Stemmer::new(
                tantivy::tokenizer::Language::English,
            ))
            .build(),
    );

    let mut writer = index
        .writer(50_000_000) // 50MB buffer
        .map_err(|e| SearchError::Build(format!("Failed to create writer: {e}")))?;

    let mut count = 0_usize;
    for product in products {
        let Ok(item_id) = u64::try_from(product.item_id.as_i32()) else {
            warn!(item_id = %product.item_id, "Skipping listing with negative id");
            continue;
        };

        let doc = tantivy::doc!(
            fields.item_id => item_id,
            fields.name => product.name.clone(),
            fields.category => product.category.trim().to_lowercase(),
            fields.price_cents => Price::usd(product.price).to_cents(),
            fields.available => u64::from(product.available),
            fields.name_text => product.name.clone(),
            fields.description_text => product.description.clone(),
            fields.category_text => product.category.clone()
        );

        if let Err(e) = writer.add_document(doc) {
            warn!(error = %e, item_id = %product.item_id, "Failed to index listing");
        } else {
            count += 1;
        }
    }

    writer
        .commit()
        .map_err(|e| SearchError::Build(format!("Failed to commit index: {e}")))?;

    info!(count, "Search index built");
    Ok((index, fields))
}
