//! Search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::Price;

use crate::components::ProductCard;
use crate::error::Result;
use crate::filters;
use crate::middleware::{current_user, load_cart, load_wishlist};
use crate::routes::{FilterOption, LayoutView};
use crate::search::{SearchFilters, SearchResults, SearchSort};
use crate::state::AppState;

/// Most results shown on one page.
const SEARCH_LIMIT: usize = 48;

/// Deserialize empty strings as None for optional price fields.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Search page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchPageQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort_by: String,
    /// "in-stock" or "out-of-stock"; anything else means no filter
    pub available: Option<String>,
    /// Min price filter (dollars)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    /// Max price filter (dollars)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    pub category: Option<String>,
}

impl SearchPageQuery {
    fn filters(&self) -> SearchFilters {
        let to_cents = |amount: Decimal| Price::usd(amount).to_cents();

        SearchFilters {
            available: parse_availability(self.available.as_deref()),
            min_price_cents: self.min_price.map(to_cents),
            max_price_cents: self.max_price.map(to_cents),
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        }
    }
}

fn parse_availability(value: Option<&str>) -> Option<bool> {
    match value?.trim() {
        "in-stock" | "true" | "1" => Some(true),
        "out-of-stock" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchPageTemplate {
    pub layout: LayoutView,
    pub query: String,
    pub cards: Vec<ProductCard>,
    pub results: SearchResults,
    pub sort_by: &'static str,
    pub is_ready: bool,
    pub sort_options: Vec<FilterOption>,
    pub availability_options: Vec<FilterOption>,
    pub categories: Vec<FilterOption>,
    // Active filters
    pub filter_min_price: String,
    pub filter_max_price: String,
}

fn sort_options(current: SearchSort) -> Vec<FilterOption> {
    [
        (SearchSort::Relevance, "Best match"),
        (SearchSort::PriceAsc, "Price: low to high"),
        (SearchSort::PriceDesc, "Price: high to low"),
    ]
    .into_iter()
    .map(|(sort, label)| FilterOption::new(sort.as_str(), label, sort == current))
    .collect()
}

fn availability_options(current: Option<bool>) -> Vec<FilterOption> {
    vec![
        FilterOption::new("", "Any", current.is_none()),
        FilterOption::new("in-stock", "In stock", current == Some(true)),
        FilterOption::new("out-of-stock", "Out of stock", current == Some(false)),
    ]
}

/// Full search page.
///
/// A not-yet-built index shows no results rather than an error.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchPageQuery>,
) -> Result<SearchPageTemplate> {
    let user = current_user(&session).await;
    let cart = load_cart(&session).await?;
    let wishlist = load_wishlist(&session).await?;

    let sort = SearchSort::parse(&query.sort_by);
    let filters = query.filters();

    let results = state
        .search()
        .search_filtered(&query.q, &filters, sort, SEARCH_LIMIT)?;

    // The catalog is the source of truth; hits only carry ids
    let products: Vec<_> = results
        .hits
        .iter()
        .filter_map(|hit| state.catalog().get(hit.item_id))
        .collect();

    Ok(SearchPageTemplate {
        layout: LayoutView::new(user.as_ref(), &cart, &wishlist),
        query: query.q.trim().to_string(),
        cards: ProductCard::list(&products, &wishlist),
        results,
        sort_by: sort.as_str(),
        is_ready: state.search().is_ready(),
        sort_options: sort_options(sort),
        availability_options: availability_options(filters.available),
        categories: FilterOption::categories(
            state.catalog().categories(),
            filters.category.as_deref(),
        ),
        filter_min_price: query.min_price.map(|p| p.to_string()).unwrap_or_default(),
        filter_max_price: query.max_price.map(|p| p.to_string()).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_availability() {
        assert_eq!(parse_availability(Some("in-stock")), Some(true));
        assert_eq!(parse_availability(Some("0")), Some(false));
        assert_eq!(parse_availability(Some("")), None);
        assert_eq!(parse_availability(None), None);
    }

    #[test]
    fn test_filters_convert_dollars_to_cents() {
        let query = SearchPageQuery {
            min_price: Some(Decimal::new(1050, 2)),
            max_price: Some(Decimal::new(20, 0)),
            category: Some("  ".to_string()),
            ..SearchPageQuery::default()
        };

        let filters = query.filters();
        assert_eq!(filters.min_price_cents, Some(1050));
        assert_eq!(filters.max_price_cents, Some(2000));
        assert_eq!(filters.category, None);
    }

    #[test]
    fn test_sort_options_select_current() {
        let options = sort_options(SearchSort::PriceDesc);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "price-descending");
    }

    #[test]
    fn test_availability_options_default_to_any() {
        let options = availability_options(None);
        assert!(options.iter().any(|o| o.selected && o.value.is_empty()));
    }
}
