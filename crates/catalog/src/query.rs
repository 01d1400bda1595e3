//! Pure, synchronous catalog queries.
//!
//! Combination order is fixed: text filter, then category filter, then sort.
//! Sorting is stable, so products with equal prices keep their fetch order.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use storefront_core::DomainError;

use crate::product::Product;

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Fetch order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Default => "default",
            SortMode::PriceAsc => "price-asc",
            SortMode::PriceDesc => "price-desc",
        }
    }
}

impl FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(SortMode::Default),
            "price-asc" => Ok(SortMode::PriceAsc),
            "price-desc" => Ok(SortMode::PriceDesc),
            other => Err(DomainError::validation(format!("unknown sort mode: {other}"))),
        }
    }
}

/// Category restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Case-insensitive match on the product category. Products without a
    /// category never match.
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => product
                .category
                .as_deref()
                .is_some_and(|category| category.to_lowercase() == wanted.to_lowercase()),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

/// A complete catalog query as the presentation layer builds it from the
/// search box, category picker and sort control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub text: String,
    pub sort: SortMode,
    pub category: CategoryFilter,
}

impl CatalogQuery {
    pub fn new(text: impl Into<String>, sort: SortMode, category: CategoryFilter) -> Self {
        Self {
            text: text.into(),
            sort,
            category,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    /// Run the query over `products`, returning a new sequence.
    pub fn run(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.text.to_lowercase();

        let mut out: Vec<Product> = products
            .iter()
            .filter(|p| matches_text(p, &needle))
            .filter(|p| self.category.matches(p))
            .cloned()
            .collect();

        // `sort_by` is stable: equal prices keep their relative order.
        match self.sort {
            SortMode::Default => {}
            SortMode::PriceAsc => {
                out.sort_by(|a, b| a.price.amount().total_cmp(&b.price.amount()))
            }
            SortMode::PriceDesc => {
                out.sort_by(|a, b| b.price.amount().total_cmp(&a.price.amount()))
            }
        }

        out
    }
}

fn matches_text(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.title.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{Price, ProductId};

    fn product(id: u64, title: &str, price: f64) -> Product {
        Product::new(ProductId::from(id), title, Price::new(price).unwrap())
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    fn shirts_and_hat() -> Vec<Product> {
        vec![
            product(1, "Red Shirt", 20.0),
            product(2, "Blue Shirt", 10.0),
            product(3, "Hat", 5.0),
        ]
    }

    #[test]
    fn empty_query_returns_everything_in_fetch_order() {
        let products = shirts_and_hat();
        let out = CatalogQuery::default().run(&products);
        assert_eq!(out, products);
    }

    #[test]
    fn text_filter_then_price_ascending() {
        let query = CatalogQuery::new("shirt", SortMode::PriceAsc, CategoryFilter::All);
        let out = query.run(&shirts_and_hat());
        assert_eq!(titles(&out), vec!["Blue Shirt", "Red Shirt"]);
    }

    #[test]
    fn price_descending_orders_high_to_low() {
        let query = CatalogQuery::default().with_sort(SortMode::PriceDesc);
        let out = query.run(&shirts_and_hat());
        assert_eq!(titles(&out), vec!["Red Shirt", "Blue Shirt", "Hat"]);
    }

    #[test]
    fn text_filter_matches_description_case_insensitively() {
        let products = vec![
            product(1, "Backpack", 50.0).with_description("Fits a 15 inch LAPTOP"),
            product(2, "Ring", 9.0).with_description("Silver"),
        ];
        let out = CatalogQuery::default().with_text("laptop").run(&products);
        assert_eq!(titles(&out), vec!["Backpack"]);
    }

    #[test]
    fn category_filter_excludes_uncategorised_products() {
        let products = vec![
            product(1, "Jacket", 55.0).with_category("men's clothing"),
            product(2, "Mystery box", 1.0),
            product(3, "Necklace", 12.0).with_category("jewelery"),
        ];
        let out = CatalogQuery::default()
            .with_category(CategoryFilter::from("Jewelery"))
            .run(&products);
        assert_eq!(titles(&out), vec!["Necklace"]);
    }

    #[test]
    fn category_filter_folds_non_ascii_case() {
        let products = vec![
            product(1, "Pullover", 40.0).with_category("Ärmel & Öko"),
            product(2, "Tee", 15.0).with_category("basics"),
        ];
        let out = CatalogQuery::default()
            .with_category(CategoryFilter::from("ärmel & öko"))
            .run(&products);
        assert_eq!(titles(&out), vec!["Pullover"]);
    }

    #[test]
    fn equal_prices_keep_fetch_order_in_both_directions() {
        let products = vec![
            product(1, "A", 5.0),
            product(2, "B", 5.0),
            product(3, "C", 1.0),
            product(4, "D", 5.0),
        ];
        let asc = CatalogQuery::default().with_sort(SortMode::PriceAsc).run(&products);
        assert_eq!(titles(&asc), vec!["C", "A", "B", "D"]);

        let desc = CatalogQuery::default().with_sort(SortMode::PriceDesc).run(&products);
        assert_eq!(titles(&desc), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn query_does_not_touch_its_input() {
        let products = shirts_and_hat();
        let before = products.clone();
        let _ = CatalogQuery::default().with_sort(SortMode::PriceAsc).run(&products);
        assert_eq!(products, before);
    }

    #[test]
    fn sort_modes_parse_from_control_values() {
        assert_eq!("default".parse::<SortMode>().unwrap(), SortMode::Default);
        assert_eq!("price-asc".parse::<SortMode>().unwrap(), SortMode::PriceAsc);
        assert_eq!("price-desc".parse::<SortMode>().unwrap(), SortMode::PriceDesc);
        assert!("cheapest".parse::<SortMode>().is_err());
        assert_eq!(SortMode::PriceDesc.as_str(), "price-desc");
    }

    #[test]
    fn all_parses_to_no_category_restriction() {
        assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::from(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from("electronics"),
            CategoryFilter::Only("electronics".to_string())
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: ascending results are a price-sorted subset of the input.
            #[test]
            fn ascending_results_are_sorted(prices in prop::collection::vec(0u32..10_000u32, 0..40)) {
                let products: Vec<Product> = prices
                    .iter()
                    .enumerate()
                    .map(|(i, cents)| product(i as u64, "item", f64::from(*cents) / 100.0))
                    .collect();

                let out = CatalogQuery::default().with_sort(SortMode::PriceAsc).run(&products);

                prop_assert_eq!(out.len(), products.len());
                for pair in out.windows(2) {
                    prop_assert!(pair[0].price.amount() <= pair[1].price.amount());
                }
            }
        }
    }
}
