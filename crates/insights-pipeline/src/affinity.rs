//! Affinity miner
//!
//! Counts how many orders contain each pair of distinct products. A basket
//! is the sorted set of product names in one order, so a pair is always
//! keyed `(smaller, larger)` and repeated line items count once.
//!
//! Cost is the sum of squared basket sizes. Baskets hold a handful of
//! items, so no index is needed.

use insights_ir::{CrossSellPair, TransactionRow};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub type Basket = BTreeSet<String>;

pub type PairCounts = BTreeMap<(String, String), u64>;

/// One basket per order id
pub fn baskets(rows: &[TransactionRow]) -> BTreeMap<String, Basket> {
    let mut baskets: BTreeMap<String, Basket> = BTreeMap::new();
    for row in rows {
        baskets
            .entry(row.order_id.clone())
            .or_default()
            .insert(row.product_name.clone());
    }
    baskets
}

/// Order-independent key for a pair of products
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Number of baskets containing each unordered pair of distinct products
pub fn co_occurrence<'a>(baskets: impl IntoIterator<Item = &'a Basket>) -> PairCounts {
    let mut counts = PairCounts::new();
    for basket in baskets {
        let items: Vec<&String> = basket.iter().collect();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                *counts.entry(pair_key(a, b)).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Product pairs bought together, most frequent first, ties by name
pub fn cross_sell(rows: &[TransactionRow]) -> Vec<CrossSellPair> {
    let baskets = baskets(rows);
    let counts = co_occurrence(baskets.values());
    debug!(orders = baskets.len(), pairs = counts.len(), "Mined product affinity");

    let mut pairs: Vec<CrossSellPair> = counts
        .into_iter()
        .map(|((product_a, product_b), co_purchase_count)| CrossSellPair {
            product_a,
            product_b,
            co_purchase_count,
        })
        .collect();
    pairs.sort_by(|x, y| {
        y.co_purchase_count
            .cmp(&x.co_purchase_count)
            .then_with(|| x.product_a.cmp(&y.product_a))
            .then_with(|| x.product_b.cmp(&y.product_b))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket(items: &[&str]) -> Basket {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_pair_key_is_canonical() {
        assert_eq!(pair_key("Table", "Chair"), key("Chair", "Table"));
        assert_eq!(pair_key("Chair", "Table"), key("Chair", "Table"));
    }

    #[test]
    fn test_symmetric_baskets_share_one_key() {
        let counts = co_occurrence(&[basket(&["A", "B"]), basket(&["B", "A"])]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&key("A", "B")), Some(&2));
        assert_eq!(counts.get(&key("B", "A")), None);
    }

    #[test]
    fn test_all_pairs_of_a_basket() {
        let counts = co_occurrence(&[basket(&["Lamp", "Chair", "Table"])]);
        let keys: Vec<&(String, String)> = counts.keys().collect();
        assert_eq!(
            keys,
            vec![&key("Chair", "Lamp"), &key("Chair", "Table"), &key("Lamp", "Table")]
        );
        assert!(counts.values().all(|&c| c == 1));
    }

    #[test]
    fn test_single_item_and_duplicate_items() {
        assert!(co_occurrence(&[basket(&["Chair"])]).is_empty());
        // Repeated line items collapse into one basket entry
        let counts = co_occurrence(&[basket(&["Chair", "Chair", "Table"])]);
        assert_eq!(counts.get(&key("Chair", "Table")), Some(&1));
        assert_eq!(counts.len(), 1);
    }
}
