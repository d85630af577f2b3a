use crate::types::{CountryAggregate, StoreRecord};
use std::collections::HashMap;

/// Store counts per country code, iterated in the order codes were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryTotals {
    entries: Vec<CountryAggregate>,
    index: HashMap<String, usize>,
}

impl CountryTotals {
    pub fn from_stores(stores: &[StoreRecord]) -> Self {
        let mut totals = Self::default();
        for store in stores {
            totals.add(&store.country_code, 1);
        }
        totals
    }

    fn add(&mut self, code: &str, count: u32) {
        match self.index.get(code) {
            Some(&i) => self.entries[i].total += count,
            None => {
                self.index.insert(code.to_string(), self.entries.len());
                self.entries.push(CountryAggregate {
                    country_code: code.to_string(),
                    total: count,
                });
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<u32> {
        self.index.get(code).map(|&i| self.entries[i].total)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryAggregate> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[CountryAggregate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn grand_total(&self) -> u64 {
        self.entries.iter().map(|e| e.total as u64).sum()
    }

    /// Smallest and largest total, `None` when there are no countries.
    pub fn extent(&self) -> Option<(u32, u32)> {
        let mut totals = self.entries.iter().map(|e| e.total);
        let first = totals.next()?;
        Some(totals.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

impl FromIterator<CountryAggregate> for CountryTotals {
    fn from_iter<I: IntoIterator<Item = CountryAggregate>>(iter: I) -> Self {
        let mut totals = Self::default();
        for aggregate in iter {
            totals.add(&aggregate.country_code, aggregate.total);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store(code: &str) -> StoreRecord {
        StoreRecord {
            country_code: code.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn counts_stores_per_country() {
        let stores = [store("US"), store("US"), store("FR")];
        let totals = CountryTotals::from_stores(&stores);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("US"), Some(2));
        assert_eq!(totals.get("FR"), Some(1));
        assert_eq!(totals.get("DE"), None);
        let order: Vec<&str> = totals.iter().map(|a| a.country_code.as_str()).collect();
        assert_eq!(order, ["US", "FR"]);
    }

    #[test]
    fn empty_input_gives_empty_totals() {
        let totals = CountryTotals::from_stores(&[]);
        assert!(totals.is_empty());
        assert_eq!(totals.grand_total(), 0);
        assert_eq!(totals.extent(), None);
    }

    #[test]
    fn totals_cover_every_record_once() {
        let codes = ["US", "CN", "CA", "GB", "JP", "", "MX", "KR"];
        // Skewed but deterministic distribution over the codes above.
        let stores: Vec<StoreRecord> = (0..1000usize)
            .map(|i| store(codes[(i * i + 3 * i) % codes.len()]))
            .collect();
        let totals = CountryTotals::from_stores(&stores);

        assert_eq!(totals.grand_total(), stores.len() as u64);

        let distinct: HashSet<&str> = stores.iter().map(|s| s.country_code.as_str()).collect();
        assert_eq!(totals.len(), distinct.len());
        let mut seen = HashSet::new();
        for aggregate in totals.iter() {
            assert!(seen.insert(aggregate.country_code.as_str()));
            let expected = stores
                .iter()
                .filter(|s| s.country_code == aggregate.country_code)
                .count() as u32;
            assert_eq!(aggregate.total, expected);
        }
    }

    #[test]
    fn blank_codes_are_grouped_literally() {
        let stores = [store(""), store("US"), store("")];
        let totals = CountryTotals::from_stores(&stores);
        assert_eq!(totals.get(""), Some(2));
        assert!(totals.contains(""));
        assert_eq!(totals.grand_total(), 3);
    }

    #[test]
    fn extent_spans_min_and_max() {
        let stores = [store("US"), store("US"), store("US"), store("FR"), store("GB"), store("GB")];
        let totals = CountryTotals::from_stores(&stores);
        assert_eq!(totals.extent(), Some((1, 3)));
    }

    #[test]
    fn collecting_aggregates_merges_duplicates() {
        let totals: CountryTotals = [("US", 4), ("FR", 1), ("US", 2)]
            .into_iter()
            .map(|(code, total)| CountryAggregate {
                country_code: code.to_string(),
                total,
            })
            .collect();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("US"), Some(6));
    }
}
