use crate::domain::model::{Resource, VersionChain};
use crate::utils::doi::doi_key;
use std::collections::{HashMap, HashSet};

/// 以 DOI 為索引的目錄，避免每次追版本都線性掃描
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    by_doi: HashMap<String, &'a Resource>,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(catalog: &'a [Resource]) -> Self {
        let mut by_doi = HashMap::with_capacity(catalog.len());
        for resource in catalog {
            // 重複的 DOI 以目錄中第一筆為準
            by_doi.entry(doi_key(&resource.doi)).or_insert(resource);
        }
        Self { by_doi }
    }

    pub fn get(&self, doi: &str) -> Option<&'a Resource> {
        self.by_doi.get(&doi_key(doi)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_doi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_doi.is_empty()
    }

    /// Follows `previous_version` links starting at `resource`, newest first.
    ///
    /// A link that does not resolve in the catalog ends the chain, and so does a
    /// DOI that is already part of it.
    pub fn resolve_chain(&self, resource: &Resource) -> VersionChain {
        let mut chain = vec![resource.doi.clone()];
        let mut seen: HashSet<String> = HashSet::from([doi_key(&resource.doi)]);
        let mut next = resource.previous_version();

        while let Some(previous) = next {
            if seen.contains(&doi_key(previous)) {
                tracing::warn!(
                    doi = %resource.doi,
                    previous_version = previous,
                    "version cycle detected, truncating chain"
                );
                break;
            }

            let Some(previous_resource) = self.get(previous) else {
                tracing::warn!(
                    doi = %resource.doi,
                    previous_version = previous,
                    "previous version not found in catalog, truncating chain"
                );
                break;
            };

            seen.insert(doi_key(&previous_resource.doi));
            chain.push(previous_resource.doi.clone());
            next = previous_resource.previous_version();
        }

        chain
    }
}

pub fn resolve_chain(catalog: &[Resource], resource: &Resource) -> VersionChain {
    CatalogIndex::new(catalog).resolve_chain(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(doi: &str, previous: Option<&str>) -> Resource {
        Resource {
            previous_version: previous.map(str::to_string),
            ..Resource::new(doi)
        }
    }

    #[test]
    fn test_chain_without_previous_version() {
        let catalog = vec![resource("R1", None)];
        assert_eq!(resolve_chain(&catalog, &catalog[0]), vec!["R1"]);
    }

    #[test]
    fn test_chain_follows_previous_versions_newest_first() {
        let catalog = vec![
            resource("R3", Some("R2")),
            resource("R1", None),
            resource("R2", Some("R1")),
        ];
        assert_eq!(resolve_chain(&catalog, &catalog[0]), vec!["R3", "R2", "R1"]);
    }

    #[test]
    fn test_dangling_previous_version_truncates() {
        let catalog = vec![resource("R2", Some("R1")), resource("R1", Some("R0"))];
        assert_eq!(resolve_chain(&catalog, &catalog[0]), vec!["R2", "R1"]);

        let catalog = vec![resource("R2", Some("missing"))];
        assert_eq!(resolve_chain(&catalog, &catalog[0]), vec!["R2"]);
    }

    #[test]
    fn test_cycle_is_finite_and_distinct() {
        let catalog = vec![resource("A", Some("B")), resource("B", Some("A"))];
        let index = CatalogIndex::new(&catalog);

        assert_eq!(index.resolve_chain(&catalog[0]), vec!["A", "B"]);
        assert_eq!(index.resolve_chain(&catalog[1]), vec!["B", "A"]);

        // 解析是冪等的
        assert_eq!(index.resolve_chain(&catalog[0]), index.resolve_chain(&catalog[0]));
    }

    #[test]
    fn test_previous_version_matches_any_case() {
        let catalog = vec![
            resource("10.48364/ISIMIP.2", Some("10.48364/isimip.1")),
            resource("10.48364/ISIMIP.1", Some("10.48364/ISIMIP.2")),
        ];
        assert_eq!(
            resolve_chain(&catalog, &catalog[0]),
            vec!["10.48364/ISIMIP.2", "10.48364/ISIMIP.1"]
        );
    }

    #[test]
    fn test_self_reference_is_guarded() {
        let catalog = vec![resource("A", Some("A"))];
        assert_eq!(resolve_chain(&catalog, &catalog[0]), vec!["A"]);
    }

    #[test]
    fn test_resource_outside_catalog() {
        let catalog = vec![resource("R1", None)];
        let outside = resource("R2", Some("R1"));
        assert_eq!(resolve_chain(&catalog, &outside), vec!["R2", "R1"]);
    }
}
