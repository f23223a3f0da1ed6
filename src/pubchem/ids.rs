//! Post-processing of identifier lists and identifier-exchange results.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::pug::PugError;

/// Parses a newline-delimited list of numeric identifiers.
///
/// Blank rows are skipped and the sentinel `0` (not a valid identifier) is
/// dropped. Order is preserved.
///
/// # Errors
///
/// Returns [`PugError::MalformedRow`] for a row that is not an unsigned integer.
pub fn parse_id_list(text: &str) -> Result<Vec<u64>, PugError> {
    let mut ids = Vec::new();
    for row in text.lines().map(str::trim).filter(|row| !row.is_empty()) {
        let id: u64 = row.parse().map_err(|_| PugError::malformed_row(row))?;
        if id != 0 {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Parses a newline-delimited identifier list into a set.
///
/// # Errors
///
/// Same as [`parse_id_list`].
pub fn parse_id_set(text: &str) -> Result<BTreeSet<u64>, PugError> {
    Ok(parse_id_list(text)?.into_iter().collect())
}

/// Parses a newline-delimited list of registry identifiers.
///
/// Rows are trimmed, blank rows skipped, and duplicates removed; the result is
/// sorted so repeated runs produce identical requests.
#[must_use]
pub fn parse_source_ids(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Destination reported by the identifier exchange service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappedId {
    /// A PubChem CID or SID.
    Numeric(u64),
    /// A textual identifier (SMILES, InChI, ...).
    Text(String),
}

impl MappedId {
    fn parse(value: &str) -> Self {
        value
            .parse()
            .map_or_else(|_| Self::Text(value.to_string()), Self::Numeric)
    }
}

impl fmt::Display for MappedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Source → destination mapping produced by an identifier exchange.
///
/// Every requested source ID has an entry; `None` marks IDs the service could
/// not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    entries: BTreeMap<String, Option<MappedId>>,
}

impl IdMapping {
    /// Merges `source<ws>destination` rows, then adds unmatched inputs.
    ///
    /// A row holding only a source ID records no match for it.
    ///
    /// # Errors
    ///
    /// - [`PugError::ConflictingMapping`] when one source maps to two different
    ///   destinations (identical duplicates are accepted)
    /// - [`PugError::MalformedRow`] for rows with more than two fields
    pub fn from_rows(text: &str, requested: &[String]) -> Result<Self, PugError> {
        let mut entries: BTreeMap<String, Option<MappedId>> = BTreeMap::new();

        for row in text.lines().filter(|row| !row.trim().is_empty()) {
            let mut fields = row.split_whitespace();
            let (Some(source), destination, None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(PugError::malformed_row(row));
            };
            let Some(destination) = destination.map(MappedId::parse) else {
                entries.entry(source.to_string()).or_insert(None);
                continue;
            };

            match entries.get(source) {
                Some(Some(existing)) if *existing != destination => {
                    return Err(PugError::ConflictingMapping {
                        source_id: source.to_string(),
                        first: existing.to_string(),
                        second: destination.to_string(),
                    });
                }
                Some(Some(_)) => {}
                _ => {
                    entries.insert(source.to_string(), Some(destination));
                }
            }
        }

        for id in requested {
            entries.entry(id.clone()).or_insert(None);
        }

        Ok(Self { entries })
    }

    /// Returns the destination for a source ID (`Some(None)` when unmatched).
    #[must_use]
    pub fn get(&self, source_id: &str) -> Option<Option<&MappedId>> {
        self.entries.get(source_id).map(Option::as_ref)
    }

    /// Iterates over matched `(source, destination)` pairs in source order.
    pub fn matched(&self) -> impl Iterator<Item = (&str, &MappedId)> {
        self.entries
            .iter()
            .filter_map(|(source, dest)| dest.as_ref().map(|dest| (source.as_str(), dest)))
    }

    /// Iterates over source IDs without a match.
    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, dest)| dest.is_none())
            .map(|(source, _)| source.as_str())
    }

    /// Number of source IDs in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn requested(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_id_list_drops_sentinel_zero() {
        assert_eq!(parse_id_list("1\n0\n2\n0\n3\n").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_id_list_skips_blank_rows_and_whitespace() {
        assert_eq!(parse_id_list("\n 5 \r\n\n7").unwrap(), vec![5, 7]);
    }

    #[test]
    fn test_parse_id_list_rejects_text() {
        let err = parse_id_list("1\nabc\n").unwrap_err();
        assert!(matches!(err, PugError::MalformedRow { row } if row == "abc"));
    }

    #[test]
    fn test_parse_id_set_deduplicates() {
        let set = parse_id_set("2244\n0\n2244\n1\n").unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2244]);
    }

    #[test]
    fn test_parse_source_ids_deduplicates_and_sorts() {
        assert_eq!(
            parse_source_ids("ZINC2\n\n CHEMBL25 \nZINC2\n"),
            vec!["CHEMBL25".to_string(), "ZINC2".to_string()]
        );
    }

    #[test]
    fn test_mapping_parses_numeric_and_text_destinations() {
        let mapping = IdMapping::from_rows(
            "CHEMBL25\t2244\nCHEMBL1\tCC(=O)O\n",
            &requested(&["CHEMBL25", "CHEMBL1"]),
        )
        .unwrap();
        assert_eq!(mapping.get("CHEMBL25"), Some(Some(&MappedId::Numeric(2244))));
        assert_eq!(
            mapping.get("CHEMBL1"),
            Some(Some(&MappedId::Text("CC(=O)O".to_string())))
        );
    }

    #[test]
    fn test_mapping_conflicting_duplicate_rejected() {
        let err = IdMapping::from_rows(
            "CHEMBL25\t2244\nCHEMBL25\t2245\n",
            &requested(&["CHEMBL25"]),
        )
        .unwrap_err();
        match err {
            PugError::ConflictingMapping {
                source_id,
                first,
                second,
            } => {
                assert_eq!(source_id, "CHEMBL25");
                assert_eq!(first, "2244");
                assert_eq!(second, "2245");
            }
            other => panic!("expected ConflictingMapping, got {other:?}"),
        }
    }

    #[test]
    fn test_mapping_identical_duplicate_accepted() {
        let mapping = IdMapping::from_rows(
            "CHEMBL25\t2244\nCHEMBL25\t2244\n",
            &requested(&["CHEMBL25"]),
        )
        .unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("CHEMBL25"), Some(Some(&MappedId::Numeric(2244))));
    }

    #[test]
    fn test_mapping_unmatched_inputs_map_to_none() {
        let mapping = IdMapping::from_rows(
            "CHEMBL25\t2244\n",
            &requested(&["CHEMBL25", "CHEMBL0000"]),
        )
        .unwrap();
        assert_eq!(mapping.get("CHEMBL0000"), Some(None));
        assert_eq!(mapping.unmatched().collect::<Vec<_>>(), vec!["CHEMBL0000"]);
        assert_eq!(
            mapping.matched().collect::<Vec<_>>(),
            vec![("CHEMBL25", &MappedId::Numeric(2244))]
        );
    }

    #[test]
    fn test_mapping_source_only_row_is_unmatched() {
        let mapping = IdMapping::from_rows("CHEMBL9\n", &requested(&["CHEMBL9"])).unwrap();
        assert_eq!(mapping.get("CHEMBL9"), Some(None));
    }

    #[test]
    fn test_mapping_row_with_extra_fields_rejected() {
        let err = IdMapping::from_rows("A 1 2\n", &requested(&["A"])).unwrap_err();
        assert!(matches!(err, PugError::MalformedRow { .. }));
    }

    #[test]
    fn test_mapped_id_display() {
        assert_eq!(MappedId::Numeric(2244).to_string(), "2244");
        assert_eq!(MappedId::Text("InChI=1S".to_string()).to_string(), "InChI=1S");
    }
}
