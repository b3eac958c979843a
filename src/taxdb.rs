//src/taxdb.rs

use std::io::BufRead;
use std::path::Path;

use ahash::AHashMap;
use log::{debug, info, warn};

use crate::error::{Result, UcError};
use crate::input::{open_input, trim_newline};
use crate::lineage::parse_lineage;
use crate::types::{LoadMode, Lineage};

/// Sequence identifier -> lineage. Read-only once loaded.
#[derive(Debug, Default, Clone)]
pub struct TaxonomyTable {
    lineages: AHashMap<String, Lineage>,
}

impl TaxonomyTable {
    pub fn get(&self, id: &str) -> Option<&Lineage> {
        self.lineages.get(id)
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }

    /// Inserts unless `id` is already present. Returns whether it was inserted.
    pub fn insert(&mut self, id: String, lineage: Lineage) -> bool {
        use std::collections::hash_map::Entry;
        match self.lineages.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(lineage);
                true
            }
        }
    }
}

impl FromIterator<(String, Lineage)> for TaxonomyTable {
    fn from_iter<I: IntoIterator<Item = (String, Lineage)>>(iter: I) -> Self {
        let mut table = TaxonomyTable::default();
        for (id, lineage) in iter {
            table.insert(id, lineage);
        }
        table
    }
}

/// Parses a taxonomy file in the format:
/// ```text
/// <id>\t<k__...|p__...|c__...|o__...|f__...|g__...|s__...>
/// ```
/// Everything after the first tab is the lineage string. Blank lines are
/// skipped. Lines without a tab, with an empty id or with an empty lineage
/// are malformed; a repeated id keeps its first lineage. In
/// [`LoadMode::Lenient`] both cases are logged and skipped, in
/// [`LoadMode::Strict`] they are errors.
pub fn parse_taxdb<P: AsRef<Path>>(filepath: P, mode: LoadMode) -> Result<TaxonomyTable> {
    let reader = open_input(filepath)?;
    read_taxdb(reader, mode)
}

pub fn read_taxdb<R: BufRead>(reader: R, mode: LoadMode) -> Result<TaxonomyTable> {
    let mut table = TaxonomyTable::default();
    let mut skipped = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line_result?;
        let line = trim_newline(&line);

        if line.trim().is_empty() {
            continue;
        }

        let (id, lineage_str) = match split_record(line) {
            Ok(parts) => parts,
            Err(reason) => {
                if mode == LoadMode::Strict {
                    return Err(UcError::MalformedTaxonomy {
                        line: line_no,
                        reason: reason.to_string(),
                    });
                }
                warn!("taxonomy line {line_no}: {reason}, skipped");
                skipped += 1;
                continue;
            }
        };

        let lineage = parse_lineage(lineage_str);
        debug!("taxonomy '{id}' -> {} ranks", lineage.len());

        if !table.insert(id.to_string(), lineage) {
            if mode == LoadMode::Strict {
                return Err(UcError::DuplicateTaxonomy {
                    line: line_no,
                    id: id.to_string(),
                });
            }
            warn!("taxonomy line {line_no}: '{id}' already loaded, keeping the first lineage");
            skipped += 1;
        }
    }

    info!(
        "Loaded {} taxonomy records ({} lines skipped)",
        table.len(),
        skipped
    );
    Ok(table)
}

fn split_record(line: &str) -> std::result::Result<(&str, &str), &'static str> {
    let (id, lineage) = line.split_once('\t').ok_or("no tab between id and lineage")?;
    let id = id.trim();
    if id.is_empty() {
        return Err("empty identifier");
    }
    if lineage.trim().is_empty() {
        return Err("empty lineage");
    }
    Ok((id, lineage.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TAX: &str = "\
A\tk__Fungi|p__Asco|c__Sordario|o__Magna|f__Magnaporth|g__Unident|s__sp1
B\tk__Fungi|p__Asco|c__Sordario|o__Magna|f__Magnaporth|g__Unident|s__sp2
";

    #[test]
    fn test_read_taxdb() {
        let table = read_taxdb(Cursor::new(TAX), LoadMode::Lenient).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A").unwrap().rank(6), Some("sp1"));
        assert_eq!(table.get("B").unwrap().rank(0), Some("Fungi"));
        assert!(table.get("C").is_none());
    }

    #[test]
    fn test_variable_length_and_crlf() {
        let text = "short\tk__Bacteria|p__Firmicutes\r\n\nlong\tBacteria|Firmicutes|Bacilli\r\n";
        let table = read_taxdb(Cursor::new(text), LoadMode::Strict).unwrap();
        assert_eq!(table.get("short").unwrap().ranks(), &["Bacteria", "Firmicutes"]);
        assert_eq!(table.get("long").unwrap().len(), 3);
    }

    #[test]
    fn test_lenient_skips_malformed() {
        let text = "no_tab_here\nA\tk__Fungi\n\tk__Orphan\nB\t\n";
        let table = read_taxdb(Cursor::new(text), LoadMode::Lenient).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("A").is_some());
        assert!(table.get("B").is_none());
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let text = "A\tk__Fungi\nno_tab_here\n";
        match read_taxdb(Cursor::new(text), LoadMode::Strict) {
            Err(UcError::MalformedTaxonomy { line: 2, .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let text = "A\tk__Fungi|p__Asco\nA\tk__Plantae|p__Other\n";
        let table = read_taxdb(Cursor::new(text), LoadMode::Lenient).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A").unwrap().ranks(), &["Fungi", "Asco"]);
    }

    #[test]
    fn test_duplicate_strict_is_error() {
        let text = "A\tk__Fungi\nA\tk__Plantae\n";
        match read_taxdb(Cursor::new(text), LoadMode::Strict) {
            Err(UcError::DuplicateTaxonomy { line: 2, id }) => assert_eq!(id, "A"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
