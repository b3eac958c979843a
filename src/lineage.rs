//src/lineage.rs

use crate::error::{Result, UcError};
use crate::types::Lineage;

/// Rank tags, applied positionally: rank 0 gets `k__`, rank 6 gets `s__`.
pub const RANK_PREFIXES: [&str; 7] = ["k__", "p__", "c__", "o__", "f__", "g__", "s__"];

/// Separator between ranks in a lineage string.
pub const RANK_SEPARATOR: char = '|';

/// Parses a `|`-joined lineage string.
///
/// Each token drops everything up to and including its first `__`
/// (`k__Fungi` -> `Fungi`, `s__` -> ``); tokens without a marker are kept
/// verbatim.
pub fn parse_lineage(s: &str) -> Lineage {
    s.split(RANK_SEPARATOR)
        .map(|token| match token.split_once("__") {
            Some((_, label)) => label,
            None => token,
        })
        .collect()
}

/// Renders a lineage as `k__...|p__...|...`.
///
/// Unresolved ranks render as the bare tag (`g__`). Lineages deeper than
/// [`RANK_PREFIXES`] have no tag to use and are rejected.
pub fn format_lineage(lineage: &Lineage) -> Result<String> {
    if lineage.len() > RANK_PREFIXES.len() {
        return Err(UcError::LineageTooDeep {
            ranks: lineage.len(),
            max: RANK_PREFIXES.len(),
        });
    }

    let mut out = String::new();
    for (i, label) in lineage.ranks().iter().enumerate() {
        if i > 0 {
            out.push(RANK_SEPARATOR);
        }
        out.push_str(RANK_PREFIXES[i]);
        out.push_str(label);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "k__Fungi|p__Asco|c__Sordario|o__Magna|f__Magnaporth|g__Unident|s__sp1";

    #[test]
    fn test_parse_strips_markers() {
        let lineage = parse_lineage(FULL);
        assert_eq!(
            lineage.ranks(),
            &["Fungi", "Asco", "Sordario", "Magna", "Magnaporth", "Unident", "sp1"]
        );
    }

    #[test]
    fn test_parse_untagged_and_empty_tokens() {
        let lineage = parse_lineage("Bacteria|p__|Firmicutes");
        assert_eq!(lineage.ranks(), &["Bacteria", "", "Firmicutes"]);

        // only the first marker is a prefix
        let lineage = parse_lineage("s__Genus__odd");
        assert_eq!(lineage.ranks(), &["Genus__odd"]);

        // SILVA-style domain tags are not special
        let lineage = parse_lineage("d__Bacteria|p__Proteobacteria");
        assert_eq!(lineage.ranks(), &["Bacteria", "Proteobacteria"]);
    }

    #[test]
    fn test_format_round_trip() {
        let lineage = parse_lineage(FULL);
        assert_eq!(format_lineage(&lineage).unwrap(), FULL);
    }

    #[test]
    fn test_format_empty_ranks_keep_tag() {
        let lineage: Lineage = ["Fungi", "Asco", "", ""].into_iter().collect();
        assert_eq!(format_lineage(&lineage).unwrap(), "k__Fungi|p__Asco|c__|o__");
    }

    #[test]
    fn test_format_empty_lineage() {
        assert_eq!(format_lineage(&Lineage::default()).unwrap(), "");
    }

    #[test]
    fn test_format_rejects_deep_lineage() {
        let lineage: Lineage = (0..8).map(|i| format!("r{i}")).collect();
        match format_lineage(&lineage) {
            Err(UcError::LineageTooDeep { ranks: 8, max: 7 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
