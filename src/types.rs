//src/types.rs

use std::fmt;

/// An ordered list of rank labels, most general first
/// (Kingdom, Phylum, Class, Order, Family, Genus, Species).
///
/// A label may be empty when the rank is unresolved. Nothing here assumes
/// exactly seven ranks; only the tag formatter in `lineage` does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Lineage(pub Vec<String>);

impl Lineage {
    pub fn new(ranks: Vec<String>) -> Self {
        Lineage(ranks)
    }

    pub fn ranks(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label at `rank`, if the lineage is that deep.
    pub fn rank(&self, rank: usize) -> Option<&str> {
        self.0.get(rank).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Lineage {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Lineage(iter.into_iter().map(Into::into).collect())
    }
}

/// Field 0 of a `.uc` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// `S`: the query starts a new cluster and is its seed.
    Seed,
    /// `H`: the query joined the cluster seeded by the target.
    Hit,
    /// Anything else (`C`, `N`, ...). Carried through but never aggregated.
    Ignored,
}

impl RecordType {
    pub fn from_field(field: &str) -> Self {
        match field {
            "S" => RecordType::Seed,
            "H" => RecordType::Hit,
            _ => RecordType::Ignored,
        }
    }
}

/// The three fields of a `.uc` line this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UcRecord {
    pub record_type: RecordType,
    pub query_id: String,  // field 8
    pub target_id: String, // field 9, `*` on seeds
    pub line_number: usize, // 1-based, counting comments and blanks
}

impl UcRecord {
    /// Key of the cluster this record contributes to, or `None` for ignored records.
    pub fn cluster_key(&self) -> Option<&str> {
        match self.record_type {
            RecordType::Seed => Some(&self.query_id),
            RecordType::Hit => Some(&self.target_id),
            RecordType::Ignored => None,
        }
    }
}

/// One line of the consensus output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusRow {
    pub cluster_id: String,
    pub lineage: Lineage,
    pub members: usize, // lineages that took part in the consensus
}

/// What to do when a `.uc` identifier has no entry in the taxonomy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Warn and leave the member out of its cluster.
    #[default]
    Skip,
    /// Abort the run on the first unresolved identifier.
    Fail,
}

/// How the taxonomy loader treats malformed or duplicated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Warn, skip malformed lines and keep the first of duplicated keys.
    #[default]
    Lenient,
    /// Any malformed line or duplicated key is an error.
    Strict,
}

/// Knobs for the consensus pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusOptions {
    pub lookup: LookupPolicy,
    pub taxonomy: LoadMode,
}

impl fmt::Display for LookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupPolicy::Skip => write!(f, "skip"),
            LookupPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Lenient => write!(f, "lenient"),
            LoadMode::Strict => write!(f, "strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_dispatch() {
        assert_eq!(RecordType::from_field("S"), RecordType::Seed);
        assert_eq!(RecordType::from_field("H"), RecordType::Hit);
        assert_eq!(RecordType::from_field("C"), RecordType::Ignored);
        assert_eq!(RecordType::from_field("s"), RecordType::Ignored);
        assert_eq!(RecordType::from_field(""), RecordType::Ignored);
    }

    #[test]
    fn test_cluster_key() {
        let seed = UcRecord {
            record_type: RecordType::Seed,
            query_id: "A".into(),
            target_id: "*".into(),
            line_number: 1,
        };
        let hit = UcRecord {
            record_type: RecordType::Hit,
            query_id: "B".into(),
            target_id: "A".into(),
            line_number: 2,
        };
        let other = UcRecord {
            record_type: RecordType::Ignored,
            query_id: "A".into(),
            target_id: "*".into(),
            line_number: 3,
        };
        assert_eq!(seed.cluster_key(), Some("A"));
        assert_eq!(hit.cluster_key(), Some("A"));
        assert_eq!(other.cluster_key(), None);
    }
}
