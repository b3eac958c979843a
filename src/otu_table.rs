//src/otu_table.rs

use std::io::BufRead;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use log::{info, warn};

use crate::clusters::{group_records, ClusterMap, GroupStats};
use crate::error::{Result, UcError};
use crate::input::{open_input, trim_newline};
use crate::types::UcRecord;

/// Sample a read belongs to: everything before the first `_` of its id,
/// or the whole id when there is no `_`.
pub fn sample_id(read_id: &str) -> &str {
    match read_id.split_once('_') {
        Some((sample, _)) => sample,
        None => read_id,
    }
}

/// Per-sample member counts of one OTU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtuCounts {
    pub otu_id: String,
    pub counts: AHashMap<String, u64>,
    /// Number of members recorded for the OTU.
    pub total: u64,
}

impl OtuCounts {
    pub fn count(&self, sample: &str) -> u64 {
        self.counts.get(sample).copied().unwrap_or(0)
    }
}

/// One rendered row: counts aligned to the requested sample columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuTableRow {
    pub otu_id: String,
    pub counts: Vec<u64>,
}

/// OTU x sample count matrix, OTUs in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct OtuTable {
    pub otus: Vec<OtuCounts>,
}

impl OtuTable {
    /// Tallies clusters whose members are sample ids.
    pub fn from_clusters(clusters: ClusterMap<String>) -> Self {
        let otus = clusters
            .into_clusters()
            .into_iter()
            .map(|cluster| {
                let mut counts: AHashMap<String, u64> = AHashMap::new();
                for sample in &cluster.members {
                    *counts.entry(sample.clone()).or_insert(0) += 1;
                }
                OtuCounts {
                    otu_id: cluster.id,
                    counts,
                    total: cluster.members.len() as u64,
                }
            })
            .collect();
        OtuTable { otus }
    }

    /// Builds the table straight from `.uc` records.
    pub fn from_records<I>(records: I) -> Result<(Self, GroupStats)>
    where
        I: IntoIterator<Item = Result<UcRecord>>,
    {
        let (clusters, stats) =
            group_records(records, |rec| Ok(Some(sample_id(&rec.query_id).to_string())))?;
        Ok((Self::from_clusters(clusters), stats))
    }

    pub fn len(&self) -> usize {
        self.otus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.otus.is_empty()
    }

    /// Lays the counts out in `samples` order, absent samples as 0.
    ///
    /// Every row must account for all of its OTU's members; a member whose
    /// sample is not a column (or a corrupted tally) makes the row sum differ
    /// from the member total, which aborts with [`UcError::CountMismatch`].
    pub fn rows(&self, samples: &[String]) -> Result<Vec<OtuTableRow>> {
        let mut rows = Vec::with_capacity(self.otus.len());
        for otu in &self.otus {
            let counts: Vec<u64> = samples.iter().map(|s| otu.count(s)).collect();
            let observed: u64 = counts.iter().sum();
            if observed != otu.total {
                return Err(UcError::CountMismatch {
                    cluster: otu.otu_id.clone(),
                    expected: otu.total,
                    observed,
                });
            }
            rows.push(OtuTableRow {
                otu_id: otu.otu_id.clone(),
                counts,
            });
        }
        Ok(rows)
    }
}

/// Reads the ordered sample column list.
///
/// One sample per line; only the first tab-separated field is used. Lines
/// starting with `#` and blank lines are skipped, repeated ids are dropped.
pub fn parse_sample_ids<P: AsRef<Path>>(filepath: P) -> Result<Vec<String>> {
    read_sample_ids(open_input(filepath)?)
}

pub fn read_sample_ids<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut samples = Vec::new();
    let mut seen = AHashSet::new();

    for line_result in reader.lines() {
        let line = line_result?;
        let line = trim_newline(&line);
        if line.starts_with('#') {
            continue;
        }
        let sample = line.split('\t').next().unwrap_or("").trim();
        if sample.is_empty() {
            continue;
        }
        if !seen.insert(sample.to_string()) {
            warn!("sample '{sample}' listed more than once, keeping the first column");
            continue;
        }
        samples.push(sample.to_string());
    }

    info!("Loaded {} sample ids", samples.len());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uc::UcReader;
    use std::io::Cursor;

    fn uc_line(kind: &str, query: &str, target: &str) -> String {
        format!("{kind}\t0\t250\t*\t*\t*\t*\t*\t{query}\t{target}\n")
    }

    fn table(text: &str) -> OtuTable {
        OtuTable::from_records(UcReader::new(Cursor::new(text.to_string())))
            .unwrap()
            .0
    }

    fn samples(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sample_id() {
        assert_eq!(sample_id("sample1_001"), "sample1");
        assert_eq!(sample_id("s1_read_7"), "s1");
        assert_eq!(sample_id("nounderscore"), "nounderscore");
        assert_eq!(sample_id("_leading"), "");
    }

    #[test]
    fn test_seed_and_hit_rows() {
        let text = [
            uc_line("S", "sample1_001", "*"),
            uc_line("H", "sample2_002", "sample1_001"),
        ]
        .concat();
        let t = table(&text);
        let rows = t.rows(&samples(&["sample1", "sample2"])).unwrap();
        assert_eq!(
            rows,
            vec![OtuTableRow {
                otu_id: "sample1_001".into(),
                counts: vec![1, 1],
            }]
        );
    }

    #[test]
    fn test_column_order_and_zeros() {
        let text = [
            uc_line("S", "b_1", "*"),
            uc_line("H", "b_2", "b_1"),
            uc_line("S", "a_1", "*"),
            uc_line("H", "c_9", "a_1"),
            uc_line("C", "b_1", "*"),
        ]
        .concat();
        let t = table(&text);
        let rows = t.rows(&samples(&["c", "b", "a"])).unwrap();
        assert_eq!(rows[0].otu_id, "b_1");
        assert_eq!(rows[0].counts, vec![0, 2, 0]);
        assert_eq!(rows[1].otu_id, "a_1");
        assert_eq!(rows[1].counts, vec![1, 0, 1]);
    }

    #[test]
    fn test_row_sums_match_member_totals() {
        let text = [
            uc_line("S", "s1_a", "*"),
            uc_line("H", "s1_b", "s1_a"),
            uc_line("H", "s2_c", "s1_a"),
            uc_line("H", "s3_d", "s2_x"),
        ]
        .concat();
        let t = table(&text);
        let cols = samples(&["s1", "s2", "s3"]);
        for (otu, row) in t.otus.iter().zip(t.rows(&cols).unwrap()) {
            assert_eq!(row.counts.iter().sum::<u64>(), otu.total);
        }
    }

    #[test]
    fn test_unlisted_sample_is_fatal() {
        let text = [uc_line("S", "s1_a", "*"), uc_line("H", "s9_b", "s1_a")].concat();
        match table(&text).rows(&samples(&["s1"])) {
            Err(UcError::CountMismatch {
                cluster,
                expected: 2,
                observed: 1,
            }) => assert_eq!(cluster, "s1_a"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_corrupted_tally_is_fatal() {
        let mut counts = AHashMap::new();
        counts.insert("s1".to_string(), 3);
        let t = OtuTable {
            otus: vec![OtuCounts {
                otu_id: "otu1".into(),
                counts,
                total: 4,
            }],
        };
        assert!(matches!(
            t.rows(&samples(&["s1"])),
            Err(UcError::CountMismatch { expected: 4, observed: 3, .. })
        ));
    }

    #[test]
    fn test_read_sample_ids() {
        let text = "# samples\nsample1\tgroupA\n\nsample2\r\nsample1\n  sample3  \n";
        let ids = read_sample_ids(Cursor::new(text)).unwrap();
        assert_eq!(ids, samples(&["sample1", "sample2", "sample3"]));
    }
}
