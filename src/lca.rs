//src/lca.rs

use rayon::prelude::*;

use crate::clusters::{Cluster, ClusterMap};
use crate::types::{ConsensusRow, Lineage};

/// Rank-wise lowest common ancestor of a set of lineages.
///
/// Ranks are compared from the most general down, over the length of the
/// shortest lineage. The first rank where any two labels differ (an empty
/// label differs from a non-empty one) ends the scan, and every rank from
/// there on is left empty even if deeper labels happen to agree. The result
/// is padded with empty labels to the length of the longest lineage.
///
/// - a single lineage is returned unchanged
/// - an empty set gives an empty lineage
/// - member order never changes the result
pub fn lca(lineages: &[Lineage]) -> Lineage {
    let (first, rest) = match lineages.split_first() {
        Some(split) => split,
        None => return Lineage::default(),
    };

    let min_len = lineages.iter().map(Lineage::len).min().unwrap_or(0);
    let max_len = lineages.iter().map(Lineage::len).max().unwrap_or(0);

    let mut ranks: Vec<String> = Vec::with_capacity(max_len);
    for (i, label) in first.ranks().iter().take(min_len).enumerate() {
        if rest.iter().all(|other| other.ranks()[i] == *label) {
            ranks.push(label.clone());
        } else {
            break;
        }
    }
    ranks.resize(max_len, String::new());

    Lineage::new(ranks)
}

/// Consensus for one cluster.
pub fn cluster_consensus(cluster: &Cluster<Lineage>) -> ConsensusRow {
    ConsensusRow {
        cluster_id: cluster.id.clone(),
        lineage: lca(&cluster.members),
        members: cluster.members.len(),
    }
}

/// Consensus for every cluster, in the map's first-encounter order.
///
/// Clusters are independent, so they are spread over the rayon pool; the
/// indexed collect keeps the input order.
pub fn consensus_rows(clusters: &ClusterMap<Lineage>) -> Vec<ConsensusRow> {
    clusters
        .clusters()
        .par_iter()
        .map(cluster_consensus)
        .collect()
}
