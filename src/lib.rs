// src/lib.rs
pub mod types;
pub mod error;
pub mod input;
pub mod lineage;
pub mod taxdb;
pub mod uc;
pub mod clusters;
pub mod lca;
pub mod otu_table;

use std::io::BufRead;
use std::path::Path;

use log::info;

use crate::clusters::{group_lineages, GroupStats};
use crate::error::Result;
use crate::lca::consensus_rows;
use crate::lineage::format_lineage;
use crate::otu_table::{parse_sample_ids, OtuTable, OtuTableRow};
use crate::taxdb::{parse_taxdb, read_taxdb, TaxonomyTable};
use crate::types::{ConsensusOptions, ConsensusRow};
use crate::uc::{open_uc, UcReader};

pub use crate::error::UcError;

/// Consensus lineages for every cluster of a `.uc` file.
pub struct ConsensusResults {
    /// One row per cluster, in first-encounter order.
    pub rows: Vec<ConsensusRow>,
    pub stats: GroupStats,
    pub taxonomy_records: usize,
}

impl ConsensusResults {
    /// `<cluster-id>\t<k__...|...|s__...>` per cluster.
    pub fn get_consensus_output(&self) -> Result<String> {
        let mut output = String::new();
        for row in &self.rows {
            output.push_str(&row.cluster_id);
            output.push('\t');
            output.push_str(&format_lineage(&row.lineage)?);
            output.push('\n');
        }
        Ok(output)
    }
}

/// Per-sample OTU counts for a `.uc` file, already checked for conservation.
pub struct OtuTableResults {
    pub table: OtuTable,
    pub samples: Vec<String>,
    pub rows: Vec<OtuTableRow>,
    pub stats: GroupStats,
}

impl OtuTableResults {
    /// Header `#OTU_ID\t<samples...>`, then one count row per OTU.
    pub fn get_otu_table_output(&self) -> String {
        let mut output = String::from("#OTU_ID");
        for sample in &self.samples {
            output.push('\t');
            output.push_str(sample);
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&row.otu_id);
            for count in &row.counts {
                output.push('\t');
                output.push_str(&count.to_string());
            }
            output.push('\n');
        }
        output
    }
}

/// Loads the taxonomy, groups the `.uc` members and computes each cluster's LCA.
pub fn consensus_taxonomy<P: AsRef<Path>, Q: AsRef<Path>>(
    uc_path: P,
    taxonomy_path: Q,
    options: ConsensusOptions,
) -> Result<ConsensusResults> {
    let taxonomy = parse_taxdb(taxonomy_path, options.taxonomy)?;
    consensus_with_taxonomy(open_uc(uc_path)?, &taxonomy, options)
}

/// Same as [`consensus_taxonomy`] over already opened inputs.
pub fn consensus_from_readers<U: BufRead, T: BufRead>(
    uc: U,
    taxonomy: T,
    options: ConsensusOptions,
) -> Result<ConsensusResults> {
    let taxonomy = read_taxdb(taxonomy, options.taxonomy)?;
    consensus_with_taxonomy(UcReader::new(uc), &taxonomy, options)
}

fn consensus_with_taxonomy<R: BufRead>(
    uc: UcReader<R>,
    taxonomy: &TaxonomyTable,
    options: ConsensusOptions,
) -> Result<ConsensusResults> {
    let (clusters, stats) = group_lineages(uc, taxonomy, options.lookup)?;
    let rows = consensus_rows(&clusters);
    info!("Computed consensus taxonomy for {} clusters", rows.len());

    Ok(ConsensusResults {
        rows,
        stats,
        taxonomy_records: taxonomy.len(),
    })
}

/// Counts cluster members per sample; `samples_path` fixes the columns.
pub fn build_otu_table<P: AsRef<Path>, Q: AsRef<Path>>(
    uc_path: P,
    samples_path: Q,
) -> Result<OtuTableResults> {
    let samples = parse_sample_ids(samples_path)?;
    otu_table_with_samples(open_uc(uc_path)?, samples)
}

/// Same as [`build_otu_table`] over an opened `.uc` stream and a sample list.
pub fn otu_table_from_reader<R: BufRead>(uc: R, samples: Vec<String>) -> Result<OtuTableResults> {
    otu_table_with_samples(UcReader::new(uc), samples)
}

fn otu_table_with_samples<R: BufRead>(
    uc: UcReader<R>,
    samples: Vec<String>,
) -> Result<OtuTableResults> {
    let (table, stats) = OtuTable::from_records(uc)?;
    info!("{} OTUs", table.len());
    let rows = table.rows(&samples)?;

    Ok(OtuTableResults {
        table,
        samples,
        rows,
        stats,
    })
}
