//src/clusters.rs

use ahash::AHashMap;
use log::{info, warn};

use crate::error::{Result, UcError};
use crate::taxdb::TaxonomyTable;
use crate::types::{Lineage, LookupPolicy, RecordType, UcRecord};

/// One OTU: the seed id plus whatever was collected per member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<T> {
    pub id: String,
    /// Seed first (once its `S` line is seen), then hits in stream order.
    pub members: Vec<T>,
    seeded: bool,
}

impl<T> Cluster<T> {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            members: Vec::new(),
            seeded: false,
        }
    }

    /// Whether the cluster's own `S` record has been read.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }
}

/// What happened to an `S` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    /// Cluster already existed from an out-of-order `H`.
    Adopted,
    /// The cluster was already seeded; the record was dropped.
    Duplicate,
}

/// Clusters keyed by seed id, iterated in first-encounter order.
#[derive(Debug, Clone)]
pub struct ClusterMap<T> {
    clusters: Vec<Cluster<T>>,
    index: AHashMap<String, usize>,
}

impl<T> Default for ClusterMap<T> {
    fn default() -> Self {
        Self {
            clusters: Vec::new(),
            index: AHashMap::new(),
        }
    }
}

impl<T> ClusterMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Cluster<T>> {
        self.index.get(id).map(|&i| &self.clusters[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster<T>> {
        self.clusters.iter()
    }

    pub fn clusters(&self) -> &[Cluster<T>] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Cluster<T>> {
        self.clusters
    }

    pub fn is_seeded(&self, id: &str) -> bool {
        self.get(id).map(Cluster::is_seeded).unwrap_or(false)
    }

    fn entry(&mut self, id: &str) -> (&mut Cluster<T>, bool) {
        let (i, created) = match self.index.get(id) {
            Some(&i) => (i, false),
            None => {
                let i = self.clusters.len();
                self.clusters.push(Cluster::new(id));
                self.index.insert(id.to_string(), i);
                (i, true)
            }
        };
        (&mut self.clusters[i], created)
    }

    /// Registers the seed of cluster `id`. `member` is `None` when the seed
    /// itself could not be resolved; the cluster still exists.
    pub fn add_seed(&mut self, id: &str, member: Option<T>) -> SeedOutcome {
        let (cluster, created) = self.entry(id);
        if cluster.seeded {
            return SeedOutcome::Duplicate;
        }
        cluster.seeded = true;
        if let Some(m) = member {
            cluster.members.insert(0, m);
        }
        if created {
            SeedOutcome::Created
        } else {
            SeedOutcome::Adopted
        }
    }

    /// Appends a hit to cluster `target`, creating it if the seed has not been
    /// seen. Returns `true` if the cluster was created here.
    pub fn add_hit(&mut self, target: &str, member: Option<T>) -> bool {
        let (cluster, created) = self.entry(target);
        if let Some(m) = member {
            cluster.members.push(m);
        }
        created
    }
}

impl<'a, T> IntoIterator for &'a ClusterMap<T> {
    type Item = &'a Cluster<T>;
    type IntoIter = std::slice::Iter<'a, Cluster<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Counters collected while grouping a `.uc` stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub seeds: usize,
    pub hits: usize,
    pub ignored: usize,
    pub duplicate_seeds: usize,
    pub orphan_hits: usize, // hits whose cluster had no seed yet
    pub late_seeds: usize,  // seeds adopting a cluster opened by orphan hits
    pub unresolved: usize,
}

/// Groups `.uc` records into clusters, turning each member into a `T` with
/// `resolve`. `resolve` returning `Ok(None)` drops the member but still
/// creates or seeds its cluster.
pub fn group_records<I, T, F>(records: I, mut resolve: F) -> Result<(ClusterMap<T>, GroupStats)>
where
    I: IntoIterator<Item = Result<UcRecord>>,
    F: FnMut(&UcRecord) -> Result<Option<T>>,
{
    let mut map = ClusterMap::new();
    let mut stats = GroupStats::default();

    for rec in records {
        let rec = rec?;
        match rec.record_type {
            RecordType::Seed => {
                if map.is_seeded(&rec.query_id) {
                    warn!(
                        "line {}: cluster '{}' seeded twice, record ignored",
                        rec.line_number, rec.query_id
                    );
                    stats.duplicate_seeds += 1;
                    continue;
                }
                let member = resolve(&rec)?;
                if member.is_none() {
                    stats.unresolved += 1;
                }
                if map.add_seed(&rec.query_id, member) == SeedOutcome::Adopted {
                    warn!(
                        "line {}: cluster '{}' already held hits before its seed",
                        rec.line_number, rec.query_id
                    );
                    stats.late_seeds += 1;
                }
                stats.seeds += 1;
            }
            RecordType::Hit => {
                let member = resolve(&rec)?;
                if member.is_none() {
                    stats.unresolved += 1;
                }
                if map.add_hit(&rec.target_id, member) {
                    warn!(
                        "line {}: hit '{}' references '{}' before its seed",
                        rec.line_number, rec.query_id, rec.target_id
                    );
                    stats.orphan_hits += 1;
                }
                stats.hits += 1;
            }
            RecordType::Ignored => stats.ignored += 1,
        }
    }

    info!(
        "Read {} seeds and {} hits into {} clusters ({} other records ignored)",
        stats.seeds,
        stats.hits,
        map.len(),
        stats.ignored
    );
    Ok((map, stats))
}

/// Groups member lineages by cluster, looking each query id up in `taxonomy`.
pub fn group_lineages<I>(
    records: I,
    taxonomy: &TaxonomyTable,
    policy: LookupPolicy,
) -> Result<(ClusterMap<Lineage>, GroupStats)>
where
    I: IntoIterator<Item = Result<UcRecord>>,
{
    let (map, stats) = group_records(records, |rec| match taxonomy.get(&rec.query_id) {
        Some(lineage) => Ok(Some(lineage.clone())),
        None => match policy {
            LookupPolicy::Fail => Err(UcError::UnresolvedId {
                line: rec.line_number,
                id: rec.query_id.clone(),
            }),
            LookupPolicy::Skip => {
                warn!(
                    "line {}: '{}' not found in taxonomy, member skipped",
                    rec.line_number, rec.query_id
                );
                Ok(None)
            }
        },
    })?;

    if stats.unresolved > 0 {
        warn!("{} members had no taxonomy and were left out", stats.unresolved);
    }
    Ok((map, stats))
}
