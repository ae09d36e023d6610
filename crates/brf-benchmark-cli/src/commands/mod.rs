pub mod audit;
pub mod distribution;
pub mod leaderboard;
pub mod normalize;
pub mod savings;

use brf_benchmark_core::config::EngineConfig;
use brf_benchmark_core::peers::PeerFilter;
use brf_benchmark_core::population::PeerPopulationIndex;
use brf_benchmark_core::store::{Dataset, InMemoryStore};
use brf_benchmark_core::BenchmarkResult;

use crate::input;

/// Dataset and engine configuration shared by every data-backed command.
pub struct Context {
    pub store: InMemoryStore,
    pub config: EngineConfig,
}

impl Context {
    /// Load the dataset from `--dataset`, or from piped stdin.
    pub fn load(dataset: Option<&str>, config: EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let data: Dataset = if let Some(path) = dataset {
            input::file::read_json(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            data
        } else {
            return Err("a dataset is required: pass --dataset <file> or pipe JSON on stdin".into());
        };

        tracing::debug!(
            entities = data.entities.len(),
            cost_records = data.cost_records.len(),
            snapshot = ?data.snapshot_date,
            "dataset loaded"
        );
        let store = InMemoryStore::new(data)?;
        Ok(Context { store, config })
    }

    /// Population index honouring the configured period and peer classifier.
    pub fn index(&self) -> BenchmarkResult<PeerPopulationIndex<'_>> {
        let index = PeerPopulationIndex::from_store(&self.store)?.with_classifier(self.config.peer_classifier());
        Ok(match self.config.period {
            Some(year) => index.with_period(year),
            None => index,
        })
    }
}

pub fn peer_filter(group: Option<&str>) -> Option<PeerFilter> {
    group.map(PeerFilter::new)
}
