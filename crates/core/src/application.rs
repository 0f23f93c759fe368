use crate::domain::{LoadInfo, Record, RunState, TableBatch, TableLoad};
use crate::errors::PipelineError;
use crate::ports::{Destination, RecordProvider, Result};
use crate::utils::{load_id_from, normalize_identifier};
use chrono::Utc;
use log::{debug, error, info};

/// Provider over a literal dataset, rebuilt from `rows` on every extract
pub struct StaticResource<R> {
    name: String,
    rows: fn() -> Vec<R>,
}

impl<R: Record> StaticResource<R> {
    pub fn new(name: impl Into<String>, rows: fn() -> Vec<R>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl<R: Record> RecordProvider for StaticResource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self) -> TableBatch {
        TableBatch::from_records(self.name.as_str(), &(self.rows)())
    }
}

/// Ordered registry of the providers loaded together by one pipeline run
pub struct Source {
    name: String,
    providers: Vec<Box<dyn RecordProvider>>,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
        }
    }

    /// Appends a provider; two providers may not map to the same table
    pub fn with_provider(
        mut self,
        provider: Box<dyn RecordProvider>,
    ) -> std::result::Result<Self, PipelineError> {
        let table = normalize_identifier(provider.name());
        if table.is_empty() {
            return Err(PipelineError::InvalidName(provider.name().to_string()));
        }
        if self
            .providers
            .iter()
            .any(|p| normalize_identifier(p.name()) == table)
        {
            return Err(PipelineError::DuplicateResource(table));
        }
        self.providers.push(provider);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn providers(&self) -> &[Box<dyn RecordProvider>] {
        &self.providers
    }
}

/// Application service loading every provider of a source into one dataset
pub struct PipelineRunner {
    pipeline_name: String,
    dataset_name: String,
    destination: Box<dyn Destination>,
    state: RunState,
}

impl PipelineRunner {
    /// Creates a new PipelineRunner writing into `dataset_name` of `destination`
    pub fn new(
        pipeline_name: impl Into<String>,
        dataset_name: impl Into<String>,
        destination: Box<dyn Destination>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            dataset_name: dataset_name.into(),
            destination,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Writes each provider's batch to its own table, replacing prior contents.
    /// The first destination error ends the run and is returned as is.
    pub fn run(&mut self, source: &Source) -> Result<LoadInfo> {
        self.state = RunState::NotStarted;
        match self.load(source) {
            Ok(info) => {
                self.state = RunState::Completed;
                Ok(info)
            }
            Err(e) => {
                self.state = RunState::Failed;
                error!("Pipeline {} failed: {}", self.pipeline_name, e);
                Err(e)
            }
        }
    }

    fn load(&self, source: &Source) -> Result<LoadInfo> {
        let dataset = normalize_identifier(&self.dataset_name);
        if dataset.is_empty() {
            return Err(Box::new(PipelineError::InvalidName(self.dataset_name.clone())));
        }

        let started_at = Utc::now();
        let load_id = load_id_from(started_at);
        info!(
            "Loading source {} into {} dataset {} (load {})",
            source.name(),
            self.destination.name(),
            dataset,
            load_id
        );

        let mut tables = Vec::with_capacity(source.providers().len());
        for provider in source.providers() {
            let mut batch = provider.extract();
            batch.table = normalize_identifier(&batch.table);
            debug!("Extracted {} row(s) for {}", batch.len(), batch.table);

            let row_count = self.destination.replace_table(&dataset, &load_id, &batch)?;
            info!("Replaced table {}.{} with {} row(s)", dataset, batch.table, row_count);
            tables.push(TableLoad {
                table: batch.table,
                row_count,
            });
        }

        let load_info = LoadInfo {
            pipeline_name: self.pipeline_name.clone(),
            destination_name: self.destination.name().to_string(),
            destination_location: self.destination.location(&dataset),
            dataset_name: dataset.clone(),
            load_id,
            started_at,
            finished_at: Utc::now(),
            tables,
        };
        self.destination.record_load(&dataset, &load_info)?;
        Ok(load_info)
    }
}
