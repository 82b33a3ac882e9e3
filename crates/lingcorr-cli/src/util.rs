use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use lingcorr_analysis::{convention::KindConvention, engine::CorrelationEngine, entity::Entity};

use crate::schema::config::AnalysisConfig;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)?;
        tracing::info!(output = %output.display_path(), "report written");
        Ok(())
    }

    pub fn from_output_path(output_path: Option<&Path>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path.to_owned()),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read entity records from a JSON array file
pub fn read_entities_file<P>(path: P) -> anyhow::Result<Vec<Entity>>
where
    P: AsRef<Path>,
{
    let entities: Vec<Entity> = read_json_file("entities", path)?;
    tracing::info!(count = entities.len(), "loaded entities");
    Ok(entities)
}

/// Read the analysis configuration, or the built-in defaults without a path
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => read_json_file("config", path),
        None => {
            tracing::debug!("using built-in analysis config");
            Ok(AnalysisConfig::default())
        }
    }
}

/// Every feature id present in at least one entity, sorted
pub fn all_feature_ids(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .flat_map(|entity| entity.features.keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Input and output options shared by all subcommands
#[derive(Debug, Clone, Args)]
pub(crate) struct InputArg {
    /// Path to the entities JSON file
    pub entities: PathBuf,

    /// Path to an analysis config JSON file (built-in defaults if omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the JSON report to this path instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl InputArg {
    pub fn load(&self) -> anyhow::Result<(Vec<Entity>, AnalysisConfig)> {
        let config = read_config_file(self.config.as_deref())?;
        let entities = read_entities_file(&self.entities)?;
        Ok((entities, config))
    }

    pub fn save_json<T>(&self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        Output::save_json(value, self.output.as_deref())
    }
}

pub fn engine(config: &AnalysisConfig) -> CorrelationEngine<KindConvention> {
    CorrelationEngine::new(config.kind_convention.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_feature_ids_are_sorted_and_unique() {
        let entities = [
            Entity::new("a").with_feature("GB051", "1").with_feature("EA044", 1),
            Entity::new("b").with_feature("GB051", "0").with_feature("BirdRichness", 2),
        ];
        assert_eq!(
            all_feature_ids(&entities),
            ["BirdRichness", "EA044", "GB051"]
        );
    }
}
