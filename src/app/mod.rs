use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{FiltersConfig, LayerFilter};
use crate::filter::{Query, sql_graphics_visibility};
use crate::layer::{self, LayerFormat, LayerWriter};

#[derive(Parser)]
#[command(author, version, about = "Filter layer attributes with a SQL WHERE clause", long_about = None)]
pub struct Cli {
    /// Input layer (.geojson, .geojsonl, .json, .jsonl)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file, or '-' for stdout
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// WHERE clause to apply
    #[arg(short, long = "where", conflicts_with_all = ["filters", "layer"], required_unless_present = "layer")]
    pub where_clause: Option<String>,

    /// Layer filter configuration file (YAML)
    #[arg(short, long, requires = "layer")]
    pub filters: Option<PathBuf>,

    /// Layer entry to apply from the filter configuration
    #[arg(short, long, requires = "filters")]
    pub layer: Option<String>,

    /// Read fields from each record's `attributes` object
    #[arg(short, long)]
    pub attributes: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The filter to apply, from `--where` or the named config layer.
    pub fn layer_filter(&self) -> Result<LayerFilter> {
        if let Some(where_clause) = &self.where_clause {
            return Ok(LayerFilter {
                where_clause: where_clause.clone(),
                attributes_as_property: self.attributes,
            });
        }

        let (Some(path), Some(name)) = (&self.filters, &self.layer) else {
            anyhow::bail!("CLI: Either --where or --filters with --layer is required");
        };
        let config = FiltersConfig::load(path)?;
        let mut filter = config.layer(name)?.clone();
        filter.attributes_as_property |= self.attributes;
        Ok(filter)
    }
}

/// Filter the input layer and write the matches. Returns
/// `(features read, features written)`.
pub fn run(cli: &Cli) -> Result<(usize, usize)> {
    let filter = cli.layer_filter()?;
    let format = LayerFormat::from_path(&cli.input)
        .context("CLI: Could not detect input format from extension")?;

    match format {
        LayerFormat::GeoJson | LayerFormat::GeoJsonLines => {
            // Translation happens inside the visibility pass, after reading
            let mut graphics = layer::read_features(&cli.input, format)?;
            tracing::info!("Read {} features from {}", graphics.len(), cli.input.display());
            sql_graphics_visibility(&mut graphics, &filter.where_clause)
                .with_context(|| format!("Filter: '{}'", filter.where_clause))?;

            let total = graphics.len();
            let visible: Vec<_> = graphics
                .into_iter()
                .filter(|g| g.is_visible())
                .map(|g| g.feature)
                .collect();
            let count = visible.len();

            let mut writer = LayerWriter::create(&cli.output)?;
            if format == LayerFormat::GeoJsonLines {
                writer.write_feature_lines(&visible)?;
            } else {
                writer.write_features(visible)?;
            }
            writer.finish()?;
            Ok((total, count))
        }
        LayerFormat::Json | LayerFormat::JsonLines => {
            // Translate before reading so a bad clause fails fast
            let query = if filter.where_clause.is_empty() {
                None
            } else {
                let query = Query::compile(&filter.where_clause)
                    .with_context(|| format!("Filter: '{}'", filter.where_clause))?;
                Some(query)
            };
            let records = layer::read_records(&cli.input, format)?;
            tracing::info!("Read {} records from {}", records.len(), cli.input.display());
            let matched = match &query {
                Some(query) => query.filter_json(&records, filter.attributes_as_property),
                None => records.clone(),
            };

            let mut writer = LayerWriter::create(&cli.output)?;
            writer.write_records(&matched)?;
            writer.finish()?;
            Ok((records.len(), matched.len()))
        }
    }
}
