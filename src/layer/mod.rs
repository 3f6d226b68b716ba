//! Reading and writing file-based layers.

use anyhow::{Context, Result, anyhow, bail};
use geojson::{Feature, FeatureCollection, GeoJson};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::aql::Record;
use crate::filter::Graphic;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LayerFormat {
    /// FeatureCollection; attributes are each feature's `properties`
    GeoJson,
    /// One GeoJSON Feature per line; attributes are its `properties`
    GeoJsonLines,
    /// Array of records, or a feature set object with a `features` array
    Json,
    /// One record per line
    JsonLines,
}

impl LayerFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "geojson" => Some(LayerFormat::GeoJson),
            "json" => Some(LayerFormat::Json),
            "geojsonl" => Some(LayerFormat::GeoJsonLines),
            "jsonl" | "ndjson" => Some(LayerFormat::JsonLines),
            _ => None,
        }
    }
}

/// A GeoJSON feature with the visibility state a renderer would keep.
#[derive(Debug, Clone)]
pub struct FeatureGraphic {
    pub feature: Feature,
    attributes: Record,
    visible: bool,
}

impl FeatureGraphic {
    pub fn new(feature: Feature) -> Self {
        let attributes = feature.properties.clone().unwrap_or_default();
        Self {
            feature,
            attributes,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Graphic for FeatureGraphic {
    fn attributes(&self) -> &Record {
        &self.attributes
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

pub fn read_feature_collection(path: &Path) -> Result<Vec<FeatureGraphic>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Layer: Failed to read {}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .with_context(|| format!("Layer: Invalid GeoJSON in {}", path.display()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("Layer: {} holds a bare geometry", path.display()),
    };

    Ok(features.into_iter().map(FeatureGraphic::new).collect())
}

pub fn read_feature_lines(path: &Path) -> Result<Vec<FeatureGraphic>> {
    let file =
        File::open(path).with_context(|| format!("Layer: Failed to open {}", path.display()))?;

    let mut graphics = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let feature: Feature = serde_json::from_str(&line)
            .with_context(|| format!("Layer: Invalid GeoJSON Feature on line {}", i + 1))?;
        graphics.push(FeatureGraphic::new(feature));
    }
    Ok(graphics)
}

pub fn read_features(path: &Path, format: LayerFormat) -> Result<Vec<FeatureGraphic>> {
    match format {
        LayerFormat::GeoJson => read_feature_collection(path),
        LayerFormat::GeoJsonLines => read_feature_lines(path),
        LayerFormat::Json | LayerFormat::JsonLines => {
            bail!("Layer: {} holds records, not features", path.display())
        }
    }
}

pub fn read_records(path: &Path, format: LayerFormat) -> Result<Vec<serde_json::Value>> {
    let file =
        File::open(path).with_context(|| format!("Layer: Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    match format {
        LayerFormat::JsonLines => {
            let mut records = Vec::new();
            for (i, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&line)
                    .with_context(|| format!("Layer: Invalid JSON on line {}", i + 1))?;
                records.push(record);
            }
            Ok(records)
        }
        LayerFormat::Json => {
            let value: serde_json::Value = serde_json::from_reader(reader)
                .with_context(|| format!("Layer: Invalid JSON in {}", path.display()))?;
            match value {
                serde_json::Value::Array(records) => Ok(records),
                serde_json::Value::Object(mut set) => match set.remove("features") {
                    Some(serde_json::Value::Array(records)) => Ok(records),
                    _ => Err(anyhow!(
                        "Layer: {} has no 'features' array",
                        path.display()
                    )),
                },
                _ => bail!("Layer: {} is neither an array nor a feature set", path.display()),
            }
        }
        LayerFormat::GeoJson | LayerFormat::GeoJsonLines => {
            bail!("Layer: GeoJSON is read as features, not records")
        }
    }
}

/// Output destination; `-` writes to stdout.
pub struct LayerWriter {
    writer: BufWriter<Box<dyn Write + Send>>,
}

impl LayerWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let inner: Box<dyn Write + Send> = if path == Path::new("-") {
            Box::new(std::io::stdout())
        } else {
            let file = File::create(path)
                .with_context(|| format!("Layer: Failed to create {}", path.display()))?;
            Box::new(file)
        };
        Ok(Self {
            writer: BufWriter::new(inner),
        })
    }

    pub fn write_features(&mut self, features: Vec<Feature>) -> Result<()> {
        let collection = GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        });
        serde_json::to_writer(&mut self.writer, &collection)?;
        writeln!(self.writer)?;
        Ok(())
    }

    /// One Feature per line, the GeoJSONL layout.
    pub fn write_feature_lines(&mut self, features: &[Feature]) -> Result<()> {
        for feature in features {
            serde_json::to_writer(&mut self.writer, feature)?;
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn write_records(&mut self, records: &[serde_json::Value]) -> Result<()> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
