//! Dataset catalog: which variable keys exist, where their files live, and
//! how composite variables are assembled.
//!
//! The built-in catalog mirrors the production file layout for the São Paulo
//! municipal sheets; a JSON file with the same shape can replace it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::dataset::SchemaKind;
use crate::error::{DashResult, DashboardError};

/// One loadable dataset: its file, display name, and normalization schema.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSource {
    pub file: PathBuf,
    pub display_name: String,
    pub schema: SchemaKind,
}

/// A user-facing variable backed by several datasets, merged per
/// municipality at query time.
#[derive(Debug, Clone, Deserialize)]
pub struct Composite {
    pub display_name: String,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub datasets: BTreeMap<String, DatasetSource>,
    #[serde(default)]
    pub composites: BTreeMap<String, Composite>,
}

impl Catalog {
    /// The production catalog: five disease-rate sheets, nine
    /// socio-environmental sheets, and the paired temperature composite.
    pub fn builtin() -> Self {
        let mut datasets = BTreeMap::new();

        let diseases = [
            ("tuberculose", "TX_tuberculose_00_23.xlsx", "Tuberculose"),
            ("hepatite", "TX_hepatite_00_23.xlsx", "Hepatite"),
            ("hiv", "TX_hiv_aids_00_23.xlsx", "HIV/AIDS"),
            ("hanseniase", "TX_hanseniase_00_23.xlsx", "Hanseníase"),
            ("sifilis", "TX_sifilis_00_23.xlsx", "Sífilis"),
        ];
        for (key, file, display) in diseases {
            datasets.insert(
                key.to_string(),
                DatasetSource {
                    file: PathBuf::from(file),
                    display_name: display.to_string(),
                    schema: SchemaKind::Disease,
                },
            );
        }

        let socio = [
            (
                "indice_ppc",
                "Indice_PPC_SP.xlsx",
                "Índice do Poder da População (PPC)",
            ),
            ("umidade", "Umid_SP.xlsx", "Umidade"),
            ("urbanizacao", "Urban_SP.xlsx", "Urbanização"),
            ("precipitacao", "Precip_SP.xlsx", "Precipitação"),
            ("populacao", "Pop_Geral_SP.xlsx", "População (Geral)"),
            ("evapot", "Evapot_SP.xlsx", "Evapotranspiração de Referência"),
            ("densidade", "Dens_demog_SP.xlsx", "Densidade Demográfica"),
            ("temp_max", "Temp_Max_SP.xlsx", "Temperatura Máxima"),
            ("temp_min", "Temp_Min_SP.xlsx", "Temperatura Mínima"),
        ];
        for (key, file, display) in socio {
            datasets.insert(
                key.to_string(),
                DatasetSource {
                    file: PathBuf::from(file),
                    display_name: display.to_string(),
                    schema: SchemaKind::Socio,
                },
            );
        }

        let mut composites = BTreeMap::new();
        composites.insert(
            "temperaturas".to_string(),
            Composite {
                display_name: "Temperaturas (Máx + Mín)".to_string(),
                parts: vec!["temp_max".to_string(), "temp_min".to_string()],
            },
        );

        Catalog {
            datasets,
            composites,
        }
    }

    pub fn from_json_file(path: &Path) -> DashResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Catalog(format!("cannot read {}: {e}", path.display())))?;
        let catalog: Catalog = serde_json::from_str(&text)
            .map_err(|e| DashboardError::Catalog(format!("invalid catalog: {e}")))?;
        for (key, composite) in &catalog.composites {
            for part in &composite.parts {
                if !catalog.datasets.contains_key(part) {
                    return Err(DashboardError::Catalog(format!(
                        "composite '{key}' references unknown dataset '{part}'"
                    )));
                }
            }
        }
        Ok(catalog)
    }

    pub fn source(&self, key: &str) -> DashResult<&DatasetSource> {
        self.datasets
            .get(key)
            .ok_or_else(|| DashboardError::UnconfiguredKey(key.to_string()))
    }

    /// Display name for a dataset or composite key, falling back to the key
    /// itself.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(source) = self.datasets.get(key) {
            &source.display_name
        } else if let Some(composite) = self.composites.get(key) {
            &composite.display_name
        } else {
            key
        }
    }

    /// Resolve a variable to the dataset keys backing it: composites expand
    /// to their parts, plain dataset keys map to themselves.
    pub fn resolve(&self, variable: &str) -> DashResult<Vec<String>> {
        if let Some(composite) = self.composites.get(variable) {
            return Ok(composite.parts.clone());
        }
        if self.datasets.contains_key(variable) {
            return Ok(vec![variable.to_string()]);
        }
        Err(DashboardError::UnconfiguredKey(variable.to_string()))
    }

    /// Every selectable variable with its display name: composites first,
    /// then plain datasets.
    pub fn variables(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .composites
            .iter()
            .map(|(k, c)| (k.as_str(), c.display_name.as_str()))
            .collect();
        out.extend(
            self.datasets
                .iter()
                .map(|(k, s)| (k.as_str(), s.display_name.as_str())),
        );
        out
    }
}
