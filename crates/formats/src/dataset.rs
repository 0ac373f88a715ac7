//! Startup data file decoding and dataset sources.
//!
//! The data file is a flat JSON array produced by the offline preprocessing
//! step, one object per tree:
//!
//! ```json
//! [{"id": 1, "species": "Quercus agrifolia :: Coast Live Oak",
//!   "address": "100 Main St", "dbh": 12, "plantDate": null,
//!   "siteInfo": "Sidewalk", "legalStatus": "DPW Maintained",
//!   "neighborhood": "9", "color": "#6fa86f",
//!   "latitude": 37.79, "longitude": -122.39,
//!   "neighborhood_name": "Financial District/South Beach"}]
//! ```
//!
//! Unknown keys are kept as opaque properties.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use foundation::{EntityId, LatLon};
use runtime::future::BoxFuture;
use scene::{Entity, EntityStore, Properties, StoreError};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("dataset request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dataset request returned HTTP {0}")]
    Status(u16),
    #[error("invalid dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRecord {
    /// Null when the source row had no tree id.
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    species: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    dbh: Option<f64>,
    #[serde(default)]
    plant_date: Option<String>,
    #[serde(default)]
    site_info: Option<String>,
    #[serde(default)]
    legal_status: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    color: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default, rename = "neighborhood_name")]
    neighborhood_name: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TreeRecord {
    /// `None` for records without an id.
    fn into_entity(self) -> Option<Entity> {
        let id = self.id?;
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                pairs.push((key.to_string(), v));
            }
        };
        push("address", self.address);
        push("dbh", self.dbh.map(|d| d.to_string()));
        push("plantDate", self.plant_date);
        push("siteInfo", self.site_info);
        push("legalStatus", self.legal_status);
        push("neighborhood", self.neighborhood);
        for (k, v) in self.extra {
            match v {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => pairs.push((k, s)),
                other => pairs.push((k, other.to_string())),
            }
        }

        let mut entity = Entity::new(
            EntityId(id),
            self.species.unwrap_or_default(),
            LatLon::new(self.latitude, self.longitude),
        )
        .with_color(self.color.unwrap_or_default())
        .with_properties(Properties::new(pairs));
        entity.group = self.neighborhood_name.filter(|g| !g.is_empty());
        Some(entity)
    }
}

/// Decodes the data file into entities, in file order.
///
/// Records without an id or with an out-of-range position are skipped with a
/// warning; they can be neither selected nor placed on the map.
pub fn decode_entities(bytes: &[u8]) -> Result<Vec<Entity>, LoadError> {
    let records: Vec<TreeRecord> = serde_json::from_slice(bytes)?;
    let mut out = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        let Some(entity) = record.into_entity() else {
            skipped += 1;
            debug!("skipping record without id");
            continue;
        };
        if !entity.position.is_valid() {
            skipped += 1;
            debug!(id = %entity.id, "skipping record with invalid position");
            continue;
        }
        out.push(entity);
    }
    if skipped > 0 {
        warn!(skipped, "dataset contained records without an id or a valid position");
    }
    Ok(out)
}

/// Decodes the data file and builds the store in one step.
pub fn decode_store(bytes: &[u8]) -> Result<EntityStore, LoadError> {
    let entities = decode_entities(bytes)?;
    Ok(EntityStore::from_entities(entities)?)
}

/// Where the startup data file comes from.
///
/// `load` either yields a complete store or an error; callers never observe a
/// partially populated store.
pub trait DatasetSource: Send + Sync {
    fn describe(&self) -> String;

    fn load(&self) -> BoxFuture<'_, Result<EntityStore, LoadError>>;
}

#[derive(Debug, Clone)]
pub struct FileDataset {
    path: PathBuf,
}

impl FileDataset {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DatasetSource for FileDataset {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> BoxFuture<'_, Result<EntityStore, LoadError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|source| LoadError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            let store = decode_store(&bytes)?;
            info!(path = %self.path.display(), entities = store.len(), "dataset loaded");
            Ok(store)
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpDataset {
    url: String,
    http: reqwest::Client,
}

impl HttpDataset {
    pub fn new(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

impl DatasetSource for HttpDataset {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> BoxFuture<'_, Result<EntityStore, LoadError>> {
        Box::pin(async move {
            let resp = self.http.get(&self.url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(LoadError::Status(status.as_u16()));
            }
            let bytes = resp.bytes().await?;
            let store = decode_store(&bytes)?;
            info!(url = %self.url, entities = store.len(), "dataset loaded");
            Ok(store)
        })
    }
}

/// Picks an HTTP source for `http(s)://` locations and a file source otherwise.
pub fn dataset_source(location: &str, http: reqwest::Client) -> Box<dyn DatasetSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpDataset::new(location, http))
    } else {
        Box::new(FileDataset::new(location))
    }
}
