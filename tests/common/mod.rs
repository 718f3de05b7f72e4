//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `site`: A temporary site root with a generated store at the usual location
//! - `site_state`: A `SearchState` already loaded from the `site` store
//!
//! Store text is written in the same shape the site generator emits:
//! a `var store = [...]` assignment with one object per page.

use rstest::fixture;
use serde_json::{Value, json};
use sitesearch_mcp::SearchState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Where the generator writes the store, relative to the site root.
#[allow(dead_code)]
pub const STORE_PATH: &str = "_site/assets/js/lunr/lunr-store.js";

/// A temporary directory standing in for a site checkout.
///
/// Cleaned up automatically when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempSite {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempSite {
    /// Creates a new empty site root.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this site.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of the generated store inside this site.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_PATH)
    }

    /// Creates a file with the given content, creating parent directories.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }

    /// Writes `records` as the site's generated store.
    pub fn write_store(&self, records: &[Value]) -> PathBuf {
        self.create_file(STORE_PATH, &lunr_store(records))
    }
}

impl Default for TempSite {
    fn default() -> Self {
        Self::new()
    }
}

/// A member profile page record.
#[allow(dead_code)]
pub fn member(name: &str) -> Value {
    json!({
        "title": name,
        "excerpt": " ",
        "categories": [],
        "tags": [],
        "url": format!("/members/{}/", name.to_lowercase()),
        "teaser": null,
    })
}

/// A publication page record, titled and slugged the way the generator does it.
#[allow(dead_code)]
pub fn publication(year: u16, title: &str, work_id: &str) -> Value {
    let slug = title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    json!({
        "title": format!("{} {} {}", year, title, work_id),
        "excerpt": " ",
        "categories": [],
        "tags": [],
        "url": format!("/publications/{}-{}-{}/", year, slug, work_id),
        "teaser": null,
    })
}

/// Renders records as a `lunr-store.js` assignment.
#[allow(dead_code)]
pub fn lunr_store(records: &[Value]) -> String {
    let body = records
        .iter()
        .map(|record| serde_json::to_string_pretty(record).expect("record serializes"))
        .collect::<Vec<_>>()
        .join(",");
    format!("var store = [{}]\n", body)
}

/// The record set used by most tests: four members and four publications.
#[allow(dead_code)]
pub fn site_records() -> Vec<Value> {
    vec![
        member("Claire"),
        member("Marc"),
        member("Vishal"),
        member("Yochul"),
        publication(
            2018,
            "Convolutional Lstms For Cloud Robust Segmentation Of Remote Sensing Imagery",
            "W2900059511",
        ),
        publication(
            2019,
            "Breizhcrops A Time Series Dataset For Crop Type Mapping",
            "W2946932207",
        ),
        publication(
            2018,
            "Multi Mathbf 3 Net Segmenting Flooded Buildings Via Fusion Of Multiresolution Mu",
            "W2902030013",
        ),
        publication(
            2015,
            "Visualising The Project Landscape A Spatialisation Describing Workload Attribute",
            "W2270290888",
        ),
    ]
}

/// A site whose store holds [`site_records`].
#[fixture]
pub fn site() -> TempSite {
    let site = TempSite::new();
    site.write_store(&site_records());
    site
}

/// A site together with a state loaded from its store.
#[allow(dead_code)]
pub struct LoadedSite {
    pub site: TempSite,
    pub state: Arc<SearchState>,
}

#[fixture]
pub async fn site_state(site: TempSite) -> LoadedSite {
    let state = Arc::new(SearchState::with_store(site.store_path()));
    state
        .reload(None)
        .await
        .expect("fixture store should load");
    LoadedSite { site, state }
}
