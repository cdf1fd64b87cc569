mod headless;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use catalog::{CatalogError, StudioCatalog, StudioId};
use clap::Parser;
use controller::{
    ConfigError, ControllerEvent, GeocodeRequest, MapConfig, MapController, MapEvent, resolve_all,
};
use foundation::geo::{GeoBounds, LatLng};
use foundation::time::Millis;
use scene::marker_state::Representation;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::headless::{HeadlessProvider, TableGeocoder};

/// Upper bound on geocode rounds; failures are never retried, so a session
/// normally settles after one.
const MAX_GEOCODE_ROUNDS: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless studio map session: declutter a dataset and print the result")]
struct Args {
    /// Studios JSON file (array of studios)
    #[arg(long, env = "STUDIO_MAP_STUDIOS")]
    studios: PathBuf,

    /// Controller config JSON file
    #[arg(long, env = "STUDIO_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Viewport: minLat,minLng,maxLat,maxLng (default: extent of the dataset)
    #[arg(long, env = "STUDIO_MAP_BBOX")]
    bbox: Option<String>,

    #[arg(long, env = "STUDIO_MAP_ZOOM", default_value_t = 12.0)]
    zoom: f64,

    /// JSON object mapping address strings to {"lat", "lng"}
    #[arg(long, env = "STUDIO_MAP_GEOCODE_TABLE")]
    geocode_table: Option<PathBuf>,

    /// Studio id to select once the map has settled
    #[arg(long)]
    select: Option<u64>,

    /// Studio id to hover once the map has settled
    #[arg(long)]
    hover: Option<u64>,
}

#[derive(Debug)]
enum AppError {
    Io { path: PathBuf, source: std::io::Error },
    Catalog(CatalogError),
    Config(ConfigError),
    GeocodeTable(String),
    Bbox(String),
    EmptyDataset,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            AppError::Catalog(err) => write!(f, "{err}"),
            AppError::Config(err) => write!(f, "{err}"),
            AppError::GeocodeTable(msg) => write!(f, "geocode table is not valid json: {msg}"),
            AppError::Bbox(msg) => write!(f, "invalid --bbox: {msg}"),
            AppError::EmptyDataset => {
                write!(f, "no studio has a coordinate; pass --bbox explicitly")
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io { source, .. } => Some(source),
            AppError::Catalog(err) => Some(err),
            AppError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Catalog(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let summary = run(args).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run(args: Args) -> Result<serde_json::Value, AppError> {
    let catalog = StudioCatalog::from_json_str(&read_to_string(&args.studios).await?)?;
    let config = match &args.config {
        Some(path) => MapConfig::from_json_str(&read_to_string(path).await?)?,
        None => MapConfig::default(),
    };
    let geocoder = match &args.geocode_table {
        Some(path) => {
            let table: BTreeMap<String, LatLng> = serde_json::from_str(&read_to_string(path).await?)
                .map_err(|e| AppError::GeocodeTable(e.to_string()))?;
            TableGeocoder::new(table)
        }
        None => TableGeocoder::default(),
    };

    let bounds = match &args.bbox {
        Some(text) => parse_bbox(text)?,
        None => dataset_extent(&catalog).ok_or(AppError::EmptyDataset)?,
    };
    info!(
        studios = catalog.len(),
        geocoder_entries = geocoder.len(),
        zoom = args.zoom,
        "starting headless session"
    );

    let debounce_ms = config.debounce_ms;
    let mut map = MapController::new(HeadlessProvider::new(bounds, args.zoom), config);
    let mut now = Millis::ZERO;
    map.set_catalog(catalog, now);

    // A host fires one viewport change once the map has settled.
    now = now.after(debounce_ms);
    map.handle(MapEvent::ViewportChanged, now);
    now = now.after(debounce_ms);
    map.tick(now);

    let mut displayed = Vec::new();
    for round in 0..MAX_GEOCODE_ROUNDS {
        let requests = collect_events(&mut map, &mut displayed);
        if requests.is_empty() {
            break;
        }
        info!(round, requests = requests.len(), "resolving geocode requests");
        for outcome in resolve_all(&geocoder, &requests).await {
            map.handle(
                MapEvent::GeocodeResolved {
                    request: outcome.request,
                    result: outcome.result,
                },
                now,
            );
        }
        now = now.after(debounce_ms);
        map.tick(now);
    }

    if let Some(id) = args.hover {
        map.hover(Some(StudioId(id)));
    }
    if let Some(id) = args.select {
        let id = StudioId(id);
        if map.catalog().contains(id) {
            map.select(Some(id));
        } else {
            warn!(studio = id.0, "unknown studio, nothing selected");
        }
    }
    collect_events(&mut map, &mut displayed);

    Ok(summary(&map, bounds, &displayed))
}

/// Drains controller events, keeping the latest displayed list and
/// returning the geocode requests.
fn collect_events(
    map: &mut MapController<HeadlessProvider>,
    displayed: &mut Vec<(u64, String)>,
) -> Vec<GeocodeRequest> {
    let mut requests = Vec::new();
    for event in map.drain_events() {
        match event {
            ControllerEvent::DisplayedStudiosChanged(studios) => {
                *displayed = studios.into_iter().map(|s| (s.id.0, s.name)).collect();
            }
            ControllerEvent::GeocodeRequested(request) => requests.push(request),
            ControllerEvent::LoadingChanged(loading) => info!(loading, "loading indicator"),
            ControllerEvent::MarkerActivated { .. } | ControllerEvent::ListScrolled { .. } => {}
        }
    }
    requests
}

fn summary(
    map: &MapController<HeadlessProvider>,
    bounds: GeoBounds,
    displayed: &[(u64, String)],
) -> serde_json::Value {
    let provider = map.provider();
    let mut cards = Vec::new();
    let mut dots = Vec::new();
    for (key, marker) in provider.markers() {
        let entry = json!({
            "key": key.to_string(),
            "lat": marker.coord.lat,
            "lng": marker.coord.lng,
            "emphasis": format!("{:?}", marker.appearance.emphasis).to_lowercase(),
            "z_index": marker.appearance.z_index,
        });
        match marker.kind {
            Representation::Card => cards.push(entry),
            Representation::Dot => dots.push(entry),
        }
    }
    let labels: Vec<_> = provider
        .labels()
        .iter()
        .filter(|(_, label)| label.visible)
        .map(|(key, label)| json!({ "key": key.to_string(), "text": label.text, "z_index": label.z_index }))
        .collect();
    let metrics = map.metrics();
    let counters: serde_json::Map<String, serde_json::Value> = metrics
        .counters
        .iter()
        .map(|(name, value)| (name.to_string(), json!(value)))
        .collect();

    json!({
        "viewport": bounds,
        "zoom": map.viewport().map(|v| v.zoom),
        "cards": cards,
        "dots": dots,
        "visible_labels": labels,
        "displayed": displayed
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect::<Vec<_>>(),
        "selected": map.selection().selected().map(|id| id.0),
        "provider_writes": provider.writes(),
        "metrics": counters,
    })
}

async fn read_to_string(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_bbox(text: &str) -> Result<GeoBounds, AppError> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::Bbox(e.to_string()))?;
    let [min_lat, min_lng, max_lat, max_lng] = parts[..] else {
        return Err(AppError::Bbox(format!("expected 4 numbers, got {}", parts.len())));
    };
    if min_lat > max_lat || min_lng > max_lng {
        return Err(AppError::Bbox("min corner must not exceed max corner".to_string()));
    }
    Ok(GeoBounds::new(min_lat, min_lng, max_lat, max_lng))
}

/// Smallest bounds holding every located studio location.
fn dataset_extent(catalog: &StudioCatalog) -> Option<GeoBounds> {
    catalog
        .map_locations()
        .into_iter()
        .filter(|loc| loc.has_coord())
        .map(|loc| GeoBounds::from_corners(loc.coord, loc.coord))
        .reduce(|a, b| {
            GeoBounds::new(
                a.min_lat.min(b.min_lat),
                a.min_lng.min(b.min_lng),
                a.max_lat.max(b.max_lat),
                a.max_lng.max(b.max_lng),
            )
        })
}
