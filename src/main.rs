use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use facroute::{Edge, Facility, Filter, Graph, KDTree, MatchOptions, Matcher, Metric, Node};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum ScenarioLoadError {
    #[error("{0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("{0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("{0}: {1}")]
    Graph(PathBuf, #[source] facroute::MalformedGraph),
}

#[derive(Parser)]
struct Cli {
    /// The path to the JSON scenario with nodes, edges, sources and destinations
    scenario: PathBuf,

    /// Only consider destinations with the given attribute, as KEY=VALUE
    #[arg(long, value_parser = parse_filter)]
    filter: Option<(String, String)>,

    /// Treat coordinates as longitude/latitude and snap by great-circle distance
    #[arg(long)]
    haversine: bool,

    /// Maximum number of node expansions for a single source
    #[arg(long, default_value_t = facroute::DEFAULT_STEP_LIMIT)]
    step_limit: usize,

    /// Process sources one after another
    #[arg(long)]
    sequential: bool,

    /// Increase logging verbosity (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}

#[derive(Deserialize)]
struct Scenario {
    #[serde(default = "default_directed")]
    directed: bool,
    nodes: Vec<ScenarioNode>,
    edges: Vec<ScenarioEdge>,
    sources: Vec<ScenarioFacility>,
    destinations: Vec<ScenarioFacility>,
}

fn default_directed() -> bool {
    true
}

#[derive(Deserialize)]
struct ScenarioNode {
    id: i64,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ScenarioEdge {
    from: i64,
    to: i64,
    length: f64,
    name: Option<String>,
    #[serde(default)]
    geometry: Vec<(f64, f64)>,
}

#[derive(Deserialize)]
struct ScenarioFacility {
    id: i64,
    x: f64,
    y: f64,
    #[serde(default)]
    attributes: HashMap<String, String>,
}

impl From<ScenarioFacility> for Facility {
    fn from(f: ScenarioFacility) -> Self {
        Facility {
            id: f.id,
            x: f.x,
            y: f.y,
            attributes: f.attributes,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    };
    colog::default_builder().filter_level(level).init();

    let (g, sources, destinations) = load_scenario(&cli.scenario)?;

    let metric = if cli.haversine {
        Metric::Haversine
    } else {
        Metric::Euclidean
    };
    let locator = KDTree::from_graph(&g, metric);

    let filter = match cli.filter {
        Some((key, value)) => Filter::Equals { key, value },
        None => Filter::All,
    };

    let mut options = MatchOptions::default();
    options.search.step_limit = cli.step_limit;
    options.parallel = !cli.sequential;

    let results = Matcher::new(&g, &locator)
        .with_options(options)
        .match_all(&sources, &destinations, &filter);

    let features: Vec<_> = results
        .iter()
        .filter_map(|r| {
            let destination = r.destination()?;
            let route = r.route()?;
            let roads: Vec<String> = route
                .road_names(&g)
                .into_iter()
                .map(|name| name.as_deref().unwrap_or("Unnamed Road").to_string())
                .collect();
            Some(json!({
                "type": "Feature",
                "properties": {
                    "source": r.source.label(),
                    "destination": destination.label(),
                    "cost": route.cost,
                    "length": route.length(metric),
                    "roads": roads,
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": route
                        .coordinates
                        .iter()
                        .map(|&(x, y)| [x, y])
                        .collect::<Vec<_>>(),
                },
            }))
        })
        .collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    println!("{}", serde_json::to_string_pretty(&collection)?);

    Ok(())
}

fn load_scenario<P: AsRef<Path>>(
    path: P,
) -> Result<(Graph, Vec<Facility>, Vec<Facility>), ScenarioLoadError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| ScenarioLoadError::Io(path.to_path_buf(), e))?;
    let scenario: Scenario = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| ScenarioLoadError::Json(path.to_path_buf(), e))?;

    let nodes = scenario
        .nodes
        .into_iter()
        .map(|n| Node { id: n.id, x: n.x, y: n.y });
    let edges = scenario.edges.into_iter().map(|e| {
        let mut edge = Edge::new(e.to, e.length).with_geometry(e.geometry);
        edge.name = e.name.map(Into::into);
        (e.from, edge)
    });

    let g = if scenario.directed {
        Graph::build(nodes, edges)
    } else {
        Graph::build_undirected(nodes, edges)
    }
    .map_err(|e| ScenarioLoadError::Graph(path.to_path_buf(), e))?;

    log::info!(
        "loaded {}: {} nodes, {} edges, {} sources, {} destinations",
        path.display(),
        g.len(),
        g.edge_count(),
        scenario.sources.len(),
        scenario.destinations.len(),
    );

    Ok((
        g,
        scenario.sources.into_iter().map(Facility::from).collect(),
        scenario.destinations.into_iter().map(Facility::from).collect(),
    ))
}
