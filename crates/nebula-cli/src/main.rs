use nebula::export::AnalysisOut;
use nebula::{DrillDown, InteractionState, PipelineConfig, detect_schema};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Nebula(nebula::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Nebula(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<nebula::Error> for CliError {
    fn from(value: nebula::Error) -> Self {
        Self::Nebula(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Analyze,
    Detect,
    Subgraph,
    Search,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    verbose: bool,
    no_crop: bool,
    seed: Option<u64>,
    resolution: Option<f64>,
    config: Option<String>,
    community: Option<String>,
    depth: usize,
    query: Option<String>,
}

fn usage() -> &'static str {
    "nebula-cli\n\
\n\
USAGE:\n\
  nebula-cli [analyze] [--pretty] [--no-crop] [--seed <n>] [--resolution <r>] [--config <path>] [--verbose] [<path>|-]\n\
  nebula-cli detect [<path>|-]\n\
  nebula-cli subgraph --community <id> [--depth <n>] [--pretty] [analyze options] [<path>|-]\n\
  nebula-cli search --query <q> [--pretty] [analyze options] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - analyze prints the analysed graph (graphology JSON) with community/modularity details.\n\
  - detect prints `gephi` or `native`.\n\
  - subgraph drills into one cluster; --depth is the depth of the input graph (default 0).\n\
  - --verbose logs pipeline stages to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "analyze" => args.command = Command::Analyze,
            "detect" => args.command = Command::Detect,
            "subgraph" => args.command = Command::Subgraph,
            "search" => args.command = Command::Search,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--no-crop" => args.no_crop = true,
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--resolution" => {
                let Some(r) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let r = r.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(r.is_finite() && r > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.resolution = Some(r);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--community" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.community = Some(id.clone());
            }
            "--depth" => {
                let Some(depth) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.depth = depth.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--query" => {
                let Some(q) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.query = Some(q.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    match args.command {
        Command::Subgraph if args.community.is_none() => Err(CliError::Usage(usage())),
        Command::Search if args.query.is_none() => Err(CliError::Usage(usage())),
        _ => Ok(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(args: &Args) -> Result<PipelineConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => PipelineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => PipelineConfig::default(),
    };
    if args.no_crop {
        config.crop_to_largest_component = false;
    }
    if let Some(seed) = args.seed {
        config.color_seed = seed;
    }
    if let Some(r) = args.resolution {
        config.resolution = r;
    }
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DepthExceededOut {
    depth_exceeded: bool,
    depth: usize,
    max_depth: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOut<'a> {
    query: &'a str,
    selected_node: Option<&'a str>,
    suggestions: Vec<SearchHit<'a>>,
}

#[derive(Serialize)]
struct SearchHit<'a> {
    key: &'a str,
    label: &'a str,
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Detect => {
            let value: Value = serde_json::from_str(&text)?;
            println!("{}", detect_schema(&value));
            Ok(())
        }
        Command::Analyze => {
            let config = load_config(&args)?;
            let analysis = nebula::analyze_str(&text, &config)?;
            write_json(&AnalysisOut::from(&analysis), args.pretty)
        }
        Command::Subgraph => {
            let config = load_config(&args)?;
            let analysis = nebula::analyze_str(&text, &config)?;
            let cluster = args.community.as_deref().unwrap_or_default();
            match nebula::drill_down(&analysis, cluster, args.depth, config.max_depth, &config)? {
                DrillDown::Extracted(sub) => write_json(&AnalysisOut::from(sub.as_ref()), args.pretty),
                DrillDown::DepthExceeded => write_json(
                    &DepthExceededOut {
                        depth_exceeded: true,
                        depth: args.depth,
                        max_depth: config.max_depth,
                    },
                    args.pretty,
                ),
            }
        }
        Command::Search => {
            let config = load_config(&args)?;
            let analysis = nebula::analyze_str(&text, &config)?;
            let query = args.query.as_deref().unwrap_or_default();
            let mut state = InteractionState::new();
            state.set_search_query(&analysis.graph, query);

            let label = |key: &str| {
                analysis
                    .graph
                    .node(key)
                    .map(|n| n.label.as_str())
                    .unwrap_or_default()
            };
            let suggestions = state
                .suggestions
                .iter()
                .flatten()
                .map(|key| SearchHit {
                    key,
                    label: label(key),
                })
                .collect();
            write_json(
                &SearchOut {
                    query,
                    selected_node: state.selected_node.as_deref(),
                    suggestions,
                },
                args.pretty,
            )
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("nebula-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_to_analyze_from_stdin() {
        let a = parse_args(&argv(&[])).unwrap();
        assert!(matches!(a.command, Command::Analyze));
        assert_eq!(a.input, None);
    }

    #[test]
    fn subgraph_requires_a_community() {
        assert!(matches!(
            parse_args(&argv(&["subgraph", "g.json"])),
            Err(CliError::Usage(_))
        ));
        let a = parse_args(&argv(&["subgraph", "--community", "2", "--depth", "1", "g.json"]))
            .unwrap();
        assert_eq!(a.community.as_deref(), Some("2"));
        assert_eq!(a.depth, 1);
        assert_eq!(a.input.as_deref(), Some("g.json"));
    }

    #[test]
    fn rejects_bad_numbers_and_unknown_flags() {
        for bad in [
            &["--seed", "x"][..],
            &["--resolution", "0"][..],
            &["--frobnicate"][..],
            &["a.json", "b.json"][..],
        ] {
            assert!(matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))));
        }
    }
}
