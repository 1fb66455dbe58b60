use std::fmt::Write;
use std::fs::File;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use clap::builder::styling::Styles;
use clap::{Args, ColorChoice, Parser, Subcommand, crate_version};
use clap_cargo::style::{ERROR, HEADER, INVALID, LITERAL, PLACEHOLDER, USAGE, VALID};
use regex::Regex;
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug, info, instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, fmt};
use turnbyturn::internal::{catalog_report, route_report};
use turnbyturn::{
    Degrees, DirectionsOptions, GeoPoint, GeoSegment, KilometersPerHour, RouteError, TravelMode,
    TurnByTurnError, catalog, plan_directions,
};

pub const CLAP_STYLING: Styles = Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);

static LONG_VERSION: LazyLock<String> =
    LazyLock::new(|| format!("{} (rustc {})", crate_version!(), env!("RUSTC_VERSION")));

/// Turn-by-turn directions along routes of named streets
///
/// Assembles a route from street segments, picked from the built-in catalog
/// or given explicitly, and prints driving and walking directions for it.
#[derive(Parser)]
#[command(
    name = "turnbyturn",
    version,
    long_version = LONG_VERSION.as_str(),
    about,
    color = ColorChoice::Auto,
    styles = CLAP_STYLING,
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Configure diagnostic logging level
    ///
    /// Set to DEBUG to see a span summary following execution.
    #[clap(long, short = 'L', default_value_t = Level::ERROR)]
    log_level: Level,

    /// Log to a file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DirectionsArgs {
    /// Segments to traverse, in order
    ///
    /// Each is either a catalog index, as shown by the `list` command, or an
    /// explicit segment written as NAME:LAT,LON:LAT,LON in decimal degrees.
    /// A segment may be given in either direction as long as one of its ends
    /// touches the end of the route so far.
    #[clap(required = true, num_args = 1..)]
    segments: Vec<String>,

    /// Heading in degrees the traveller faces before starting out
    #[clap(long, short = 'H', default_value_t = 0.0, allow_negative_numbers = true)]
    heading: f64,

    /// Print only the directions for this mode of travel
    ///
    /// Both driving and walking directions are printed if unspecified.
    #[clap(long, short)]
    mode: Option<TravelMode>,

    /// Walking speed in kilometers per hour, used to estimate walking times
    #[clap(long, short, default_value = "3.0")]
    walking_speed: f64,

    /// Print a summary of the assembled route before the directions
    #[clap(long, action)]
    summary: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in catalog of street segments
    List,

    /// Print directions along a route
    ///
    /// Appends the given segments one after another, then prints directions
    /// with one line per street: the turn onto it, and how far to drive or
    /// how long to walk along it.
    Directions(DirectionsArgs),
}

/// Resolve a command line segment argument.
fn resolve_segment(spec: &str, re: &Regex) -> Result<GeoSegment> {
    if let Ok(index) = spec.parse::<usize>() {
        return catalog::segment(index)?.ok_or_else(|| {
            anyhow!("No catalog segment with index {index}. Run the `list` command to see them.")
        });
    }

    let caps = re.captures(spec).ok_or_else(|| {
        anyhow!("Could not parse segment {spec:?}. Expected a catalog index or NAME:LAT,LON:LAT,LON")
    })?;
    let coord = |name: &str| -> Result<Degrees<f64>> {
        let value = caps
            .name(name)
            .ok_or_else(|| anyhow!("Did not get a {name} match"))?
            .as_str()
            .parse::<f64>()
            .with_context(|| format!("Parsing {name} of segment {spec:?}"))?;
        Ok(Degrees(value))
    };
    let p1 = GeoPoint::from_degrees(coord("lat1")?, coord("lon1")?)
        .with_context(|| format!("Invalid start point in segment {spec:?}"))?;
    let p2 = GeoPoint::from_degrees(coord("lat2")?, coord("lon2")?)
        .with_context(|| format!("Invalid end point in segment {spec:?}"))?;
    let name = caps.name("name").map(|m| m.as_str().trim()).unwrap_or("");
    GeoSegment::new(name, p1, p2).with_context(|| format!("Invalid segment {spec:?}"))
}

#[instrument(level = "trace", skip_all)]
fn directions_cmd(sub_args: &DirectionsArgs) -> Result<String> {
    debug!("directions args: {:?}", sub_args);

    if !sub_args.heading.is_finite() {
        bail!("Heading must be a finite number of degrees");
    }

    let num = r"-?\d+(?:\.\d+)?";
    let re = Regex::new(&format!(
        r"^(?P<name>[^:]+):(?P<lat1>{num}),(?P<lon1>{num}):(?P<lat2>{num}),(?P<lon2>{num})$"
    ))?;
    let segments = sub_args
        .segments
        .iter()
        .map(|spec| resolve_segment(spec.trim(), &re))
        .collect::<Result<Vec<_>>>()?;
    info!("Resolved {} segments", segments.len());

    let options = DirectionsOptions::default()
        .with_initial_heading(Degrees(sub_args.heading))
        .with_walking_speed(KilometersPerHour(sub_args.walking_speed))
        .context("Invalid --walking-speed")?;

    let res = plan_directions(segments, options);
    let directions = match &res {
        Err(TurnByTurnError::Route(RouteError::Disconnected { .. })) => res.context(concat!(
            "A segment does not connect to the end of the route built so far. ",
            "Check that the <SEGMENTS> are listed in the order they are travelled."
        )),

        _ => res.map_err(anyhow::Error::from),
    }?;

    let mut r = String::new();
    if sub_args.summary {
        writeln!(&mut r, "{}", route_report(&directions.route)?)?;
    }
    match sub_args.mode {
        Some(mode) => r.push_str(directions.for_mode(mode)),
        None => {
            writeln!(&mut r, "Driving:\n{}", directions.driving)?;
            write!(&mut r, "Walking:\n{}", directions.walking)?;
        }
    }
    Ok(r)
}

fn list_cmd() -> Result<String> {
    Ok(catalog_report()?)
}

fn main() -> Result<()> {
    // Intentionally avoid wrapping argument parsing errors in anyhow::Result so
    // we preserve Clap's pretty formatting of usage info.
    let args = Cli::parse();

    let log_w: Box<dyn std::io::Write + Send> = match &args.log_file {
        Some(path) => Box::new(File::create(path).context("Creating the log file")?),
        None => Box::new(std::io::stderr()),
    };
    let (appender, _guard) = tracing_appender::non_blocking(log_w);

    // Enable the TRACE-level span tree layer for fmt logging level DEBUG.
    let fmt_layer = fmt::Layer::new()
        .with_writer(appender)
        .with_ansi(args.log_file.is_none())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .with_filter(LevelFilter::from_level(args.log_level));
    if args.log_level >= Level::DEBUG {
        let span_tree_layer = tracing_span_tree::SpanTree::default().aggregate(true);
        tracing::subscriber::set_global_default(
            Registry::default().with(fmt_layer).with(span_tree_layer),
        )?;
    } else {
        tracing::subscriber::set_global_default(Registry::default().with(fmt_layer))?;
    }

    debug!("turnbyturn {}", crate_version!());

    let report = match &args.cmd {
        Commands::List => list_cmd(),
        Commands::Directions(sub_args) => directions_cmd(sub_args),
    }?;

    print!("{report}");
    Ok(())
}
