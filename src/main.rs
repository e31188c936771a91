// Weather Dashboard Engine - Main executable
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use log::info;

use weather_dashboard_engine::{
    data::{DataSink, DataSource, DatasetLoader, JsonSink, JsonSource, SyntheticSource},
    processing::{ChartKind, DerivedChartData, FilterUpdate, Selection},
    render::{ChartRenderer, Dashboard, FileRenderer, ImageFormat, RenderError},
    utils::{init_logging, Config},
};

/// Renderer for commands that only need the prepared data
struct Headless;

impl ChartRenderer for Headless {
    fn render(&mut self, _: &str, _: &DerivedChartData, _: ChartKind) -> Result<(), RenderError> {
        Ok(())
    }

    fn update(&mut self, _: &str, _: &DerivedChartData, _: ChartKind) -> Result<(), RenderError> {
        Ok(())
    }

    fn clear(&mut self, _: &str) -> Result<(), RenderError> {
        Ok(())
    }

    fn export_image(&self, container_id: &str, _: ImageFormat) -> Result<PathBuf, RenderError> {
        Err(RenderError::UnknownContainer(container_id.to_string()))
    }
}

fn filter_args() -> Vec<Arg<'static>> {
    vec![
        Arg::new("year")
            .long("year")
            .value_name("YEAR")
            .help("Only records of this year")
            .takes_value(true),
        Arg::new("month")
            .long("month")
            .value_name("MONTH")
            .help("Only records of this month (1-12)")
            .takes_value(true),
        Arg::new("country")
            .long("country")
            .value_name("COUNTRY")
            .help("Only records of this country")
            .takes_value(true),
        Arg::new("temp-min")
            .long("temp-min")
            .value_name("CELSIUS")
            .help("Lower temperature bound")
            .takes_value(true)
            .allow_hyphen_values(true),
        Arg::new("temp-max")
            .long("temp-max")
            .value_name("CELSIUS")
            .help("Upper temperature bound")
            .takes_value(true)
            .allow_hyphen_values(true),
        Arg::new("no-outliers")
            .long("no-outliers")
            .help("Remove temperature outliers (IQR rule)"),
    ]
}

fn cli() -> Command<'static> {
    Command::new("Weather Dashboard Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Aggregation and filter propagation for a weather dashboard")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Weather dataset (JSON array of records)")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            Command::new("summary")
                .about("Print statistics of the filtered data")
                .args(filter_args()),
        )
        .subcommand(
            Command::new("render")
                .about("Write the data of every chart as JSON documents")
                .args(filter_args())
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("DIR")
                        .help("Output directory")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("export-csv")
                .about("Export the filtered records as CSV")
                .args(filter_args())
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("FILE")
                        .help("CSV file to write")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Print a Markdown report of the filtered data")
                .args(filter_args())
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("FILE")
                        .help("Write the report to a file instead of stdout")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a synthetic weather dataset")
                .arg(
                    Arg::new("rows")
                        .short('n')
                        .long("rows")
                        .value_name("N")
                        .default_value("1000")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .default_value("42")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .value_name("FILE")
                        .help("JSON file to write")
                        .takes_value(true)
                        .required(true),
                ),
        )
}

fn parse_value<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .value_of(name)
        .map(|raw| raw.parse::<T>().map_err(|e| anyhow!("Invalid --{} '{}': {}", name, raw, e)))
        .transpose()
}

fn filter_update(matches: &ArgMatches, config: &Config) -> Result<FilterUpdate> {
    let mut update = FilterUpdate::default();

    if let Some(year) = parse_value::<i32>(matches, "year")? {
        update = update.year(Selection::Only(year));
    }
    if let Some(month) = parse_value::<u32>(matches, "month")? {
        update = update.month(Selection::Only(month));
    }
    if let Some(country) = matches.value_of("country") {
        update = update.country(Selection::Only(country.to_string()));
    }

    let temp_min = parse_value::<f64>(matches, "temp-min")?;
    let temp_max = parse_value::<f64>(matches, "temp-max")?;
    if temp_min.is_some() || temp_max.is_some() {
        update = update.temperature_range(
            temp_min.unwrap_or(config.filters.temp_min),
            temp_max.unwrap_or(config.filters.temp_max),
        );
    }

    if matches.is_present("no-outliers") {
        update = update.show_outliers(false);
    }

    Ok(update)
}

fn data_source(matches: &ArgMatches, config: &Config) -> Result<JsonSource> {
    let path = matches
        .value_of("input")
        .map(str::to_string)
        .or_else(|| config.data.source.clone())
        .ok_or_else(|| anyhow!("No dataset given; use --input or set data.source in the config"))?;

    Ok(match &config.data.array_path {
        Some(array_path) => JsonSource::with_array_path(path, array_path.as_str()),
        None => JsonSource::new(path),
    })
}

fn open_dashboard<R: ChartRenderer + 'static>(
    matches: &ArgMatches,
    config: &Config,
    renderer: R,
) -> Result<Dashboard<R>> {
    let source = data_source(matches, config)?;
    let mut dashboard = Dashboard::new(config, renderer);
    dashboard
        .load(&source)
        .with_context(|| format!("Could not load {}", source.name()))?;

    let update = filter_update(matches, config)?;
    if !update.is_empty() {
        dashboard.apply_filters_now(&update)?;
    }

    Ok(dashboard)
}

fn print_summary(dashboard: &Dashboard<Headless>) {
    let coordinator = dashboard.coordinator();
    let stats = coordinator.weather_stats();
    let diagnostics = coordinator.stats();

    println!("Records: {} of {}", diagnostics.filtered_size, diagnostics.dataset_size);
    println!("Filters: {}", coordinator.filters().describe());
    println!("Countries: {}", stats.total_countries);
    if let Some(range) = &stats.temperature_range {
        println!("Temperature range: {:.1}°C to {:.1}°C", range.min, range.max);
    }
    println!("Average temperature: {:.1}°C", stats.avg_temperature);
    println!("Average humidity: {:.1}%", stats.avg_humidity);

    if !stats.top_conditions.is_empty() {
        println!("Top conditions:");
        for condition in &stats.top_conditions {
            println!("  {:<30} {}", condition.condition, condition.count);
        }
    }

    println!("Charts:");
    for output in &coordinator.charts().outputs {
        match &output.result {
            Ok(_) => println!("  {:<18} ok", output.container_id),
            Err(err) => println!("  {:<18} skipped ({})", output.container_id, err),
        }
    }

    for recommendation in coordinator.recommendations() {
        println!("Hint: {}", recommendation.message);
    }
}

fn generate(matches: &ArgMatches, config: &Config) -> Result<()> {
    let rows = parse_value::<usize>(matches, "rows")?.unwrap_or(1000);
    let seed = parse_value::<u64>(matches, "seed")?.unwrap_or(42);
    let out = matches.value_of("out").ok_or_else(|| anyhow!("--out is required"))?;

    let source = SyntheticSource::new(seed, rows);
    let dataset = DatasetLoader::new()
        .with_min_rows_warning(config.data.min_rows_warning)
        .load(&source)?;
    JsonSink::new(out, true).write(&dataset.records)?;

    println!("{} synthetic weather records written to {}", dataset.len(), out);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let config = match matches.value_of("config") {
        Some(config_path) => Config::from_file(config_path)
            .with_context(|| format!("Error loading config file {}", config_path))?,
        None => Config::default(),
    };

    // Initialize logging
    let log_file = config.logging.file.as_deref().map(Path::new);
    if let Err(err) = init_logging(config.log_level_filter(), log_file) {
        eprintln!("Error initializing logger: {}", err);
    }

    match matches.subcommand() {
        Some(("summary", sub)) => {
            let dashboard = open_dashboard(sub, &config, Headless)?;
            print_summary(&dashboard);
        },
        Some(("render", sub)) => {
            let dir = sub
                .value_of("out")
                .map(PathBuf::from)
                .unwrap_or_else(|| config.output_dir());
            let renderer = FileRenderer::new(&dir)?;
            let dashboard = open_dashboard(sub, &config, renderer)?;

            let written = dashboard.renderer().rendered().count();
            info!("{} chart documents written to {}", written, dir.display());
            println!("{} chart documents written to {}", written, dir.display());
        },
        Some(("export-csv", sub)) => {
            let out = sub.value_of("out").ok_or_else(|| anyhow!("--out is required"))?;
            let dashboard = open_dashboard(sub, &config, Headless)?;
            let rows = dashboard.export_csv(out)?;
            println!("{} records exported to {}", rows, out);
        },
        Some(("report", sub)) => {
            let dashboard = open_dashboard(sub, &config, Headless)?;
            let report = dashboard.report();
            match sub.value_of("out") {
                Some(out) => {
                    fs::write(out, report).with_context(|| format!("Could not write {}", out))?;
                    println!("Report written to {}", out);
                },
                None => print!("{}", report),
            }
        },
        Some(("generate", sub)) => generate(sub, &config)?,
        _ => bail!("No subcommand specified. Use --help for usage information."),
    }

    Ok(())
}
