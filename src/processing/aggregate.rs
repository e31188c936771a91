// Group-by aggregations feeding each chart
// Author: Gabriel Demetrios Lafis

use std::collections::{BTreeMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::data::RecordRef;
use super::region::RegionPolicy;

pub const DEFAULT_TOP_CONDITIONS: usize = 8;
pub const DEFAULT_SAMPLES_PER_CONDITION: usize = 200;
pub const DEFAULT_FUNNEL_TOP: usize = 7;
pub const DEFAULT_COUNTRIES_PER_BAND: usize = 20;
pub const DEFAULT_CHORD_CONDITIONS: usize = 5;

/// Root label of the treemap
pub const TREEMAP_ROOT: &str = "World";

/// Axis labels of a radar profile, in value order
pub const RADAR_AXES: [&str; 5] = ["Temperature", "Humidity", "Pressure", "Wind", "UV"];

/// Running sum and count for an average
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Frequency of each condition label, most frequent first.
///
/// Ties keep the order in which conditions first appear.
pub fn condition_counts(records: &[RecordRef]) -> Vec<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for record in records {
        *counts.entry(record.condition_label()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter()
        .map(|(condition, count)| (condition.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Monthly average temperature and humidity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub label: String,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub count: usize,
}

/// One entry per month present, ordered by month number
pub fn monthly_averages(records: &[RecordRef]) -> Vec<MonthlyAverage> {
    let mut months: BTreeMap<u32, (Accumulator, Accumulator)> = BTreeMap::new();

    for record in records {
        let (temperature, humidity) = months.entry(record.month_or_default()).or_default();
        temperature.add(record.temperature_or_zero());
        humidity.add(record.humidity_or_zero());
    }

    months.into_iter()
        .map(|(month, (temperature, humidity))| MonthlyAverage {
            month,
            label: format!("Mes {}", month),
            avg_temperature: temperature.mean(),
            avg_humidity: humidity.mean(),
            count: temperature.count,
        })
        .collect()
}

/// Kind of a waterfall bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterfallMeasure {
    Absolute,
    Relative,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallBar {
    pub label: String,
    pub value: f64,
    pub measure: WaterfallMeasure,
}

/// Quarter-over-quarter temperature changes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaterfallSeries {
    /// Average temperature of Q1..Q4; 0 for a quarter with no records
    pub quarterly_averages: Vec<f64>,
    pub bars: Vec<WaterfallBar>,
}

/// Waterfall of quarterly averages.
///
/// The first bar is the Q1 average, the next three are signed changes
/// from the previous quarter and the last is the mean of all four.
pub fn quarterly_waterfall(records: &[RecordRef]) -> WaterfallSeries {
    if records.is_empty() {
        return WaterfallSeries::default();
    }

    let mut quarters = [Accumulator::default(); 4];
    for record in records {
        let quarter = record.quarter_or_derived();
        if (1..=4).contains(&quarter) {
            quarters[quarter as usize - 1].add(record.temperature_or_zero());
        }
    }

    let averages: Vec<f64> = quarters.iter().map(Accumulator::mean).collect();

    let mut bars = Vec::with_capacity(5);
    for (i, average) in averages.iter().enumerate() {
        let (value, measure) = if i == 0 {
            (*average, WaterfallMeasure::Absolute)
        } else {
            (average - averages[i - 1], WaterfallMeasure::Relative)
        };
        bars.push(WaterfallBar {
            label: format!("Q{}", i + 1),
            value,
            measure,
        });
    }

    bars.push(WaterfallBar {
        label: "Total".to_string(),
        value: averages.iter().sum::<f64>() / 4.0,
        measure: WaterfallMeasure::Total,
    });

    WaterfallSeries {
        quarterly_averages: averages,
        bars,
    }
}

/// Temperature band of a country's average temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TemperatureBand {
    VeryCold,
    Cold,
    Temperate,
    Warm,
    VeryWarm,
}

impl TemperatureBand {
    pub const ALL: [TemperatureBand; 5] = [
        TemperatureBand::VeryCold,
        TemperatureBand::Cold,
        TemperatureBand::Temperate,
        TemperatureBand::Warm,
        TemperatureBand::VeryWarm,
    ];

    pub fn from_temperature(celsius: f64) -> Self {
        if celsius < 0.0 {
            TemperatureBand::VeryCold
        } else if celsius < 10.0 {
            TemperatureBand::Cold
        } else if celsius < 20.0 {
            TemperatureBand::Temperate
        } else if celsius < 30.0 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::VeryWarm
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureBand::VeryCold => "Very Cold",
            TemperatureBand::Cold => "Cold",
            TemperatureBand::Temperate => "Temperate",
            TemperatureBand::Warm => "Warm",
            TemperatureBand::VeryWarm => "Very Warm",
        }
    }
}

/// A treemap node; the root has an empty parent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub id: String,
    pub label: String,
    pub parent: String,
    pub value: usize,
}

/// Flattened World → band → country hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hierarchy {
    pub nodes: Vec<TreemapNode>,
}

impl Hierarchy {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children_of(&self, id: &str) -> impl Iterator<Item = &TreemapNode> {
        let id = id.to_string();
        self.nodes.iter().filter(move |n| n.parent == id)
    }
}

/// Countries grouped by the band of their average temperature.
///
/// Band values count every country in the band; only the first
/// `per_band` countries of a band get a leaf.
pub fn treemap_hierarchy(records: &[RecordRef], per_band: usize) -> Hierarchy {
    if records.is_empty() {
        return Hierarchy::default();
    }

    let mut countries: IndexMap<&str, Accumulator> = IndexMap::new();
    for record in records {
        countries.entry(record.country_label())
            .or_default()
            .add(record.temperature_or_zero());
    }

    let mut bands: BTreeMap<TemperatureBand, Vec<(&str, f64)>> = BTreeMap::new();
    for (country, temperature) in &countries {
        let average = temperature.mean();
        bands.entry(TemperatureBand::from_temperature(average))
            .or_default()
            .push((*country, average));
    }

    let mut nodes = vec![TreemapNode {
        id: TREEMAP_ROOT.to_string(),
        label: TREEMAP_ROOT.to_string(),
        parent: String::new(),
        value: countries.len(),
    }];

    for band in TemperatureBand::ALL {
        let members = match bands.get(&band) {
            Some(members) => members,
            None => continue,
        };

        nodes.push(TreemapNode {
            id: band.label().to_string(),
            label: band.label().to_string(),
            parent: TREEMAP_ROOT.to_string(),
            value: members.len(),
        });

        for (country, average) in members.iter().take(per_band) {
            nodes.push(TreemapNode {
                id: format!("{}/{}", band.label(), country),
                label: format!("{} ({:.1}°C)", country, average),
                parent: band.label().to_string(),
                value: 1,
            });
        }
    }

    Hierarchy { nodes }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

/// Node-link graph; link ends index into `nodes`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<String>,
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == label)
    }
}

/// Region → condition flow weighted by record count.
///
/// Nodes and links appear in first-encountered order.
pub fn sankey_flow(records: &[RecordRef], policy: RegionPolicy) -> FlowGraph {
    let mut nodes: IndexSet<String> = IndexSet::new();
    let mut links: IndexMap<(usize, usize), usize> = IndexMap::new();

    for record in records {
        let region = policy.region_of(record.country.as_deref());
        let (source, _) = nodes.insert_full(region.to_string());
        let (target, _) = nodes.insert_full(record.condition_label().to_string());
        *links.entry((source, target)).or_insert(0) += 1;
    }

    FlowGraph {
        nodes: nodes.into_iter().collect(),
        links: links.into_iter()
            .map(|((source, target), value)| FlowLink { source, target, value })
            .collect(),
    }
}

/// Temperatures of one condition with their tooltips
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSample {
    pub condition: String,
    pub temperatures: Vec<f64>,
    pub tooltips: Vec<String>,
}

/// Leading records of the `top_k` most frequent conditions.
///
/// Each condition keeps its first `cap` records in dataset order.
pub fn sample_by_top_conditions(records: &[RecordRef], top_k: usize, cap: usize) -> Vec<ConditionSample> {
    condition_counts(records)
        .into_iter()
        .take(top_k)
        .map(|(condition, _)| {
            let sample: Vec<&RecordRef> = records.iter()
                .filter(|r| r.condition_label() == condition)
                .take(cap)
                .collect();

            ConditionSample {
                temperatures: sample.iter().map(|r| r.temperature_or_zero()).collect(),
                tooltips: sample.iter()
                    .map(|r| {
                        format!(
                            "{}<br>Temp: {}°C<br>Humidity: {}%",
                            r.country_label(),
                            display_reading(r.temperature_celsius),
                            display_reading(r.humidity)
                        )
                    })
                    .collect(),
                condition,
            }
        })
        .collect()
}

fn display_reading(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => "N/A".to_string(),
    }
}

/// Per-country averages for the choropleth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryAggregate {
    pub country: String,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub record_count: usize,
    pub tooltip: String,
}

/// Countries in first-encountered order
pub fn aggregate_by_country(records: &[RecordRef]) -> Vec<CountryAggregate> {
    let mut countries: IndexMap<&str, (Accumulator, Accumulator)> = IndexMap::new();
    for record in records {
        let (temperature, humidity) = countries.entry(record.country_label()).or_default();
        temperature.add(record.temperature_or_zero());
        humidity.add(record.humidity_or_zero());
    }

    countries.into_iter()
        .map(|(country, (temperature, humidity))| {
            let avg_temperature = temperature.mean();
            let avg_humidity = humidity.mean();
            CountryAggregate {
                country: country.to_string(),
                avg_temperature,
                avg_humidity,
                record_count: temperature.count,
                tooltip: format!(
                    "{}<br>Temp: {:.1}°C<br>Humidity: {:.1}%<br>Records: {}",
                    country, avg_temperature, avg_humidity, temperature.count
                ),
            }
        })
        .collect()
}

/// Parallel count and label sequences, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunnelSeries {
    pub counts: Vec<usize>,
    pub labels: Vec<String>,
}

impl FunnelSeries {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

pub fn rank_conditions_for_funnel(records: &[RecordRef], top_n: usize) -> FunnelSeries {
    let (labels, counts) = condition_counts(records).into_iter().take(top_n).unzip();
    FunnelSeries { counts, labels }
}

/// Normalized climate profile of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarProfile {
    pub region: String,
    /// Temperature, humidity/100*50, (pressure-1000)/10, wind, uv*5
    pub values: [f64; 5],
}

/// Regions in first-encountered order
pub fn regional_radar_profiles(records: &[RecordRef], policy: RegionPolicy) -> Vec<RadarProfile> {
    let mut regions: IndexMap<&'static str, [Accumulator; 5]> = IndexMap::new();

    for record in records {
        let metrics = regions.entry(policy.region_of(record.country.as_deref())).or_default();
        metrics[0].add(record.temperature_or_zero());
        metrics[1].add(record.humidity_or_zero());
        metrics[2].add(record.pressure_or_zero());
        metrics[3].add(record.wind_or_zero());
        metrics[4].add(record.uv_or_zero());
    }

    regions.into_iter()
        .map(|(region, metrics)| RadarProfile {
            region: region.to_string(),
            values: [
                metrics[0].mean(),
                metrics[1].mean() / 100.0 * 50.0,
                (metrics[2].mean() - 1000.0) / 10.0,
                metrics[3].mean(),
                metrics[4].mean() * 5.0,
            ],
        })
        .collect()
}

/// Co-occurrence of the most frequent conditions across countries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChordMatrix {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

impl ChordMatrix {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Entry `[i][j]` counts the countries reporting both condition i and j.
///
/// The diagonal is zero.
pub fn condition_chord(records: &[RecordRef], top_n: usize) -> ChordMatrix {
    let labels: Vec<String> = condition_counts(records)
        .into_iter()
        .take(top_n)
        .map(|(condition, _)| condition)
        .collect();

    let countries: Vec<HashSet<&str>> = labels.iter()
        .map(|condition| {
            records.iter()
                .filter(|r| r.condition_label() == condition)
                .map(|r| r.country_label())
                .collect()
        })
        .collect();

    let size = labels.len();
    let mut matrix = vec![vec![0; size]; size];
    for i in 0..size {
        for j in 0..size {
            if i != j {
                matrix[i][j] = countries[i].intersection(&countries[j]).count();
            }
        }
    }

    ChordMatrix { labels, matrix }
}
