// Chart kinds and the data shapes derived for them
// Author: Gabriel Demetrios Lafis

use std::fmt;

use serde::{Deserialize, Serialize};

use super::aggregate::{
    ChordMatrix, ConditionSample, CountryAggregate, FlowGraph, FunnelSeries, Hierarchy,
    MonthlyAverage, RadarProfile, WaterfallSeries,
};
use super::density::DensityCurve;
use super::pareto::ParetoSeries;
use super::stats::CorrelationMatrix;

/// The charts of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Combined,
    Waterfall,
    Treemap,
    Sankey,
    Swarm,
    Geo,
    Funnel,
    Radar,
    Heatmap,
    Ribbon,
    Pareto,
    Density,
}

impl ChartKind {
    pub const ALL: [ChartKind; 12] = [
        ChartKind::Combined,
        ChartKind::Waterfall,
        ChartKind::Treemap,
        ChartKind::Sankey,
        ChartKind::Swarm,
        ChartKind::Geo,
        ChartKind::Funnel,
        ChartKind::Radar,
        ChartKind::Heatmap,
        ChartKind::Ribbon,
        ChartKind::Pareto,
        ChartKind::Density,
    ];

    /// Container the chart is drawn into by default
    pub fn container_id(&self) -> &'static str {
        match self {
            ChartKind::Combined => "combined-chart",
            ChartKind::Waterfall => "waterfall-chart",
            ChartKind::Treemap => "treemap-chart",
            ChartKind::Sankey => "sankey-chart",
            ChartKind::Swarm => "swarm-chart",
            ChartKind::Geo => "geo-chart",
            ChartKind::Funnel => "funnel-chart",
            ChartKind::Radar => "radar-chart",
            ChartKind::Heatmap => "heatmap-chart",
            ChartKind::Ribbon => "ribbon-chart",
            ChartKind::Pareto => "pareto-chart",
            ChartKind::Density => "kde-chart",
        }
    }

    pub fn from_container_id(container_id: &str) -> Option<ChartKind> {
        ChartKind::ALL.iter().copied().find(|k| k.container_id() == container_id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Combined => "combined",
            ChartKind::Waterfall => "waterfall",
            ChartKind::Treemap => "treemap",
            ChartKind::Sankey => "sankey",
            ChartKind::Swarm => "swarm",
            ChartKind::Geo => "geo",
            ChartKind::Funnel => "funnel",
            ChartKind::Radar => "radar",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Ribbon => "ribbon",
            ChartKind::Pareto => "pareto",
            ChartKind::Density => "density",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Data prepared for one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DerivedChartData {
    Combined(Vec<MonthlyAverage>),
    Waterfall(WaterfallSeries),
    Treemap(Hierarchy),
    Sankey(FlowGraph),
    Swarm(Vec<ConditionSample>),
    Geo(Vec<CountryAggregate>),
    Funnel(FunnelSeries),
    Radar(Vec<RadarProfile>),
    Heatmap(CorrelationMatrix),
    Ribbon(ChordMatrix),
    Pareto(ParetoSeries),
    Density(DensityCurve),
}

impl DerivedChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            DerivedChartData::Combined(_) => ChartKind::Combined,
            DerivedChartData::Waterfall(_) => ChartKind::Waterfall,
            DerivedChartData::Treemap(_) => ChartKind::Treemap,
            DerivedChartData::Sankey(_) => ChartKind::Sankey,
            DerivedChartData::Swarm(_) => ChartKind::Swarm,
            DerivedChartData::Geo(_) => ChartKind::Geo,
            DerivedChartData::Funnel(_) => ChartKind::Funnel,
            DerivedChartData::Radar(_) => ChartKind::Radar,
            DerivedChartData::Heatmap(_) => ChartKind::Heatmap,
            DerivedChartData::Ribbon(_) => ChartKind::Ribbon,
            DerivedChartData::Pareto(_) => ChartKind::Pareto,
            DerivedChartData::Density(_) => ChartKind::Density,
        }
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        match self {
            DerivedChartData::Combined(months) => months.is_empty(),
            DerivedChartData::Waterfall(series) => series.bars.is_empty(),
            DerivedChartData::Treemap(hierarchy) => hierarchy.is_empty(),
            DerivedChartData::Sankey(graph) => graph.is_empty(),
            DerivedChartData::Swarm(samples) => samples.is_empty(),
            DerivedChartData::Geo(countries) => countries.is_empty(),
            DerivedChartData::Funnel(funnel) => funnel.is_empty(),
            DerivedChartData::Radar(profiles) => profiles.is_empty(),
            DerivedChartData::Heatmap(matrix) => matrix.is_empty(),
            DerivedChartData::Ribbon(chord) => chord.is_empty(),
            DerivedChartData::Pareto(series) => series.is_empty(),
            DerivedChartData::Density(curve) => curve.is_empty(),
        }
    }

    /// Whether every number in the data is finite
    pub fn is_finite(&self) -> bool {
        fn all(values: &[f64]) -> bool {
            values.iter().all(|v| v.is_finite())
        }

        match self {
            DerivedChartData::Combined(months) => months.iter()
                .all(|m| m.avg_temperature.is_finite() && m.avg_humidity.is_finite()),
            DerivedChartData::Waterfall(series) => {
                all(&series.quarterly_averages) && series.bars.iter().all(|b| b.value.is_finite())
            },
            DerivedChartData::Treemap(_) | DerivedChartData::Sankey(_) => true,
            DerivedChartData::Funnel(_) | DerivedChartData::Ribbon(_) => true,
            DerivedChartData::Swarm(samples) => samples.iter().all(|s| all(&s.temperatures)),
            DerivedChartData::Geo(countries) => countries.iter()
                .all(|c| c.avg_temperature.is_finite() && c.avg_humidity.is_finite()),
            DerivedChartData::Radar(profiles) => profiles.iter().all(|p| all(&p.values)),
            DerivedChartData::Heatmap(matrix) => matrix.values.iter().all(|row| all(row)),
            DerivedChartData::Pareto(series) => {
                all(&series.values) && all(&series.percentages) && all(&series.cumulative)
            },
            DerivedChartData::Density(curve) => all(&curve.x) && all(&curve.y),
        }
    }
}
