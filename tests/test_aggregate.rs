// Aggregation tests
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use weather_dashboard_engine::{
    data::{RecordRef, WeatherRecord},
    processing::{
        aggregate_by_country, condition_chord, condition_counts, monthly_averages, quarterly_waterfall,
        rank_conditions_for_funnel, regional_radar_profiles, sample_by_top_conditions, sankey_flow,
        treemap_hierarchy, RegionPolicy, WaterfallMeasure, OTHER_REGION, TREEMAP_ROOT,
    },
};

fn record(country: &str, condition: &str, temperature: f64, humidity: f64, month: f64) -> RecordRef {
    Arc::new(WeatherRecord {
        country: Some(country.to_string()),
        condition_text: Some(condition.to_string()),
        temperature_celsius: Some(temperature),
        humidity: Some(humidity),
        month: Some(month),
        ..WeatherRecord::default()
    })
}

fn sample() -> Vec<RecordRef> {
    vec![
        record("Brazil", "Sunny", 30.0, 70.0, 1.0),
        record("Brazil", "Rain", 24.0, 90.0, 4.0),
        record("France", "Cloudy", 8.0, 80.0, 1.0),
        record("France", "Sunny", 22.0, 50.0, 7.0),
        record("Japan", "Rain", 15.0, 85.0, 10.0),
        record("Canada", "Snow", -12.0, 60.0, 1.0),
        record("Japan", "Sunny", 26.0, 65.0, 7.0),
    ]
}

#[test]
fn test_condition_counts_ties_keep_first_appearance() {
    let counts = condition_counts(&sample());

    assert_eq!(counts[0], ("Sunny".to_string(), 3));
    assert_eq!(counts[1], ("Rain".to_string(), 2));
    assert_eq!(counts[2], ("Cloudy".to_string(), 1));
    assert_eq!(counts[3], ("Snow".to_string(), 1));
}

#[test]
fn test_monthly_averages_are_ordered_by_month() {
    let months = monthly_averages(&sample());

    let numbers: Vec<u32> = months.iter().map(|m| m.month).collect();
    assert_eq!(numbers, vec![1, 4, 7, 10]);

    let january = &months[0];
    assert_eq!(january.label, "Mes 1");
    assert_eq!(january.count, 3);
    assert!((january.avg_temperature - 26.0 / 3.0).abs() < 1e-9);
    assert!((january.avg_humidity - 70.0).abs() < 1e-9);
}

#[test]
fn test_missing_humidity_counts_as_zero() {
    let records = vec![
        record("Chile", "Clear", 10.0, 80.0, 2.0),
        Arc::new(WeatherRecord {
            country: Some("Chile".to_string()),
            temperature_celsius: Some(20.0),
            month: Some(2.0),
            ..WeatherRecord::default()
        }),
    ];

    let months = monthly_averages(&records);
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].month, 2);
    assert!((months[0].avg_temperature - 15.0).abs() < 1e-9);
    assert!((months[0].avg_humidity - 40.0).abs() < 1e-9);
}

#[test]
fn test_quarterly_waterfall() {
    let series = quarterly_waterfall(&sample());

    assert_eq!(series.quarterly_averages.len(), 4);
    assert_eq!(series.bars.len(), 5);
    assert_eq!(series.bars[0].measure, WaterfallMeasure::Absolute);
    assert_eq!(series.bars[4].measure, WaterfallMeasure::Total);
    assert_eq!(series.bars[4].label, "Total");

    // Q1 absolute plus the three deltas lands on the Q4 average
    let q4: f64 = series.bars[..4].iter().map(|b| b.value).sum();
    assert!((q4 - series.quarterly_averages[3]).abs() < 1e-9);

    let total = series.quarterly_averages.iter().sum::<f64>() / 4.0;
    assert!((series.bars[4].value - total).abs() < 1e-9);

    assert!(quarterly_waterfall(&[]).bars.is_empty());
}

#[test]
fn test_treemap_hierarchy() {
    let hierarchy = treemap_hierarchy(&sample(), 20);

    let root = &hierarchy.nodes[0];
    assert_eq!(root.id, TREEMAP_ROOT);
    assert_eq!(root.parent, "");
    assert_eq!(root.value, 4);

    let bands: Vec<&str> = hierarchy.children_of(TREEMAP_ROOT).map(|n| n.id.as_str()).collect();
    assert_eq!(bands, vec!["Very Cold", "Temperate", "Warm"]);

    let warm: Vec<&str> = hierarchy.children_of("Warm").map(|n| n.label.as_str()).collect();
    assert_eq!(warm, vec!["Brazil (27.0°C)", "Japan (20.5°C)"]);

    let temperate: Vec<&str> = hierarchy.children_of("Temperate").map(|n| n.id.as_str()).collect();
    assert_eq!(temperate, vec!["Temperate/France"]);
    assert_eq!(hierarchy.nodes.iter().find(|n| n.id == "Warm").unwrap().value, 2);

    assert!(treemap_hierarchy(&[], 20).is_empty());
}

#[test]
fn test_sankey_flow() {
    let graph = sankey_flow(&sample(), RegionPolicy::Continental);

    assert_eq!(graph.nodes[0], "South America");
    assert_eq!(graph.nodes[1], "Sunny");

    let asia = graph.node_index("Asia").unwrap();
    let rain = graph.node_index("Rain").unwrap();
    let link = graph.links.iter().find(|l| l.source == asia && l.target == rain).unwrap();
    assert_eq!(link.value, 1);

    let total: usize = graph.links.iter().map(|l| l.value).sum();
    assert_eq!(total, 7);
}

#[test]
fn test_region_policies_differ_on_the_americas() {
    assert_eq!(RegionPolicy::Continental.region_of(Some("Brazil")), "South America");
    assert_eq!(RegionPolicy::Continental.region_of(Some("Canada")), "North America");
    assert_eq!(RegionPolicy::MergedAmericas.region_of(Some("Brazil")), "Americas");
    assert_eq!(RegionPolicy::MergedAmericas.region_of(Some("Canada")), "Americas");
    assert_eq!(RegionPolicy::Continental.region_of(Some("Atlantis")), OTHER_REGION);
    assert_eq!(RegionPolicy::Continental.region_of(None), OTHER_REGION);
}

#[test]
fn test_swarm_samples_are_capped() {
    let samples = sample_by_top_conditions(&sample(), 2, 2);

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].condition, "Sunny");
    assert_eq!(samples[0].temperatures, vec![30.0, 22.0]);
    assert_eq!(samples[0].tooltips[0], "Brazil<br>Temp: 30°C<br>Humidity: 70%");
    assert_eq!(samples[1].condition, "Rain");
}

#[test]
fn test_swarm_groups_missing_conditions_as_unknown() {
    let records = vec![Arc::new(WeatherRecord {
        country: Some("Chile".to_string()),
        ..WeatherRecord::default()
    })];

    let samples = sample_by_top_conditions(&records, 8, 200);
    assert_eq!(samples[0].condition, "Unknown");
    assert_eq!(samples[0].temperatures, vec![0.0]);
    assert_eq!(samples[0].tooltips[0], "Chile<br>Temp: N/A°C<br>Humidity: N/A%");
}

#[test]
fn test_aggregate_by_country() {
    let countries = aggregate_by_country(&sample());

    let names: Vec<&str> = countries.iter().map(|c| c.country.as_str()).collect();
    assert_eq!(names, vec!["Brazil", "France", "Japan", "Canada"]);

    let brazil = &countries[0];
    assert_eq!(brazil.record_count, 2);
    assert!((brazil.avg_temperature - 27.0).abs() < 1e-9);
    assert_eq!(brazil.tooltip, "Brazil<br>Temp: 27.0°C<br>Humidity: 80.0%<br>Records: 2");
}

#[test]
fn test_funnel_top_n() {
    let funnel = rank_conditions_for_funnel(&sample(), 2);

    assert_eq!(funnel.labels, vec!["Sunny", "Rain"]);
    assert_eq!(funnel.counts, vec![3, 2]);
    assert!(rank_conditions_for_funnel(&[], 7).is_empty());
}

#[test]
fn test_radar_profiles() {
    let records = vec![Arc::new(WeatherRecord {
        country: Some("Germany".to_string()),
        temperature_celsius: Some(10.0),
        humidity: Some(80.0),
        pressure_mb: Some(1020.0),
        wind_kph: Some(12.0),
        uv_index: Some(3.0),
        ..WeatherRecord::default()
    })];

    let profiles = regional_radar_profiles(&records, RegionPolicy::MergedAmericas);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].region, "Europe");
    let expected = [10.0, 40.0, 2.0, 12.0, 15.0];
    for (value, expected) in profiles[0].values.iter().zip(expected) {
        assert!((value - expected).abs() < 1e-9);
    }
}

#[test]
fn test_condition_chord_counts_shared_countries() {
    let chord = condition_chord(&sample(), 5);

    assert_eq!(chord.labels, vec!["Sunny", "Rain", "Cloudy", "Snow"]);
    // Sunny and Rain both occur in Brazil and Japan
    assert_eq!(chord.matrix[0][1], 2);
    assert_eq!(chord.matrix[1][0], 2);
    // Sunny and Cloudy share France
    assert_eq!(chord.matrix[0][2], 1);
    assert_eq!(chord.matrix[3][0], 0);
    assert!((0..4).all(|i| chord.matrix[i][i] == 0));
}
