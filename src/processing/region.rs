// Country to region classification
// Author: Gabriel Demetrios Lafis

use serde::{Deserialize, Serialize};

const EUROPE: &[&str] = &[
    "Albania", "Andorra", "Austria", "Belgium", "Bulgaria", "Croatia", "Cyprus", "Czech Republic",
    "Denmark", "Estonia", "Finland", "France", "Germany", "Greece", "Hungary", "Iceland", "Ireland",
    "Italy", "Latvia", "Lithuania", "Luxembourg", "Malta", "Netherlands", "Norway", "Poland",
    "Portugal", "Romania", "Slovakia", "Slovenia", "Spain", "Sweden", "Switzerland", "United Kingdom",
];

const ASIA: &[&str] = &[
    "Afghanistan", "Armenia", "Azerbaijan", "Bahrain", "Bangladesh", "Bhutan", "Brunei", "Cambodia",
    "China", "Georgia", "India", "Indonesia", "Iran", "Iraq", "Israel", "Japan", "Jordan",
    "Kazakhstan", "Kuwait", "Kyrgyzstan", "Laos", "Lebanon", "Malaysia", "Maldives", "Mongolia",
    "Myanmar", "Nepal", "North Korea", "Oman", "Pakistan", "Philippines", "Qatar", "Russia",
    "Saudi Arabia", "Singapore", "South Korea", "Sri Lanka", "Syria", "Taiwan", "Tajikistan",
    "Thailand", "Turkey", "Turkmenistan", "United Arab Emirates", "Uzbekistan", "Vietnam", "Yemen",
];

const AFRICA: &[&str] = &[
    "Algeria", "Angola", "Benin", "Botswana", "Burkina Faso", "Burundi", "Cameroon", "Cape Verde",
    "Central African Republic", "Chad", "Comoros", "Democratic Republic of the Congo",
    "Republic of the Congo", "Djibouti", "Egypt", "Equatorial Guinea", "Eritrea", "Ethiopia",
    "Gabon", "Gambia", "Ghana", "Guinea", "Guinea-Bissau", "Ivory Coast", "Kenya", "Lesotho",
    "Liberia", "Libya", "Madagascar", "Malawi", "Mali", "Mauritania", "Mauritius", "Morocco",
    "Mozambique", "Namibia", "Niger", "Nigeria", "Rwanda", "Sao Tome and Principe", "Senegal",
    "Seychelles", "Sierra Leone", "Somalia", "South Africa", "South Sudan", "Sudan", "Swaziland",
    "Tanzania", "Togo", "Tunisia", "Uganda", "Zambia", "Zimbabwe",
];

const NORTH_AMERICA: &[&str] = &["Canada", "United States", "Mexico"];

const SOUTH_AMERICA: &[&str] = &[
    "Argentina", "Bolivia", "Brazil", "Chile", "Colombia", "Ecuador", "Guyana", "Paraguay", "Peru",
    "Suriname", "Uruguay", "Venezuela",
];

const OCEANIA: &[&str] = &[
    "Australia", "Fiji", "New Zealand", "Papua New Guinea", "Solomon Islands", "Vanuatu",
];

/// Fallback region for countries not in any table
pub const OTHER_REGION: &str = "Other";

/// How countries are grouped into regions.
///
/// The flow chart and the radar profile deliberately use different
/// granularity for the Americas, so each has its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionPolicy {
    /// North America and South America are separate regions
    Continental,
    /// North and South America form a single "Americas" region
    MergedAmericas,
}

impl RegionPolicy {
    /// Region name for a country, `"Other"` when unknown or missing
    pub fn region_of(&self, country: Option<&str>) -> &'static str {
        let country = match country {
            Some(country) => country,
            None => return OTHER_REGION,
        };

        self.tables()
            .iter()
            .find(|(_, countries)| countries.iter().any(|c| *c == country))
            .map_or(OTHER_REGION, |(region, _)| *region)
    }

    /// Region names in lookup order, excluding the fallback
    pub fn regions(&self) -> Vec<&'static str> {
        self.tables().iter().map(|(region, _)| *region).collect()
    }

    fn tables(&self) -> Vec<(&'static str, &'static [&'static str])> {
        match self {
            RegionPolicy::Continental => vec![
                ("Europe", EUROPE),
                ("Asia", ASIA),
                ("Africa", AFRICA),
                ("North America", NORTH_AMERICA),
                ("South America", SOUTH_AMERICA),
                ("Oceania", OCEANIA),
            ],
            RegionPolicy::MergedAmericas => vec![
                ("Europe", EUROPE),
                ("Asia", ASIA),
                ("Africa", AFRICA),
                ("Americas", AMERICAS),
                ("Oceania", OCEANIA),
            ],
        }
    }
}

const AMERICAS: &[&str] = &[
    "Canada", "United States", "Mexico", "Argentina", "Bolivia", "Brazil", "Chile", "Colombia",
    "Ecuador", "Guyana", "Paraguay", "Peru", "Suriname", "Uruguay", "Venezuela",
];
