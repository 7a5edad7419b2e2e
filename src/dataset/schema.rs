use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the modeled target column.
pub const TARGET: &str = "mpg";

/// One row of the auto-mpg table.
///
/// Numeric fields are optional: blank cells, `?` placeholders and anything else that does
/// not parse as a number load as `None` and are imputed later. `car_name` is an identifier
/// and never modeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    #[serde(deserialize_with = "csv::invalid_option")]
    pub mpg: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub cylinders: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub displacement: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub horsepower: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub acceleration: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub model_year: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub origin: Option<f64>,
    #[serde(default)]
    pub car_name: String,
}

/// The numeric columns available as regression features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Cylinders,
    Displacement,
    Horsepower,
    Weight,
    Acceleration,
    ModelYear,
    Origin,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Cylinders,
        Feature::Displacement,
        Feature::Horsepower,
        Feature::Weight,
        Feature::Acceleration,
        Feature::ModelYear,
        Feature::Origin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Cylinders => "cylinders",
            Feature::Displacement => "displacement",
            Feature::Horsepower => "horsepower",
            Feature::Weight => "weight",
            Feature::Acceleration => "acceleration",
            Feature::ModelYear => "model_year",
            Feature::Origin => "origin",
        }
    }

    pub fn value(&self, record: &CarRecord) -> Option<f64> {
        match self {
            Feature::Cylinders => record.cylinders,
            Feature::Displacement => record.displacement,
            Feature::Horsepower => record.horsepower,
            Feature::Weight => record.weight,
            Feature::Acceleration => record.acceleration,
            Feature::ModelYear => record.model_year,
            Feature::Origin => record.origin,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_header(s);
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == key)
            .ok_or_else(|| anyhow::anyhow!("unknown feature '{}'", s))
    }
}

/// Lower-cases a header and maps spaces and dashes to underscores, so `Model Year`,
/// `model-year` and `model_year` all name the same column. The short forms `year` and
/// `name` map to `model_year` and `car_name`.
pub fn normalize_header(raw: &str) -> String {
    let key: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    match key.as_str() {
        "year" => "model_year".to_string(),
        "name" => "car_name".to_string(),
        _ => key,
    }
}

/// Header names every input file must provide, after normalization.
pub(crate) fn required_columns() -> impl Iterator<Item = &'static str> {
    std::iter::once(TARGET).chain(Feature::ALL.iter().map(|f| f.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Model Year "), "model_year");
        assert_eq!(normalize_header("car-name"), "car_name");
        assert_eq!(normalize_header("MPG"), "mpg");
        assert_eq!(normalize_header("Year"), "model_year");
        assert_eq!(normalize_header("name"), "car_name");
    }

    #[test]
    fn test_feature_parsing() {
        assert_eq!("Model Year".parse::<Feature>().unwrap(), Feature::ModelYear);
        assert_eq!("year".parse::<Feature>().unwrap(), Feature::ModelYear);
        assert_eq!("weight".parse::<Feature>().unwrap(), Feature::Weight);
        assert!("car_name".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_value_lookup() {
        let record = CarRecord {
            horsepower: Some(130.0),
            ..Default::default()
        };
        assert_eq!(Feature::Horsepower.value(&record), Some(130.0));
        assert_eq!(Feature::Weight.value(&record), None);
    }
}
