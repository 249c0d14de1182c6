use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// Unstructured posting as emitted by the scrapers. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJobRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_from: Option<SalaryField>,
    #[serde(default)]
    pub salary: Option<SalaryField>,
    #[serde(default)]
    pub salary_to: Option<SalaryField>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub remote_work: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub publish_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expiration_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employment_type: Option<String>,
}

/// Salary as scraped: either a number or free text such as `"From 2500 €"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalaryField {
    Amount(f64),
    Text(String),
}

impl SalaryField {
    pub(crate) fn amount(&self) -> Option<i64> {
        match self {
            SalaryField::Amount(value) if value.is_finite() && *value >= 0.0 => {
                Some(value.round() as i64)
            }
            SalaryField::Amount(_) => None,
            SalaryField::Text(text) => {
                let range = super::salary::parse_salary_text(text);
                range.min.or(range.max)
            }
        }
    }
}

/// Failure reading a scraper export.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read job export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid job CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a JSON array of raw records, the scrapers' dump format.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawJobRecord>, SourceError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a CSV export whose header row uses the raw record key names.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawJobRecord>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<RawJobRecord>() {
        records.push(record?);
    }

    Ok(records)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseScalar>::deserialize(deserializer)?;
    Ok(value
        .map(|scalar| match scalar {
            LooseScalar::Text(text) => text,
            LooseScalar::Integer(number) => number.to_string(),
            LooseScalar::Float(number) => number.to_string(),
            LooseScalar::Flag(flag) => flag.to_string(),
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty() && !text.eq_ignore_ascii_case("null")))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseScalar>::deserialize(deserializer)?;
    Ok(value.and_then(|scalar| match scalar {
        LooseScalar::Flag(flag) => Some(flag),
        LooseScalar::Integer(number) => Some(number != 0),
        LooseScalar::Float(number) => Some(number != 0.0),
        LooseScalar::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "jah" => Some(true),
            "false" | "no" | "0" | "ei" => Some(false),
            _ => None,
        },
    }))
}
