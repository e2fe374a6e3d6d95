//! FRED API integration for downloading a single observation series
//! (e.g. `PERMIT`, `PERMITNSA`, `HOUST`).

use chrono::NaiveDate;
use log::info;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch observations in ascending date order.
    ///
    /// Value tokens are returned as FRED sends them (`.` marks a missing value).
    pub fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<(NaiveDate, String)>, AppError> {
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", &self.api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", &OBS_LIMIT.to_string()),
        ]);

        if let Some(date) = start {
            req = req.query(&[("observation_start", &date.to_string())]);
        }
        if let Some(date) = end {
            req = req.query(&[("observation_end", &date.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("FRED request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response: {e}")))?;

        let out = parse_observations(body)?;
        if out.is_empty() {
            return Err(AppError::new(
                4,
                format!("No observations returned for series {series_id}."),
            ));
        }
        info!("fetched {} observations for {series_id}", out.len());
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(body: ObservationsResponse) -> Result<Vec<(NaiveDate, String)>, AppError> {
    let mut out = Vec::with_capacity(body.observations.len());
    for obs in body.observations {
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
        out.push((date, obs.value.trim().to_string()));
    }
    out.sort_by_key(|(d, _)| *d);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_keep_missing_markers_and_sort() {
        let body: ObservationsResponse = serde_json::from_str(
            r#"{"observations":[
                {"realtime_start":"2024-07-24","date":"1960-02-01","value":"."},
                {"realtime_start":"2024-07-24","date":"1960-01-01","value":"1092"}
            ]}"#,
        )
        .unwrap();

        let obs = parse_observations(body).unwrap();
        assert_eq!(obs[0], (NaiveDate::from_ymd_opt(1960, 1, 1).unwrap(), "1092".to_string()));
        assert_eq!(obs[1].1, ".");
    }

    #[test]
    fn invalid_dates_are_errors() {
        let body: ObservationsResponse =
            serde_json::from_str(r#"{"observations":[{"date":"1960/01/01","value":"1"}]}"#).unwrap();
        let err = parse_observations(body).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
