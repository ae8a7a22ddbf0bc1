//! Upstream daily weather: request shape, response decoding and the offline fallback.
//!
//! The upstream service returns one map per parameter, keyed by `YYYYMMDD`:
//!
//! ```json
//! { "header": { "fill_value": -999 },
//!   "properties": { "parameter": {
//!       "PRECTOTCORR": { "20240601": 1.4 },
//!       "T2M_MIN": { "20240601": 14.2 },
//!       "T2M_MAX": { "20240601": 27.9 } } } }
//! ```
use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{SimError, SimResult};
use crate::handoff::GeoPoint;
use crate::weather::RawDay;

pub const PARAM_PRECIPITATION: &str = "PRECTOTCORR";
pub const PARAM_TEMP_MIN: &str = "T2M_MIN";
pub const PARAM_TEMP_MAX: &str = "T2M_MAX";
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";
pub const DEFAULT_FILL_VALUE: f64 = -999.0;
pub const DEFAULT_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// Parameters for one upstream fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub parameters: Vec<String>,
}

impl UpstreamRequest {
    /// Request the three parameters the preprocessor needs for `days` days.
    #[must_use]
    pub fn for_season(point: GeoPoint, start: NaiveDate, days: u32) -> Self {
        let end = start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(start);
        Self {
            latitude: point.lat,
            longitude: point.lon,
            start,
            end,
            parameters: vec![
                PARAM_PRECIPITATION.to_string(),
                PARAM_TEMP_MIN.to_string(),
                PARAM_TEMP_MAX.to_string(),
            ],
        }
    }

    #[must_use]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Number of calendar days covered, inclusive.
    #[must_use]
    pub fn span_days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span.max(0)).unwrap_or(0)
    }

    /// Full query URL against `base_url`.
    #[must_use]
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}?parameters={}&community=AG&latitude={:.4}&longitude={:.4}\
             &start={}&end={}&format=JSON",
            base_url.trim_end_matches('?'),
            self.parameters.join(","),
            self.latitude,
            self.longitude,
            self.start.format(DATE_KEY_FORMAT),
            self.end.format(DATE_KEY_FORMAT)
        )
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    header: Option<UpstreamHeader>,
    properties: UpstreamProperties,
}

#[derive(Debug, Deserialize)]
struct UpstreamHeader {
    #[serde(default)]
    fill_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UpstreamProperties {
    #[serde(default)]
    parameter: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

/// Decode an upstream response body into a chronological raw series.
///
/// Missing keys, nulls and the fill sentinel all mean "no data"; precipitation
/// without data becomes 0. Unparseable date keys are skipped.
///
/// # Errors
///
/// Returns [`SimError::UpstreamDataUnavailable`] when the body is not a
/// response at all.
pub fn parse_upstream_response(body: &str) -> SimResult<Vec<RawDay>> {
    let response: UpstreamResponse = serde_json::from_str(body)
        .map_err(|e| SimError::UpstreamDataUnavailable(format!("unreadable response: {e}")))?;
    let fill = response
        .header
        .and_then(|h| h.fill_value)
        .unwrap_or(DEFAULT_FILL_VALUE);
    let params = &response.properties.parameter;

    let lookup = |name: &str, key: &str| -> Option<f64> {
        params
            .get(name)
            .and_then(|series| series.get(key))
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && (*v - fill).abs() > f64::EPSILON)
    };

    let date_keys: BTreeSet<&String> = params.values().flat_map(BTreeMap::keys).collect();
    let mut days = Vec::with_capacity(date_keys.len());
    for key in date_keys {
        let Ok(date) = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT) else {
            log::debug!("skipping unparseable upstream date key {key}");
            continue;
        };
        days.push(RawDay::new(
            date,
            Some(lookup(PARAM_PRECIPITATION, key).unwrap_or(0.0)),
            lookup(PARAM_TEMP_MIN, key),
            lookup(PARAM_TEMP_MAX, key),
        ));
    }
    days.sort_by_key(|d| d.date);
    Ok(days)
}

/// Deterministic synthetic series for when upstream data is unavailable.
///
/// Seeded from the coordinates so the same field always gets the same weather.
#[must_use]
pub fn fallback_series(point: GeoPoint, start: NaiveDate, days: u32) -> Vec<RawDay> {
    let seed = point.lat.to_bits().rotate_left(17) ^ point.lon.to_bits();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let warmth = 30.0 - point.lat.abs() * 0.35;

    (0..days)
        .filter_map(|offset| {
            let date = start.checked_add_days(Days::new(u64::from(offset)))?;
            let precipitation = if rng.gen_bool(0.35) {
                (rng.gen_range(0.2..18.0_f64) * 10.0).round() / 10.0
            } else {
                0.0
            };
            let t_max = warmth + rng.gen_range(-4.0..4.0);
            let t_min = t_max - rng.gen_range(6.0..14.0);
            Some(RawDay::new(
                date,
                Some(precipitation),
                Some((t_min * 10.0).round() / 10.0),
                Some((t_max * 10.0).round() / 10.0),
            ))
        })
        .collect()
}

/// Use the upstream result, or degrade to the fallback series with a warning.
///
/// Returns the series plus the error that triggered the fallback, if any, so
/// callers can show a dismissible notice.
#[must_use]
pub fn series_or_fallback(
    result: SimResult<Vec<RawDay>>,
    request: &UpstreamRequest,
) -> (Vec<RawDay>, Option<SimError>) {
    match result {
        Ok(series) if !series.is_empty() => (series, None),
        Ok(_) => {
            let err = SimError::UpstreamDataUnavailable("empty series".to_string());
            log::warn!("{err}; using fallback weather");
            (
                fallback_series(request.point(), request.start, request.span_days()),
                Some(err),
            )
        }
        Err(err) => {
            log::warn!("{err}; using fallback weather");
            (
                fallback_series(request.point(), request.start, request.span_days()),
                Some(err),
            )
        }
    }
}
