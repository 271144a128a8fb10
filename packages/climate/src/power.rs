//! NASA POWER daily point API client.
//!
//! One request covers a single coordinate and an inclusive date range and
//! returns every requested parameter keyed by `YYYYMMDD`:
//!
//! ```text
//! { "properties": { "parameter": { "T2M": { "20240101": 12.3, ... }, ... } } }
//! ```
//!
//! Missing observations are encoded with the fill value `-999`, which is
//! dropped while parsing so it behaves exactly like an absent key.
//!
//! See <https://power.larc.nasa.gov/docs/services/api/temporal/daily/>

use std::str::FromStr as _;

use async_trait::async_trait;
use chrono::NaiveDate;
use weathering_climate_models::ClimateParameter;

use crate::service_registry::{self, ProviderService};
use crate::{ClimateError, ClimateProvider, ClimateRequest, ParameterTable, retry};

/// Date format used for request ranges and response keys.
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// Value the provider substitutes for missing observations.
pub const FILL_VALUE: f64 = -999.0;

/// Client for the NASA POWER daily point endpoint.
#[derive(Debug, Clone)]
pub struct PowerClient {
    client: reqwest::Client,
    service: ProviderService,
}

impl PowerClient {
    /// Creates a client for the given service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Http`] if the HTTP client cannot be built.
    pub fn new(service: ProviderService) -> Result<Self, ClimateError> {
        let client = reqwest::Client::builder()
            .timeout(service.timeout())
            .user_agent(concat!("weathering/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, service })
    }

    /// Creates a client from the embedded NASA POWER configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError`] if the configuration is missing or the HTTP
    /// client cannot be built.
    pub fn from_registry() -> Result<Self, ClimateError> {
        let service = service_registry::service(service_registry::NASA_POWER).ok_or_else(|| {
            ClimateError::Malformed {
                message: format!("no '{}' service registered", service_registry::NASA_POWER),
            }
        })?;
        Self::new(service)
    }

    /// The service configuration this client uses.
    #[must_use]
    pub const fn service(&self) -> &ProviderService {
        &self.service
    }
}

#[async_trait]
impl ClimateProvider for PowerClient {
    fn id(&self) -> &str {
        &self.service.id
    }

    async fn fetch_daily(&self, request: &ClimateRequest) -> Result<ParameterTable, ClimateError> {
        let params = query_params(&self.service, request);

        log::debug!(
            "POWER request ({:.4}, {:.4}) {}..{}",
            request.latitude,
            request.longitude,
            request.start,
            request.end
        );

        let body = retry::send_json(
            || self.client.get(&self.service.base_url).query(&params),
            self.service.max_retries,
        )
        .await?;

        parse_response(&body)
    }
}

/// Builds the query string for a daily point request.
fn query_params(service: &ProviderService, request: &ClimateRequest) -> Vec<(&'static str, String)> {
    let parameters = ClimateParameter::all()
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("parameters", parameters),
        ("community", service.community.clone()),
        ("longitude", format!("{:.4}", request.longitude)),
        ("latitude", format!("{:.4}", request.latitude)),
        ("start", request.start.format(DATE_KEY_FORMAT).to_string()),
        ("end", request.end.format(DATE_KEY_FORMAT).to_string()),
        ("format", "JSON".to_string()),
    ]
}

/// Parses the per-parameter, per-date mapping out of a POWER response.
///
/// Unknown parameters, unparseable date keys, non-numeric values and fill
/// values are skipped.
fn parse_response(body: &serde_json::Value) -> Result<ParameterTable, ClimateError> {
    let parameters = body["properties"]["parameter"]
        .as_object()
        .ok_or_else(|| ClimateError::Malformed {
            message: "Missing properties.parameter object".to_string(),
        })?;

    let mut table = ParameterTable::new();

    for (code, series) in parameters {
        let Ok(parameter) = ClimateParameter::from_str(code) else {
            log::debug!("Ignoring unrequested parameter {code}");
            continue;
        };
        let Some(series) = series.as_object() else {
            continue;
        };

        for (key, value) in series {
            let Ok(date) = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT) else {
                continue;
            };
            let Some(value) = value.as_f64() else {
                continue;
            };
            if (value - FILL_VALUE).abs() < f64::EPSILON {
                continue;
            }
            table.insert(parameter, date, value);
        }
    }

    Ok(table)
}
