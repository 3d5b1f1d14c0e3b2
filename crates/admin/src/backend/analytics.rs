//! Analytics endpoints: summary totals, sales series, status distribution.
//!
//! All aggregation happens server-side; the portal passes the selected range
//! through and renders whatever comes back.

use chrono::NaiveDate;

use pappi_core::RestaurantId;

use super::types::{AnalyticsSummary, SalesPoint, StatusSlice};
use super::{BackendClient, BackendError};

/// Selected dashboard time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Today,
    Week,
    Month,
    Year,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimeRange {
    /// Parse the dashboard query parameters.
    ///
    /// Falls back to `Month` when the range is missing or malformed, and to
    /// `Month` when a custom range lacks either bound - the dashboard always
    /// renders something.
    #[must_use]
    pub fn from_query(range: Option<&str>, start: Option<&str>, end: Option<&str>) -> Self {
        match range {
            Some("today") => Self::Today,
            Some("week") => Self::Week,
            Some("year") => Self::Year,
            Some("custom") => {
                let parsed_start = start.and_then(|s| s.parse::<NaiveDate>().ok());
                let parsed_end = end.and_then(|s| s.parse::<NaiveDate>().ok());
                match (parsed_start, parsed_end) {
                    (Some(start), Some(end)) => Self::Custom { start, end },
                    _ => Self::Month,
                }
            }
            _ => Self::Month,
        }
    }

    /// The `range` query-parameter value.
    #[must_use]
    pub const fn as_param(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Custom { .. } => "custom",
        }
    }

    /// Query parameters for the analytics endpoints.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("range", self.as_param().to_string())];
        if let Self::Custom { start, end } = self {
            params.push(("start", start.to_string()));
            params.push(("end", end.to_string()));
        }
        params
    }
}

impl BackendClient {
    /// Fetch aggregate totals for a restaurant over a range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn analytics_summary(
        &self,
        restaurant_id: RestaurantId,
        range: &TimeRange,
    ) -> Result<AnalyticsSummary, BackendError> {
        let response = self
            .get(&format!("/menu/analytics/summary/{restaurant_id}"))
            .query(&range.query_params())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetch the sales time series for a restaurant over a range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sales_chart(
        &self,
        restaurant_id: RestaurantId,
        range: &TimeRange,
    ) -> Result<Vec<SalesPoint>, BackendError> {
        let response = self
            .get(&format!("/menu/analytics/sales-chart/{restaurant_id}"))
            .query(&range.query_params())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetch the order-status distribution for a restaurant over a range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn status_distribution(
        &self,
        restaurant_id: RestaurantId,
        range: &TimeRange,
    ) -> Result<Vec<StatusSlice>, BackendError> {
        let response = self
            .get(&format!("/menu/analytics/status-distribution/{restaurant_id}"))
            .query(&range.query_params())
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_named_ranges() {
        assert_eq!(TimeRange::from_query(Some("today"), None, None), TimeRange::Today);
        assert_eq!(TimeRange::from_query(Some("week"), None, None), TimeRange::Week);
        assert_eq!(TimeRange::from_query(Some("year"), None, None), TimeRange::Year);
        assert_eq!(TimeRange::from_query(Some("month"), None, None), TimeRange::Month);
        assert_eq!(TimeRange::from_query(None, None, None), TimeRange::Month);
        assert_eq!(TimeRange::from_query(Some("bogus"), None, None), TimeRange::Month);
    }

    #[test]
    fn test_from_query_custom() {
        let range = TimeRange::from_query(Some("custom"), Some("2025-01-01"), Some("2025-01-31"));
        match range {
            TimeRange::Custom { start, end } => {
                assert_eq!(start.to_string(), "2025-01-01");
                assert_eq!(end.to_string(), "2025-01-31");
            }
            other => panic!("unexpected range: {other:?}"),
        }
    }

    #[test]
    fn test_from_query_custom_missing_bound_falls_back() {
        assert_eq!(
            TimeRange::from_query(Some("custom"), Some("2025-01-01"), None),
            TimeRange::Month
        );
        assert_eq!(
            TimeRange::from_query(Some("custom"), None, Some("2025-01-31")),
            TimeRange::Month
        );
    }

    #[test]
    fn test_query_params() {
        let params = TimeRange::Week.query_params();
        assert_eq!(params, vec![("range", "week".to_string())]);

        let custom = TimeRange::from_query(Some("custom"), Some("2025-02-01"), Some("2025-02-28"));
        let params = custom.query_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], ("range", "custom".to_string()));
        assert_eq!(params[1], ("start", "2025-02-01".to_string()));
        assert_eq!(params[2], ("end", "2025-02-28".to_string()));
    }
}
