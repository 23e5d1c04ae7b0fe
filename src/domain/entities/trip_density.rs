use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Timestamp layout the trips endpoint expects, e.g. `2024-03-01T08:00:00.000`.
pub const TRIP_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDensity {
    pub location_id: i64,
    pub density: u64,
}

// ───── Query ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct TripDensityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(range(max = 23, message = "Start hour must be between 0 and 23"))]
    pub start_time: u8,

    #[validate(range(max = 23, message = "End hour must be between 0 and 23"))]
    pub end_time: u8,
}

fn validate_date_order(query: &TripDensityQuery) -> Result<(), ValidationError> {
    if query.start_date > query.end_date {
        let mut error = ValidationError::new("date_order");
        error.message = Some("Start date must not be after end date".into());
        return Err(error);
    }
    Ok(())
}

impl TripDensityQuery {
    fn at_hour(date: NaiveDate, hour: u8) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(u32::from(hour), 0, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }

    /// Query parameters in the remote API's naming.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "startDate",
                Self::at_hour(self.start_date, self.start_time)
                    .format(TRIP_DATETIME_FORMAT)
                    .to_string(),
            ),
            (
                "endDate",
                Self::at_hour(self.end_date, self.end_time)
                    .format(TRIP_DATETIME_FORMAT)
                    .to_string(),
            ),
            ("startTime", self.start_time.to_string()),
            ("endTime", self.end_time.to_string()),
        ]
    }
}

// ───── Heatmap ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityBucket {
    Low,
    Moderate,
    Elevated,
    High,
    VeryHigh,
}

impl DensityBucket {
    pub fn from_density(density: u64) -> Self {
        match density {
            d if d > 10_000 => DensityBucket::VeryHigh,
            d if d > 5_000 => DensityBucket::High,
            d if d > 2_000 => DensityBucket::Elevated,
            d if d > 1_000 => DensityBucket::Moderate,
            _ => DensityBucket::Low,
        }
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            DensityBucket::VeryHigh => "#800026",
            DensityBucket::High => "#BD0026",
            DensityBucket::Elevated => "#E31A1C",
            DensityBucket::Moderate => "#FC4E2A",
            DensityBucket::Low => "#FFEDA0",
        }
    }
}

/// Map-layer style for one taxi zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStyle {
    pub fill_color: &'static str,
    pub weight: u8,
    pub opacity: f32,
    pub color: &'static str,
    pub dash_array: &'static str,
    pub fill_opacity: f32,
}

impl RegionStyle {
    pub fn for_bucket(bucket: DensityBucket) -> Self {
        RegionStyle {
            fill_color: bucket.fill_color(),
            weight: 2,
            opacity: 1.0,
            color: "white",
            dash_array: "3",
            fill_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRegion {
    pub location_id: i64,
    pub density: u64,
    pub bucket: DensityBucket,
    pub style: RegionStyle,
}

/// Trip counts keyed by taxi zone.
#[derive(Debug, Clone, Default)]
pub struct HeatmapLayer {
    densities: HashMap<i64, u64>,
}

impl HeatmapLayer {
    pub fn from_densities(rows: impl IntoIterator<Item = TripDensity>) -> Self {
        let densities = rows
            .into_iter()
            .map(|row| (row.location_id, row.density))
            .collect();
        HeatmapLayer { densities }
    }

    /// Zones without data count as zero trips.
    pub fn density_of(&self, location_id: i64) -> u64 {
        self.densities.get(&location_id).copied().unwrap_or(0)
    }

    pub fn region(&self, location_id: i64) -> HeatmapRegion {
        let density = self.density_of(location_id);
        let bucket = DensityBucket::from_density(density);
        HeatmapRegion {
            location_id,
            density,
            bucket,
            style: RegionStyle::for_bucket(bucket),
        }
    }

    /// All known zones, ordered by location id.
    pub fn regions(&self) -> Vec<HeatmapRegion> {
        let mut ids: Vec<i64> = self.densities.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| self.region(id)).collect()
    }

    pub fn popup_text(&self, location_id: i64) -> String {
        format!("Trip Count: {}", self.density_of(location_id))
    }
}
