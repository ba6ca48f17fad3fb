//! Bounding-box and proximity filtering on latitude/longitude columns.

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, EntityName, ModelTrait, Value,
    sea_query::{Expr, SimpleExpr},
};
use serde_json::Value as JsonValue;

use super::conditions::parse_number;
use super::plan::QueryPlan;

/// Mean Earth radius used by the great-circle distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 200.0;
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Alias of the derived distance column.
pub const DISTANCE_ALIAS: &str = "distance";

/// A `swLat,swLng,neLat,neLng` box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl BoundingBox {
    /// Parse exactly four comma-separated decimals. Anything else is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [sw_lat, sw_lng, ne_lat, ne_lng] = parts.as_slice() else {
            tracing::debug!(value = raw, "Ignoring bounds without exactly four fields");
            return None;
        };
        Some(Self {
            south_west: GeoPoint {
                lat: parse_number(sw_lat)?,
                lng: parse_number(sw_lng)?,
            },
            north_east: GeoPoint {
                lat: parse_number(ne_lat)?,
                lng: parse_number(ne_lng)?,
            },
        })
    }
}

/// Latitude and longitude columns of a geo-located entity.
#[derive(Debug, Clone, Copy)]
pub struct GeoColumns<C> {
    pub lat: C,
    pub lng: C,
}

/// Both coordinates constrained to the box.
#[must_use]
pub fn bounding_box_condition<C: ColumnTrait>(columns: GeoColumns<C>, bbox: BoundingBox) -> Condition {
    Condition::all()
        .add(columns.lat.between(bbox.south_west.lat, bbox.north_east.lat))
        .add(columns.lng.between(bbox.south_west.lng, bbox.north_east.lng))
}

/// Clamp a requested radius into `[MIN_RADIUS_KM, MAX_RADIUS_KM]`; missing or
/// malformed radius means [`DEFAULT_RADIUS_KM`].
#[must_use]
pub fn clamp_radius(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number)
        .map_or(DEFAULT_RADIUS_KM, |radius| radius.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM))
}

/// Great-circle distance in kilometers from `origin` to the row's
/// coordinates, using the spherical law of cosines. The cosine is clamped
/// to `[-1, 1]` so rounding at the origin itself cannot leave the domain of
/// `acos`.
#[must_use]
pub fn distance_expr<C: ColumnTrait>(columns: GeoColumns<C>, origin: GeoPoint) -> SimpleExpr {
    let table = C::EntityName::default();
    let table = table.table_name();
    let lat = format!("{table}.{}", columns.lat.as_str());
    let lng = format!("{table}.{}", columns.lng.as_str());
    Expr::cust_with_values(
        format!(
            "{EARTH_RADIUS_KM} * acos(LEAST(1, GREATEST(-1, cos(radians(?)) * cos(radians({lat})) * cos(radians({lng}) - radians(?)) + sin(radians(?)) * sin(radians({lat})))))"
        ),
        [origin.lat, origin.lng, origin.lat],
    )
}

/// The same law-of-cosines distance computed in process, in kilometers.
#[must_use]
pub fn great_circle_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let delta_lng = (to.lng - from.lng).to_radians();
    let cosine = lat1.cos() * lat2.cos() * delta_lng.cos() + lat1.sin() * lat2.sin();
    EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
}

/// A "within `radius_km` of `origin`" request on a pair of coordinate columns.
///
/// Backends with SQL trigonometry evaluate [`distance_expr`] in the query.
/// SQLite has no `acos`, so the query only narrows rows to
/// [`Proximity::bounding_box`] and [`Proximity::nearest_first`] does the
/// exact filtering and ordering on the fetched rows.
#[derive(Debug, Clone, Copy)]
pub struct Proximity<C> {
    pub columns: GeoColumns<C>,
    pub origin: GeoPoint,
    pub radius_km: f64,
}

impl<C: ColumnTrait> Proximity<C> {
    #[must_use]
    pub fn distance_expr(&self) -> SimpleExpr {
        distance_expr(self.columns, self.origin)
    }

    /// Smallest latitude/longitude box containing every point within the
    /// radius. Longitude widens to the full range near the poles and across
    /// the antimeridian.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let angular = self.radius_km / EARTH_RADIUS_KM;
        let lat = self.origin.lat.to_radians();
        let south = (lat - angular).to_degrees();
        let north = (lat + angular).to_degrees();

        let (mut west, mut east) = (-180.0, 180.0);
        if south > -90.0 && north < 90.0 {
            let delta = (angular.sin() / lat.cos()).asin().to_degrees();
            if self.origin.lng - delta >= -180.0 && self.origin.lng + delta <= 180.0 {
                west = self.origin.lng - delta;
                east = self.origin.lng + delta;
            }
        }

        BoundingBox {
            south_west: GeoPoint { lat: south.max(-90.0), lng: west },
            north_east: GeoPoint { lat: north.min(90.0), lng: east },
        }
    }

    /// Keep the rows within the radius, nearest first, each paired with its
    /// distance. Rows without coordinates are dropped. The sort is stable,
    /// so rows at the same distance keep their fetched order.
    pub fn nearest_first<T>(&self, rows: Vec<T>, point: impl Fn(&T) -> Option<GeoPoint>) -> Vec<(T, f64)> {
        let mut ranked: Vec<(T, f64)> = rows
            .into_iter()
            .filter_map(|row| {
                let distance = great_circle_km(self.origin, point(&row)?);
                (distance <= self.radius_km).then_some((row, distance))
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked
    }

    /// Coordinates of a typed model.
    pub fn model_point<M>(&self, model: &M) -> Option<GeoPoint>
    where
        M: ModelTrait,
        M::Entity: EntityTrait<Column = C>,
    {
        Some(GeoPoint {
            lat: as_degrees(model.get(self.columns.lat))?,
            lng: as_degrees(model.get(self.columns.lng))?,
        })
    }

    /// Coordinates of a row fetched as a JSON object.
    #[must_use]
    pub fn json_point(&self, row: &JsonValue) -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: row.get(self.columns.lat.as_str())?.as_f64()?,
            lng: row.get(self.columns.lng.as_str())?.as_f64()?,
        })
    }
}

fn as_degrees(value: Value) -> Option<f64> {
    match value {
        Value::Double(degrees) => degrees,
        Value::Float(degrees) => degrees.map(f64::from),
        _ => None,
    }
}

/// Expose the distance as [`DISTANCE_ALIAS`], keep rows within `radius_km`
/// and order nearest first.
pub fn apply_proximity<E: EntityTrait>(
    plan: &mut QueryPlan<E>,
    columns: GeoColumns<E::Column>,
    origin: GeoPoint,
    radius_km: f64,
) {
    plan.set_proximity(Proximity {
        columns,
        origin,
        radius_km,
    });
}
