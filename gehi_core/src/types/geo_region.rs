use super::GeoPoint;
use anyhow::{Result, bail, ensure};
use geo::{
	Area, Coord, Line, LineString, Polygon,
	algorithm::line_intersection::{LineIntersection, line_intersection},
};
use std::fmt::Debug;

/// A simple polygon over WGS84 points, in the order the caller supplied them.
///
/// Longitudes are not wrapped: a box crossing the antimeridian is expressed
/// with eastern longitudes above 180.
#[derive(Clone, PartialEq)]
pub struct GeoRegion(Vec<GeoPoint>);

impl GeoRegion {
	/// Builds a region and verifies that it is a usable simple polygon.
	pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
		let region = Self(points);
		region.verify()?;
		Ok(region)
	}

	/// Materializes the box spanned by two corners.
	///
	/// If the upper-right longitude is smaller than the lower-left one, the box
	/// crosses the antimeridian and 360 degrees are added to the upper-right longitude.
	pub fn from_corners(lower_left: GeoPoint, upper_right: GeoPoint) -> Result<Self> {
		let mut upper_right = upper_right;
		if upper_right.longitude < lower_left.longitude {
			upper_right.longitude += 360.0;
		}

		Self::new(vec![
			GeoPoint::new(lower_left.latitude, lower_left.longitude),
			GeoPoint::new(upper_right.latitude, lower_left.longitude),
			GeoPoint::new(upper_right.latitude, upper_right.longitude),
			GeoPoint::new(lower_left.latitude, upper_right.longitude),
		])
	}

	pub fn points(&self) -> &[GeoPoint] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_points(self) -> Vec<GeoPoint> {
		self.0
	}

	pub fn to_polygon(&self) -> Polygon<f64> {
		Polygon::new(LineString::from(self.coords()), vec![])
	}

	/// Planar area in square degrees.
	pub fn area(&self) -> f64 {
		self.to_polygon().unsigned_area()
	}

	/// `[min_lon, min_lat, max_lon, max_lat]`
	pub fn bounds(&self) -> Option<[f64; 4]> {
		let first = self.0.first()?;
		let mut bounds = [first.longitude, first.latitude, first.longitude, first.latitude];
		for point in &self.0[1..] {
			bounds[0] = bounds[0].min(point.longitude);
			bounds[1] = bounds[1].min(point.latitude);
			bounds[2] = bounds[2].max(point.longitude);
			bounds[3] = bounds[3].max(point.latitude);
		}
		Some(bounds)
	}

	/// Verifies that the region:
	/// - has at least 3 points,
	/// - only contains finite coordinates with latitudes inside [-90, 90],
	/// - never repeats a point twice in a row,
	/// - encloses a non-zero area,
	/// - does not intersect itself.
	///
	/// A trailing point equal to the first one is accepted and treated as the closing point.
	pub fn verify(&self) -> Result<()> {
		ensure!(self.0.len() >= 3, "A region must contain at least 3 points");

		for point in &self.0 {
			ensure!(
				point.latitude.is_finite() && point.longitude.is_finite(),
				"Coordinates must be finite numbers"
			);
			ensure!(
				(-90.0..=90.0).contains(&point.latitude),
				"Latitude {} is outside of [-90, 90]",
				point.latitude
			);
		}

		let coords = self.coords();
		for (index, pair) in coords.windows(2).enumerate() {
			ensure!(pair[0] != pair[1], "Point {} repeats the previous point", index + 1);
		}

		ensure!(self.area() > 0.0, "Region must enclose a non-zero area");

		let edges: Vec<Line<f64>> = (0..coords.len())
			.map(|i| Line::new(coords[i], coords[(i + 1) % coords.len()]))
			.collect();
		let count = edges.len();
		for i in 0..count {
			for j in (i + 1)..count {
				let adjacent = j == i + 1 || (i == 0 && j == count - 1);
				match line_intersection(edges[i], edges[j]) {
					None => {}
					Some(LineIntersection::Collinear { .. }) if adjacent => {
						bail!("Edges {} and {} of the region overlap", i + 1, j + 1)
					}
					Some(_) if adjacent => {}
					Some(_) => bail!("Edges {} and {} of the region intersect", i + 1, j + 1),
				}
			}
		}

		Ok(())
	}

	/// Ring coordinates without an explicit closing point.
	fn coords(&self) -> Vec<Coord<f64>> {
		let mut coords: Vec<Coord<f64>> = self.0.iter().map(|p| p.to_coord()).collect();
		if coords.len() > 3 && coords.first() == coords.last() {
			coords.pop();
		}
		coords
	}
}

impl Debug for GeoRegion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.0.iter().map(|p| [p.latitude, p.longitude])).finish()
	}
}
