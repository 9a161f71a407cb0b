use super::{AoiInput, AoiResolution, AoiResolver};
use time::Date;

/// Validation for operations that write imagery to disk.
///
/// Runs the [`AoiResolver`] first and appends its own messages after the
/// area-of-interest ones: a missing date list, then a blank output path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileOutputValidator {
	resolver: AoiResolver,
}

impl FileOutputValidator {
	pub fn new(resolver: AoiResolver) -> Self {
		Self { resolver }
	}

	pub fn resolver(&self) -> &AoiResolver {
		&self.resolver
	}

	pub fn validate(&self, aoi: &AoiInput, dates: &[Date], output_path: &str) -> AoiResolution {
		let mut resolution = self.resolver.resolve(aoi);

		if dates.is_empty() {
			resolution.messages.push(String::from("At least one date must be specified."));
		}

		if output_path.trim().is_empty() {
			resolution.messages.push(String::from("Invalid output file path"));
		}

		resolution
	}
}
