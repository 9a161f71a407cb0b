const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a client supplied name safe for a `Content-Disposition` header.
///
/// A blank name becomes `fallback`. Characters that are not allowed in file
/// names are replaced with `_`. `extension` is appended unless the name
/// already ends with it, ignoring case.
pub fn sanitize_file_name(requested: Option<&str>, fallback: &str, extension: &str) -> String {
	let name = match requested.map(str::trim) {
		Some(name) if !name.is_empty() => name,
		_ => fallback,
	};

	let mut name: String = name
		.chars()
		.map(|c| if c.is_control() || INVALID_CHARS.contains(&c) { '_' } else { c })
		.collect();

	if !name.to_lowercase().ends_with(&extension.to_lowercase()) {
		name.push_str(extension);
	}

	name
}
