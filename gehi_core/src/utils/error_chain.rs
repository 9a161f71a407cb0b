/// Render an error and all of its causes, one per line.
pub fn format_error_chain(err: &anyhow::Error) -> String {
	let mut result = err.to_string();

	for (i, cause) in err.chain().skip(1).enumerate() {
		if i == 0 {
			result.push_str("\n  Caused by:");
		}
		result.push_str(&format!("\n    {cause}"));
	}

	result
}
