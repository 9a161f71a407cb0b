/// Apply backspaces (`\u{8}`) the way a terminal would: each one deletes the previous character.
///
/// Progress indicators of the imagery tool redraw themselves with backspaces,
/// so raw captured text is full of them.
pub fn normalize_console_text(text: &str) -> String {
	let mut result = String::with_capacity(text.len());
	for c in text.chars() {
		if c == '\u{8}' {
			result.pop();
		} else {
			result.push(c);
		}
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("", "")]
	#[case("AB\u{8}C", "AC")]
	#[case("\u{8}\u{8}A", "A")]
	#[case("10%\u{8}\u{8}\u{8}20%\u{8}\u{8}\u{8}100%", "100%")]
	#[case("ä\u{8}ö", "ö")]
	#[case("plain\ntext", "plain\ntext")]
	fn normalize(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_console_text(input), expected);
	}
}
