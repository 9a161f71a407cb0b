/// Input that was rejected before any operation was constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	messages: Vec<String>,
}

impl ValidationError {
	pub fn new(messages: Vec<String>) -> Self {
		Self { messages }
	}

	pub fn single(message: impl Into<String>) -> Self {
		Self {
			messages: vec![message.into()],
		}
	}

	pub fn messages(&self) -> &[String] {
		&self.messages
	}
}

impl std::fmt::Display for ValidationError {
	/// One message per line.
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.messages.join("\n"))
	}
}

impl std::error::Error for ValidationError {}
