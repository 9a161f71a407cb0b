/// The two text channels an operation reports through while it runs.
///
/// A fresh sink is bound for every run, so text never leaks between runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputSink {
	stdout: String,
	stderr: String,
}

impl OutputSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn write_out(&mut self, text: &str) {
		self.stdout.push_str(text);
	}

	pub fn write_err(&mut self, text: &str) {
		self.stderr.push_str(text);
	}

	pub fn write_out_line(&mut self, text: &str) {
		self.stdout.push_str(text);
		self.stdout.push('\n');
	}

	pub fn write_err_line(&mut self, text: &str) {
		self.stderr.push_str(text);
		self.stderr.push('\n');
	}

	pub fn stdout(&self) -> &str {
		&self.stdout
	}

	pub fn stderr(&self) -> &str {
		&self.stderr
	}

	/// `(stdout, stderr)`
	pub fn into_parts(self) -> (String, String) {
		(self.stdout, self.stderr)
	}
}
