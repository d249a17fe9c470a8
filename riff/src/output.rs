use crate::errors::Error;

use comfy_table::presets::NOTHING as TABLE_NO_BORDERS;
use comfy_table::Table;
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

fn sink<W: Write + Send + 'static>(writer: W) -> Sink {
    Arc::new(Mutex::new(Box::new(writer)))
}

/*
 * Output is the user facing side of the CLI. Every write takes the sink's
 * lock for one whole line, so the log streamer and the command itself can
 * write concurrently without interleaving partial lines.
 *
 * Messages (success/info) normally go to stdout. For dry runs stdout is
 * reserved for the rendered resources and messages move to stderr.
 */
#[derive(Clone)]
pub struct Output {
    stdout: Sink,
    stderr: Sink,
    messages: Sink,
}

impl Output {

    pub fn stdio() -> Self {
	Self::new(std::io::stdout(), std::io::stderr())
    }

    pub fn new<O, E>(stdout: O, stderr: E) -> Self
    where
	O: Write + Send + 'static,
	E: Write + Send + 'static,
    {
	let stdout = sink(stdout);
	Self{
	    messages: stdout.clone(),
	    stdout,
	    stderr: sink(stderr),
	}
    }

    pub fn for_dry_run(&self) -> Self {
	Self{
	    stdout: self.stdout.clone(),
	    stderr: self.stderr.clone(),
	    messages: self.stderr.clone(),
	}
    }

    fn write_to(sink: &Sink, text: &str) {
	let mut writer = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

	let written = writer.write_all(text.as_bytes()).and_then(|_| writer.flush());
	if let Err(err) = written {
	    log::debug!("unable to write output: {}", err);
	}
    }

    fn write_line(sink: &Sink, line: impl Display) {
	let mut text = line.to_string();
	if !text.ends_with('\n') {
	    text.push('\n');
	}
	Self::write_to(sink, &text);
    }

    pub fn success(&self, msg: impl Display) {
	Self::write_line(&self.messages, msg);
    }

    pub fn info(&self, msg: impl Display) {
	Self::write_line(&self.messages, msg);
    }

    pub fn error(&self, msg: impl Display) {
	Self::write_line(&self.stderr, msg);
    }

    /* program data, such as log lines or tables, always on stdout */
    pub fn line(&self, line: impl Display) {
	Self::write_line(&self.stdout, line);
    }

    /* renders a resource as one document of a YAML stream */
    pub fn document<T: Serialize>(&self, resource: &T) -> Result<(), Error> {
	let yaml = serde_yaml::to_string(resource)?;
	Self::write_to(&self.stdout, &format!("---\n{}", yaml));
	Ok(())
    }

    pub fn table(&self, headers: &[&str], rows: Vec<Vec<String>>) {
	let mut table = Table::new();
	table.load_preset(TABLE_NO_BORDERS)
	    .set_header(headers.to_vec())
	    .add_rows(rows);

	let rendered: Vec<String> = table.to_string()
	    .lines()
	    .map(|line| line.trim().to_string())
	    .filter(|line| !line.is_empty())
	    .collect();
	Self::write_to(&self.stdout, &format!("{}\n", rendered.join("\n")));
    }
}


#[cfg(test)]
mod tests {
    use super::testing::buffered;

    use serde::Serialize;

    #[derive(Serialize)]
    struct Thing {
	name: String,
    }

    #[test]
    fn messages_move_to_stderr_for_dry_run() {
	let (output, stdout, stderr) = buffered();

	output.success("Created deployer \"my-deployer\"");
	output.for_dry_run().success("Created deployer \"my-deployer\"");

	assert_eq!(stdout.contents(), "Created deployer \"my-deployer\"\n");
	assert_eq!(stderr.contents(), "Created deployer \"my-deployer\"\n");
    }

    #[test]
    fn documents_are_separated() {
	let (output, stdout, _) = buffered();

	output.for_dry_run().document(&Thing{ name: String::from("a") }).unwrap();
	output.document(&Thing{ name: String::from("b") }).unwrap();

	assert_eq!(stdout.contents(), "---\nname: a\n---\nname: b\n");
    }

    #[test]
    fn table_has_header_and_rows() {
	let (output, stdout, _) = buffered();

	output.table(&["NAME", "AGE"], vec![vec![String::from("my-app"), String::from("5m")]]);

	let contents = stdout.contents();
	let lines: Vec<&str> = contents.lines().collect();
	assert_eq!(lines.len(), 2);
	assert!(lines[0].starts_with("NAME"));
	assert!(lines[1].starts_with("my-app"));
	assert!(lines[1].ends_with("5m"));
    }

    #[test]
    fn concurrent_lines_are_not_interleaved() {
	let (output, stdout, _) = buffered();

	let handles: Vec<_> = (0..4).map(|n| {
	    let output = output.clone();
	    std::thread::spawn(move || {
		for i in 0..50 {
		    output.line(format!("writer-{} line-{}", n, i));
		}
	    })
	}).collect();
	for handle in handles {
	    handle.join().unwrap();
	}

	let contents = stdout.contents();
	assert_eq!(contents.lines().count(), 200);
	assert!(contents.lines().all(|line| line.starts_with("writer-") && line.contains(" line-")));
    }
}
