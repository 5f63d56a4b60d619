use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines sink shared by every render of one `VocabDeck`. Lines from
/// concurrent renders interleave; counting happens per render in [`RenderTrace`].
#[derive(Clone)]
pub(crate) struct DebugLogger {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    fn write_record(&self, record: &Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{record}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Events and counters of a single render.
pub(crate) struct RenderTrace<'a> {
    logger: &'a DebugLogger,
    counters: BTreeMap<String, u64>,
}

impl<'a> RenderTrace<'a> {
    pub fn new(logger: &'a DebugLogger) -> Self {
        Self {
            logger,
            counters: BTreeMap::new(),
        }
    }

    /// Writes `{"type": kind, ...fields}` as one line and bumps the `kind` counter.
    pub fn event(&mut self, kind: &str, fields: Value) {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::String(kind.to_string()));
        if let Value::Object(fields) = fields {
            record.extend(fields);
        }
        self.logger.write_record(&Value::Object(record));
        self.increment(kind, 1);
    }

    pub fn increment(&mut self, key: &str, amount: u64) {
        let entry = self.counters.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Writes the `debug.summary` line for this render and flushes the sink.
    pub fn finish(self, context: &str) {
        self.logger.write_record(&json!({
            "type": "debug.summary",
            "context": context,
            "counts": self.counters,
        }));
        self.logger.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(buf: &SharedBuf) -> Vec<Value> {
        let text = String::from_utf8(buf.0.lock().expect("lock").clone()).expect("utf8");
        text.lines()
            .map(|line| serde_json::from_str(line).expect("valid json line"))
            .collect()
    }

    #[test]
    fn events_and_summary_are_json_lines() {
        let buf = SharedBuf::default();
        let logger = DebugLogger::from_writer(buf.clone());
        let mut trace = RenderTrace::new(&logger);
        trace.event("layout.card", json!({"term": "say \"hi\"", "page": 1}));
        trace.event("layout.card", json!({"term": "bye", "page": 2}));
        trace.increment("layout.pages", 2);
        trace.finish("render");

        let lines = lines(&buf);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "layout.card");
        assert_eq!(lines[0]["term"], "say \"hi\"");
        assert_eq!(lines[2]["type"], "debug.summary");
        assert_eq!(lines[2]["counts"]["layout.card"], 2);
        assert_eq!(lines[2]["counts"]["layout.pages"], 2);
    }

    #[test]
    fn interleaved_traces_count_only_their_own_events() {
        let buf = SharedBuf::default();
        let logger = DebugLogger::from_writer(buf.clone());
        let mut first = RenderTrace::new(&logger);
        let mut second = RenderTrace::new(&logger);
        first.event("layout.card", json!({"term": "a"}));
        second.event("layout.card", json!({"term": "b"}));
        first.event("layout.card", json!({"term": "c"}));
        second.finish("second");
        first.finish("first");

        let summaries: Vec<Value> = lines(&buf)
            .into_iter()
            .filter(|line| line["type"] == "debug.summary")
            .collect();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0]["context"], "second");
        assert_eq!(summaries[0]["counts"]["layout.card"], 1);
        assert_eq!(summaries[1]["context"], "first");
        assert_eq!(summaries[1]["counts"]["layout.card"], 2);
    }
}
