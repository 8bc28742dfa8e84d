use crate::counting::CountingLine;
use crate::error::CounterError;
use crate::types::Config;
use anyhow::Result;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configured line specs into counting lines.
    ///
    /// This is the fail-fast boundary: a line that is neither horizontal nor
    /// vertical rejects the whole configuration before any frame is read.
    pub fn counting_lines(&self) -> Result<Vec<CountingLine>, CounterError> {
        self.counting
            .lines
            .iter()
            .enumerate()
            .map(|(index, spec)| CountingLine::new(index, spec.a, spec.b))
            .collect()
    }
}
