//! Serialises weight readings for whoever listens on the other end, typically a file or stdout.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::io::Write;

use crate::weight::Weight;

/// Writes the given weight as one line of json.
pub fn write_sample(weight: &Weight, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let sample = Sample::new(weight, Utc::now());
    let data = format!("{}\n", serde_json::to_string(&sample)?.trim());

    writer.write_all(data.as_bytes())?;
    writer.flush()?;

    Ok(())
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct Sample {
    /// Time of sample creation
    pub datetime: DateTime<Utc>,

    /// Weight at the given sample time
    pub grams: f64,

    /// Same weight, in pounds
    pub pounds: f64,
}

impl Sample {
    pub fn new(weight: &Weight, datetime: DateTime<Utc>) -> Self {
        Self {
            datetime,
            grams: weight.metric().grams(),
            pounds: weight.imperial().pounds(),
        }
    }
}
