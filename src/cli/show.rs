use crate::core::models::{Sample, SampleValue};
use crate::core::settings::Settings;
use crate::core::store::SampleStore;
use anyhow::Result;
use std::path::PathBuf;

/// Prints the persisted samples, newest last.
pub async fn run(config: Option<PathBuf>, json: bool, limit: Option<usize>) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    let store = SampleStore::open(settings.store_path()?)?;

    let samples = store.samples();
    let start = limit.map_or(0, |n| samples.len().saturating_sub(n));
    let selected = &samples[start..];

    if json {
        println!("{}", serde_json::to_string_pretty(selected)?);
    } else {
        print_text_output(selected, samples.len());
    }

    Ok(())
}

fn print_text_output(samples: &[Sample], total: usize) {
    if samples.is_empty() {
        println!("No samples recorded yet.");
        return;
    }

    for sample in samples {
        match &sample.value {
            SampleValue::Duration(secs) => {
                println!("{}  {:.0} s", sample.timestamp.to_rfc3339(), secs);
            }
            SampleValue::Payload(payload) => {
                let duration = payload
                    .get("resourceSets")
                    .and_then(|s| s.get(0))
                    .and_then(|s| s.get("resources"))
                    .and_then(|r| r.get(0))
                    .and_then(|r| r.get("travelDurationTraffic"))
                    .and_then(serde_json::Value::as_f64);
                match duration {
                    Some(secs) => {
                        println!("{}  {:.0} s (full payload)", sample.timestamp.to_rfc3339(), secs)
                    }
                    None => println!("{}  <payload>", sample.timestamp.to_rfc3339()),
                }
            }
        }
    }

    println!("\n{} of {} samples", samples.len(), total);
}
