use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use spdlog::prelude::*;

use crate::band::Band;
use crate::density::{DensityAnalysis, analyze_density};
use crate::error::AnalysisError;
use crate::records::{
    BeaconSample, DecodeStats, DownlinkSample, GenericSample, MacAddr, sort_by_timestamp,
};
use crate::throughput::{ThroughputAnalysis, analyze_throughput};

/// One analysis request, read as a single JSON line. The upstream decoder has
/// already dissected the capture; jobs carry the typed record streams plus
/// its decode statistics.
#[derive(Debug, Deserialize)]
#[serde(tag = "process", rename_all = "lowercase")]
pub enum Job {
    Density {
        band: Band,
        #[serde(default)]
        beacons: Vec<BeaconSample>,
        #[serde(default)]
        frames: Vec<GenericSample>,
        #[serde(default)]
        decode: DecodeStats,
    },
    Throughput {
        /// Access point and client the downlink frames were filtered on.
        ap: MacAddr,
        host: MacAddr,
        #[serde(default)]
        frames: Vec<DownlinkSample>,
        #[serde(default)]
        decode: DecodeStats,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Density {
        process: &'static str,
        data: DensityAnalysis,
    },
    Throughput {
        process: &'static str,
        data: ThroughputAnalysis,
    },
    Error {
        error: ErrorEnvelope,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
}

impl From<AnalysisError> for Response {
    fn from(err: AnalysisError) -> Self {
        Response::Error {
            error: ErrorEnvelope {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}

/// Reads one JSON job per line and writes one JSON response per line,
/// flushed per job. Malformed requests produce an error envelope instead of
/// terminating the loop.
pub fn run_loop(reader: impl BufRead, writer: &mut impl Write) -> std::io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&line);
        serde_json::to_writer(&mut *writer, &response)?;
        writeln!(writer)?;
        writer.flush()?;
    }
    Ok(())
}

pub fn handle_line(line: &str) -> Response {
    match serde_json::from_str::<Job>(line) {
        Ok(job) => handle_job(job),
        Err(err) => {
            warn!("[Driver] rejected malformed job: {}", err);
            Response::Error {
                error: ErrorEnvelope {
                    code: "bad_request",
                    message: err.to_string(),
                },
            }
        }
    }
}

fn handle_job(job: Job) -> Response {
    let result = match job {
        Job::Density {
            band,
            mut beacons,
            mut frames,
            decode,
        } => {
            info!(
                "[Driver] density job on {:?}: {} beacons, {} frames",
                band,
                beacons.len(),
                frames.len()
            );
            run_density(band, &mut beacons, &mut frames, decode)
        }
        Job::Throughput {
            ap,
            host,
            mut frames,
            decode,
        } => {
            info!(
                "[Driver] throughput job {} -> {}: {} frames",
                ap,
                host,
                frames.len()
            );
            run_throughput(&mut frames, decode)
        }
    };
    match result {
        Ok(response) => response,
        Err(err) => {
            warn!("[Driver] job failed: {}", err);
            err.into()
        }
    }
}

fn run_density(
    band: Band,
    beacons: &mut [BeaconSample],
    frames: &mut [GenericSample],
    decode: DecodeStats,
) -> Result<Response, AnalysisError> {
    decode.ensure_reliable()?;
    // The engine assumes timestamp order; this boundary owns it
    sort_by_timestamp(beacons, |s| s.timestamp_s);
    sort_by_timestamp(frames, |s| s.timestamp_s);
    let data = analyze_density(beacons, frames, band)?;
    Ok(Response::Density {
        process: "density",
        data,
    })
}

fn run_throughput(
    frames: &mut [DownlinkSample],
    decode: DecodeStats,
) -> Result<Response, AnalysisError> {
    decode.ensure_reliable()?;
    sort_by_timestamp(frames, |s| s.timestamp_s);
    let data = analyze_throughput(frames)?;
    Ok(Response::Throughput {
        process: "throughput",
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_loop_answers_one_line_per_job() {
        let input = concat!(
            r#"{"process":"density","band":"2.4GHz","beacons":[{"source":"aa:bb:cc:00:11:22","rssi_dbm":-50.0,"timestamp_s":1.0}]}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();
        run_loop(Cursor::new(input), &mut output).unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(lines.len(), 2);

        let ok: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(ok["process"], "density");
        assert_eq!(ok["data"]["total_devices"], 1);

        let err: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(err["error"]["code"], "bad_request");
    }

    #[test]
    fn test_empty_throughput_job_reports_no_frames() {
        let line = r#"{"process":"throughput","ap":"aa:00:00:00:00:01","host":"aa:00:00:00:00:02","frames":[]}"#;
        let response = handle_line(line);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], "no_frames");
        assert_eq!(value["error"]["message"], "no frames extracted");
    }

    #[test]
    fn test_decode_gate_rejects_unreliable_extraction() {
        let line = r#"{"process":"throughput","ap":"aa:00:00:00:00:01","host":"aa:00:00:00:00:02","frames":[],"decode":{"total":10,"failed":4}}"#;
        let response = handle_line(line);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], "decode_quality");
    }
}
