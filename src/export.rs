use crate::api::Error;
use crate::model::{ConnectOptions, Credentials, DateRange, HistoricalRecord, Resolution};
use crate::portal::{Portal, PortalSession};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 9] = [
    "Timestamp",
    "PV Production",
    "Battery Charge",
    "Battery Discharge",
    "Grid Feed-in",
    "Grid Purchase",
    "House Consumption",
    "Autarky",
    "Self-Consumption",
];

pub const DELIMITER: u8 = b';';

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub credentials: Credentials,
    pub range: DateRange,
    pub resolution: Resolution,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub rows: usize,
    pub path: PathBuf,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows written to {}", self.rows, self.path.display())
    }
}

/// Create the directory `path` will live in, including missing ancestors.
pub fn ensure_parent_dir(path: &Path) -> Result<(), Error> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

/* integral values print without a fraction, `-0` prints as `0` */
fn format_value(value: f64) -> String {
    if value == 0.0 {
        String::from("0")
    } else {
        value.to_string()
    }
}

fn to_row(record: &HistoricalRecord) -> [String; 9] {
    [
        record.timestamp.clone(),
        format_value(record.solar_production),
        format_value(record.bat_power_in),
        format_value(record.bat_power_out),
        format_value(record.grid_power_out),
        format_value(record.grid_power_in),
        format_value(record.consumption),
        format_value(record.autarky),
        format_value(record.self_consumption),
    ]
}

/// Write header plus one line per record to `path`, replacing whatever was there.
/// Returns the number of record lines.
pub fn write_csv(path: &Path, records: &[HistoricalRecord]) -> Result<usize, Error> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.write_record(&HEADER)?;
    for record in records {
        writer.write_record(&to_row(record))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;

    Ok(records.len())
}

/// Fetch `request.range` in a single batch and store it as CSV.
///
/// The session is always disconnected once the fetch returns; a failing disconnect is only
/// logged and never hides the fetch result.
pub async fn run<P: Portal>(portal: &P, request: &ExportRequest) -> Result<ExportSummary, Error> {
    ensure_parent_dir(&request.output)?;

    let session = portal
        .authenticate(&request.credentials, &ConnectOptions::default())
        .await?;

    log::info!(
        "fetching {} records for {} from {} to {}",
        request.resolution,
        request.credentials.serial,
        request.range.start,
        request.range.end
    );
    let fetched = session.history(&request.range, request.resolution).await;

    if let Err(e) = session.disconnect().await {
        log::warn!("Error while disconnecting: {}", e);
    }

    let records = fetched?;
    let rows = write_csv(&request.output, &records)?;
    log::debug!("wrote {} rows to {}", rows, request.output.display());

    Ok(ExportSummary {
        rows,
        path: request.output.clone(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::portal::mock::{Calls, MockPortal};
    use tempfile::TempDir;

    const HEADER_LINE: &str = "Timestamp;PV Production;Battery Charge;Battery Discharge;Grid Feed-in;Grid Purchase;House Consumption;Autarky;Self-Consumption";

    fn record(timestamp: &str) -> HistoricalRecord {
        HistoricalRecord {
            timestamp: timestamp.to_string(),
            solar_production: 21450.0,
            bat_power_in: 6200.0,
            bat_power_out: 5100.0,
            grid_power_out: 9800.0,
            grid_power_in: 1350.0,
            consumption: 11900.0,
            autarky: 87.5,
            self_consumption: 54.3,
        }
    }

    fn request(output: PathBuf) -> ExportRequest {
        ExportRequest {
            credentials: Credentials {
                serial: "S10-701234567890".to_string(),
                username: "installer".to_string(),
                password: "secret".to_string(),
            },
            range: DateRange::parse("2024-06-01", "2024-06-03").unwrap(),
            resolution: Resolution::Day,
            output,
        }
    }

    #[test]
    fn formats_values() {
        assert_eq!("0", format_value(0.0));
        assert_eq!("0", format_value(-0.0));
        assert_eq!("1294", format_value(1294.0));
        assert_eq!("87.5", format_value(87.5));
        assert_eq!("-300", format_value(-300.0));
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");

        let rows = write_csv(&path, &[record("2024-06-01 00:00")]).unwrap();

        assert_eq!(1, rows);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            format!(
                "{}\n2024-06-01 00:00;21450;6200;5100;9800;1350;11900;87.5;54.3\n",
                HEADER_LINE
            ),
            content
        );
    }

    #[test]
    fn missing_values_are_written_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let sparse = HistoricalRecord {
            timestamp: "2024-06-02 00:00".to_string(),
            solar_production: 18020.0,
            ..Default::default()
        };

        write_csv(&path, &[sparse]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let line = content.lines().nth(1).unwrap();
        let fields: Vec<&str> = line.split(';').collect();
        assert_eq!(9, fields.len());
        assert_eq!("0", fields[7]);
        assert_eq!(
            "2024-06-02 00:00;18020;0;0;0;0;0;0;0",
            line
        );
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("export.csv");

        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());

        /* existing directory is fine */
        ensure_parent_dir(&path).unwrap();
        ensure_parent_dir(Path::new("export.csv")).unwrap();
    }

    #[tokio::test]
    async fn exports_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("export.csv");
        let portal = MockPortal::with_records(vec![
            record("2024-06-01 00:00"),
            record("2024-06-02 00:00"),
            record("2024-06-03 00:00"),
        ]);

        let summary = run(&portal, &request(path.clone())).await.unwrap();

        assert_eq!(3, summary.rows);
        assert_eq!(path, summary.path);
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(4, lines.len());
        assert_eq!(HEADER_LINE, lines[0]);
        assert!(lines[1].starts_with("2024-06-01 00:00;"));
        assert!(lines[3].starts_with("2024-06-03 00:00;"));
        assert!(lines.iter().all(|line| line.split(';').count() == 9));

        assert_eq!(1, Calls::count(&portal.calls.history));
        assert_eq!(1, Calls::count(&portal.calls.disconnects));
        let (range, resolution) = portal.calls.last_range.lock().unwrap().unwrap();
        assert_eq!(request(path).range, range);
        assert_eq!(Resolution::Day, resolution);
    }

    #[tokio::test]
    async fn empty_history_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let portal = MockPortal::with_records(vec![]);

        let summary = run(&portal, &request(path.clone())).await.unwrap();

        assert_eq!(0, summary.rows);
        assert_eq!(format!("{}\n", HEADER_LINE), fs::read_to_string(&path).unwrap());
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let portal = MockPortal::with_records(vec![record("2024-06-01 00:00")]);

        run(&portal, &request(path.clone())).await.unwrap();
        run(&portal, &request(path.clone())).await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(2, content.lines().count());
        assert_eq!(1, content.matches("Timestamp;").count());
    }

    #[tokio::test]
    async fn inverted_range_is_passed_to_portal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let portal = MockPortal::with_records(vec![]);
        let mut inverted = request(path);
        inverted.range = DateRange::parse("2024-06-03", "2024-06-01").unwrap();

        run(&portal, &inverted).await.unwrap();

        let (range, _) = portal.calls.last_range.lock().unwrap().unwrap();
        assert!(range.start > range.end);
    }

    #[tokio::test]
    async fn failed_fetch_propagates_and_releases_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let portal = MockPortal {
            history_error: Some("gateway timeout".to_string()),
            ..Default::default()
        };

        let result = run(&portal, &request(path.clone())).await;

        assert!(matches!(result, Err(Error::ApiError(_))));
        assert!(!path.exists());
        assert_eq!(1, Calls::count(&portal.calls.disconnects));
    }

    #[tokio::test]
    async fn failed_login_propagates() {
        let dir = TempDir::new().unwrap();
        let portal = MockPortal {
            login_error: Some("bad credentials".to_string()),
            ..Default::default()
        };

        let result = run(&portal, &request(dir.path().join("export.csv"))).await;

        assert!(matches!(result, Err(Error::LoginError(_))));
        assert_eq!(0, Calls::count(&portal.calls.history));
    }

    #[tokio::test]
    async fn failing_disconnect_does_not_hide_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let portal = MockPortal {
            disconnect_error: Some("already closed".to_string()),
            ..MockPortal::with_records(vec![record("2024-06-01 00:00")])
        };

        let summary = run(&portal, &request(path)).await.unwrap();
        assert_eq!(1, summary.rows);
    }

    #[test]
    fn summary_message() {
        let summary = ExportSummary {
            rows: 30,
            path: PathBuf::from("out/june.csv"),
        };
        assert_eq!("30 rows written to out/june.csv", summary.to_string());
    }
}
