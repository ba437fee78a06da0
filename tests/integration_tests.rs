use chrono::NaiveDate;
use gtfs_sheet_builder::archive::create_archive;
use gtfs_sheet_builder::config::ConverterConfig;
use gtfs_sheet_builder::feed::assemble_feed;
use gtfs_sheet_builder::output::write_feed;
use gtfs_sheet_builder::sheet::Sheet;
use gtfs_sheet_builder::stops::read_stop_rows;
use std::collections::HashSet;
use std::fs::{self, File};

const STOPS_CSV: &str = "ID,name,WKT\n\
S1,KAB,POINT(101.6 3.1)\n\
S2,KHAR,101.7 3.2\n\
,P.TIMUR,POINT (101.8 3.3)\n";

fn sheet(label: &str, rows: &[&[&str]]) -> Sheet {
    Sheet {
        label: label.to_string(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

fn workbook() -> Vec<Sheet> {
    vec![
        sheet("Cover", &[&["UPSI bus timetable"]]),
        sheet(
            "ROUTE 1",
            &[
                &["ROUTE 1: KAB - KHAR, P.TIMUR"],
                &["TIME", "STOP"],
                &["700", "KAB"],
                &["0730", "khar"],
                &["0800", "NO BUS"],
                &["", "TOTAL 2"],
            ],
        ),
        sheet(
            "ROUTE 2",
            &[
                &["ROUTE 2: P.TIMUR"],
                &["TIME", "STOP"],
                &["0900", "P.Timur"],
                &["0900", "Library"],
            ],
        ),
    ]
}

#[test]
fn test_full_pipeline() {
    let stop_rows = read_stop_rows(STOPS_CSV.as_bytes()).expect("Failed to read stops");
    let reference = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
    let feed = assemble_feed(&workbook(), &stop_rows, reference, &ConverterConfig::default())
        .expect("Failed to assemble feed");

    let trip_ids: HashSet<_> = feed.trips.iter().map(|t| t.trip_id.as_str()).collect();
    assert_eq!(trip_ids.len(), 4);
    assert!(trip_ids.contains("R1_DAILY_700_1"));
    assert!(trip_ids.contains("R2_DAILY_0900_2"));

    let stop_ids: Vec<_> = feed.stop_times.iter().map(|s| s.stop_id.as_str()).collect();
    assert_eq!(stop_ids, vec!["S1", "S2", "STOP_3", "Library"]);
    assert_eq!(feed.summary.unresolved_stops.len(), 1);

    let dir = std::env::temp_dir().join("gtfs_sheet_builder_integration");
    let _ = fs::remove_dir_all(&dir);
    let written = write_feed(&feed, &dir).expect("Failed to write tables");
    assert_eq!(written.len(), 7);

    let routes = fs::read_to_string(dir.join("routes.txt")).unwrap();
    assert_eq!(
        routes.lines().collect::<Vec<_>>(),
        vec![
            "route_id,route_short_name,route_long_name,route_type",
            "1,ROUTE 1,KAB - KHAR P.TIMUR,3",
            "2,ROUTE 2,P.TIMUR,3",
        ]
    );

    let calendar = fs::read_to_string(dir.join("calendar.txt")).unwrap();
    assert_eq!(
        calendar.lines().nth(1),
        Some("DAILY,1,1,1,1,1,1,1,20250101,20251231")
    );

    let feed_info = fs::read_to_string(dir.join("feed_info.txt")).unwrap();
    assert_eq!(
        feed_info.lines().nth(1),
        Some("UPSI,http://www.upsi.edu.my,en,20250101,20251231,2025-9-2")
    );

    let stop_times = fs::read_to_string(dir.join("stop_times.txt")).unwrap();
    assert_eq!(
        stop_times.lines().nth(1),
        Some("R1_DAILY_700_1,07:00:00,07:00:00,S1,1")
    );

    let zip_path = create_archive(&dir, "gtfs.zip").expect("Failed to package feed");
    let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let names: HashSet<_> = archive.file_names().collect();
    for table in [
        "agency.txt",
        "calendar.txt",
        "feed_info.txt",
        "routes.txt",
        "stops.txt",
        "trips.txt",
        "stop_times.txt",
    ] {
        assert!(names.contains(table), "{table} missing from archive");
    }
    assert_eq!(names.len(), 7);

    fs::remove_dir_all(&dir).unwrap();
}
