use eyre::Result;
use std::fs;
use tempfile::TempDir;
use traceview::{
    build_tree, calculate_statistics, filter_events, hit_test, layout, write_analysis,
    AnalysisExport, FilterCriteria, RowGeometry, TraceData, Viewport,
};

fn sample_trace() -> String {
    r#"{
        "traceEvents": [
            {"pid": 1, "tid": 1, "ts": 0, "dur": 1000, "ph": "X", "name": "Frame", "cat": "rendering", "args": {"name": "Renderer"}},
            {"pid": 1, "tid": 1, "ts": 100, "dur": 400, "ph": "X", "name": "Layout", "cat": "rendering"},
            {"pid": 1, "tid": 1, "ts": 150, "dur": 100, "ph": "X", "name": "Measure", "cat": "rendering"},
            {"pid": 1, "tid": 1, "ts": 600, "dur": 300, "ph": "X", "name": "Paint", "cat": "painting"},
            {"pid": 1, "tid": 2, "ts": 50, "ph": "I", "name": "VSync", "cat": "gpu"},
            {"pid": "2", "tid": "7", "ts": "200", "dur": "80", "ph": "X", "name": "Decode", "cat": "io"},
            {"ts": 999, "ph": "M", "name": "orphan"}
        ]
    }"#
    .to_string()
}

#[test]
fn test_full_pipeline() -> Result<()> {
    let data = TraceData::parse_json(&sample_trace())?;

    assert_eq!(data.metadata.event_count, 7);
    assert_eq!(data.metadata.start_time, 0.0);
    assert_eq!(data.metadata.end_time, 1000.0);
    assert_eq!(data.processes.len(), 2);
    assert_eq!(data.processes[0].name, "Renderer");
    assert_eq!(data.processes[1].name, "Process 2");

    let events = data.all_events();
    assert_eq!(events.len(), 6);

    let criteria = FilterCriteria::builder().process_ids(vec![1]).build();
    let filtered = filter_events(&events, &criteria);
    assert_eq!(filtered.len(), 5);

    let statistics = calculate_statistics(&filtered);
    assert_eq!(statistics.total_events, 5);
    assert_eq!(
        statistics.longest_event.as_ref().map(|e| e.name.as_str()),
        Some("Frame")
    );
    assert_eq!(
        statistics.category_distribution.values().sum::<usize>(),
        statistics.total_events
    );

    let mut roots = build_tree(&filtered);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].event.name, "Frame");
    assert_eq!(roots[0].children.len(), 2);
    assert_eq!(roots[0].children[0].event.name, "Layout");
    assert_eq!(roots[0].children[0].children[0].event.name, "Measure");
    assert_eq!(roots[0].children[0].children[0].depth, 2);

    let viewport = Viewport::new(data.metadata.start_time, data.metadata.end_time);
    layout(&mut roots, 1000.0, viewport.start, viewport.end);
    assert_eq!(roots[0].width, 1000.0);

    let geometry = RowGeometry::new(&roots, 400.0);
    let hit = hit_test(&roots, &geometry, 200.0, geometry.row_top(1) + 1.0);
    assert_eq!(hit.map(|e| e.name.as_str()), Some("Layout"));

    Ok(())
}

#[test]
fn test_export_roundtrip_through_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let trace_path = temp_dir.path().join("trace.json");
    let export_path = temp_dir.path().join("analysis.json");
    fs::write(&trace_path, sample_trace())?;

    let data = TraceData::parse_file(&trace_path)?;
    let events = data.all_events();
    let criteria = FilterCriteria::builder()
        .event_types(vec!["X".to_string()])
        .build();
    let filtered = filter_events(&events, &criteria);
    let statistics = calculate_statistics(&filtered);

    let file = fs::File::create(&export_path)?;
    write_analysis(
        file,
        &AnalysisExport {
            events: &filtered,
            statistics: &statistics,
            filters: &criteria,
            metadata: &data.metadata,
        },
    )?;

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export_path)?)?;
    assert_eq!(value["events"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["statistics"]["totalEvents"], 5);
    assert_eq!(value["filters"]["eventTypes"][0], "X");
    assert_eq!(value["metadata"]["eventCount"], 7);

    // the export is itself ingestible as an event array
    let events_json = serde_json::to_string(&value["events"])?;
    let reloaded = TraceData::parse_json(&events_json)?;
    assert_eq!(reloaded.metadata.event_count, 5);

    Ok(())
}

#[test]
fn test_viewport_drives_visible_slice() -> Result<()> {
    let data = TraceData::parse_json(&sample_trace())?;
    let events = data.all_events();

    let full = Viewport::new(data.metadata.start_time, data.metadata.end_time);
    assert_eq!(full.visible_slice(&events).len(), events.len());

    let zoomed = Viewport::new(90.0, 160.0);
    let visible = zoomed.visible_slice(&events);
    let names: Vec<&str> = visible.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Layout", "Measure"]);

    // panning right moves the window backward in time
    let panned = zoomed.pan(500.0, 1000.0);
    assert!(panned.start < zoomed.start);

    Ok(())
}

#[test]
fn test_degenerate_trace_is_total() -> Result<()> {
    let data = TraceData::parse_json("[]")?;
    assert_eq!(data.metadata.event_count, 0);
    assert!(data.metadata.start_time.is_infinite());

    let events = data.all_events();
    let filtered = filter_events(&events, &FilterCriteria::default());
    let statistics = calculate_statistics(&filtered);
    assert_eq!(statistics.total_events, 0);
    assert_eq!(statistics.average_duration, 0.0);
    assert!(build_tree(&filtered).is_empty());

    Ok(())
}
