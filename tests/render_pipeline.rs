use feed_dash::{ChartConfig, Container, Dataset, LoadError, Page, page, render};

const DASH_CSV: &str = "\
ticker,group,ok,closed,error,fix,empty
MSFT.NASDAQ:TRADES,2024-01-01 03:00:00,50,0,2,1,0
AAPL.NASDAQ:TRADES,2024-01-01 03:00:00,40,10,0,0,0
MSFT.NASDAQ:TRADES,2024-01-01 04:00:00,60,0,0,0,0
AAPL.NASDAQ:TRADES,2024-01-01 04:00:00,,60,0,0,0
ES.GLOBEX:TRADES,2024-01-01 03:00:00,0,0,0,0,60
";

#[test]
fn csv_file_renders_one_section_per_ticker() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dash.csv");
    let output = dir.path().join("dash.html");
    std::fs::write(&input, DASH_CSV).unwrap();

    let charts =
        page::render_file(&input, &output, &ChartConfig::default(), "Feed status").unwrap();
    assert_eq!(charts, 3);

    let html = std::fs::read_to_string(&output).unwrap();
    let aapl = html.find("<h2>AAPL.NASDAQ:TRADES</h2>").unwrap();
    let es = html.find("<h2>ES.GLOBEX:TRADES</h2>").unwrap();
    let msft = html.find("<h2>MSFT.NASDAQ:TRADES</h2>").unwrap();
    assert!(aapl < es && es < msft);
    assert_eq!(html.matches("<div>").count(), 3);
    assert_eq!(html.matches("<svg ").count(), 3);
}

#[test]
fn failed_load_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.csv");
    let output = dir.path().join("broken.html");
    std::fs::write(&input, "ticker,group,x\nA,2024-01-01 00:00,1,2\n").unwrap();

    let err = page::render_file(&input, &output, &ChartConfig::default(), "t").unwrap_err();
    assert!(err.downcast_ref::<LoadError>().is_some());
    assert!(!output.exists());

    let missing = dir.path().join("missing.csv");
    assert!(page::render_file(&missing, &output, &ChartConfig::default(), "t").is_err());
    assert!(!output.exists());
}

#[test]
fn stacked_height_is_sum_of_subgroups() {
    let dataset =
        Dataset::from_reader("ticker,group,x,y\nA,2024-01-01 03:00,10,5\n".as_bytes()).unwrap();
    let config = ChartConfig::default();
    let mut container = Container::new();
    render(&mut container, &dataset, "A", &config);

    let chart = &container.charts()[0];
    assert_eq!(chart.ticks[0].label, "03");
    let expected = (10.0 + 5.0) / config.y_max * config.inner_height();
    assert!((chart.stacked_height("2024-01-01 03:00") - expected).abs() < 1e-9);
}

#[test]
fn colors_are_stable_across_renders() {
    let dataset = Dataset::from_reader(DASH_CSV.as_bytes()).unwrap();
    let config = ChartConfig::default();
    let first = Page::build(&dataset, &config);
    let second = Page::build(&dataset, &config);
    assert_eq!(first, second);

    for section in first.sections() {
        let fills: Vec<(&str, &str)> = section.container.charts()[0]
            .layers
            .iter()
            .map(|l| (l.key.as_str(), l.fill.as_str()))
            .collect();
        assert_eq!(
            fills,
            vec![
                ("ok", "#008800"),
                ("closed", "#40aabd"),
                ("error", "#cdcdcd"),
                ("fix", "#ff8e3f"),
                ("empty", "#da2ee0"),
            ]
        );
    }
}

#[test]
fn band_count_equals_row_count_per_symbol() {
    let dataset = Dataset::from_reader(DASH_CSV.as_bytes()).unwrap();
    let page = Page::build(&dataset, &ChartConfig::default());
    for section in page.sections() {
        let rows = dataset.rows_for(&section.heading).len();
        let chart = &section.container.charts()[0];
        assert_eq!(chart.bar_count(), rows);
        assert!(chart.layers.iter().all(|l| l.rects.len() == rows));
        assert!(chart
            .layers
            .iter()
            .flat_map(|l| l.rects.iter())
            .all(|r| r.height >= 0.0));
    }
}

#[test]
fn custom_layout_changes_geometry() {
    let config = ChartConfig::from_toml(
        r#"
        width = 400.0
        height = 220.0
        y_max = 100.0
        palette = ["red"]
        "#,
    )
    .unwrap();
    config.validate().unwrap();
    let dataset =
        Dataset::from_reader("ticker,group,x,y\nA,2024-01-01 03:00,50,50\n".as_bytes()).unwrap();
    let mut container = Container::new();
    render(&mut container, &dataset, "A", &config);
    let chart = &container.charts()[0];
    assert_eq!(chart.plot_height, 190.0);
    assert!((chart.stacked_height("2024-01-01 03:00") - 190.0).abs() < 1e-9);
    assert!(chart.layers.iter().all(|l| l.fill == "red"));
}
