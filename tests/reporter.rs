use pkbind::prelude::*;
use pkbind::report::PlotFiles;

fn small_output() -> SimulationOutput {
    let mut config = SimulationConfig::default();
    config.time.tmax = 3600.0;
    config.time.tres = 20;
    config.validate().unwrap().run().unwrap()
}

#[test]
fn mismatched_series_is_reported_before_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = small_output();
    output.forcing = output.forcing.slice(ndarray::s![..5]).to_owned();

    let reporter = Reporter::new(ReportConfig {
        output_dir: dir.path().join("plots"),
        ..Default::default()
    });
    let err = reporter.render(&output).unwrap_err();
    match err {
        PkbindError::Report { path, message } => {
            assert_eq!(path, dir.path().join("plots").join("I_of_t.png"));
            assert!(message.contains("20 time points"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    // The directory is created, but nothing is drawn
    assert!(dir.path().join("plots").is_dir());
    assert!(!dir.path().join("plots").join("I_of_t.png").exists());
}

#[test]
fn report_settings_follow_the_configuration() {
    let config = SimulationConfig::from_json(
        r#"{ "report": { "output_dir": "out", "format": "svg", "files": { "iblood": "blood" } } }"#,
    )
    .unwrap();
    assert_eq!(config.report.format, ImageFormat::Svg);
    assert_eq!(config.report.files.iblood, "blood");
    assert_eq!(config.report.files.itissue, PlotFiles::default().itissue);

    let reporter = Reporter::new(config.report);
    assert_eq!(
        reporter.path_for("blood"),
        std::path::PathBuf::from("out/blood.svg")
    );
}

#[test]
fn renders_five_svg_plots() {
    let dir = tempfile::tempdir().unwrap();
    let output = small_output();
    let reporter = Reporter::new(ReportConfig {
        output_dir: dir.path().to_path_buf(),
        format: ImageFormat::Svg,
        ..Default::default()
    });

    let written = reporter.render(&output).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["I_of_t.svg", "Iblood.svg", "Itissue.svg", "frac_bound.svg", "bound.svg"]
    );
    for path in &written {
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"));
    }
}

#[test]
fn renders_five_png_plots_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = small_output();
    let reporter = Reporter::new(ReportConfig {
        output_dir: dir.path().join("png"),
        ..Default::default()
    });

    let written = reporter.render(&output).unwrap();
    assert_eq!(written.len(), 5);
    for stem in ["I_of_t", "Iblood", "Itissue", "frac_bound", "bound"] {
        let path = dir.path().join("png").join(format!("{stem}.png"));
        assert!(written.contains(&path), "{} not reported", path.display());
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}
