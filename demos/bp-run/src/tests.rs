//! Tests for the run file.

#[cfg(test)]
mod run_file {
    use std::path::{Path, PathBuf};

    use crate::run_file::{Format, RunFile};

    #[test]
    fn relative_paths_resolve_against_base() {
        let json = r#"{
            "network": "net.csv",
            "origins": "/data/origins.csv",
            "pois":    "pois.csv",
            "output":  { "dir": "out", "format": "sqlite" }
        }"#;
        let run = RunFile::parse(json, Path::new("/runs/a")).unwrap();
        assert_eq!(run.network, PathBuf::from("/runs/a/net.csv"));
        assert_eq!(run.origins, PathBuf::from("/data/origins.csv"));
        assert_eq!(run.pois, PathBuf::from("/runs/a/pois.csv"));
        assert_eq!(run.output.dir, PathBuf::from("/runs/a/out"));
        assert_eq!(run.output.format, Format::Sqlite);
        assert!(!run.output.export_routes);
        assert_eq!(run.config, bp_core::FlowConfig::default());
    }

    #[test]
    fn poi_layer_is_required() {
        let json = r#"{
            "network":    "net.csv",
            "origins":    "origins.csv",
            "workplaces": "work.csv",
            "output":     { "dir": "out" }
        }"#;
        let err = RunFile::parse(json, Path::new("")).unwrap_err();
        assert!(err.to_string().contains("pois"), "{err}");
    }
}
