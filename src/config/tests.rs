//! Configuration Module Tests
//!
//! ## Test Scopes
//! - **Arguments**: Parsing of `name/workers` source arguments.
//! - **Merging**: Arguments overriding isins, sources, workers, proxy and database.
//! - **Validation**: Rejection of unknown sources, missing keys, bad workers and proxies.
//! - **Plan**: Grouping of the isins by source.

#[cfg(test)]
mod tests {
    use crate::config::{parse_arg_source, Config, ConfigError, GetArgs, DEFAULT_WORKERS};
    use std::path::Path;
    use uuid::Uuid;

    const TOR: &str = "socks5://127.0.0.1:9050";
    const OTHER: &str = "https://127.0.0.1:7777";

    const CONFIG1: &str = r#"{
        "workers": 5,
        "proxy": "other",
        "proxies": [
            {"proxy": "tor", "url": "socks5://127.0.0.1:9050"},
            {"proxy": "none"},
            {"proxy": "other", "url": "https://127.0.0.1:7777"}
        ],
        "sources": [
            {"source": "source1", "proxy": "none"},
            {"source": "source2", "proxy": "tor", "workers": 2},
            {"source": "source3", "workers": 3}
        ],
        "isins": [
            {"isin": "isin1", "name": "Name of isin1", "sources": ["source1"]},
            {"isin": "isin2", "name": "Name of isin2", "sources": ["source1", "source2"]}
        ]
    }"#;

    fn all_sources() -> Vec<String> {
        ["source1", "source2", "source3", "sourceX"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn config(json: &str) -> Config {
        Config::from_json(json, Path::new("test.json")).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Args selecting one new isin and every available source.
    fn args_all_sources() -> GetArgs {
        GetArgs {
            isins: strings(&["isinY"]),
            sources: all_sources(),
            ..Default::default()
        }
    }

    fn resolve(json: &str, args: &GetArgs) -> Result<Config, ConfigError> {
        config(json).resolve(args, &all_sources())
    }

    // ============================================================
    // TEST 1: SOURCE ARGUMENTS
    // ============================================================

    #[test]
    fn test_parse_arg_source() {
        assert_eq!(parse_arg_source("source").unwrap(), ("source".to_string(), 0));
        assert_eq!(parse_arg_source("source:99").unwrap(), ("source".to_string(), 99));
        assert_eq!(parse_arg_source("source/99").unwrap(), ("source".to_string(), 99));
        assert_eq!(parse_arg_source("source#99").unwrap(), ("source".to_string(), 99));

        for input in ["source:", "#99", "source#nan", "source/0", "source:-2"] {
            let err = parse_arg_source(input).unwrap_err();
            assert_eq!(err.to_string(), format!("invalid source in args: {:?}", input));
        }
    }

    // ============================================================
    // TEST 2: MERGING ARGUMENTS
    // ============================================================

    #[test]
    fn test_merge_args_selects_isins_and_sources() {
        // ARRANGE
        let mut cfg = config(CONFIG1);
        let args = GetArgs {
            proxy: Some("http://arg.proxy:8080".to_string()),
            isins: strings(&["isin1", "isinY"]),
            sources: strings(&["source1#101", "source2", "sourceY/12"]),
            ..Default::default()
        };

        // ACT
        cfg.merge_args(&args).unwrap();
        cfg.add_all_sources(&all_sources(), true);

        // ASSERT: only the passed sources are enabled
        assert_eq!(cfg.proxy, "http://arg.proxy:8080");
        assert_eq!(cfg.sources["source1"].workers, 101);
        assert_eq!(cfg.sources["source2"].workers, 2);
        assert_eq!(cfg.sources["sourceY"].workers, 12);
        for (name, item) in &cfg.sources {
            let passed = ["source1", "source2", "sourceY"].contains(&name.as_str());
            assert_eq!(item.disabled, !passed, "source {:?}", name);
        }

        // Only the passed isins are enabled, each using the passed sources
        for (isin, item) in &cfg.isins {
            let passed = isin == "isin1" || isin == "isinY";
            assert_eq!(item.disabled, !passed, "isin {:?}", isin);
            assert_eq!(item.sources, strings(&["source1", "source2", "sourceY"]));
        }
    }

    #[test]
    fn test_merge_args_without_sources_keeps_unlisted_sources_enabled() {
        let mut cfg = config(CONFIG1);
        cfg.merge_args(&GetArgs::default()).unwrap();
        cfg.add_all_sources(&all_sources(), false);

        assert!(!cfg.sources["sourceX"].disabled);
        assert_eq!(cfg.isins["isin1"].sources, strings(&["source1"]));
    }

    #[test]
    fn test_args_proxy() {
        // (title, passed proxy, source1, source2, source3, sourceX)
        let cases = [
            ("passed", Some("http://arg.proxy:8080"), "", TOR, "http://arg.proxy:8080", "http://arg.proxy:8080"),
            ("passed-ref", Some("tor"), "", TOR, TOR, TOR),
            ("passed-empty", Some(""), "", TOR, "", ""),
            ("not-passed", None, "", TOR, OTHER, OTHER),
        ];

        for (title, proxy, want1, want2, want3, want_x) in cases {
            let args = GetArgs {
                proxy: proxy.map(str::to_string),
                ..args_all_sources()
            };
            let cfg = resolve(CONFIG1, &args).unwrap();

            assert_eq!(cfg.sources["source1"].proxy, want1, "{}: source1.proxy", title);
            assert_eq!(cfg.sources["source2"].proxy, want2, "{}: source2.proxy", title);
            assert_eq!(cfg.sources["source3"].proxy, want3, "{}: source3.proxy", title);
            assert_eq!(cfg.sources["sourceX"].proxy, want_x, "{}: sourceX.proxy", title);
        }
    }

    #[test]
    fn test_args_workers() {
        // (title, passed workers, source1, source2, source3, sourceX)
        let cases = [("passed", Some(10), 10, 2, 3, 10), ("not-passed", None, 5, 2, 3, 5)];

        for (title, workers, want1, want2, want3, want_x) in cases {
            let args = GetArgs {
                workers,
                ..args_all_sources()
            };
            let cfg = resolve(CONFIG1, &args).unwrap();

            assert_eq!(cfg.sources["source1"].workers, want1, "{}: source1.workers", title);
            assert_eq!(cfg.sources["source2"].workers, want2, "{}: source2.workers", title);
            assert_eq!(cfg.sources["source3"].workers, want3, "{}: source3.workers", title);
            assert_eq!(cfg.sources["sourceX"].workers, want_x, "{}: sourceX.workers", title);
        }
    }

    #[test]
    fn test_args_database() {
        let args = GetArgs {
            database: Some("/home/user/quotes.jsonl".to_string()),
            ..args_all_sources()
        };
        let cfg = resolve("{}", &args).unwrap();
        assert_eq!(cfg.database, "/home/user/quotes.jsonl");
    }

    // ============================================================
    // TEST 3: WORKERS
    // ============================================================

    #[test]
    fn test_workers_errors() {
        // Passed workers must be positive
        let args = GetArgs {
            workers: Some(0),
            ..args_all_sources()
        };
        let err = resolve(CONFIG1, &args).unwrap_err();
        assert_eq!(err.to_string(), "workers must be greater than zero (found 0)");

        // Negative global workers in the file
        let err = resolve(r#"{"workers": -1}"#, &args_all_sources()).unwrap_err();
        assert!(matches!(err, ConfigError::WorkersNotPositive(-1)));

        // Negative workers of a source
        let err = resolve(
            r#"{"isins": [{"isin": "isin1"}], "sources": [{"source": "source1", "workers": -1}]}"#,
            &GetArgs::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "workers must be greater than zero (source \"source1\" has workers=-1)"
        );

        // More instances than a worker may run
        let args = GetArgs {
            isins: strings(&["isinY"]),
            sources: strings(&["source1/101"]),
            ..Default::default()
        };
        let err = resolve("{}", &args).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyWorkers { workers: 101, .. }));
    }

    #[test]
    fn test_default_workers() {
        let cfg = resolve(r#"{"workers": 0}"#, &args_all_sources()).unwrap();
        assert_eq!(cfg.sources["source1"].workers, DEFAULT_WORKERS);
        assert_eq!(cfg.sources["source1"].proxy, "");
    }

    // ============================================================
    // TEST 4: SOURCES AND ISINS
    // ============================================================

    #[test]
    fn test_only_referenced_sources_are_kept() {
        let json = r#"{"isins": [
            {"isin": "isin1", "sources": ["source1"]},
            {"isin": "isin2", "sources": ["source1", "source2"]}
        ]}"#;
        let cfg = resolve(json, &GetArgs::default()).unwrap();

        let names: Vec<&String> = cfg.sources.keys().collect();
        assert_eq!(names, vec!["source1", "source2"]);
    }

    #[test]
    fn test_unknown_sources() {
        // Unknown source in the config
        let json = r#"{"isins": [{"isin": "isin1", "sources": ["source1", "sourceZ"]}]}"#;
        let err = resolve(json, &GetArgs::default()).unwrap_err();
        assert_eq!(err.to_string(), "required source \"sourceZ\" is not available");

        // Unknown source in the arguments
        let args = GetArgs {
            isins: strings(&["isinY"]),
            sources: strings(&["sourceY"]),
            ..Default::default()
        };
        let err = resolve("{}", &args).unwrap_err();
        assert_eq!(err.to_string(), "required source \"sourceY\" is not available");
    }

    #[test]
    fn test_isin_without_enabled_sources() {
        let json = r#"{
            "isins": [{"isin": "isin1", "sources": ["source1"]}],
            "sources": [{"source": "source1", "disabled": true}]
        }"#;
        let err = resolve(json, &GetArgs::default()).unwrap_err();
        assert_eq!(err.to_string(), "isin \"isin1\" without enabled sources");
    }

    #[test]
    fn test_disabled_sources_are_dropped() {
        let json = r#"{
            "isins": [{"isin": "isin1"}],
            "sources": [{"source": "source1", "disabled": true}]
        }"#;
        let cfg = resolve(json, &GetArgs::default()).unwrap();

        let names: Vec<&String> = cfg.sources.keys().collect();
        assert_eq!(names, vec!["source2", "source3", "sourceX"]);
        assert_eq!(cfg.isins["isin1"].sources, strings(&["source2", "source3", "sourceX"]));
    }

    #[test]
    fn test_disabled_isins_are_dropped() {
        let json = r#"{"isins": [{"isin": "isin1"}, {"isin": "isin2", "disabled": true}]}"#;
        let cfg = resolve(json, &GetArgs::default()).unwrap();

        assert!(cfg.isins.contains_key("isin1"));
        assert!(!cfg.isins.contains_key("isin2"));
    }

    #[test]
    fn test_invalid_proxy() {
        let json = r#"{
            "isins": [{"isin": "isin1"}],
            "sources": [{"source": "source1", "proxy": "http://[::1"}]
        }"#;
        let err = resolve(json, &GetArgs::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid proxy: http://[::1");
    }

    #[test]
    fn test_missing_keys() {
        let cases = [
            (r#"{"proxies": [{"url": "https://proxy"}]}"#, "invalid proxies: missing \"proxy\" key"),
            (r#"{"isins": [{"sources": ["source1"]}]}"#, "invalid isins: missing \"isin\" key"),
            (r#"{"sources": [{"proxy": "https://proxy"}]}"#, "invalid sources: missing \"source\" key"),
        ];

        for (json, want) in cases {
            let err = Config::from_json(json, Path::new("test.json")).unwrap_err();
            assert_eq!(err.to_string(), want);
        }
    }

    // ============================================================
    // TEST 5: PLAN AND LOADING
    // ============================================================

    #[test]
    fn test_source_isins() {
        let cfg = resolve(CONFIG1, &GetArgs::default()).unwrap();
        let plan = cfg.source_isins();

        assert_eq!(plan.len(), 2);

        assert_eq!(plan[0].source, "source1");
        assert_eq!(plan[0].workers, 5);
        assert_eq!(plan[0].proxy, None);
        assert_eq!(plan[0].isins, strings(&["isin1", "isin2"]));

        assert_eq!(plan[1].source, "source2");
        assert_eq!(plan[1].workers, 2);
        assert_eq!(plan[1].proxy.as_deref(), Some(TOR));
        assert_eq!(plan[1].isins, strings(&["isin2"]));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("quote-config-{}.json", Uuid::new_v4()));
        std::fs::write(&path, CONFIG1).unwrap();

        let (cfg, used) = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(used.as_deref(), Some(path.as_path()));
        assert_eq!(cfg.workers, 5);
        assert_eq!(cfg.proxies["tor"], TOR);
        assert_eq!(cfg.sources.len(), 3);
        assert_eq!(cfg.isins["isin1"].name, "Name of isin1");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(Some(path.as_path())), Err(ConfigError::Parse { .. })));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(Config::load(Some(path.as_path())), Err(ConfigError::Read { .. })));
    }
}
