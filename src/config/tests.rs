use super::ReduceConfig;
use figment::Jail;

fn jail_err(err: anyhow::Error) -> figment::Error {
    figment::Error::from(format!("{err:#}"))
}

#[test]
fn test_config_loads_defaults() {
    Jail::expect_with(|_jail| {
        let config = ReduceConfig::load().map_err(jail_err)?;

        assert_eq!(config, ReduceConfig::default());
        assert_eq!(config.thread_percentage, 75);
        assert_eq!(config.max_threads, 0);
        assert_eq!(config.min_items_for_parallel, 10_000);
        Ok(())
    });
}

#[test]
fn test_repo_config_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "parallel-sum.toml",
            r#"
                max_threads = 4
                min_items_for_parallel = 500
            "#,
        )?;

        let config = ReduceConfig::load().map_err(jail_err)?;
        assert_eq!(config.max_threads, 4);
        assert_eq!(config.min_items_for_parallel, 500);
        assert_eq!(config.thread_percentage, 75);
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("parallel-sum.toml", "max_threads = 4")?;
        jail.set_env("PARALLEL_SUM_MAX_THREADS", 2);
        jail.set_env("PARALLEL_SUM_THREAD_PERCENTAGE", 50);

        let config = ReduceConfig::load().map_err(jail_err)?;
        assert_eq!(config.max_threads, 2);
        assert_eq!(config.thread_percentage, 50);
        Ok(())
    });
}

#[test]
fn test_invalid_thread_percentage_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("PARALLEL_SUM_THREAD_PERCENTAGE", 0);
        assert!(ReduceConfig::load().is_err());
        Ok(())
    });

    let config = ReduceConfig {
        thread_percentage: 101,
        ..ReduceConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_explicit_path() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            "thread_percentage = 100\nmin_items_for_parallel = 1\n",
        )?;
        let path = jail.directory().join("custom.toml");

        let config = ReduceConfig::load_from(&path).map_err(jail_err)?;
        assert_eq!(config.thread_percentage, 100);
        assert_eq!(config.min_items_for_parallel, 1);
        Ok(())
    });
}

#[test]
fn test_load_from_missing_path_fails() {
    Jail::expect_with(|jail| {
        let result = ReduceConfig::load_from(jail.directory().join("absent.toml"));
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_worker_budget_respects_cap() {
    let capped = ReduceConfig {
        max_threads: 2,
        thread_percentage: 100,
        ..ReduceConfig::default()
    };
    assert!((1..=2).contains(&capped.worker_budget()));

    let uncapped = ReduceConfig {
        max_threads: 0,
        thread_percentage: 100,
        ..ReduceConfig::default()
    };
    assert_eq!(uncapped.worker_budget(), num_cpus::get());
}

#[test]
fn test_worker_budget_never_zero() {
    let config = ReduceConfig {
        max_threads: 0,
        thread_percentage: 1,
        ..ReduceConfig::default()
    };
    assert!(config.worker_budget() >= 1);
}
