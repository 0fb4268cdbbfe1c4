//! Integration tests for memocache

mod library_tests {
    use memocache::{
        create_manager, CacheItemPool, CacheItemPoolExt, CacheManagerExt, Configuration, ErrorCode,
        FilesystemCacheManager,
    };
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Configuration {
        let mut config = Configuration::new();
        config.set_directory(temp.path().join("pools"));
        config
    }

    #[test]
    fn values_survive_a_new_session() {
        let temp = TempDir::new().unwrap();

        {
            let mut manager = create_manager(config_in(&temp)).unwrap();
            let pool = manager.pool("users").unwrap();
            let mut pool = pool.borrow_mut();
            let mut item = pool.get_item("alice").unwrap();
            item.set(json!({"age": 31}));
            assert!(pool.save(&item));
        }

        let mut manager = create_manager(config_in(&temp)).unwrap();
        let pool = manager.pool("users").unwrap();
        let item = pool.borrow_mut().get_item("alice").unwrap();
        assert!(item.is_hit());
        assert_eq!(item.get(), Some(&json!({"age": 31})));
    }

    #[test]
    fn creator_seeds_new_pool() {
        let temp = TempDir::new().unwrap();
        let mut manager = create_manager(config_in(&temp)).unwrap();

        let pool = manager
            .pool_with("test", || (0..10).map(|i| (format!("test{}", i), i)))
            .unwrap();
        let mut pool = pool.borrow_mut();

        assert_eq!(pool.len(), 10);
        assert_eq!(pool.get_item("test7").unwrap().get(), Some(&json!(7)));
        assert!(pool.delete_item("test7").unwrap());

        let keys = ["test6", "test7", "test8"];
        let hits: Vec<bool> = pool
            .get_items(&keys)
            .map(|found| found.unwrap().1.is_hit())
            .collect();
        assert_eq!(hits, vec![true, false, true]);
        assert!(temp.path().join("pools").join("test").exists());
    }

    #[test]
    fn concurrent_session_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let mut first = FilesystemCacheManager::new(config_in(&temp));
        let mut second = FilesystemCacheManager::new(config_in(&temp));

        let a = first.pool_with("shared", || [("k", "a")]).unwrap();
        let b = second.pool("shared").unwrap();

        sleep(Duration::from_millis(50));
        let mut item = a.borrow_mut().get_item("k").unwrap();
        item.set("from first");
        assert!(a.borrow_mut().save(&item));

        let mut item = b.borrow_mut().get_item("k").unwrap();
        item.set("from second");
        assert!(!b.borrow_mut().save(&item));

        drop((a, b, first, second));

        let mut reader = FilesystemCacheManager::new(config_in(&temp));
        let pool = reader.pool("shared").unwrap();
        let item = pool.borrow_mut().get_item("k").unwrap();
        assert_eq!(item.get(), Some(&json!("from first")));
    }

    #[test]
    fn traversal_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        let mut manager = create_manager(config_in(&temp)).unwrap();

        for name in ["../evil", "a/b", ".."] {
            let err = manager.pool(name).unwrap_err();
            assert_eq!(err.code(), ErrorCode::BadFileName);
        }
        assert!(!temp.path().join("pools").exists());
    }

    #[test]
    fn past_expiration_is_a_miss() {
        let mut config = Configuration::new();
        config.set_implementation("debug").unwrap();
        let mut manager = create_manager(config).unwrap();
        let pool = manager.pool("p").unwrap();
        let mut pool = pool.borrow_mut();

        let mut item = pool.get_item("gone").unwrap();
        item.set(1).expires_after(Some(chrono::Duration::zero()));
        assert!(pool.save(&item));
        assert!(!pool.get_item("gone").unwrap().is_hit());
        assert!(!pool.has_item("gone").unwrap());
    }

    #[test]
    fn clearing_twice_succeeds() {
        let temp = TempDir::new().unwrap();
        let mut manager = create_manager(config_in(&temp)).unwrap();
        let pool = manager.pool_with("c", || [("x", 1)]).unwrap();

        assert!(pool.borrow_mut().clear());
        assert!(pool.borrow_mut().clear());
        assert!(pool.borrow().is_empty());
    }

    #[test]
    fn empty_pool_file_removed_on_release() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pools").join("tmp");

        {
            let mut manager = create_manager(config_in(&temp)).unwrap();
            let pool = manager.pool_with("tmp", || [("x", 1)]).unwrap();
            assert!(path.exists());
            assert!(pool.borrow_mut().delete_item("x").unwrap());
        }

        assert!(!path.exists());
    }

    #[test]
    fn new_item_follows_configured_default() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.set_default_expiration(-1);
        let mut manager = create_manager(config).unwrap();
        let pool = manager.pool("p").unwrap();
        let mut pool = pool.borrow_mut();

        let mut item = memocache::CacheItem::new("k");
        item.set(1).expires_at(None);
        assert!(pool.save(&item));
        assert!(!pool.has_item("k").unwrap());
    }

    #[test]
    fn unknown_implementation_fails() {
        let mut config = Configuration::new();
        let err = config.set_implementation("redis").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidImplementation);
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn memocache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("memocache");
        cmd.env_remove("MEMOCACHE_CONFIG")
            .env_remove("MEMOCACHE_DIR")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--dir")
            .arg(temp.path().join("pools"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        memocache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("inspect and maintain cache pools"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        memocache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("memocache"));
    }

    #[test]
    fn list_empty() {
        let temp = TempDir::new().unwrap();
        memocache(&temp)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No pools found"));
    }

    #[test]
    fn list_leaves_empty_pool_files() {
        let temp = TempDir::new().unwrap();
        let pools = temp.path().join("pools");
        std::fs::create_dir_all(&pools).unwrap();
        std::fs::write(pools.join("idle"), "{}").unwrap();

        memocache(&temp)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"entries\": 0"));
        assert!(pools.join("idle").exists());
    }

    #[test]
    fn set_get_show() {
        let temp = TempDir::new().unwrap();

        memocache(&temp)
            .args(["set", "users", "alice", r#"{"age":31}"#])
            .assert()
            .success();

        memocache(&temp)
            .args(["get", "users", "alice"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"age\": 31"));

        memocache(&temp)
            .args(["show", "users", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("alice"));

        memocache(&temp)
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("users"));
    }

    #[test]
    fn delete_makes_a_miss() {
        let temp = TempDir::new().unwrap();

        memocache(&temp)
            .args(["set", "p", "k", "hello"])
            .assert()
            .success();
        memocache(&temp)
            .args(["delete", "p", "k"])
            .assert()
            .success();
        memocache(&temp)
            .args(["get", "p", "k"])
            .assert()
            .success()
            .stderr(predicate::str::contains("miss:"));
    }

    #[test]
    fn bad_pool_name_fails() {
        let temp = TempDir::new().unwrap();
        memocache(&temp)
            .args(["get", "../evil", "k"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Bad pool name"));
    }

    #[test]
    fn config_path_and_init() {
        let temp = TempDir::new().unwrap();

        memocache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        memocache(&temp)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(temp.path().join("config.toml").exists());

        memocache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("implementation = \"filesystem\""));
    }
}
