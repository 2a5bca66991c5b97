//! End-to-end tests for the `setup` command.

mod common;
use common::prelude::*;

const MARKER: &str = "#----- passenger-conf marker line -- DO NOT DELETE -----#";

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_synthesizes_and_creates_managed_file() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    fixture
        .command()
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ADD] PassengerRoot"))
        .stdout(predicate::str::contains("Created"));

    let conf = fixture.read("conf/httpd.conf");
    let lines: Vec<&str> = conf.lines().collect();
    assert_eq!(lines[3], configs::LOAD);
    assert_eq!(
        lines[4],
        "PassengerRoot /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6"
    );
    assert_eq!(lines[5], "PassengerRuby /opt/local/bin/ruby");
    assert_eq!(lines[6], "RailsEnv development");
    assert_eq!(lines[7], "NameVirtualHost *:80");
    assert_eq!(lines[8], MARKER);
    assert_eq!(
        lines[9],
        format!(
            "Include {}",
            fixture.path().join("conf/extra/passenger.conf").display()
        )
    );
    assert!(fixture.path().join("conf/extra/passenger.conf").is_file());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_twice_changes_nothing() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    fixture.command().arg("setup").assert().success();
    let after_first = fixture.read("conf/httpd.conf");

    fixture
        .command()
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Managed file:"))
        .stdout(predicate::str::contains("[ADD]").not());

    assert_eq!(fixture.read("conf/httpd.conf"), after_first);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_reuses_rails_env_file() {
    let fixture = TestFixture::new()
        .with_conf(&format!(
            "{}\nNameVirtualHost *:80\nInclude other/rails.conf\n",
            configs::LOAD
        ))
        .with_file("other/rails.conf", "RailsEnv development\n");

    fixture
        .command()
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Managed file:"))
        .stdout(predicate::str::contains("rails.conf"));

    assert!(!fixture.read("conf/httpd.conf").contains(MARKER));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_without_module_changes_nothing() {
    let fixture = TestFixture::new().with_conf(configs::NO_MODULE);

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LoadModule passenger_module line missing"));

    assert_eq!(fixture.read("conf/httpd.conf"), configs::NO_MODULE);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_non_include_after_marker() {
    let fixture = TestFixture::new().with_conf(&format!("Listen 80\n{MARKER}\nUser www\n"));

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Non-include following marker line"))
        .stderr(predicate::str::contains("httpd.conf:3"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_no_unique_filename() {
    let mut fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);
    for name in [
        "passenger.conf",
        "mod_rails.conf",
        "httpd-passenger.conf",
        "httpd-mod_rails.conf",
        "j20qmcjidhe93knd.conf",
    ] {
        fixture = fixture.with_file(&format!("conf/extra/{name}"), "");
    }

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Couldn't find a unique filename"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_setup_reload_failure_is_reported() {
    let fixture = TestFixture::new()
        .with_conf(configs::LOAD_ONLY)
        .with_setting("reload_command: [\"false\"]");

    fixture
        .command()
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Command failed: false"));
}
