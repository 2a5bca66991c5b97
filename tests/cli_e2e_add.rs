//! End-to-end tests for the `add` command.

mod common;
use common::prelude::*;

fn blog_block(fixture: &TestFixture) -> String {
    format!(
        "<VirtualHost *:80>\n  ServerName blog.dev\n  DocumentRoot \"{}\"\n</VirtualHost>",
        fixture.app_root().join("public").display()
    )
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_writes_vhost_and_alias() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    fixture
        .command()
        .arg("add")
        .arg("blog")
        .arg("--root")
        .arg(fixture.app_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Virtual host blog.dev serving"))
        .stdout(predicate::str::contains("127.0.0.1 blog.dev added to"));

    let managed = fixture.read("conf/extra/passenger.conf");
    assert!(managed.contains(&blog_block(&fixture)));
    assert_eq!(
        fixture.read("hosts"),
        "127.0.0.1 localhost\n127.0.0.1 blog.dev\n"
    );
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_twice_is_idempotent() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    for _ in 0..2 {
        fixture
            .command()
            .arg("add")
            .arg("blog")
            .arg("--root")
            .arg(fixture.app_root())
            .assert()
            .success();
    }

    let managed = fixture.read("conf/extra/passenger.conf");
    assert_eq!(managed.matches("<VirtualHost").count(), 1);
    assert_eq!(fixture.read("hosts").matches("blog.dev").count(), 1);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_defaults_root_to_current_directory() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    fixture
        .command()
        .current_dir(fixture.app_root())
        .arg("add")
        .arg("blog")
        .assert()
        .success();

    let managed = fixture.read("conf/extra/passenger.conf");
    assert!(managed.contains("ServerName blog.dev"));
    assert!(managed.contains("/apps/blog/public\""));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_custom_domain_and_ip() {
    let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);

    fixture
        .command()
        .arg("add")
        .arg("blog")
        .arg("--root")
        .arg(fixture.app_root())
        .arg("--domain")
        .arg("..test")
        .arg("--ip")
        .arg("10.0.0.5")
        .assert()
        .success();

    assert!(fixture
        .read("conf/extra/passenger.conf")
        .contains("ServerName blog.test"));
    assert!(fixture.read("hosts").contains("10.0.0.5 blog.test"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_uses_configured_listen_address() {
    let fixture = TestFixture::new().with_conf(&format!(
        "User www\n{}\nNameVirtualHost 127.0.0.1:8080\n",
        configs::LOAD
    ));

    // The second run finds the managed file through the marker.
    for _ in 0..2 {
        fixture
            .command()
            .arg("add")
            .arg("blog")
            .arg("--root")
            .arg(fixture.app_root())
            .assert()
            .success();
    }

    let managed = fixture.read("conf/extra/passenger.conf");
    assert!(managed.contains("<VirtualHost 127.0.0.1:8080>"));
    assert_eq!(managed.matches("<VirtualHost").count(), 1);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_permission_check_failure() {
    let fixture = TestFixture::new()
        .with_conf(configs::LOAD_ONLY)
        .with_setting("permission_command: [test, -d, \"{dir}\"]");

    fixture
        .command()
        .arg("add")
        .arg("blog")
        .arg("--root")
        .arg(fixture.path().join("apps/missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Your Apache user \"www\" can't read"));

    assert_eq!(fixture.read("hosts"), "127.0.0.1 localhost\n");
}
