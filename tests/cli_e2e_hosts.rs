//! End-to-end tests for the `hosts` command.

mod common;
use common::prelude::*;

const VHOSTS: &str = "<VirtualHost *:80>
  ServerName a.dev
  DocumentRoot \"/srv/a/public\"
</VirtualHost>

<VirtualHost *:80>
  ServerName c.dev
  DocumentRoot \"/srv/c/public\"
</VirtualHost>
";

fn fixture() -> TestFixture {
    TestFixture::new()
        .with_conf(&format!(
            "{}\nInclude extra/vhosts.conf\n",
            configs::COMPLETE
        ))
        .with_file("extra/vhosts.conf", VHOSTS)
        .with_file("hosts", "127.0.0.1 localhost a.dev\n127.0.0.1 b.dev\n")
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_hosts_reports_difference() {
    let fixture = fixture();

    fixture
        .command()
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("c.dev has no entry in"))
        .stdout(predicate::str::contains("b.dev has no virtual host"));

    assert_eq!(
        fixture.read("hosts"),
        "127.0.0.1 localhost a.dev\n127.0.0.1 b.dev\n"
    );
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_hosts_apply_adds_missing_aliases() {
    let fixture = fixture();

    fixture
        .command()
        .arg("hosts")
        .arg("--apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 1 name(s)"));

    assert_eq!(
        fixture.read("hosts"),
        "127.0.0.1 localhost a.dev\n127.0.0.1 b.dev\n127.0.0.1 c.dev\n"
    );

    fixture
        .command()
        .arg("hosts")
        .arg("--apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added").not());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_hosts_in_agreement() {
    let fixture = fixture().with_file("hosts", "127.0.0.1 a.dev c.dev\n");

    fixture
        .command()
        .arg("hosts")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK]"))
        .stdout(predicate::str::contains("agree on 2 name(s) under .dev"));
}
