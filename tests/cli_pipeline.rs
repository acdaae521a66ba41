use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use predicates::prelude::*;
use runway_watcher::shows::Look;

struct StubSite {
    base_url: String,
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Drop for StubSite {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn spawn_runway_site() -> StubSite {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = request.url().to_string();
            if url.contains('?') {
                let _ = request.respond(
                    tiny_http::Response::from_string("query is not supported in this test server")
                        .with_status_code(400),
                );
                continue;
            }

            let (status, body) = match url.as_str() {
                "/fashion-shows/seasons" => (
                    200,
                    r#"<!doctype html>
<html>
  <body>
    <a href="/fashion-shows/latest-shows">Latest</a>
    <a href="/fashion-shows/spring-2024">Spring 2024</a>
    <a href="/fashion-shows/fall-2023?ref=nav">Fall 2023</a>
    <a href="/fashion-shows/fall-2023/alpha">A show</a>
  </body>
</html>
"#,
                ),
                "/fashion-shows/fall-2023" => (
                    200,
                    r#"<!doctype html>
<html>
  <body>
    <a href="/fashion-shows/fall-2023/alpha?ref=grid">Alpha</a>
    <a href="/fashion-shows/fall-2023/alpha/gallery">Alpha gallery</a>
    <a href="/fashion-shows/fall-2023/broken-house">Broken</a>
  </body>
</html>
"#,
                ),
                "/fashion-shows/fall-2023/alpha" => (
                    200,
                    r#"<!doctype html>
<html>
  <body>
    <figure><img src="/img/a1-small.jpg" data-src="/img/a1.jpg?w=1200"><figcaption>Look 1</figcaption></figure>
    <figure><figcaption>Advertisement</figcaption></figure>
    <figure><img src="/img/a2.jpg"></figure>
  </body>
</html>
"#,
                ),
                "/fashion-shows/spring-2024" => (200, "<!doctype html><html><body></body></html>"),
                "/fashion-shows/fall-2023/broken-house" => (500, "boom"),
                _ => (404, "not found"),
            };

            let mut response = tiny_http::Response::from_string(body).with_status_code(status);
            if status == 200 {
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/html; charset=utf-8"[..],
                )
                .expect("build header");
                response = response.with_header(header);
            }
            let _ = request.respond(response);
        }
    });

    StubSite {
        base_url,
        shutdown_tx,
        handle: Some(handle),
    }
}

fn runway_cmd(site: &StubSite, workdir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("runway-watcher");
    cmd.env("RUNWAY_WATCHER_BASE_URL", &site.base_url)
        .arg("--data-dir")
        .arg(workdir.join("data"))
        .arg("--site-dir")
        .arg(workdir.join("site"));
    cmd
}

#[test]
fn watch_reports_new_seasons_once() -> anyhow::Result<()> {
    let site = spawn_runway_site();
    let temp = tempfile::TempDir::new()?;

    runway_cmd(&site, temp.path())
        .arg("watch")
        .assert()
        .code(1)
        .stdout("fall-2023\nspring-2024\n");

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("data/state_seasons.json"))?)?;
    assert_eq!(
        state["known_season_slugs"],
        serde_json::json!(["fall-2023", "spring-2024"])
    );
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("data/new_seasons.json"))?)?;
    assert_eq!(
        report["new_seasons"],
        serde_json::json!(["fall-2023", "spring-2024"])
    );

    runway_cmd(&site, temp.path())
        .arg("watch")
        .assert()
        .code(0)
        .stdout("");

    Ok(())
}

#[test]
fn scrape_writes_season_csv() -> anyhow::Result<()> {
    let site = spawn_runway_site();
    let temp = tempfile::TempDir::new()?;
    let csv_path = temp.path().join("data/seasons/fall-2023.csv");

    runway_cmd(&site, temp.path())
        .args(["scrape", "fall-2023", "--delay-ms", "0"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("fall-2023.csv"));

    let mut reader = csv::Reader::from_path(&csv_path)?;
    let headers = reader.headers()?.clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "season",
            "designer",
            "look_number",
            "image_url",
            "caption",
            "source_url"
        ]
    );
    let looks = reader
        .deserialize()
        .collect::<Result<Vec<Look>, _>>()?;
    assert_eq!(looks.len(), 2);
    assert_eq!(looks[0].designer, "Alpha");
    assert_eq!(looks[0].look_number, 1);
    assert_eq!(looks[0].image_url, format!("{}/img/a1.jpg", site.base_url));
    assert_eq!(looks[0].caption, "Look 1");
    assert_eq!(looks[1].look_number, 2);
    assert_eq!(looks[1].caption, "");
    assert_eq!(
        looks[1].source_url,
        format!("{}/fashion-shows/fall-2023/alpha", site.base_url)
    );

    Ok(())
}

#[test]
fn scrape_without_looks_exits_2_and_writes_nothing() -> anyhow::Result<()> {
    let site = spawn_runway_site();
    let temp = tempfile::TempDir::new()?;

    runway_cmd(&site, temp.path())
        .args(["scrape", "spring-2024", "--delay-ms", "0"])
        .assert()
        .code(2)
        .stdout("");

    assert!(!temp.path().join("data/seasons/spring-2024.csv").exists());
    Ok(())
}

#[test]
fn scrape_requires_a_season_argument() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("runway-watcher");
    cmd.env("RUNWAY_WATCHER_BASE_URL", "http://127.0.0.1:9")
        .arg("scrape")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn index_lists_scraped_season_csvs() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let csv_dir = temp.path().join("data/seasons");
    fs::create_dir_all(&csv_dir)?;
    fs::write(csv_dir.join("spring-2024.csv"), "season\n")?;
    fs::write(csv_dir.join("fall-2023.csv"), "season\n")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("runway-watcher");
    cmd.arg("--data-dir")
        .arg(temp.path().join("data"))
        .arg("--site-dir")
        .arg(temp.path().join("site"))
        .args(["index", "--extension", "csv"])
        .assert()
        .success();

    let html = fs::read_to_string(temp.path().join("site/index.html"))?;
    let fall = html
        .find(r#"<a href="../data/seasons/fall-2023.csv">Fall 2023</a>"#)
        .expect("fall link");
    let spring = html
        .find(r#"<a href="../data/seasons/spring-2024.csv">Spring 2024</a>"#)
        .expect("spring link");
    assert!(fall < spring);
    assert_eq!(html.matches("<a href=").count(), 2);
    Ok(())
}

#[test]
fn update_runs_the_whole_pipeline() -> anyhow::Result<()> {
    let site = spawn_runway_site();
    let temp = tempfile::TempDir::new()?;

    runway_cmd(&site, temp.path())
        .args(["update", "--delay-ms", "0"])
        .assert()
        .code(1)
        .stdout("fall-2023\n");

    assert!(temp.path().join("site/seasons/fall-2023.html").exists());
    assert!(!temp.path().join("site/seasons/spring-2024.html").exists());
    let index = fs::read_to_string(temp.path().join("site/index.html"))?;
    assert!(index.contains("Fall 2023"));
    assert!(!index.contains("Spring 2024"));

    runway_cmd(&site, temp.path())
        .arg("update")
        .assert()
        .code(0)
        .stdout("");
    Ok(())
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let temp = tempfile::TempDir::new().expect("tempdir");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("runway-watcher");
    cmd.env("RUST_LOG", "debug")
        .arg("--site-dir")
        .arg(temp.path().join("site"))
        .arg("index")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
