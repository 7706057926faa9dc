mod support;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tempfile::tempdir;

use support::{run_urlprobe, spawn_http_server_or_skip};

fn host_of(base: &str) -> String {
    base.trim_start_matches("http://").to_owned()
}

fn read_export(path: &Path) -> Result<Vec<Value>, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("read export failed: {}", err))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|err| format!("parse export failed: {}", err))?;
    value
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| format!("export has no results array: {}", text))
}

fn field<'value>(result: &'value Value, key: &str) -> Option<&'value str> {
    result.get(key).and_then(Value::as_str)
}

fn check_success(output: &std::process::Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    Err(format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    ))
}

#[test]
fn e2e_exports_every_combination() -> Result<(), String> {
    let Some((base, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("results.json");
    let host = host_of(&base);

    let output = run_urlprobe(
        dir.path(),
        [
            "-u".to_owned(),
            format!("{}/json", host),
            "-u".to_owned(),
            format!("{}/nope", host),
            "-p".to_owned(),
            "http".to_owned(),
            "-X".to_owned(),
            "get".to_owned(),
            "-X".to_owned(),
            "head".to_owned(),
            "-o".to_owned(),
            "quiet".to_owned(),
            "--hide-failed".to_owned(),
            "--export-json".to_owned(),
            export.to_string_lossy().into_owned(),
        ],
    )?;
    check_success(&output)?;
    if !output.stdout.is_empty() {
        return Err(format!(
            "Quiet mode wrote to stdout: {}",
            String::from_utf8_lossy(&output.stdout)
        ));
    }

    let results = read_export(&export)?;
    if results.len() != 4 {
        return Err(format!("Expected 4 exported results, got {}", results.len()));
    }
    let combinations: BTreeSet<(Option<&str>, Option<&str>)> = results
        .iter()
        .map(|result| (field(result, "url"), field(result, "method")))
        .collect();
    let json_url = format!("{}/json", host);
    let nope_url = format!("{}/nope", host);
    let expected = BTreeSet::from([
        (Some(json_url.as_str()), Some("GET")),
        (Some(json_url.as_str()), Some("HEAD")),
        (Some(nope_url.as_str()), Some("GET")),
        (Some(nope_url.as_str()), Some("HEAD")),
    ]);
    if combinations != expected {
        return Err(format!("Unexpected exported combinations: {:?}", combinations));
    }
    let head = results
        .iter()
        .find(|result| {
            field(result, "url") == Some(json_url.as_str()) && field(result, "method") == Some("HEAD")
        })
        .ok_or("missing HEAD result")?;
    if field(head, "body") != Some("[No body]") {
        return Err(format!("Unexpected HEAD result: {}", head));
    }
    if field(head, "fullUrl") != Some(format!("http://{}", json_url).as_str()) {
        return Err(format!("Unexpected full URL: {}", head));
    }
    Ok(())
}

#[test]
fn e2e_jsonl_stdout_and_timeout() -> Result<(), String> {
    let Some((base, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_urlprobe(
        dir.path(),
        [
            "-u".to_owned(),
            format!("{}/slow", base),
            "-u".to_owned(),
            format!("{}/text", base),
            "--timeout".to_owned(),
            "300ms".to_owned(),
            "-o".to_owned(),
            "jsonl".to_owned(),
        ],
    )?;
    check_success(&output)?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let results: Vec<Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()
        .map_err(|err| format!("invalid jsonl output: {}\n{}", err, stdout))?;
    if results.len() != 2 {
        return Err(format!("Expected 2 lines, got:\n{}", stdout));
    }

    let slow = results
        .iter()
        .find(|result| field(result, "url").is_some_and(|url| url.ends_with("/slow")))
        .ok_or("missing /slow result")?;
    if slow.get("status").and_then(Value::as_u64) != Some(0)
        || field(slow, "statusText") != Some("Error")
    {
        return Err(format!("Expected timed-out result: {}", slow));
    }
    if !field(slow, "body").is_some_and(|body| body.starts_with("TimeoutError: ")) {
        return Err(format!("Unexpected timeout body: {}", slow));
    }

    let text = results
        .iter()
        .find(|result| field(result, "url").is_some_and(|url| url.ends_with("/text")))
        .ok_or("missing /text result")?;
    if text.get("status").and_then(Value::as_u64) != Some(200)
        || text.get("error").and_then(Value::as_str).is_some()
    {
        return Err(format!("Unexpected /text result: {}", text));
    }
    Ok(())
}

#[test]
fn e2e_text_rows_and_urls_file() -> Result<(), String> {
    let Some((base, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let urls_file = dir.path().join("urls.txt");
    fs::write(&urls_file, format!("\n  {}/text  \n\n", base))
        .map_err(|err| format!("write urls file failed: {}", err))?;

    let output = run_urlprobe(
        dir.path(),
        [
            "--urls-file",
            &*urls_file.to_string_lossy(),
            "--no-color",
            "--details",
        ],
    )?;
    check_success(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    for expected in [
        "\tGET\t200 OK\t",
        "Response Details: GET ",
        "content-type: text/plain",
        "hello",
        "1 result(s): 1 successful, 0 failed, 0 errored",
    ] {
        if !stdout.contains(expected) {
            return Err(format!("Missing {:?} in output:\n{}", expected, stdout));
        }
    }
    Ok(())
}

#[test]
fn e2e_config_file_is_applied() -> Result<(), String> {
    let Some((base, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("out.jsonl");
    let config = format!(
        "urls = [\"{}/json\"]\nmethods = [\"GET\", \"POST\"]\noutput_format = \"quiet\"\nexport_jsonl = \"{}\"\n",
        base,
        export.to_string_lossy().replace('\\', "\\\\")
    );
    fs::write(dir.path().join("urlprobe.toml"), config)
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_urlprobe(dir.path(), Vec::<String>::new())?;
    check_success(&output)?;
    let text = fs::read_to_string(&export).map_err(|err| format!("read export failed: {}", err))?;
    if text.lines().count() != 2 {
        return Err(format!("Expected 2 jsonl lines, got:\n{}", text));
    }
    Ok(())
}

#[test]
fn e2e_empty_protocols_fail_validation() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = dir.path().join("probe.json");
    fs::write(&config, r#"{ "urls": ["example.invalid"], "protocols": [] }"#)
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_urlprobe(dir.path(), ["--config", &*config.to_string_lossy()])?;
    if output.status.success() {
        return Err("Expected a validation failure".to_owned());
    }
    if !output.stdout.is_empty() {
        return Err(format!(
            "No rows expected: {}",
            String::from_utf8_lossy(&output.stdout)
        ));
    }
    Ok(())
}

#[test]
fn e2e_no_args_prints_help() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let output = run_urlprobe(dir.path(), Vec::<String>::new())?;
    check_success(&output)?;
    if !String::from_utf8_lossy(&output.stdout).contains("Usage") {
        return Err("Expected help output".to_owned());
    }
    Ok(())
}
