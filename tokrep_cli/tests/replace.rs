mod common;

use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

type AnyEmptyResult = Result<(), Box<dyn std::error::Error>>;

fn counters(stdout: &[u8]) -> Value {
	let text = String::from_utf8_lossy(stdout);
	let json_line = text
		.lines()
		.rev()
		.find(|line| line.starts_with('{'))
		.expect("counters JSON on stdout");
	serde_json::from_str(json_line).expect("valid counters JSON")
}

#[test]
fn replaces_tokens_and_prints_counters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("app.cfg"), "name=#{ app.name }#\n")?;

	let assert = common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "app.cfg"])
		.args(["--variables", r#"{ "app": { "name": "demo" } }"#])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	let stats = counters(&assert.get_output().stdout);
	assert_eq!(stats["tokens"], 1);
	assert_eq!(stats["replaced"], 1);
	assert_eq!(stats["files"], 1);

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("app.cfg"))?,
		"name=demo\n"
	);

	Ok(())
}

#[test]
fn escapes_json_files_by_default() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("app.json"),
		"{ \"motto\": \"#{ motto }#\" }",
	)?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "*.json"])
		.args(["--variables", r#"{ "motto": "say \"hi\"" }"#])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("app.json"))?,
		"{ \"motto\": \"say \\\"hi\\\"\" }"
	);

	Ok(())
}

#[test]
fn redirected_sources_write_elsewhere() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("site.tpl"), "host=#{ host }#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "*.tpl => out/*.conf"])
		.args(["--variables", r#"{ "host": "example.org" }"#])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("out/site.conf"))?,
		"host=example.org"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("site.tpl"))?,
		"host=#{ host }#"
	);

	Ok(())
}

#[test]
fn loads_variables_from_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("vars.yml"), "app:\n  name: from-yaml\n")?;
	std::fs::write(tmp.path().join("in.txt"), "#{ app.name }#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", "@vars.yml"])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("in.txt"))?,
		"from-yaml"
	);

	Ok(())
}

#[test]
fn later_variable_sources_override_earlier_ones() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ name }#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args([
			"--variables",
			r#"{ "name": "first" }"#,
			r#"{ "name": "second" }"#,
		])
		.args(["--sources", "in.txt"])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(tmp.path().join("in.txt"))?, "second");

	Ok(())
}

#[test]
fn transforms_require_the_flag() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{upper(name)}#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", r#"{ "name": "demo" }"#])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.arg("--transforms")
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(tmp.path().join("in.txt"))?, "DEMO");

	Ok(())
}

#[test]
fn missing_variables_warn_on_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ gone }#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", "{}"])
		.args(["--add-bom", "false"])
		.assert()
		.success()
		.stderr(predicates::str::contains("variable 'gone' not found"));

	Ok(())
}

#[test]
fn keep_action_preserves_tokens() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ gone }#")?;

	let assert = common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", "{}"])
		.args(["--missing-var-action", "keep"])
		.args(["--missing-var-log", "off"])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	let stats = counters(&assert.get_output().stdout);
	assert_eq!(stats["tokens"], 1);
	assert_eq!(stats["replaced"], 0);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("in.txt"))?,
		"#{ gone }#"
	);

	Ok(())
}

#[test]
fn custom_token_pattern_requires_delimiters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "[[ name ]]")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", "{}"])
		.args(["--token-pattern", "custom"])
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("token prefix").and(predicates::str::contains("suffix")));

	Ok(())
}

#[test]
fn custom_escape_requires_chars_and_escape_char() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ name }#")?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", "{}"])
		.args(["--escape", "custom"])
		.args(["--chars-to-escape", "[]"])
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("escape char"));

	Ok(())
}

#[test]
fn config_file_supplies_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "v=__ name __")?;
	std::fs::write(
		tmp.path().join("tokrep.toml"),
		r#"
sources = ["in.txt"]
variables = ['{ "name": "from-config" }']
add-bom = false

[token]
style = "double-underscores"
"#,
	)?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--log-level", "off"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("in.txt"))?,
		"v=from-config"
	);

	Ok(())
}

#[test]
fn flags_override_config_values() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ name }#")?;
	std::fs::write(
		tmp.path().join("tokrep.toml"),
		"variables = ['{ \"name\": \"from-config\" }']\nadd-bom = false\n",
	)?;

	common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", r#"{ "name": "from-flag" }"#])
		.args(["--log-level", "off"])
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("in.txt"))?,
		"from-flag"
	);

	Ok(())
}

#[test]
fn missing_sources_fail_with_guidance() {
	common::tokrep_cmd()
		.current_dir(std::env::temp_dir())
		.args(["--variables", "{}"])
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("no sources specified"));
}

#[test]
fn log_level_off_prints_only_counters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("in.txt"), "#{ v }#")?;

	let assert = common::tokrep_cmd()
		.arg("--root")
		.arg(tmp.path())
		.args(["--sources", "in.txt"])
		.args(["--variables", r#"{ "v": "1" }"#])
		.args(["--log-level", "off"])
		.args(["--add-bom", "false"])
		.assert()
		.success();

	let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
	let lines: Vec<&str> = stdout.lines().collect();
	assert_eq!(lines.len(), 1);
	let stats: Value = serde_json::from_str(lines[0])?;
	assert_eq!(stats["files"], 1);

	Ok(())
}
