use assert_cmd::Command;

pub fn tokrep_cmd() -> Command {
	let mut cmd = Command::cargo_bin("tokrep").expect("tokrep binary builds");
	cmd.env("NO_COLOR", "1");
	cmd
}
