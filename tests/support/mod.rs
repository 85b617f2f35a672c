use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};

/// Get a Command for tool-eval
pub fn tool_eval() -> Command {
    cargo_bin_cmd!("tool-eval")
}

pub const SUITE_YAML: &str = r#"
name: email
system_message: You manage email.
tools:
  - name: Google_SendEmail
    description: Send an email
    inputSchema:
      type: object
      properties:
        recipient: {type: string}
        subject: {type: string}
cases:
  - name: send
    user_message: Email Bob about the launch
    expected_tool_calls:
      - name: Google_SendEmail
        args: {recipient: bob@example.com, subject: Launch}
    critics:
      - {type: binary, field: recipient}
      - {type: similarity, field: subject, weight: 0.5}
"#;

pub const PASSING_RESPONSES: &str = r#"
responses:
  Email Bob about the launch:
    - - name: Google.SendEmail
        args: {recipient: bob@example.com, subject: Launch}
"#;

#[allow(dead_code)]
pub const FAILING_RESPONSES: &str = r#"
responses:
  Email Bob about the launch:
    - - name: Google.SendEmail
        args: {recipient: alice@example.com, subject: Launch}
"#;

/// Correct twice, then the wrong recipient
#[allow(dead_code)]
pub const THREE_RUN_RESPONSES: &str = r#"
responses:
  Email Bob about the launch:
    - - name: Google_SendEmail
        args: {recipient: bob@example.com, subject: Launch}
    - - name: Google_SendEmail
        args: {recipient: bob@example.com, subject: Launch}
    - - name: Google_SendEmail
        args: {recipient: alice@example.com, subject: Launch}
"#;

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
