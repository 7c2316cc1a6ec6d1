//! Snapshot export through an external command.

use crate::config::ExportSettings;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tidemark_rotator::{ExportError, Exporter};
use tokio::process::Command;

/// Placeholder replaced by the target path in command arguments.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Environment variable carrying the target path to the command.
pub const OUTPUT_ENV: &str = "TIDEMARK_OUTPUT";

/// Runs a configured dump command to produce each snapshot.
///
/// The backend counts as unavailable when no command is configured, when the
/// program is missing, or when a failed run prints one of the configured
/// markers. Every other failure is a failed export.
#[derive(Debug, Clone)]
pub struct CommandExporter {
    argv: Vec<String>,
    env: BTreeMap<String, String>,
    unavailable_markers: Vec<String>,
}

impl CommandExporter {
    /// Build an exporter from the `[export]` settings.
    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self {
            argv: settings.command.clone(),
            env: settings.env.clone(),
            unavailable_markers: settings
                .unavailable_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    fn render_args(&self, target: &Path) -> Vec<String> {
        let output = target.to_string_lossy();
        self.argv
            .iter()
            .skip(1)
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
            .collect()
    }

    fn is_unavailable(&self, output: &str) -> bool {
        let output = output.to_lowercase();
        self.unavailable_markers
            .iter()
            .any(|marker| !marker.is_empty() && output.contains(marker.as_str()))
    }
}

impl Exporter for CommandExporter {
    async fn export(&self, target: &Path) -> Result<(), ExportError> {
        let Some(program) = self.argv.first() else {
            return Err(ExportError::Unavailable(
                "no export command configured".to_string(),
            ));
        };

        if tokio::fs::symlink_metadata(target).await.is_ok() {
            return Err(ExportError::Failed(format!(
                "refusing to overwrite existing {}",
                target.display()
            )));
        }

        let result = self.run_command(program, target).await;
        if result.is_err() {
            discard_partial(target).await;
        }
        result
    }
}

impl CommandExporter {
    async fn run_command(&self, program: &str, target: &Path) -> Result<(), ExportError> {
        tracing::debug!("Running export command: {}", self.argv.join(" "));
        let result = Command::new(program)
            .args(self.render_args(target))
            .envs(&self.env)
            .env(OUTPUT_ENV, target)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let reason = format!("{}: command not found", program);
                return Err(ExportError::Unavailable(reason));
            }
            Err(e) => {
                let reason = format!("could not run {}: {}", program, e);
                return Err(ExportError::Failed(reason));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("{}: {}", program, line);
        }

        if !output.status.success() {
            let combined = format!("{}\n{}", stderr, stdout);
            let detail = combined
                .lines()
                .map(str::trim)
                .rfind(|l| !l.is_empty())
                .unwrap_or("no output")
                .to_string();

            if self.is_unavailable(&combined) {
                return Err(ExportError::Unavailable(detail));
            }
            return Err(ExportError::Failed(format!(
                "{} exited with {}: {}",
                program, output.status, detail
            )));
        }

        match tokio::fs::try_exists(target).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ExportError::Failed(format!(
                "{} succeeded but wrote no file to {}",
                program,
                target.display()
            ))),
            Err(e) => Err(ExportError::Failed(format!(
                "could not verify {}: {}",
                target.display(),
                e
            ))),
        }
    }
}

/// Remove whatever a failed command left at `target`
async fn discard_partial(target: &Path) {
    match tokio::fs::remove_file(target).await {
        Ok(()) => tracing::debug!("Removed partial export {}", target.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove partial export {}: {}",
            target.display(),
            e
        ),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exporter(command: &[&str]) -> CommandExporter {
        CommandExporter::from_settings(&ExportSettings {
            command: command.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_successful_export_writes_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("backup-2024-01-15T12-00-00.sql");
        let exporter = exporter(&["sh", "-c", "echo dump > \"$1\"", "sh", "{output}"]);

        exporter.export(&target).await.unwrap();
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_target_passed_through_environment() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("backup-2024-01-15T12-00-00.sql");
        let exporter = exporter(&["sh", "-c", "echo dump > \"$TIDEMARK_OUTPUT\""]);

        exporter.export(&target).await.unwrap();
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_no_command_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let result = exporter(&[]).export(&tmp.path().join("x.sql")).await;
        assert!(matches!(result, Err(ExportError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let result = exporter(&["tidemark-no-such-dump-tool"])
            .export(&tmp.path().join("x.sql"))
            .await;
        assert!(matches!(result, Err(ExportError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_marker_in_output_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let script = "echo 'FATAL: database \"app\" Not Found' >&2; exit 1";
        let exporter = exporter(&["sh", "-c", script]);

        let result = exporter.export(&tmp.path().join("x.sql")).await;
        match result {
            Err(ExportError::Unavailable(detail)) => assert!(detail.contains("Not Found")),
            other => panic!("expected unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_failure_is_failed() {
        let tmp = TempDir::new().unwrap();
        let script = "echo 'password authentication failed' >&2; exit 2";
        let exporter = exporter(&["sh", "-c", script]);

        let result = exporter.export(&tmp.path().join("x.sql")).await;
        match result {
            Err(ExportError::Failed(detail)) => {
                assert!(detail.contains("password authentication failed"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_without_file_is_failed() {
        let tmp = TempDir::new().unwrap();
        let result = exporter(&["true"]).export(&tmp.path().join("x.sql")).await;
        assert!(matches!(result, Err(ExportError::Failed(_))));
    }

    #[test]
    fn test_placeholder_substitution() {
        let exporter = exporter(&["pg_dump", "--file={output}", "app"]);
        let args = exporter.render_args(Path::new("/var/backups/b.sql"));
        assert_eq!(args, vec!["--file=/var/backups/b.sql".to_string(), "app".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_command_removes_partial_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("backup-2024-01-15T12-00-00.sql");
        let script = "echo '-- trunc' > \"$1\"; exit 3";
        let exporter = exporter(&["sh", "-c", script, "sh", "{output}"]);

        let result = exporter.export(&target).await;

        assert!(matches!(result, Err(ExportError::Failed(_))));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_existing_target_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("backup-2024-01-15T12-00-00.sql");
        std::fs::write(&target, b"-- complete\n").unwrap();
        let exporter = exporter(&["true"]);

        let result = exporter.export(&target).await;

        assert!(matches!(result, Err(ExportError::Failed(ref r)) if r.contains("existing")));
        assert_eq!(std::fs::read(&target).unwrap(), b"-- complete\n");
    }
}
