//! External package manager invocations inside a template instance.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};

/// Errors from running the package manager.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Package manager used to install, build and serve the template.
#[derive(Debug, Clone)]
pub struct PackageManager {
    program: String,
}

impl PackageManager {
    /// Use `program` (e.g. `npm`, `pnpm`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Install the template's dependencies.
    pub async fn install(&self, dir: &Path) -> Result<(), ProcessError> {
        tracing::info!("Installing dependencies...");
        self.run(dir, &["install"]).await?;
        tracing::info!("Dependencies installed successfully");
        Ok(())
    }

    /// Produce the static build.
    pub async fn build(&self, dir: &Path) -> Result<(), ProcessError> {
        tracing::info!("Building documentation...");
        self.run(dir, &["run", "build"]).await?;
        tracing::info!("Build completed successfully");
        Ok(())
    }

    /// Start the live-reload development server.
    ///
    /// The child is killed if its handle is dropped.
    pub fn spawn_dev(&self, dir: &Path) -> Result<Child, ProcessError> {
        let args = ["run", "dev"];
        self.command(dir, &args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::Spawn {
                command: self.describe(&args),
                source: e,
            })
    }

    /// Render `program args...` for messages.
    pub fn describe(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<(), ProcessError> {
        let command = self.describe(args);
        tracing::debug!("Running `{}` in {}", command, dir.display());

        let status = self
            .command(dir, args)
            .status()
            .await
            .map_err(|e| ProcessError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        check_status(command, status)
    }

    #[cfg(windows)]
    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        // npm and friends are .cmd shims on Windows.
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&self.program).args(args);
        Self::configure(&mut cmd, dir);
        cmd
    }

    #[cfg(not(windows))]
    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        Self::configure(&mut cmd, dir);
        cmd
    }

    fn configure(cmd: &mut Command, dir: &Path) {
        cmd.current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    }
}

impl Default for PackageManager {
    fn default() -> Self {
        Self::new("npm")
    }
}

/// Map a non-zero exit status to [`ProcessError::Failed`].
pub fn check_status(command: String, status: ExitStatus) -> Result<(), ProcessError> {
    if status.success() {
        Ok(())
    } else {
        Err(ProcessError::Failed { command, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn describes_commands() {
        let pm = PackageManager::default();
        assert_eq!(pm.program(), "npm");
        assert_eq!(pm.describe(&["run", "build"]), "npm run build");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn succeeds_on_zero_exit() {
        let temp = tempdir().unwrap();
        PackageManager::new("true").install(temp.path()).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fails_on_non_zero_exit() {
        let temp = tempdir().unwrap();
        let err = PackageManager::new("false")
            .build(temp.path())
            .await
            .unwrap_err();

        match err {
            ProcessError::Failed { command, .. } => assert_eq!(command, "false run build"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reports_missing_program() {
        let temp = tempdir().unwrap();
        let err = PackageManager::new("speed-docs-no-such-program")
            .install(temp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dev_child_reports_exit() {
        let temp = tempdir().unwrap();
        let mut child = PackageManager::new("true").spawn_dev(temp.path()).unwrap();
        assert!(child.wait().await.unwrap().success());
    }
}
