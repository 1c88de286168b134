use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use jnlp::{ApplicationDesc, J2se, Property};
use tokio::process::Command;
use tracing::info;

use crate::error::AppError;

/// JVM invocation for a resolved descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl LaunchCommand {
    /// Assemble `java [heap] [vm args] [-D...] -cp <classpath> <main> <args...>`
    ///
    /// Deferred resources (`None` in `classpath`) stay off the classpath.
    pub fn build(
        java: impl Into<PathBuf>,
        j2se: Option<&J2se>,
        application: &ApplicationDesc,
        properties: &[Property],
        classpath: &[Option<PathBuf>],
        extra_args: &[String],
    ) -> Result<Self, AppError> {
        let mut args: Vec<OsString> = Vec::new();

        if let Some(j2se) = j2se {
            if let Some(size) = j2se.initial_heap_size.as_deref().filter(|s| !s.is_empty()) {
                args.push(format!("-Xms{size}").into());
            }
            if let Some(size) = j2se.max_heap_size.as_deref().filter(|s| !s.is_empty()) {
                args.push(format!("-Xmx{size}").into());
            }
            args.extend(j2se.vm_args().map(OsString::from));
        }

        for property in properties {
            args.push(format!("-D{}={}", property.name, property.value).into());
        }

        args.push("-cp".into());
        args.push(std::env::join_paths(classpath.iter().flatten())?);
        args.push(application.main_class.clone().into());
        args.extend(application.arguments.iter().map(OsString::from));
        args.extend(extra_args.iter().map(OsString::from));

        Ok(Self {
            program: java.into(),
            args,
        })
    }

    /// Run the JVM in the foreground, sharing this process's stdio
    pub async fn spawn(&self) -> Result<ExitStatus, AppError> {
        info!(command = %self, "Launching application");

        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        info!(status = %status, "Application exited");
        Ok(status)
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn application() -> ApplicationDesc {
        ApplicationDesc {
            main_class: "org.example.Main".into(),
            arguments: vec!["-server".into(), "prod".into()],
        }
    }

    #[test]
    fn test_full_command_line() {
        let j2se = J2se {
            initial_heap_size: Some("64m".into()),
            max_heap_size: Some("1g".into()),
            java_vm_args: Some("-ea  -XX:+UseG1GC".into()),
            ..J2se::default()
        };
        let properties = [Property {
            name: "app.mode".into(),
            value: "kiosk".into(),
        }];
        let classpath = [
            Some(PathBuf::from("/cache/a.jar")),
            None,
            Some(PathBuf::from("/cache/b.jar")),
        ];

        let command = LaunchCommand::build(
            "java",
            Some(&j2se),
            &application(),
            &properties,
            &classpath,
            &["--user".to_string(), "alice".to_string()],
        )
        .unwrap();

        let joined = std::env::join_paths(["/cache/a.jar", "/cache/b.jar"]).unwrap();
        let mut expected = os(&["-Xms64m", "-Xmx1g", "-ea", "-XX:+UseG1GC", "-Dapp.mode=kiosk", "-cp"]);
        expected.push(joined);
        expected.extend(os(&["org.example.Main", "-server", "prod", "--user", "alice"]));

        assert_eq!(command.program, PathBuf::from("java"));
        assert_eq!(command.args, expected);
    }

    #[test]
    fn test_minimal_command_line() {
        let command = LaunchCommand::build(
            "/opt/jdk/bin/java",
            None,
            &ApplicationDesc {
                main_class: "Main".into(),
                arguments: vec![],
            },
            &[],
            &[Some(PathBuf::from("/cache/app.jar"))],
            &[],
        )
        .unwrap();

        assert_eq!(command.args, os(&["-cp", "/cache/app.jar", "Main"]));
        assert_eq!(command.to_string(), "/opt/jdk/bin/java -cp /cache/app.jar Main");
    }

    #[cfg(unix)]
    #[test]
    fn test_unrepresentable_classpath_is_an_error() {
        let broken = PathBuf::from("/cache/a:b.jar");

        let result = LaunchCommand::build("java", None, &application(), &[], &[Some(broken)], &[]);
        assert!(matches!(result, Err(AppError::ClassPath(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_reports_exit_status() {
        let command = LaunchCommand {
            program: PathBuf::from("sh"),
            args: os(&["-c", "exit 3"]),
        };
        let status = command.spawn().await.unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
