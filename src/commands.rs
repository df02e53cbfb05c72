//! Small CLI commands: post stubs, remote sync, usage text.

use crate::config::{DirRole, SiteConfig};
use crate::document::{DocumentError, FrontMatter, HeaderStyle, render_document};
use crate::naming::stub_filename;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Title given to a fresh stub.
pub const STUB_TITLE: &str = "Untitled Post";

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("remote_location is not set in config.toml")]
    NoRemote,
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// A CLI command and its one-line usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: [CommandInfo; 7] = [
    CommandInfo {
        name: "build",
        usage: "Build all content and copy static assets to the output directory",
    },
    CommandInfo {
        name: "test",
        usage: "Serve the output directory over HTTP on port 8000",
    },
    CommandInfo {
        name: "static",
        usage: "Recopy only the static assets (images, styles, scripts) to the output directory",
    },
    CommandInfo {
        name: "new",
        usage: "Create a dated post stub in the posts directory",
    },
    CommandInfo {
        name: "push",
        usage: "Sync the output directory to remote_location with rsync over ssh",
    },
    CommandInfo {
        name: "dev",
        usage: "Build, serve, and rebuild whenever a source file changes",
    },
    CommandInfo {
        name: "help",
        usage: "Show usage for one command: lead help <command>",
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandInfo> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// The message printed for anything that isn't a command.
pub fn unknown_command_message() -> String {
    let names: Vec<&str> = COMMANDS.iter().map(|c| c.name).collect();
    format!("Unknown command. Try one of: {}", names.join(", "))
}

/// Usage text: every command for `None`, one command for `Some`.
pub fn command_help(name: Option<&str>) -> String {
    match name {
        None => {
            let width = COMMANDS.iter().map(|c| c.name.len()).max().unwrap_or(0);
            let mut lines = vec!["Usage: lead <command>".to_string(), String::new()];
            lines.extend(
                COMMANDS
                    .iter()
                    .map(|c| format!("    {:<width$}  {}", c.name, c.usage)),
            );
            lines.join("\n")
        }
        Some(name) => match find_command(name) {
            Some(command) => command.usage.to_string(),
            None => unknown_command_message(),
        },
    }
}

// ============================================================================
// new
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewPost {
    Created(PathBuf),
    /// A stub with the derived name is already there; nothing was written.
    Exists(String),
}

impl NewPost {
    /// What the CLI prints.
    pub fn message(&self) -> String {
        match self {
            NewPost::Created(path) => path.display().to_string(),
            NewPost::Exists(name) => format!("Stub already exists: {name}"),
        }
    }
}

/// Write a placeholder post dated `today`.
pub fn new_post(config: &SiteConfig, root: &Path, today: NaiveDate) -> Result<NewPost, CommandError> {
    let date = today.format(&config.date_format).to_string();
    let filename = stub_filename(STUB_TITLE, &date);
    let dir = config.source_path(root, DirRole::Posts);
    let path = dir.join(&filename);
    if path.exists() {
        return Ok(NewPost::Exists(filename));
    }

    let front_matter = FrontMatter {
        title: Some(STUB_TITLE.to_string()),
        date: Some(date),
        layout: Some("post".to_string()),
        ..Default::default()
    };
    let content = render_document(HeaderStyle::Json, &front_matter, "")?;
    fs::create_dir_all(&dir).map_err(|e| CommandError::Io {
        path: dir.clone(),
        source: e,
    })?;
    fs::write(&path, content).map_err(|e| CommandError::Io {
        path: path.clone(),
        source: e,
    })?;
    log::debug!("Created stub {}", path.display());
    Ok(NewPost::Created(path))
}

// ============================================================================
// push
// ============================================================================

/// The rsync invocation that mirrors the output tree to the remote.
pub fn push_command(config: &SiteConfig, root: &Path) -> Result<Command, CommandError> {
    let remote = config.remote_location.trim();
    if remote.is_empty() {
        return Err(CommandError::NoRemote);
    }
    // Trailing slash: sync the directory's contents, not the directory itself.
    let source = format!("{}/", config.output_root(root).display());
    let mut command = Command::new("rsync");
    command.args(["-r", "-v", "-e", "ssh"]).arg(source).arg(remote);
    Ok(command)
}

/// Human-readable form of a command line.
pub fn describe_command(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run rsync, echoing the command line and its output.
pub fn push_remote(config: &SiteConfig, root: &Path) -> Result<(), CommandError> {
    let mut command = push_command(config, root)?;
    let line = describe_command(&command);
    println!("{line}");
    let output = command.output().map_err(|e| CommandError::Spawn {
        program: "rsync".to_string(),
        source: e,
    })?;
    print!("{}", String::from_utf8_lossy(&output.stdout));
    eprint!("{}", String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        return Err(CommandError::Failed {
            program: "rsync".to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn new_post_writes_parseable_stub() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();

        let result = new_post(&config, tmp.path(), today()).unwrap();

        let path = tmp.path().join("_log/untitled-post-2024-05-17.md");
        assert_eq!(result, NewPost::Created(path.clone()));
        let content = fs::read_to_string(&path).unwrap();
        let doc = parse_document(&content, &path).unwrap();
        assert_eq!(doc.front_matter.title.as_deref(), Some("Untitled Post"));
        assert_eq!(doc.front_matter.date.as_deref(), Some("2024-05-17"));
        assert_eq!(doc.front_matter.layout.as_deref(), Some("post"));
        assert!(doc.body.is_empty());
    }

    #[test]
    fn new_post_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        new_post(&config, tmp.path(), today()).unwrap();
        let path = tmp.path().join("_log/untitled-post-2024-05-17.md");
        fs::write(&path, "edited").unwrap();

        let result = new_post(&config, tmp.path(), today()).unwrap();

        assert_eq!(
            result.message(),
            "Stub already exists: untitled-post-2024-05-17.md"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
    }

    #[test]
    fn push_requires_remote() {
        let err = push_command(&SiteConfig::default(), Path::new("/proj")).unwrap_err();
        assert!(matches!(err, CommandError::NoRemote));
    }

    #[test]
    fn push_syncs_output_contents() {
        let config = SiteConfig {
            remote_location: "me@host:/var/www".into(),
            ..Default::default()
        };
        let command = push_command(&config, Path::new("/proj")).unwrap();
        assert_eq!(
            describe_command(&command),
            "rsync -r -v -e ssh /proj/_site/ me@host:/var/www"
        );
    }

    #[test]
    fn unknown_message_lists_every_command() {
        assert_eq!(
            unknown_command_message(),
            "Unknown command. Try one of: build, test, static, new, push, dev, help"
        );
        assert_eq!(command_help(Some("deploy")), unknown_command_message());
    }

    #[test]
    fn help_for_one_and_all() {
        assert!(command_help(Some("new")).contains("stub"));
        let all = command_help(None);
        for command in COMMANDS {
            assert!(all.contains(command.name));
        }
    }
}
