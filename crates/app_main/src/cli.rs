//! Command line definition

use anyhow::Context;
use app_fs::UploadFile;
use clap::{Parser, Subcommand};
use ipc_proto::Request;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "skill_desk", version, about = "Manage a local library of agent skills")]
pub struct Cli {
    /// Library root (overrides the config file)
    #[arg(long, global = true, env = "SKILL_DESK_LIBRARY")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new skill
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Read the manifest from this file instead of the template
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Print a skill's manifest; an external SKILL.md is imported first
    Load { path: String },
    /// Overwrite a file inside a skill with the contents of a local file
    Save { path: String, source: PathBuf },
    /// Delete a skill folder
    Delete { path: String },
    /// List all skills
    List,
    /// Show the file tree of a skill
    Tree { bundle: String },
    /// Create an empty file, or one filled from --from
    NewFile {
        bundle: String,
        path: String,
        #[arg(long)]
        from: Option<PathBuf>,
    },
    NewFolder { bundle: String, path: String },
    /// Delete a file or folder inside a skill
    Remove { bundle: String, path: String },
    Rename {
        bundle: String,
        path: String,
        new_name: String,
    },
    #[command(name = "mv")]
    Move {
        bundle: String,
        from: String,
        to: String,
    },
    /// Print a file's metadata and text
    Cat { path: String },
    /// Copy local files into a skill
    Upload {
        bundle: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long, default_value = "")]
        target: String,
    },
    /// Package a skill as a zip
    Export {
        bundle: String,
        #[arg(long)]
        name: Option<String>,
        /// Where to write the zip (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Answer JSON-line requests on stdin until EOF
    Serve,
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

impl Command {
    /// Protocol request for a one-shot command; `None` for `serve`
    pub fn to_request(&self) -> anyhow::Result<Option<Request>> {
        let request = match self {
            Command::Create {
                name,
                description,
                from,
            } => Request::CreateBundle {
                name: name.clone(),
                description: description.clone(),
                content: from.as_deref().map(read_text).transpose()?,
            },
            Command::Load { path } => Request::LoadBundle { path: path.clone() },
            Command::Save { path, source } => Request::SaveFile {
                path: path.clone(),
                content: read_text(source)?,
            },
            Command::Delete { path } => Request::DeleteBundle { path: path.clone() },
            Command::List => Request::ListBundles,
            Command::Tree { bundle } => Request::ListFiles {
                bundle_path: bundle.clone(),
            },
            Command::NewFile { bundle, path, from } => Request::CreateFile {
                bundle_path: bundle.clone(),
                path: path.clone(),
                content: from.as_deref().map(read_text).transpose()?,
            },
            Command::NewFolder { bundle, path } => Request::CreateFolder {
                bundle_path: bundle.clone(),
                path: path.clone(),
            },
            Command::Remove { bundle, path } => Request::DeleteNode {
                bundle_path: bundle.clone(),
                path: path.clone(),
            },
            Command::Rename {
                bundle,
                path,
                new_name,
            } => Request::RenameNode {
                bundle_path: bundle.clone(),
                path: path.clone(),
                new_name: new_name.clone(),
            },
            Command::Move { bundle, from, to } => Request::MoveNode {
                bundle_path: bundle.clone(),
                from: from.clone(),
                to: to.clone(),
            },
            Command::Cat { path } => Request::LoadFile { path: path.clone() },
            Command::Upload {
                bundle,
                files,
                target,
            } => {
                let mut uploads = Vec::with_capacity(files.len());
                for file in files {
                    let bytes = std::fs::read(file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    uploads.push(UploadFile::new(name, bytes));
                }
                Request::UploadFiles {
                    bundle_path: bundle.clone(),
                    target_folder: target.clone(),
                    files: uploads,
                }
            }
            Command::Export { bundle, name, .. } => Request::ExportArchive {
                bundle_dir: bundle.clone(),
                bundle_name: name.clone().unwrap_or_else(|| bundle.clone()),
            },
            Command::Serve => return Ok(None),
        };

        Ok(Some(request))
    }
}
