//! Request dispatch
//!
//! Each request runs as its own blocking task. Requests touching different
//! paths may complete in any order; nothing is cancelled once started.

use crate::{AppError, SessionContext};
use app_fs::{bundle_dir_of, SkillLibrary, TempFileRegistry};
use ipc_proto::{Request, Response};
use std::path::Path;
use std::sync::Arc;

/// Turns [`Request`]s into [`Response`]s against the library
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    library: Arc<SkillLibrary>,
    registry: Arc<TempFileRegistry>,
}

impl CommandDispatcher {
    pub fn new(library: Arc<SkillLibrary>, registry: Arc<TempFileRegistry>) -> Self {
        Self { library, registry }
    }

    pub fn library(&self) -> &SkillLibrary {
        &self.library
    }

    pub fn registry(&self) -> &TempFileRegistry {
        &self.registry
    }

    /// Run one request; always answers, failures become `Response::Error`
    pub async fn handle(&self, session: SessionContext, request: Request) -> (SessionContext, Response) {
        let op = request.name();
        let fallback = session.clone();
        let dispatcher = self.clone();

        let joined = tokio::task::spawn_blocking(move || {
            let mut session = session;
            let result = dispatcher.execute(&mut session, request);
            (session, result)
        })
        .await;

        match joined {
            Ok((session, Ok(response))) => {
                tracing::debug!(op, "Request completed");
                (session, response)
            }
            Ok((session, Err(e))) => (session, e.to_response()),
            Err(e) => {
                let err = AppError::Task(e.to_string());
                (fallback, err.to_response())
            }
        }
    }

    /// Synchronous body of [`handle`](Self::handle)
    pub fn execute(&self, session: &mut SessionContext, request: Request) -> Result<Response, AppError> {
        let response = match request {
            Request::CreateBundle {
                name,
                description,
                content,
            } => {
                let manifest = self
                    .library
                    .create_bundle(&name, &description, content.as_deref())?;
                session.open_bundle(bundle_dir_of(&manifest), &manifest);
                Response::BundleCreated { path: manifest }
            }

            Request::LoadBundle { path } => {
                let loaded = self.library.load_bundle(&path)?;
                session.open_bundle(bundle_dir_of(&loaded.resolved_path), &loaded.resolved_path);
                Response::BundleLoaded(loaded)
            }

            Request::SaveFile { path, content } => {
                let saved = self.library.save_bundle(&path, &content)?;
                session.mark_saved(&saved);
                Response::Saved
            }

            Request::DeleteBundle { path } => {
                let dir = self.library.resolve_bundle_dir(&path)?;
                self.library.delete_bundle(&dir)?;
                session.bundle_removed(&dir);
                Response::Deleted
            }

            Request::ListBundles => Response::Bundles {
                bundles: self.library.list_bundles(),
            },

            Request::ListFiles { bundle_path } => Response::Tree {
                nodes: self.library.list_files(&bundle_path)?,
            },

            Request::CreateFile {
                bundle_path,
                path,
                content,
            } => {
                let files = self.library.bundle_files(&bundle_path)?;
                Response::NodePath {
                    path: files.create_file(&path, content.as_deref())?,
                }
            }

            Request::CreateFolder { bundle_path, path } => {
                let files = self.library.bundle_files(&bundle_path)?;
                Response::NodePath {
                    path: files.create_folder(&path)?,
                }
            }

            Request::DeleteNode { bundle_path, path } => {
                let files = self.library.bundle_files(&bundle_path)?;
                let target = files.resolve_node(&path)?;
                files.delete_node(&path)?;
                session.node_removed(&target);
                Response::Deleted
            }

            Request::RenameNode {
                bundle_path,
                path,
                new_name,
            } => {
                let files = self.library.bundle_files(&bundle_path)?;
                let from = files.resolve_node(&path)?;
                let renamed = files.rename_node(&path, &new_name)?;
                session.node_moved(&from, &files.root().join(&renamed));
                Response::NodePath { path: renamed }
            }

            Request::MoveNode { bundle_path, from, to } => {
                let files = self.library.bundle_files(&bundle_path)?;
                let source = files.resolve_node(&from)?;
                let moved = files.move_node(&from, &to)?;
                session.node_moved(&source, &files.root().join(&moved));
                Response::NodePath { path: moved }
            }

            Request::LoadFile { path } => {
                let file = self.library.load_file(&path)?;
                session.open_file(&file.path);
                Response::File(file)
            }

            Request::UploadFiles {
                bundle_path,
                target_folder,
                files,
            } => {
                let bundle = self.library.bundle_files(&bundle_path)?;
                Response::Uploaded(bundle.upload_files(&target_folder, files)?)
            }

            Request::ExportArchive {
                bundle_dir,
                bundle_name,
            } => Response::Archive {
                path: self
                    .library
                    .export_bundle(&bundle_dir, &bundle_name, &self.registry)?,
            },

            Request::ReleaseArchive { path } => Response::Released {
                released: self.registry.release(Path::new(&path)),
            },
        };

        Ok(response)
    }
}
