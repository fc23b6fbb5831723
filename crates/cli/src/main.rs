use chrono::Local;
use clap::{Parser, Subcommand};
use qphotos_core::constants::{DEFAULT_LAST_PROJECT_FILE, DEFAULT_UPLOAD_DIR};
use qphotos_core::{
    Annotator, CoreConfig, FileLastProjectStore, IngestOutcome, PhotoStore, UploadRequest,
};
use qphotos_media::{PassthroughAnnotator, ThumbnailService, WatermarkAnnotator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qphotos")]
#[command(about = "QPhotos photo storage CLI")]
struct Cli {
    /// Storage root holding the month folders
    #[arg(long, default_value = DEFAULT_UPLOAD_DIR)]
    root: PathBuf,
    /// File recording the project of the latest upload
    #[arg(long, default_value = DEFAULT_LAST_PROJECT_FILE)]
    last_project_file: PathBuf,
    /// TrueType font used for upload captions
    #[arg(long)]
    font: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the children of a folder (the storage root if omitted)
    Browse {
        /// Logical path, e.g. "09 SETIEMBRE/Wedding"
        path: Option<String>,
    },
    /// Show the project of the latest upload
    LastProject,
    /// List the projects of the current month
    ProjectsCurrentMonth,
    /// Store a photo as if it had been uploaded now
    Upload {
        /// Photo file to store
        file: PathBuf,
        /// Project name
        #[arg(long)]
        project: String,
        /// Photo identifier; becomes the stored file name
        #[arg(long)]
        uuid: String,
        /// Store the file unchanged, without a caption
        #[arg(long)]
        no_caption: bool,
    },
    /// Rename a folder in place
    Rename {
        /// Logical path of the folder
        path: String,
        /// New folder name
        new_name: String,
    },
    /// Delete a folder with its contents, or a single file
    Delete {
        /// Logical path
        path: String,
    },
    /// Delete a single photo
    DeletePhoto {
        /// Logical path of the photo
        path: String,
    },
    /// Write the thumbnail of a stored photo
    Thumbnail {
        /// Logical path of the photo
        path: String,
        /// Output JPEG file
        output: PathBuf,
    },
}

fn open_store(
    cli: &Cli,
    annotator: Arc<dyn Annotator>,
) -> Result<Arc<PhotoStore>, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(cli.root.clone(), cli.last_project_file.clone())?;
    let last_project = FileLastProjectStore::new(cfg.last_project_file());
    Ok(Arc::new(PhotoStore::new(
        Arc::new(cfg),
        annotator,
        Arc::new(last_project),
    )?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        println!("Use 'qphotos --help' for commands");
        return Ok(());
    };

    let annotator: Arc<dyn Annotator> = match command {
        Commands::Upload {
            no_caption: true, ..
        } => Arc::new(PassthroughAnnotator),
        Commands::Upload { .. } => {
            Arc::new(WatermarkAnnotator::from_font_path(cli.font.as_deref()))
        }
        _ => Arc::new(PassthroughAnnotator),
    };
    let store = open_store(&cli, annotator)?;

    match command {
        Commands::Browse { path } => {
            match store.browse(path.as_deref().unwrap_or_default()) {
                Ok(entries) if entries.is_empty() => println!("Nothing here."),
                Ok(entries) => {
                    for entry in entries {
                        println!("{:<8} {}", entry.kind.as_str(), entry.path);
                    }
                }
                Err(e) => eprintln!("Error browsing: {}", e),
            }
        }
        Commands::LastProject => match store.last_project() {
            Ok(Some(project)) => println!("{}", project),
            Ok(None) => println!("No uploads yet."),
            Err(e) => eprintln!("Error reading last project: {}", e),
        },
        Commands::ProjectsCurrentMonth => {
            match store.projects_in_month(Local::now().naive_local()) {
                Ok(projects) => {
                    for project in projects {
                        println!("{}", project);
                    }
                }
                Err(e) => eprintln!("Error listing projects: {}", e),
            }
        }
        Commands::Upload {
            file,
            project,
            uuid,
            ..
        } => {
            let request = UploadRequest {
                photo_id: Some(uuid.clone()),
                project_name: Some(project.clone()),
                file: Some(std::fs::read(file)?),
            };
            let result = request
                .validate()
                .and_then(|upload| store.ingest(upload, Local::now().naive_local()));
            match result {
                Ok(IngestOutcome::Stored { path }) => println!("Stored {}", path),
                Ok(IngestOutcome::DuplicateIgnored { path }) => {
                    println!("Duplicate ignored: {}", path)
                }
                Err(e) => eprintln!("Error uploading: {}", e),
            }
        }
        Commands::Rename { path, new_name } => match store.rename(path, new_name) {
            Ok(renamed) => println!("Renamed {} to {}", path, renamed),
            Err(e) => eprintln!("Error renaming: {}", e),
        },
        Commands::Delete { path } => match store.delete(path) {
            Ok(()) => println!("Deleted {}", path),
            Err(e) => eprintln!("Error deleting: {}", e),
        },
        Commands::DeletePhoto { path } => match store.delete_photo(path) {
            Ok(()) => println!("Deleted photo {}", path),
            Err(e) => eprintln!("Error deleting photo: {}", e),
        },
        Commands::Thumbnail { path, output } => {
            match ThumbnailService::new(store.clone()).render(path) {
                Ok(jpeg) => {
                    std::fs::write(output, jpeg)?;
                    println!("Wrote thumbnail to {}", output.display());
                }
                Err(e) => eprintln!("Error rendering thumbnail: {}", e),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_arguments() {
        let cli = Cli::try_parse_from([
            "qphotos",
            "--root",
            "/srv/photos",
            "upload",
            "photo.jpg",
            "--project",
            "Wedding",
            "--uuid",
            "abc123",
            "--no-caption",
        ])
        .unwrap();

        assert_eq!(cli.root, PathBuf::from("/srv/photos"));
        match cli.command {
            Some(Commands::Upload {
                file,
                project,
                uuid,
                no_caption,
            }) => {
                assert_eq!(file, PathBuf::from("photo.jpg"));
                assert_eq!(project, "Wedding");
                assert_eq!(uuid, "abc123");
                assert!(no_caption);
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn test_defaults_and_optional_browse_path() {
        let cli = Cli::try_parse_from(["qphotos", "browse"]).unwrap();

        assert_eq!(cli.root, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(cli.last_project_file, PathBuf::from(DEFAULT_LAST_PROJECT_FILE));
        assert!(matches!(cli.command, Some(Commands::Browse { path: None })));
    }

    #[test]
    fn test_rename_requires_new_name() {
        assert!(Cli::try_parse_from(["qphotos", "rename", "09 SETIEMBRE/Wedding"]).is_err());
    }
}
