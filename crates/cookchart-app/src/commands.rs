//! Subcommand implementations. Each returns the text to print on stdout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cookchart_core::config::BoardConfig;
use cookchart_core::document::Document;
use cookchart_core::editor::Editor;
use cookchart_core::legacy::{LoadError, load_str};
use cookchart_core::storage::{FileStorage, RecipeLibrary, RecipeStore, StorageError};
use cookchart_render::{
    EXPORT_PADDING, EstimatedMeasure, RenderContext, Renderer, RendererError, SvgRenderer, export_bounds,
    sync_heights,
};
use thiserror::Error;

use crate::{Args, Command, StoreAction};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("invalid configuration: {0}")]
    Config(serde_json::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RendererError),

    #[error("failed to serialize: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

pub fn run(args: Args) -> AppResult<String> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Normalize { file, output } => {
            let doc = read_chart(&file, &config)?;
            emit(doc.to_json()?, output.as_deref())
        }
        Command::Svg { file, output, full } => {
            let svg = render_svg(read_chart(&file, &config)?, config, full)?;
            emit(svg, output.as_deref())
        }
        Command::Bounds { file } => {
            let mut doc = read_chart(&file, &config)?;
            sync_heights(&mut doc, &EstimatedMeasure::default(), &config);
            let b = export_bounds(&doc, &config, EXPORT_PADDING).ok_or(RendererError::EmptyBoard)?;
            Ok(serde_json::json!({
                "x": b.x0,
                "y": b.y0,
                "width": b.width(),
                "height": b.height(),
            })
            .to_string())
        }
        Command::Store { dir, action } => {
            let storage = match dir {
                Some(dir) => FileStorage::new(dir)?,
                None => FileStorage::default_location()?,
            };
            log::debug!("using recipe store at {}", storage.base_path().display());
            let library = RecipeLibrary::new(Arc::new(storage));
            pollster::block_on(run_store(library, action, &config))
        }
    }
}

fn load_config(path: Option<&Path>) -> AppResult<BoardConfig> {
    match path {
        Some(path) => {
            let json = read(path)?;
            BoardConfig::from_json(&json).map_err(AppError::Config)
        }
        None => Ok(BoardConfig::default()),
    }
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_chart(path: &Path, config: &BoardConfig) -> AppResult<Document> {
    Ok(load_str(&read(path)?, config)?)
}

/// Write `text` to `output` if given, otherwise hand it back for stdout.
fn emit(text: String, output: Option<&Path>) -> AppResult<String> {
    match output {
        Some(path) => {
            fs::write(path, text).map_err(|source| AppError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote {}", path.display());
            Ok(String::new())
        }
        None => Ok(text),
    }
}

fn render_svg(mut doc: Document, config: BoardConfig, full: bool) -> AppResult<String> {
    sync_heights(&mut doc, &EstimatedMeasure::default(), &config);
    if !full {
        return Ok(SvgRenderer::export(&doc, &config)?);
    }
    let editor = Editor::with_document(config, doc);
    let mut renderer = SvgRenderer::new();
    renderer.build_scene(&RenderContext::from_editor(&editor))?;
    Ok(renderer.take_svg())
}

async fn run_store<S: RecipeStore>(
    mut library: RecipeLibrary<S>,
    action: StoreAction,
    config: &BoardConfig,
) -> AppResult<String> {
    match action {
        StoreAction::List => Ok(library.refresh().await?.join("\n")),
        StoreAction::Import { name, file } => {
            let doc = read_chart(&file, config)?;
            let saved = library.save(&doc, &name).await?;
            Ok(format!("saved {}", saved))
        }
        StoreAction::Export { name, output } => {
            let doc = library.load(&name).await?;
            emit(doc.to_json()?, output.as_deref())
        }
        StoreAction::Rename { old, new } => {
            let doc = library.load(&old).await?;
            let saved = library.save(&doc, &new).await?;
            Ok(format!("renamed {} to {}", old, saved))
        }
        StoreAction::Delete { name } => {
            library.delete(&name).await?;
            Ok(format!("deleted {}", name))
        }
        StoreAction::Order { names } => {
            library.reorder(&names).await?;
            Ok(library.names().join("\n"))
        }
    }
}
