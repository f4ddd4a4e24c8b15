use std::path::{Path, PathBuf};

use axum::{extract::Query, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::config::{analyze_project, project, ConfigResult, ProjectAnalysis, ProjectConfig};

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SaveConfigRequest {
    pub path: PathBuf,
    pub config: ProjectConfig,
}

#[derive(Debug, Deserialize)]
pub struct DefaultConfigRequest {
    pub name: String,
    pub project_type: String,
    pub path: String,
    #[serde(default)]
    pub detected_technologies: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub agents_dir: PathBuf,
    /// True when no config existed and one was written from an analysis
    pub config_created: bool,
}

/// Runs the blocking directory scan off the async workers
async fn run_analysis(path: PathBuf) -> Result<ProjectAnalysis, ApiError> {
    tokio::task::spawn_blocking(move || analyze_project(&path))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Analysis task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// GET /api/project/config?path=
pub async fn get_config(
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ProjectConfig>, ApiError> {
    Ok(Json(ProjectConfig::load(&query.path).await?))
}

/// PUT /api/project/config
pub async fn save_config(Json(req): Json<SaveConfigRequest>) -> Result<StatusCode, ApiError> {
    req.config.save(&req.path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build, without saving, a config with sensible defaults
///
/// POST /api/project/config/default
pub async fn default_config(Json(req): Json<DefaultConfigRequest>) -> Json<ProjectConfig> {
    Json(ProjectConfig::default_for(
        req.name,
        req.project_type,
        req.path,
        req.detected_technologies,
    ))
}

/// POST /api/project/config/validate
pub async fn validate_config(Json(config): Json<ProjectConfig>) -> Json<Vec<String>> {
    Json(config.validate())
}

/// GET /api/project/exists?path=
pub async fn config_exists(Query(query): Query<ProjectQuery>) -> Json<ExistsResponse> {
    Json(ExistsResponse {
        exists: project::exists(&query.path).await,
    })
}

/// Detect the project's stack and suggest agents
///
/// GET /api/project/analyze?path=
pub async fn analyze(
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ProjectAnalysis>, ApiError> {
    Ok(Json(run_analysis(query.path).await?))
}

/// Create `.teamforge/` scaffolding and `.claude/agents/`
///
/// A project without a config gets one seeded from an analysis of the
/// directory. An existing config is left untouched.
///
/// POST /api/project/init
pub async fn init_project(
    Json(req): Json<ProjectQuery>,
) -> Result<Json<InitResponse>, ApiError> {
    if !tokio::fs::metadata(&req.path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return Err(ApiError::bad_request(format!(
            "Project path is not a directory: {}",
            req.path.display()
        )));
    }

    project::initialize(&req.path).await?;
    let agents_dir = project::ensure_agents_dir(&req.path).await?;

    let config_created = !project::exists(&req.path).await;
    if config_created {
        let analysis = run_analysis(req.path.clone()).await?;
        let config = analysis.to_config(
            project_name(&req.path),
            req.path.display().to_string(),
        );
        save_seeded(&config, &req.path).await?;
    }

    Ok(Json(InitResponse {
        agents_dir,
        config_created,
    }))
}

async fn save_seeded(config: &ProjectConfig, path: &Path) -> ConfigResult<()> {
    config.save(path).await?;
    tracing::info!(
        project = %path.display(),
        project_type = %config.project.project_type,
        "seeded project config from analysis"
    );
    Ok(())
}
