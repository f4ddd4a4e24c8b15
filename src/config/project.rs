use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::errors::{ConfigError, ConfigResult};

pub const CONFIG_DIR_NAME: &str = ".teamforge";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_VERSION: &str = "1.0.0";

/// Per-project settings stored at `<project>/.teamforge/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub version: String,
    pub project: ProjectInfo,
    /// Agent ids of the deployed workflow, in execution order
    pub active_agents: Vec<String>,
    #[serde(default)]
    pub customizations: HashMap<String, serde_json::Value>,
    pub last_analyzed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub project_type: String,
    pub path: String,
    #[serde(default)]
    pub detected_technologies: Vec<String>,
}

/// Path of the config file for the project rooted at `project_path`
pub fn config_path(project_path: &Path) -> PathBuf {
    project_path.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ProjectConfig {
    /// Fresh config with no active agents, stamped with the current time
    pub fn default_for(
        name: impl Into<String>,
        project_type: impl Into<String>,
        path: impl Into<String>,
        detected_technologies: Vec<String>,
    ) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            project: ProjectInfo {
                name: name.into(),
                project_type: project_type.into(),
                path: path.into(),
                detected_technologies,
            },
            active_agents: Vec::new(),
            customizations: HashMap::new(),
            last_analyzed: Utc::now().to_rfc3339(),
        }
    }

    pub async fn load(project_path: &Path) -> ConfigResult<Self> {
        let path = config_path(project_path);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path))
            }
            Err(e) => return Err(io_error(&path)(e)),
        };
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the config, creating `.teamforge/` when missing
    pub async fn save(&self, project_path: &Path) -> ConfigResult<()> {
        let dir = project_path.join(CONFIG_DIR_NAME);
        fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;

        let path = dir.join(CONFIG_FILE_NAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await.map_err(io_error(&path))?;

        tracing::debug!(path = %path.display(), "project config saved");
        Ok(())
    }

    /// Non-fatal problems with the config, one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.version.is_empty() {
            warnings.push("Config version is empty".to_string());
        }
        if self.project.name.is_empty() {
            warnings.push("Project name is empty".to_string());
        }
        if self.project.path.is_empty() {
            warnings.push("Project path is empty".to_string());
        }
        if self.active_agents.is_empty() {
            warnings.push("No active agents configured".to_string());
        }

        warnings
    }

    pub fn set_active_agents(&mut self, agent_ids: Vec<String>) {
        self.active_agents = agent_ids;
    }
}

/// True when the project already has a config file
pub async fn exists(project_path: &Path) -> bool {
    fs::try_exists(config_path(project_path))
        .await
        .unwrap_or(false)
}

/// Creates `.teamforge/presets/` and an empty `analysis.json`
///
/// An existing `analysis.json` is left alone.
pub async fn initialize(project_path: &Path) -> ConfigResult<()> {
    let dir = project_path.join(CONFIG_DIR_NAME);
    let presets = dir.join("presets");
    fs::create_dir_all(&presets)
        .await
        .map_err(io_error(&presets))?;

    let analysis = dir.join("analysis.json");
    let present = fs::try_exists(&analysis)
        .await
        .map_err(io_error(&analysis))?;
    if !present {
        fs::write(&analysis, "{}")
            .await
            .map_err(io_error(&analysis))?;
    }

    tracing::info!(project = %project_path.display(), "project initialized");
    Ok(())
}

/// Creates `.claude/agents/`, where generated agent files are written
pub async fn ensure_agents_dir(project_path: &Path) -> ConfigResult<PathBuf> {
    let dir = project_path.join(".claude").join("agents");
    fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectConfig {
        ProjectConfig::default_for("shop", "WebFullstack", "/src/shop", vec!["rust".to_string()])
    }

    #[test]
    fn default_config_has_version_and_no_agents() {
        let config = sample();

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.project.name, "shop");
        assert!(config.active_agents.is_empty());
        assert!(!config.last_analyzed.is_empty());
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut config = sample();
        config.version.clear();
        config.project.name.clear();
        config.project.path.clear();

        let warnings = config.validate();

        assert_eq!(warnings.len(), 4);
        assert!(warnings.contains(&"No active agents configured".to_string()));
    }

    #[test]
    fn validate_clean_config() {
        let mut config = sample();
        config.set_active_agents(vec!["planner".to_string()]);

        assert!(config.validate().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sample();
        config.set_active_agents(vec!["a".to_string(), "b".to_string()]);

        assert!(!exists(dir.path()).await);
        config.save(dir.path()).await.unwrap();
        assert!(exists(dir.path()).await);

        let loaded = ProjectConfig::load(dir.path()).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn load_missing_config_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let result = ProjectConfig::load(dir.path()).await;

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CONFIG_DIR_NAME)).unwrap();
        std::fs::write(config_path(dir.path()), "not json").unwrap();

        assert!(matches!(
            ProjectConfig::load(dir.path()).await,
            Err(ConfigError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn initialize_keeps_existing_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = dir.path().join(CONFIG_DIR_NAME).join("analysis.json");

        initialize(dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&analysis).unwrap(), "{}");
        assert!(dir.path().join(CONFIG_DIR_NAME).join("presets").is_dir());

        std::fs::write(&analysis, r#"{"languages":["rust"]}"#).unwrap();
        initialize(dir.path()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&analysis).unwrap(),
            r#"{"languages":["rust"]}"#
        );
    }

    #[tokio::test]
    async fn ensure_agents_dir_creates_path() {
        let dir = tempfile::tempdir().unwrap();

        let agents = ensure_agents_dir(dir.path()).await.unwrap();

        assert!(agents.is_dir());
        assert!(agents.ends_with(".claude/agents"));
    }
}
