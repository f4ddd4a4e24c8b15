//! Project analysis: detects the stack of a project directory from its
//! manifests and file extensions, classifies it, and suggests agents.
//!
//! Everything here is blocking filesystem work. Async callers should run
//! [`analyze_project`] on `tokio::task::spawn_blocking`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use super::errors::{ConfigError, ConfigResult};
use super::project::ProjectConfig;

/// How deep below the project root files are counted
pub const MAX_SCAN_DEPTH: usize = 5;

/// Directories that hold generated or vendored files
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// Below this many files, a project with no recognized stack is a library
const LIBRARY_FILE_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    WebFullstack,
    BackendApi,
    Frontend,
    Mobile,
    Desktop,
    Library,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::WebFullstack => "WebFullstack",
            ProjectType::BackendApi => "BackendApi",
            ProjectType::Frontend => "Frontend",
            ProjectType::Mobile => "Mobile",
            ProjectType::Desktop => "Desktop",
            ProjectType::Library => "Library",
            ProjectType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scanning a project directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_type: ProjectType,
    /// Sorted, without duplicates
    pub detected_technologies: Vec<String>,
    /// File count per extension, extensions lowercased
    pub file_counts: BTreeMap<String, usize>,
    pub total_files: usize,
    /// Sorted, without duplicates
    pub suggested_agents: Vec<String>,
}

impl ProjectAnalysis {
    /// Default project config seeded with this analysis
    pub fn to_config(&self, name: impl Into<String>, path: impl Into<String>) -> ProjectConfig {
        ProjectConfig::default_for(
            name,
            self.project_type.as_str(),
            path,
            self.detected_technologies.clone(),
        )
    }
}

/// Scans the project rooted at `path`
///
/// Manifests that fail to parse are logged and skipped; only a missing
/// or non-directory root is an error.
pub fn analyze_project(path: &Path) -> ConfigResult<ProjectAnalysis> {
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory(path.to_path_buf()));
    }

    let mut technologies = detect_technologies(path);
    let (file_counts, total_files) = count_files(path);

    let project_type = detect_project_type(&technologies, &file_counts, total_files);
    let suggested_agents = suggest_agents(project_type, &technologies);

    technologies.sort();
    technologies.dedup();

    tracing::info!(
        project = %path.display(),
        %project_type,
        technologies = technologies.len(),
        total_files,
        "project analyzed"
    );

    Ok(ProjectAnalysis {
        project_type,
        detected_technologies: technologies,
        file_counts,
        total_files,
        suggested_agents,
    })
}

// ===== Manifests =====

fn detect_technologies(root: &Path) -> Vec<String> {
    let mut technologies = Vec::new();

    if let Some(content) = read_manifest(root, "package.json") {
        match package_json_technologies(&content) {
            Ok(found) => technologies.extend(found),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable package.json"),
        }
    }
    if let Some(content) = read_manifest(root, "requirements.txt") {
        technologies.extend(requirements_technologies(&content));
    }
    if let Some(content) = read_manifest(root, "Cargo.toml") {
        match cargo_toml_technologies(&content) {
            Ok(found) => technologies.extend(found),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable Cargo.toml"),
        }
    }
    if let Some(content) = read_manifest(root, "go.mod") {
        technologies.extend(go_mod_technologies(&content));
    }
    if root.join("pubspec.yaml").is_file() {
        technologies.push("flutter".to_string());
    }
    if root.join("Dockerfile").is_file()
        || root.join("docker-compose.yml").is_file()
        || root.join("docker-compose.yaml").is_file()
    {
        technologies.push("docker".to_string());
    }

    technologies
}

fn read_manifest(root: &Path, name: &str) -> Option<String> {
    let path = root.join(name);
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read manifest");
            None
        }
    }
}

fn npm_technology(package: &str) -> Option<&'static str> {
    Some(match package {
        "react" => "react",
        "react-native" => "react-native",
        "vue" => "vue",
        "angular" | "@angular/core" => "angular",
        "svelte" => "svelte",
        "next" => "next",
        "nuxt" => "nuxt",
        "electron" => "electron",
        "express" => "express",
        "fastify" => "fastify",
        "koa" => "koa",
        "nest" | "@nestjs/core" => "nestjs",
        "typescript" => "typescript",
        "vite" => "vite",
        "webpack" => "webpack",
        "jest" => "jest",
        "vitest" => "vitest",
        "cypress" => "cypress",
        "playwright" | "@playwright/test" => "playwright",
        "pg" => "postgres",
        "mysql" | "mysql2" => "mysql",
        "mongodb" | "mongoose" => "mongodb",
        _ => return None,
    })
}

/// Technologies named by `dependencies`, `devDependencies` and `scripts`
pub fn package_json_technologies(content: &str) -> Result<Vec<String>, serde_json::Error> {
    let manifest: serde_json::Value = serde_json::from_str(content)?;
    let mut technologies = Vec::new();

    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get(section).and_then(|v| v.as_object()) {
            technologies.extend(
                deps.keys()
                    .filter_map(|name| npm_technology(name))
                    .map(str::to_string),
            );
        }
    }

    if let Some(scripts) = manifest.get("scripts").and_then(|v| v.as_object()) {
        if scripts.contains_key("dev") || scripts.contains_key("start") {
            technologies.push("node".to_string());
        }
    }

    Ok(technologies)
}

fn python_technology(package: &str) -> Option<&'static str> {
    Some(match package {
        "django" => "django",
        "flask" => "flask",
        "fastapi" => "fastapi",
        "tornado" => "tornado",
        "pyramid" => "pyramid",
        "pandas" => "pandas",
        "numpy" => "numpy",
        "tensorflow" => "tensorflow",
        "torch" | "pytorch" => "pytorch",
        "scikit-learn" => "sklearn",
        "pytest" => "pytest",
        "psycopg2" | "psycopg2-binary" => "postgres",
        _ => return None,
    })
}

/// `python` plus the known packages listed in a requirements file
pub fn requirements_technologies(content: &str) -> Vec<String> {
    let mut technologies = vec!["python".to_string()];

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let name = line
            .split(|c: char| "=<>~!;[ ".contains(c))
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if let Some(tech) = python_technology(&name) {
            technologies.push(tech.to_string());
        }
    }

    technologies
}

fn crate_technology(name: &str) -> Option<&'static str> {
    Some(match name {
        "actix-web" => "actix",
        "rocket" => "rocket",
        "axum" => "axum",
        "warp" => "warp",
        "tokio" => "tokio",
        "async-std" => "async-std",
        "tauri" => "tauri",
        "sqlx" | "diesel" => "sql",
        _ => return None,
    })
}

/// `rust` plus the known crates under `[dependencies]`
pub fn cargo_toml_technologies(content: &str) -> Result<Vec<String>, toml::de::Error> {
    let manifest: toml::Table = toml::from_str(content)?;
    let mut technologies = vec!["rust".to_string()];

    if let Some(deps) = manifest.get("dependencies").and_then(|v| v.as_table()) {
        technologies.extend(
            deps.keys()
                .filter_map(|name| crate_technology(name))
                .map(str::to_string),
        );
    }

    Ok(technologies)
}

/// `go` plus the known web frameworks required by the module
pub fn go_mod_technologies(content: &str) -> Vec<String> {
    const FRAMEWORKS: &[(&str, &str)] = &[
        ("github.com/gin-gonic/gin", "gin"),
        ("github.com/gofiber/fiber", "fiber"),
        ("github.com/labstack/echo", "echo"),
        ("github.com/gorilla/mux", "gorilla"),
    ];

    let mut technologies = vec!["go".to_string()];
    for (module, tech) in FRAMEWORKS {
        if content.contains(module) {
            technologies.push(tech.to_string());
        }
    }
    technologies
}

// ===== File scan =====

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map_or(false, |name| SKIPPED_DIRS.contains(&name))
}

fn count_files(root: &Path) -> (BTreeMap<String, usize>, usize) {
    let mut counts = BTreeMap::new();
    let mut total = 0;

    for entry in WalkDir::new(root)
        .max_depth(MAX_SCAN_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        total += 1;
        if let Some(ext) = entry.path().extension() {
            *counts
                .entry(ext.to_string_lossy().to_lowercase())
                .or_insert(0) += 1;
        }
    }

    (counts, total)
}

// ===== Classification =====

fn has_any(technologies: &[String], wanted: &[&str]) -> bool {
    technologies.iter().any(|t| wanted.contains(&t.as_str()))
}

/// Classifies a project from its technologies and file extensions
///
/// Frontend plus backend is full stack. Otherwise the first match of
/// backend-only, frontend-only, mobile, then desktop wins. A project
/// with no recognized stack is a library when it is small.
pub fn detect_project_type(
    technologies: &[String],
    file_counts: &BTreeMap<String, usize>,
    total_files: usize,
) -> ProjectType {
    let frontend = has_any(
        technologies,
        &["react", "vue", "angular", "svelte", "next", "nuxt"],
    );
    let backend = has_any(
        technologies,
        &[
            "express", "fastify", "koa", "nestjs", "django", "flask", "fastapi", "actix",
            "rocket", "axum", "warp", "gin", "fiber", "echo", "gorilla",
        ],
    );
    let mobile = has_any(technologies, &["react-native", "flutter"])
        || ["swift", "kt", "kotlin"]
            .iter()
            .any(|ext| file_counts.contains_key(*ext));
    let desktop = has_any(technologies, &["tauri", "electron"]);

    match (frontend, backend, mobile, desktop) {
        (true, true, _, _) => ProjectType::WebFullstack,
        (_, true, false, false) => ProjectType::BackendApi,
        (true, false, false, false) => ProjectType::Frontend,
        (_, _, true, _) => ProjectType::Mobile,
        (_, _, _, true) => ProjectType::Desktop,
        _ if total_files < LIBRARY_FILE_THRESHOLD => ProjectType::Library,
        _ => ProjectType::Unknown,
    }
}

/// Agent ids worth adding to a team for this kind of project
pub fn suggest_agents(project_type: ProjectType, technologies: &[String]) -> Vec<String> {
    let mut agents = vec!["code-reviewer", "test-engineer"];

    agents.extend_from_slice(match project_type {
        ProjectType::WebFullstack => &[
            "fullstack-developer",
            "api-designer",
            "frontend-developer",
            "backend-developer",
        ][..],
        ProjectType::BackendApi => &["backend-developer", "api-designer", "database-designer"],
        ProjectType::Frontend => &["frontend-developer", "ux-designer"],
        ProjectType::Mobile => &["mobile-developer", "ux-designer"],
        ProjectType::Desktop => &["frontend-developer", "backend-developer"],
        ProjectType::Library => &["tech-writer", "api-documenter"],
        ProjectType::Unknown => &["fullstack-developer"],
    });

    if has_any(technologies, &["docker"]) {
        agents.push("docker-specialist");
    }
    if has_any(technologies, &["postgres", "mysql", "mongodb", "sql"]) {
        agents.push("database-designer");
    }
    if has_any(
        technologies,
        &["jest", "vitest", "pytest", "cypress", "playwright"],
    ) {
        agents.push("e2e-tester");
    }

    let mut agents: Vec<String> = agents.into_iter().map(str::to_string).collect();
    agents.sort();
    agents.dedup();
    agents
}
