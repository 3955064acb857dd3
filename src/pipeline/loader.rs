//! Pipeline manifest loader
//!
//! Load pipeline YAML manifests from files or directories.

use std::path::Path;

use super::Pipeline;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

pub struct PipelineLoader;

impl PipelineLoader {
    pub fn load_directory(dir: &Path) -> Result<Vec<Pipeline>, LoadError> {
        let mut pipelines = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() {
                let ext = path.extension().and_then(|e| e.to_str());

                if ext == Some("yaml") || ext == Some("yml") {
                    pipelines.push(Self::load_file(&path)?);
                }
            }
        }

        Ok(pipelines)
    }

    pub fn load_file(path: &Path) -> Result<Pipeline, LoadError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| LoadError::Yaml {
            file: path.display().to_string(),
            error: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_directory() {
        let dir = tempdir().unwrap();

        fs::write(
            dir.path().join("quality.yaml"),
            r#"
name: quality
jobs:
  lint:
    advisory: true
    steps:
      - run: ruff check src tests
"#,
        )
        .unwrap();

        fs::write(
            dir.path().join("release.yml"),
            r#"
name: release
jobs:
  integration:
    steps:
      - run: transform-myd-minimal --version
"#,
        )
        .unwrap();

        fs::write(dir.path().join("not-a-pipeline.txt"), "ignored").unwrap();

        let pipelines = PipelineLoader::load_directory(dir.path()).unwrap();
        assert_eq!(pipelines.len(), 2);

        let names: Vec<_> = pipelines.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"quality"));
        assert!(names.contains(&"release"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ci.yaml");

        fs::write(
            &path,
            r#"
name: ci
jobs:
  test:
    steps:
      - run: pytest tests/ -v
"#,
        )
        .unwrap();

        let pipeline = PipelineLoader::load_file(&path).unwrap();
        assert_eq!(pipeline.name, "ci");
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");

        fs::write(&path, "name: [unclosed").unwrap();

        let err = PipelineLoader::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
