//! Internationalization (i18n) of the interface labels

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Interface strings rendered by the templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub load_more: String,
    pub loading: String,
    pub load_error: String,
    pub not_found: String,
    pub back: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            load_error: "Could not load more posts. Please try again.".to_string(),
            not_found: "Page not found".to_string(),
            back: "Back to home".to_string(),
        }
    }
}

impl Labels {
    /// Built-in labels for a language such as `pt_BR` or `en`
    pub fn builtin(language: &str) -> Self {
        let lang = language
            .split(['_', '-'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match lang.as_str() {
            "pt" => Self {
                load_more: "Carregar mais posts".to_string(),
                loading: "Carregando...".to_string(),
                load_error: "Não foi possível carregar mais posts. Tente novamente.".to_string(),
                not_found: "Página não encontrada".to_string(),
                back: "Voltar para o início".to_string(),
            },
            _ => Self::default(),
        }
    }

    /// Built-in labels, overridden by `languages/{language}.yml` when present
    ///
    /// Keys missing from the file keep their built-in value.
    pub fn load<P: AsRef<Path>>(base_dir: P, language: &str) -> Result<Self> {
        let mut labels = Self::builtin(language);
        let path = base_dir
            .as_ref()
            .join("languages")
            .join(format!("{}.yml", language));

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let overrides: LabelOverrides = serde_yaml::from_str(&content)?;
            overrides.apply(&mut labels);
            tracing::debug!("Loaded language file: {:?}", path);
        }

        Ok(labels)
    }
}

#[derive(Debug, Default, Deserialize)]
struct LabelOverrides {
    load_more: Option<String>,
    loading: Option<String>,
    load_error: Option<String>,
    not_found: Option<String>,
    back: Option<String>,
}

impl LabelOverrides {
    fn apply(self, labels: &mut Labels) {
        let fields = [
            (self.load_more, &mut labels.load_more),
            (self.loading, &mut labels.loading),
            (self.load_error, &mut labels.load_error),
            (self.not_found, &mut labels.not_found),
            (self.back, &mut labels.back),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_languages() {
        assert_eq!(Labels::builtin("en_US"), Labels::default());
        assert_eq!(Labels::builtin("pt_BR").load_more, "Carregar mais posts");
        assert_eq!(Labels::builtin("pt-PT").loading, "Carregando...");
        assert_eq!(Labels::builtin("de_DE"), Labels::default());
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("languages")).unwrap();
        fs::write(
            dir.path().join("languages/pt_BR.yml"),
            "load_more: Mais posts\n",
        )
        .unwrap();

        let labels = Labels::load(dir.path(), "pt_BR").unwrap();
        assert_eq!(labels.load_more, "Mais posts");
        assert_eq!(labels.loading, "Carregando...");
    }

    #[test]
    fn test_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Labels::load(dir.path(), "en_US").unwrap(), Labels::default());
    }
}
