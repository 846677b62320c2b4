//! Static model catalog and weight availability checks
//!
//! Maps the configured model identifiers to their upstream repositories and
//! reports whether the weights are already cached on disk. The service never
//! downloads weights itself; the inference backend owns that.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, ImageModel, TextModel};
use crate::utils;

/// What a model is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Vision,
    Text,
}

/// A model known to the service.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    /// Configuration token (e.g. "blip2")
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Upstream repository id
    pub repo_id: &'static str,
    pub kind: ModelKind,
}

static BLIP2: ModelSpec = ModelSpec {
    id: "blip2",
    name: "BLIP-2 OPT 2.7B",
    repo_id: "Salesforce/blip2-opt-2.7b",
    kind: ModelKind::Vision,
};

static BLIP2_FLAN: ModelSpec = ModelSpec {
    id: "blip2-flan",
    name: "BLIP-2 Flan-T5 XL",
    repo_id: "Salesforce/blip2-flan-t5-xl",
    kind: ModelKind::Vision,
};

static LLAMA2: ModelSpec = ModelSpec {
    id: "llama2",
    name: "Llama 2 7B Chat",
    repo_id: "meta-llama/Llama-2-7b-chat-hf",
    kind: ModelKind::Text,
};

static TINYLLAMA: ModelSpec = ModelSpec {
    id: "tinyllama",
    name: "TinyLlama 1.1B Chat",
    repo_id: "TinyLlama/TinyLlama-1.1B-Chat-v1.0",
    kind: ModelKind::Text,
};

pub fn spec_for_image(model: ImageModel) -> &'static ModelSpec {
    match model {
        ImageModel::Blip2 => &BLIP2,
        ImageModel::Blip2Flan => &BLIP2_FLAN,
    }
}

pub fn spec_for_text(model: TextModel) -> &'static ModelSpec {
    match model {
        TextModel::Llama2 => &LLAMA2,
        TextModel::TinyLlama => &TINYLLAMA,
    }
}

/// Availability of a model's weights on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelAvailability {
    Ready { local_path: PathBuf },
    NotDownloaded,
}

/// Check whether a model's weights are present under the cache directory.
///
/// Accepts both the HuggingFace hub layout (`models--org--name/snapshots/`)
/// and a plain `org/name` directory, then falls back to the user-level hub
/// cache.
pub fn check_weights(spec: &ModelSpec, cache_dir: &Path) -> ModelAvailability {
    let cache_dir = utils::expand_tilde(cache_dir);

    let hub_name = format!("models--{}", spec.repo_id.replace('/', "--"));
    let candidate = cache_dir.join(&hub_name);
    if candidate.exists() {
        if let Ok(resolved) = utils::resolve_hf_snapshot(&candidate) {
            return ModelAvailability::Ready {
                local_path: resolved,
            };
        }
    }

    let candidate = cache_dir.join(spec.repo_id);
    if candidate.exists() {
        return ModelAvailability::Ready {
            local_path: candidate,
        };
    }

    match utils::resolve_from_hub_cache(spec.repo_id) {
        Some(local_path) => ModelAvailability::Ready { local_path },
        None => ModelAvailability::NotDownloaded,
    }
}

/// Log which of the configured models have cached weights.
pub fn print_startup_report(config: &Config) {
    for spec in [
        spec_for_image(config.image_model),
        spec_for_text(config.text_model),
    ] {
        match check_weights(spec, &config.model_cache_dir) {
            ModelAvailability::Ready { local_path } => {
                tracing::info!("{} ({}): weights cached at {:?}", spec.id, spec.repo_id, local_path);
            }
            ModelAvailability::NotDownloaded => {
                tracing::warn!(
                    "{} ({}): weights not found under {:?}; the inference backend must provide the model",
                    spec.id,
                    spec.repo_id,
                    config.model_cache_dir
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_resolves_to_its_repo() {
        assert_eq!(spec_for_image(ImageModel::Blip2).repo_id, "Salesforce/blip2-opt-2.7b");
        assert_eq!(spec_for_image(ImageModel::Blip2Flan).repo_id, "Salesforce/blip2-flan-t5-xl");
        assert_eq!(spec_for_text(TextModel::Llama2).repo_id, "meta-llama/Llama-2-7b-chat-hf");
        assert_eq!(
            spec_for_text(TextModel::TinyLlama).repo_id,
            "TinyLlama/TinyLlama-1.1B-Chat-v1.0"
        );
    }

    #[test]
    fn spec_ids_match_config_tokens() {
        for model in [ImageModel::Blip2, ImageModel::Blip2Flan] {
            assert_eq!(spec_for_image(model).id, model.as_str());
        }
        for model in [TextModel::Llama2, TextModel::TinyLlama] {
            assert_eq!(spec_for_text(model).id, model.as_str());
        }
    }

    fn fake_spec() -> ModelSpec {
        ModelSpec {
            id: "fake",
            name: "Fake model",
            repo_id: "acme/fake-model-for-tests",
            kind: ModelKind::Vision,
        }
    }

    #[test]
    fn missing_weights_report_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            check_weights(&fake_spec(), dir.path()),
            ModelAvailability::NotDownloaded
        );
    }

    #[test]
    fn hub_layout_weights_are_found() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir
            .path()
            .join("models--acme--fake-model-for-tests/snapshots/deadbeef");
        std::fs::create_dir_all(&snapshot).unwrap();
        assert_eq!(
            check_weights(&fake_spec(), dir.path()),
            ModelAvailability::Ready {
                local_path: snapshot
            }
        );
    }

    #[test]
    fn plain_repo_directory_weights_are_found() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("acme/fake-model-for-tests");
        std::fs::create_dir_all(&weights).unwrap();
        assert_eq!(
            check_weights(&fake_spec(), dir.path()),
            ModelAvailability::Ready {
                local_path: weights
            }
        );
    }
}
