//! The publishing pass: source directory → hashed output directory.
//!
//! For each direct entry of the source directory:
//!
//! ```text
//! carol.jpg ── read ── normalize ──┬── write gravatar/carol.png
//!                                  ├── write gravatar/<sha256(carol@circlecat.org)>
//!                                  ├── write gravatar/<md5(carol@circlecat.org)>
//!                                  ├── write gravatar/<sha256(carol@u.circlecat.org)>
//!                                  └── write gravatar/<md5(carol@u.circlecat.org)>
//!
//! 404.html ── read ─────────────────── write gravatar/404.html   (verbatim)
//! nested/  ── skipped
//! ```
//!
//! Every target of one asset receives the same bytes. Reading and
//! normalizing run in parallel on the rayon pool. Writes happen afterwards,
//! one asset at a time in listing order, so when two sources map to the same
//! user (`carol.jpg`, `carol.png`) the later name owns every shared target on
//! every run.
//!
//! ## Failure policy
//!
//! Store errors (creating the output directory, listing the source, reading a
//! source file, writing a target) abort the run with the first error; files
//! already written stay. Decode and encode failures are absorbed by
//! [`normalize`] and publish the original bytes instead.

use crate::config::PublishConfig;
use crate::identity;
use crate::imaging::{ImageBackend, NormalizedImage, RustBackend, normalize};
use crate::store::{FileStore, FsStore, StoreError};
use image::ImageFormat;
use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Source file copied through untouched instead of being treated as an avatar.
pub const NOT_FOUND_PAGE: &str = "404.html";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a source file is published as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    /// Copied byte-for-byte under its own name.
    Verbatim,
    /// Normalized and fanned out to every identifier of `user`.
    Avatar { user: String },
}

/// The decided targets for one source file, before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPlan {
    pub name: String,
    pub kind: AssetKind,
    pub targets: Vec<String>,
}

/// The publishing plan for a whole source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub assets: Vec<AssetPlan>,
    pub skipped_dirs: Vec<String>,
}

/// Logical user name of a source file: its name without the final extension.
/// A dotfile such as `.hidden` has no extension and keeps its full name.
pub fn user_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Decide what `file_name` is published as and under which names.
pub fn plan_asset(file_name: &str, config: &PublishConfig) -> AssetPlan {
    if file_name == NOT_FOUND_PAGE {
        return AssetPlan {
            name: file_name.to_string(),
            kind: AssetKind::Verbatim,
            targets: vec![file_name.to_string()],
        };
    }

    let user = user_name(file_name);
    AssetPlan {
        name: file_name.to_string(),
        kind: AssetKind::Avatar {
            user: user.to_string(),
        },
        targets: identity::target_set(
            user,
            &config.suffixes,
            &config.schemes,
            config.canonical_name,
        ),
    }
}

/// List the source directory and plan every file in it. Nothing is written.
pub fn plan(store: &impl FileStore, config: &PublishConfig) -> Result<Plan, PublishError> {
    let mut plan = Plan::default();
    for entry in store.list(&config.source_dir)? {
        if entry.is_dir {
            plan.skipped_dirs.push(entry.name);
        } else {
            plan.assets.push(plan_asset(&entry.name, config));
        }
    }
    Ok(plan)
}

/// How one asset's output bytes were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// `404.html`-style verbatim copy.
    Copied,
    Normalized {
        width: u32,
        height: u32,
        source_format: Option<ImageFormat>,
    },
    /// Codec failure; original bytes published.
    PassedThrough { reason: String },
}

/// Progress events, sent as each entry finishes.
#[derive(Debug, Clone)]
pub enum PublishEvent {
    DirectorySkipped {
        name: String,
    },
    AssetPublished {
        name: String,
        outcome: AssetOutcome,
        targets: Vec<String>,
        bytes: usize,
    },
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub assets: usize,
    pub normalized: usize,
    pub passed_through: usize,
    pub copied: usize,
    pub skipped_dirs: usize,
    pub files_written: usize,
}

impl PublishSummary {
    fn record(&mut self, outcome: &AssetOutcome, targets: usize) {
        self.assets += 1;
        self.files_written += targets;
        match outcome {
            AssetOutcome::Copied => self.copied += 1,
            AssetOutcome::Normalized { .. } => self.normalized += 1,
            AssetOutcome::PassedThrough { .. } => self.passed_through += 1,
        }
    }
}

impl fmt::Display for PublishSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assets ({} normalized, {} passed through, {} copied), {} files written",
            self.assets, self.normalized, self.passed_through, self.copied, self.files_written
        )?;
        if self.skipped_dirs > 0 {
            write!(f, ", {} directories skipped", self.skipped_dirs)?;
        }
        Ok(())
    }
}

/// Publish `config.source_dir` into `config.output_dir` on the real filesystem.
pub fn publish(
    config: &PublishConfig,
    events: Option<Sender<PublishEvent>>,
) -> Result<PublishSummary, PublishError> {
    publish_with(&FsStore, &RustBackend::new(), config, events)
}

/// Publish using a specific store and backend (allows testing in memory).
pub fn publish_with(
    store: &impl FileStore,
    backend: &impl ImageBackend,
    config: &PublishConfig,
    events: Option<Sender<PublishEvent>>,
) -> Result<PublishSummary, PublishError> {
    store.ensure_dir(&config.output_dir)?;
    let plan = plan(store, config)?;

    let mut summary = PublishSummary::default();
    for name in &plan.skipped_dirs {
        tracing::info!(directory = %name, "skipping directory");
        summary.skipped_dirs += 1;
        if let Some(tx) = &events {
            tx.send(PublishEvent::DirectorySkipped { name: name.clone() })
                .ok();
        }
    }

    // Decode and encode in parallel; `collect` keeps listing order.
    let prepared = plan
        .assets
        .par_iter()
        .map(|asset| prepare_asset(store, backend, config, asset))
        .collect::<Result<Vec<_>, PublishError>>()?;

    for (asset, (outcome, bytes)) in plan.assets.iter().zip(prepared) {
        for target in &asset.targets {
            store.write(&config.output_dir.join(target), &bytes)?;
            tracing::debug!(asset = %asset.name, %target, "written");
        }
        summary.record(&outcome, asset.targets.len());
        if let Some(tx) = &events {
            tx.send(PublishEvent::AssetPublished {
                name: asset.name.clone(),
                outcome,
                targets: asset.targets.clone(),
                bytes: bytes.len(),
            })
            .ok();
        }
    }
    Ok(summary)
}

/// Read and transform one asset. Returns the outcome and the bytes every
/// target of the asset receives.
fn prepare_asset(
    store: &impl FileStore,
    backend: &impl ImageBackend,
    config: &PublishConfig,
    asset: &AssetPlan,
) -> Result<(AssetOutcome, Vec<u8>), PublishError> {
    let raw = store.read(&config.source_dir.join(&asset.name))?;

    let (bytes, outcome) = match asset.kind {
        AssetKind::Verbatim => (raw, AssetOutcome::Copied),
        AssetKind::Avatar { .. } => match normalize(backend, raw, &config.normalize_config()) {
            NormalizedImage::Normalized {
                bytes,
                width,
                height,
                source_format,
            } => {
                tracing::debug!(asset = %asset.name, format = ?source_format, width, height, "normalized");
                (
                    bytes,
                    AssetOutcome::Normalized {
                        width,
                        height,
                        source_format,
                    },
                )
            }
            NormalizedImage::PassThrough { bytes, reason } => {
                tracing::warn!(asset = %asset.name, %reason, "publishing original bytes");
                (
                    bytes,
                    AssetOutcome::PassedThrough {
                        reason: reason.to_string(),
                    },
                )
            }
        },
    };
    Ok((outcome, bytes))
}
