//! # gravatar-gen
//!
//! Publishes a directory of avatars so that any Gravatar-compatible client
//! can fetch them from a plain file server. Each source file is named after
//! its user; the output directory gets one normalized PNG per user, written
//! under every hash identifier a client may ask for.
//!
//! ```text
//! avatar/                      gravatar/
//! ├── carol.jpg      ──────→   ├── carol.png
//! │                            ├── <sha256("carol@circlecat.org")>
//! │                            ├── <md5("carol@circlecat.org")>
//! │                            ├── <sha256("carol@u.circlecat.org")>
//! │                            ├── <md5("carol@u.circlecat.org")>
//! ├── 404.html       ──────→   ├── 404.html          (verbatim)
//! └── archive/                 (skipped)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`identity`] | Email construction and hash schemes (SHA-256, MD5, MD5+`.jpg`) |
//! | [`imaging`] | Decode, square-crop, Lanczos3 resize, PNG encode; pass-through on codec failure |
//! | [`publish`] | The pass over the source directory and the write fan-out |
//! | [`store`] | `FileStore` trait with filesystem and in-memory implementations |
//! | [`config`] | `gravatar.toml` loading, validation, and stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Output Format
//!
//! Every avatar is re-encoded to a fixed-size PNG. Clients get a predictable
//! square image regardless of what was uploaded, and PNG is lossless so a
//! rerun over unchanged input produces byte-identical files.
//!
//! ## Degrade, Don't Fail
//!
//! A source that cannot be decoded or re-encoded is published as-is. The
//! run keeps going and the fallback is visible in
//! [`imaging::NormalizedImage::PassThrough`] and in the log. Filesystem
//! errors, on the other hand, stop the run immediately.
//!
//! ## No Database
//!
//! Identifiers are pure functions of the user name and configuration, so the
//! output directory is the whole state. Rebuilding it from scratch is always
//! safe.

pub mod config;
pub mod identity;
pub mod imaging;
pub mod output;
pub mod publish;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
