//! Writes generated artifacts into a directory tree, one package per service

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use mal_codegen::{Artifact, ArtifactKind};

const LICENSE: &str = include_str!("../base/license.txt");

pub trait ArtifactSink {
    fn write_artifact(&mut self, artifact: &Artifact) -> Result<()>;
}

/// Lays artifacts out as `<service>service/<service>/<kind>/<name>.rs`. Area scoped data goes to
/// `<area>area/data/data.rs`.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        let package = artifact.service.to_lowercase();
        let base = match artifact.kind {
            ArtifactKind::AreaData => self.root.join(format!("{}area", package)),
            _ => self.root.join(format!("{}service", package)).join(&package),
        };
        base.join(artifact.kind.directory()).join(format!("{}.rs", artifact.kind.file_stem()))
    }
}

impl ArtifactSink for DirectorySink {
    fn write_artifact(&mut self, artifact: &Artifact) -> Result<()> {
        let path = self.path_for(artifact);
        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;

        write_file(&path, artifact)
            .with_context(|| format!("writing generated file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "wrote artifact");
        Ok(())
    }
}

fn write_file(path: &Path, artifact: &Artifact) -> std::io::Result<()> {
    let mut output = std::io::BufWriter::new(fs::File::create(path)?);
    output.write_all(LICENSE.as_bytes())?;
    writeln!(output, "#![allow(bad_style, unused_imports)]")?;
    writeln!(output)?;
    writeln!(output, "use super::*;")?;
    writeln!(output)?;
    writeln!(output, "{}", artifact.text)?;
    output.flush()
}
