//! README table of contents generated from the descriptor and source tags

use crate::assets;
use catalog_core::{AssetKind, CatalogError, LibraryDescriptor, MetadataExtractor, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marker in the README template replaced by the table of contents
pub const TOC_MARKER: &str = "{{TOC}}";

/// Renders an artist / release / track tree into a README template
pub struct ReadmeGenerator {
    source_root: PathBuf,
    source_extension: String,
    extractor: Arc<dyn MetadataExtractor>,
}

impl ReadmeGenerator {
    pub fn new(
        source_root: impl Into<PathBuf>,
        source_extension: impl Into<String>,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            source_extension: source_extension.into(),
            extractor,
        }
    }

    /// Fenced tree of every artist, release and source track
    ///
    /// Track titles come from the tags, falling back to the file stem.
    pub fn table_of_contents(&self, descriptor: &LibraryDescriptor) -> Result<String> {
        let mut toc = String::from("```\n");

        for artist in &descriptor.artists {
            toc.push_str(&format!("{}\n", artist.name));

            for release in &artist.releases {
                toc.push_str(&format!("|--- {}\n", release.title));

                let directory = self.source_root.join(&release.directory);
                if !directory.is_dir() {
                    return Err(CatalogError::asset_missing(
                        AssetKind::Release,
                        &release.title,
                        directory,
                    ));
                }

                for file in assets::enumerate_sources(&directory, &self.source_extension)? {
                    let title = self.extractor.extract(&file)?.title.unwrap_or_else(|| {
                        file.file_stem()
                            .map(|stem| stem.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    });
                    toc.push_str(&format!("|   |--- {}\n", title));
                }
            }
        }

        toc.push_str("```\n");
        Ok(toc)
    }

    /// Substitute the table of contents into a template
    pub fn render(template: &str, toc: &str) -> String {
        template.replace(TOC_MARKER, toc)
    }

    /// Read `template`, render it, and write the result to `output`
    pub fn generate(
        &self,
        descriptor: &LibraryDescriptor,
        template: &Path,
        output: &Path,
    ) -> Result<()> {
        let template_text = std::fs::read_to_string(template)?;
        let toc = self.table_of_contents(descriptor)?;
        std::fs::write(output, Self::render(&template_text, &toc))?;
        tracing::info!(output = %output.display(), "README generated");
        Ok(())
    }
}
