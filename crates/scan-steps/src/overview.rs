//! Escritor HTML del resumen de figuras de un step.

use std::fs;
use std::path::{Path, PathBuf};

use scan_core::{OverviewWriter, PipelineError};

/// Compila todas las figuras de `figs/` en un único `figs.html` junto al
/// directorio, con una entrada `<img>` por archivo en orden de nombre.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlOverview;

impl OverviewWriter for HtmlOverview {
    fn write_overview(&self, figs_dir: &Path) -> Result<PathBuf, PipelineError> {
        let mut names: Vec<String> = fs::read_dir(figs_dir)?.filter_map(|e| e.ok())
                                                            .filter(|e| e.path().is_file())
                                                            .map(|e| e.file_name().to_string_lossy().to_string())
                                                            .collect();
        names.sort();

        let dir_name = figs_dir.file_name().and_then(|s| s.to_str()).unwrap_or("figs");
        let mut body = String::from("<html><body>\n");
        for name in &names {
            body.push_str(&format!("<div><h3>{name}</h3><img src=\"{dir_name}/{name}\"/></div>\n"));
        }
        body.push_str("</body></html>\n");

        let out = figs_dir.with_extension("html");
        fs::write(&out, body)?;
        Ok(out)
    }
}
