//! Canales de log del pipeline.
//!
//! Dos canales independientes por proceso:
//! - canal pipeline: append-only, una línea por inicio/fin de step,
//!   persiste a través de todos los runs de un dataset;
//! - canal step: detallado, truncado por invocación, espejado a stdout y
//!   duplicado en warning+ hacia el canal pipeline.
//!
//! Las líneas informativas se anotan con el tiempo transcurrido desde la
//! línea informativa anterior del mismo canal (perfilado grueso de fases sin
//! API de timers).

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::errors::PipelineError;

fn hms(d: Duration) -> String {
    let s = d.as_secs();
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Un canal de log con anotación de tiempo transcurrido.
///
/// La apertura es falible; las escrituras posteriores son best-effort: una
/// línea de log perdida no debe abortar un step que lleva horas corriendo.
#[derive(Debug)]
pub struct ChannelLog {
    file: File,
    path: PathBuf,
    /// Duplicado warning+ hacia el canal pipeline (solo canal step).
    mirror: Option<File>,
    echo_stdout: bool,
    /// El canal pipeline antepone además la hora de pared.
    annotate_wallclock: bool,
    last_info: Instant,
}

impl ChannelLog {
    /// Canal agregado del pipeline: abre en append, con línea en blanco de
    /// separación cuando el archivo ya existía de una sesión anterior.
    pub fn pipeline(path: &Path) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let existed = path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if existed {
            let _ = writeln!(file);
        }
        Ok(Self { file,
                  path: path.to_path_buf(),
                  mirror: None,
                  echo_stdout: false,
                  annotate_wallclock: true,
                  last_info: Instant::now() })
    }

    /// Canal local de un step: trunca salvo reanudación explícita, espeja a
    /// stdout y duplica warning+ en el canal pipeline.
    pub fn step(path: &Path, pipe_log_path: &Path, append: bool) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        let mirror = OpenOptions::new().create(true).append(true).open(pipe_log_path)?;
        Ok(Self { file,
                  path: path.to_path_buf(),
                  mirror: Some(mirror),
                  echo_stdout: true,
                  annotate_wallclock: false,
                  last_info: Instant::now() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Línea informativa anotada con el tiempo desde la info anterior.
    pub fn info(&mut self, msg: &str) {
        let elapsed = hms(self.last_info.elapsed());
        self.last_info = Instant::now();
        let line = if self.annotate_wallclock {
            format!("{} | {} - {}", Local::now().format("%Y-%m-%d %H:%M"), elapsed, msg)
        } else {
            format!("{elapsed} - {msg}")
        };
        self.write_line(&line);
    }

    /// Advertencia: va al canal propio y se duplica en el canal pipeline.
    pub fn warn(&mut self, msg: &str) {
        let line = format!("WARNING: {msg}");
        self.write_line(&line);
        if let Some(mirror) = self.mirror.as_mut() {
            let _ = writeln!(mirror, "{line}");
        }
    }

    /// Línea sin formato (volcados de parámetros y similares).
    pub fn debug(&mut self, msg: &str) {
        self.write_line(msg);
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.file, "{line}");
        if self.echo_stdout {
            println!("{line}");
        }
    }
}
