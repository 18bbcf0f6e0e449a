use crate::codec::{self, DecodeError, EncodeError, WebpDecode};
use crate::config::{Config, OutputFormat, OUTPUT_QUALITY};
use crate::output::{self, WriteError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Um arquivo de entrada e o arquivo de saída derivado dele.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl FileTask {
    pub fn new(input: PathBuf, format: OutputFormat) -> Self {
        let output = input.with_extension(format.extension());
        Self { input, output }
    }
}

#[derive(Debug)]
pub enum DeleteStatus {
    Kept,
    Deleted,
    Failed(io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutputExists,
}

#[derive(Debug)]
pub enum Outcome {
    Converted {
        output: PathBuf,
        delete: DeleteStatus,
    },
    Skipped {
        output: PathBuf,
        reason: SkipReason,
    },
    Failed(ConvertError),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("falha ao ler arquivo")]
    Read(#[source] io::Error),
    #[error("falha ao decodificar WebP")]
    Decode(#[from] DecodeError),
    #[error("o arquivo de saída {} é o próprio arquivo de entrada", .0.display())]
    SamePath(PathBuf),
    #[error("falha ao codificar imagem")]
    Encode(#[from] EncodeError),
    #[error("falha ao gravar {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct FileResult {
    pub task: FileTask,
    pub outcome: Outcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub delete_failed: usize,
    pub scan_failed: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { delete, .. } => {
                self.converted += 1;
                if matches!(delete, DeleteStatus::Failed(_)) {
                    self.delete_failed += 1;
                }
            }
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.scan_failed > 0
    }
}

pub struct Converter<'a> {
    decoder: &'a dyn WebpDecode,
    format: OutputFormat,
    overwrite: bool,
    delete_after_convert: bool,
}

impl<'a> Converter<'a> {
    pub fn new(config: &Config, decoder: &'a dyn WebpDecode) -> Self {
        Self {
            decoder,
            format: config.format,
            overwrite: config.overwrite,
            delete_after_convert: config.delete_after_convert,
        }
    }

    pub fn task(&self, input: PathBuf) -> FileTask {
        FileTask::new(input, self.format)
    }

    /// Converte um arquivo. Qualquer erro vira `Outcome::Failed`.
    pub fn convert(&self, task: &FileTask) -> Outcome {
        self.try_convert(task).unwrap_or_else(Outcome::Failed)
    }

    fn try_convert(&self, task: &FileTask) -> Result<Outcome, ConvertError> {
        let data = fs::read(&task.input).map_err(ConvertError::Read)?;
        let image = self.decoder.decode(&data)?;
        drop(data);

        if same_file(&task.input, &task.output) {
            return Err(ConvertError::SamePath(task.output.clone()));
        }
        if !self.overwrite && task.output.exists() {
            return Ok(self.skipped(task));
        }

        let bytes = codec::encode(&image, self.format, OUTPUT_QUALITY)?;
        drop(image);

        match output::write_output(&task.output, &bytes, self.overwrite) {
            Ok(()) => {}
            Err(WriteError::Exists) => return Ok(self.skipped(task)),
            Err(WriteError::Io(source)) => {
                return Err(ConvertError::Write {
                    path: task.output.clone(),
                    source,
                })
            }
        }

        let delete = if self.delete_after_convert {
            match fs::remove_file(&task.input) {
                Ok(()) => DeleteStatus::Deleted,
                Err(err) => DeleteStatus::Failed(err),
            }
        } else {
            DeleteStatus::Kept
        };

        Ok(Outcome::Converted {
            output: task.output.clone(),
            delete,
        })
    }

    fn skipped(&self, task: &FileTask) -> Outcome {
        Outcome::Skipped {
            output: task.output.clone(),
            reason: SkipReason::OutputExists,
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    let ca = fs::canonicalize(a).unwrap_or_else(|_| a.to_path_buf());
    let cb = fs::canonicalize(b).unwrap_or_else(|_| b.to_path_buf());
    ca == cb
}
