use crate::converter::{DeleteStatus, FileTask, Outcome, Summary};
use std::error::Error;
use std::path::Path;

pub trait ProgressSink {
    fn scan_failed(&mut self, _path: &Path, _err: &anyhow::Error) {}
    fn start_batch(&mut self, _total_files: usize) {}
    fn start_file(&mut self, _task: &FileTask) {}
    fn finish_file(&mut self, _task: &FileTask, _outcome: &Outcome) {}
    fn finish(&mut self, _summary: &Summary) {}
}

/// Relatório no console. Com `quiet`, apenas falhas e o resumo são exibidos.
pub struct ProgressReporter {
    quiet: bool,
    total_files: usize,
    processed_files: usize,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            total_files: 0,
            processed_files: 0,
        }
    }

    fn position(&self) -> String {
        format!("[{}/{}]", self.processed_files, self.total_files.max(1))
    }
}

impl ProgressSink for ProgressReporter {
    fn scan_failed(&mut self, path: &Path, err: &anyhow::Error) {
        eprintln!(
            "Erro! Não foi possível obter arquivos .webp de {}: {:#}",
            path.display(),
            err
        );
    }

    fn start_batch(&mut self, total_files: usize) {
        self.total_files = total_files;
        self.processed_files = 0;
        if total_files == 0 && !self.quiet {
            println!("Nenhum arquivo .webp encontrado.");
        }
    }

    fn start_file(&mut self, task: &FileTask) {
        self.processed_files += 1;
        if self.quiet {
            return;
        }
        println!("{} Entrada: {}", self.position(), task.input.display());
    }

    fn finish_file(&mut self, task: &FileTask, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { output, delete } => {
                if !self.quiet {
                    println!("{} Saída: {}", self.position(), output.display());
                }
                match delete {
                    DeleteStatus::Kept => {}
                    DeleteStatus::Deleted => {
                        if !self.quiet {
                            println!("{} Removido: {}", self.position(), task.input.display());
                        }
                    }
                    DeleteStatus::Failed(err) => eprintln!(
                        "{} Erro ao remover {}: {}",
                        self.position(),
                        task.input.display(),
                        err
                    ),
                }
            }
            Outcome::Skipped { output, .. } => {
                if !self.quiet {
                    println!(
                        "{} Ignorado: arquivo de saída {} já existe",
                        self.position(),
                        output.display()
                    );
                }
            }
            Outcome::Failed(err) => eprintln!(
                "{} Erro em {}: {}",
                self.position(),
                task.input.display(),
                describe(err)
            ),
        }
    }

    fn finish(&mut self, summary: &Summary) {
        let mut line = format!(
            "Processamento finalizado. Convertidos: {}. Ignorados: {}. Falhas: {}.",
            summary.converted, summary.skipped, summary.failed
        );
        if summary.delete_failed > 0 {
            line.push_str(&format!(" Falhas ao remover: {}.", summary.delete_failed));
        }
        if summary.scan_failed > 0 {
            line.push_str(&format!(" Caminhos ilegíveis: {}.", summary.scan_failed));
        }
        println!("{line}");
    }
}

/// Mensagem do erro seguida das suas causas, como o `{:#}` do anyhow.
fn describe(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
