pub mod cli;
pub mod codec;
pub mod config;
pub mod converter;
mod output;
pub mod progress;
mod scanner;
#[cfg(test)]
mod testutil;

pub use codec::{DecodedImage, LibWebpDecoder, WebpDecode};
pub use config::{Config, OutputFormat};
pub use converter::{FileResult, Outcome, Summary};
pub use progress::{ProgressReporter, ProgressSink};

use cli::{Invocation, ParseError};
use std::ffi::OsString;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
    pub summary: Summary,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.summary.has_failures()
    }

    pub fn exit_code(&self) -> u8 {
        if self.has_failures() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Interpreta os argumentos, executa a conversão e devolve o código de saída.
pub fn run_cli<I, T>(tokens: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let config = match cli::parse(tokens) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help(text)) => {
            println!("{text}");
            return EXIT_SUCCESS;
        }
        Ok(Invocation::Version(text)) => {
            print!("{text}");
            return EXIT_SUCCESS;
        }
        Err(ParseError::Syntax(err)) => {
            let _ = err.print();
            return EXIT_USAGE;
        }
        Err(err) => {
            eprintln!("Erro! {err}");
            eprintln!();
            eprintln!("Use --help para ver as opções disponíveis.");
            return EXIT_USAGE;
        }
    };

    run(&config).exit_code()
}

pub fn run(config: &Config) -> BatchReport {
    let mut progress = ProgressReporter::new(config.quiet);
    run_with_progress(config, &LibWebpDecoder, &mut progress)
}

/// Converte todos os arquivos encontrados, um de cada vez e na ordem em que
/// foram descobertos. A falha de um arquivo nunca interrompe os demais.
pub fn run_with_progress(
    config: &Config,
    decoder: &dyn WebpDecode,
    progress: &mut dyn ProgressSink,
) -> BatchReport {
    let expansion = scanner::expand(config, progress);
    let mut report = BatchReport::default();
    report.summary.scan_failed = expansion.failed;
    progress.start_batch(expansion.files.len());

    let converter = converter::Converter::new(config, decoder);
    for input in expansion.files {
        let task = converter.task(input);
        progress.start_file(&task);
        let outcome = converter.convert(&task);
        progress.finish_file(&task, &outcome);
        report.summary.record(&outcome);
        report.results.push(FileResult { task, outcome });
    }

    progress.finish(&report.summary);
    report
}
