use crate::config::{Config, OutputFormat};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

const BIN_NAME: &str = "webpconv";

#[derive(Parser, Debug)]
#[command(
    name = "webpconv",
    version,
    about = "Converte arquivos WebP para JPEG ou PNG.",
    long_about = "Converte arquivos WebP para JPEG ou PNG.\n\nOs arquivos convertidos são criados na mesma pasta do original.",
    args_override_self = true
)]
pub struct Cli {
    #[arg(
        value_name = "CAMINHO",
        help = "Diretórios ou arquivos .webp a serem convertidos"
    )]
    pub paths: Vec<PathBuf>,

    #[arg(
        short,
        long,
        help = "Remove o arquivo .webp após a conversão bem-sucedida"
    )]
    pub delete: bool,

    #[arg(
        short,
        long,
        value_enum,
        ignore_case = true,
        default_value_t = OutputFormat::Jpeg,
        value_name = "FORMATO",
        help = "Formato de saída"
    )]
    pub format: OutputFormat,

    #[arg(
        short,
        long,
        help = "Sobrescreve o arquivo de saída caso ele já exista"
    )]
    pub overwrite: bool,

    #[arg(
        short,
        long,
        help = "Percorre diretórios recursivamente em busca de arquivos"
    )]
    pub recursive: bool,

    #[arg(
        short,
        long,
        help = "Mostra apenas falhas e o resumo final",
        action = clap::ArgAction::SetTrue
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ParseError> {
        if let Some(invalid) = self.paths.iter().find(|p| !p.is_dir() && !p.is_file()) {
            return Err(ParseError::InvalidPath(invalid.clone()));
        }
        if self.paths.is_empty() {
            return Err(ParseError::NoPaths);
        }

        Ok(Config {
            paths: self.paths,
            recursive: self.recursive,
            format: self.format,
            overwrite: self.overwrite,
            delete_after_convert: self.delete,
            quiet: self.quiet,
        })
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(#[from] clap::Error),
    #[error("Caminho inválido: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("Informe pelo menos um caminho para buscar arquivos .webp")]
    NoPaths,
    #[error("A opção -of não é mais aceita; use -f/--format <FORMATO>")]
    LegacyFormatFlag,
}

#[derive(Debug)]
pub enum Invocation {
    Run(Config),
    Help(String),
    Version(String),
}

/// Interpreta os argumentos de linha de comando (sem o nome do programa).
///
/// Uma lista vazia ou qualquer `-h`/`--help` resulta em `Invocation::Help`,
/// antes de qualquer validação.
pub fn parse<I, T>(tokens: I) -> Result<Invocation, ParseError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    if tokens.is_empty()
        || tokens
            .iter()
            .take_while(|t| t.as_os_str() != "--")
            .any(requests_help)
    {
        return Ok(Invocation::Help(usage()));
    }
    // `-of png` seria lido pelo clap como `-o -f png`.
    if tokens.iter().any(|t| t.as_os_str() == "-of") {
        return Err(ParseError::LegacyFormatFlag);
    }

    let args = std::iter::once(OsString::from(BIN_NAME)).chain(tokens);
    match Cli::try_parse_from(args) {
        Ok(cli) => cli.into_config().map(Invocation::Run),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Ok(Invocation::Help(usage()))
            }
            ErrorKind::DisplayVersion => Ok(Invocation::Version(Cli::command().render_version())),
            _ => Err(ParseError::Syntax(err)),
        },
    }
}

/// `-h`, `--help` ou um grupo de opções curtas com `h` (`-rh`). Depois de
/// um `f` o restante do grupo é o valor do formato, então `-fh` não conta.
fn requests_help(token: &OsString) -> bool {
    let Some(token) = token.to_str() else {
        return false;
    };
    if token == "--help" {
        return true;
    }
    match token.strip_prefix('-') {
        Some(cluster) if !cluster.starts_with('-') => cluster
            .chars()
            .take_while(|&c| c != 'f')
            .any(|c| c == 'h'),
        _ => false,
    }
}

pub fn usage() -> String {
    Cli::command().render_long_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn run_config(tokens: &[&str]) -> Config {
        match parse(tokens) {
            Ok(Invocation::Run(config)) => config,
            other => panic!("esperava configuração, obtido {other:?}"),
        }
    }

    #[test]
    fn collects_paths_in_order_with_flags() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let a_str = a.path().to_str().unwrap();
        let b_str = b.path().to_str().unwrap();

        let config = run_config(&[b_str, "-d", a_str, "--recursive", "-o"]);
        assert_eq!(
            config.paths,
            vec![b.path().to_path_buf(), a.path().to_path_buf()]
        );
        assert!(config.recursive);
        assert!(config.overwrite);
        assert!(config.delete_after_convert);
        assert!(!config.quiet);
        assert_eq!(config.format, OutputFormat::Jpeg);
    }

    #[test]
    fn help_wins_over_everything_else() {
        assert!(matches!(parse(Vec::<String>::new()), Ok(Invocation::Help(_))));
        assert!(matches!(
            parse(["/definitely/not/here", "--bogus", "-h"]),
            Ok(Invocation::Help(_))
        ));
        assert!(matches!(
            parse(["--help", "-f", "gif"]),
            Ok(Invocation::Help(_))
        ));
    }

    #[test]
    fn help_inside_short_flag_cluster() {
        let dir = tempdir().unwrap();
        let result = parse([dir.path().to_str().unwrap(), "-rh"]);
        assert!(matches!(result, Ok(Invocation::Help(_))));

        assert!(matches!(parse(["--bogus", "-rh"]), Ok(Invocation::Help(_))));
        assert!(matches!(
            parse(["/definitely/not/here", "-dho"]),
            Ok(Invocation::Help(_))
        ));
    }

    #[test]
    fn format_value_in_cluster_is_not_help() {
        let dir = tempdir().unwrap();
        let result = parse([dir.path().to_str().unwrap(), "-fh"]);
        assert!(matches!(result, Err(ParseError::Syntax(_))));
    }

    #[test]
    fn version_is_reported() {
        match parse(["-V"]) {
            Ok(Invocation::Version(text)) => assert!(text.contains("webpconv")),
            other => panic!("esperava versão, obtido {other:?}"),
        }
    }

    #[test]
    fn flags_without_paths_fail() {
        let err = parse(["-r", "-d", "-f", "png"]).unwrap_err();
        assert!(matches!(err, ParseError::NoPaths));
        assert!(format!("{err}").contains("pelo menos um caminho"));
    }

    #[test]
    fn format_is_case_insensitive_and_last_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        assert_eq!(run_config(&[path, "-f", "PNG"]).format, OutputFormat::Png);
        assert_eq!(
            run_config(&[path, "--format", "Jpeg"]).format,
            OutputFormat::Jpeg
        );
        assert_eq!(
            run_config(&[path, "-f", "png", "--format", "jpeg"]).format,
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn rejects_bad_format_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        assert!(matches!(
            parse([path, "-f", "gif"]),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(parse([path, "-f"]), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn rejects_unknown_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        assert!(matches!(
            parse([path, "--bogus"]),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(
            parse(["-of", "png", path]),
            Err(ParseError::LegacyFormatFlag)
        ));
    }

    #[test]
    fn rejects_missing_path_and_names_it() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = parse([
            dir.path().to_str().unwrap(),
            missing.to_str().unwrap(),
        ])
        .unwrap_err();

        match &err {
            ParseError::InvalidPath(path) => assert_eq!(path, &missing),
            other => panic!("erro inesperado: {other:?}"),
        }
        assert!(format!("{err}").contains("nope"));
    }

    #[test]
    fn accepts_bare_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("image.webp");
        File::create(&file).unwrap();

        let config = run_config(&[file.to_str().unwrap(), "-q"]);
        assert_eq!(config.paths, vec![file]);
        assert!(config.quiet);
    }
}
