use clap::ValueEnum;
use std::path::PathBuf;

/// Qualidade usada pelos encoders de saída.
pub const OUTPUT_QUALITY: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
    pub format: OutputFormat,
    pub overwrite: bool,
    pub delete_after_convert: bool,
    pub quiet: bool,
}

impl Config {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            recursive: false,
            format: OutputFormat::default(),
            overwrite: false,
            delete_after_convert: false,
            quiet: false,
        }
    }
}
