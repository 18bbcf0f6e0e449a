use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("arquivo de saída já existe")]
    Exists,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Grava `bytes` em `target` passando por um arquivo temporário na mesma pasta.
///
/// O destino só é substituído depois que todos os bytes foram gravados.
/// Sem `overwrite`, um destino que surgir nesse meio tempo não é tocado.
pub fn write_output(target: &Path, bytes: &[u8], overwrite: bool) -> Result<(), WriteError> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = create_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let persisted = if overwrite {
        tmp.persist(target)
    } else {
        tmp.persist_noclobber(target)
    };

    match persisted {
        Ok(_) => Ok(()),
        Err(err) if !overwrite && err.error.kind() == io::ErrorKind::AlreadyExists => {
            Err(WriteError::Exists)
        }
        Err(err) => Err(WriteError::Io(err.error)),
    }
}

fn create_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".webpconv").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    builder.tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".webpconv"))
            .collect()
    }

    #[test]
    fn writes_new_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.png");
        write_output(&target, b"data", false).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"data");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn keeps_existing_file_without_overwrite() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.png");
        fs::write(&target, b"original").unwrap();

        let err = write_output(&target, b"new", false).unwrap_err();
        assert!(matches!(err, WriteError::Exists));
        assert_eq!(fs::read(&target).unwrap(), b"original");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn replaces_existing_file_with_overwrite() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.png");
        fs::write(&target, b"a much longer original").unwrap();

        write_output(&target, b"new", true).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn fails_when_directory_is_missing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("out.png");
        let err = write_output(&target, b"data", true).unwrap_err();
        assert!(matches!(err, WriteError::Io(_)));
    }
}
