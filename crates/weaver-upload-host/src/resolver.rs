//! Reference resolvers.
//!
//! `DataUrlResolver` inlines files as base64 data URLs, which needs no
//! storage at all. `DirectoryResolver` writes files into a local directory
//! under content-addressed names and hands back `file://` URIs. Both pass
//! URL sources through unchanged.

use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use futures_util::future::BoxFuture;
use mime_sniffer::MimeTypeSniffer;
use smol_str::{SmolStr, format_smolstr};
use weaver_upload_core::{FileHandle, ResolveError, Resolver, UploadSource};

const FALLBACK_MIME: &str = "application/octet-stream";

/// MIME type sniffed from the bytes, else the declared one.
pub fn detect_mime(file: &FileHandle) -> &str {
    file.data
        .sniff_mime_type()
        .filter(|m| *m != FALLBACK_MIME)
        .or_else(|| Some(file.mime_type.as_str()).filter(|m| !m.is_empty()))
        .unwrap_or(FALLBACK_MIME)
}

/// Encode a file as a `data:` URL.
pub fn data_url(file: &FileHandle) -> String {
    format!("data:{};base64,{}", detect_mime(file), STANDARD.encode(&file.data))
}

/// Resolves files to inline `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlResolver;

impl Resolver for DataUrlResolver {
    fn resolve(&self, source: UploadSource) -> BoxFuture<'static, Result<SmolStr, ResolveError>> {
        Box::pin(async move {
            match source {
                UploadSource::Url(url) => Ok(url),
                UploadSource::File(file) if file.data.is_empty() => {
                    Err(ResolveError::new(format!("{} is empty", file.name)))
                }
                UploadSource::File(file) => Ok(SmolStr::new(data_url(&file))),
            }
        })
    }
}

/// Stores files under a directory, named by content hash.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name a file is stored under: blake3 of the content plus an extension.
    pub fn file_name(file: &FileHandle) -> String {
        let hash = blake3::hash(&file.data);
        format!("{}.{}", hash.to_hex(), extension(file))
    }
}

fn extension(file: &FileHandle) -> SmolStr {
    if let Some(ext) = Path::new(file.name.as_str()).extension().and_then(|e| e.to_str()) {
        return ext.to_ascii_lowercase().into();
    }
    match detect_mime(file).split_once('/') {
        Some((_, "jpeg")) => "jpg".into(),
        Some((_, "svg+xml")) => "svg".into(),
        Some((_, "octet-stream")) => "bin".into(),
        Some((_, subtype)) if !subtype.is_empty() => format_smolstr!("{subtype}"),
        _ => "bin".into(),
    }
}

async fn store(root: PathBuf, file: FileHandle) -> Result<SmolStr, ResolveError> {
    if file.data.is_empty() {
        return Err(ResolveError::new(format!("{} is empty", file.name)));
    }
    tokio::fs::create_dir_all(&root).await?;
    let path = root.join(DirectoryResolver::file_name(&file));
    tokio::fs::write(&path, &file.data).await?;
    let path = tokio::fs::canonicalize(&path).await?;
    tracing::debug!(name = %file.name, path = %path.display(), "stored upload");
    Ok(format_smolstr!("file://{}", path.display()))
}

impl Resolver for DirectoryResolver {
    fn resolve(&self, source: UploadSource) -> BoxFuture<'static, Result<SmolStr, ResolveError>> {
        let root = self.root.clone();
        Box::pin(async move {
            match source {
                UploadSource::Url(url) => Ok(url),
                UploadSource::File(file) => store(root, file).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_mime_prefers_content() {
        let sniffed = FileHandle::new("a", "image/gif", PNG_MAGIC.to_vec());
        assert_eq!(detect_mime(&sniffed), "image/png");

        let declared = FileHandle::new("a", "image/gif", vec![0u8, 1, 2]);
        assert_eq!(detect_mime(&declared), "image/gif");

        let unknown = FileHandle::new("a", "", vec![0u8, 1, 2]);
        assert_eq!(detect_mime(&unknown), FALLBACK_MIME);
    }

    #[tokio::test]
    async fn test_data_url_resolver() {
        let file = FileHandle::new("a.png", "image/png", PNG_MAGIC.to_vec());
        let uri = DataUrlResolver.resolve(file.into()).await.unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");

        let url = DataUrlResolver.resolve("https://x/a.png".into()).await.unwrap();
        assert_eq!(url, "https://x/a.png");

        let empty = FileHandle::new("e.png", "image/png", Vec::<u8>::new());
        let err = DataUrlResolver.resolve(empty.into()).await.unwrap_err();
        assert_eq!(err.message, "e.png is empty");
    }

    #[tokio::test]
    async fn test_directory_resolver_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirectoryResolver::new(dir.path().join("store"));
        let file = FileHandle::new("Cat.PNG", "image/png", PNG_MAGIC.to_vec());

        let first = resolver.resolve(file.clone().into()).await.unwrap();
        let second = resolver.resolve(file.clone().into()).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("file://"));
        assert!(first.ends_with(".png"));

        let stored = dir.path().join("store").join(DirectoryResolver::file_name(&file));
        assert_eq!(std::fs::read(stored).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_extension_from_mime() {
        let jpeg = FileHandle::new("photo", "image/jpeg", vec![0u8]);
        assert!(DirectoryResolver::file_name(&jpeg).ends_with(".jpg"));
        let unnamed = FileHandle::new("", "", vec![0u8]);
        assert!(DirectoryResolver::file_name(&unnamed).ends_with(".bin"));
    }
}
