//! Upload engine configuration.
//!
//! `UploadSettings` holds the plain, serializable part (placeholder asset,
//! accepted MIME types) and can be loaded from a JSON file. `Config` adds the
//! behaviour hooks: resolver, identifier generator, resolution override and
//! report channel.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{ResolveError, SettingsError};
use crate::id;
use crate::locate::LocatedNode;
use crate::types::{UploadId, UploadSource};
use crate::upload::UploadReport;

/// Empty 20x20 SVG shown while an upload is in flight.
pub const DEFAULT_PLACEHOLDER_SRC: &str =
    "data:image/svg+xml,%3Csvg width='20' height='20' xmlns='http://www.w3.org/2000/svg'/%3E\n";

/// MIME types treated as images by default.
pub const DEFAULT_ACCEPTED_TYPES: [&str; 4] = ["image/jpeg", "image/gif", "image/png", "image/jpg"];

/// Serializable upload settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Decorative URI shown in place of the image while it uploads.
    pub placeholder_src: SmolStr,
    /// MIME types that clipboard and drop entries must have to be uploaded.
    pub accepted_types: BTreeSet<SmolStr>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            placeholder_src: DEFAULT_PLACEHOLDER_SRC.into(),
            accepted_types: DEFAULT_ACCEPTED_TYPES.iter().map(|t| SmolStr::new(t)).collect(),
        }
    }
}

impl UploadSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.placeholder_src.trim().is_empty() {
            return Err(SettingsError::Invalid("placeholder_src must not be empty".into()));
        }
        if let Some(bad) = self.accepted_types.iter().find(|t| !t.contains('/')) {
            return Err(SettingsError::Invalid(format!(
                "accepted type {bad:?} is not a MIME type"
            )));
        }
        Ok(())
    }

    /// Whether entries of this MIME type are uploaded.
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_types.contains(mime_type)
    }
}

/// Turns a file or URL into a final, addressable URI.
///
/// Expected to fail with `ResolveError` rather than panic. An empty URI
/// counts as a failure too. Any `Fn(UploadSource) -> impl Future` closure
/// with the right output is a resolver.
pub trait Resolver: Send + Sync + 'static {
    fn resolve(&self, source: UploadSource) -> BoxFuture<'static, Result<SmolStr, ResolveError>>;
}

impl<F, Fut> Resolver for F
where
    F: Fn(UploadSource) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<SmolStr, ResolveError>> + Send + 'static,
{
    fn resolve(&self, source: UploadSource) -> BoxFuture<'static, Result<SmolStr, ResolveError>> {
        Box::pin(self(source))
    }
}

type IdGenerator = Arc<dyn Fn() -> UploadId + Send + Sync>;
type ResolvedHook<V> = Arc<dyn Fn(&V, &[LocatedNode], Option<&str>) -> bool + Send + Sync>;

/// Engine configuration, fixed at construction.
pub struct Config<V> {
    settings: UploadSettings,
    resolver: Arc<dyn Resolver>,
    id: IdGenerator,
    on_resolved: Option<ResolvedHook<V>>,
    reports: Option<UnboundedSender<UploadReport>>,
}

impl<V> Clone for Config<V> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            resolver: self.resolver.clone(),
            id: self.id.clone(),
            on_resolved: self.on_resolved.clone(),
            reports: self.reports.clone(),
        }
    }
}

impl<V> fmt::Debug for Config<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("on_resolved", &self.on_resolved.is_some())
            .field("reports", &self.reports.is_some())
            .finish_non_exhaustive()
    }
}

impl<V> Config<V> {
    /// Default settings, random identifiers, no hook, no report channel.
    pub fn new(resolver: impl Resolver) -> Self {
        Self {
            settings: UploadSettings::default(),
            resolver: Arc::new(resolver),
            id: Arc::new(id::generate),
            on_resolved: None,
            reports: None,
        }
    }

    pub fn with_settings(mut self, settings: UploadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_placeholder_src(mut self, src: impl Into<SmolStr>) -> Self {
        self.settings.placeholder_src = src.into();
        self
    }

    pub fn with_accepted_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.settings.accepted_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace identifier generation.
    pub fn with_id_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> UploadId + Send + Sync + 'static,
    {
        self.id = Arc::new(generate);
        self
    }

    /// Take over applying resolution results.
    ///
    /// Called with the view, the nodes currently tagged with the upload's id
    /// and the resolved URI (None on failure). Returning true means the hook
    /// handled the update and the engine leaves the nodes alone.
    pub fn on_resolved<F>(mut self, hook: F) -> Self
    where
        F: Fn(&V, &[LocatedNode], Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.on_resolved = Some(Arc::new(hook));
        self
    }

    /// Send a report for every settled upload.
    pub fn with_reports(mut self, reports: UnboundedSender<UploadReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        self.settings.accepts(mime_type)
    }

    pub(crate) fn generate_id(&self) -> UploadId {
        (self.id)()
    }

    pub(crate) fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    pub(crate) fn resolved_hook(&self) -> Option<&ResolvedHook<V>> {
        self.on_resolved.as_ref()
    }

    pub(crate) fn report(&self, report: &UploadReport) {
        if let Some(reports) = &self.reports {
            if reports.send(report.clone()).is_err() {
                tracing::debug!(upload_id = %report.upload_id, "report receiver dropped");
            }
        }
    }
}
