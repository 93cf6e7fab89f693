//! Resource upload helper.
//!
//! A thin local collaborator around the API: parses `name=path` resource
//! arguments, opens each named file through a [`ResourceOpener`], pushes the
//! bytes through an [`UploadClient`] and guarantees every opened stream is
//! released (dropped) whether or not its upload succeeded. The client is
//! closed after the batch regardless of outcome; the first error wins.

use std::io::Read;

use tracing::debug;

use crate::errors::Error;
use crate::errors::Result;

/// Transfers one resource's bytes to the controller.
#[cfg_attr(test, mockall::automock)]
pub trait UploadClient {
    fn upload(&mut self, entity: &str, resource: &str, data: &mut dyn Read) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Opens a local byte stream per resource path.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceOpener {
    fn open_resource(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

/// Parsed command arguments: the target entity plus `name=path` pairs in
/// the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    pub entity: String,
    pub resources: Vec<(String, String)>,
}

/// Parses `<entity> <name=path>...` arguments.
pub fn parse_upload_args(args: &[String]) -> Result<UploadArgs> {
    let mut iter = args.iter();
    let entity = match iter.next() {
        Some(e) if !e.is_empty() => e.clone(),
        _ => return Err(Error::NotValid("missing entity name".to_string())),
    };

    let mut resources: Vec<(String, String)> = Vec::new();
    for raw in iter {
        let (name, path) = raw
            .split_once('=')
            .ok_or_else(|| Error::NotValid(format!("resource {raw:?}")))?;
        if name.is_empty() || path.is_empty() {
            return Err(Error::NotValid(format!("resource {raw:?}")));
        }
        if resources.iter().any(|(n, _)| n == name) {
            return Err(Error::NotValid(format!("duplicate resource {name:?}")));
        }
        resources.push((name.to_string(), path.to_string()));
    }
    if resources.is_empty() {
        return Err(Error::NotValid("no resources specified".to_string()));
    }
    Ok(UploadArgs { entity, resources })
}

/// Uploads every named resource. Each opened stream is released after its
/// upload attempt regardless of success; the client is always closed; the
/// first error encountered is the one returned.
pub fn upload_resources(
    client: &mut dyn UploadClient,
    opener: &dyn ResourceOpener,
    args: &UploadArgs,
) -> Result<()> {
    let mut outcome: Result<()> = Ok(());
    for (name, path) in &args.resources {
        let attempt = opener.open_resource(path).and_then(|mut stream| {
            debug!("uploading resource {} for {}", name, args.entity);
            client.upload(&args.entity, name, stream.as_mut())
            // stream dropped (closed) here, success or not
        });
        if outcome.is_ok() {
            outcome = attempt;
        }
    }
    let closed = client.close();
    match outcome {
        Ok(()) => closed,
        err => err,
    }
}
